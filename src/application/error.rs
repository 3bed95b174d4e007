use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{PartyId, PartyKind};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{kind} not found: {id}")]
    PartyNotFound { kind: PartyKind, id: PartyId },

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid amount: {0} (must be positive)")]
    InvalidAmount(Decimal),

    #[error("Nothing to update for {kind} {id}")]
    EmptyUpdate { kind: PartyKind, id: PartyId },

    #[error("Party name must not be empty")]
    EmptyName,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::PartyNotFound { .. } | AppError::UserNotFound(_)
        )
    }
}

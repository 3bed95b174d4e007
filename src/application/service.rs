use std::path::{Path, PathBuf};

use chrono::Local;
use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::{
    Category, IntegrityReport, LedgerDocument, NewParty, NewTransaction, Party, PartyId,
    PartyKind, PartyPatch, Settings, SettingsPatch, Transaction, User, build_integrity_report,
};
use crate::storage::{CorruptionPolicy, LedgerStore};

use super::{AppError, Dashboard};

/// Application service providing high-level operations for the shop ledger.
/// This is the primary interface for any client (CLI, HTTP handlers, tests).
///
/// The service owns its store; callers receive it by injection and hold no
/// other state between requests.
pub struct LedgerService {
    store: LedgerStore,
}

/// A party together with the transactions booked against it.
pub struct PartyDetail {
    pub party: Party,
    pub transactions: Vec<Transaction>,
}

impl LedgerService {
    /// Create a new ledger service over the given store.
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Open the ledger at `path`, creating the default document when none exists.
    pub async fn open(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Result<Self, AppError> {
        let store = LedgerStore::open(path, policy).await?;
        Ok(Self::new(store))
    }

    /// Initialize the ledger at `path`. Returns the service and whether a new document was written.
    pub async fn init(
        path: impl Into<PathBuf>,
        policy: CorruptionPolicy,
    ) -> Result<(Self, bool), AppError> {
        let store = LedgerStore::new(path).with_policy(policy);
        let created = store.initialize().await?;
        Ok((Self::new(store), created))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Load the whole document, e.g. for a full export.
    pub async fn document(&self) -> Result<LedgerDocument, AppError> {
        Ok(self.store.load().await?)
    }

    // ========================
    // Users
    // ========================

    pub async fn get_user(&self, username: &str) -> Result<User, AppError> {
        self.store
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    // ========================
    // Party operations
    // ========================

    /// Register a new customer or supplier.
    pub async fn create_party(&self, kind: PartyKind, fields: NewParty) -> Result<Party, AppError> {
        if fields.name.trim().is_empty() {
            return Err(AppError::EmptyName);
        }
        Ok(self.store.add_party(kind, fields).await?)
    }

    pub async fn update_party(
        &self,
        kind: PartyKind,
        id: PartyId,
        patch: PartyPatch,
    ) -> Result<Party, AppError> {
        if patch.is_empty() {
            return Err(AppError::EmptyUpdate { kind, id });
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::EmptyName);
        }
        self.store
            .update_party(kind, id, patch)
            .await?
            .ok_or(AppError::PartyNotFound { kind, id })
    }

    /// Delete a party. Succeeds whether or not it existed; its history is kept.
    pub async fn delete_party(&self, kind: PartyKind, id: PartyId) -> Result<bool, AppError> {
        Ok(self.store.delete_party(kind, id).await?)
    }

    pub async fn get_party(&self, kind: PartyKind, id: PartyId) -> Result<Party, AppError> {
        self.store
            .get_party(kind, id)
            .await?
            .ok_or(AppError::PartyNotFound { kind, id })
    }

    /// Party plus its transaction history, for the detail view.
    pub async fn get_party_detail(&self, kind: PartyKind, id: PartyId) -> Result<PartyDetail, AppError> {
        let doc = self.store.load().await?;
        let party = doc
            .party(kind, id)
            .cloned()
            .ok_or(AppError::PartyNotFound { kind, id })?;
        let transactions = doc
            .transactions
            .into_iter()
            .filter(|t| t.belongs_to(kind, id))
            .collect();
        Ok(PartyDetail {
            party,
            transactions,
        })
    }

    pub async fn list_parties(&self, kind: PartyKind) -> Result<Vec<Party>, AppError> {
        Ok(self.store.list_parties(kind).await?)
    }

    pub async fn party_transactions(
        &self,
        kind: PartyKind,
        id: PartyId,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self.store.party_transactions(kind, id).await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a debt movement.
    ///
    /// The amount must be positive. Unless `allow_orphan` is set the referenced
    /// party must exist; with it, the transaction is recorded even when the party
    /// is missing and no balance moves.
    pub async fn record_transaction(
        &self,
        fields: NewTransaction,
        allow_orphan: bool,
    ) -> Result<Transaction, AppError> {
        if fields.amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(fields.amount));
        }

        let kind = fields.tx_type.party_kind();
        if self.store.get_party(kind, fields.person_id).await?.is_none() {
            if !allow_orphan {
                return Err(AppError::PartyNotFound {
                    kind,
                    id: fields.person_id,
                });
            }
            warn!(person_id = fields.person_id, "Recording transaction for missing {}", kind);
        }

        Ok(self.store.add_transaction(fields).await?)
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.store.list_transactions().await?)
    }

    // ========================
    // Reference data and settings
    // ========================

    pub async fn categories(&self, kind: Option<PartyKind>) -> Result<Vec<Category>, AppError> {
        Ok(self.store.categories(kind).await?)
    }

    pub async fn settings(&self) -> Result<Settings, AppError> {
        Ok(self.store.settings().await?)
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, AppError> {
        Ok(self.store.update_settings(patch).await?)
    }

    // ========================
    // Reporting
    // ========================

    pub async fn dashboard(&self) -> Result<Dashboard, AppError> {
        let doc = self.store.load().await?;
        Ok(Dashboard::build(&doc, Local::now().naive_local()))
    }

    /// Compare stored balances against the transaction history. Never modifies the ledger.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let doc = self.store.load().await?;
        Ok(build_integrity_report(&doc))
    }
}

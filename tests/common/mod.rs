// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use kinash::application::LedgerService;
use kinash::domain::{NewParty, Party, PartyKind};
use kinash::storage::{CorruptionPolicy, LedgerStore};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Path of the ledger file inside a temp dir, one level deep so directory creation is exercised
pub fn ledger_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("data").join("database.json")
}

/// Helper to create a test store over a temporary ledger file
pub async fn test_store() -> Result<(LedgerStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = LedgerStore::open(ledger_path(&temp_dir), CorruptionPolicy::default()).await?;
    Ok((store, temp_dir))
}

/// Helper to create a test service over a temporary ledger file
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(ledger_path(&temp_dir), CorruptionPolicy::default()).await?;
    Ok((service, temp_dir))
}

pub fn amount(units: i64) -> Decimal {
    Decimal::from(units)
}

/// Test fixture: a small shop with two customers and one supplier
pub struct StandardParties;

impl StandardParties {
    pub async fn create(service: &LedgerService) -> Result<(Party, Party, Party)> {
        let karim = service
            .create_party(
                PartyKind::Customer,
                NewParty::new("Karim").with_phone("0550112233"),
            )
            .await?;
        let amina = service
            .create_party(
                PartyKind::Customer,
                NewParty::new("Amina").with_category("VIP"),
            )
            .await?;
        let grossiste = service
            .create_party(PartyKind::Supplier, NewParty::new("Grossiste El Baraka"))
            .await?;
        Ok((karim, amina, grossiste))
    }
}

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{LedgerDocument, PartyKind, format_amount};

/// Ledger snapshot for a full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: NaiveDateTime,
    pub ledger: LedgerDocument,
}

/// Exporter for converting ledger data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export every transaction to CSV, with the party name resolved where it still exists
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let doc = self.service.document().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "type",
            "person_id",
            "person_name",
            "debt_type",
            "amount",
            "date",
            "notes",
            "created_at",
        ])?;

        let mut count = 0;
        for tx in &doc.transactions {
            let person_name = doc
                .party(tx.party_kind(), tx.person_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();

            csv_writer.write_record([
                tx.id.to_string(),
                tx.tx_type.as_str().to_string(),
                tx.person_id.to_string(),
                person_name,
                tx.debt_type.as_str().to_string(),
                format_amount(tx.amount),
                tx.date.map(|d| d.to_string()).unwrap_or_default(),
                tx.notes.clone().unwrap_or_default(),
                tx.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export customers or suppliers with their balances to CSV
    pub async fn export_parties_csv<W: Write>(&self, kind: PartyKind, writer: W) -> Result<usize> {
        let parties = self.service.list_parties(kind).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "name",
            "phone",
            "category",
            "notes",
            "balance",
            "transactions",
            "created_at",
        ])?;

        for party in &parties {
            csv_writer.write_record([
                party.id.to_string(),
                party.name.clone(),
                party.phone.clone().unwrap_or_default(),
                party.category.clone().unwrap_or_default(),
                party.notes.clone().unwrap_or_default(),
                format_amount(party.balance),
                party.transactions.len().to_string(),
                party.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(parties.len())
    }

    /// Export the whole ledger as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Local::now().naive_local(),
            ledger: self.service.document().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::blank::{blank_as_none, blank_date_as_none};
use super::{PartyId, PartyKind, non_blank};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    CustomerDebt,
    SupplierDebt,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CustomerDebt => "customer_debt",
            TransactionType::SupplierDebt => "supplier_debt",
        }
    }

    pub fn party_kind(&self) -> PartyKind {
        match self {
            TransactionType::CustomerDebt => PartyKind::Customer,
            TransactionType::SupplierDebt => PartyKind::Supplier,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a debt relative to the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtType {
    /// The party took goods or money: their balance grows
    Taken,
    /// The party paid back or was given money: their balance shrinks
    Given,
}

impl DebtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::Taken => "taken",
            DebtType::Given => "given",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "taken" => Some(DebtType::Taken),
            "given" => Some(DebtType::Given),
            _ => None,
        }
    }

    /// Balance delta for an amount of this debt type.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            DebtType::Taken => amount,
            DebtType::Given => -amount,
        }
    }
}

impl std::fmt::Display for DebtType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded debt movement. Transactions are never edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub person_id: PartyId,
    pub debt_type: DebtType,
    pub amount: Decimal,
    /// When the debt happened in the real world, as entered by the shop owner
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
    /// When the transaction was recorded
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Build a transaction from caller-supplied fields. The id is assigned by the store.
    pub fn new(id: TransactionId, fields: NewTransaction, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            tx_type: fields.tx_type,
            person_id: fields.person_id,
            debt_type: fields.debt_type,
            amount: fields.amount,
            date: fields.date,
            notes: fields.notes.and_then(non_blank),
            created_at,
        }
    }

    pub fn party_kind(&self) -> PartyKind {
        self.tx_type.party_kind()
    }

    /// The change this transaction makes to its party's balance.
    pub fn signed_amount(&self) -> Decimal {
        self.debt_type.signed(self.amount)
    }

    pub fn belongs_to(&self, kind: PartyKind, id: PartyId) -> bool {
        self.party_kind() == kind && self.person_id == id
    }
}

/// Caller-supplied fields for a new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub person_id: PartyId,
    pub debt_type: DebtType,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn new(kind: PartyKind, person_id: PartyId, debt_type: DebtType, amount: Decimal) -> Self {
        Self {
            tx_type: kind.transaction_type(),
            person_id,
            debt_type,
            amount,
            date: None,
            notes: None,
        }
    }

    pub fn taken(kind: PartyKind, person_id: PartyId, amount: Decimal) -> Self {
        Self::new(kind, person_id, DebtType::Taken, amount)
    }

    pub fn given(kind: PartyKind, person_id: PartyId, amount: Decimal) -> Self {
        Self::new(kind, person_id, DebtType::Given, amount)
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::blank::blank_as_none;
use super::{TransactionId, TransactionType, non_blank};

pub type PartyId = i64;

/// Which side of the shop a party sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Supplier,
}

impl PartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyKind::Customer => "customer",
            PartyKind::Supplier => "supplier",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" | "customers" => Some(PartyKind::Customer),
            "supplier" | "suppliers" => Some(PartyKind::Supplier),
            _ => None,
        }
    }

    /// The transaction type that books a debt against this kind of party.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            PartyKind::Customer => TransactionType::CustomerDebt,
            PartyKind::Supplier => TransactionType::SupplierDebt,
        }
    }
}

impl std::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer or supplier with a running balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
    /// Signed running balance, positive when the party owes the shop
    #[serde(default)]
    pub balance: Decimal,
    /// Transaction ids in the order they were recorded
    #[serde(default)]
    pub transactions: Vec<TransactionId>,
    pub created_at: NaiveDateTime,
}

impl Party {
    /// Build a party from caller-supplied fields. The id is assigned by the store.
    pub fn new(id: PartyId, fields: NewParty, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            name: fields.name,
            phone: fields.phone.and_then(non_blank),
            category: fields.category.and_then(non_blank),
            notes: fields.notes.and_then(non_blank),
            balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at,
        }
    }

    /// Shallow merge: every field present in the patch overwrites, the rest are kept.
    /// A blank phone, category or notes clears that field.
    pub fn apply_patch(&mut self, patch: PartyPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = non_blank(phone);
        }
        if let Some(category) = patch.category {
            self.category = non_blank(category);
        }
        if let Some(notes) = patch.notes {
            self.notes = non_blank(notes);
        }
    }
}

/// Caller-supplied fields for a new party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewParty {
    pub name: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl NewParty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of a party's descriptive fields. `None` leaves a field untouched;
/// `Some("")` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl PartyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.category.is_none() && self.notes.is_none()
    }
}

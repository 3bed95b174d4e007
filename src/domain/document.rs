use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Party, PartyId, PartyKind, Transaction, TransactionId};

/// Length of the trial window granted to a freshly initialized shop.
pub const TRIAL_DAYS: i64 = 7;

pub const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "1234516";
const DEFAULT_ACTIVATION_KEY: u64 = 12345678910;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub activation_key: u64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PartyKind,
}

impl Category {
    fn new(id: i64, name: &str, kind: PartyKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
        }
    }
}

/// Shop-wide preferences stored alongside the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: String,
    pub language: String,
    pub currency: String,
    pub shop_name: String,
    pub trial_end_date: NaiveDateTime,
    pub is_activated: bool,
    pub hide_balance: bool,
}

impl Settings {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            theme: "light".to_string(),
            language: "ar".to_string(),
            currency: "د.ج".to_string(),
            shop_name: "متجري".to_string(),
            trial_end_date: now + Duration::days(TRIAL_DAYS),
            is_activated: false,
            hide_balance: false,
        }
    }

    pub fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(shop_name) = patch.shop_name {
            self.shop_name = shop_name;
        }
        if let Some(hide_balance) = patch.hide_balance {
            self.hide_balance = hide_balance;
        }
    }

    /// True while the shop is neither activated nor past its trial window.
    pub fn in_trial(&self, now: NaiveDateTime) -> bool {
        !self.is_activated && now < self.trial_end_date
    }
}

/// Partial update of the user-editable settings. Trial and activation state are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
    pub shop_name: Option<String>,
    pub hide_balance: Option<bool>,
}

/// The whole persisted ledger. Read and written as a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub customers: Vec<Party>,
    #[serde(default)]
    pub suppliers: Vec<Party>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub reminders: Vec<serde_json::Value>,
    pub settings: Settings,
}

impl LedgerDocument {
    /// The document a new shop starts with: one inactive admin, seeded categories, empty books.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            users: vec![User {
                username: DEFAULT_USERNAME.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
                activation_key: DEFAULT_ACTIVATION_KEY,
                is_active: false,
                created_at: now,
            }],
            customers: Vec::new(),
            suppliers: Vec::new(),
            transactions: Vec::new(),
            categories: vec![
                Category::new(1, "عادي", PartyKind::Customer),
                Category::new(2, "VIP", PartyKind::Customer),
                Category::new(3, "عادي", PartyKind::Supplier),
                Category::new(4, "مميز", PartyKind::Supplier),
            ],
            reminders: Vec::new(),
            settings: Settings::new(now),
        }
    }

    pub fn parties(&self, kind: PartyKind) -> &[Party] {
        match kind {
            PartyKind::Customer => &self.customers,
            PartyKind::Supplier => &self.suppliers,
        }
    }

    pub fn parties_mut(&mut self, kind: PartyKind) -> &mut Vec<Party> {
        match kind {
            PartyKind::Customer => &mut self.customers,
            PartyKind::Supplier => &mut self.suppliers,
        }
    }

    pub fn party(&self, kind: PartyKind, id: PartyId) -> Option<&Party> {
        self.parties(kind).iter().find(|p| p.id == id)
    }

    pub fn party_mut(&mut self, kind: PartyKind, id: PartyId) -> Option<&mut Party> {
        self.parties_mut(kind).iter_mut().find(|p| p.id == id)
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Next party id: one above the highest id among the collection and the
    /// transactions booked against that kind, so a deleted party's history
    /// never attaches to a newcomer.
    pub fn next_party_id(&self, kind: PartyKind) -> PartyId {
        let existing = self.parties(kind).iter().map(|p| p.id);
        let referenced = self
            .transactions
            .iter()
            .filter(|t| t.party_kind() == kind)
            .map(|t| t.person_id);
        existing.chain(referenced).max().unwrap_or(0) + 1
    }

    pub fn next_transaction_id(&self) -> TransactionId {
        self.transactions.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn categories_for(&self, kind: PartyKind) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.kind == kind)
    }
}

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{LedgerDocument, Party, Settings, total_balance};

/// How many of the newest customers and suppliers the dashboard lists.
pub const RECENT_PARTIES: usize = 5;

/// Shop overview shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub shop_name: String,
    pub currency: String,
    pub hide_balance: bool,
    pub in_trial: bool,
    pub trial_end_date: NaiveDateTime,
    pub customers_count: usize,
    pub suppliers_count: usize,
    /// Sum of customer balances: what customers owe the shop
    pub customers_debt: Decimal,
    /// Sum of supplier balances
    pub suppliers_debt: Decimal,
    /// Cash drawer balance. Not tracked yet, always zero.
    pub cash_balance: Decimal,
    pub recent_customers: Vec<Party>,
    pub recent_suppliers: Vec<Party>,
}

impl Dashboard {
    pub fn build(doc: &LedgerDocument, now: NaiveDateTime) -> Self {
        let settings: &Settings = &doc.settings;
        Self {
            shop_name: settings.shop_name.clone(),
            currency: settings.currency.clone(),
            hide_balance: settings.hide_balance,
            in_trial: settings.in_trial(now),
            trial_end_date: settings.trial_end_date,
            customers_count: doc.customers.len(),
            suppliers_count: doc.suppliers.len(),
            customers_debt: total_balance(&doc.customers),
            suppliers_debt: total_balance(&doc.suppliers),
            cash_balance: Decimal::ZERO,
            recent_customers: last_n(&doc.customers, RECENT_PARTIES),
            recent_suppliers: last_n(&doc.suppliers, RECENT_PARTIES),
        }
    }
}

/// The last `n` parties in insertion order.
fn last_n(parties: &[Party], n: usize) -> Vec<Party> {
    parties[parties.len().saturating_sub(n)..].to_vec()
}

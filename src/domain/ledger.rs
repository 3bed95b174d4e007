use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LedgerDocument, Party, PartyId, PartyKind, Transaction, TransactionId};

/// Book a transaction against its party: adjust the running balance and remember the id.
/// The balance is updated incrementally and never recomputed here.
pub fn apply_to_party(party: &mut Party, transaction: &Transaction) {
    party.balance += transaction.signed_amount();
    party.transactions.push(transaction.id);
}

/// Recompute a party's balance from scratch.
/// Balance = sum of taken amounts - sum of given amounts
pub fn compute_balance(kind: PartyKind, id: PartyId, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.belongs_to(kind, id))
        .fold(Decimal::ZERO, |balance, t| balance + t.signed_amount())
}

/// Sum of the stored balances of every party of a kind.
pub fn total_balance(parties: &[Party]) -> Decimal {
    parties.iter().map(|p| p.balance).sum()
}

/// A party whose stored balance disagrees with its transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceMismatch {
    pub kind: PartyKind,
    pub party_id: PartyId,
    pub name: String,
    pub stored: Decimal,
    pub computed: Decimal,
}

/// Result of a read-only consistency check over the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub customer_count: usize,
    pub supplier_count: usize,
    pub transaction_count: usize,
    pub balance_mismatches: Vec<BalanceMismatch>,
    /// Transactions pointing at a party that no longer (or never) existed
    pub orphaned_transactions: Vec<TransactionId>,
    pub duplicate_party_ids: Vec<(PartyKind, PartyId)>,
    pub duplicate_transaction_ids: Vec<TransactionId>,
    /// Transactions with a zero or negative amount
    pub invalid_amounts: Vec<TransactionId>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.balance_mismatches.is_empty()
            && self.orphaned_transactions.is_empty()
            && self.duplicate_party_ids.is_empty()
            && self.duplicate_transaction_ids.is_empty()
            && self.invalid_amounts.is_empty()
    }
}

/// Inspect the document without changing it.
pub fn build_integrity_report(doc: &LedgerDocument) -> IntegrityReport {
    let mut report = IntegrityReport {
        customer_count: doc.customers.len(),
        supplier_count: doc.suppliers.len(),
        transaction_count: doc.transactions.len(),
        ..Default::default()
    };

    let mut computed: HashMap<(PartyKind, PartyId), Decimal> = HashMap::new();
    for t in &doc.transactions {
        *computed
            .entry((t.party_kind(), t.person_id))
            .or_insert(Decimal::ZERO) += t.signed_amount();
    }

    for kind in [PartyKind::Customer, PartyKind::Supplier] {
        let mut seen = HashSet::new();
        for party in doc.parties(kind) {
            if !seen.insert(party.id) {
                report.duplicate_party_ids.push((kind, party.id));
            }
            let expected = computed
                .get(&(kind, party.id))
                .copied()
                .unwrap_or(Decimal::ZERO);
            if expected != party.balance {
                report.balance_mismatches.push(BalanceMismatch {
                    kind,
                    party_id: party.id,
                    name: party.name.clone(),
                    stored: party.balance,
                    computed: expected,
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for t in &doc.transactions {
        if !seen.insert(t.id) {
            report.duplicate_transaction_ids.push(t.id);
        }
        if doc.party(t.party_kind(), t.person_id).is_none() {
            report.orphaned_transactions.push(t.id);
        }
        if t.amount <= Decimal::ZERO {
            report.invalid_amounts.push(t.id);
        }
    }

    report
}

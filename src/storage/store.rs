use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    Category, LedgerDocument, NewParty, NewTransaction, Party, PartyId, PartyKind, PartyPatch,
    Settings, SettingsPatch, Transaction, User, apply_to_party,
};

use super::StoreError;

/// What `load` does when the ledger file cannot be read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptionPolicy {
    /// Overwrite the file with a fresh default document and load once more.
    /// Whatever was in the unreadable file is lost.
    #[default]
    ReinitializeOnCorruption,
    /// Surface the failure to the caller and leave the file alone.
    Fail,
}

/// File-backed store for the single ledger document.
///
/// Every operation reads the whole file, works on the in-memory copy and, for
/// mutations, writes the whole file back. Nothing is cached between calls.
/// Mutations made through one `LedgerStore` are serialized by an internal lock;
/// separate stores (or processes) on the same file still race and the last write wins.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    policy: CorruptionPolicy,
    write_lock: Mutex<()>,
}

impl LedgerStore {
    /// Create a store for the document at `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: CorruptionPolicy::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create the store and make sure a document exists on disk.
    pub async fn open(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Result<Self, StoreError> {
        let store = Self::new(path).with_policy(policy);
        store.initialize().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> CorruptionPolicy {
        self.policy
    }

    // ========================
    // Document lifecycle
    // ========================

    /// Write the default document if none exists. Returns true when a document was created.
    /// An existing document is never overwritten, even a corrupt one.
    pub async fn initialize(&self) -> Result<bool, StoreError> {
        if self.exists().await? {
            return Ok(false);
        }
        self.write_defaults().await?;
        info!(path = %self.path.display(), "Initialized new ledger");
        Ok(true)
    }

    /// Read the full document.
    ///
    /// A missing file is initialized first. Under [`CorruptionPolicy::ReinitializeOnCorruption`]
    /// any read or parse failure resets the file to defaults and the read is retried exactly once.
    pub async fn load(&self) -> Result<LedgerDocument, StoreError> {
        self.initialize().await?;

        match self.read_document().await {
            Ok(doc) => Ok(doc),
            Err(err) => match self.policy {
                CorruptionPolicy::ReinitializeOnCorruption => {
                    warn!(
                        path = %self.path.display(),
                        error = %err,
                        "Ledger unreadable, resetting to defaults"
                    );
                    self.write_defaults().await?;
                    self.read_document().await
                }
                CorruptionPolicy::Fail => Err(err),
            },
        }
    }

    /// Overwrite the persisted document.
    ///
    /// The document is written to a sibling temp file first and renamed into place,
    /// so a concurrent `load` sees either the old or the new document.
    pub async fn save(&self, doc: &LedgerDocument) -> Result<(), StoreError> {
        let bytes = encode_pretty(doc)?;
        let tmp = self.temp_path();

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Saved ledger");
        Ok(())
    }

    // ========================
    // Users
    // ========================

    /// First user with a matching username.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let doc = self.load().await?;
        Ok(doc.user(username).cloned())
    }

    // ========================
    // Parties
    // ========================

    /// Append a new customer or supplier with a zero balance.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub async fn add_party(&self, kind: PartyKind, fields: NewParty) -> Result<Party, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        let party = Party::new(doc.next_party_id(kind), fields, now());
        doc.parties_mut(kind).push(party.clone());
        self.save(&doc).await?;

        info!(id = party.id, "Added {}", kind);
        Ok(party)
    }

    /// Merge the patch into an existing party. Returns `None` (and writes nothing) if absent.
    #[instrument(skip(self, patch))]
    pub async fn update_party(
        &self,
        kind: PartyKind,
        id: PartyId,
        patch: PartyPatch,
    ) -> Result<Option<Party>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        let updated = match doc.party_mut(kind, id) {
            Some(party) => {
                party.apply_patch(patch);
                party.clone()
            }
            None => {
                debug!("No {} to update", kind);
                return Ok(None);
            }
        };

        self.save(&doc).await?;
        Ok(Some(updated))
    }

    /// Remove a party. Its transactions stay in the ledger.
    /// Always reports success, whether or not the party existed.
    #[instrument(skip(self))]
    pub async fn delete_party(&self, kind: PartyKind, id: PartyId) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        let parties = doc.parties_mut(kind);
        let before = parties.len();
        parties.retain(|p| p.id != id);
        let removed = before - parties.len();

        self.save(&doc).await?;
        debug!(removed, "Deleted {}", kind);
        Ok(true)
    }

    pub async fn get_party(&self, kind: PartyKind, id: PartyId) -> Result<Option<Party>, StoreError> {
        let doc = self.load().await?;
        Ok(doc.party(kind, id).cloned())
    }

    pub async fn list_parties(&self, kind: PartyKind) -> Result<Vec<Party>, StoreError> {
        let mut doc = self.load().await?;
        Ok(std::mem::take(doc.parties_mut(kind)))
    }

    /// Transactions booked against a party, in recording order.
    /// Matches on type and person id, so it also finds history of deleted parties.
    pub async fn party_transactions(
        &self,
        kind: PartyKind,
        id: PartyId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let doc = self.load().await?;
        Ok(doc
            .transactions
            .into_iter()
            .filter(|t| t.belongs_to(kind, id))
            .collect())
    }

    // ========================
    // Transactions
    // ========================

    /// Record a transaction and book it against its party in one write.
    ///
    /// If the referenced party does not exist the transaction is still recorded
    /// but no balance changes.
    #[instrument(skip(self, fields), fields(tx_type = %fields.tx_type, person_id = fields.person_id))]
    pub async fn add_transaction(&self, fields: NewTransaction) -> Result<Transaction, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        let transaction = Transaction::new(doc.next_transaction_id(), fields, now());
        doc.transactions.push(transaction.clone());

        match doc.party_mut(transaction.party_kind(), transaction.person_id) {
            Some(party) => apply_to_party(party, &transaction),
            None => warn!(
                id = transaction.id,
                "Referenced {} not found, balance left untouched",
                transaction.party_kind()
            ),
        }

        self.save(&doc).await?;
        info!(id = transaction.id, amount = %transaction.amount, "Recorded transaction");
        Ok(transaction)
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.load().await?.transactions)
    }

    // ========================
    // Reference data and settings
    // ========================

    pub async fn categories(&self, kind: Option<PartyKind>) -> Result<Vec<Category>, StoreError> {
        let doc = self.load().await?;
        Ok(doc
            .categories
            .into_iter()
            .filter(|c| kind.is_none_or(|k| c.kind == k))
            .collect())
    }

    pub async fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self.load().await?.settings)
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        doc.settings.apply_patch(patch);
        self.save(&doc).await?;
        Ok(doc.settings)
    }

    // ========================
    // Internals
    // ========================

    async fn exists(&self) -> Result<bool, StoreError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }

    async fn read_document(&self) -> Result<LedgerDocument, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        let doc = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Loaded ledger");
        Ok(doc)
    }

    async fn write_defaults(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        self.save(&LedgerDocument::new(now())).await
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Local wall-clock time, the way the shop owner reads it.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Pretty JSON with a four-space indent. Non-ASCII text is written as-is.
fn encode_pretty<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser).map_err(StoreError::Encode)?;
    Ok(out)
}

//! The pending-transition store.
//!
//! An identity-scoped, insertion-ordered list of unsigned transitions plus a
//! terminal result per content hash. The backing storage only offers
//! whole-value reads and writes, so every mutation is a read-modify-write;
//! writes are serialized per identity so two simultaneous sign requests for
//! the same identity cannot lose each other's append.

use crate::adapter::StorageAdapter;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dps_telemetry::store_metrics;
use dps_types::app::{
    sha256_hex, Identifier, PendingStateTransition, RejectionResult, SignedResult, TerminalResult,
};
use dps_types::codec;
use dps_types::error::StoreError;
use dps_types::keys::{pending_transitions_key, terminal_result_key};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// The persistent map of pending signing requests, mutated by the content
/// relay and read by the approval surface.
pub struct PendingStore<S> {
    storage: S,
    // Per-identity write locks. The map itself is touched only briefly.
    locks: Mutex<HashMap<Identifier, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: StorageAdapter> PendingStore<S> {
    /// Wraps a storage backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn identity_lock(
        &self,
        identity: &Identifier,
    ) -> Result<Arc<tokio::sync::Mutex<()>>, StoreError> {
        let mut map = self
            .locks
            .lock()
            .map_err(|_| StoreError::Backend("lock map poisoned".into()))?;
        Ok(map.entry(*identity).or_default().clone())
    }

    async fn read_list(
        &self,
        identity: &Identifier,
    ) -> Result<Vec<PendingStateTransition>, StoreError> {
        let key = pending_transitions_key(identity);
        match self.storage.get(&key).await? {
            None => Ok(Vec::new()),
            Some(bytes) => codec::from_bytes_canonical(&bytes).map_err(StoreError::Corrupt),
        }
    }

    async fn write_list(
        &self,
        identity: &Identifier,
        list: &[PendingStateTransition],
    ) -> Result<(), StoreError> {
        let key = pending_transitions_key(identity);
        let bytes = codec::to_bytes_canonical(&list.to_vec()).map_err(StoreError::Backend)?;
        self.storage.set(&key, &bytes).await
    }

    /// Appends a sign request for `identity`, returning its pending entry.
    ///
    /// The entry's hash is the lowercase hex SHA-256 of `bytes`. Submitting
    /// byte-identical content again reuses the existing entry instead of
    /// creating a duplicate.
    pub async fn append(
        &self,
        identity: &Identifier,
        bytes: &[u8],
    ) -> Result<PendingStateTransition, StoreError> {
        let hash = sha256_hex(bytes).map_err(|e| StoreError::Backend(e.to_string()))?;
        let entry = PendingStateTransition {
            hash: hash.clone(),
            payload: BASE64.encode(bytes),
        };

        let lock = self.identity_lock(identity)?;
        let _guard = lock.lock().await;

        let mut list = self.read_list(identity).await?;
        if let Some(existing) = list.iter().find(|e| e.hash == hash) {
            debug!(%identity, hash, "byte-identical re-submission, reusing pending entry");
            return Ok(existing.clone());
        }
        list.push(entry.clone());
        self.write_list(identity, &list).await?;

        store_metrics().inc_pending_appended();
        info!(%identity, hash, "pending state transition stored");
        Ok(entry)
    }

    /// Returns the identity's pending entries in arrival order.
    pub async fn list(
        &self,
        identity: &Identifier,
    ) -> Result<Vec<PendingStateTransition>, StoreError> {
        self.read_list(identity).await
    }

    /// Looks up one pending entry by content hash.
    pub async fn get(
        &self,
        identity: &Identifier,
        hash: &str,
    ) -> Result<Option<PendingStateTransition>, StoreError> {
        Ok(self
            .read_list(identity)
            .await?
            .into_iter()
            .find(|e| e.hash == hash))
    }

    /// Returns the terminal result recorded for a hash, if any.
    pub async fn terminal_result(&self, hash: &str) -> Result<Option<TerminalResult>, StoreError> {
        let key = terminal_result_key(hash);
        match self.storage.get(&key).await? {
            None => Ok(None),
            Some(bytes) => codec::from_bytes_canonical(&bytes)
                .map(Some)
                .map_err(StoreError::Corrupt),
        }
    }

    /// Records an approved signing as the terminal result for `hash` and
    /// removes the pending entry.
    ///
    /// Fails with [`StoreError::StateTransitionAlreadyExists`] if any
    /// terminal result was already recorded; approval is once-only.
    pub async fn record_signed(
        &self,
        identity: &Identifier,
        hash: &str,
        signed_base64: String,
    ) -> Result<SignedResult, StoreError> {
        let result = SignedResult {
            hash: hash.to_string(),
            signed_base64,
        };
        self.record_terminal(identity, hash, TerminalResult::Signed(result.clone()))
            .await?;
        Ok(result)
    }

    /// Records a rejection as the terminal result for `hash` and removes
    /// the pending entry.
    pub async fn record_rejection(
        &self,
        identity: &Identifier,
        hash: &str,
        reason: String,
    ) -> Result<RejectionResult, StoreError> {
        let result = RejectionResult {
            hash: hash.to_string(),
            reason,
        };
        self.record_terminal(identity, hash, TerminalResult::Rejected(result.clone()))
            .await?;
        Ok(result)
    }

    async fn record_terminal(
        &self,
        identity: &Identifier,
        hash: &str,
        result: TerminalResult,
    ) -> Result<(), StoreError> {
        let lock = self.identity_lock(identity)?;
        let _guard = lock.lock().await;

        if self.terminal_result(hash).await?.is_some() {
            return Err(StoreError::StateTransitionAlreadyExists {
                hash: hash.to_string(),
            });
        }

        let key = terminal_result_key(hash);
        let bytes = codec::to_bytes_canonical(&result).map_err(StoreError::Backend)?;
        self.storage.set(&key, &bytes).await?;

        let mut list = self.read_list(identity).await?;
        list.retain(|e| e.hash != hash);
        self.write_list(identity, &list).await?;

        store_metrics().inc_terminal_results();
        info!(%identity, hash, terminal = ?result_kind(&result), "signing request terminated");
        Ok(())
    }
}

fn result_kind(result: &TerminalResult) -> &'static str {
    match result {
        TerminalResult::Signed(_) => "signed",
        TerminalResult::Rejected(_) => "rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryStorage;

    fn identity(byte: u8) -> Identifier {
        Identifier::from_bytes([byte; 32])
    }

    #[tokio::test]
    async fn append_hashes_and_encodes_payload() {
        let store = PendingStore::new(MemoryStorage::new());
        let owner = identity(1);

        let entry = store.append(&owner, &[0xAA, 0xBB, 0xCC]).await.unwrap();
        assert_eq!(entry.hash, sha256_hex(&[0xAA, 0xBB, 0xCC]).unwrap());
        assert_eq!(entry.payload, BASE64.encode([0xAA, 0xBB, 0xCC]));
        assert_eq!(store.list(&owner).await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn duplicate_submission_reuses_entry() {
        let store = PendingStore::new(MemoryStorage::new());
        let owner = identity(1);

        let first = store.append(&owner, b"same bytes").await.unwrap();
        let second = store.append(&owner, b"same bytes").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list(&owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn appends_preserve_arrival_order() {
        let store = PendingStore::new(MemoryStorage::new());
        let owner = identity(1);

        let a = store.append(&owner, b"first").await.unwrap();
        let b = store.append(&owner, b"second").await.unwrap();
        let hashes: Vec<String> = store
            .list(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.hash)
            .collect();
        assert_eq!(hashes, vec![a.hash, b.hash]);
    }

    #[tokio::test]
    async fn identities_are_isolated() {
        let store = PendingStore::new(MemoryStorage::new());
        store.append(&identity(1), b"tx").await.unwrap();
        assert!(store.list(&identity(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn terminal_result_is_once_only() {
        let store = PendingStore::new(MemoryStorage::new());
        let owner = identity(1);
        let entry = store.append(&owner, b"tx").await.unwrap();

        store
            .record_signed(&owner, &entry.hash, "c2lnbmVk".into())
            .await
            .unwrap();
        // The pending entry is gone, the result is readable.
        assert!(store.get(&owner, &entry.hash).await.unwrap().is_none());
        assert!(matches!(
            store.terminal_result(&entry.hash).await.unwrap(),
            Some(TerminalResult::Signed(_))
        ));

        // A second terminal write for the same hash is an idempotency error.
        let err = store
            .record_rejection(&owner, &entry.hash, "late".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StateTransitionAlreadyExists { hash } if hash == entry.hash
        ));
    }

    #[tokio::test]
    async fn rejection_records_reason() {
        let store = PendingStore::new(MemoryStorage::new());
        let owner = identity(1);
        let entry = store.append(&owner, b"tx").await.unwrap();

        let rejection = store
            .record_rejection(&owner, &entry.hash, "user said no".into())
            .await
            .unwrap();
        assert_eq!(rejection.reason, "user said no");
        let Some(TerminalResult::Rejected(stored)) =
            store.terminal_result(&entry.hash).await.unwrap()
        else {
            panic!("expected rejected terminal result");
        };
        assert_eq!(stored, rejection);
    }

    #[tokio::test]
    async fn concurrent_appends_for_one_identity_are_lossless() {
        let store = Arc::new(PendingStore::new(MemoryStorage::new()));
        let owner = identity(7);

        let mut handles = Vec::new();
        for i in 0u8..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append(&owner, &[i, i, i]).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every distinct payload survived the concurrent read-modify-writes.
        assert_eq!(store.list(&owner).await.unwrap().len(), 8);
    }
}

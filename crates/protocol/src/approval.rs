//! The approval surface contract.
//!
//! Loads a pending transition into a reviewable context (decoded view, key
//! requirements, eligible keys), then settles it: approve signs through the
//! platform SDK and records the signed result; reject records a rejection.
//! Both outcomes are persisted before any reply is sent, so a caller that
//! disappeared still finds the terminal result in the store.

use crate::messages::WalletMessage;
use crate::wallet::{PlatformSdk, WalletRepository};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dps_decode::{decode_transition, DecodedTransition};
use dps_keys::KeyAvailability;
use dps_store::{PendingStore, StorageAdapter};
use dps_telemetry::signing_metrics;
use dps_types::app::{
    Identifier, KeyId, KeyRequirement, PendingStateTransition, PublicKeyInfo, RejectionResult,
    SignedResult, StateTransition,
};
use dps_types::error::{
    DecodeError, KeyError, ProtocolError, StoreError, REJECTION_MESSAGE,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Everything the approval UI needs to render one pending transition.
#[derive(Debug)]
pub struct ApprovalContext {
    /// The stored pending entry.
    pub pending: PendingStateTransition,
    /// The human-reviewable decoded view.
    pub decoded: DecodedTransition,
    /// The `(purpose, security level)` pairs the transition demands.
    pub requirements: Vec<KeyRequirement>,
    /// The identity's full key list, in key order.
    pub keys: Vec<PublicKeyInfo>,
    /// The keys eligible to sign, in key-list order.
    pub eligible_key_ids: Vec<KeyId>,
    /// The key preselected for the user, if any is eligible.
    pub default_key_id: Option<KeyId>,
    /// Whether signing is possible at all, and if not, why.
    pub availability: KeyAvailability,
}

/// The approval flow over a store, a wallet repository, and the platform
/// SDK. Replies to the page go out on `reply`, best effort; persistence is
/// the source of truth.
pub struct ApprovalFlow<S, W, P> {
    store: Arc<PendingStore<S>>,
    wallet: W,
    sdk: P,
    reply: mpsc::Sender<WalletMessage>,
}

impl<S, W, P> ApprovalFlow<S, W, P>
where
    S: StorageAdapter,
    W: WalletRepository,
    P: PlatformSdk,
{
    /// Wires the flow to its collaborators.
    pub fn new(
        store: Arc<PendingStore<S>>,
        wallet: W,
        sdk: P,
        reply: mpsc::Sender<WalletMessage>,
    ) -> Self {
        Self {
            store,
            wallet,
            sdk,
            reply,
        }
    }

    async fn pending_bytes(
        &self,
        identity: &Identifier,
        hash: &str,
    ) -> Result<(PendingStateTransition, Vec<u8>), ProtocolError> {
        if self.store.terminal_result(hash).await?.is_some() {
            return Err(StoreError::StateTransitionAlreadyExists {
                hash: hash.to_string(),
            }
            .into());
        }
        let pending = self
            .store
            .get(identity, hash)
            .await?
            .ok_or_else(|| StoreError::PendingNotFound(hash.to_string()))?;
        let bytes = BASE64
            .decode(&pending.payload)
            .map_err(|e| StoreError::Corrupt(format!("pending payload: {e}")))?;
        Ok((pending, bytes))
    }

    /// Loads one pending transition into its reviewable context.
    ///
    /// Fails if the hash is unknown, already settled, or the payload does
    /// not decode; the UI never renders a partial view.
    pub async fn load(
        &self,
        identity: &Identifier,
        hash: &str,
    ) -> Result<ApprovalContext, ProtocolError> {
        let (pending, bytes) = self.pending_bytes(identity, hash).await?;

        let started = Instant::now();
        let decoded = decode_transition(&bytes)?;
        signing_metrics().observe_decode_duration(started.elapsed().as_secs_f64());

        let transition = StateTransition::from_bytes(&bytes)
            .map_err(|e| ProtocolError::Decode(DecodeError::Malformed(e)))?;
        let requirements = dps_keys::requirements_for(&transition);

        let keys = self.wallet.identity_keys(identity).await?;
        let eligible = dps_keys::eligible_keys(&keys, &requirements);
        let eligible_key_ids: Vec<KeyId> = eligible.iter().map(|key| key.key_id).collect();
        let default_key_id = dps_keys::select_default(None, &eligible);
        let availability = dps_keys::availability(&keys, &requirements);

        debug!(%identity, hash, eligible = eligible_key_ids.len(), "approval context loaded");
        Ok(ApprovalContext {
            pending,
            decoded,
            requirements,
            keys,
            eligible_key_ids,
            default_key_id,
            availability,
        })
    }

    /// Approves a pending transition: signs it with `key_id`, records the
    /// signed result, then replies to the page if anyone still listens.
    pub async fn approve(
        &self,
        identity: &Identifier,
        hash: &str,
        key_id: KeyId,
    ) -> Result<SignedResult, ProtocolError> {
        let context = self.load(identity, hash).await?;
        if !context.eligible_key_ids.contains(&key_id) {
            return Err(KeyError::IneligibleKey(key_id).into());
        }

        let bytes = BASE64
            .decode(&context.pending.payload)
            .map_err(|e| StoreError::Corrupt(format!("pending payload: {e}")))?;
        let signed = self
            .sdk
            .sign_state_transition(&bytes, key_id)
            .await
            .map_err(ProtocolError::Signer)?;
        let signed_base64 = BASE64.encode(&signed);

        let result = self
            .store
            .record_signed(identity, hash, signed_base64.clone())
            .await?;
        signing_metrics().inc_requests_signed();
        info!(%identity, hash, key = key_id, "state transition signed");

        if self
            .reply
            .send(WalletMessage::SignStateTransitionResponse {
                base64: signed_base64,
            })
            .await
            .is_err()
        {
            debug!(hash, "no page listening for the signed reply");
        }
        Ok(result)
    }

    /// Rejects a pending transition, records the rejection, then replies to
    /// the page if anyone still listens.
    pub async fn reject(
        &self,
        identity: &Identifier,
        hash: &str,
    ) -> Result<RejectionResult, ProtocolError> {
        // Validates existence and settlement state before touching anything.
        self.pending_bytes(identity, hash).await?;

        let result = self
            .store
            .record_rejection(identity, hash, REJECTION_MESSAGE.to_string())
            .await?;
        signing_metrics().inc_requests_rejected();
        info!(%identity, hash, "state transition rejected");

        if self
            .reply
            .send(WalletMessage::RejectSigning {})
            .await
            .is_err()
        {
            debug!(hash, "no page listening for the rejection");
        }
        Ok(result)
    }

    /// Broadcasts an already-signed transition.
    ///
    /// On failure the error keeps the signed hex payload so the caller can
    /// retry broadcast without asking the user to sign again.
    pub async fn broadcast(&self, signed: &SignedResult) -> Result<(), ProtocolError> {
        let bytes = BASE64
            .decode(&signed.signed_base64)
            .map_err(|e| StoreError::Corrupt(format!("signed payload: {e}")))?;
        self.sdk
            .broadcast(&bytes)
            .await
            .map_err(|message| ProtocolError::Broadcast {
                signed_hex: hex::encode(&bytes),
                message,
            })?;
        info!(hash = signed.hash, "signed transition broadcast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::WalletRecord;
    use async_trait::async_trait;
    use dps_store::MemoryStorage;
    use dps_types::app::{
        IdentityCreditTransferTransition, Purpose, SecurityLevel, TerminalResult,
    };
    use dps_types::error::WalletError;

    struct FakeWallet {
        keys: Vec<PublicKeyInfo>,
    }

    #[async_trait]
    impl WalletRepository for FakeWallet {
        async fn get_all(&self) -> Result<Vec<WalletRecord>, WalletError> {
            Ok(vec![WalletRecord {
                wallet_id: "w1".into(),
                label: None,
            }])
        }

        async fn current_identity(&self) -> Result<Option<Identifier>, WalletError> {
            Ok(Some(Identifier::from_bytes([1; 32])))
        }

        async fn identity_keys(
            &self,
            _identity: &Identifier,
        ) -> Result<Vec<PublicKeyInfo>, WalletError> {
            Ok(self.keys.clone())
        }
    }

    struct FakeSdk {
        sign_error: Option<String>,
        broadcast_error: Option<String>,
    }

    impl FakeSdk {
        fn working() -> Self {
            Self {
                sign_error: None,
                broadcast_error: None,
            }
        }
    }

    #[async_trait]
    impl PlatformSdk for FakeSdk {
        async fn sign_state_transition(
            &self,
            bytes: &[u8],
            _key_id: KeyId,
        ) -> Result<Vec<u8>, String> {
            if let Some(error) = &self.sign_error {
                return Err(error.clone());
            }
            let mut signed = bytes.to_vec();
            signed.extend_from_slice(b"+sig");
            Ok(signed)
        }

        async fn broadcast(&self, _signed: &[u8]) -> Result<(), String> {
            match &self.broadcast_error {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    fn transfer_key() -> PublicKeyInfo {
        PublicKeyInfo {
            key_id: 2,
            purpose: Purpose::Transfer,
            security_level: SecurityLevel::Critical,
            hash: vec![2; 20],
            disabled_at: None,
        }
    }

    fn auth_key() -> PublicKeyInfo {
        PublicKeyInfo {
            key_id: 0,
            purpose: Purpose::Authentication,
            security_level: SecurityLevel::High,
            hash: vec![0; 20],
            disabled_at: None,
        }
    }

    fn transfer_bytes() -> Vec<u8> {
        StateTransition::IdentityCreditTransfer(IdentityCreditTransferTransition {
            identity_id: Identifier::from_bytes([1; 32]),
            recipient_id: Identifier::from_bytes([2; 32]),
            amount: 1_000,
            nonce: 1,
            signature_public_key_id: None,
            signature: vec![],
        })
        .to_bytes()
        .unwrap()
    }

    struct Fixture {
        flow: ApprovalFlow<MemoryStorage, FakeWallet, FakeSdk>,
        store: Arc<PendingStore<MemoryStorage>>,
        reply_rx: mpsc::Receiver<WalletMessage>,
        identity: Identifier,
    }

    fn fixture(keys: Vec<PublicKeyInfo>, sdk: FakeSdk) -> Fixture {
        let store = Arc::new(PendingStore::new(MemoryStorage::new()));
        let (reply_tx, reply_rx) = mpsc::channel(4);
        let flow = ApprovalFlow::new(Arc::clone(&store), FakeWallet { keys }, sdk, reply_tx);
        Fixture {
            flow,
            store,
            reply_rx,
            identity: Identifier::from_bytes([1; 32]),
        }
    }

    #[tokio::test]
    async fn load_builds_a_full_review_context() {
        let mut fx = fixture(vec![auth_key(), transfer_key()], FakeSdk::working());
        let bytes = transfer_bytes();
        let entry = fx.store.append(&fx.identity, &bytes).await.unwrap();

        let context = fx.flow.load(&fx.identity, &entry.hash).await.unwrap();
        assert_eq!(context.pending, entry);
        assert_eq!(context.decoded.type_string, "IDENTITY_CREDIT_TRANSFER");
        assert_eq!(context.eligible_key_ids, vec![2]);
        assert_eq!(context.default_key_id, Some(2));
        assert_eq!(context.availability, KeyAvailability::Available);
        assert!(fx.reply_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn load_of_unknown_hash_is_pending_not_found() {
        let fx = fixture(vec![transfer_key()], FakeSdk::working());
        let err = fx.flow.load(&fx.identity, "feedface").await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Store(StoreError::PendingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn approve_signs_records_and_replies() {
        let mut fx = fixture(vec![transfer_key()], FakeSdk::working());
        let bytes = transfer_bytes();
        let entry = fx.store.append(&fx.identity, &bytes).await.unwrap();

        let result = fx.flow.approve(&fx.identity, &entry.hash, 2).await.unwrap();

        let mut expected = bytes.clone();
        expected.extend_from_slice(b"+sig");
        assert_eq!(result.signed_base64, BASE64.encode(&expected));

        // Persisted first, replied second.
        assert!(matches!(
            fx.store.terminal_result(&entry.hash).await.unwrap(),
            Some(TerminalResult::Signed(_))
        ));
        assert_eq!(
            fx.reply_rx.recv().await.unwrap(),
            WalletMessage::SignStateTransitionResponse {
                base64: result.signed_base64.clone(),
            }
        );
        assert!(fx.store.get(&fx.identity, &entry.hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn approve_with_ineligible_key_fails_without_signing() {
        let mut fx = fixture(vec![auth_key(), transfer_key()], FakeSdk::working());
        let entry = fx.store.append(&fx.identity, &transfer_bytes()).await.unwrap();

        // Key 0 is authentication-purpose; a credit transfer demands a
        // critical transfer key.
        let err = fx.flow.approve(&fx.identity, &entry.hash, 0).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Key(KeyError::IneligibleKey(0))
        ));
        assert!(fx.store.terminal_result(&entry.hash).await.unwrap().is_none());
        assert!(fx.reply_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn signer_failure_leaves_the_request_pending() {
        let mut fx = fixture(
            vec![transfer_key()],
            FakeSdk {
                sign_error: Some("hardware wallet unplugged".into()),
                broadcast_error: None,
            },
        );
        let entry = fx.store.append(&fx.identity, &transfer_bytes()).await.unwrap();

        let err = fx.flow.approve(&fx.identity, &entry.hash, 2).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Signer(_)));

        // Still pending, so the user can retry.
        assert!(fx.store.get(&fx.identity, &entry.hash).await.unwrap().is_some());
        assert!(fx.reply_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reject_records_the_fixed_reason_and_replies() {
        let mut fx = fixture(vec![transfer_key()], FakeSdk::working());
        let entry = fx.store.append(&fx.identity, &transfer_bytes()).await.unwrap();

        let result = fx.flow.reject(&fx.identity, &entry.hash).await.unwrap();
        assert_eq!(result.reason, REJECTION_MESSAGE);
        assert_eq!(
            fx.reply_rx.recv().await.unwrap(),
            WalletMessage::RejectSigning {}
        );
    }

    #[tokio::test]
    async fn settled_requests_cannot_be_settled_again() {
        let mut fx = fixture(vec![transfer_key()], FakeSdk::working());
        let entry = fx.store.append(&fx.identity, &transfer_bytes()).await.unwrap();
        fx.flow.approve(&fx.identity, &entry.hash, 2).await.unwrap();
        fx.reply_rx.recv().await.unwrap();

        let err = fx.flow.reject(&fx.identity, &entry.hash).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Store(StoreError::StateTransitionAlreadyExists { .. })
        ));
        // No second reply went out.
        assert!(fx.reply_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_failure_keeps_the_signed_payload() {
        let fx = fixture(
            vec![transfer_key()],
            FakeSdk {
                sign_error: None,
                broadcast_error: Some("node unreachable".into()),
            },
        );
        let signed = SignedResult {
            hash: "ab".into(),
            signed_base64: BASE64.encode([0xCA, 0xFE]),
        };

        let err = fx.flow.broadcast(&signed).await.unwrap_err();
        let ProtocolError::Broadcast {
            signed_hex,
            message,
        } = err
        else {
            panic!("expected broadcast error");
        };
        assert_eq!(signed_hex, "cafe");
        assert_eq!(message, "node unreachable");
    }

    #[tokio::test]
    async fn broadcast_success_passes_through() {
        let fx = fixture(vec![transfer_key()], FakeSdk::working());
        let signed = SignedResult {
            hash: "ab".into(),
            signed_base64: BASE64.encode([1, 2, 3]),
        };
        fx.flow.broadcast(&signed).await.unwrap();
    }

    #[tokio::test]
    async fn approve_still_persists_when_no_page_listens() {
        let mut fx = fixture(vec![transfer_key()], FakeSdk::working());
        let entry = fx.store.append(&fx.identity, &transfer_bytes()).await.unwrap();

        // The page context went away.
        fx.reply_rx.close();
        let result = fx.flow.approve(&fx.identity, &entry.hash, 2).await.unwrap();

        let Some(TerminalResult::Signed(stored)) =
            fx.store.terminal_result(&entry.hash).await.unwrap()
        else {
            panic!("expected signed terminal result");
        };
        assert_eq!(stored, result);
    }
}

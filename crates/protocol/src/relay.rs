//! The content-script relay.
//!
//! Sits between the page and the extension: persists each sign request as a
//! pending entry and tells the wallet UI to open the approval route. The
//! relay never answers the page itself; replies only ever come from the
//! approval flow, so the page cannot be satisfied without a human decision.

use crate::messages::{approval_route, WalletMessage};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dps_store::{PendingStore, StorageAdapter};
use dps_telemetry::signing_metrics;
use dps_types::app::Identifier;
use dps_types::error::ProtocolError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One relay instance per page, bound to the wallet's active identity.
pub struct ContentRelay<S> {
    store: Arc<PendingStore<S>>,
    identity: Identifier,
    outbound: mpsc::Sender<WalletMessage>,
}

impl<S: StorageAdapter> ContentRelay<S> {
    /// Builds a relay storing under `identity` and emitting wallet-side
    /// messages on `outbound`.
    pub fn new(
        store: Arc<PendingStore<S>>,
        identity: Identifier,
        outbound: mpsc::Sender<WalletMessage>,
    ) -> Self {
        Self {
            store,
            identity,
            outbound,
        }
    }

    /// Feeds one page-originated message to the relay.
    ///
    /// A sign request is persisted and acknowledged with an `OpenUrl`
    /// pointing at its approval route; the content hash of the stored entry
    /// is returned. Every other method is ignored and returns `None`.
    /// A payload that is not valid base64 is refused before anything is
    /// stored.
    pub async fn handle_message(
        &self,
        message: &WalletMessage,
    ) -> Result<Option<String>, ProtocolError> {
        let WalletMessage::SignStateTransition { base64 } = message else {
            return Ok(None);
        };

        let bytes = BASE64.decode(base64).map_err(|e| {
            warn!(identity = %self.identity, error = %e, "refusing sign request with undecodable payload");
            ProtocolError::MalformedMessage(format!("payload is not valid base64: {e}"))
        })?;

        let entry = self.store.append(&self.identity, &bytes).await?;
        signing_metrics().inc_requests_received();

        self.outbound
            .send(WalletMessage::OpenUrl {
                url: approval_route(&entry.hash),
            })
            .await
            .map_err(|_| ProtocolError::ChannelClosed)?;

        info!(identity = %self.identity, hash = entry.hash, "sign request relayed to approval surface");
        Ok(Some(entry.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dps_store::MemoryStorage;
    use dps_types::app::sha256_hex;

    fn relay_with_channel() -> (ContentRelay<MemoryStorage>, mpsc::Receiver<WalletMessage>) {
        let (tx, rx) = mpsc::channel(4);
        let store = Arc::new(PendingStore::new(MemoryStorage::new()));
        let relay = ContentRelay::new(store, Identifier::from_bytes([3; 32]), tx);
        (relay, rx)
    }

    #[tokio::test]
    async fn sign_request_is_stored_and_routed_to_approval() {
        let (relay, mut rx) = relay_with_channel();
        let payload = vec![0xDE, 0xAD, 0xBE, 0xEF];

        let hash = relay
            .handle_message(&WalletMessage::SignStateTransition {
                base64: BASE64.encode(&payload),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(hash, sha256_hex(&payload).unwrap());
        assert_eq!(
            rx.recv().await.unwrap(),
            WalletMessage::OpenUrl {
                url: format!("#approve/{hash}"),
            }
        );
        // Nothing else crosses the channel; the relay never replies itself.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn undecodable_payload_is_refused_before_storage() {
        let (relay, mut rx) = relay_with_channel();

        let err = relay
            .handle_message(&WalletMessage::SignStateTransition {
                base64: "not-base64!!".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn non_sign_methods_are_ignored() {
        let (relay, mut rx) = relay_with_channel();

        let outcome = relay
            .handle_message(&WalletMessage::RejectSigning {})
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_request_routes_to_the_same_approval() {
        let (relay, mut rx) = relay_with_channel();
        let message = WalletMessage::SignStateTransition {
            base64: BASE64.encode(b"same transition"),
        };

        let first = relay.handle_message(&message).await.unwrap().unwrap();
        let second = relay.handle_message(&message).await.unwrap().unwrap();
        assert_eq!(first, second);

        // Both submissions still open the approval route.
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }
}

//! The wire message contract between the page, the content script, and the
//! approval surface.
//!
//! Payloads are plain JSON-serializable objects (`window.postMessage`
//! semantics): a `method` tag plus a `payload` object. The four methods
//! below are the entire cross-context surface; anything else on the channel
//! is ignored by every component.

use serde::{Deserialize, Serialize};

/// A message crossing a page/extension context boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "payload", rename_all = "camelCase")]
pub enum WalletMessage {
    /// Page → relay: request a signature over base64-encoded transition
    /// bytes.
    SignStateTransition {
        /// The raw transition bytes, base64-encoded.
        base64: String,
    },
    /// Relay → page/bridge layer: open the approval UI at a hash-addressed
    /// route.
    OpenUrl {
        /// The approval route, `#approve/<hash>`.
        url: String,
    },
    /// Approval → bridge: the signed transition bytes.
    SignStateTransitionResponse {
        /// The signed transition bytes, base64-encoded.
        base64: String,
    },
    /// Approval → bridge: the request was rejected. Carries no payload;
    /// rejection is unconditional.
    RejectSigning {},
}

/// The approval UI route for a pending transition's content hash.
pub fn approval_route(hash: &str) -> String {
    format!("#approve/{hash}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_request_matches_wire_shape() {
        let msg = WalletMessage::SignStateTransition {
            base64: "qrvM".into(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"method": "signStateTransition", "payload": {"base64": "qrvM"}})
        );
    }

    #[test]
    fn reject_signing_carries_empty_payload() {
        let msg = WalletMessage::RejectSigning {};
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"method": "rejectSigning", "payload": {}})
        );
    }

    #[test]
    fn messages_roundtrip_through_json() {
        let messages = vec![
            WalletMessage::SignStateTransition { base64: "AA==".into() },
            WalletMessage::OpenUrl { url: approval_route("ab12") },
            WalletMessage::SignStateTransitionResponse { base64: "c2ln".into() },
            WalletMessage::RejectSigning {},
        ];
        for msg in messages {
            let text = serde_json::to_string(&msg).unwrap();
            assert_eq!(serde_json::from_str::<WalletMessage>(&text).unwrap(), msg);
        }
    }

    #[test]
    fn approval_route_is_hash_addressed() {
        assert_eq!(approval_route("deadbeef"), "#approve/deadbeef");
    }
}

//! Core error types for the Dash Platform Signer.

use crate::app::KeyId;
use thiserror::Error;

/// The fixed page-facing string for an explicit user rejection.
///
/// Third-party pages receive plain strings, not structured errors, so this
/// value is part of the wire contract and must never change casually.
pub const REJECTION_MESSAGE: &str = "signing request rejected by user";

/// The fixed page-facing string for a request the wallet never answered.
///
/// Must stay distinguishable from [`REJECTION_MESSAGE`] so a page can tell
/// "wallet never responded" apart from "user said no".
pub const TIMEOUT_MESSAGE: &str = "signing request timed out";

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors in the base data model (identifiers, hashing).
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier string or byte slice had the wrong shape.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// The hash backend failed.
    #[error("Hashing failed: {0}")]
    Hash(String),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "CORE_INVALID_IDENTIFIER",
            Self::Hash(_) => "CORE_HASH_FAILED",
        }
    }
}

/// Errors while decoding a raw state transition into its reviewable form.
///
/// A decode failure must propagate to the approval surface as-is; the UI
/// refuses to render a fabricated or partial view of something a user might
/// sign.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The transition payload was empty.
    #[error("State transition payload is empty")]
    Empty,
    /// The discriminant names no known transition type.
    #[error("Unsupported state transition type: {0}")]
    UnsupportedType(u8),
    /// The discriminant is reserved by the platform and never decodable.
    #[error("State transition type {0} is reserved and cannot be decoded")]
    ReservedType(u8),
    /// The payload did not parse as the type its discriminant claims.
    #[error("Malformed state transition: {0}")]
    Malformed(String),
    /// The payload parsed but carried extra bytes after the transition.
    #[error("Trailing bytes after state transition payload")]
    TrailingBytes,
}

impl ErrorCode for DecodeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "DECODE_EMPTY",
            Self::UnsupportedType(_) => "DECODE_UNSUPPORTED_TYPE",
            Self::ReservedType(_) => "DECODE_RESERVED_TYPE",
            Self::Malformed(_) => "DECODE_MALFORMED",
            Self::TrailingBytes => "DECODE_TRAILING_BYTES",
        }
    }
}

/// Errors from the pending-transition store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A terminal result already exists for this hash. An idempotency
    /// guard, not a fatal error; callers should treat it as "already
    /// handled".
    #[error("A terminal result already exists for state transition {hash}")]
    StateTransitionAlreadyExists {
        /// The content hash that was already terminated.
        hash: String,
    },
    /// No pending entry exists under the given hash.
    #[error("Pending state transition not found: {0}")]
    PendingNotFound(String),
    /// The storage backend failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
    /// A stored value failed to decode.
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::StateTransitionAlreadyExists { .. } => "STORE_TRANSITION_ALREADY_EXISTS",
            Self::PendingNotFound(_) => "STORE_PENDING_NOT_FOUND",
            Self::Backend(_) => "STORE_BACKEND_ERROR",
            Self::Corrupt(_) => "STORE_CORRUPT_VALUE",
        }
    }
}

/// Errors from the wallet repository boundary.
#[derive(Error, Debug)]
pub enum WalletError {
    /// No wallet exists where one was required. Recoverable by the wallet
    /// creation flow.
    #[error("No wallet found")]
    WalletNotFound,
    /// The repository backend failed.
    #[error("Wallet repository error: {0}")]
    Repository(String),
}

impl ErrorCode for WalletError {
    fn code(&self) -> &'static str {
        match self {
            Self::WalletNotFound => "WALLET_NOT_FOUND",
            Self::Repository(_) => "WALLET_REPOSITORY_ERROR",
        }
    }
}

/// Errors from the key compatibility selector.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The identity has no keys at all. A provisioning problem.
    #[error("The identity has no keys")]
    NoKeys,
    /// The identity has keys, but none satisfies this transition's
    /// requirements.
    #[error("No key satisfies the signing requirements for this transition")]
    NoCompatibleKey,
    /// The chosen key is not eligible for this transition.
    #[error("Key {0} is not eligible to sign this transition")]
    IneligibleKey(KeyId),
}

impl ErrorCode for KeyError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoKeys => "KEY_NONE_PRESENT",
            Self::NoCompatibleKey => "KEY_NONE_COMPATIBLE",
            Self::IneligibleKey(_) => "KEY_INELIGIBLE",
        }
    }
}

/// Errors crossing the signing protocol's context boundaries.
///
/// At the page boundary these are stringified via `Display`; internally they
/// stay typed.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The bridge timer fired before any reply arrived.
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,
    /// The user (or a cancellation) rejected the request.
    #[error("{}", REJECTION_MESSAGE)]
    Rejected,
    /// Broadcasting an already-signed transition failed. Carries the signed
    /// hex payload so the caller can retry broadcast without re-signing.
    #[error("Broadcast failed: {message}")]
    Broadcast {
        /// The signed transition bytes, hex-encoded.
        signed_hex: String,
        /// The underlying failure.
        message: String,
    },
    /// An inbound message could not be interpreted.
    #[error("Malformed wallet message: {0}")]
    MalformedMessage(String),
    /// The transition to be signed could not be serialized.
    #[error("Failed to serialize state transition: {0}")]
    Serialization(String),
    /// The counterpart context went away.
    #[error("Message channel closed")]
    ChannelClosed,
    /// The external SDK failed to sign.
    #[error("Signer error: {0}")]
    Signer(String),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Decoding the transition for review failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The wallet boundary failed.
    #[error(transparent)]
    Wallet(#[from] WalletError),
    /// Key selection failed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

impl ErrorCode for ProtocolError {
    fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "PROTOCOL_TIMEOUT",
            Self::Rejected => "PROTOCOL_REJECTED",
            Self::Broadcast { .. } => "PROTOCOL_BROADCAST_FAILED",
            Self::MalformedMessage(_) => "PROTOCOL_MALFORMED_MESSAGE",
            Self::Serialization(_) => "PROTOCOL_SERIALIZATION_FAILED",
            Self::ChannelClosed => "PROTOCOL_CHANNEL_CLOSED",
            Self::Signer(_) => "PROTOCOL_SIGNER_ERROR",
            Self::Store(e) => e.code(),
            Self::Decode(e) => e.code(),
            Self::Wallet(e) => e.code(),
            Self::Key(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_rejection_strings_differ() {
        assert_ne!(
            ProtocolError::Timeout.to_string(),
            ProtocolError::Rejected.to_string()
        );
        assert_eq!(ProtocolError::Timeout.to_string(), TIMEOUT_MESSAGE);
        assert_eq!(ProtocolError::Rejected.to_string(), REJECTION_MESSAGE);
    }

    #[test]
    fn broadcast_error_keeps_signed_payload() {
        let err = ProtocolError::Broadcast {
            signed_hex: "aabbcc".into(),
            message: "node unreachable".into(),
        };
        let ProtocolError::Broadcast { signed_hex, .. } = &err else {
            panic!("expected broadcast error");
        };
        assert_eq!(signed_hex, "aabbcc");
        assert_eq!(err.code(), "PROTOCOL_BROADCAST_FAILED");
    }

    #[test]
    fn nested_codes_pass_through() {
        let err: ProtocolError = StoreError::StateTransitionAlreadyExists {
            hash: "00".into(),
        }
        .into();
        assert_eq!(err.code(), "STORE_TRANSITION_ALREADY_EXISTS");
    }
}

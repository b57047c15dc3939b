//! The application data model: platform identifiers, identity key metadata,
//! pending signing entries, and terminal signing results.

mod transition;

pub use transition::{
    BatchTransition, BatchedTransition, DocumentBase, DocumentTransition,
    IdentityCreateTransition, IdentityCreditTransferTransition, IdentityPublicKeyInCreation,
    IdentityTopUpTransition, IdentityUpdateTransition, MasternodeVoteTransition, StateTransition,
    TokenBase, TokenTransition, VoteChoice,
};

use crate::error::CoreError;
use dcrypt::algorithms::hash::{HashFunction, Sha256};
use dcrypt::algorithms::ByteSerializable;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier of an identity key within an identity.
pub type KeyId = u32;
/// A platform credit amount.
pub type Credits = u64;
/// A per-identity replay-protection nonce.
pub type IdentityNonce = u64;
/// A document or identity revision counter.
pub type Revision = u64;

// -----------------------------------------------------------------------------
// Identifier
// -----------------------------------------------------------------------------

/// A 32-byte platform identifier (identity, data contract, document, token).
///
/// Rendered in base58 everywhere it is shown to a human, kept as raw bytes
/// everywhere it is hashed or encoded.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct Identifier([u8; 32]);

impl Identifier {
    /// Wraps raw identifier bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses an identifier from its base58 string form.
    pub fn from_base58(s: &str) -> Result<Self, CoreError> {
        let raw = bs58::decode(s)
            .into_vec()
            .map_err(|e| CoreError::InvalidIdentifier(e.to_string()))?;
        let len = raw.len();
        let bytes: [u8; 32] = raw.try_into().map_err(|_| {
            CoreError::InvalidIdentifier(format!("expected 32 bytes, got {}", len))
        })?;
        Ok(Self(bytes))
    }

    /// Returns the identifier in its base58 string form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Returns the raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.to_base58())
    }
}

impl AsRef<[u8]> for Identifier {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// -----------------------------------------------------------------------------
// Identity key metadata
// -----------------------------------------------------------------------------

/// What kind of operation a key may authorize.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Encode, Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Purpose {
    /// General platform authentication (documents, data contracts).
    #[codec(index = 0)]
    Authentication,
    /// Asymmetric encryption.
    #[codec(index = 1)]
    Encryption,
    /// Asymmetric decryption.
    #[codec(index = 2)]
    Decryption,
    /// Credit transfers and withdrawals.
    #[codec(index = 3)]
    Transfer,
    /// System-reserved operations.
    #[codec(index = 4)]
    System,
    /// Masternode voting.
    #[codec(index = 5)]
    Voting,
}

/// How strongly a key is protected, constraining what it may sign.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Encode, Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    /// The identity's root key.
    #[codec(index = 0)]
    Master,
    /// Keys for operations that move funds or change keys.
    #[codec(index = 1)]
    Critical,
    /// Day-to-day signing keys.
    #[codec(index = 2)]
    High,
    /// Low-value, frequently used keys.
    #[codec(index = 3)]
    Medium,
}

/// Metadata for one public key attached to an identity.
///
/// The wallet's private key material never appears here; this is the view
/// the approval surface selects from.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyInfo {
    /// The key's identifier within its identity.
    pub key_id: KeyId,
    /// What the key may authorize.
    pub purpose: Purpose,
    /// How strongly the key is protected.
    pub security_level: SecurityLevel,
    /// The public key hash.
    pub hash: Vec<u8>,
    /// The timestamp (ms) at which the key was disabled, if it was.
    /// A disabled key can never satisfy a signing requirement.
    pub disabled_at: Option<u64>,
}

impl PublicKeyInfo {
    /// Whether the key is still enabled.
    pub fn is_enabled(&self) -> bool {
        self.disabled_at.is_none()
    }
}

/// A `(purpose, security level)` pair a transition demands of its signing key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequirement {
    /// The required key purpose.
    pub purpose: Purpose,
    /// The required security level. Matching is exact, not "at least".
    pub security_level: SecurityLevel,
}

// -----------------------------------------------------------------------------
// Pending entries and terminal results
// -----------------------------------------------------------------------------

/// A signing request awaiting human approval.
///
/// Immutable once created: re-submission of byte-identical content reuses
/// the same entry. The `hash` is both the primary key in storage and the
/// correlation token between the page, relay, and approval contexts.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStateTransition {
    /// Lowercase hex SHA-256 digest of the raw transition bytes.
    pub hash: String,
    /// The raw transition bytes, base64-encoded for transport and storage.
    pub payload: String,
}

/// The approved outcome of a signing request.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedResult {
    /// The content hash of the original unsigned transition.
    pub hash: String,
    /// The signed transition bytes, base64-encoded.
    pub signed_base64: String,
}

/// The rejected outcome of a signing request.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionResult {
    /// The content hash of the original unsigned transition.
    pub hash: String,
    /// Why the request was rejected (user action, policy, timeout).
    pub reason: String,
}

/// The terminal state of a signing request. Exactly one of these may ever
/// be recorded for a given content hash.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminalResult {
    /// The user approved and the transition was signed.
    #[codec(index = 0)]
    Signed(SignedResult),
    /// The user rejected, or the request was cancelled.
    #[codec(index = 1)]
    Rejected(RejectionResult),
}

impl TerminalResult {
    /// The content hash this result terminates.
    pub fn hash(&self) -> &str {
        match self {
            TerminalResult::Signed(s) => &s.hash,
            TerminalResult::Rejected(r) => &r.hash,
        }
    }
}

// -----------------------------------------------------------------------------
// Content hashing
// -----------------------------------------------------------------------------

/// Computes the content hash of raw transition bytes: lowercase hex SHA-256.
///
/// This is the correlation and idempotency key for the whole protocol.
pub fn sha256_hex(bytes: &[u8]) -> Result<String, CoreError> {
    let digest = Sha256::digest(bytes)
        .map_err(|e| CoreError::Hash(e.to_string()))?
        .to_bytes();
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        // NIST test vector for "abc".
        let hash = sha256_hex(b"abc").unwrap();
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_hex_is_deterministic() {
        let a = sha256_hex(&[0xAA, 0xBB, 0xCC]).unwrap();
        let b = sha256_hex(&[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, a.to_lowercase());
    }

    #[test]
    fn identifier_base58_roundtrip() {
        let id = Identifier::from_bytes([7u8; 32]);
        let b58 = id.to_base58();
        assert_eq!(Identifier::from_base58(&b58).unwrap(), id);
    }

    #[test]
    fn identifier_rejects_wrong_length() {
        // base58 of fewer than 32 bytes
        let short = bs58::encode([1u8; 16]).into_string();
        assert!(Identifier::from_base58(&short).is_err());
    }

    #[test]
    fn disabled_key_is_not_enabled() {
        let key = PublicKeyInfo {
            key_id: 0,
            purpose: Purpose::Authentication,
            security_level: SecurityLevel::High,
            hash: vec![1, 2, 3],
            disabled_at: Some(1_700_000_000_000),
        };
        assert!(!key.is_enabled());
    }
}

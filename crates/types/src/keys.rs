//! Defines constants for well-known storage keys.
//!
//! These constants provide a single source of truth for the keys used to
//! store pending signing requests and their terminal results in the
//! extension's persistent storage. Using these constants prevents typos and
//! ensures the content-script relay and the approval surface always address
//! the same entries.

use crate::app::Identifier;

/// The storage key prefix for an identity's ordered list of pending
/// (unsigned) state transitions.
pub const PENDING_TRANSITIONS_PREFIX: &[u8] = b"signing::pending::";

/// The storage key prefix for the terminal result of a signing request,
/// keyed by the transition's content hash.
pub const TERMINAL_RESULT_PREFIX: &[u8] = b"signing::result::";

/// Creates the storage key for an identity's pending-transition list.
///
/// The identity is rendered in its base58 form so keys stay printable in
/// storage inspectors.
pub fn pending_transitions_key(identity: &Identifier) -> Vec<u8> {
    [PENDING_TRANSITIONS_PREFIX, identity.to_base58().as_bytes()].concat()
}

/// Creates the storage key for a terminal signing result.
///
/// `hash` is the lowercase hex SHA-256 content hash of the raw transition
/// bytes.
pub fn terminal_result_key(hash: &str) -> Vec<u8> {
    [TERMINAL_RESULT_PREFIX, hash.as_bytes()].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_key_is_identity_scoped() {
        let a = Identifier::from_bytes([1u8; 32]);
        let b = Identifier::from_bytes([2u8; 32]);
        assert_ne!(pending_transitions_key(&a), pending_transitions_key(&b));
        assert!(pending_transitions_key(&a).starts_with(PENDING_TRANSITIONS_PREFIX));
    }

    #[test]
    fn result_key_embeds_hash() {
        let key = terminal_result_key("ab12");
        assert_eq!(key, b"signing::result::ab12".to_vec());
    }
}

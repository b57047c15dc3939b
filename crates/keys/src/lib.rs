#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Dash Platform Signer Key Selection
//!
//! Pure functions deciding which identity keys may satisfy a given state
//! transition, and which key to offer as the default. The approval surface
//! re-runs these whenever the key list or the requirement set changes, not
//! only on first render.

use dps_types::app::{KeyId, KeyRequirement, PublicKeyInfo, Purpose, SecurityLevel, StateTransition};

/// Whether a usable key exists for a requirement set.
///
/// `NoKeys` means a provisioning problem (the identity has no keys at all);
/// `NoneCompatible` means the identity has keys but none satisfies this
/// transition type. The approval surface renders the two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAvailability {
    /// The identity has no keys at all.
    NoKeys,
    /// The identity has keys, but none matches the requirements.
    NoneCompatible,
    /// At least one eligible key exists.
    Available,
}

/// Whether a single key satisfies a requirement set.
///
/// A key is eligible iff it is not disabled and its `(purpose, security
/// level)` pair equals at least one requirement exactly. An empty
/// requirement set constrains nothing: every enabled key is eligible.
pub fn is_eligible(key: &PublicKeyInfo, requirements: &[KeyRequirement]) -> bool {
    if !key.is_enabled() {
        return false;
    }
    if requirements.is_empty() {
        return true;
    }
    requirements
        .iter()
        .any(|req| req.purpose == key.purpose && req.security_level == key.security_level)
}

/// Filters the keys eligible for a requirement set, preserving input order.
pub fn eligible_keys<'a>(
    keys: &'a [PublicKeyInfo],
    requirements: &[KeyRequirement],
) -> Vec<&'a PublicKeyInfo> {
    keys.iter()
        .filter(|key| is_eligible(key, requirements))
        .collect()
}

/// Classifies the key situation for a requirement set.
pub fn availability(keys: &[PublicKeyInfo], requirements: &[KeyRequirement]) -> KeyAvailability {
    if keys.is_empty() {
        return KeyAvailability::NoKeys;
    }
    if keys.iter().any(|key| is_eligible(key, requirements)) {
        KeyAvailability::Available
    } else {
        KeyAvailability::NoneCompatible
    }
}

/// Picks the default key: the current selection if it is still eligible,
/// otherwise the first eligible key in input order, otherwise none.
pub fn select_default(
    current: Option<KeyId>,
    eligible: &[&PublicKeyInfo],
) -> Option<KeyId> {
    if let Some(current) = current {
        if eligible.iter().any(|key| key.key_id == current) {
            return Some(current);
        }
    }
    eligible.first().map(|key| key.key_id)
}

/// The `(purpose, security level)` pairs a transition type demands of its
/// signing key.
///
/// Asset-lock funded transitions (identity create, top-up) are signed by the
/// asset lock's one-time key, so they place no constraint on identity keys.
pub fn requirements_for(transition: &StateTransition) -> Vec<KeyRequirement> {
    match transition {
        StateTransition::Batch(_) => vec![
            KeyRequirement {
                purpose: Purpose::Authentication,
                security_level: SecurityLevel::Critical,
            },
            KeyRequirement {
                purpose: Purpose::Authentication,
                security_level: SecurityLevel::High,
            },
            KeyRequirement {
                purpose: Purpose::Authentication,
                security_level: SecurityLevel::Medium,
            },
        ],
        StateTransition::IdentityCreate(_) | StateTransition::IdentityTopUp(_) => vec![],
        StateTransition::IdentityUpdate(_) => vec![KeyRequirement {
            purpose: Purpose::Authentication,
            security_level: SecurityLevel::Master,
        }],
        StateTransition::IdentityCreditTransfer(_) => vec![KeyRequirement {
            purpose: Purpose::Transfer,
            security_level: SecurityLevel::Critical,
        }],
        StateTransition::MasternodeVote(_) => vec![
            KeyRequirement {
                purpose: Purpose::Voting,
                security_level: SecurityLevel::Critical,
            },
            KeyRequirement {
                purpose: Purpose::Voting,
                security_level: SecurityLevel::High,
            },
            KeyRequirement {
                purpose: Purpose::Voting,
                security_level: SecurityLevel::Medium,
            },
        ],
    }
}

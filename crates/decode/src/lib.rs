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

//! # Dash Platform Signer Decoder
//!
//! A pure, total (with explicit failure) mapping from raw state transition
//! bytes to a typed, human-reviewable [`DecodedTransition`].
//!
//! The decoder peeks the wire discriminant before parsing anything, so an
//! unknown or reserved transition type fails loudly: the approval surface
//! must never render a best-effort guess of a transaction that could move
//! funds. Numeric fields that may exceed the 53-bit float-safe range are
//! surfaced as decimal strings, byte fields as lowercase hex, and
//! identifiers as base58.

mod view;

pub use view::{
    DecodedBatchedTransition, DecodedBody, DecodedPublicKey, DecodedTransition, DecodedVoteChoice,
};

use dps_types::app::StateTransition;
use dps_types::error::DecodeError;
use parity_scale_codec::Decode;

/// Transition types the platform has allocated but this wallet never signs.
const RESERVED_TYPES: &[u8] = &[4, 6];
/// The full set of decodable wire discriminants.
const KNOWN_TYPES: &[u8] = &[1, 2, 3, 5, 7, 8];

/// Decodes raw state transition bytes into a reviewable view model.
///
/// Exactly one variant is produced per input. Reserved discriminants (4, 6)
/// and unknown discriminants are distinct failures; trailing bytes after a
/// well-formed transition are rejected.
pub fn decode_transition(bytes: &[u8]) -> Result<DecodedTransition, DecodeError> {
    let discriminant = *bytes.first().ok_or(DecodeError::Empty)?;
    if RESERVED_TYPES.contains(&discriminant) {
        return Err(DecodeError::ReservedType(discriminant));
    }
    if !KNOWN_TYPES.contains(&discriminant) {
        return Err(DecodeError::UnsupportedType(discriminant));
    }

    let mut input = bytes;
    let transition =
        StateTransition::decode(&mut input).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if !input.is_empty() {
        return Err(DecodeError::TrailingBytes);
    }

    Ok(view::describe(&transition, bytes))
}

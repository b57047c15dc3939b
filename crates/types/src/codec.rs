//! Defines the canonical, deterministic binary codec for all persisted and
//! hashed data.
//!
//! This module provides simple wrappers around `parity-scale-codec` (SCALE).
//! By centralizing the codec logic here in the base `types` crate, we ensure
//! that every component uses the exact same serialization format for state
//! transitions and stored values. The content hash that correlates a signing
//! request across contexts is computed over these bytes, so two encodings of
//! the same transition must never differ.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical byte representation using SCALE codec.
///
/// Use this for anything that is persisted or included in a content hash.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical byte representation using SCALE codec.
///
/// Fails fast on any decoding error, including trailing input. Malformed or
/// truncated data must never yield a partial value: a wrongly interpreted
/// state transition is a signable artifact, not a cosmetic bug.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}

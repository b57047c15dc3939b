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

//! # Dash Platform Signer Types
//!
//! Core data structures shared by every crate in the signer: the raw state
//! transition wire model, platform identifiers, key metadata, pending
//! signing entries and their terminal results, the canonical binary codec,
//! and the error taxonomy.

/// The application data model: identifiers, keys, transitions, pending entries.
pub mod app;
/// Canonical binary codec wrappers (SCALE).
pub mod codec;
/// Error types and the `ErrorCode` trait.
pub mod error;
/// Constants for well-known storage keys.
pub mod keys;

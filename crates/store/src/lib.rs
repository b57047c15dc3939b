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

//! # Dash Platform Signer Store
//!
//! The pending-transition store: the only shared mutable resource crossing
//! the page, content-script, and approval contexts. Pending entries are
//! keyed by content hash under an identity-scoped list; terminal results
//! are keyed by hash directly. The storage backend itself stays behind the
//! [`StorageAdapter`] trait; the extension's real storage is an external
//! collaborator.

/// The storage backend boundary and the in-memory implementation.
pub mod adapter;
/// The pending-transition store.
pub mod pending;

pub use adapter::{MemoryStorage, StorageAdapter};
pub use pending::PendingStore;

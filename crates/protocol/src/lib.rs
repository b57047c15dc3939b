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

//! # Dash Platform Signer Protocol
//!
//! The cross-context signing protocol. A page-initiated request crosses the
//! untrusted page context (the [`bridge::InjectedBridge`]), the
//! content-script context (the [`relay::ContentRelay`]), persistent storage
//! (the pending-transition store), and the human approval surface (the
//! [`approval::ApprovalFlow`]), then returns a result to the original call
//! exactly once, or fails with a well-defined timeout or rejection.
//!
//! The contexts share no memory; `tokio` mpsc channels model the browser's
//! one-directional `postMessage` ports, and the persisted pending entry
//! keyed by content hash is the only synchronization point between the page
//! side and the approval side.

/// The approval surface contract: load, decode, approve or reject.
pub mod approval;
/// The page-context bridge exposing `signStateTransition` to the page SDK.
pub mod bridge;
/// The wire message contract between contexts.
pub mod messages;
/// The content-script relay from page requests to the pending store.
pub mod relay;
/// Collaborator boundaries: wallet repository and platform SDK.
pub mod wallet;

pub use approval::{ApprovalContext, ApprovalFlow};
pub use bridge::{InjectedBridge, RequestState, TransitionSource, DEFAULT_SIGNING_TIMEOUT};
pub use messages::{approval_route, WalletMessage};
pub use relay::ContentRelay;
pub use wallet::{require_wallet, PlatformSdk, WalletRecord, WalletRepository};

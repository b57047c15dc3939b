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

//! # Dash Platform Signer Telemetry
//!
//! Observability infrastructure for the signer: structured logging
//! initialization and abstract sinks that decouple protocol instrumentation
//! from whatever backend the embedding extension host wires in.

/// The initialization routine for global structured logging.
pub mod init;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;

// Re-export the public helper functions for easy access to the global sinks.
pub use sinks::{signing_metrics, store_metrics};

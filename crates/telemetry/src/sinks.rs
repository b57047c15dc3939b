//! Defines abstract traits for metrics reporting, decoupling protocol logic
//! from the backend the extension host wires in.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A backend implementing every sink trait.
pub trait MetricsSink: SigningMetricsSink + StoreMetricsSink {}
impl MetricsSink for NopSink {}

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured signing metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn signing_metrics() -> &'static dyn SigningMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured store metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn store_metrics() -> &'static dyn StoreMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to the cross-context signing protocol.
pub trait SigningMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for sign requests relayed from pages.
    fn inc_requests_received(&self);
    /// Increments the counter for requests that ended in a signature.
    fn inc_requests_signed(&self);
    /// Increments the counter for requests the user (or a cancel) rejected.
    fn inc_requests_rejected(&self);
    /// Increments the counter for requests the bridge timed out.
    fn inc_requests_timed_out(&self);
    /// Observes how long decoding a transition for review took.
    fn observe_decode_duration(&self, duration_secs: f64);
}
impl SigningMetricsSink for NopSink {
    fn inc_requests_received(&self) {}
    fn inc_requests_signed(&self) {}
    fn inc_requests_rejected(&self) {}
    fn inc_requests_timed_out(&self) {}
    fn observe_decode_duration(&self, _duration_secs: f64) {}
}

/// A sink for metrics related to the pending-transition store.
pub trait StoreMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for pending entries appended.
    fn inc_pending_appended(&self);
    /// Increments the counter for terminal results recorded.
    fn inc_terminal_results(&self);
}
impl StoreMetricsSink for NopSink {
    fn inc_pending_appended(&self) {}
    fn inc_terminal_results(&self) {}
}

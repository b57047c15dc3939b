//! The injected bridge: the page-facing half of the signing protocol.
//!
//! One bridge instance lives in each page context. `sign_state_transition`
//! turns a typed transition into exactly one outbound wallet message, then
//! parks the caller on a oneshot until the wallet replies or the timer
//! fires. Replies carry no request identifier, so correlation is strictly
//! first-in-first-out over the requests still awaiting a reply.

use crate::messages::WalletMessage;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dps_telemetry::signing_metrics;
use dps_types::app::StateTransition;
use dps_types::error::ProtocolError;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// How long a page-initiated request waits for the wallet before failing
/// with a timeout.
pub const DEFAULT_SIGNING_TIMEOUT: Duration = Duration::from_secs(60);

/// The lifecycle of one page-initiated signing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// The outbound message has been handed to the channel.
    Sent,
    /// The caller is parked waiting for a wallet reply.
    AwaitingReply,
    /// A signed payload came back and was returned to the caller.
    Resolved,
    /// The wallet (or a cancellation) rejected the request.
    Rejected,
    /// The timer fired before any reply arrived.
    TimedOut,
}

/// Anything the bridge can serialize into transition bytes.
///
/// The page SDK hands the bridge typed transitions; tests hand it raw
/// fixtures.
pub trait TransitionSource {
    /// Canonical transition bytes, ready for hashing and review.
    fn to_bytes(&self) -> Result<Vec<u8>, String>;
}

impl TransitionSource for StateTransition {
    fn to_bytes(&self) -> Result<Vec<u8>, String> {
        StateTransition::to_bytes(self)
    }
}

enum ReplyEvent {
    Signed(String),
    Rejected,
}

struct ReplySlot {
    id: u64,
    tx: oneshot::Sender<ReplyEvent>,
}

/// The page-context bridge.
///
/// `handle_message` must be fed every wallet-originated message arriving in
/// the page context; the bridge ignores methods that are not replies.
pub struct InjectedBridge {
    outbound: mpsc::Sender<WalletMessage>,
    // Requests awaiting a reply, oldest first. FIFO is the correlation rule.
    slots: Mutex<VecDeque<ReplySlot>>,
    states: Mutex<HashMap<u64, RequestState>>,
    next_id: AtomicU64,
}

impl InjectedBridge {
    /// Builds a bridge that emits wallet messages on `outbound`.
    pub fn new(outbound: mpsc::Sender<WalletMessage>) -> Self {
        Self {
            outbound,
            slots: Mutex::new(VecDeque::new()),
            states: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, VecDeque<ReplySlot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn states(&self) -> std::sync::MutexGuard<'_, HashMap<u64, RequestState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, id: u64, state: RequestState) {
        let mut states = self.states();
        match state {
            // Terminal states leave the map; the caller already holds the
            // outcome in its Result.
            RequestState::Resolved | RequestState::Rejected | RequestState::TimedOut => {
                states.remove(&id);
                debug!(request = id, ?state, "signing request finished");
            }
            _ => {
                states.insert(id, state);
            }
        }
    }

    /// The number of requests still awaiting a wallet reply.
    pub fn in_flight(&self) -> usize {
        self.slots().len()
    }

    /// Signs a transition with the default timeout.
    pub async fn sign_state_transition<T: TransitionSource>(
        &self,
        transition: &T,
    ) -> Result<String, ProtocolError> {
        self.sign_state_transition_with_timeout(transition, DEFAULT_SIGNING_TIMEOUT)
            .await
    }

    /// Signs a transition, waiting at most `timeout` for the wallet.
    ///
    /// Returns the signed transition bytes, base64-encoded, exactly as the
    /// wallet produced them. Exactly one outbound message is emitted per
    /// call, including on every failure path.
    pub async fn sign_state_transition_with_timeout<T: TransitionSource>(
        &self,
        transition: &T,
        timeout: Duration,
    ) -> Result<String, ProtocolError> {
        let bytes = transition
            .to_bytes()
            .map_err(ProtocolError::Serialization)?;
        let message = WalletMessage::SignStateTransition {
            base64: BASE64.encode(&bytes),
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.slots().push_back(ReplySlot { id, tx });
        self.set_state(id, RequestState::Sent);

        if self.outbound.send(message).await.is_err() {
            // Nothing left listening; discard the slot we just registered.
            self.slots().retain(|slot| slot.id != id);
            self.set_state(id, RequestState::Rejected);
            return Err(ProtocolError::ChannelClosed);
        }
        self.set_state(id, RequestState::AwaitingReply);

        tokio::select! {
            reply = rx => match reply {
                Ok(ReplyEvent::Signed(base64)) => {
                    self.set_state(id, RequestState::Resolved);
                    Ok(base64)
                }
                Ok(ReplyEvent::Rejected) | Err(_) => {
                    self.set_state(id, RequestState::Rejected);
                    Err(ProtocolError::Rejected)
                }
            },
            _ = tokio::time::sleep(timeout) => {
                // The slot must go, or the next reply would correlate to a
                // caller that already gave up.
                self.slots().retain(|slot| slot.id != id);
                self.set_state(id, RequestState::TimedOut);
                signing_metrics().inc_requests_timed_out();
                warn!(request = id, ?timeout, "signing request timed out");
                Err(ProtocolError::Timeout)
            }
        }
    }

    /// Feeds one wallet-originated message to the bridge.
    ///
    /// Replies settle the oldest awaiting request. A reply with no awaiting
    /// request is dropped; non-reply methods are ignored.
    pub fn handle_message(&self, message: &WalletMessage) {
        let event = match message {
            WalletMessage::SignStateTransitionResponse { base64 } => {
                ReplyEvent::Signed(base64.clone())
            }
            WalletMessage::RejectSigning {} => ReplyEvent::Rejected,
            _ => return,
        };
        let slot = self.slots().pop_front();
        match slot {
            Some(slot) => {
                // A dropped receiver means the caller timed out in between;
                // nothing to do.
                let _ = slot.tx.send(event);
            }
            None => debug!("wallet reply with no awaiting request, dropping"),
        }
    }

    /// Rejects every request still awaiting a reply.
    ///
    /// Called when the page context is torn down so no caller is left
    /// parked forever.
    pub fn cancel_pending(&self) {
        let mut slots = self.slots();
        while let Some(slot) = slots.pop_front() {
            let _ = slot.tx.send(ReplyEvent::Rejected);
        }
    }
}

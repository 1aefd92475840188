//! Relay core: the single event entry point tying the session lifecycle to
//! the webhook fan-out.
//!
//! Two states only: `Disconnected` until the session starts, `Active` after.
//! `Started` may fire again after a transport reconnect; it is idempotent and
//! simply re-announces presence and re-fetches the roster.

use crate::config::RelayConfig;
use crate::delivery::WebhookSink;
use crate::session::{SessionCommand, SessionEvent, SessionState};

/// The relay core. Owns the validated config-derived state (the target set
/// inside the sink) and the lifecycle state; driven entirely by
/// [`handle_event`](Relay::handle_event).
pub struct Relay {
    state: SessionState,
    sink: WebhookSink,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            state: SessionState::Disconnected,
            sink: WebhookSink::new(config.webhooks.clone()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle one session event. Returns the transport commands the adapter
    /// should execute; delivery work is spawned, never awaited here, so the
    /// event loop stays responsive regardless of endpoint behavior.
    pub fn handle_event(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        match event {
            SessionEvent::Started => {
                self.state = SessionState::Active;
                vec![SessionCommand::AnnouncePresence, SessionCommand::FetchRoster]
            }
            SessionEvent::Message(msg) => {
                if self.state == SessionState::Active && msg.kind.is_forwardable() {
                    log::debug!(
                        "forwarding message from {} to {} target(s)",
                        msg.sender,
                        self.sink.target_count()
                    );
                    self.sink.dispatch(msg.body);
                }
                vec![]
            }
        }
    }

    /// The fan-out sink (for tests and diagnostics).
    pub fn sink(&self) -> &WebhookSink {
        &self.sink
    }
}

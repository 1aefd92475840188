//! Session events and commands exchanged between the relay core and the
//! session adapter.
//!
//! The adapter owns the XMPP connection; the core only sees `SessionEvent`s
//! and answers with `SessionCommand`s. Keeping this seam as plain enums (one
//! dispatch entry point on the relay) keeps the two-state lifecycle explicit
//! instead of hiding it in registered callbacks.

/// Stanza type of an inbound message, as reported by the chat server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Chat,
    Normal,
    Groupchat,
    Headline,
    Error,
}

impl MessageKind {
    /// True for the kinds addressed to the bot directly (`chat`, `normal`).
    /// Everything else (MUC traffic, headlines, error stanzas) is dropped
    /// without a side effect.
    pub fn is_forwardable(self) -> bool {
        matches!(self, MessageKind::Chat | MessageKind::Normal)
    }
}

/// A message received over the chat session. Lives for one handler call;
/// never queued or persisted.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub kind: MessageKind,
    /// Message body, possibly empty. Empty bodies are forwarded as-is.
    pub body: String,
    /// Sender identifier (bare or full JID) as a string.
    pub sender: String,
}

/// Event emitted by the session adapter to the relay core.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The connection is authenticated and the stream is ready for use.
    Started,
    /// A message stanza arrived.
    Message(InboundMessage),
}

/// Transport action requested by the relay core in response to an event.
/// The adapter executes these; the core never touches the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Broadcast initial presence ("I am online").
    AnnouncePresence,
    /// Request the roster from the server.
    FetchRoster,
}

/// Relay lifecycle: messages are only processed once the session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Active,
}

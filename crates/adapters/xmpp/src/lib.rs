//! XMPP session manager: owns the tokio-xmpp connection and drives the
//! relay core with session events.
//!
//! The relay never touches the transport. This adapter maps stream events to
//! `SessionEvent`s, executes the `SessionCommand`s the relay returns, and
//! answers the small set of IQs (disco#info, ping) a passive bot is expected
//! to handle for the protocol extensions it advertises.

use futures_util::StreamExt;
use lib::relay::Relay;
use lib::session::{InboundMessage, MessageKind, SessionCommand, SessionEvent};
use thiserror::Error;
use tokio_xmpp::{AsyncClient, Event};
use xmpp_parsers::disco::{DiscoInfoResult, Feature, Identity};
use xmpp_parsers::iq::{Iq, IqType};
use xmpp_parsers::message::{Message, MessageType};
use xmpp_parsers::presence::{Presence, Type as PresenceType};
use xmpp_parsers::roster::Roster;
use xmpp_parsers::{ns, Element, Jid};

/// Protocol extensions advertised in disco#info: service discovery, data
/// forms, pubsub, and ping.
pub const ADVERTISED_FEATURES: [&str; 4] = [ns::DISCO_INFO, ns::DATA_FORMS, ns::PUBSUB, ns::PING];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid jid {jid}: {reason}")]
    InvalidJid { jid: String, reason: String },

    #[error("unable to connect: {0}")]
    Connect(String),
}

/// Connect as the configured JID and process stream events until the
/// session ends. Returns `Err(SessionError::Connect)` when the stream drops
/// before ever coming online; a disconnect after that ends the run cleanly
/// (no automatic reconnect).
pub async fn run_session(
    config: &lib::config::RelayConfig,
    relay: &mut Relay,
) -> Result<(), SessionError> {
    let jid: Jid = config.jid.parse().map_err(|e| SessionError::InvalidJid {
        jid: config.jid.clone(),
        reason: format!("{:?}", e),
    })?;
    let mut client = AsyncClient::new(jid, config.password.clone());
    client.set_reconnect(false);

    let mut online = false;
    while let Some(event) = client.next().await {
        match event {
            Event::Online { bound_jid, .. } => {
                online = true;
                log::info!("session started as {}", bound_jid);
                for command in relay.handle_event(SessionEvent::Started) {
                    if let Err(e) = execute(&mut client, command).await {
                        log::warn!("session command failed: {}", e);
                    }
                }
            }
            Event::Disconnected(err) => {
                if !online {
                    return Err(SessionError::Connect(err.to_string()));
                }
                log::info!("session ended: {}", err);
                break;
            }
            Event::Stanza(element) => {
                handle_stanza(&mut client, relay, element).await;
            }
        }
    }
    if !online {
        return Err(SessionError::Connect("stream closed".to_string()));
    }
    Ok(())
}

async fn execute(
    client: &mut AsyncClient,
    command: SessionCommand,
) -> Result<(), tokio_xmpp::Error> {
    match command {
        SessionCommand::AnnouncePresence => {
            let presence = Presence::new(PresenceType::None);
            client.send_stanza(presence.into()).await
        }
        SessionCommand::FetchRoster => {
            let request = Iq::from_get(
                "roster",
                Roster {
                    ver: None,
                    items: vec![],
                },
            );
            client.send_stanza(request.into()).await
        }
    }
}

async fn handle_stanza(client: &mut AsyncClient, relay: &mut Relay, element: Element) {
    if element.is("message", ns::DEFAULT_NS) {
        if let Ok(message) = Message::try_from(element) {
            relay.handle_event(SessionEvent::Message(to_inbound(message)));
        }
    } else if element.is("iq", ns::DEFAULT_NS) {
        if let Ok(iq) = Iq::try_from(element) {
            answer_iq(client, iq).await;
        }
    }
}

/// Map a message stanza to the relay's inbound shape. A missing body or
/// sender becomes the empty string; classification is the relay's job.
fn to_inbound(message: Message) -> InboundMessage {
    let kind = match message.type_ {
        MessageType::Chat => MessageKind::Chat,
        MessageType::Normal => MessageKind::Normal,
        MessageType::Groupchat => MessageKind::Groupchat,
        MessageType::Headline => MessageKind::Headline,
        MessageType::Error => MessageKind::Error,
    };
    let body = message
        .bodies
        .get("")
        .map(|b| b.0.clone())
        .unwrap_or_default();
    let sender = message
        .from
        .as_ref()
        .map(|j| j.to_string())
        .unwrap_or_default();
    InboundMessage { kind, body, sender }
}

/// Answer disco#info and ping gets; everything else is ignored.
async fn answer_iq(client: &mut AsyncClient, iq: Iq) {
    let IqType::Get(ref query) = iq.payload else {
        return;
    };
    let reply = if query.is("query", ns::DISCO_INFO) {
        let result = DiscoInfoResult {
            node: None,
            identities: vec![Identity::new("client", "bot", "en", "howld")],
            features: ADVERTISED_FEATURES.iter().map(|f| Feature::new(*f)).collect(),
            extensions: vec![],
        };
        Some(Iq::from_result(iq.id.clone(), Some(result)))
    } else if query.is("ping", ns::PING) {
        Some(Iq::from_result(iq.id.clone(), None::<DiscoInfoResult>))
    } else {
        None
    };
    if let Some(mut reply) = reply {
        reply.to = iq.from.clone();
        if let Err(e) = client.send_stanza(reply.into()).await {
            log::warn!("iq reply failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmpp_parsers::message::Body;

    fn stanza(type_: MessageType, body: Option<&str>, from: Option<&str>) -> Message {
        let mut message = Message::new(None);
        message.type_ = type_;
        if let Some(body) = body {
            message.bodies.insert(String::new(), Body(body.to_string()));
        }
        if let Some(from) = from {
            message.from = Some(from.parse().expect("jid"));
        }
        message
    }

    #[test]
    fn chat_stanza_maps_to_chat_kind_with_body_and_sender() {
        let inbound = to_inbound(stanza(
            MessageType::Chat,
            Some("hello"),
            Some("alice@example.org"),
        ));
        assert_eq!(inbound.kind, MessageKind::Chat);
        assert_eq!(inbound.body, "hello");
        assert_eq!(inbound.sender, "alice@example.org");
    }

    #[test]
    fn missing_body_maps_to_empty_string() {
        let inbound = to_inbound(stanza(MessageType::Normal, None, None));
        assert_eq!(inbound.kind, MessageKind::Normal);
        assert_eq!(inbound.body, "");
        assert_eq!(inbound.sender, "");
    }

    #[test]
    fn groupchat_and_error_kinds_survive_the_mapping() {
        assert_eq!(
            to_inbound(stanza(MessageType::Groupchat, Some("x"), None)).kind,
            MessageKind::Groupchat
        );
        assert_eq!(
            to_inbound(stanza(MessageType::Error, Some("server busy"), None)).kind,
            MessageKind::Error
        );
    }

    #[test]
    fn advertised_features_cover_the_registered_extensions() {
        assert!(ADVERTISED_FEATURES.contains(&ns::DISCO_INFO));
        assert!(ADVERTISED_FEATURES.contains(&ns::DATA_FORMS));
        assert!(ADVERTISED_FEATURES.contains(&ns::PUBSUB));
        assert!(ADVERTISED_FEATURES.contains(&ns::PING));
    }
}

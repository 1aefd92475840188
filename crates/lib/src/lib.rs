//! howld core library — configuration, session events, message
//! classification, and webhook fan-out shared by the cli and the
//! XMPP session adapter.

pub mod config;
pub mod delivery;
pub mod relay;
pub mod session;

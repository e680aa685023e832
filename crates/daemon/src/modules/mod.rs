//! Observer modules riding the event bus.

pub mod history;
pub mod notify;
pub mod route;

/// Text notices destined for whatever front end is attached (the daemon
/// itself just logs them).
pub type NoticeSender = tokio::sync::mpsc::UnboundedSender<String>;

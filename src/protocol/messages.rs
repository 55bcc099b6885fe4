//! Inbound message classification and server announcements

use crate::protocol::DisplayName;

/// Command that ends a session in an orderly way.
pub const EXIT_COMMAND: &[u8] = b"exit";

/// What a received payload asks the server to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Leave the chat, announcing the departure.
    Exit,
    /// Relay the payload verbatim to everyone else.
    Relay(&'a [u8]),
}

/// Classifies a payload received in the active phase.
///
/// Only a payload that is exactly `exit` is the exit command. Anything else,
/// `exit\n` included, is relayed untouched.
pub fn classify(payload: &[u8]) -> Inbound<'_> {
    if payload == EXIT_COMMAND {
        Inbound::Exit
    } else {
        Inbound::Relay(payload)
    }
}

pub fn join_announcement(name: &DisplayName) -> String {
    format!("{} has joined\n", name)
}

pub fn leave_announcement(name: &DisplayName) -> String {
    format!("{} has left\n", name)
}

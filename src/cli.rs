//! Command-line handling
//!
//! The server takes exactly one argument: the TCP port to listen on.

use crate::error::ChatServerError;

/// Extracts the port from the process arguments (program name first).
pub fn parse_port<I>(args: I) -> Result<u16, ChatServerError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| "rax-chat-server".to_string());

    match (args.next(), args.next()) {
        (Some(port), None) => port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| ChatServerError::InvalidArgument(format!("invalid port: {}", port))),
        _ => Err(ChatServerError::InvalidArgument(format!(
            "Usage: {} <port>",
            program
        ))),
    }
}

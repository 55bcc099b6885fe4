//! Error handlers
//!
//! Provides reporting for errors that end the process.

use crate::error::types::ChatServerError;
use log::error;

/// Report a chat server error to the operator
pub fn handle_error(err: &ChatServerError) {
    error!("Chat Server Error: {}", err);
}

/// Convert a fatal error into a process exit status
pub fn exit_code(err: &ChatServerError) -> i32 {
    match err {
        ChatServerError::InvalidArgument(_) => 2,
        ChatServerError::Config(_) => 3,
        ChatServerError::Bind(_, _) => 4,
        ChatServerError::Signal(_) => 5,
    }
}

//! Error types
//!
//! Defines domain-specific error types for each part of the chat server.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use crate::client::ClientId;

/// Display name handshake errors
#[derive(Debug, PartialEq, Eq)]
pub enum HandshakeError {
    /// The peer closed the connection before sending a name.
    Missing,
    TooShort { len: usize, min: usize },
    TooLong { max: usize },
    InvalidCharacters,
    NotUtf8,
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::Missing => write!(f, "No display name received"),
            HandshakeError::TooShort { len, min } => {
                write!(f, "Display name too short: {} bytes (minimum {})", len, min)
            }
            HandshakeError::TooLong { max } => {
                write!(f, "Display name too long (maximum {} bytes)", max)
            }
            HandshakeError::InvalidCharacters => {
                write!(f, "Display name contains non-printable characters")
            }
            HandshakeError::NotUtf8 => write!(f, "Display name is not valid UTF-8"),
        }
    }
}

impl std::error::Error for HandshakeError {}

/// Client registry errors
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    Full { capacity: usize },
    DuplicateId(ClientId),
    NotFound(ClientId),
    NameAlreadySet(ClientId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full { capacity } => {
                write!(f, "Registry full ({} slots in use)", capacity)
            }
            RegistryError::DuplicateId(id) => write!(f, "Client {} is already registered", id),
            RegistryError::NotFound(id) => write!(f, "Client {} is not registered", id),
            RegistryError::NameAlreadySet(id) => {
                write!(f, "Client {} already has a display name", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Config(config::ConfigError),
    InvalidArgument(String),
    Bind(SocketAddr, io::Error),
    Signal(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::InvalidArgument(s) => write!(f, "Invalid argument: {}", s),
            ChatServerError::Bind(addr, e) => write!(f, "Failed to listen on {}: {}", addr, e),
            ChatServerError::Signal(e) => write!(f, "Signal handling failed: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatServerError::Config(e) => Some(e),
            ChatServerError::Bind(_, e) | ChatServerError::Signal(e) => Some(e),
            ChatServerError::InvalidArgument(_) => None,
        }
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

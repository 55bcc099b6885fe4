//! Display name handshake
//!
//! The first unit received on a new connection is its display name.

use std::fmt;

use crate::error::HandshakeError;
use crate::utils::text::trim_line_ending;

/// A validated display name. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length bounds for display names, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRules {
    min_len: usize,
    max_len: usize,
}

impl Default for NameRules {
    fn default() -> Self {
        Self::new(2, 31)
    }
}

impl NameRules {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Receive size for the handshake. One byte past the maximum so that an
    /// over-long payload is detected instead of silently truncated.
    pub fn read_len(&self) -> usize {
        self.max_len + 1
    }

    /// Validates a raw handshake payload.
    ///
    /// The whole payload, line terminator included, must fit in `max_len`
    /// bytes; the name left after dropping one trailing `\n`/`\r\n` must be at
    /// least `min_len` bytes of printable text.
    pub fn parse(&self, payload: &[u8]) -> Result<DisplayName, HandshakeError> {
        if payload.is_empty() {
            return Err(HandshakeError::Missing);
        }
        if payload.len() > self.max_len {
            return Err(HandshakeError::TooLong { max: self.max_len });
        }

        let raw = trim_line_ending(payload);
        let name = std::str::from_utf8(raw).map_err(|_| HandshakeError::NotUtf8)?;

        if name.chars().any(char::is_control) {
            return Err(HandshakeError::InvalidCharacters);
        }
        if name.len() < self.min_len {
            return Err(HandshakeError::TooShort {
                len: name.len(),
                min: self.min_len,
            });
        }

        Ok(DisplayName(name.to_string()))
    }
}

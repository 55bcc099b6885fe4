//! Module `state`
//!
//! Defines the per-connection record kept in the client registry and the
//! identifiers that distinguish connections.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::tcp::OwnedWriteHalf;

use crate::error::RegistryError;
use crate::protocol::DisplayName;

/// Process-unique, positive connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out identifiers in accept order, starting at 1.
#[derive(Debug)]
pub struct ClientIdGenerator {
    next: AtomicU64,
}

impl Default for ClientIdGenerator {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl ClientIdGenerator {
    pub fn next_id(&self) -> ClientId {
        ClientId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Represents one connected client as seen by the registry.
///
/// Holds the sending side of the client's socket; the receiving side belongs
/// to the client's lifecycle handler. The writer is only reachable through the
/// registry, so dropping it (and closing the socket) can only happen after the
/// handle has been taken back out of the registry.
pub struct ConnectionHandle<W = OwnedWriteHalf> {
    id: ClientId,
    addr: SocketAddr,
    name: Option<DisplayName>,
    writer: W,
}

impl<W> ConnectionHandle<W> {
    pub fn new(id: ClientId, addr: SocketAddr, writer: W) -> Self {
        Self {
            id,
            addr,
            name: None,
            writer,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the display name once the handshake has completed.
    pub fn name(&self) -> Option<&DisplayName> {
        self.name.as_ref()
    }

    /// Sets the display name. A name can only be set once.
    pub fn set_name(&mut self, name: DisplayName) -> Result<(), RegistryError> {
        if self.name.is_some() {
            return Err(RegistryError::NameAlreadySet(self.id));
        }
        self.name = Some(name);
        Ok(())
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W> fmt::Debug for ConnectionHandle<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

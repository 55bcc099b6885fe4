//! Connection lifecycle
//!
//! Each admitted connection is driven by one [`LifecycleHandler`] running in
//! its own task:
//!
//! ```text
//! AwaitingName -> Active -> Closing -> Closed
//!       \__________________^
//! ```
//!
//! The handler shares nothing with other connections except the registry it
//! broadcasts through, and it is the only party that ever removes its own
//! entry from that registry.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::net::tcp::OwnedWriteHalf;

use crate::broadcast::Broadcaster;
use crate::client::{ClientId, ClientRegistry};
use crate::config::ServerConfig;
use crate::protocol::{
    DisplayName, Frame, FrameReader, Inbound, NameRules, classify, join_announcement,
    leave_announcement,
};
use crate::server::AdmissionPermit;
use crate::utils::text::display_payload;

/// Per-connection limits taken from the server configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub name_rules: NameRules,
    pub message_buffer_size: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            name_rules: NameRules::default(),
            message_buffer_size: 2048,
        }
    }
}

impl From<&ServerConfig> for SessionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            name_rules: config.name_rules(),
            message_buffer_size: config.message_buffer_size,
        }
    }
}

/// Why a connection is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    HandshakeFailed,
    PeerClosed,
    ExitCommand,
    ReceiveError,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingName,
    Active(DisplayName),
    Closing(CloseReason),
    Closed(CloseReason),
}

/// Drives one client from handshake to teardown.
pub struct LifecycleHandler<R, W = OwnedWriteHalf> {
    id: ClientId,
    addr: SocketAddr,
    reader: R,
    registry: Arc<ClientRegistry<W>>,
    broadcaster: Broadcaster<W>,
    limits: SessionLimits,
    permit: Option<AdmissionPermit>,
}

impl<R, W> LifecycleHandler<R, W>
where
    R: FrameReader,
    W: AsyncWrite + Unpin + Send,
{
    /// The handle for `id` must already be in `registry`.
    pub fn new(
        id: ClientId,
        addr: SocketAddr,
        reader: R,
        registry: Arc<ClientRegistry<W>>,
        limits: SessionLimits,
        permit: Option<AdmissionPermit>,
    ) -> Self {
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        Self {
            id,
            addr,
            reader,
            registry,
            broadcaster,
            limits,
            permit,
        }
    }

    /// Runs the state machine to completion, returning why the connection
    /// ended.
    pub async fn run(mut self) -> CloseReason {
        let mut state = ConnectionState::AwaitingName;

        let reason = loop {
            state = match state {
                ConnectionState::AwaitingName => self.await_name().await,
                ConnectionState::Active(name) => self.receive(name).await,
                ConnectionState::Closing(reason) => self.close(reason).await,
                ConnectionState::Closed(reason) => break reason,
            };
        };

        // The registry entry is gone by now; release the socket, then the slot.
        let Self { reader, permit, .. } = self;
        drop(reader);
        drop(permit);

        reason
    }

    async fn await_name(&mut self) -> ConnectionState {
        let rules = self.limits.name_rules;

        let payload = match self.reader.read_frame(rules.read_len()).await {
            Ok(Frame::Data(payload)) => payload,
            Ok(Frame::Closed) => Vec::new(),
            Err(e) => {
                warn!("Handshake read from client {} failed: {}", self.id, e);
                return ConnectionState::Closing(CloseReason::HandshakeFailed);
            }
        };

        let name = match rules.parse(&payload) {
            Ok(name) => name,
            Err(e) => {
                warn!("Client {} ({}) failed handshake: {}", self.id, self.addr, e);
                return ConnectionState::Closing(CloseReason::HandshakeFailed);
            }
        };

        if let Err(e) = self.registry.assign_name(self.id, name.clone()).await {
            error!("Could not record name for client {}: {}", self.id, e);
            return ConnectionState::Closing(CloseReason::HandshakeFailed);
        }

        let announcement = join_announcement(&name);
        info!("{}", announcement.trim_end());
        self.broadcaster
            .broadcast(announcement.as_bytes(), self.id)
            .await;

        ConnectionState::Active(name)
    }

    async fn receive(&mut self, name: DisplayName) -> ConnectionState {
        let frame = match self
            .reader
            .read_frame(self.limits.message_buffer_size)
            .await
        {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to read from {} ({}): {}", name, self.addr, e);
                return ConnectionState::Closing(CloseReason::ReceiveError);
            }
        };

        match frame {
            Frame::Closed => {
                self.announce_departure(&name).await;
                ConnectionState::Closing(CloseReason::PeerClosed)
            }
            Frame::Data(payload) => match classify(&payload) {
                Inbound::Exit => {
                    self.announce_departure(&name).await;
                    ConnectionState::Closing(CloseReason::ExitCommand)
                }
                Inbound::Relay(message) => {
                    self.broadcaster.broadcast(message, self.id).await;
                    info!("{}: {}", name, display_payload(message));
                    ConnectionState::Active(name)
                }
            },
        }
    }

    async fn announce_departure(&mut self, name: &DisplayName) {
        let announcement = leave_announcement(name);
        info!("{}", announcement.trim_end());
        self.broadcaster
            .broadcast(announcement.as_bytes(), self.id)
            .await;
    }

    async fn close(&mut self, reason: CloseReason) -> ConnectionState {
        // Taking the handle out of the registry is what makes closing it safe:
        // no broadcast can reach it afterwards.
        let handle = self.registry.remove(self.id).await;
        drop(handle);

        info!(
            "Client {} ({}) disconnected: {:?}",
            self.id, self.addr, reason
        );
        ConnectionState::Closed(reason)
    }
}

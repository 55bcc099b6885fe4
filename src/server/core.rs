use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::client::{ClientIdGenerator, ClientRegistry, ConnectionHandle, LifecycleHandler, SessionLimits};
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::protocol::RawChunkReader;
use crate::server::AdmissionControl;

pub struct Server {
    listener: TcpListener,
    client_registry: Arc<ClientRegistry>,
    admission: Arc<AdmissionControl>,
    client_ids: ClientIdGenerator,
    limits: SessionLimits,
}

impl Server {
    /// Binds the listening socket described by `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &ServerConfig) -> Result<Self, ChatServerError> {
        let addr = config.socket_addr()?;

        let listener = match Self::listen(addr, config.listen_backlog) {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(ChatServerError::Bind(addr, e));
            }
        };

        Ok(Self {
            listener,
            client_registry: Arc::new(ClientRegistry::new(config.max_clients)),
            admission: AdmissionControl::new(config.max_clients),
            client_ids: ClientIdGenerator::default(),
            limits: SessionLimits::from(config),
        })
    }

    fn listen(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(backlog)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.client_registry)
    }

    pub fn admission(&self) -> Arc<AdmissionControl> {
        Arc::clone(&self.admission)
    }

    /// Accept loop. Runs until the task is dropped.
    pub async fn run(&self) {
        info!(
            "-------Server Started------- listening on {} (max {} clients)",
            self.local_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            self.admission.capacity()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.admit(stream, addr).await,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    /// Registers an accepted connection and spawns its lifecycle handler, or
    /// closes it straight away when the server is full.
    async fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        let Some(permit) = self.admission.try_admit() else {
            warn!("Max clients reached. Rejected: {}", addr);
            drop(stream);
            return;
        };

        let id = self.client_ids.next_id();
        let (read_half, write_half) = stream.into_split();

        if let Err(e) = self
            .client_registry
            .add(ConnectionHandle::new(id, addr, write_half))
            .await
        {
            warn!("Rejected client {} ({}): {}", id, addr, e);
            return;
        }

        info!(
            "Accepted client {} from {} ({}/{} clients)",
            id,
            addr,
            self.admission.live_count(),
            self.admission.capacity()
        );

        let handler = LifecycleHandler::new(
            id,
            addr,
            RawChunkReader::new(read_half),
            Arc::clone(&self.client_registry),
            self.limits,
            Some(permit),
        );

        // Spawn a task for each client so the accept loop doesn't block
        tokio::spawn(handler.run());
    }
}

//! Broadcast engine
//!
//! Writes a message to every registered client except its sender, while the
//! registry lock is held.

use log::warn;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;

use crate::broadcast::BroadcastReport;
use crate::client::{ClientId, ClientRegistry, ConnectionHandle, RegistryVisitor};

pub struct Broadcaster<W = OwnedWriteHalf> {
    registry: Arc<ClientRegistry<W>>,
}

impl<W> Clone for Broadcaster<W> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> Broadcaster<W> {
    pub fn new(registry: Arc<ClientRegistry<W>>) -> Self {
        Self { registry }
    }

    /// Delivers `message` to everyone but `exclude`.
    ///
    /// A failed write only abandons that recipient; the remaining recipients
    /// still get the message and nothing is reported back to the sender.
    pub async fn broadcast(&self, message: &[u8], exclude: ClientId) -> BroadcastReport {
        let mut delivery = Delivery {
            message,
            report: BroadcastReport::default(),
        };
        self.registry.for_each_except(exclude, &mut delivery).await;
        delivery.report
    }
}

struct Delivery<'m> {
    message: &'m [u8],
    report: BroadcastReport,
}

impl<W: AsyncWrite + Unpin + Send> RegistryVisitor<W> for Delivery<'_> {
    async fn visit(&mut self, handle: &mut ConnectionHandle<W>) {
        let writer = handle.writer_mut();
        let result = match writer.write_all(self.message).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => self.report.delivered.push(handle.id()),
            Err(e) => {
                warn!(
                    "Write to client {} ({}) failed: {}",
                    handle.id(),
                    handle.addr(),
                    e
                );
                self.report.failed.push(handle.id());
            }
        }
    }
}

//! Broadcast result types

use crate::client::ClientId;

/// Outcome of delivering one message to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients that received the whole message, in delivery order.
    pub delivered: Vec<ClientId>,
    /// Recipients whose write failed.
    pub failed: Vec<ClientId>,
}

impl BroadcastReport {
    pub fn recipients(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

//! Client registry
//!
//! Tracks every connected client in a fixed number of slots. Insertion,
//! removal and iteration all go through one lock, held for the whole
//! operation, so a handle can never be removed while a broadcast is writing
//! to it.

use std::future::Future;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::client::{ClientId, ConnectionHandle};
use crate::error::RegistryError;
use crate::protocol::DisplayName;

/// Work applied to registry entries while the registry lock is held.
pub trait RegistryVisitor<W> {
    fn visit(&mut self, handle: &mut ConnectionHandle<W>) -> impl Future<Output = ()> + Send;
}

/// Registry of connected clients
pub struct ClientRegistry<W = OwnedWriteHalf> {
    slots: Mutex<Vec<Option<ConnectionHandle<W>>>>,
    capacity: usize,
}

impl<W: Send> ClientRegistry<W> {
    pub fn new(capacity: usize) -> Self {
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();
        Self {
            slots: Mutex::new(slots),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts a handle into the first empty slot.
    ///
    /// The handle is dropped, closing its writer, when it cannot be inserted.
    pub async fn add(&self, handle: ConnectionHandle<W>) -> Result<(), RegistryError> {
        let mut slots = self.slots.lock().await;

        if slots.iter().flatten().any(|entry| entry.id() == handle.id()) {
            return Err(RegistryError::DuplicateId(handle.id()));
        }

        match slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(handle);
                Ok(())
            }
            None => Err(RegistryError::Full {
                capacity: self.capacity,
            }),
        }
    }

    /// Clears the slot holding `id` and hands the handle back to the caller.
    ///
    /// Returns `None` if no such client is registered, so removing twice is
    /// harmless.
    pub async fn remove(&self, id: ClientId) -> Option<ConnectionHandle<W>> {
        let mut slots = self.slots.lock().await;
        slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|entry| entry.id() == id))
            .and_then(Option::take)
    }

    /// Records the display name chosen during the handshake.
    pub async fn assign_name(&self, id: ClientId, name: DisplayName) -> Result<(), RegistryError> {
        let mut slots = self.slots.lock().await;
        match slots.iter_mut().flatten().find(|entry| entry.id() == id) {
            Some(entry) => entry.set_name(name),
            None => Err(RegistryError::NotFound(id)),
        }
    }

    /// Applies `visitor` to every entry except `exclude`, in slot order,
    /// holding the lock until the last entry has been visited.
    pub async fn for_each_except<V>(&self, exclude: ClientId, visitor: &mut V)
    where
        V: RegistryVisitor<W> + Send,
    {
        let mut slots = self.slots.lock().await;
        for entry in slots.iter_mut().flatten() {
            if entry.id() != exclude {
                visitor.visit(entry).await;
            }
        }
    }

    /// Number of occupied slots.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.iter().flatten().count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, id: ClientId) -> bool {
        self.slots
            .lock()
            .await
            .iter()
            .flatten()
            .any(|entry| entry.id() == id)
    }

    /// Display names of named clients, in slot order.
    pub async fn names(&self) -> Vec<String> {
        self.slots
            .lock()
            .await
            .iter()
            .flatten()
            .filter_map(|entry| entry.name().map(|name| name.to_string()))
            .collect()
    }
}

//! Client management
//!
//! Handles per-connection state, the shared client registry, and the
//! lifecycle of each connection.

pub mod handler;
pub mod registry;
pub mod state;

pub use handler::{CloseReason, ConnectionState, LifecycleHandler, SessionLimits};
pub use registry::{ClientRegistry, RegistryVisitor};
pub use state::{ClientId, ClientIdGenerator, ConnectionHandle};

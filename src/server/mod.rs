//! Server core functionality
//!
//! This module contains the accept loop and admission control.

pub mod admission;
pub mod core;

pub use admission::{AdmissionControl, AdmissionPermit};
pub use self::core::Server;

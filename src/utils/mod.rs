//! Utility functions
//!
//! Provides logging setup and console text helpers.

pub mod logging;
pub mod text;

//! Message fan-out to registered clients

pub mod engine;
pub mod results;

pub use engine::Broadcaster;
pub use results::BroadcastReport;

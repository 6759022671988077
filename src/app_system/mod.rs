//! System orchestration, configuration, startup, and shutdown logic.

pub mod order_system;
pub mod telemetry;
pub mod config;
pub mod error;

pub use order_system::*;
pub use telemetry::*;
pub use config::*;
pub use error::*;

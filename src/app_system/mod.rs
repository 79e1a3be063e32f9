//! System orchestration, configuration, startup and shutdown.

pub mod config;
pub mod storefront_system;
pub mod telemetry;

pub use config::*;
pub use storefront_system::*;
pub use telemetry::*;

// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod log_shipper;
pub mod time_provider;

// Re-exports
pub use command_runner::{CommandRunner, LineSink, RunOutcome};
pub use log_shipper::LogShipper;
pub use time_provider::{SystemTimeProvider, TimeProvider};

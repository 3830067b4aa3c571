// Application Layer - Use Cases and Coordination

pub mod constants;
mod error;
pub mod hook_service;
pub mod output_sink;
pub mod registry;
pub mod shutdown;
pub mod tail_buffer;

// Re-exports
pub use error::TriggerError;
pub use hook_service::{HookService, RunHandle};
pub use output_sink::{HookOutput, OutputSink};
pub use registry::{ExecutionRegistry, ExecutionState, RunGuard};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use tail_buffer::TailBuffer;

// Domain Layer - Pure business logic and entities

pub mod error;
pub mod execution;
pub mod hook;
pub mod labels;
pub mod log_entry;

// Re-exports
pub use error::DomainError;
pub use execution::ExecutionSnapshot;
pub use hook::{HookDefinition, HookId};
pub use labels::{LabelSet, HOOK_ID_LABEL};
pub use log_entry::LogEntry;

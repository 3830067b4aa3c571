// Log Shipper Port
// Hand-off point between output capture and remote log delivery

use crate::domain::LogEntry;
use async_trait::async_trait;

/// Log Shipper trait
///
/// Implementations:
/// - LokiShipper: batches entries and pushes them to a Loki endpoint
#[async_trait]
pub trait LogShipper: Send + Sync {
    /// Hand one entry to the shipping pipeline
    ///
    /// May wait when the pipeline's queue is full. Never fails: if the
    /// pipeline is gone the entry is dropped.
    async fn enqueue(&self, entry: LogEntry);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock shipper that keeps every entry it receives
    #[derive(Default)]
    pub struct RecordingShipper {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl RecordingShipper {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<LogEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogShipper for RecordingShipper {
        async fn enqueue(&self, entry: LogEntry) {
            self.entries.lock().unwrap().push(entry);
        }
    }
}

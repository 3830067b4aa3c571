// Log Entry - one captured line on its way to the log shipper

use crate::domain::labels::LabelSet;

/// Captured output line with its labels and capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub labels: LabelSet,
    pub line: String,
    /// Unix time in nanoseconds
    pub timestamp_nanos: i64,
}

impl LogEntry {
    pub fn new(labels: LabelSet, line: impl Into<String>, timestamp_nanos: i64) -> Self {
        Self {
            labels,
            line: line.into(),
            timestamp_nanos,
        }
    }

    /// Grouping key for batching
    pub fn signature(&self) -> String {
        self.labels.signature()
    }
}

// Execution Snapshot - read-only view of a hook's state

use chrono::{DateTime, Utc};

/// Copy of a hook's execution state taken under its lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSnapshot {
    pub running: bool,
    pub last_started: Option<DateTime<Utc>>,
    pub lines: Vec<String>,
}

impl ExecutionSnapshot {
    /// Newest `n` lines, oldest first
    pub fn last_lines(&self, n: usize) -> &[String] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }
}

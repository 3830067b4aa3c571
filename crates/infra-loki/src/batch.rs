//! Batch - pending log entries grouped by label-set signature.
//!
//! One group becomes one Loki stream on flush. Groups are keyed by the
//! signature string, so two entries land in the same stream exactly when
//! their label sets render identically.

use hooktail_core::domain::{LabelSet, LogEntry};
use serde::Serialize;
use std::collections::BTreeMap;

/// Body of `POST /loki/api/v1/push`
#[derive(Debug, Serialize)]
pub struct PushRequest {
    pub streams: Vec<PushStream>,
}

/// One labeled stream: `values` are `[unix-nanos-as-string, line]` pairs
#[derive(Debug, Serialize)]
pub struct PushStream {
    pub stream: BTreeMap<String, String>,
    pub values: Vec<[String; 2]>,
}

#[derive(Debug)]
struct Group {
    labels: LabelSet,
    values: Vec<(i64, String)>,
}

/// Entries accumulated since the last flush
#[derive(Debug, Default)]
pub struct Batch {
    groups: BTreeMap<String, Group>,
    entries: usize,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to its signature group, keeping insertion order
    pub fn push(&mut self, entry: LogEntry) {
        let LogEntry {
            labels,
            line,
            timestamp_nanos,
        } = entry;

        self.groups
            .entry(labels.signature())
            .or_insert_with(|| Group {
                labels,
                values: Vec::new(),
            })
            .values
            .push((timestamp_nanos, line));
        self.entries += 1;
    }

    /// Number of distinct label sets (the size trigger counts these)
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of entries across all groups
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Move the contents out, leaving an empty batch behind
    pub fn take(&mut self) -> Batch {
        std::mem::take(self)
    }

    /// Render as a push request, one stream per group
    pub fn into_push_request(self) -> PushRequest {
        let streams = self
            .groups
            .into_values()
            .map(|group| PushStream {
                stream: group.labels.as_map().clone(),
                values: group
                    .values
                    .into_iter()
                    .map(|(ts, line)| [ts.to_string(), line])
                    .collect(),
            })
            .collect();

        PushRequest { streams }
    }
}

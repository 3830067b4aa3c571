//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use hooktail_core::domain::{ExecutionSnapshot, HookDefinition};
use serde::{Deserialize, Serialize};

/// hooks.trigger.v1 - Start a hook run
#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    pub hook_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
    pub hook_id: String,
}

/// hooks.tail.v1 - Running state and buffered output of a hook
#[derive(Debug, Deserialize)]
pub struct TailRequest {
    pub hook_id: String,
    /// Only the newest N lines (default: everything buffered)
    #[serde(default)]
    pub lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailResponse {
    pub hook_id: String,
    /// "running" or "stopped"
    pub status: String,
    pub output: Vec<String>,
    /// RFC 3339 start time of the last run, absent if it never ran
    pub last_exec: Option<String>,
}

impl TailResponse {
    pub fn from_snapshot(hook_id: String, snapshot: ExecutionSnapshot, lines: Option<usize>) -> Self {
        let output = match lines {
            Some(n) => snapshot.last_lines(n).to_vec(),
            None => snapshot.lines,
        };

        Self {
            hook_id,
            status: if snapshot.running { "running" } else { "stopped" }.to_string(),
            output,
            last_exec: snapshot.last_started.map(|t| t.to_rfc3339()),
        }
    }
}

/// hooks.list.v1 - Configured hooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub message: String,
    pub hooks: Vec<HookDefinition>,
}

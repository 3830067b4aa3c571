// Command Runner Port
// Abstraction for running one hook command and streaming its output

use crate::domain::HookDefinition;
use async_trait::async_trait;

/// Terminal outcome of a hook run
///
/// The same information is also recorded as the last output line of the run;
/// this value only feeds logging and callers awaiting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Process exited with status zero
    Succeeded,
    /// Process exited non-zero or was terminated by a signal
    Failed { exit_code: Option<i32> },
    /// Process could not be created, nothing ran
    SpawnFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }
}

/// Receives output lines as the command produces them
#[async_trait]
pub trait LineSink: Send + Sync {
    async fn emit(&self, line: String);
}

/// Command Runner trait
///
/// Implementations:
/// - ShellCommandRunner: runs `bash -c <command>` as a child process
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the hook to completion, emitting every output line and then one
    /// outcome line through `sink`
    ///
    /// Failures never surface as errors: they are reported through the sink
    /// and the returned outcome.
    async fn run(&self, hook: &HookDefinition, sink: &dyn LineSink) -> RunOutcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    /// Mock runner that emits scripted lines
    ///
    /// When built with `gated`, every run waits for one permit released via
    /// `release()` before finishing, which lets tests hold a run in flight.
    pub struct ScriptedRunner {
        lines: Vec<String>,
        outcome: RunOutcome,
        gate: Option<Arc<Semaphore>>,
        call_count: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedRunner {
        pub fn new(lines: Vec<&str>, outcome: RunOutcome) -> Self {
            Self {
                lines: lines.into_iter().map(String::from).collect(),
                outcome,
                gate: None,
                call_count: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn gated(mut self) -> Self {
            self.gate = Some(Arc::new(Semaphore::new(0)));
            self
        }

        /// Let one gated run finish
        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1);
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Highest number of runs observed in progress at the same time
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, _hook: &HookDefinition, sink: &dyn LineSink) -> RunOutcome {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            for line in &self.lines {
                sink.emit(line.clone()).await;
            }

            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }
}

// Hook Service - trigger, tail and list use cases

use crate::application::error::TriggerError;
use crate::application::output_sink::OutputSink;
use crate::application::registry::{ExecutionRegistry, RunGuard};
use crate::domain::{ExecutionSnapshot, HookDefinition, HookId};
use crate::error::{AppError, Result};
use crate::port::{CommandRunner, RunOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handle to a run spawned by `HookService::trigger`
///
/// Dropping it detaches the run; it still completes on its own.
#[derive(Debug)]
pub struct RunHandle {
    hook_id: HookId,
    handle: JoinHandle<RunOutcome>,
}

impl RunHandle {
    pub fn hook_id(&self) -> &str {
        &self.hook_id
    }

    /// Wait for the run to complete
    pub async fn wait(self) -> Result<RunOutcome> {
        self.handle.await.map_err(|e| {
            AppError::Internal(format!("Run task for {} failed: {}", self.hook_id, e))
        })
    }
}

/// Hook Service
///
/// Owns the configured hook definitions and wires each accepted trigger to
/// the registry, the runner and the output sink.
pub struct HookService {
    hooks: Vec<HookDefinition>,
    index: HashMap<HookId, usize>,
    registry: Arc<ExecutionRegistry>,
    sink: Arc<OutputSink>,
    runner: Arc<dyn CommandRunner>,
}

impl HookService {
    /// Create the service and pre-create state for every configured hook
    pub fn new(
        hooks: Vec<HookDefinition>,
        registry: Arc<ExecutionRegistry>,
        sink: Arc<OutputSink>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let index = hooks
            .iter()
            .enumerate()
            .map(|(i, hook)| (hook.id.clone(), i))
            .collect();

        for hook in &hooks {
            registry.get_or_create(&hook.id);
        }

        Self {
            hooks,
            index,
            registry,
            sink,
            runner,
        }
    }

    /// Configured hooks in configuration order
    pub fn hooks(&self) -> &[HookDefinition] {
        &self.hooks
    }

    pub fn find(&self, hook_id: &str) -> Option<&HookDefinition> {
        self.index.get(hook_id).map(|&i| &self.hooks[i])
    }

    /// Start a run of `hook_id` in its own task
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - TriggerError::UnknownHook if no hook has this id
    /// - TriggerError::Busy if the hook is already running
    pub fn trigger(&self, hook_id: &str) -> std::result::Result<RunHandle, TriggerError> {
        let hook = self
            .find(hook_id)
            .cloned()
            .ok_or_else(|| TriggerError::UnknownHook(hook_id.to_string()))?;

        let guard = self.registry.try_start(hook_id).inspect_err(|_| {
            warn!(hook_id = %hook_id, "Trigger rejected: command is already running");
        })?;

        info!(
            hook_id = %hook.id,
            command = %hook.execute_command,
            working_dir = %hook.command_working_directory.display(),
            "Hook triggered"
        );

        let sink = Arc::clone(&self.sink);
        let runner = Arc::clone(&self.runner);
        let handle = tokio::spawn(run_hook(hook, guard, sink, runner));

        Ok(RunHandle {
            hook_id: hook_id.to_string(),
            handle,
        })
    }

    /// Running flag, last start time and buffered output of `hook_id`
    pub fn tail(&self, hook_id: &str) -> Option<ExecutionSnapshot> {
        self.sink.snapshot(hook_id)
    }
}

/// Body of one run task; the guard is released after the outcome line
async fn run_hook(
    hook: HookDefinition,
    guard: RunGuard,
    sink: Arc<OutputSink>,
    runner: Arc<dyn CommandRunner>,
) -> RunOutcome {
    let outcome = runner.run(&hook, &sink.for_hook(&hook.id)).await;

    match &outcome {
        RunOutcome::Succeeded => info!(hook_id = %hook.id, "Hook finished successfully"),
        RunOutcome::Failed { exit_code } => {
            warn!(hook_id = %hook.id, exit_code = ?exit_code, "Hook finished with error")
        }
        RunOutcome::SpawnFailed(reason) => {
            error!(hook_id = %hook.id, error = %reason, "Hook could not be started")
        }
    }

    guard.finish();
    outcome
}

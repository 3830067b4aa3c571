// Hook Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Hook identifier (stable name from configuration)
pub type HookId = String;

/// A named command that callers can trigger.
///
/// Field names follow the on-disk configuration format
/// (`execute-command`, `command-working-directory`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDefinition {
    pub id: HookId,

    #[serde(rename = "execute-command")]
    pub execute_command: String,

    #[serde(rename = "command-working-directory", default = "default_working_dir")]
    pub command_working_directory: PathBuf,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

impl HookDefinition {
    pub fn new(
        id: impl Into<HookId>,
        execute_command: impl Into<String>,
        command_working_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            execute_command: execute_command.into(),
            command_working_directory: command_working_directory.into(),
        }
    }

    /// Reject definitions that can never run
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DomainError::EmptyHookId);
        }
        if self.execute_command.trim().is_empty() {
            return Err(DomainError::EmptyCommand(self.id.clone()));
        }
        Ok(())
    }
}

/// Validate a full hook list: every definition valid, ids unique
pub fn validate_hooks(hooks: &[HookDefinition]) -> Result<()> {
    let mut seen = HashSet::with_capacity(hooks.len());
    for hook in hooks {
        hook.validate()?;
        if !seen.insert(hook.id.as_str()) {
            return Err(DomainError::DuplicateHookId(hook.id.clone()));
        }
    }
    Ok(())
}

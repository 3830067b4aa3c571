// Trigger Errors

use crate::domain::HookId;
use thiserror::Error;

/// Why a trigger request did not start a run
///
/// Neither variant is a system failure: `Busy` is the expected answer to a
/// duplicate trigger and leaves the running execution untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Hook not found: {0}")]
    UnknownHook(HookId),

    #[error("Command is already running: {0}")]
    Busy(HookId),
}

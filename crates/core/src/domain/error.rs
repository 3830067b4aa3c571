// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Hook id must not be empty")]
    EmptyHookId,

    #[error("Hook {0} has an empty command")]
    EmptyCommand(String),

    #[error("Duplicate hook id: {0}")]
    DuplicateHookId(String),

    #[error("Invalid label name: {0:?}")]
    InvalidLabelName(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

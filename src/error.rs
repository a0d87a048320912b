//! Error taxonomy shared by the registry, dispatcher and ledger.
//!
//! Every variant except `Io` is a recoverable, user-facing condition: the CLI
//! reports it instead of aborting.

use std::path::PathBuf;
use thiserror::Error;

pub type CalcResult<T> = std::result::Result<T, CalcError>;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid number: '{input}'")]
    InvalidNumber { input: String },

    #[error("Unknown operation: '{0}'")]
    UnknownOperation(String),

    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Result of '{operation}' is out of decimal range")]
    Overflow { operation: String },

    #[error("Isolated execution failed: {0}")]
    IsolatedExecutionFailed(String),

    #[error("Index {index} is out of range (history has {len} entries)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Malformed history file at line {line}: {reason}")]
    MalformedHistory { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalcError {
    /// Whether the condition is a normal user-input or domain outcome
    /// rather than an environmental fault.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CalcError::Io(_))
    }
}

/// A single catalogue entry that could not be turned into an operation.
///
/// Never returned to callers: discovery logs it, keeps it in
/// `OperationRegistry::load_failures` and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to load plugin '{plugin}': {reason}")]
pub struct PluginLoadError {
    pub plugin: String,
    pub reason: String,
}

impl PluginLoadError {
    pub fn new(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }
}

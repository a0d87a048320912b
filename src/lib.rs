//! Decimal Calculator
//!
//! A command-line calculator built around two pieces:
//! - an operation registry loaded from a static plugin catalogue, where each
//!   operation can run in-process or in an isolated worker
//! - a history ledger of every successful calculation, persisted as CSV

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod operations;
pub mod repl;
pub mod utils;

// Re-exports for convenience
pub use config::AppConfig;
pub use dispatcher::{Dispatcher, ExecutionMode, Outcome};
pub use error::{CalcError, CalcResult, PluginLoadError};
pub use history::{CalculationRecord, Ledger};
pub use operations::{Operation, OperationRegistry};

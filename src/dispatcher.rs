//! Dispatcher: operand parsing, operation lookup, execution and recording.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{CalcError, CalcResult};
use crate::history::{CalculationRecord, Ledger};
use crate::operations::{parse_decimal, IsolatedExecutor, OperationRegistry};

/// Where an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Direct,
    Isolated,
}

impl ExecutionMode {
    pub fn from_flag(isolated: bool) -> Self {
        if isolated {
            ExecutionMode::Isolated
        } else {
            ExecutionMode::Direct
        }
    }
}

/// What a successful dispatch hands back for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub operation: String,
    pub result: Decimal,
    pub mode: ExecutionMode,
}

/// Binds the operation registry, the isolated executor and the ledger
pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
    executor: IsolatedExecutor,
    ledger: Ledger,
}

impl Dispatcher {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self {
            registry,
            executor: IsolatedExecutor::new(),
            ledger: Ledger::new(),
        }
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn list_operations(&self) -> Vec<String> {
        self.registry.keys()
    }

    /// Evaluate `raw_a <key> raw_b` and record it in the ledger on success.
    ///
    /// Operands are validated before the key is looked up; no failure path
    /// touches the ledger.
    #[tracing::instrument(skip(self), fields(ledger_len = self.ledger.len()))]
    pub async fn dispatch(
        &mut self,
        raw_a: &str,
        raw_b: &str,
        key: &str,
        mode: ExecutionMode,
    ) -> CalcResult<Outcome> {
        debug!("Starting operation: {} {} {}", raw_a, key, raw_b);

        let (a, b) = match (parse_decimal(raw_a), parse_decimal(raw_b)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Invalid numeric input: {}, {}", raw_a, raw_b);
                return Err(e);
            }
        };

        let op = self.registry.lookup(key).ok_or_else(|| {
            warn!("Operation '{}' not found", key);
            CalcError::UnknownOperation(key.to_string())
        })?;

        let result = match mode {
            ExecutionMode::Direct => op.execute(a, b),
            ExecutionMode::Isolated => self.executor.run(op.clone(), a, b).await,
        };

        let result = match result {
            Ok(value) => value,
            Err(e) => {
                warn!("Operation '{}' failed: {}", key, e);
                return Err(e);
            }
        };

        info!("Result: {} {} {} = {} ({:?})", a, key, b, result, mode);

        self.ledger.append(CalculationRecord {
            operation_name: op.name().to_string(),
            operand_a: a,
            operand_b: b,
            result,
        });

        Ok(Outcome {
            operation: key.to_string(),
            result,
            mode,
        })
    }
}

//! Isolated execution of a single operation.
//!
//! Each call spawns one blocking worker with its own failure domain and a
//! fresh one-shot channel. The caller waits for the worker without timeout.
//! A worker that finishes (or panics) without sending is reported as
//! `IsolatedExecutionFailed`, never as an arithmetic error.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::oneshot;
use tracing::{debug, error};

use super::Operation;
use crate::error::{CalcError, CalcResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct IsolatedExecutor;

impl IsolatedExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run `op` on a dedicated worker and return the value it delivered.
    pub async fn run(&self, op: Arc<dyn Operation>, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        let name = op.name().to_string();
        let (tx, mut rx) = oneshot::channel();

        debug!("Spawning isolated worker for '{}'", name);
        let joined = tokio::task::spawn_blocking(move || op.execute_isolated(a, b, tx)).await;

        if let Err(e) = joined {
            error!("Isolated worker for '{}' terminated abnormally: {}", name, e);
        }

        match rx.try_recv() {
            Ok(result) => result,
            Err(_) => {
                error!("Isolated worker for '{}' returned no result", name);
                Err(CalcError::IsolatedExecutionFailed(format!(
                    "worker for '{}' terminated without delivering a result",
                    name
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{OperationRegistry, ResultSender};
    use std::str::FromStr;

    struct Silent;

    impl Operation for Silent {
        fn name(&self) -> &str { "silent" }
        fn description(&self) -> &str { "Never answers when isolated" }
        fn execute(&self, a: Decimal, _b: Decimal) -> CalcResult<Decimal> { Ok(a) }
        fn execute_isolated(&self, _a: Decimal, _b: Decimal, tx: ResultSender) {
            drop(tx);
        }
    }

    struct Crashing;

    impl Operation for Crashing {
        fn name(&self) -> &str { "crashing" }
        fn description(&self) -> &str { "Panics inside the worker" }
        fn execute(&self, _a: Decimal, _b: Decimal) -> CalcResult<Decimal> {
            panic!("worker fault");
        }
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_isolated_matches_direct() {
        let registry = OperationRegistry::discover();
        let executor = IsolatedExecutor::new();
        let pairs = [("10", "20"), ("-1.25", "3"), ("0", "0"), ("123456.789", "-0.001")];

        for key in ["add", "subtract", "multiply", "mean", "median", "mode"] {
            let op = registry.lookup(key).unwrap();
            for (a, b) in pairs {
                let direct = op.execute(d(a), d(b)).unwrap();
                let isolated = executor.run(op.clone(), d(a), d(b)).await.unwrap();
                assert_eq!(direct, isolated, "{} {} {}", key, a, b);
                assert_eq!(direct.to_string(), isolated.to_string());
            }
        }
    }

    #[tokio::test]
    async fn test_domain_error_crosses_the_channel() {
        let op = OperationRegistry::discover().lookup("divide").unwrap();
        let result = IsolatedExecutor::new().run(op, d("1"), Decimal::ZERO).await;
        assert!(matches!(result, Err(CalcError::DivisionByZero)));
    }

    #[tokio::test]
    async fn test_empty_channel_is_distinct_failure() {
        let result = IsolatedExecutor::new().run(Arc::new(Silent), d("1"), d("2")).await;
        assert!(matches!(result, Err(CalcError::IsolatedExecutionFailed(_))));
    }

    #[tokio::test]
    async fn test_panicking_worker_does_not_take_down_caller() {
        let result = IsolatedExecutor::new().run(Arc::new(Crashing), d("1"), d("2")).await;
        assert!(matches!(result, Err(CalcError::IsolatedExecutionFailed(_))));
    }
}

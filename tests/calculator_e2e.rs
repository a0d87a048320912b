//! End-to-end scenarios against the public library surface.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::tempdir;

use decimal_calc::operations::{builtin_catalogue, PluginDescriptor};
use decimal_calc::{CalcError, Dispatcher, ExecutionMode, Ledger, OperationRegistry, PluginLoadError};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(OperationRegistry::discover()))
}

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_session_survives_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runs").join("history.csv");
    let mut calc = dispatcher();

    calc.dispatch("10", "20", "mean", ExecutionMode::Direct).await.unwrap();
    calc.dispatch("1", "3", "divide", ExecutionMode::Isolated).await.unwrap();
    calc.dispatch("0.1", "0.2", "add", ExecutionMode::Direct).await.unwrap();
    calc.dispatch("9", "4", "mode", ExecutionMode::Isolated).await.unwrap();
    assert!(calc.dispatch("1", "0", "divide", ExecutionMode::Direct).await.is_err());

    calc.ledger().save(&path).await.unwrap();

    let mut restored = Ledger::new();
    restored.load(&path).await.unwrap();
    assert_eq!(restored.all(), calc.ledger().all());
    assert_eq!(restored.all()[2].result, d("0.3"));
    assert_eq!(restored.all()[3].result, d("4"));

    // A fresh dispatcher picks up where the old one left off.
    let mut resumed = dispatcher().with_ledger(restored);
    resumed.dispatch("2", "2", "multiply", ExecutionMode::Direct).await.unwrap();
    assert_eq!(resumed.ledger().len(), 5);
    assert_eq!(resumed.ledger().filter("multiply").len(), 1);
}

#[tokio::test]
async fn test_error_outcomes_leave_history_untouched() {
    let mut calc = dispatcher();
    calc.dispatch("5", "5", "add", ExecutionMode::Direct).await.unwrap();

    let cases = [
        ("abc", "20", "add"),
        ("10", "0", "divide"),
        ("10", "20", "zzz"),
        ("10", "20", "ADD"),
    ];
    for (a, b, key) in cases {
        for mode in [ExecutionMode::Direct, ExecutionMode::Isolated] {
            let err = calc.dispatch(a, b, key, mode).await.unwrap_err();
            assert!(err.is_recoverable(), "{}", err);
        }
    }
    assert_eq!(calc.ledger().len(), 1);
}

#[tokio::test]
async fn test_direct_and_isolated_agree() {
    let mut calc = dispatcher();
    let operands = [("3.14159", "2.71828"), ("-100", "0.5"), ("1e2", "7")];

    for key in ["add", "subtract", "multiply", "divide", "mean", "median", "mode"] {
        for (a, b) in operands {
            let direct = calc.dispatch(a, b, key, ExecutionMode::Direct).await.unwrap();
            let isolated = calc.dispatch(a, b, key, ExecutionMode::Isolated).await.unwrap();
            assert_eq!(direct.result, isolated.result, "{} {} {}", a, key, b);
        }
    }
}

#[tokio::test]
async fn test_delete_then_filter() {
    let mut calc = dispatcher();
    for (a, b, key) in [("1", "1", "add"), ("2", "1", "subtract"), ("3", "1", "add"), ("4", "1", "subtract")] {
        calc.dispatch(a, b, key, ExecutionMode::Direct).await.unwrap();
    }

    let removed = calc.ledger_mut().delete(0).unwrap();
    assert_eq!(removed.operation_name, "add");
    assert_eq!(calc.ledger().all()[0].operation_name, "subtract");

    let adds = calc.ledger().filter("add");
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].operand_a, d("3"));

    assert!(matches!(
        calc.ledger_mut().delete(3),
        Err(CalcError::IndexOutOfRange { index: 3, len: 3 })
    ));
}

#[tokio::test]
async fn test_extreme_operands_are_exact_or_refused() {
    let mut calc = dispatcher();

    for mode in [ExecutionMode::Direct, ExecutionMode::Isolated] {
        let outcome = calc
            .dispatch("79228162514264337593543950335", "1", "mean", mode)
            .await
            .unwrap();
        assert_eq!(outcome.result, d("39614081257132168796771975168"));
    }

    let err = calc
        .dispatch("0.123456789012345678901234567890123", "1", "add", ExecutionMode::Direct)
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::InvalidNumber { .. }));
    assert_eq!(calc.ledger().len(), 2);
}

fn refuses() -> Result<Arc<dyn decimal_calc::Operation>, PluginLoadError> {
    Err(PluginLoadError::new("sqrt", "unary operations are not supported"))
}

#[tokio::test]
async fn test_registry_with_broken_plugin_still_dispatches() {
    let mut catalogue: Vec<PluginDescriptor> = builtin_catalogue().to_vec();
    catalogue.insert(2, PluginDescriptor::new("sqrt", refuses));

    let registry = OperationRegistry::from_catalogue(&catalogue);
    assert_eq!(registry.len(), 7);
    assert_eq!(registry.load_failures()[0].plugin, "sqrt");

    let mut calc = Dispatcher::new(Arc::new(registry));
    let outcome = calc.dispatch("6", "3", "divide", ExecutionMode::Direct).await.unwrap();
    assert_eq!(outcome.result, d("2"));
    assert!(matches!(
        calc.dispatch("9", "0", "sqrt", ExecutionMode::Direct).await,
        Err(CalcError::UnknownOperation(_))
    ));
}

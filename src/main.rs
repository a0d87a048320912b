//! `calc`: decimal calculator with plugin operations and a saved history.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

use decimal_calc::repl::{describe, render_table, Repl};
use decimal_calc::utils::init_logging;
use decimal_calc::{AppConfig, CalcError, Dispatcher, ExecutionMode, Ledger, OperationRegistry};

#[derive(Parser)]
#[command(name = "calc", version)]
#[command(about = "Decimal calculator with plugin operations and a saved history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single operation
    Eval {
        #[arg(allow_hyphen_values = true)]
        num1: String,

        #[arg(allow_hyphen_values = true)]
        num2: String,

        operation: String,

        /// Run the operation in an isolated worker
        #[arg(long, visible_alias = "mp", default_value_t = false)]
        isolated: bool,

        /// Print the outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Append the calculation to this history file
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Start the interactive shell
    Repl,

    /// List the available operations
    List,

    /// Show a saved history file
    History {
        /// History file (defaults to CALC_HISTORY_FILE)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only show records of this operation
        #[arg(short, long)]
        operation: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = AppConfig::from_env();
    init_logging(&config.log_level)?;

    info!("Environment mode: {}", config.environment);
    info!("Calculator application launched");

    let cli = Cli::parse();
    let registry = Arc::new(OperationRegistry::discover());
    for failure in registry.load_failures() {
        warn!("Skipped plugin: {}", failure);
    }

    match cli.command {
        Commands::Eval { num1, num2, operation, isolated, json, history } => {
            let mut dispatcher = Dispatcher::new(registry);
            if let Some(path) = &history {
                match dispatcher.ledger_mut().load(path).await {
                    Ok(()) | Err(CalcError::FileNotFound(_)) => {}
                    Err(e) => return fail(e),
                }
            }

            let outcome = match dispatcher
                .dispatch(&num1, &num2, &operation, ExecutionMode::from_flag(isolated))
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => return fail(e),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", describe(&num1, &num2, &outcome));
            }

            if let Some(path) = &history {
                dispatcher.ledger().save(path).await?;
            }
        }
        Commands::Repl => {
            let mut repl = Repl::new(Dispatcher::new(registry), config);
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            repl.run(stdin.lock(), &mut stdout).await?;
        }
        Commands::List => {
            print!("{}", registry.menu());
        }
        Commands::History { file, operation } => {
            let path = file.unwrap_or(config.history_file);
            let mut ledger = Ledger::new();
            if let Err(e) = ledger.load(&path).await {
                return fail(e);
            }

            let rows = match &operation {
                Some(op) => ledger.filter_indexed(op),
                None => ledger.all().iter().enumerate().collect(),
            };
            if rows.is_empty() {
                println!("No history available.");
            } else {
                print!("{}", render_table(rows.into_iter()));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn fail(e: CalcError) -> Result<ExitCode> {
    report_failure(e, &mut std::io::stderr()).map(ExitCode::from)
}

/// Recoverable errors become a message on `err` and exit status 1;
/// anything else is fatal.
fn report_failure<W: Write>(e: CalcError, err: &mut W) -> Result<u8> {
    if e.is_recoverable() {
        writeln!(err, "{}", e)?;
        Ok(1)
    } else {
        Err(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_failure_sets_exit_status() {
        let mut err = Vec::new();
        let status = report_failure(CalcError::InvalidNumber { input: "abc".into() }, &mut err).unwrap();

        assert_eq!(status, 1);
        assert_eq!(String::from_utf8(err).unwrap(), "Invalid number: 'abc'\n");
    }

    #[test]
    fn test_storage_fault_propagates() {
        let mut err = Vec::new();
        let result = report_failure(CalcError::Io(std::io::Error::other("disk gone")), &mut err);

        assert!(result.is_err());
        assert!(err.is_empty());
    }

    #[test]
    fn test_eval_arguments() {
        let cli = Cli::try_parse_from(["calc", "eval", "-5", "2", "add", "--mp"]).unwrap();
        match cli.command {
            Commands::Eval { num1, isolated, .. } => {
                assert_eq!(num1, "-5");
                assert!(isolated);
            }
            _ => panic!("expected eval"),
        }
    }
}

//! Interactive shell over a `Dispatcher`.
//!
//! Every recoverable error is printed and the loop keeps going.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, ExecutionMode, Outcome};
use crate::error::CalcError;
use crate::history::CalculationRecord;

pub const USAGE: &str = "Format: <operation> <num1> <num2> [mp]";

/// One parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Exit,
    Menu,
    History,
    ClearHistory,
    SaveHistory(Option<PathBuf>),
    LoadHistory(Option<PathBuf>),
    DeleteHistory(i64),
    FilterWithOperation(String),
    Calculate {
        operation: String,
        num1: String,
        num2: String,
        mode: ExecutionMode,
    },
}

impl ReplCommand {
    /// Parse a line. Keywords are case-insensitive; operation keys are not.
    /// The error is a message meant for the user.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(ReplCommand::Empty);
        };
        let rest: Vec<&str> = parts.collect();
        let optional_path = || (!rest.is_empty()).then(|| PathBuf::from(rest.join(" ")));

        match head.to_lowercase().as_str() {
            "exit" | "quit" => Ok(ReplCommand::Exit),
            "menu" => Ok(ReplCommand::Menu),
            "history" => Ok(ReplCommand::History),
            "clear_history" => Ok(ReplCommand::ClearHistory),
            "save_history" => Ok(ReplCommand::SaveHistory(optional_path())),
            "load_history" => Ok(ReplCommand::LoadHistory(optional_path())),
            "delete_history" => match rest.as_slice() {
                [idx] => idx
                    .parse::<i64>()
                    .map(ReplCommand::DeleteHistory)
                    .map_err(|_| format!("Invalid index: {}", idx)),
                _ => Err("Usage: delete_history <index>".to_string()),
            },
            "filter_with_operation" => match rest.as_slice() {
                [op] => Ok(ReplCommand::FilterWithOperation(op.to_string())),
                _ => Err("Usage: filter_with_operation <operation>".to_string()),
            },
            _ => match rest.as_slice() {
                [num1, num2] => Ok(ReplCommand::Calculate {
                    operation: head.to_string(),
                    num1: num1.to_string(),
                    num2: num2.to_string(),
                    mode: ExecutionMode::Direct,
                }),
                [num1, num2, flag] if flag.eq_ignore_ascii_case("mp") => Ok(ReplCommand::Calculate {
                    operation: head.to_string(),
                    num1: num1.to_string(),
                    num2: num2.to_string(),
                    mode: ExecutionMode::Isolated,
                }),
                _ => Err(USAGE.to_string()),
            },
        }
    }
}

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    dispatcher: Dispatcher,
    config: AppConfig,
}

impl Repl {
    pub fn new(dispatcher: Dispatcher, config: AppConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Read lines from `input` until `exit` or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> std::io::Result<()> {
        info!("Starting REPL");
        writeln!(out, "Calculator REPL started. Type 'exit' to leave.")?;
        writeln!(out, "Append 'mp' to run an operation in an isolated worker.")?;

        loop {
            write!(out, ">> ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            if self.handle_line(&line, out).await? == Flow::Exit {
                break;
            }
        }

        info!("REPL closed");
        Ok(())
    }

    /// Execute one line of input, writing any user-facing output to `out`.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> std::io::Result<Flow> {
        let command = match ReplCommand::parse(line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{}", message)?;
                return Ok(Flow::Continue);
            }
        };
        debug!("REPL command: {:?}", command);

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Exit => {
                writeln!(out, "Closing REPL.")?;
                return Ok(Flow::Exit);
            }
            ReplCommand::Menu => {
                write!(out, "{}", self.dispatcher.registry().menu())?;
            }
            ReplCommand::History => {
                let ledger = self.dispatcher.ledger();
                if ledger.is_empty() {
                    writeln!(out, "No history available.")?;
                } else {
                    write!(out, "{}", render_table(ledger.all().iter().enumerate()))?;
                }
            }
            ReplCommand::ClearHistory => {
                self.dispatcher.ledger_mut().clear();
                writeln!(out, "History cleared.")?;
            }
            ReplCommand::SaveHistory(path) => {
                let path = path.unwrap_or_else(|| self.config.history_file.clone());
                match self.dispatcher.ledger().save(&path).await {
                    Ok(()) => writeln!(out, "History saved to {}", path.display())?,
                    Err(e) => report(out, &e)?,
                }
            }
            ReplCommand::LoadHistory(path) => {
                let path = path.unwrap_or_else(|| self.config.history_file.clone());
                match self.dispatcher.ledger_mut().load(&path).await {
                    Ok(()) => writeln!(out, "History loaded from {}", path.display())?,
                    Err(e) => report(out, &e)?,
                }
            }
            ReplCommand::DeleteHistory(index) => {
                let ledger = self.dispatcher.ledger_mut();
                let len = ledger.len();
                let result = usize::try_from(index)
                    .map_err(|_| CalcError::IndexOutOfRange { index, len })
                    .and_then(|i| ledger.delete(i));
                match result {
                    Ok(_) => writeln!(out, "Deleted calculation at index {}.", index)?,
                    Err(e) => report(out, &e)?,
                }
            }
            ReplCommand::FilterWithOperation(operation) => {
                let rows = self.dispatcher.ledger().filter_indexed(&operation);
                if rows.is_empty() {
                    writeln!(out, "No entries found for operation '{}'.", operation)?;
                } else {
                    write!(out, "{}", render_table(rows.into_iter()))?;
                }
            }
            ReplCommand::Calculate { operation, num1, num2, mode } => {
                match self.dispatcher.dispatch(&num1, &num2, &operation, mode).await {
                    Ok(outcome) => writeln!(out, "{}", describe(&num1, &num2, &outcome))?,
                    Err(e) => report(out, &e)?,
                }
            }
        }

        Ok(Flow::Continue)
    }
}

/// `10 mean 20 = 15`, tagged when it ran isolated
pub fn describe(num1: &str, num2: &str, outcome: &Outcome) -> String {
    match outcome.mode {
        ExecutionMode::Direct => format!("{} {} {} = {}", num1, outcome.operation, num2, outcome.result),
        ExecutionMode::Isolated => format!(
            "{} {} {} (isolated) = {}",
            num1, outcome.operation, num2, outcome.result
        ),
    }
}

fn report<W: Write>(out: &mut W, e: &CalcError) -> std::io::Result<()> {
    if e.is_recoverable() {
        debug!("Recoverable error: {}", e);
    } else {
        error!("{}", e);
    }
    writeln!(out, "{}", e)
}

/// Render rows as an aligned table with their ledger indices.
pub fn render_table<'a>(rows: impl Iterator<Item = (usize, &'a CalculationRecord)>) -> String {
    let header = ["", "operation", "num1", "num2", "result"];
    let mut cells: Vec<[String; 5]> = vec![header.map(String::from)];
    cells.extend(rows.map(|(i, r)| {
        [
            i.to_string(),
            r.operation_name.clone(),
            r.operand_a.to_string(),
            r.operand_b.to_string(),
            r.result.to_string(),
        ]
    }));

    let mut widths = [0usize; 5];
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = w))
            .collect();
        table.push_str(line.join("  ").trim_end());
        table.push('\n');
    }
    table
}

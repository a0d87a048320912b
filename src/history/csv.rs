//! CSV encoding of the calculation history.
//!
//! Format: UTF-8, header `operation,num1,num2,result`, one row per record.
//! Numbers are written in plain decimal text and read back with an exact
//! decimal parse, so a save/load cycle is lossless.

use super::CalculationRecord;
use crate::error::{CalcError, CalcResult};
use crate::operations::parse_decimal;

pub const HEADER: [&str; 4] = ["operation", "num1", "num2", "result"];

pub fn encode(records: &[CalculationRecord]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');

    for record in records {
        let row = [
            escape(&record.operation_name),
            record.operand_a.to_string(),
            record.operand_b.to_string(),
            record.result.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn decode(text: &str) -> CalcResult<Vec<CalculationRecord>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text).into_iter();

    let (header_line, header) = rows.next().ok_or_else(|| malformed(1, "missing header row"))?;
    if header != HEADER {
        return Err(malformed(
            header_line,
            format!("expected header '{}'", HEADER.join(",")),
        ));
    }

    let mut records = Vec::new();
    for (line, fields) in rows {
        if fields.len() == 1 && fields[0].trim().is_empty() {
            continue;
        }
        if fields.len() != HEADER.len() {
            return Err(malformed(
                line,
                format!("expected {} fields, found {}", HEADER.len(), fields.len()),
            ));
        }

        let number = |idx: usize| {
            parse_decimal(&fields[idx])
                .map_err(|_| malformed(line, format!("'{}' is not a decimal number", fields[idx])))
        };

        records.push(CalculationRecord {
            operation_name: fields[0].clone(),
            operand_a: number(1)?,
            operand_b: number(2)?,
            result: number(3)?,
        });
    }
    Ok(records)
}

fn malformed(line: usize, reason: impl Into<String>) -> CalcError {
    CalcError::MalformedHistory { line, reason: reason.into() }
}

/// Split text into rows of fields, tagging each row with its 1-based
/// starting line. Quoted fields may span lines.
fn split_rows(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                rows.push((row_start, std::mem::take(&mut fields)));
                line += 1;
                row_start = line;
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push((row_start, fields));
    }
    rows
}

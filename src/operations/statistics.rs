//! Two-sample statistical operations

use rust_decimal::Decimal;

use super::Operation;
use crate::error::{CalcError, CalcResult};

/// `(a + b) / 2`, falling back to `a + (b - a) / 2` when the sum leaves the
/// decimal range. The sum only overflows for operands of equal sign, and
/// then their difference always fits.
fn midpoint(operation: &str, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
    a.checked_add(b)
        .and_then(|sum| sum.checked_div(Decimal::TWO))
        .or_else(|| {
            b.checked_sub(a)
                .and_then(|diff| diff.checked_div(Decimal::TWO))
                .and_then(|half| a.checked_add(half))
        })
        .ok_or_else(|| CalcError::Overflow { operation: operation.to_string() })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Mean;

impl Operation for Mean {
    fn name(&self) -> &str { "mean" }

    fn description(&self) -> &str { "Arithmetic mean of two numbers" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        midpoint(self.name(), a, b)
    }
}

/// With two samples the median is the midpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct Median;

impl Operation for Median {
    fn name(&self) -> &str { "median" }

    fn description(&self) -> &str { "Median of two numbers" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        midpoint(self.name(), a, b)
    }
}

/// Mode of two samples.
///
/// Two equal values have a mode; two different values have none, so the
/// smaller one is returned as a tie-break.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mode;

impl Operation for Mode {
    fn name(&self) -> &str { "mode" }

    fn description(&self) -> &str { "Mode of two numbers (smaller value on a tie)" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if a == b {
            Ok(a)
        } else {
            Ok(a.min(b))
        }
    }
}

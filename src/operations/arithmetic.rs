//! Basic arithmetic operations

use rust_decimal::Decimal;

use super::Operation;
use crate::error::{CalcError, CalcResult};

fn overflow(operation: &str) -> CalcError {
    CalcError::Overflow { operation: operation.to_string() }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Add;

impl Operation for Add {
    fn name(&self) -> &str { "add" }

    fn description(&self) -> &str { "Sum of two numbers" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_add(b).ok_or_else(|| overflow(self.name()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Subtract;

impl Operation for Subtract {
    fn name(&self) -> &str { "subtract" }

    fn description(&self) -> &str { "Second number subtracted from the first" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_sub(b).ok_or_else(|| overflow(self.name()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Multiply;

impl Operation for Multiply {
    fn name(&self) -> &str { "multiply" }

    fn description(&self) -> &str { "Product of two numbers" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_mul(b).ok_or_else(|| overflow(self.name()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Divide;

impl Operation for Divide {
    fn name(&self) -> &str { "divide" }

    fn description(&self) -> &str { "First number divided by the second" }

    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b.is_zero() {
            return Err(CalcError::DivisionByZero);
        }
        a.checked_div(b).ok_or_else(|| overflow(self.name()))
    }
}

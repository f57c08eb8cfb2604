//! Integer math node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::NodeError;

/// Binary operation over two integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathOperation {
    #[default]
    Min,
    Max,
    Add,
    Subtract,
    Multiply,
    /// Floor division; dividing by zero yields 0.
    Divide,
}

impl MathOperation {
    pub const ALL: [MathOperation; 6] = [
        MathOperation::Min,
        MathOperation::Max,
        MathOperation::Add,
        MathOperation::Subtract,
        MathOperation::Multiply,
        MathOperation::Divide,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            MathOperation::Min => "min",
            MathOperation::Max => "max",
            MathOperation::Add => "add",
            MathOperation::Subtract => "subtract",
            MathOperation::Multiply => "multiply",
            MathOperation::Divide => "divide",
        }
    }

    /// Apply the operation. Results saturate at the `i64` bounds.
    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            MathOperation::Min => a.min(b),
            MathOperation::Max => a.max(b),
            MathOperation::Add => a.saturating_add(b),
            MathOperation::Subtract => a.saturating_sub(b),
            MathOperation::Multiply => a.saturating_mul(b),
            MathOperation::Divide => floor_div(a, b),
        }
    }
}

/// Division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    if b == 0 {
        return 0;
    }
    let quotient = a.saturating_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

impl FromStr for MathOperation {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MathOperation::ALL
            .into_iter()
            .find(|op| op.keyword() == s)
            .ok_or_else(|| NodeError::invalid(format!("unknown math operation '{s}'")))
    }
}

impl fmt::Display for MathOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

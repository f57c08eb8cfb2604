//! Inclusive number range node.

use serde::{Deserialize, Serialize};

use crate::buffer::{NodeError, NodeResult};

/// Largest magnitude accepted for `start` and `end`.
pub const RANGE_LIMIT: i64 = 100_000;

/// Parameters of the number range node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeParams {
    pub start: i64,
    /// Inclusive upper bound
    pub end: i64,
    /// Positive stride
    pub step: i64,
}

impl Default for RangeParams {
    fn default() -> Self {
        Self {
            start: 1,
            end: 10,
            step: 1,
        }
    }
}

/// The same sequence as integers and as floats.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberRange {
    pub ints: Vec<i64>,
    pub floats: Vec<f64>,
}

/// `start, start + step, ...` up to and including `end`.
///
/// An empty range (`start > end`) yields `[start]` so downstream list
/// consumers always get at least one value.
///
/// # Errors
///
/// `NodeError::InvalidArgument` if `step < 1` or `start`/`end` lies outside
/// `-RANGE_LIMIT..=RANGE_LIMIT`.
pub fn number_range(params: &RangeParams) -> NodeResult<NumberRange> {
    let RangeParams { start, end, step } = *params;
    if step < 1 {
        return Err(NodeError::invalid(format!("range step {step} must be at least 1")));
    }
    for (name, value) in [("start", start), ("end", end)] {
        if !(-RANGE_LIMIT..=RANGE_LIMIT).contains(&value) {
            return Err(NodeError::invalid(format!(
                "range {name} {value} outside -{RANGE_LIMIT}..={RANGE_LIMIT}"
            )));
        }
    }

    let stride = usize::try_from(step).unwrap_or(usize::MAX);
    let mut ints: Vec<i64> = (start..=end).step_by(stride).collect();
    if ints.is_empty() {
        ints.push(start);
    }
    let floats = ints.iter().map(|&v| v as f64).collect();

    Ok(NumberRange { ints, floats })
}

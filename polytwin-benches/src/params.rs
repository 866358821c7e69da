//! Benchmark parameter types.
//!
//! Each struct renders as the `BenchmarkId` parameter so reports group runs
//! by the knob being varied.

use std::fmt;

/// Parameters for a model-bank fitting run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitBenchParams {
    /// Rows in the synthetic training set.
    pub rows: usize,
    /// Trees per forest.
    pub trees: usize,
}

impl fmt::Display for FitBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows={},trees={}", self.rows, self.trees)
    }
}

/// Parameters for a batch prediction or sweep run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchBenchParams {
    /// Feature vectors per call.
    pub batch: usize,
}

impl fmt::Display for BatchBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch={}", self.batch)
    }
}

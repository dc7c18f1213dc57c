//! Empirical p-values from surrogate correlation diagrams.
//!
//! For each cell, the p-value is the fraction of trials in which the
//! surrogate diagram's magnitude meets or exceeds the real diagram's
//! magnitude. Counts are integers, so trials can be accumulated in any
//! order (or in separate partial accumulators merged later) and the final
//! diagram is the same.

use serde::Serialize;

use crate::error::{DxcError, Result};
use crate::table::{CorrelationDiagram, PValueDiagram, Table};

/// Per-cell exceedance counters for one real diagram shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PValueAccumulator {
    rows: usize,
    cols: usize,
    counts: Vec<u64>,
    trials: u64,
}

impl PValueAccumulator {
    /// Empty accumulator shaped like `real`.
    pub fn new(real: &CorrelationDiagram) -> Self {
        let (rows, cols) = real.shape();
        Self {
            rows,
            cols,
            counts: vec![0; rows * cols],
            trials: 0,
        }
    }

    /// Number of trials accumulated so far.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Raw exceedance count at `(row, col)`.
    pub fn count(&self, row: usize, col: usize) -> u64 {
        self.counts[row * self.cols + col]
    }

    /// Add one trial: count every cell where `|surrogate| >= |real|`.
    ///
    /// Either the whole trial is applied or, on a shape mismatch, nothing.
    pub fn accumulate(
        &mut self,
        real: &CorrelationDiagram,
        surrogate: &CorrelationDiagram,
    ) -> Result<()> {
        real.ensure_shape(self.rows, self.cols)?;
        real.ensure_same_shape(surrogate)?;
        for ((count, r), s) in self
            .counts
            .iter_mut()
            .zip(real.values())
            .zip(surrogate.values())
        {
            if s.abs() >= r.abs() {
                *count += 1;
            }
        }
        self.trials += 1;
        Ok(())
    }

    /// Fold another accumulator for the same shape into this one.
    pub fn merge(&mut self, other: &PValueAccumulator) -> Result<()> {
        if (self.rows, self.cols) != (other.rows, other.cols) {
            return Err(DxcError::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                rows: other.rows,
                cols: other.cols,
            });
        }
        for (c, o) in self.counts.iter_mut().zip(&other.counts) {
            *c += o;
        }
        self.trials += other.trials;
        Ok(())
    }

    /// Divide every count by the number of trials.
    pub fn finalize(&self) -> Result<PValueDiagram> {
        if self.trials == 0 {
            return Err(DxcError::NoTrials);
        }
        let total = self.trials as f64;
        let values = self.counts.iter().map(|&c| c as f64 / total).collect();
        Table::from_vec(self.rows, self.cols, values)
    }
}

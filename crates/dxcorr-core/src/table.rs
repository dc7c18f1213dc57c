//! Rectangular numeric tables.
//!
//! Correlation diagrams and p-value diagrams are both `Table`s: one row per
//! window-width level, one column per window center. The shape travels with
//! the data so consumers never have to infer it from row lengths.

use serde::Serialize;

use crate::error::{DxcError, Result};

/// Row-major table of `rows x cols` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

/// Windowed correlation coefficients, one row per width level.
pub type CorrelationDiagram = Table;

/// Empirical exceedance fractions, same shape as the diagram they test.
pub type PValueDiagram = Table;

impl Table {
    /// A table of the given shape filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }

    /// A table of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Wrap row-major `values`; fails if the length does not match the shape.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(DxcError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: values.len() / cols.max(1),
                cols,
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Build from nested rows. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(DxcError::ShapeMismatch {
                    expected_rows: rows.len(),
                    expected_cols: cols,
                    rows: rows.len(),
                    cols: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    /// If either index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "table index out of bounds");
        self.values[row * self.cols + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.cols + col] = value;
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.values[start..start + self.cols]
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a zero-column table still has `rows` rows.
        (0..self.rows).map(move |r| self.row(r))
    }

    /// All values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Nested copy of the rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// Fail unless this table is `rows x cols`.
    pub fn ensure_shape(&self, rows: usize, cols: usize) -> Result<()> {
        if self.shape() != (rows, cols) {
            return Err(DxcError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Fail unless `other` has exactly this table's shape.
    pub fn ensure_same_shape(&self, other: &Table) -> Result<()> {
        other.ensure_shape(self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_keeps_shape() {
        let t = Table::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.get(1, 2), 6.0);
        assert_eq!(t.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(t.to_rows(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Table::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, DxcError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Table::from_vec(2, 2, vec![0.0; 4]).is_ok());
        assert!(Table::from_vec(2, 2, vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_iter_rows_on_zero_columns() {
        let t = Table::zeros(3, 0);
        assert_eq!(t.iter_rows().count(), 3);
        assert!(t.iter_rows().all(|r| r.is_empty()));
    }

    #[test]
    fn test_ensure_same_shape() {
        let a = Table::zeros(2, 5);
        assert!(a.ensure_same_shape(&Table::filled(2, 5, 1.0)).is_ok());
        assert_eq!(
            a.ensure_same_shape(&Table::zeros(5, 2)).unwrap_err(),
            DxcError::ShapeMismatch {
                expected_rows: 2,
                expected_cols: 5,
                rows: 5,
                cols: 2,
            }
        );
        assert!(a.ensure_shape(2, 5).is_ok());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        Table::zeros(1, 1).get(1, 0);
    }
}

//! Windowed correlation diagrams.
//!
//! A correlation diagram holds the Pearson coefficient between two
//! sequences computed on sliding windows of several widths. Row `w` uses
//! windows of `(w+1)·L` samples; every row shares the same window centers,
//! so the diagram reads as correlation versus time scale and time.
//!
//! With a delay `tau > 0` each cell is the mean of two lagged coefficients
//! (B delayed by `+tau`, then A delayed by `+tau`), which approximates the
//! zero-delay correlation while staying robust to small lags between the
//! sequences.

use crate::error::{DxcError, Result};
use crate::geometry::WindowGeometry;
use crate::table::{CorrelationDiagram, Table};

/// Pearson correlation coefficient of two equal-length slices.
///
/// Returns `0.0` when either slice has zero variance (including slices
/// shorter than two samples). The result is clamped to `[-1, 1]`.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len().min(y.len());
    if n < 2 || is_constant(&x[..n]) || is_constant(&y[..n]) {
        return 0.0;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return 0.0;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

fn is_constant(x: &[f64]) -> bool {
    x.iter().all(|&v| v == x[0])
}

/// Compute the correlation diagram of `a` and `b`.
///
/// The result has `geometry.widths()` rows and
/// `geometry.columns(a.len())` columns.
pub fn compute_diagram(
    a: &[f64],
    b: &[f64],
    geometry: &WindowGeometry,
) -> Result<CorrelationDiagram> {
    if a.len() != b.len() {
        return Err(DxcError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let cols = geometry.columns(a.len())?;
    let tau = geometry.tau();
    let mut diagram = Table::zeros(geometry.widths(), cols);

    for level in 0..geometry.widths() {
        for j in 0..cols {
            let w = geometry.window(level, j);
            let r = if tau > 0 {
                let lagged = w.start + tau..w.end + tau;
                let forward = pearson(&a[w.clone()], &b[lagged.clone()]);
                let backward = pearson(&a[lagged], &b[w]);
                0.5 * (forward + backward)
            } else {
                pearson(&a[w.clone()], &b[w])
            };
            diagram.set(level, j, r);
        }
    }

    Ok(diagram)
}

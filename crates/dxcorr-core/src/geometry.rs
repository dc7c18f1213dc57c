//! Window geometry for correlation diagrams.
//!
//! A diagram with base width `L` and `W` width levels uses windows of
//! `L, 2L, ..., W·L` samples. All levels share one grid of window centers,
//! starting at `L·W/2 - 1` and stepping by `L`, so that the widest window
//! at the first center starts at sample 0.

use serde::Serialize;

use crate::error::{DxcError, Result};

/// Validated window geometry. The base width is always even and non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowGeometry {
    base_width: usize,
    widths: usize,
    tau: usize,
}

impl WindowGeometry {
    /// Validate and normalize a geometry.
    ///
    /// An odd `base_width` is reduced by one (with a warning) so that every
    /// window has an integral half-width.
    pub fn new(base_width: usize, widths: usize, tau: usize) -> Result<Self> {
        if widths == 0 {
            return Err(DxcError::invalid_geometry(
                "number of window widths must be positive",
            ));
        }
        if base_width == 0 {
            return Err(DxcError::invalid_geometry("base width must be positive"));
        }
        let mut base_width = base_width;
        if base_width % 2 != 0 {
            base_width -= 1;
            log::warn!("window base width was an odd number; it is now reduced to {base_width}");
        }
        if base_width == 0 {
            return Err(DxcError::invalid_geometry(
                "base width of 1 cannot be reduced to an even width",
            ));
        }
        if base_width.checked_mul(widths).is_none() {
            return Err(DxcError::invalid_geometry(format!(
                "base width {base_width} x {widths} widths overflows"
            )));
        }
        Ok(Self {
            base_width,
            widths,
            tau,
        })
    }

    /// Base width `L` (even).
    pub fn base_width(&self) -> usize {
        self.base_width
    }

    /// Number of width levels `W`.
    pub fn widths(&self) -> usize {
        self.widths
    }

    /// Symmetric delay; zero disables delay averaging.
    pub fn tau(&self) -> usize {
        self.tau
    }

    /// Window width at level `level` (0-based): `L·(level+1)`.
    pub fn width(&self, level: usize) -> usize {
        self.base_width * (level + 1)
    }

    /// Widest window, `L·W`. Never overflows: `new` rejects such geometries.
    pub fn max_width(&self) -> usize {
        self.base_width * self.widths
    }

    /// Number of window centers `K = floor((N - L·W)/L) - tau` for a
    /// sequence of length `n`. Fails when `K < 1`.
    pub fn columns(&self, n: usize) -> Result<usize> {
        let empty = || DxcError::EmptyDiagram {
            length: n,
            base_width: self.base_width,
            widths: self.widths,
            tau: self.tau,
        };
        let span = n.checked_sub(self.max_width()).ok_or_else(empty)?;
        let k = (span / self.base_width)
            .checked_sub(self.tau)
            .ok_or_else(empty)?;
        if k == 0 {
            return Err(empty());
        }
        Ok(k)
    }

    /// Sample index of the `index`-th window center.
    pub fn center(&self, index: usize) -> usize {
        self.max_width() / 2 - 1 + index * self.base_width
    }

    /// Half-open sample range of the window at `level` around center `index`.
    pub fn window(&self, level: usize, index: usize) -> std::ops::Range<usize> {
        let half = self.width(level) / 2;
        let start = self.center(index) + 1 - half;
        start..start + self.width(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_base_width_is_reduced() {
        let g = WindowGeometry::new(11, 3, 0).unwrap();
        assert_eq!(g.base_width(), 10);
    }

    #[test]
    fn test_rejects_degenerate_parameters() {
        assert!(WindowGeometry::new(0, 3, 0).is_err());
        assert!(WindowGeometry::new(10, 0, 0).is_err());
        assert!(WindowGeometry::new(1, 3, 0).is_err());
    }

    #[test]
    fn test_rejects_overflowing_widest_window() {
        let err = WindowGeometry::new(2, 1 << 63, 0).unwrap_err();
        assert!(matches!(err, DxcError::InvalidGeometry { .. }));
        assert!(WindowGeometry::new(usize::MAX - 1, 2, 0).is_err());

        let g = WindowGeometry::new(2, usize::MAX / 2, 0).unwrap();
        assert_eq!(g.max_width(), usize::MAX - 1);
        assert!(matches!(g.columns(100), Err(DxcError::EmptyDiagram { .. })));
    }

    #[test]
    fn test_columns_formula() {
        let g = WindowGeometry::new(10, 3, 0).unwrap();
        assert_eq!(g.columns(100).unwrap(), 7);
        assert_eq!(g.columns(109).unwrap(), 7);
        assert_eq!(g.columns(110).unwrap(), 8);

        let g = WindowGeometry::new(20, 2, 0).unwrap();
        assert_eq!(g.columns(500).unwrap(), 23);

        let g = WindowGeometry::new(10, 3, 2).unwrap();
        assert_eq!(g.columns(100).unwrap(), 5);
    }

    #[test]
    fn test_columns_rejects_short_sequences() {
        let g = WindowGeometry::new(10, 3, 0).unwrap();
        assert!(matches!(g.columns(29), Err(DxcError::EmptyDiagram { .. })));
        assert!(matches!(g.columns(39), Err(DxcError::EmptyDiagram { .. })));
        assert_eq!(g.columns(40).unwrap(), 1);

        let g = WindowGeometry::new(10, 3, 7).unwrap();
        assert!(g.columns(100).is_err());
    }

    #[test]
    fn test_windows_stay_in_range() {
        let g = WindowGeometry::new(10, 3, 0).unwrap();
        let k = g.columns(100).unwrap();
        // Widest window at the first center starts at 0.
        assert_eq!(g.window(2, 0), 0..30);
        assert_eq!(g.window(0, 0), 10..20);
        for level in 0..g.widths() {
            for j in 0..k {
                let w = g.window(level, j);
                assert_eq!(w.len(), g.width(level));
                assert!(w.end <= 100);
            }
        }
    }

    #[test]
    fn test_every_level_shares_centers() {
        let g = WindowGeometry::new(4, 4, 0).unwrap();
        for j in 0..5 {
            let mids: Vec<usize> = (0..4)
                .map(|level| {
                    let w = g.window(level, j);
                    w.start + w.len() / 2
                })
                .collect();
            assert!(mids.windows(2).all(|m| m[0] == m[1]));
        }
    }
}

//! # dxcorr-core
//!
//! **Correlation versus time scale and time, with a significance map.**
//!
//! `dxcorr-core` computes, for two equal-length time series, a correlation
//! diagram (Pearson coefficients on sliding windows of several widths) and
//! an empirical p-value diagram that tests each cell against surrogate
//! sequences sharing the originals' value distribution and power spectrum.
//!
//! ## Quick Start
//!
//! ```
//! use dxcorr_core::{AnalysisConfig, PairAnalysis, SeedSchedule, WindowGeometry};
//!
//! let a: Vec<f64> = (0..200).map(|i| (i as f64 * 0.3).sin()).collect();
//! let b: Vec<f64> = (0..200).map(|i| (i as f64 * 0.3 + 0.2).sin()).collect();
//!
//! // Base width 10, three width levels (10, 20, 30 samples), no delay.
//! let geometry = WindowGeometry::new(10, 3, 0).unwrap();
//! let config = AnalysisConfig {
//!     surrogates: 20,
//!     seeds: SeedSchedule::new(42),
//!     ..AnalysisConfig::new(geometry)
//! };
//!
//! let analysis = PairAnalysis::new(&a, &b, config).unwrap();
//! assert_eq!(analysis.correlation_diagram().shape(), (3, 17));
//!
//! let pvalues = analysis.pvalue_diagram().unwrap();
//! assert!(pvalues.values().iter().all(|p| (0.0..=1.0).contains(p)));
//! ```
//!
//! ## Architecture
//!
//! Sequences → real diagram → surrogate contexts → M trials → p-values
//!
//! - [`correlation`]: the windowed correlation engine.
//! - [`surrogate`]: IAAFT surrogates built from a shared [`SurrogateContext`].
//! - [`significance`]: exceedance counting and normalization.
//! - [`pipeline`]: sequential or rayon-parallel orchestration of the trials.
//!
//! The core performs no I/O. Loading matrices and writing tables is left to
//! the caller (see the `dxcorr` CLI).

pub mod correlation;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod seed;
pub mod significance;
pub mod surrogate;
pub mod table;

pub use correlation::{compute_diagram, pearson};
pub use error::{DxcError, Result};
pub use geometry::WindowGeometry;
pub use pipeline::{
    AnalysisConfig, DEFAULT_SURROGATES, DiagramKind, Execution, PairAnalysis, analyze,
    select_pair,
};
pub use seed::{SeedSchedule, Slot};
pub use significance::PValueAccumulator;
pub use surrogate::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, StopReason, SurrogateConfig, SurrogateContext,
    SurrogateOutcome, generate, generate_with_report,
};
pub use table::{CorrelationDiagram, PValueDiagram, Table};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

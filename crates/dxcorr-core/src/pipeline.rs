//! End-to-end analysis of one sequence pair.
//!
//! Flow:
//! 1. Compute the real correlation diagram once
//! 2. Stop there if only the correlation diagram is wanted
//! 3. Build one [`SurrogateContext`] per sequence
//! 4. Run `M` trials: two surrogates, their diagram, one accumulate call
//! 5. Finalize the p-value diagram
//!
//! Trials run either in order on the calling thread or on a rayon
//! work-stealing pool. Every trial produces its own diagram and then takes
//! the accumulator lock once, so a trial's cell updates are never
//! interleaved with another's. Seeds depend only on the trial index, which
//! makes both modes produce the same p-value diagram for the same base seed.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::correlation::compute_diagram;
use crate::error::{DxcError, Result};
use crate::geometry::WindowGeometry;
use crate::seed::SeedSchedule;
use crate::significance::PValueAccumulator;
use crate::surrogate::{SurrogateConfig, SurrogateContext, generate_with_report};
use crate::table::{CorrelationDiagram, PValueDiagram, Table};

/// Default number of surrogate trials.
pub const DEFAULT_SURROGATES: usize = 100;

/// How surrogate trials are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Execution {
    #[default]
    Sequential,
    /// Work-stealing pool; `None` sizes it to the available parallelism.
    Parallel { threads: Option<usize> },
}

/// Which table a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagramKind {
    Correlation,
    PValue,
}

impl DiagramKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correlation => "correlation",
            Self::PValue => "p-value",
        }
    }
}

/// Everything a pair analysis needs besides the data.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    pub geometry: WindowGeometry,
    /// Number of surrogate trials `M`.
    pub surrogates: usize,
    pub execution: Execution,
    pub surrogate: SurrogateConfig,
    pub seeds: SeedSchedule,
}

impl AnalysisConfig {
    /// Defaults for everything but the geometry; seeds come from the clock.
    pub fn new(geometry: WindowGeometry) -> Self {
        Self {
            geometry,
            surrogates: DEFAULT_SURROGATES,
            execution: Execution::Sequential,
            surrogate: SurrogateConfig::default(),
            seeds: SeedSchedule::from_clock(),
        }
    }

    /// Check the settings every analysis uses. The trial count is only
    /// checked by [`AnalysisConfig::validate_trials`].
    pub fn validate(&self) -> Result<()> {
        if let Execution::Parallel { threads: Some(0) } = self.execution {
            return Err(DxcError::WorkerPool(
                "thread count must be positive".to_string(),
            ));
        }
        self.surrogate.validate()
    }

    /// Fail unless at least one surrogate trial is requested.
    pub fn validate_trials(&self) -> Result<()> {
        if self.surrogates == 0 {
            return Err(DxcError::InvalidSurrogateConfig {
                message: "number of surrogates must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Pick two sequences out of a loaded matrix by 0-based index.
///
/// Fails if either index is out of range or the two lengths differ.
pub fn select_pair(
    sequences: &[Vec<f64>],
    index_a: usize,
    index_b: usize,
) -> Result<(&[f64], &[f64])> {
    let available = sequences.len();
    let get = |index: usize| {
        sequences
            .get(index)
            .map(Vec::as_slice)
            .ok_or(DxcError::ColumnOutOfRange { index, available })
    };
    let (a, b) = (get(index_a)?, get(index_b)?);
    if a.len() != b.len() {
        return Err(DxcError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok((a, b))
}

/// A sequence pair with its real correlation diagram.
#[derive(Debug)]
pub struct PairAnalysis<'a> {
    a: &'a [f64],
    b: &'a [f64],
    config: AnalysisConfig,
    real: CorrelationDiagram,
}

impl<'a> PairAnalysis<'a> {
    /// Validate the configuration and compute the real diagram.
    pub fn new(a: &'a [f64], b: &'a [f64], config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let real = compute_diagram(a, b, &config.geometry)?;
        log::info!(
            "correlation diagram: {} widths x {} centers (L={}, tau={})",
            real.rows(),
            real.cols(),
            config.geometry.base_width(),
            config.geometry.tau()
        );
        Ok(Self { a, b, config, real })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The diagram of the original pair.
    pub fn correlation_diagram(&self) -> &CorrelationDiagram {
        &self.real
    }

    /// Consume the analysis, keeping only the real diagram.
    pub fn into_correlation_diagram(self) -> CorrelationDiagram {
        self.real
    }

    /// Run all surrogate trials and return the p-value diagram.
    pub fn pvalue_diagram(&self) -> Result<PValueDiagram> {
        self.config.validate_trials()?;
        let started = Instant::now();
        let ctx_a = SurrogateContext::new(self.a);
        let ctx_b = SurrogateContext::new(self.b);
        let accumulator = Mutex::new(PValueAccumulator::new(&self.real));

        let m = self.config.surrogates;
        match self.config.execution {
            Execution::Sequential => {
                log::info!("running {m} surrogate trials sequentially");
                for trial in 0..m {
                    self.run_trial(trial, &ctx_a, &ctx_b, &accumulator)?;
                }
            }
            Execution::Parallel { threads } => {
                let run = || {
                    (0..m)
                        .into_par_iter()
                        .try_for_each(|trial| self.run_trial(trial, &ctx_a, &ctx_b, &accumulator))
                };
                match threads {
                    Some(n) => {
                        let pool = rayon::ThreadPoolBuilder::new()
                            .num_threads(n)
                            .build()
                            .map_err(|e| DxcError::WorkerPool(e.to_string()))?;
                        log::info!("running {m} surrogate trials on {n} threads");
                        pool.install(run)?;
                    }
                    None => {
                        log::info!(
                            "running {m} surrogate trials on {} threads",
                            rayon::current_num_threads()
                        );
                        run()?;
                    }
                }
            }
        }

        let accumulator = accumulator
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let pvalues = accumulator.finalize()?;
        log::info!(
            "p-value diagram from {} trials in {:.2}s",
            accumulator.trials(),
            started.elapsed().as_secs_f64()
        );
        Ok(pvalues)
    }

    /// One trial: two surrogates, their diagram, one locked accumulate.
    fn run_trial(
        &self,
        trial: usize,
        ctx_a: &SurrogateContext,
        ctx_b: &SurrogateContext,
        accumulator: &Mutex<PValueAccumulator>,
    ) -> Result<()> {
        let (seed_a, seed_b) = self.config.seeds.pair(trial);
        let sa = generate_with_report(ctx_a, &self.config.surrogate, seed_a);
        let sb = generate_with_report(ctx_b, &self.config.surrogate, seed_b);
        log::debug!(
            "trial {trial}: surrogate iterations {}/{} ({:?}/{:?})",
            sa.iterations,
            sb.iterations,
            sa.stop,
            sb.stop
        );
        let diagram = compute_diagram(&sa.values, &sb.values, &self.config.geometry)?;

        accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accumulate(&self.real, &diagram)
    }
}

/// Run one analysis on a loaded matrix and return the requested table.
pub fn analyze(
    sequences: &[Vec<f64>],
    index_a: usize,
    index_b: usize,
    config: AnalysisConfig,
    kind: DiagramKind,
) -> Result<Table> {
    let (a, b) = select_pair(sequences, index_a, index_b)?;
    if kind == DiagramKind::PValue {
        config.validate_trials()?;
    }
    let analysis = PairAnalysis::new(a, b, config)?;
    match kind {
        DiagramKind::Correlation => Ok(analysis.into_correlation_diagram()),
        DiagramKind::PValue => analysis.pvalue_diagram(),
    }
}

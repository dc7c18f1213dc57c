//! Surrogate sequences by iterative amplitude-adjusted Fourier transform.
//!
//! A surrogate keeps the value distribution and the Fourier magnitude
//! spectrum of an original sequence while randomizing its phases, which
//! destroys any genuine coupling with a partner sequence. Generation
//! alternates two projections until they agree:
//!
//! 1. Spectral step: impose the target magnitudes, keep the current phases.
//! 2. Distribution step: rank-order remap onto the sorted original values.
//!
//! The distribution step is applied last, so the returned values are always
//! an exact permutation of the original values.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::Serialize;

use crate::error::{DxcError, Result};

/// Default stopping threshold on the relative spectral error.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Default cap on spectral/distribution iterations per surrogate.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Stopping parameters for [`generate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurrogateConfig {
    /// Stop once the relative spectral error is at or below this value.
    pub tolerance: f64,
    /// Upper bound on iterations.
    pub max_iterations: usize,
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SurrogateConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(DxcError::InvalidSurrogateConfig {
                message: format!("tolerance must be finite and >= 0, got {}", self.tolerance),
            });
        }
        if self.max_iterations == 0 {
            return Err(DxcError::InvalidSurrogateConfig {
                message: "max_iterations must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Target statistics of one original sequence, shared by every trial.
///
/// Holds the sorted values (target distribution), the DFT magnitudes
/// (target spectrum) and the FFT plans for the sequence length. Immutable
/// and `Sync`; build it once per analyzed sequence.
#[derive(Clone)]
pub struct SurrogateContext {
    sorted: Vec<f64>,
    amplitudes: Vec<f64>,
    energy: f64,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for SurrogateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrogateContext")
            .field("len", &self.sorted.len())
            .field("energy", &self.energy)
            .finish_non_exhaustive()
    }
}

impl SurrogateContext {
    /// Capture the sorted values and the magnitude spectrum of `sequence`.
    pub fn new(sequence: &[f64]) -> Self {
        let n = sequence.len();
        let mut planner = FftPlanner::new();
        // Plans are never run on an empty sequence.
        let forward = planner.plan_fft_forward(n.max(1));
        let inverse = planner.plan_fft_inverse(n.max(1));

        let mut sorted = sequence.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut buffer: Vec<Complex<f64>> =
            sequence.iter().map(|&x| Complex::new(x, 0.0)).collect();
        if n > 0 {
            forward.process(&mut buffer);
        }
        let amplitudes: Vec<f64> = buffer.iter().map(|c| c.norm()).collect();
        let energy = amplitudes.iter().map(|a| a * a).sum::<f64>().sqrt();

        Self {
            sorted,
            amplitudes,
            energy,
            forward,
            inverse,
        }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Original values in ascending order.
    pub fn sorted_values(&self) -> &[f64] {
        &self.sorted
    }

    /// DFT magnitudes of the original sequence.
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Relative spectral error of `values` against the target magnitudes:
    /// `‖|X| - A‖₂ / ‖A‖₂`. Zero when the target has no energy.
    ///
    /// `values` must have the context's length.
    pub fn spectral_discrepancy(&self, values: &[f64]) -> f64 {
        if self.energy == 0.0 {
            return 0.0;
        }
        let mut buffer: Vec<Complex<f64>> = values.iter().map(|&x| Complex::new(x, 0.0)).collect();
        let mut scratch = vec![Complex::default(); self.forward.get_inplace_scratch_len()];
        self.forward.process_with_scratch(&mut buffer, &mut scratch);
        self.discrepancy_of(&buffer)
    }

    fn discrepancy_of(&self, spectrum: &[Complex<f64>]) -> f64 {
        if self.energy == 0.0 {
            return 0.0;
        }
        let err: f64 = spectrum
            .iter()
            .zip(&self.amplitudes)
            .map(|(c, &a)| {
                let d = c.norm() - a;
                d * d
            })
            .sum();
        err.sqrt() / self.energy
    }
}

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Spectral error reached the tolerance.
    Tolerance,
    /// The rank ordering stopped changing; further iterations are no-ops.
    FixedPoint,
    /// Iteration cap reached; the last iterate is returned.
    IterationCap,
    /// Nothing to fit (empty or constant sequence).
    Trivial,
}

/// A surrogate together with its convergence diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SurrogateOutcome {
    pub values: Vec<f64>,
    pub iterations: usize,
    pub discrepancy: f64,
    pub stop: StopReason,
}

impl SurrogateOutcome {
    /// True unless the iteration cap cut the fit short.
    pub fn converged(&self) -> bool {
        self.stop != StopReason::IterationCap
    }
}

/// Generate one surrogate of the context's sequence.
///
/// Identical `(context, config, seed)` always yields the same sequence.
pub fn generate(context: &SurrogateContext, config: &SurrogateConfig, seed: u64) -> Vec<f64> {
    generate_with_report(context, config, seed).values
}

/// Like [`generate`], also reporting iterations and final spectral error.
pub fn generate_with_report(
    context: &SurrogateContext,
    config: &SurrogateConfig,
    seed: u64,
) -> SurrogateOutcome {
    let n = context.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current = context.sorted.clone();
    current.shuffle(&mut rng);

    if n == 0 || context.energy == 0.0 {
        return SurrogateOutcome {
            values: current,
            iterations: 0,
            discrepancy: 0.0,
            stop: StopReason::Trivial,
        };
    }

    let scratch_len = context
        .forward
        .get_inplace_scratch_len()
        .max(context.inverse.get_inplace_scratch_len());
    let mut scratch = vec![Complex::default(); scratch_len];
    let mut spectrum: Vec<Complex<f64>> = current.iter().map(|&x| Complex::new(x, 0.0)).collect();
    context
        .forward
        .process_with_scratch(&mut spectrum, &mut scratch);

    let mut order: Vec<usize> = (0..n).collect();
    let mut previous: Vec<usize> = Vec::new();
    let mut discrepancy = context.discrepancy_of(&spectrum);
    let mut iterations = 0;
    let mut stop = StopReason::IterationCap;

    while iterations < config.max_iterations {
        iterations += 1;

        // Spectral step.
        for (c, &a) in spectrum.iter_mut().zip(&context.amplitudes) {
            let norm = c.norm();
            *c = if norm > 0.0 {
                *c * (a / norm)
            } else {
                Complex::new(a, 0.0)
            };
        }
        context
            .inverse
            .process_with_scratch(&mut spectrum, &mut scratch);
        let scale = 1.0 / n as f64;
        let shaped: Vec<f64> = spectrum.iter().map(|c| c.re * scale).collect();

        // Distribution step.
        order.sort_by(|&i, &j| shaped[i].total_cmp(&shaped[j]).then(i.cmp(&j)));
        for (rank, &idx) in order.iter().enumerate() {
            current[idx] = context.sorted[rank];
        }

        for (c, &x) in spectrum.iter_mut().zip(&current) {
            *c = Complex::new(x, 0.0);
        }
        context
            .forward
            .process_with_scratch(&mut spectrum, &mut scratch);
        discrepancy = context.discrepancy_of(&spectrum);

        if discrepancy <= config.tolerance {
            stop = StopReason::Tolerance;
            break;
        }
        if order == previous {
            stop = StopReason::FixedPoint;
            break;
        }
        previous.clone_from(&order);
    }

    if stop == StopReason::IterationCap {
        log::debug!(
            "surrogate seed {seed}: no convergence after {iterations} iterations \
             (spectral error {discrepancy:.3e})"
        );
    }

    SurrogateOutcome {
        values: current,
        iterations,
        discrepancy,
        stop,
    }
}

//! Power-iteration bound on the operator norm.
//!
//! Solvers step with sizes proportional to `1/‖A‖²`, so the bound reported
//! here is the dominant eigenvalue of `AᴴA`, i.e. the squared spectral
//! norm. Iteration happens in whichever space is smaller: image space
//! (`AᴴA`) when there are more visibilities than pixels, measurement space
//! (`AAᴴ`) otherwise. Both share the same nonzero spectrum.

use num_complex::Complex64;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    operator::{MeasurementOperator, Sample, euclidean_norm},
};

pub const DEFAULT_SEED: u64 = 51;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerIterationOptions {
    pub max_iter: usize,
    /// Stop once `|bound - previous| / previous` between two successive
    /// passes falls to this value.
    pub rel_tol: f64,
    pub seed: u64,
}

impl Default for PowerIterationOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            rel_tol: 1e-3,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerIterationResult {
    /// Estimate of `‖A‖²`.
    pub bound: f64,
    /// Applications of `AᴴA` (or `AAᴴ`) performed.
    pub iterations: usize,
    /// `false` when `max_iter` ran out first; `bound` is then best-effort.
    pub converged: bool,
}

impl PowerIterationResult {
    /// Estimate of the largest singular value `‖A‖`.
    pub fn singular_value(&self) -> f64 {
        self.bound.max(0.0).sqrt()
    }
}

pub fn estimate_spectral_norm<A: MeasurementOperator + ?Sized>(
    op: &mut A,
    opts: &PowerIterationOptions,
) -> Result<PowerIterationResult> {
    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
    let mut x = vec![A::Input::default(); op.input_len()];
    let mut y = vec![Complex64::ZERO; op.output_len()];

    let image_space = op.output_len() > op.input_len();
    log::debug!(
        "power iteration in {} space: image_len={} measurement_len={} max_iter={} rel_tol={}",
        if image_space { "image" } else { "measurement" },
        op.input_len(),
        op.output_len(),
        opts.max_iter,
        opts.rel_tol
    );

    if image_space {
        randomize_unit(&mut x, &mut rng);
    } else {
        randomize_unit(&mut y, &mut rng);
    }

    // estimate from the previous pass; `None` until one pass has run
    let mut previous: Option<f64> = None;
    let mut bound = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iter {
        bound = if image_space {
            op.apply(&x, &mut y)?;
            op.apply_adjoint(&y, &mut x)?;
            euclidean_norm(&x)
        } else {
            op.apply_adjoint(&y, &mut x)?;
            op.apply(&x, &mut y)?;
            euclidean_norm(&y)
        };
        iterations += 1;

        if !(bound > 0.0) {
            // the start vector lies in the null space (or the operator is zero)
            log::debug!("power iteration collapsed to bound {bound:.3e} after {iterations} passes");
            converged = bound == 0.0;
            break;
        }

        if let Some(norm) = previous {
            let rel = ((bound - norm) / norm).abs();
            log::trace!("power iteration {iterations}: bound={bound:.6e} rel_change={rel:.3e}");
            if rel <= opts.rel_tol {
                converged = true;
                break;
            }
        } else {
            log::trace!("power iteration {iterations}: bound={bound:.6e}");
        }

        previous = Some(bound);
        if image_space {
            rescale(&mut x, 1.0 / bound);
        } else {
            rescale(&mut y, 1.0 / bound);
        }
    }

    if !converged {
        log::warn!(
            "power iteration did not converge within {} iterations; bound {bound:.6e} may be loose",
            opts.max_iter
        );
    }

    Ok(PowerIterationResult {
        bound,
        iterations,
        converged,
    })
}

fn randomize_unit<S: Sample>(values: &mut [S], rng: &mut ChaCha8Rng) {
    for value in values.iter_mut() {
        *value = S::standard_normal(rng);
    }
    let norm = euclidean_norm(values);
    if norm > 0.0 {
        rescale(values, 1.0 / norm);
    }
}

fn rescale<S: Sample>(values: &mut [S], factor: f64) {
    for value in values.iter_mut() {
        *value = value.scaled(factor);
    }
}

#![cfg(test)]

use num_complex::Complex64;

use super::error::Result;
use super::operator::{MeasurementOperator, Sample};
use super::spectral_norm::{PowerIterationOptions, estimate_spectral_norm};

/// `y = D x` padded with `extra_rows` zero measurements.
struct DiagonalOp<S> {
    diag: Vec<f64>,
    extra_rows: usize,
    _domain: std::marker::PhantomData<S>,
}

impl<S> DiagonalOp<S> {
    fn new(diag: &[f64], extra_rows: usize) -> Self {
        Self {
            diag: diag.to_vec(),
            extra_rows,
            _domain: std::marker::PhantomData,
        }
    }
}

impl MeasurementOperator for DiagonalOp<Complex64> {
    type Input = Complex64;

    fn input_len(&self) -> usize {
        self.diag.len()
    }

    fn output_len(&self) -> usize {
        self.diag.len() + self.extra_rows
    }

    fn apply(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        output.fill(Complex64::ZERO);
        for ((out, x), d) in output.iter_mut().zip(input).zip(&self.diag) {
            *out = x * d;
        }
        Ok(())
    }

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        for ((out, y), d) in output.iter_mut().zip(input).zip(&self.diag) {
            *out = y * d;
        }
        Ok(())
    }
}

impl MeasurementOperator for DiagonalOp<f64> {
    type Input = f64;

    fn input_len(&self) -> usize {
        self.diag.len()
    }

    fn output_len(&self) -> usize {
        self.diag.len() + self.extra_rows
    }

    fn apply(&mut self, input: &[f64], output: &mut [Complex64]) -> Result<()> {
        output.fill(Complex64::ZERO);
        for ((out, x), d) in output.iter_mut().zip(input).zip(&self.diag) {
            *out = Complex64::new(x * d, 0.0);
        }
        Ok(())
    }

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [f64]) -> Result<()> {
        for ((out, y), d) in output.iter_mut().zip(input).zip(&self.diag) {
            *out = y.re * d;
        }
        Ok(())
    }
}

const DIAG: [f64; 8] = [0.5, 3.0, 1.0, 2.0, 0.25, 1.5, 0.75, 1.25];

fn scaled_diag(factor: f64) -> Vec<f64> {
    DIAG.iter().map(|d| d * factor).collect()
}

/// Diagonal operator whose gain halves on every forward application, so
/// successive estimates fall instead of rising.
struct FadingOp {
    gain: f64,
}

impl MeasurementOperator for FadingOp {
    type Input = Complex64;

    fn input_len(&self) -> usize {
        DIAG.len()
    }

    fn output_len(&self) -> usize {
        DIAG.len()
    }

    fn apply(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        for ((out, x), d) in output.iter_mut().zip(input).zip(&DIAG) {
            *out = x * (d * self.gain);
        }
        self.gain *= 0.5;
        Ok(())
    }

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        for ((out, y), d) in output.iter_mut().zip(input).zip(&DIAG) {
            *out = y * d;
        }
        Ok(())
    }
}

fn relative_error(estimate: f64, exact: f64) -> f64 {
    (estimate - exact).abs() / exact
}

#[test]
fn converges_to_largest_singular_value_for_almost_all_seeds() {
    let mut hits = 0;
    for seed in 0..100 {
        let mut op = DiagonalOp::<Complex64>::new(&DIAG, 0);
        let opts = PowerIterationOptions {
            seed,
            ..PowerIterationOptions::default()
        };
        let result = estimate_spectral_norm(&mut op, &opts).unwrap();
        assert!(result.iterations <= opts.max_iter);
        if result.converged && relative_error(result.singular_value(), 3.0) < 1e-2 {
            hits += 1;
        }
    }
    assert!(hits >= 99, "only {hits}/100 seeds converged to the spectral norm");
}

#[test]
fn small_norm_operators_converge_for_almost_all_seeds() {
    // ‖A‖ = 0.9, so the first pass yields a bound below one
    let diag = scaled_diag(0.3);
    let mut hits = 0;
    for seed in 0..100 {
        let mut op = DiagonalOp::<Complex64>::new(&diag, 0);
        let opts = PowerIterationOptions {
            seed,
            ..PowerIterationOptions::default()
        };
        let result = estimate_spectral_norm(&mut op, &opts).unwrap();
        assert!(result.iterations >= 2, "seed {seed} stopped after one pass");
        if result.converged && relative_error(result.singular_value(), 0.9) < 1e-2 {
            hits += 1;
        }
    }
    assert!(hits >= 99, "only {hits}/100 seeds converged to the spectral norm");
}

#[test]
fn tiny_norm_in_image_space_is_not_cut_short() {
    let diag = scaled_diag(1e-3);
    let mut op = DiagonalOp::<f64>::new(&diag, 4);
    let result = estimate_spectral_norm(&mut op, &PowerIterationOptions::default()).unwrap();
    assert!(result.converged);
    assert!(result.iterations >= 2);
    assert!(relative_error(result.bound, 9e-6) < 2e-2, "bound {}", result.bound);
}

#[test]
fn falling_estimates_do_not_count_as_converged() {
    let mut op = FadingOp { gain: 1.0 };
    let opts = PowerIterationOptions {
        max_iter: 10,
        ..PowerIterationOptions::default()
    };
    let result = estimate_spectral_norm(&mut op, &opts).unwrap();
    assert!(!result.converged);
    assert_eq!(result.iterations, 10);
}

#[test]
fn zero_operator_gives_zero_bound() {
    let mut op = DiagonalOp::<Complex64>::new(&[0.0; 8], 0);
    let result = estimate_spectral_norm(&mut op, &PowerIterationOptions::default()).unwrap();
    assert_eq!(result.bound, 0.0);
    assert_eq!(result.iterations, 1);
    assert!(result.converged);
}

#[test]
fn bound_is_the_squared_norm() {
    let mut op = DiagonalOp::<Complex64>::new(&DIAG, 0);
    let result = estimate_spectral_norm(&mut op, &PowerIterationOptions::default()).unwrap();
    assert!(result.converged);
    assert!(relative_error(result.bound, 9.0) < 2e-2, "bound {}", result.bound);
    assert!(result.bound <= 9.0 * (1.0 + 1e-12));
}

#[test]
fn tall_operator_iterates_in_image_space() {
    let mut op = DiagonalOp::<Complex64>::new(&DIAG, 12);
    assert!(op.output_len() > op.input_len());
    let result = estimate_spectral_norm(&mut op, &PowerIterationOptions::default()).unwrap();
    assert!(result.converged);
    assert!(relative_error(result.singular_value(), 3.0) < 1e-2);
}

#[test]
fn real_domain_operators_are_supported() {
    let mut op = DiagonalOp::<f64>::new(&DIAG, 4);
    let result = estimate_spectral_norm(&mut op, &PowerIterationOptions::default()).unwrap();
    assert!(result.converged);
    assert!(relative_error(result.singular_value(), 3.0) < 1e-2);
}

#[test]
fn exhausted_budget_is_flagged_not_fatal() {
    let mut op = DiagonalOp::<Complex64>::new(&DIAG, 0);
    // a negative tolerance can never be met by a nonzero bound
    let opts = PowerIterationOptions {
        max_iter: 3,
        rel_tol: -1.0,
        ..PowerIterationOptions::default()
    };
    let result = estimate_spectral_norm(&mut op, &opts).unwrap();
    assert!(!result.converged);
    assert_eq!(result.iterations, 3);
    assert!(result.bound > 0.0);
}

#[test]
fn same_seed_gives_identical_estimates() {
    let opts = PowerIterationOptions {
        seed: 1234,
        ..PowerIterationOptions::default()
    };
    let mut a = DiagonalOp::<Complex64>::new(&DIAG, 0);
    let mut b = DiagonalOp::<Complex64>::new(&DIAG, 0);
    let first = estimate_spectral_norm(&mut a, &opts).unwrap();
    let second = estimate_spectral_norm(&mut b, &opts).unwrap();
    assert_eq!(first, second);
}

#[test]
fn standard_normal_samples_have_expected_shape() {
    use rand::SeedableRng;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
    let draws: Vec<Complex64> = (0..4000).map(|_| Complex64::standard_normal(&mut rng)).collect();
    let mean_power = draws.iter().map(|z| Sample::norm_sqr(*z)).sum::<f64>() / draws.len() as f64;
    // E|z|² = 2 for independent unit-variance real and imaginary parts
    assert!((mean_power - 2.0).abs() < 0.2, "mean power {mean_power}");
}

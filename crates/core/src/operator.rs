//! The operator contract consumed by iterative solvers.
//!
//! Every measurement operator maps an image-domain vector (real or
//! complex samples) to a complex visibility vector and provides the
//! matching adjoint. Implementations own whatever scratch space they need,
//! so `apply` takes `&mut self`: one operator value serves one in-flight
//! application at a time.

use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::Result;

/// Scalar type of an operator's image domain.
pub trait Sample: Copy + Default + Send + Sync + std::fmt::Debug + 'static {
    fn norm_sqr(self) -> f64;

    fn scaled(self, factor: f64) -> Self;

    /// Real part of `conj(self) * other`: the contribution of one entry to
    /// the real inner product used for adjoint checks.
    fn real_inner(self, other: Self) -> f64;

    /// Standard normal draw; complex samples get independent real and
    /// imaginary parts.
    fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl Sample for f64 {
    #[inline]
    fn norm_sqr(self) -> f64 {
        self * self
    }

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    #[inline]
    fn real_inner(self, other: Self) -> f64 {
        self * other
    }

    fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl Sample for Complex64 {
    #[inline]
    fn norm_sqr(self) -> f64 {
        Complex64::norm_sqr(&self)
    }

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    #[inline]
    fn real_inner(self, other: Self) -> f64 {
        self.re * other.re + self.im * other.im
    }

    fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        Complex64::new(re, im)
    }
}

pub trait MeasurementOperator {
    type Input: Sample;

    /// Length of the image-domain vector.
    fn input_len(&self) -> usize;

    /// Length of the measurement vector.
    fn output_len(&self) -> usize;

    fn apply(&mut self, input: &[Self::Input], output: &mut [Complex64]) -> Result<()>;

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [Self::Input]) -> Result<()>;
}

impl<T: MeasurementOperator + ?Sized> MeasurementOperator for &mut T {
    type Input = T::Input;

    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn apply(&mut self, input: &[Self::Input], output: &mut [Complex64]) -> Result<()> {
        (**self).apply(input, output)
    }

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [Self::Input]) -> Result<()> {
        (**self).apply_adjoint(input, output)
    }
}

pub fn euclidean_norm<S: Sample>(values: &[S]) -> f64 {
    values.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt()
}

pub fn real_inner_product<S: Sample>(a: &[S], b: &[S]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x.real_inner(y)).sum()
}

/// Relative mismatch `|Re⟨A x, y⟩ - ⟨x, Aᵗ y⟩| / |Re⟨A x, y⟩|`.
///
/// The real inner product is the one under which real-domain operators are
/// adjoint; for complex domains it is implied by the complex identity.
pub fn adjoint_mismatch<A: MeasurementOperator + ?Sized>(
    op: &mut A,
    x: &[A::Input],
    y: &[Complex64],
) -> Result<f64> {
    let mut ax = vec![Complex64::ZERO; op.output_len()];
    let mut aty = vec![A::Input::default(); op.input_len()];
    op.apply(x, &mut ax)?;
    op.apply_adjoint(y, &mut aty)?;

    let lhs = real_inner_product(&ax, y);
    let rhs = real_inner_product(x, &aty);
    Ok((lhs - rhs).abs() / lhs.abs().max(f64::MIN_POSITIVE))
}

//! Continuous Fourier operator for irregularly sampled visibilities.
//!
//! Forward (degridding): zero-pad the image into the oversampled grid,
//! scale by `1/sqrt(nx2·ny2)` and the deconvolution kernel, shift the
//! origin to the corner, FFT, then interpolate onto the visibilities with
//! the gridding matrix. The adjoint runs the same steps transposed and in
//! reverse order.
//!
//! [`SymmetricOperator`] wraps the continuous operator for real images: it
//! emits every visibility together with its conjugate, so the measurement
//! vector is conjugate-symmetric by construction.

use std::sync::Arc;

use num_complex::Complex64;

use crate::{
    backend::SpectralBackend,
    error::{OperatorError, Result},
    gridding::{Gridding, GriddingParams},
    operator::MeasurementOperator,
};

#[derive(Clone)]
pub struct ContinuousOperator<B: SpectralBackend> {
    backend: B,
    gridding: Arc<Gridding>,
    scratch: Vec<Complex64>,
}

impl<B: SpectralBackend> ContinuousOperator<B> {
    pub fn new(backend: B, gridding: Arc<Gridding>) -> Self {
        let scratch = vec![Complex64::ZERO; gridding.params().oversampled_grid().len()];
        Self {
            backend,
            gridding,
            scratch,
        }
    }

    pub fn params(&self) -> &GriddingParams {
        self.gridding.params()
    }

    pub fn gridding(&self) -> &Arc<Gridding> {
        &self.gridding
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn scale(&self) -> f64 {
        let grid = self.params().oversampled_grid();
        1.0 / (grid.len() as f64).sqrt()
    }
}

impl<B: SpectralBackend> MeasurementOperator for ContinuousOperator<B> {
    type Input = Complex64;

    fn input_len(&self) -> usize {
        self.params().nx1 * self.params().ny1
    }

    fn output_len(&self) -> usize {
        self.params().nmeas
    }

    fn apply(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("image", self.input_len(), input.len())?;
        OperatorError::check_len("visibilities", self.output_len(), output.len())?;

        let params = *self.params();
        let grid = params.oversampled_grid();
        let (padx, pady) = params.padding();
        let scale = self.scale();
        let deconv = self.gridding.deconvolution();

        self.scratch.fill(Complex64::ZERO);
        for j in 0..params.ny1 {
            let src = j * params.nx1;
            let dst = (j + pady) * grid.nx + padx;
            for i in 0..params.nx1 {
                self.scratch[dst + i] = input[src + i] * (scale * deconv[src + i]);
            }
        }

        fftshift_2d(&mut self.scratch, grid.nx, grid.ny);
        self.backend.forward_fft_2d(grid, &mut self.scratch)?;
        self.gridding.matrix().forward_multiply(&self.scratch, output)
    }

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("visibilities", self.output_len(), input.len())?;
        OperatorError::check_len("image", self.input_len(), output.len())?;

        let params = *self.params();
        let grid = params.oversampled_grid();
        let (padx, pady) = params.padding();
        let scale = self.scale();

        self.gridding
            .matrix()
            .adjoint_multiply(input, &mut self.scratch)?;
        self.backend.inverse_fft_2d(grid, &mut self.scratch)?;
        ifftshift_2d(&mut self.scratch, grid.nx, grid.ny);

        let deconv = self.gridding.deconvolution();
        for j in 0..params.ny1 {
            let dst = j * params.nx1;
            let src = (j + pady) * grid.nx + padx;
            for i in 0..params.nx1 {
                output[dst + i] = self.scratch[src + i] * (scale * deconv[dst + i]);
            }
        }
        Ok(())
    }
}

/// Real-image variant producing `[A x, conj(A x)]`.
///
/// The input's imaginary part must be zero; the adjoint returns images with
/// zero imaginary part.
#[derive(Clone)]
pub struct SymmetricOperator<B: SpectralBackend> {
    inner: ContinuousOperator<B>,
    folded: Vec<Complex64>,
}

impl<B: SpectralBackend> SymmetricOperator<B> {
    pub fn new(inner: ContinuousOperator<B>) -> Self {
        let folded = vec![Complex64::ZERO; inner.output_len()];
        Self { inner, folded }
    }

    pub fn inner(&self) -> &ContinuousOperator<B> {
        &self.inner
    }
}

impl<B: SpectralBackend> MeasurementOperator for SymmetricOperator<B> {
    type Input = Complex64;

    fn input_len(&self) -> usize {
        self.inner.input_len()
    }

    fn output_len(&self) -> usize {
        2 * self.inner.output_len()
    }

    fn apply(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("symmetric visibilities", self.output_len(), output.len())?;
        let nmeas = self.inner.output_len();
        let (direct, mirrored) = output.split_at_mut(nmeas);
        self.inner.apply(input, direct)?;
        for (dst, src) in mirrored.iter_mut().zip(direct.iter()) {
            *dst = src.conj();
        }
        Ok(())
    }

    /// `x = Re(Aᴴ (z₁ + conj z₂))`, which is `2·Re(Aᴴ z₁)` whenever
    /// `z₂ = conj z₁`.
    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("symmetric visibilities", self.output_len(), input.len())?;
        let (direct, mirrored) = input.split_at(self.inner.output_len());
        for ((dst, a), b) in self.folded.iter_mut().zip(direct).zip(mirrored) {
            *dst = a + b.conj();
        }
        self.inner.apply_adjoint(&self.folded, output)?;
        for value in output.iter_mut() {
            *value = Complex64::new(value.re, 0.0);
        }
        Ok(())
    }
}

/// Move the centre cell `(nx/2, ny/2)` of a centred grid to the origin.
pub fn fftshift_2d<T>(data: &mut [T], nx: usize, ny: usize) {
    data.rotate_left((ny / 2) * nx);
    for row in data.chunks_exact_mut(nx) {
        row.rotate_left(nx / 2);
    }
}

/// Inverse of [`fftshift_2d`]; identical to it for even dimensions.
pub fn ifftshift_2d<T>(data: &mut [T], nx: usize, ny: usize) {
    data.rotate_right((ny / 2) * nx);
    for row in data.chunks_exact_mut(nx) {
        row.rotate_right(nx / 2);
    }
}

//! Backend traits for spectral operations.
//!
//! Operators never plan or execute transforms themselves; they hand flat
//! buffers plus the grid describing them to a [`SpectralBackend`]. The
//! backend owns plan preparation and caching, so one backend value can be
//! shared by every operator built for the same problem.
//!
//! # Normalisation
//!
//! Both complex transforms are **unnormalised**: `inverse_fft_2d` is the
//! exact adjoint of `forward_fft_2d` (conjugate kernel, no `1/N` factor).
//! Operators apply their own scaling so that forward and adjoint stay
//! consistent to rounding error.

use num_complex::Complex64;

use crate::error::Result;
use crate::grid::Grid2D;

pub trait SpectralBackend {
    /// In-place forward 2D DFT, `X[k] = Σ x[n] e^{-2πi k·n/N}`.
    fn forward_fft_2d(&self, grid: Grid2D, data: &mut [Complex64]) -> Result<()>;

    /// In-place unnormalised inverse 2D DFT, `x[n] = Σ X[k] e^{+2πi k·n/N}`.
    fn inverse_fft_2d(&self, grid: Grid2D, data: &mut [Complex64]) -> Result<()>;

    /// Real-to-complex forward 2D DFT.
    ///
    /// `input` holds `grid.len()` real samples; `output` receives the
    /// non-redundant half plane of `grid.half_len()` coefficients laid out
    /// as `iy * (nx/2 + 1) + ix`.
    fn forward_real_fft_2d(
        &self,
        grid: Grid2D,
        input: &[f64],
        output: &mut [Complex64],
    ) -> Result<()>;
}

impl<B: SpectralBackend + ?Sized> SpectralBackend for &B {
    fn forward_fft_2d(&self, grid: Grid2D, data: &mut [Complex64]) -> Result<()> {
        (**self).forward_fft_2d(grid, data)
    }

    fn inverse_fft_2d(&self, grid: Grid2D, data: &mut [Complex64]) -> Result<()> {
        (**self).inverse_fft_2d(grid, data)
    }

    fn forward_real_fft_2d(
        &self,
        grid: Grid2D,
        input: &[f64],
        output: &mut [Complex64],
    ) -> Result<()> {
        (**self).forward_real_fft_2d(grid, input, output)
    }
}

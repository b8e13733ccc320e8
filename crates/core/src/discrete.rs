//! Measurement operator for visibilities on the uniform DFT grid.
//!
//! Forward: real-to-complex FFT of the image, completion of the full plane
//! by conjugate symmetry, then a sparse mask selecting (and optionally
//! weighting) the observed cells. Adjoint: mask adjoint, unnormalised
//! inverse FFT, real part.

use num_complex::Complex64;

use crate::{
    backend::SpectralBackend,
    error::{OperatorError, Result},
    grid::Grid2D,
    operator::MeasurementOperator,
    sparse::{CsrMatrix, SparseScalar},
};

pub struct DiscreteOperator<B: SpectralBackend, T: SparseScalar = f64> {
    backend: B,
    grid: Grid2D,
    mask: CsrMatrix<T>,
    half: Vec<Complex64>,
    full: Vec<Complex64>,
}

impl<B: SpectralBackend, T: SparseScalar> DiscreteOperator<B, T> {
    pub fn new(backend: B, grid: Grid2D, mask: CsrMatrix<T>) -> Result<Self> {
        OperatorError::check_len("mask columns", grid.len(), mask.ncols())?;
        Ok(Self {
            backend,
            grid,
            half: vec![Complex64::ZERO; grid.half_len()],
            full: vec![Complex64::ZERO; grid.len()],
            mask,
        })
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn mask(&self) -> &CsrMatrix<T> {
        &self.mask
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Full-plane spectrum of a real image (no masking).
    pub fn fft_real(&mut self, image: &[f64], spectrum: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("real image", self.grid.len(), image.len())?;
        OperatorError::check_len("full spectrum", self.grid.len(), spectrum.len())?;
        self.backend
            .forward_real_fft_2d(self.grid, image, &mut self.half)?;
        complete_conjugate_symmetry(self.grid, &self.half, spectrum)
    }
}

impl<B: SpectralBackend, T: SparseScalar> MeasurementOperator for DiscreteOperator<B, T> {
    type Input = f64;

    fn input_len(&self) -> usize {
        self.grid.len()
    }

    fn output_len(&self) -> usize {
        self.mask.nrows()
    }

    fn apply(&mut self, input: &[f64], output: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("real image", self.grid.len(), input.len())?;
        self.backend
            .forward_real_fft_2d(self.grid, input, &mut self.half)?;
        complete_conjugate_symmetry(self.grid, &self.half, &mut self.full)?;
        self.mask.forward_multiply(&self.full, output)
    }

    fn apply_adjoint(&mut self, input: &[Complex64], output: &mut [f64]) -> Result<()> {
        OperatorError::check_len("real image", self.grid.len(), output.len())?;
        self.mask.adjoint_multiply(input, &mut self.full)?;
        self.backend.inverse_fft_2d(self.grid, &mut self.full)?;
        for (dst, src) in output.iter_mut().zip(&self.full) {
            *dst = src.re;
        }
        Ok(())
    }
}

/// Expand a real-to-complex half-plane spectrum to the full plane.
///
/// Every stored coefficient is copied; its partner at `(-ix, -iy)` receives
/// the conjugate. The DC term is its own partner and is copied unchanged.
pub fn complete_conjugate_symmetry(
    grid: Grid2D,
    half: &[Complex64],
    full: &mut [Complex64],
) -> Result<()> {
    OperatorError::check_len("half-plane spectrum", grid.half_len(), half.len())?;
    OperatorError::check_len("full-plane spectrum", grid.len(), full.len())?;

    let (nx, ny) = (grid.nx, grid.ny);
    for iy in 0..ny {
        for ix in 0..grid.half_nx() {
            let value = half[grid.half_idx(ix, iy)];
            let ind = grid.idx(ix, iy);
            full[ind] = value;

            let ind_neg = match (ix, iy) {
                (0, 0) => continue,
                // reflect along the line ix = 0
                (0, _) => grid.idx(0, ny - iy),
                // reflect along the line iy = 0
                (_, 0) => grid.idx(nx - ix, 0),
                _ => grid.idx(nx - ix, ny - iy),
            };
            if ind_neg != ind {
                full[ind_neg] = value.conj();
            }
        }
    }
    Ok(())
}

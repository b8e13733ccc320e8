//! Gridding-matrix construction for the continuous Fourier operator.
//!
//! Each visibility at `(u, v)` is interpolated from the `(2·support + 1)²`
//! cells of the oversampled Fourier grid closest to it, weighted by the
//! separable tabulated kernel. Cells falling off the grid wrap around
//! (periodic boundary), so every row has the same number of nonzeros.

use serde::{Deserialize, Serialize};

use crate::{
    error::{OperatorError, Result},
    grid::Grid2D,
    kernel::KernelTable,
    sparse::CsrMatrix,
};

/// Parameter block shared by the forward and adjoint continuous operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GriddingParams {
    /// Image width in pixels.
    pub nx1: usize,
    /// Image height in pixels.
    pub ny1: usize,
    /// Oversampling factor along x.
    pub ofx: usize,
    /// Oversampling factor along y.
    pub ofy: usize,
    /// Number of visibilities.
    pub nmeas: usize,
    /// Largest |u| represented by the grid.
    pub umax: f64,
    /// Largest |v| represented by the grid.
    pub vmax: f64,
}

impl GriddingParams {
    pub fn validate(&self) -> Result<()> {
        if self.nx1 == 0 || self.ny1 == 0 {
            return Err(OperatorError::InvalidParameter(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.nx1, self.ny1
            )));
        }
        if self.ofx == 0 || self.ofy == 0 {
            return Err(OperatorError::InvalidParameter(format!(
                "oversampling factors must be at least 1, got {}x{}",
                self.ofx, self.ofy
            )));
        }
        if self.nx2() < 2 || self.ny2() < 2 {
            return Err(OperatorError::InvalidParameter(format!(
                "oversampled grid {}x{} is too small",
                self.nx2(),
                self.ny2()
            )));
        }
        if !(self.umax > 0.0 && self.vmax > 0.0) {
            return Err(OperatorError::InvalidParameter(format!(
                "measurement-plane extents must be positive, got umax={} vmax={}",
                self.umax, self.vmax
            )));
        }
        Ok(())
    }

    pub fn nx2(&self) -> usize {
        self.ofx * self.nx1
    }

    pub fn ny2(&self) -> usize {
        self.ofy * self.ny1
    }

    pub fn image_grid(&self) -> Grid2D {
        Grid2D::new(self.nx1, self.ny1)
    }

    pub fn oversampled_grid(&self) -> Grid2D {
        Grid2D::new(self.nx2(), self.ny2())
    }

    /// Offset of the image inside the zero-padded grid.
    pub fn padding(&self) -> (usize, usize) {
        ((self.nx2() - self.nx1) / 2, (self.ny2() - self.ny1) / 2)
    }

    /// Spacing of the oversampled grid in u and v.
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.umax / (self.nx2() / 2) as f64,
            self.vmax / (self.ny2() / 2) as f64,
        )
    }
}

/// Image-space correction for the gridding convolution.
pub trait KernelCompensation {
    fn deconvolution(&self, image: Grid2D) -> Vec<f64>;
}

/// No correction: every pixel weight is one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCompensation;

impl KernelCompensation for UniformCompensation {
    fn deconvolution(&self, image: Grid2D) -> Vec<f64> {
        vec![1.0; image.len()]
    }
}

impl<F: Fn(usize, usize) -> f64> KernelCompensation for F {
    fn deconvolution(&self, image: Grid2D) -> Vec<f64> {
        let mut weights = Vec::with_capacity(image.len());
        for iy in 0..image.ny {
            for ix in 0..image.nx {
                weights.push(self(ix, iy));
            }
        }
        weights
    }
}

/// Static description of a continuous operator, built once per problem.
#[derive(Debug, Clone)]
pub struct Gridding {
    params: GriddingParams,
    matrix: CsrMatrix<f64>,
    deconv: Vec<f64>,
}

impl Gridding {
    pub fn params(&self) -> &GriddingParams {
        &self.params
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    pub fn deconvolution(&self) -> &[f64] {
        &self.deconv
    }
}

/// Build the interpolation matrix and deconvolution kernel for visibilities
/// at `(u[i], v[i])`.
///
/// Coordinates are expected in `[-umax, umax] × [-vmax, vmax]`; values
/// outside that range are not rejected and simply wrap around the grid.
pub fn build_gridding<C: KernelCompensation + ?Sized>(
    u: &[f64],
    v: &[f64],
    params: GriddingParams,
    kernel: &KernelTable,
    compensation: &C,
) -> Result<Gridding> {
    params.validate()?;
    OperatorError::check_len("u coordinates", params.nmeas, u.len())?;
    OperatorError::check_len("v coordinates", params.nmeas, v.len())?;

    let nx2 = params.nx2();
    let ny2 = params.ny2();
    let (uinc, vinc) = params.cell_size();
    let support = kernel.support() as i64;
    let numel = kernel.support_area();
    let nvals = params.nmeas * numel;

    let rowptr: Vec<usize> = (0..=params.nmeas).map(|row| row * numel).collect();
    let mut colind = Vec::with_capacity(nvals);
    let mut vals = Vec::with_capacity(nvals);

    for (row, (&ui, &vi)) in u.iter().zip(v).enumerate() {
        let ufrc = ui / uinc;
        let vfrc = vi / vinc;
        if !(ufrc.abs() <= MAX_CELL_OFFSET && vfrc.abs() <= MAX_CELL_OFFSET) {
            return Err(OperatorError::InvalidParameter(format!(
                "visibility {row} at (u, v) = ({ui}, {vi}) is not a finite grid position"
            )));
        }
        let idu = (ufrc + 0.5).floor() as i64;
        let idv = (vfrc + 0.5).floor() as i64;

        for iv in (idv - support)..=(idv + support) {
            let fv = kernel.weight(iv as f64 - vfrc);
            let row_offset = wrap(iv, ny2) * nx2;
            for iu in (idu - support)..=(idu + support) {
                let fu = kernel.weight(iu as f64 - ufrc);
                vals.push(fv * fu);
                colind.push(row_offset + wrap(iu, nx2));
            }
        }
    }

    let matrix = CsrMatrix::from_parts(params.nmeas, nx2 * ny2, rowptr, colind, vals)?;
    let deconv = compensation.deconvolution(params.image_grid());
    OperatorError::check_len("deconvolution kernel", params.nx1 * params.ny1, deconv.len())?;

    log::debug!(
        "gridding matrix: {} visibilities onto {}x{} grid, {} nonzeros ({} per row)",
        params.nmeas,
        nx2,
        ny2,
        matrix.nvals(),
        numel
    );

    Ok(Gridding {
        params,
        matrix,
        deconv,
    })
}

/// Largest `|u / uinc|` (or `|v / vinc|`) accepted; beyond this cell
/// indices lose integer precision in `f64`.
const MAX_CELL_OFFSET: f64 = (1u64 << 52) as f64;

#[inline]
fn wrap(index: i64, n: usize) -> usize {
    index.rem_euclid(n as i64) as usize
}

//! Real-valued sky images on a uniform 2D grid.
//!
//! This is the in-memory container the operators consume: pixel samples,
//! immutable dimensions and the field of view they cover. Reading and
//! writing image files is left to callers.

use num_complex::Complex64;

use crate::error::{OperatorError, Result};
use crate::grid::Grid2D;

#[derive(Debug, Clone, PartialEq)]
pub struct Image2D {
    grid: Grid2D,
    fov: [f64; 2],
    pixels: Vec<f64>,
}

impl Image2D {
    pub fn zeros(grid: Grid2D) -> Self {
        Self {
            grid,
            fov: [0.0, 0.0],
            pixels: vec![0.0; grid.len()],
        }
    }

    pub fn from_vec(grid: Grid2D, pixels: Vec<f64>) -> Result<Self> {
        OperatorError::check_len("image pixels", grid.len(), pixels.len())?;
        Ok(Self {
            grid,
            fov: [0.0, 0.0],
            pixels,
        })
    }

    /// Keep the real part of a complex image, e.g. the output of an adjoint.
    pub fn from_complex(grid: Grid2D, data: &[Complex64]) -> Result<Self> {
        Self::from_vec(grid, data.iter().map(|value| value.re).collect())
    }

    pub fn with_fov(mut self, fov_x: f64, fov_y: f64) -> Self {
        self.fov = [fov_x, fov_y];
        self
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn fov(&self) -> [f64; 2] {
        self.fov
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.pixels
    }

    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.pixels[self.grid.idx(ix, iy)]
    }

    pub fn get_mut(&mut self, ix: usize, iy: usize) -> &mut f64 {
        let idx = self.grid.idx(ix, iy);
        &mut self.pixels[idx]
    }

    /// Promote to a complex buffer with zero imaginary part.
    pub fn to_complex(&self) -> Vec<Complex64> {
        self.pixels
            .iter()
            .map(|&value| Complex64::new(value, 0.0))
            .collect()
    }

    /// True when dimensions match and every pixel and the field of view
    /// agree to within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.grid == other.grid
            && (self.fov[0] - other.fov[0]).abs() <= tol
            && (self.fov[1] - other.fov[1]).abs() <= tol
            && self
                .pixels
                .iter()
                .zip(&other.pixels)
                .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl From<Image2D> for Vec<f64> {
    fn from(image: Image2D) -> Self {
        image.pixels
    }
}

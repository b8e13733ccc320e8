//! Uniform grid helpers.

use serde::{Deserialize, Serialize};

/// Dimensions of a row-major 2D grid (`ix` is the fast axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid2D {
    pub nx: usize,
    pub ny: usize,
}

impl Grid2D {
    pub fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }

    #[inline]
    pub fn idx(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of the real-to-complex half plane along the fast axis.
    #[inline]
    pub fn half_nx(&self) -> usize {
        self.nx / 2 + 1
    }

    /// Number of entries in a real-to-complex half-plane spectrum.
    pub fn half_len(&self) -> usize {
        self.half_nx() * self.ny
    }

    #[inline]
    pub fn half_idx(&self, ix: usize, iy: usize) -> usize {
        iy * self.half_nx() + ix
    }

    /// Index of the conjugate-symmetric partner `(-ix, -iy)` with periodic wrap.
    #[inline]
    pub fn neg_idx(&self, ix: usize, iy: usize) -> usize {
        self.idx((self.nx - ix) % self.nx, (self.ny - iy) % self.ny)
    }
}

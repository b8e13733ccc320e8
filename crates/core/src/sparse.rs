//! Compressed-row sparse matrices acting on complex vectors.
//!
//! Weights may be real (`f64`, gridding kernels) or complex (`Complex64`,
//! weighted masks). Both multiply complex vectors; the adjoint conjugates
//! complex weights.

use num_complex::Complex64;

use crate::error::{OperatorError, Result};

pub trait SparseScalar: Copy + Send + Sync + 'static {
    fn mul_complex(self, x: Complex64) -> Complex64;
    fn conj_mul_complex(self, x: Complex64) -> Complex64;
    fn one() -> Self;
}

impl SparseScalar for f64 {
    #[inline]
    fn mul_complex(self, x: Complex64) -> Complex64 {
        x * self
    }

    #[inline]
    fn conj_mul_complex(self, x: Complex64) -> Complex64 {
        x * self
    }

    fn one() -> Self {
        1.0
    }
}

impl SparseScalar for Complex64 {
    #[inline]
    fn mul_complex(self, x: Complex64) -> Complex64 {
        self * x
    }

    #[inline]
    fn conj_mul_complex(self, x: Complex64) -> Complex64 {
        self.conj() * x
    }

    fn one() -> Self {
        Complex64::new(1.0, 0.0)
    }
}

#[derive(Debug, Clone)]
pub struct CsrMatrix<T: SparseScalar> {
    nrows: usize,
    ncols: usize,
    rowptr: Vec<usize>,
    colind: Vec<usize>,
    vals: Vec<T>,
}

impl<T: SparseScalar> CsrMatrix<T> {
    /// Assemble a matrix from raw compressed-row arrays, validating the layout.
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        rowptr: Vec<usize>,
        colind: Vec<usize>,
        vals: Vec<T>,
    ) -> Result<Self> {
        if rowptr.len() != nrows + 1 {
            return Err(OperatorError::InvalidSparseMatrix(format!(
                "rowptr has {} entries, expected {}",
                rowptr.len(),
                nrows + 1
            )));
        }
        if colind.len() != vals.len() {
            return Err(OperatorError::InvalidSparseMatrix(format!(
                "colind ({}) and vals ({}) lengths differ",
                colind.len(),
                vals.len()
            )));
        }
        if rowptr[0] != 0 || rowptr[nrows] != vals.len() {
            return Err(OperatorError::InvalidSparseMatrix(format!(
                "rowptr must span [0, {}], got [{}, {}]",
                vals.len(),
                rowptr[0],
                rowptr[nrows]
            )));
        }
        if rowptr.windows(2).any(|w| w[1] < w[0]) {
            return Err(OperatorError::InvalidSparseMatrix(
                "rowptr is not monotonic".to_string(),
            ));
        }
        if let Some(&col) = colind.iter().find(|&&col| col >= ncols) {
            return Err(OperatorError::InvalidSparseMatrix(format!(
                "column index {col} out of range for {ncols} columns"
            )));
        }
        Ok(Self {
            nrows,
            ncols,
            rowptr,
            colind,
            vals,
        })
    }

    /// Unit-weight selection matrix: row `i` picks entry `indices[i]`.
    pub fn selection(indices: &[usize], ncols: usize) -> Result<Self> {
        let rowptr = (0..=indices.len()).collect();
        Self::from_parts(
            indices.len(),
            ncols,
            rowptr,
            indices.to_vec(),
            vec![T::one(); indices.len()],
        )
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nvals(&self) -> usize {
        self.vals.len()
    }

    pub fn rowptr(&self) -> &[usize] {
        &self.rowptr
    }

    pub fn colind(&self) -> &[usize] {
        &self.colind
    }

    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    pub fn row(&self, row: usize) -> (&[usize], &[T]) {
        let range = self.rowptr[row]..self.rowptr[row + 1];
        (&self.colind[range.clone()], &self.vals[range])
    }

    /// `y = A x`
    pub fn forward_multiply(&self, x: &[Complex64], y: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("sparse forward input", self.ncols, x.len())?;
        OperatorError::check_len("sparse forward output", self.nrows, y.len())?;
        for (row, out) in y.iter_mut().enumerate() {
            let (cols, vals) = self.row(row);
            *out = cols
                .iter()
                .zip(vals)
                .map(|(&col, &val)| val.mul_complex(x[col]))
                .sum();
        }
        Ok(())
    }

    /// `x = A^H y`
    pub fn adjoint_multiply(&self, y: &[Complex64], x: &mut [Complex64]) -> Result<()> {
        OperatorError::check_len("sparse adjoint input", self.nrows, y.len())?;
        OperatorError::check_len("sparse adjoint output", self.ncols, x.len())?;
        x.fill(Complex64::ZERO);
        for (row, &value) in y.iter().enumerate() {
            let (cols, vals) = self.row(row);
            for (&col, &val) in cols.iter().zip(vals) {
                x[col] += val.conj_mul_complex(value);
            }
        }
        Ok(())
    }
}

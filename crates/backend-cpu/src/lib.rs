//! CPU spectral backend built on rustfft and realfft.
//!
//! 2D transforms run as row FFTs over the contiguous x axis followed by
//! column FFTs on gathered copies of each column. The planners sit behind a
//! shared mutex so clones of a backend reuse each other's plans. Each clone
//! also keeps a private workspace holding the plans for the last grid it saw
//! and the scratch buffers those plans need, so repeated transforms on one
//! grid neither allocate nor touch the shared planners.

use std::sync::Arc;

use num_complex::Complex64;
use parking_lot::Mutex;
use purify_core::backend::SpectralBackend;
use purify_core::error::{OperatorError, Result};
use purify_core::grid::Grid2D;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};

struct Planners {
    complex: FftPlanner<f64>,
    real: RealFftPlanner<f64>,
}

/// Every plan a transform on `grid` can need.
struct GridPlans {
    grid: Grid2D,
    forward_x: Arc<dyn Fft<f64>>,
    forward_y: Arc<dyn Fft<f64>>,
    inverse_x: Arc<dyn Fft<f64>>,
    inverse_y: Arc<dyn Fft<f64>>,
    real_x: Arc<dyn RealToComplex<f64>>,
}

impl GridPlans {
    fn new(grid: Grid2D, planners: &mut Planners) -> Self {
        log::trace!("planning transforms for {}x{} grid", grid.nx, grid.ny);
        Self {
            grid,
            forward_x: planners.complex.plan_fft_forward(grid.nx),
            forward_y: planners.complex.plan_fft_forward(grid.ny),
            inverse_x: planners.complex.plan_fft_inverse(grid.nx),
            inverse_y: planners.complex.plan_fft_inverse(grid.ny),
            real_x: planners.real.plan_fft_forward(grid.nx),
        }
    }
}

/// Buffers only ever grow; transforms borrow exact-length prefixes.
#[derive(Default)]
struct Buffers {
    scratch: Vec<Complex64>,
    column: Vec<Complex64>,
    real_row: Vec<f64>,
    real_scratch: Vec<Complex64>,
}

#[derive(Default)]
struct Workspace {
    plans: Option<GridPlans>,
    buffers: Buffers,
}

pub struct CpuBackend {
    planners: Arc<Mutex<Planners>>,
    workspace: Mutex<Workspace>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            planners: Arc::new(Mutex::new(Planners {
                complex: FftPlanner::new(),
                real: RealFftPlanner::new(),
            })),
            workspace: Mutex::default(),
        }
    }

    fn transform_2d(&self, grid: Grid2D, data: &mut [Complex64], inverse: bool) -> Result<()> {
        OperatorError::check_len("spectral buffer", grid.len(), data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        let mut guard = self.workspace.lock();
        let Workspace { plans, buffers } = &mut *guard;
        let plans = cached_plans(plans, grid, &self.planners);
        let (fft_x, fft_y) = if inverse {
            (&plans.inverse_x, &plans.inverse_y)
        } else {
            (&plans.forward_x, &plans.forward_y)
        };

        let scratch = grown(
            &mut buffers.scratch,
            fft_x
                .get_inplace_scratch_len()
                .max(fft_y.get_inplace_scratch_len()),
        );
        for row in data.chunks_exact_mut(grid.nx) {
            fft_x.process_with_scratch(row, scratch);
        }
        let column = grown(&mut buffers.column, grid.ny);
        transform_columns(fft_y.as_ref(), grid.nx, grid.nx, data, column, scratch);
        Ok(())
    }
}

impl Clone for CpuBackend {
    /// Shares the planners; the clone starts with an empty workspace.
    fn clone(&self) -> Self {
        Self {
            planners: Arc::clone(&self.planners),
            workspace: Mutex::default(),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralBackend for CpuBackend {
    fn forward_fft_2d(&self, grid: Grid2D, data: &mut [Complex64]) -> Result<()> {
        self.transform_2d(grid, data, false)
    }

    fn inverse_fft_2d(&self, grid: Grid2D, data: &mut [Complex64]) -> Result<()> {
        self.transform_2d(grid, data, true)
    }

    fn forward_real_fft_2d(
        &self,
        grid: Grid2D,
        input: &[f64],
        output: &mut [Complex64],
    ) -> Result<()> {
        OperatorError::check_len("real image", grid.len(), input.len())?;
        OperatorError::check_len("half spectrum", grid.half_len(), output.len())?;
        if input.is_empty() {
            return Ok(());
        }
        let half_nx = grid.half_nx();
        let mut guard = self.workspace.lock();
        let Workspace { plans, buffers } = &mut *guard;
        let plans = cached_plans(plans, grid, &self.planners);

        let row_in = grown(&mut buffers.real_row, grid.nx);
        let real_scratch = grown(&mut buffers.real_scratch, plans.real_x.get_scratch_len());
        for (src, dst) in input
            .chunks_exact(grid.nx)
            .zip(output.chunks_exact_mut(half_nx))
        {
            row_in.copy_from_slice(src);
            plans
                .real_x
                .process_with_scratch(row_in, dst, real_scratch)
                .map_err(|err| OperatorError::Fft(err.to_string()))?;
        }

        let scratch = grown(
            &mut buffers.scratch,
            plans.forward_y.get_inplace_scratch_len(),
        );
        let column = grown(&mut buffers.column, grid.ny);
        transform_columns(plans.forward_y.as_ref(), half_nx, half_nx, output, column, scratch);
        Ok(())
    }
}

/// Plans for `grid`, rebuilt from the shared planners only when the cached
/// set belongs to another grid.
fn cached_plans<'a>(
    slot: &'a mut Option<GridPlans>,
    grid: Grid2D,
    planners: &Mutex<Planners>,
) -> &'a GridPlans {
    if !matches!(slot, Some(plans) if plans.grid == grid) {
        *slot = None;
    }
    slot.get_or_insert_with(|| GridPlans::new(grid, &mut planners.lock()))
}

fn grown<T: Clone + Default>(buffer: &mut Vec<T>, len: usize) -> &mut [T] {
    if buffer.len() < len {
        buffer.resize(len, T::default());
    }
    &mut buffer[..len]
}

/// Transform the first `ncols` columns of a row-major buffer with the given
/// row `stride`. `column` holds one column (its length is the row count).
fn transform_columns(
    fft: &dyn Fft<f64>,
    ncols: usize,
    stride: usize,
    data: &mut [Complex64],
    column: &mut [Complex64],
    scratch: &mut [Complex64],
) {
    for col in 0..ncols {
        for (row, value) in column.iter_mut().enumerate() {
            *value = data[row * stride + col];
        }
        fft.process_with_scratch(column, scratch);
        for (row, value) in column.iter().enumerate() {
            data[row * stride + col] = *value;
        }
    }
}

//! Tabulated Gaussian gridding kernel.
//!
//! The table samples `exp(-ln2 · (r / hwhm)²)` on `[0, support + 0.5]` grid
//! cells, matching the Difmap convention: the last entry sits half a cell
//! beyond the support radius so that every offset reachable from the
//! nearest-cell search has a table slot.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, Result};

pub const DEFAULT_TABLE_LEN: usize = 301;
pub const DEFAULT_SUPPORT: usize = 2;
pub const DEFAULT_HWHM: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelOptions {
    /// Support radius in grid cells; each measurement touches `(2·support + 1)²` cells.
    pub support: usize,
    /// Half width at half maximum, in grid cells.
    pub hwhm: f64,
    /// Number of table entries.
    pub table_len: usize,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            support: DEFAULT_SUPPORT,
            hwhm: DEFAULT_HWHM,
            table_len: DEFAULT_TABLE_LEN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KernelTable {
    values: Vec<f64>,
    support: usize,
    table_scale: f64,
}

impl KernelTable {
    pub fn gaussian(options: &KernelOptions) -> Result<Self> {
        if options.table_len < 2 {
            return Err(OperatorError::InvalidParameter(format!(
                "kernel table needs at least 2 entries, got {}",
                options.table_len
            )));
        }
        if !(options.hwhm > 0.0) {
            return Err(OperatorError::InvalidParameter(format!(
                "kernel hwhm must be positive, got {}",
                options.hwhm
            )));
        }

        let table = Self::tabulate(options);
        log::trace!(
            "built gaussian kernel table: len={} support={} hwhm={} scale={:.3}",
            options.table_len,
            options.support,
            options.hwhm,
            table.table_scale
        );
        Ok(table)
    }

    fn tabulate(options: &KernelOptions) -> Self {
        let table_scale = (options.table_len - 1) as f64 / (options.support as f64 + 0.5);
        let hwhm_in_entries = table_scale * options.hwhm;
        let recvar = std::f64::consts::LN_2 / (hwhm_in_entries * hwhm_in_entries);
        let values = (0..options.table_len)
            .map(|i| {
                let i = i as f64;
                (-recvar * i * i).exp()
            })
            .collect();
        Self {
            values,
            support: options.support,
            table_scale,
        }
    }

    /// Kernel weight at fractional grid distance `offset`.
    #[inline]
    pub fn weight(&self, offset: f64) -> f64 {
        let slot = (self.table_scale * offset.abs() + 0.5).floor() as usize;
        self.values[slot.min(self.values.len() - 1)]
    }

    pub fn support(&self) -> usize {
        self.support
    }

    /// Side length of the square footprint around each measurement.
    pub fn width(&self) -> usize {
        2 * self.support + 1
    }

    /// Nonzeros contributed by one measurement.
    pub fn support_area(&self) -> usize {
        self.width() * self.width()
    }

    pub fn table_scale(&self) -> f64 {
        self.table_scale
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Write the table as `index\tvalue` lines for offline inspection.
    pub fn dump<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (idx, value) in self.values.iter().enumerate() {
            writeln!(writer, "{idx}\t{value:.3e}")?;
        }
        writer.flush()
    }
}

impl Default for KernelTable {
    fn default() -> Self {
        Self::tabulate(&KernelOptions::default())
    }
}

//! Configuration file parsing.
//!
//! An operator description is loaded from TOML and turned into the static
//! gridding data plus the power-iteration options.
//!
//! # File Format
//!
//! ```toml
//! [params]
//! nx1 = 32
//! ny1 = 32
//! ofx = 2
//! ofy = 2
//! umax = 3.141592653589793
//! vmax = 3.141592653589793
//!
//! [kernel]
//! support = 2
//! hwhm = 0.7
//!
//! [power]
//! max_iter = 200
//! rel_tol = 1e-3
//! seed = 51
//!
//! [coverage]
//! u = [0.0, 0.1, 1.5]
//! v = [0.0, -0.2, 0.0]
//! # or: synthetic = { count = 500, seed = 7 }
//! ```

use std::{f64::consts::PI, fs, path::Path};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::{
    error::OperatorError,
    gridding::{Gridding, GriddingParams, UniformCompensation, build_gridding},
    kernel::{KernelOptions, KernelTable},
    spectral_norm::PowerIterationOptions,
};

// ============================================================================
// Sections
// ============================================================================

/// Image and grid parameters; the visibility count comes from `[coverage]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageSpec {
    pub nx1: usize,
    pub ny1: usize,
    #[serde(default = "default_oversampling")]
    pub ofx: usize,
    #[serde(default = "default_oversampling")]
    pub ofy: usize,
    #[serde(default = "default_extent")]
    pub umax: f64,
    #[serde(default = "default_extent")]
    pub vmax: f64,
}

fn default_oversampling() -> usize {
    2
}

fn default_extent() -> f64 {
    PI
}

/// Deterministic random coverage, denser towards the origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyntheticCoverage {
    pub count: usize,
    #[serde(default)]
    pub seed: u64,
    /// Standard deviation as a fraction of the plane extent.
    #[serde(default = "default_spread")]
    pub spread: f64,
}

fn default_spread() -> f64 {
    0.25
}

/// Widest accepted `spread`; about one draw in 160 lands inside the plane.
const MAX_SPREAD: f64 = 10.0;

impl SyntheticCoverage {
    /// `spread` must be positive and at most [`MAX_SPREAD`], otherwise
    /// rejection sampling would stall.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spread > 0.0 && self.spread <= MAX_SPREAD) {
            return Err(ConfigError::InvalidCoverage(format!(
                "spread must lie in (0, {MAX_SPREAD}], got {}",
                self.spread
            )));
        }
        Ok(())
    }

    /// Draw `count` points inside `[-umax, umax] × [-vmax, vmax]`.
    pub fn sample(&self, umax: f64, vmax: f64) -> Result<(Vec<f64>, Vec<f64>), ConfigError> {
        self.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let normal = Normal::new(0.0, self.spread)
            .map_err(|err| ConfigError::InvalidCoverage(format!("spread {}: {err}", self.spread)))?;
        let mut u = Vec::with_capacity(self.count);
        let mut v = Vec::with_capacity(self.count);
        while u.len() < self.count {
            let du: f64 = normal.sample(&mut rng);
            let dv: f64 = normal.sample(&mut rng);
            if du.abs() <= 1.0 && dv.abs() <= 1.0 {
                u.push(du * umax);
                v.push(dv * vmax);
            }
        }
        Ok((u, v))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageSpec {
    #[serde(default)]
    pub u: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
    /// Used when no explicit coordinates are given.
    #[serde(default)]
    pub synthetic: Option<SyntheticCoverage>,
}

impl CoverageSpec {
    pub fn coordinates(&self, umax: f64, vmax: f64) -> Result<(Vec<f64>, Vec<f64>), ConfigError> {
        if !self.u.is_empty() || !self.v.is_empty() {
            if self.u.len() != self.v.len() {
                return Err(ConfigError::InvalidCoverage(format!(
                    "u has {} entries but v has {}",
                    self.u.len(),
                    self.v.len()
                )));
            }
            return Ok((self.u.clone(), self.v.clone()));
        }
        match &self.synthetic {
            Some(synthetic) => synthetic.sample(umax, vmax),
            None => Err(ConfigError::InvalidCoverage(
                "coverage needs explicit u/v coordinates or a synthetic section".to_string(),
            )),
        }
    }
}

// ============================================================================
// Operator Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub params: ImageSpec,
    #[serde(default)]
    pub kernel: KernelOptions,
    #[serde(default)]
    pub power: PowerIterationOptions,
    #[serde(default)]
    pub coverage: CoverageSpec,
}

/// Everything built from an [`OperatorConfig`].
#[derive(Debug, Clone)]
pub struct OperatorSetup {
    pub kernel: KernelTable,
    pub gridding: Gridding,
    pub power: PowerIterationOptions,
}

impl OperatorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn build(&self) -> Result<OperatorSetup, ConfigError> {
        let (u, v) = self
            .coverage
            .coordinates(self.params.umax, self.params.vmax)?;
        let params = GriddingParams {
            nx1: self.params.nx1,
            ny1: self.params.ny1,
            ofx: self.params.ofx,
            ofy: self.params.ofy,
            nmeas: u.len(),
            umax: self.params.umax,
            vmax: self.params.vmax,
        };
        let kernel = KernelTable::gaussian(&self.kernel)?;
        let gridding = build_gridding(&u, &v, params, &kernel, &UniformCompensation)?;
        Ok(OperatorSetup {
            kernel,
            gridding,
            power: self.power,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid coverage: {0}")]
    InvalidCoverage(String),

    #[error(transparent)]
    Operator(#[from] OperatorError),
}

//! Matrix-free measurement operators for radio-interferometric imaging.
//!
//! The crate maps real sky images to irregularly sampled visibilities and
//! back. Forward and adjoint operators are exact adjoints of each other so
//! they can be handed to convex solvers that rely on that property.

pub mod backend;
pub mod continuous;
pub mod discrete;
pub mod error;
pub mod grid;
pub mod gridding;
pub mod image;
pub mod io;
pub mod kernel;
pub mod operator;
pub mod sparse;
pub mod spectral_norm;

pub use error::{OperatorError, Result};

#[cfg(test)]
mod _tests_io;
#[cfg(test)]
mod _tests_kernel;
#[cfg(test)]
mod _tests_spectral_norm;

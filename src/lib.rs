//! Fractal / dyadic sequential simulation engine for anisotropic, zero-mean,
//! unit-variance Gaussian random fields on power-of-two-plus-one grids.
//!
//! The public surface is deliberately narrow: build a [`DrawRequest`],
//! call [`draw_gauss_2d`], and read off the cropped field from the
//! returned [`DrawOutcome`]. Everything else — the numerical kernel, the
//! random streams, the pattern catalogue — is an implementation detail of
//! the refinement driver.

pub mod engine;
pub mod error;
pub mod numeric;
pub mod random;
pub mod schema;

pub use engine::{draw_gauss_2d, DrawOutcome};
pub use error::{CheckWarning, EngineError, EngineResult, KernelError};
pub use schema::{CorrelationKind, CorrelationModel, DrawRequest, Flavour, Variant};

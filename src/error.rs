//! Error taxonomy for the dyadic Gaussian field engine.
//!
//! The core distinguishes three categories, mirroring the diagnostic channels
//! of the surrounding environment (which the engine itself never talks to
//! directly): `Kernel` and `Alloc` are fatal for the current `draw_gauss_2d`
//! call, `Check` is a non-fatal warning attached to an otherwise valid grid.

use thiserror::Error;

/// Fatal or advisory conditions raised while drawing a field.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Numerical failure: non-convergent eigensolver, singular or non-PD
    /// matrix during seed Cholesky or pattern solve, or an illegal argument.
    #[error("KERNEL: {0}")]
    Kernel(#[from] KernelError),

    /// Allocation of the working grid, pattern catalogue, or workspace failed.
    ///
    /// Kept in the taxonomy because the spec's §7 error categories are part
    /// of the contract, but never constructed: `Vec`/`Box` allocation
    /// failure aborts the process in safe Rust rather than surfacing as a
    /// `Result`, so there is no call site that can produce it short of a
    /// custom fallible allocator, which is out of scope here.
    #[error("ALLOC: {0}")]
    Alloc(String),
}

/// Numerical-failure subcategory, carrying enough context to identify the
/// offending component, pattern id, or eigenvalue index.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error(
        "eigensolver did not converge after {sweeps} sweeps on off-diagonal index {index}"
    )]
    EigenNonConvergent { sweeps: u32, index: usize },

    #[error("matrix is singular or not positive definite at row {row}: {reason}")]
    NotPositiveDefinite { row: usize, reason: &'static str },

    #[error(
        "singular covariance matrix for pattern {pattern} (n={n}): |rcond|={rcond:e} below tolerance"
    )]
    SingularPattern {
        pattern: usize,
        n: usize,
        rcond: f64,
    },

    #[error("LU factorization found a zero pivot at row {row}")]
    ZeroPivot { row: usize },

    #[error("truncated distribution interval excludes the mean at zero variance")]
    IllPosedTruncation,
}

/// Non-fatal statistics-out-of-tolerance warning from post-draw validation.
/// The grid that produced this warning is still returned to the caller.
#[derive(Debug, Clone, Error)]
#[error(
    "CHECK: simulated field mean={mean:.6} stdev={stdev:.6} outside tolerance (|.| <= {bound})"
)]
pub struct CheckWarning {
    pub mean: f64,
    pub stdev: f64,
    pub bound: f64,
}

pub type EngineResult<T> = Result<T, EngineError>;

//! Numerical kernel: symmetric eigendecomposition, Cholesky factorisation,
//! and general LU with a reciprocal-condition estimate. Everything the seed
//! block initialiser and the pattern-weight solver need bottoms out here.

mod cholesky;
mod eigen;
mod lu;

pub use cholesky::{cholesky_in_place, cholesky_solve};
pub use eigen::eigen_sym;
pub use lu::{LuFactorization, lu_factor, lu_solve, lu_solve_transpose, one_norm, rcond_estimate};

//! Fixed-capacity pattern catalogue and kriging weight cache.
//!
//! Up to 30 patterns, each up to 30 neighbour offsets. The refinement
//! driver rebuilds this catalogue at every level: offsets are reset, each
//! distinct geometric neighbourhood is installed once via
//! [`PatternCatalogue::set_offset`], and its weights solved once via
//! [`PatternCatalogue::solve_simple`] or [`PatternCatalogue::solve_ordinary`].
//! Every node sharing that pattern id then reuses the same weight vector.

use crate::error::KernelError;
use crate::numeric::{cholesky_in_place, lu_factor, lu_solve, one_norm, rcond_estimate};
use crate::schema::CorrelationModel;

pub const MAX_PATTERNS: usize = 30;
pub const MAX_NEIGHBOURS: usize = 30;

/// Engine policy: treat an `|rcond|` below this as a singular-matrix
/// failure (approximately floating-point epsilon, per spec).
const RCOND_TOLERANCE: f64 = 1.0e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub dx: i64,
    pub dy: i64,
}

pub struct PatternCatalogue {
    offsets: Vec<[Offset; MAX_NEIGHBOURS]>,
    counts: Vec<usize>,
    weights: Vec<Vec<f64>>,
    residual_var: Vec<f64>,
}

impl PatternCatalogue {
    pub fn new() -> Self {
        Self {
            offsets: vec![[Offset::default(); MAX_NEIGHBOURS]; MAX_PATTERNS],
            counts: vec![0; MAX_PATTERNS],
            weights: vec![Vec::new(); MAX_PATTERNS],
            residual_var: vec![0.0; MAX_PATTERNS],
        }
    }

    /// Zeroes every offset and weight. Called once per refinement level
    /// before any pattern at that level is installed.
    pub fn reset_offsets(&mut self) {
        for slot in &mut self.offsets {
            *slot = [Offset::default(); MAX_NEIGHBOURS];
        }
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.weights.iter_mut().for_each(Vec::clear);
        self.residual_var.iter_mut().for_each(|r| *r = 0.0);
    }

    /// Writes `offsets[p][k] = (ux*lag, uy*lag)`. `p` and `k` are 1-based
    /// per the spec's pattern-id convention; internally stored 0-based.
    pub fn set_offset(&mut self, p: usize, lag: i64, k: usize, ux: i64, uy: i64) {
        let (p0, k0) = (p - 1, k - 1);
        self.offsets[p0][k0] = Offset { dx: ux * lag, dy: uy * lag };
        self.counts[p0] = self.counts[p0].max(k);
    }

    pub fn offsets(&self, p: usize) -> &[Offset] {
        &self.offsets[p - 1][..self.counts[p - 1]]
    }

    pub fn weights(&self, p: usize) -> &[f64] {
        &self.weights[p - 1]
    }

    pub fn residual_variance(&self, p: usize) -> f64 {
        self.residual_var[p - 1]
    }

    /// Simple-kriging solve: builds the n x n covariance matrix from
    /// pairwise `corr_int` of the installed offsets, factors it via LU with
    /// a condition estimate, and solves for the weight vector. Residual
    /// variance `1 - w^T c` is clamped to `>= 0` (silently, per the
    /// reference engine's behaviour).
    pub fn solve_simple(&mut self, p: usize, n: usize, corr: &CorrelationModel) -> Result<(), KernelError> {
        let offs = &self.offsets[p - 1][..n];
        let mut c_mat = vec![0.0; n * n];
        let mut c_vec = vec![0.0; n];
        for i in 0..n {
            c_vec[i] = corr.corr_int(offs[i].dx, offs[i].dy);
            for j in 0..n {
                c_mat[i * n + j] = if i == j {
                    1.0
                } else {
                    corr.corr_int(offs[i].dx - offs[j].dx, offs[i].dy - offs[j].dy)
                };
            }
        }

        let w = solve_with_rcond_check(&c_mat, &c_vec, n, p)?;
        let wtc: f64 = w.iter().zip(c_vec.iter()).map(|(a, b)| a * b).sum();

        self.weights[p - 1] = w;
        self.residual_var[p - 1] = (1.0 - wtc).max(0.0);
        Ok(())
    }

    /// Ordinary-kriging solve: augments the system with a Lagrange
    /// multiplier row/column enforcing weights summing to one. The first
    /// `n` rows carry zero self-variance on the diagonal (per the spec's
    /// "zero diagonal on the first n rows") and the un-negated pairwise
    /// correlation off it, matching the reference engine's `init_weights_o`
    /// exactly; weights are the first `n` solution entries and the residual
    /// is `w^T c + mu` with `mu` the Lagrange multiplier itself, not its
    /// negation.
    pub fn solve_ordinary(&mut self, p: usize, n: usize, corr: &CorrelationModel) -> Result<(), KernelError> {
        let offs = &self.offsets[p - 1][..n];
        let dim = n + 1;
        let mut a = vec![0.0; dim * dim];
        let mut b = vec![0.0; dim];

        for i in 0..n {
            for j in 0..n {
                a[i * dim + j] = if i == j {
                    0.0
                } else {
                    corr.corr_int(offs[i].dx - offs[j].dx, offs[i].dy - offs[j].dy)
                };
            }
            a[i * dim + n] = 1.0;
            a[n * dim + i] = 1.0;
            b[i] = corr.corr_int(offs[i].dx, offs[i].dy);
        }
        a[n * dim + n] = 0.0;
        b[n] = 1.0;

        let solution = solve_with_rcond_check(&a, &b, dim, p)?;
        let w = solution[..n].to_vec();
        let mu = solution[n];
        let wtc: f64 = w.iter().zip(b.iter()).take(n).map(|(wk, ck)| wk * ck).sum();

        self.weights[p - 1] = w;
        self.residual_var[p - 1] = (wtc + mu).max(0.0);
        Ok(())
    }
}

fn solve_with_rcond_check(a: &[f64], b: &[f64], n: usize, pattern: usize) -> Result<Vec<f64>, KernelError> {
    let anorm = one_norm(a, n);
    let fact = lu_factor(a, n)?;
    let rcond = rcond_estimate(&fact, anorm);
    if rcond.abs() < RCOND_TOLERANCE {
        return Err(KernelError::SingularPattern { pattern, n, rcond });
    }
    Ok(lu_solve(&fact, b))
}

/// Solves the seed block's dense covariance system directly by Cholesky,
/// used by [`crate::engine::seed_block`] rather than the pattern cache
/// (the 5x5 anchor grid is a one-off 25x25 system, not reused across
/// nodes).
pub fn cholesky_solve_dense(a: &mut [f64], n: usize) -> Result<(), KernelError> {
    cholesky_in_place(a, n)
}

//! Seed block initialiser: draws the 5x5 anchor grid that every refinement
//! level subsequently grows outward from.
//!
//! A 25x25 covariance (or semivariogram-derived, for the ordinary flavour)
//! matrix is Cholesky-factored; 25 independent standard-normal draws are
//! then mapped through the lower-triangular factor to produce correlated
//! seed values at the five-by-five anchor positions.

use crate::error::KernelError;
use crate::random::{normal01_pair, RandomSource};
use crate::schema::{CorrelationModel, Grid};

use super::pattern::cholesky_solve_dense;

const ANCHOR_SIDE: usize = 5;

/// Whether the seed block (and every subsequent pattern solve) uses pure
/// covariance (simple kriging) or the semivariogram-based ordinary-kriging
/// formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KrigingMode {
    Simple,
    Ordinary,
}

/// Draws the 5x5 anchor block into `grid` at stride `d = (mxind - 1) / 4`
/// along both axes, starting at (1, 1).
pub fn draw_seed_block(
    grid: &mut Grid,
    mxind: usize,
    corr: &CorrelationModel,
    mode: KrigingMode,
    rng: &mut RandomSource,
) -> Result<(), KernelError> {
    let d = ((mxind - 1) / 4) as i64;
    let n = ANCHOR_SIDE * ANCHOR_SIDE;

    let mut k_mat = vec![0.0f64; n * n];
    let c0 = corr.corr_int((mxind as i64) - 1, (mxind as i64) - 1);

    for i in 1..=ANCHOR_SIDE {
        for j in 1..=ANCHOR_SIDE {
            let row = (j - 1) + ANCHOR_SIDE * (i - 1);
            for l in 1..=ANCHOR_SIDE {
                for m in 1..=ANCHOR_SIDE {
                    let col = (m - 1) + ANCHOR_SIDE * (l - 1);
                    let dx = (i as i64 - l as i64) * d;
                    let dy = (j as i64 - m as i64) * d;
                    let value = match mode {
                        KrigingMode::Simple => {
                            if row == col {
                                1.0
                            } else {
                                corr.corr_int(dx, dy)
                            }
                        }
                        KrigingMode::Ordinary => {
                            if row == col {
                                c0
                            } else {
                                c0 - corr.corr_int(dx, dy)
                            }
                        }
                    };
                    k_mat[row * n + col] = value;
                }
            }
        }
    }

    cholesky_solve_dense(&mut k_mat, n)?;

    let mut z = Vec::with_capacity(n);
    while z.len() + 1 < n {
        let (z1, z2) = normal01_pair(rng);
        z.push(z1);
        z.push(z2);
    }
    if z.len() < n {
        let (z1, _) = normal01_pair(rng);
        z.push(z1);
    }

    // values = L * z, L held in the lower triangle of k_mat.
    let mut values = vec![0.0f64; n];
    for row in 0..n {
        let mut s = 0.0;
        for col in 0..=row {
            s += k_mat[row * n + col] * z[col];
        }
        values[row] = s;
    }

    for i in 1..=ANCHOR_SIDE {
        for j in 1..=ANCHOR_SIDE {
            let row = (j - 1) + ANCHOR_SIDE * (i - 1);
            let gi = 1 + (i as i64 - 1) * d;
            let gj = 1 + (j as i64 - 1) * d;
            grid.set(gi, gj, values[row]);
        }
    }

    Ok(())
}

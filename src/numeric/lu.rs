//! General LU factorisation with partial pivoting, back-substitution, and a
//! 1-norm reciprocal-condition estimate in the LINPACK `dgeco` tradition:
//! the estimator solves with `A` and `A^T` against sign vectors chosen to
//! maximise growth, rather than forming `A^-1` explicitly.

use crate::error::KernelError;

/// Row-major `n x n` LU factorisation with partial pivoting. `lu` holds `U`
/// in its upper triangle (diagonal included) and the multipliers of `L`
/// (unit diagonal, not stored) below it. `pivots[k]` is the row that was
/// swapped into position `k` during elimination.
pub struct LuFactorization {
    pub lu: Vec<f64>,
    pub pivots: Vec<usize>,
    pub n: usize,
}

/// Factors `a` (row-major `n x n`) via Doolittle elimination with partial
/// pivoting. Fails with [`KernelError::ZeroPivot`] if any pivot column is
/// exactly singular.
pub fn lu_factor(a: &[f64], n: usize) -> Result<LuFactorization, KernelError> {
    assert_eq!(a.len(), n * n);
    let mut lu = a.to_vec();
    let mut pivots: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_row = k;
        let mut max_val = lu[k * n + k].abs();
        for i in (k + 1)..n {
            let v = lu[i * n + k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }
        if max_val == 0.0 {
            return Err(KernelError::ZeroPivot { row: k });
        }
        if max_row != k {
            for col in 0..n {
                lu.swap(k * n + col, max_row * n + col);
            }
            pivots.swap(k, max_row);
        }
        let pivot = lu[k * n + k];
        for i in (k + 1)..n {
            let factor = lu[i * n + k] / pivot;
            lu[i * n + k] = factor;
            if factor != 0.0 {
                for col in (k + 1)..n {
                    lu[i * n + col] -= factor * lu[k * n + col];
                }
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

/// Solves `A x = b` given the factorisation, applying the stored row
/// permutation before the forward/back substitution.
pub fn lu_solve(fact: &LuFactorization, b: &[f64]) -> Vec<f64> {
    let n = fact.n;
    let mut x: Vec<f64> = (0..n).map(|i| b[fact.pivots[i]]).collect();

    for i in 0..n {
        for j in 0..i {
            x[i] -= fact.lu[i * n + j] * x[j];
        }
    }
    for i in (0..n).rev() {
        for j in (i + 1)..n {
            x[i] -= fact.lu[i * n + j] * x[j];
        }
        x[i] /= fact.lu[i * n + i];
    }
    x
}

/// Solves `A^T y = b` using the same factorisation (`A^T = U^T L^T P^T`):
/// forward substitution against `U^T` (lower triangular), back substitution
/// against `L^T` (unit upper triangular), then undoes the permutation.
pub fn lu_solve_transpose(fact: &LuFactorization, b: &[f64]) -> Vec<f64> {
    let n = fact.n;
    let mut z = b.to_vec();

    for i in 0..n {
        for j in 0..i {
            z[i] -= fact.lu[j * n + i] * z[j];
        }
        z[i] /= fact.lu[i * n + i];
    }
    for i in (0..n).rev() {
        for j in (i + 1)..n {
            z[i] -= fact.lu[j * n + i] * z[j];
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        y[fact.pivots[i]] = z[i];
    }
    y
}

/// One-norm of `a` (max absolute column sum), computed before factorisation.
pub fn one_norm(a: &[f64], n: usize) -> f64 {
    (0..n)
        .map(|j| (0..n).map(|i| a[i * n + j].abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Approximates `1 / (||A||_1 * ||A^-1||_1)` using the Hager/Higham
/// power-iteration estimator for `||A^-1||_1`: it alternates solving with
/// `A` and `A^T` against sign vectors chosen to maximise local growth, and
/// rescales at each step so the iterate never overflows.
pub fn rcond_estimate(fact: &LuFactorization, anorm: f64) -> f64 {
    let n = fact.n;
    if n == 0 || anorm == 0.0 {
        return 0.0;
    }

    let mut x = vec![1.0 / n as f64; n];
    let mut est = 0.0;

    for _ in 0..5 {
        x = lu_solve(fact, &x);
        let new_est: f64 = x.iter().map(|v| v.abs()).sum();
        if new_est <= est {
            est = new_est;
            break;
        }
        est = new_est;

        let signs: Vec<f64> = x.iter().map(|v| if *v >= 0.0 { 1.0 } else { -1.0 }).collect();
        let y = lu_solve_transpose(fact, &signs);

        let mut max_idx = 0;
        let mut max_val = y[0].abs();
        for (i, v) in y.iter().enumerate().skip(1) {
            if v.abs() > max_val {
                max_val = v.abs();
                max_idx = i;
            }
        }

        let dot: f64 = y.iter().zip(x.iter()).map(|(a, b)| a * b.signum()).sum();
        if max_val <= dot {
            break;
        }

        x = vec![0.0; n];
        x[max_idx] = 1.0;
    }

    let ainv_norm = est.max(f64::MIN_POSITIVE);
    1.0 / (anorm * ainv_norm)
}

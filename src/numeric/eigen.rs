//! Symmetric eigendecomposition: Householder tridiagonalisation followed by
//! implicit-shift QL iteration.
//!
//! Classic two-stage algorithm (tred2 + tqli). Eigenpairs are returned in
//! whatever order the QL sweeps settle on; callers that need a specific
//! order must sort themselves.

use crate::error::KernelError;

/// Maximum QL sweeps per off-diagonal before giving up, per the engine's
/// convergence policy.
const MAX_SWEEPS: u32 = 30;

/// Eigendecomposition of a real symmetric `n x n` matrix `a` (row-major,
/// only the full matrix is read; both triangles are used so the caller need
/// not worry about which half is canonical).
///
/// Returns `(eigenvectors, eigenvalues)` where `eigenvectors` is row-major
/// with column `j` holding the eigenvector for `eigenvalues[j]`.
pub fn eigen_sym(a: &[f64], n: usize) -> Result<(Vec<f64>, Vec<f64>), KernelError> {
    assert_eq!(a.len(), n * n);
    if n == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    // Work in 1-indexed arrays internally (index 0 unused) to mirror the
    // textbook tred2/tqli recurrences exactly.
    let mut z = vec![0.0f64; (n + 1) * (n + 1)];
    for i in 1..=n {
        for j in 1..=n {
            z[i * (n + 1) + j] = a[(i - 1) * n + (j - 1)];
        }
    }
    let mut d = vec![0.0f64; n + 1];
    let mut e = vec![0.0f64; n + 1];

    tred2(&mut z, n, &mut d, &mut e);
    tqli(&mut d, &mut e, n, &mut z)?;

    let mut eigenvectors = vec![0.0f64; n * n];
    for i in 1..=n {
        for j in 1..=n {
            eigenvectors[(i - 1) * n + (j - 1)] = z[i * (n + 1) + j];
        }
    }
    let eigenvalues = d[1..=n].to_vec();

    Ok((eigenvectors, eigenvalues))
}

/// `z` is 1-indexed, dimension `(n+1) x (n+1)`, stored row-major with stride
/// `n+1`; entry `(i, j)` lives at `z[i * (n+1) + j]`.
fn idx(n: usize, i: usize, j: usize) -> usize {
    i * (n + 1) + j
}

fn tred2(z: &mut [f64], n: usize, d: &mut [f64], e: &mut [f64]) {
    for i in (2..=n).rev() {
        let l = i - 1;
        let mut h = 0.0;
        let mut scale = 0.0;
        if l > 1 {
            for k in 1..=l {
                scale += z[idx(n, i, k)].abs();
            }
            if scale == 0.0 {
                e[i] = z[idx(n, i, l)];
            } else {
                for k in 1..=l {
                    z[idx(n, i, k)] /= scale;
                    h += z[idx(n, i, k)] * z[idx(n, i, k)];
                }
                let mut f = z[idx(n, i, l)];
                let g = if f >= 0.0 { -h.sqrt() } else { h.sqrt() };
                e[i] = scale * g;
                h -= f * g;
                z[idx(n, i, l)] = f - g;
                f = 0.0;
                for j in 1..=l {
                    z[idx(n, j, i)] = z[idx(n, i, j)] / h;
                    let mut g2 = 0.0;
                    for k in 1..=j {
                        g2 += z[idx(n, j, k)] * z[idx(n, i, k)];
                    }
                    for k in (j + 1)..=l {
                        g2 += z[idx(n, k, j)] * z[idx(n, i, k)];
                    }
                    e[j] = g2 / h;
                    f += e[j] * z[idx(n, i, j)];
                }
                let hh = f / (h + h);
                for j in 1..=l {
                    f = z[idx(n, i, j)];
                    let g2 = e[j] - hh * f;
                    e[j] = g2;
                    for k in 1..=j {
                        z[idx(n, j, k)] -= f * e[k] + g2 * z[idx(n, i, k)];
                    }
                }
            }
        } else {
            e[i] = z[idx(n, i, l)];
        }
        d[i] = h;
    }
    d[1] = 0.0;
    e[1] = 0.0;
    for i in 1..=n {
        let l = i - 1;
        if d[i] != 0.0 {
            for j in 1..=l {
                let mut g = 0.0;
                for k in 1..=l {
                    g += z[idx(n, i, k)] * z[idx(n, k, j)];
                }
                for k in 1..=l {
                    z[idx(n, k, j)] -= g * z[idx(n, k, i)];
                }
            }
        }
        d[i] = z[idx(n, i, i)];
        z[idx(n, i, i)] = 1.0;
        for j in 1..=l {
            z[idx(n, j, i)] = 0.0;
            z[idx(n, i, j)] = 0.0;
        }
    }
}

fn pythag(a: f64, b: f64) -> f64 {
    let abs_a = a.abs();
    let abs_b = b.abs();
    if abs_a > abs_b {
        abs_a * (1.0 + (abs_b / abs_a).powi(2)).sqrt()
    } else if abs_b == 0.0 {
        0.0
    } else {
        abs_b * (1.0 + (abs_a / abs_b).powi(2)).sqrt()
    }
}

fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 { a.abs() } else { -a.abs() }
}

fn tqli(d: &mut [f64], e: &mut [f64], n: usize, z: &mut [f64]) -> Result<(), KernelError> {
    for i in 2..=n {
        e[i - 1] = e[i];
    }
    e[n] = 0.0;

    for l in 1..=n {
        let mut iter = 0u32;
        loop {
            let mut m = l;
            while m <= n - 1 {
                let dd = d[m].abs() + d[m + 1].abs();
                if (e[m].abs() + dd) == dd {
                    break;
                }
                m += 1;
            }
            if m == l {
                break;
            }
            if iter == MAX_SWEEPS {
                return Err(KernelError::EigenNonConvergent {
                    sweeps: MAX_SWEEPS,
                    index: l,
                });
            }
            iter += 1;

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = pythag(g, 1.0);
            g = d[m] - d[l] + e[l] / (g + sign(r, g));
            let mut s = 1.0;
            let mut c = 1.0;
            let mut p = 0.0;
            let mut broke_early = false;
            let mut i = m - 1;
            loop {
                let mut f = s * e[i];
                let b = c * e[i];
                r = pythag(f, g);
                e[i + 1] = r;
                if r == 0.0 {
                    d[i + 1] -= p;
                    e[m] = 0.0;
                    broke_early = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                let delta = s * r;
                d[i + 1] = g + delta;
                p = delta;
                g = c * r - b;
                for k in 1..=n {
                    f = z[idx(n, k, i + 1)];
                    z[idx(n, k, i + 1)] = s * z[idx(n, k, i)] + c * f;
                    z[idx(n, k, i)] = c * z[idx(n, k, i)] - s * f;
                }
                if i == l {
                    break;
                }
                i -= 1;
            }
            if broke_early {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            e[m] = 0.0;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat_vec(a: &[f64], n: usize, v: &[f64]) -> Vec<f64> {
        (0..n)
            .map(|i| (0..n).map(|j| a[i * n + j] * v[j]).sum())
            .collect()
    }

    #[test]
    fn eigen_reconstructs_identity() {
        let n = 3;
        let a = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let (q, lambda) = eigen_sym(&a, n).unwrap();
        for &l in &lambda {
            assert!((l - 1.0).abs() < 1e-9);
        }
        // Columns of q must be unit vectors.
        for j in 0..n {
            let norm: f64 = (0..n).map(|i| q[i * n + j].powi(2)).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn eigen_reconstructs_symmetric_matrix() {
        let n = 4;
        // Symmetric positive-definite test matrix.
        let a = vec![
            4.0, 1.0, 0.0, 0.5, 1.0, 3.0, 0.7, 0.0, 0.0, 0.7, 2.0, 0.3, 0.5, 0.0, 0.3, 5.0,
        ];
        let (q, lambda) = eigen_sym(&a, n).unwrap();

        // Reconstruct A = Q diag(lambda) Q^T and compare.
        let mut recon = vec![0.0f64; n * n];
        for i in 0..n {
            for j in 0..n {
                let mut s = 0.0;
                for k in 0..n {
                    s += q[i * n + k] * lambda[k] * q[j * n + k];
                }
                recon[i * n + j] = s;
            }
        }
        for i in 0..n * n {
            let rel = (recon[i] - a[i]).abs() / a[i].abs().max(1.0);
            assert!(rel < 1e-9, "mismatch at {}: {} vs {}", i, recon[i], a[i]);
        }

        // Eigenvector columns diagonalise A.
        for j in 0..n {
            let col: Vec<f64> = (0..n).map(|i| q[i * n + j]).collect();
            let av = mat_vec(&a, n, &col);
            for i in 0..n {
                assert!((av[i] - lambda[j] * col[i]).abs() < 1e-7);
            }
        }
    }
}

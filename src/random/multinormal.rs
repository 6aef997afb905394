//! Multivariate normal sampling via eigen-root transform: given a covariance
//! matrix `Sigma = Q diag(lambda) Q^T`, samples are drawn as `mu + U z` where
//! `U[:,j] = Q[:,j] * sqrt(lambda_j)` and `z` is a standard-normal vector.
//! This is how the seed block and the pattern-weight solver turn a local
//! covariance into a draw without ever forming `Sigma^{1/2}` densely.

use crate::error::KernelError;
use crate::numeric::eigen_sym;

use super::gaussian::normal01_pair;
use super::RandomSource;

/// Precomputed `U = Q * diag(sqrt(lambda))` for a fixed covariance matrix,
/// reused across many draws with different means.
pub struct MultinormalWorkspace {
    n: usize,
    /// Row-major `n x n`; column `j` is the `j`th eigenvector scaled by
    /// `sqrt(lambda_j)`.
    u: Vec<f64>,
}

/// Builds a sampling workspace from a covariance matrix (row-major, `n x n`,
/// symmetric). Rejects negative eigenvalues beyond a small numerical
/// tolerance rather than silently clamping them, since a negative eigenvalue
/// means the supplied matrix was not actually positive semi-definite.
pub fn init_multinormal(sigma: &[f64], n: usize) -> Result<MultinormalWorkspace, KernelError> {
    let (q, lambda) = eigen_sym(sigma, n)?;

    let tol = -1.0e-8 * lambda.iter().cloned().fold(0.0_f64, f64::max).max(1.0);
    let bad: Vec<usize> = lambda
        .iter()
        .enumerate()
        .filter(|(_, &l)| l < tol)
        .map(|(i, _)| i)
        .collect();
    if !bad.is_empty() {
        return Err(KernelError::NotPositiveDefinite {
            row: bad[0],
            reason: "covariance matrix has a negative eigenvalue",
        });
    }

    let mut u = vec![0.0f64; n * n];
    for j in 0..n {
        let scale = lambda[j].max(0.0).sqrt();
        for i in 0..n {
            u[i * n + j] = q[i * n + j] * scale;
        }
    }

    Ok(MultinormalWorkspace { n, u })
}

/// Draws one sample `mu + U z` with `z` a fresh standard-normal vector of
/// length `n`. Consumes one or two uniforms per pair via [`normal01_pair`];
/// for odd `n` the trailing half of the last pair is drawn and discarded, so
/// the random stream advances identically regardless of parity.
pub fn draw_multinormal(ws: &MultinormalWorkspace, rng: &mut RandomSource, mu: &[f64]) -> Vec<f64> {
    assert_eq!(mu.len(), ws.n);
    let n = ws.n;
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

    let mut out = mu.to_vec();
    for i in 0..n {
        let mut s = 0.0;
        for j in 0..n {
            s += ws.u[i * n + j] * z[j];
        }
        out[i] += s;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_rejects_negative_eigenvalue() {
        // Symmetric but indefinite: eigenvalues are 3 and -1.
        let sigma = vec![1.0, 2.0, 2.0, 1.0];
        assert!(init_multinormal(&sigma, 2).is_err());
    }

    #[test]
    fn draw_multinormal_matches_mean_for_zero_noise_limit() {
        let n = 2;
        let sigma = vec![1.0e-30, 0.0, 0.0, 1.0e-30];
        let ws = init_multinormal(&sigma, n).unwrap();
        let mut rng = RandomSource::new(42);
        let mu = vec![5.0, -3.0];
        let sample = draw_multinormal(&ws, &mut rng, &mu);
        assert!((sample[0] - 5.0).abs() < 1e-12);
        assert!((sample[1] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn draw_multinormal_handles_odd_dimension() {
        let n = 3;
        let sigma = vec![2.0, 0.3, 0.1, 0.3, 1.5, 0.2, 0.1, 0.2, 1.0];
        let ws = init_multinormal(&sigma, n).unwrap();
        let mut rng = RandomSource::new(7);
        let mu = vec![0.0, 0.0, 0.0];
        let sample = draw_multinormal(&ws, &mut rng, &mu);
        assert_eq!(sample.len(), 3);
        assert!(sample.iter().all(|v| v.is_finite()));
    }
}

//! Box-Muller Gaussian pair generator, the cache-across-calls `normal(var)`
//! helper the refinement engine uses for residual draws, and the
//! Abramowitz-&-Stegun normal CDF with its Newton-Raphson inverse.

use std::f64::consts::PI;

use super::RandomSource;

/// Draws one independent standard-normal pair via Box-Muller.
/// `z1` is returned first; see [`GaussianCache`] for the engine's
/// cache-one-of-the-pair behaviour.
pub fn normal01_pair(rng: &mut RandomSource) -> (f64, f64) {
    let u1 = rng.uniform01();
    let u2 = rng.uniform01();
    let r = (-2.0 * u1.ln()).sqrt();
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}

/// Caches the second half of a Box-Muller pair between calls, exactly like
/// the reference engine's `normal(var)` helper: the first call of a pair
/// draws two uniforms and returns `z1 * sqrt(var)`, the second call returns
/// the cached `z2 * sqrt(var)` without consuming the random stream.
///
/// This makes simulation order observable in the output: interleaving calls
/// to `sample` from different call sites desynchronises the cache from
/// what a single linear draw schedule would produce.
#[derive(Debug, Default, Clone, Copy)]
pub struct GaussianCache {
    cached: Option<f64>,
}

impl GaussianCache {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Returns a zero-mean Gaussian sample with the given variance.
    pub fn sample(&mut self, rng: &mut RandomSource, var: f64) -> f64 {
        match self.cached.take() {
            Some(z2) => z2 * var.sqrt(),
            None => {
                let (z1, z2) = normal01_pair(rng);
                self.cached = Some(z2);
                z1 * var.sqrt()
            }
        }
    }
}

/// Abramowitz & Stegun rational approximation of the standard normal CDF,
/// built on the Numerical-Recipes `erfcc` complementary error function
/// (fractional error under 1.2e-7).
pub fn phi(x: f64) -> f64 {
    let x = x / 2.0f64.sqrt();
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265512223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398 + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let ans = t * poly.exp();
    let erfc = if x >= 0.0 { ans } else { 2.0 - ans };
    1.0 - 0.5 * erfc
}

/// Inverse standard normal CDF: solves `phi(x) - y = 0` by bracket widening
/// (multiplying the search bound by 10 until it brackets the root) followed
/// by safeguarded Newton-Raphson, at most 1000 iterations and 1e-10
/// absolute tolerance on `x`.
pub fn phi_inverse(y: f64) -> f64 {
    assert!((0.0..=1.0).contains(&y), "phi_inverse: y must be in [0, 1]");
    if y == 0.0 {
        return f64::NEG_INFINITY;
    }
    if y == 1.0 {
        return f64::INFINITY;
    }
    if y == 0.5 {
        return 0.0;
    }

    let (mut lo, mut hi) = if y > 0.5 {
        let mut lo = 0.0;
        let mut hi = 1.0;
        while phi(hi) < y {
            lo = hi;
            hi *= 10.0;
        }
        (lo, hi)
    } else {
        let mut hi = 0.0;
        let mut lo = -1.0;
        while phi(lo) > y {
            hi = lo;
            lo *= 10.0;
        }
        (lo, hi)
    };

    if phi(hi) == y {
        return hi;
    }
    if phi(lo) == y {
        return lo;
    }

    // Safeguarded Newton-Raphson (Newton step falling outside the current
    // bracket, or failing to halve it, falls back to bisection).
    let f = |x: f64| phi(x) - y;
    let fprime = |x: f64| (-x * x / 2.0).exp() / (2.0 * PI).sqrt();

    let (mut a, mut b) = if f(lo) < 0.0 { (lo, hi) } else { (hi, lo) };
    let mut x = 0.5 * (a + b);
    let mut dx_old = (b - a).abs();
    let mut dx = dx_old;
    let mut fx = f(x);
    let mut dfx = fprime(x);

    for _ in 0..1000 {
        let bisect_needed = (((x - b) * dfx - fx) * ((x - a) * dfx - fx) > 0.0)
            || (2.0 * fx).abs() > (dx_old * dfx).abs();
        if bisect_needed {
            dx_old = dx;
            dx = 0.5 * (b - a);
            x = a + dx;
            if a == x {
                return x;
            }
        } else {
            dx_old = dx;
            dx = fx / dfx;
            let temp = x;
            x -= dx;
            if temp == x {
                return x;
            }
        }
        if dx.abs() < 1e-10 {
            return x;
        }
        fx = f(x);
        dfx = fprime(x);
        if fx < 0.0 {
            a = x;
        } else {
            b = x;
        }
    }
    x
}

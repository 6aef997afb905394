//! Anisotropic correlation models. Every variant shares the same normalised,
//! ellipse-aware distance `d(dx, dy) = sqrt(txx*dx^2 + tyy*dy^2 + txy*dx*dy)`
//! and differs only in the scalar function applied to `d`.

use serde::{Deserialize, Serialize};

/// The eight correlation families the engine understands. `power` only
/// matters for [`CorrelationKind::GeneralizedExponential`] and
/// [`CorrelationKind::RationalQuadratic`]; it is ignored otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    Exponential,
    Spherical,
    Spherical2,
    Spherical5,
    Gaussian,
    GeneralizedExponential,
    RationalQuadratic,
    WhiteNoise,
}

/// An anisotropic correlation model: principal range `r1`, sub-range `r2`,
/// rotation `angle` (radians), sill `sigma2`, and the family-specific
/// `power` exponent (used only by two of the eight families).
///
/// `txx`, `tyy`, `txy` are derived from `(r1, r2, angle)` by
/// [`CorrelationModel::recompute_factors`], which every constructor and
/// rescale hook calls so they never drift out of sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationModel {
    pub kind: CorrelationKind,
    pub r1: f64,
    pub r2: f64,
    pub angle: f64,
    pub sigma2: f64,
    pub power: f64,
    txx: f64,
    tyy: f64,
    txy: f64,
    /// Set once `rescale_to_grid` has been applied; guards against a
    /// double application and lets `rescale_to_physical` assert symmetry.
    transformed: bool,
}

impl CorrelationModel {
    /// `r1`, `r2` must be strictly positive, `sigma2` strictly positive.
    /// `power` is only meaningful for the two variants that consult it.
    pub fn new(kind: CorrelationKind, r1: f64, r2: f64, angle: f64, sigma2: f64, power: f64) -> Self {
        assert!(r1 > 0.0 && r2 > 0.0 && sigma2 > 0.0, "range and sill must be positive");
        let mut model = Self {
            kind,
            r1,
            r2,
            angle,
            sigma2,
            power,
            txx: 0.0,
            tyy: 0.0,
            txy: 0.0,
            transformed: false,
        };
        model.recompute_factors();
        model
    }

    fn recompute_factors(&mut self) {
        let cos_rot = self.angle.cos();
        let sin_rot = self.angle.sin();
        let fac1 = 1.0 / (self.r1 * self.r1);
        let fac2 = 1.0 / (self.r2 * self.r2);
        self.txx = cos_rot * cos_rot * fac1 + sin_rot * sin_rot * fac2;
        self.tyy = sin_rot * sin_rot * fac1 + cos_rot * cos_rot * fac2;
        self.txy = 2.0 * cos_rot * sin_rot * (fac1 - fac2);
    }

    fn distance(&self, dx: f64, dy: f64) -> f64 {
        (self.txx * dx * dx + self.tyy * dy * dy + self.txy * dx * dy).max(0.0).sqrt()
    }

    fn corr_at(&self, d: f64) -> f64 {
        match self.kind {
            CorrelationKind::Exponential => (-3.0 * d).exp(),
            CorrelationKind::Spherical => {
                if d < 1.0 {
                    1.0 - d * (1.5 - 0.5 * d * d)
                } else {
                    0.0
                }
            }
            CorrelationKind::Spherical2 => {
                if d < 1.0 {
                    1.0 - (2.0 / std::f64::consts::PI) * (d * (1.0 - d * d).sqrt() + d.asin())
                } else {
                    0.0
                }
            }
            CorrelationKind::Spherical5 => {
                if d < 1.0 {
                    1.0 - d * (1.875 - d * d * (1.25 - 0.375 * d * d))
                } else {
                    0.0
                }
            }
            CorrelationKind::Gaussian => (-3.0 * d * d).exp(),
            CorrelationKind::GeneralizedExponential => (-3.0 * d.powf(self.power)).exp(),
            CorrelationKind::RationalQuadratic => {
                let scal = 20.0f64.powf(1.0 / self.power) - 1.0;
                (1.0 + scal * d * d).powf(-self.power)
            }
            CorrelationKind::WhiteNoise => {
                if d == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Correlation at an integer-offset lag. Guaranteed to equal
    /// [`CorrelationModel::corr_real`] at the same offset exactly: both
    /// funnel through the same `distance`/`corr_at` pair without rounding.
    pub fn corr_int(&self, dx: i64, dy: i64) -> f64 {
        self.corr_at(self.distance(dx as f64, dy as f64))
    }

    /// Correlation at a real-valued offset.
    pub fn corr_real(&self, dx: f64, dy: f64) -> f64 {
        self.corr_at(self.distance(dx, dy))
    }

    /// Switches ranges from physical to grid-node units (multiplies by
    /// `nx/xsize`, `ny/ysize`). A no-op if already transformed.
    pub fn rescale_to_grid(&mut self, nx: usize, ny: usize, xsize: f64, ysize: f64) {
        if !self.transformed {
            self.r1 *= nx as f64 / xsize;
            self.r2 *= ny as f64 / ysize;
            self.recompute_factors();
            self.transformed = true;
        }
    }

    /// Exact inverse of [`CorrelationModel::rescale_to_grid`]. A no-op if
    /// not currently transformed.
    pub fn rescale_to_physical(&mut self, nx: usize, ny: usize, xsize: f64, ysize: f64) {
        if self.transformed {
            self.r1 *= xsize / nx as f64;
            self.r2 *= ysize / ny as f64;
            self.recompute_factors();
            self.transformed = false;
        }
    }

    pub fn is_transformed(&self) -> bool {
        self.transformed
    }
}

//! External request shape for `draw_gauss_2d`, matching the spec's single
//! entry-point signature, plus its validation error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::correlation::CorrelationKind;
use super::flavour::Flavour;

/// The four variants the external interface exposes directly (a subset of
/// the eight [`CorrelationKind`] families the correlation model supports
/// internally). `Variant::Unknown` carries the original numeric tag so
/// callers can report it back without the engine ever constructing a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Spherical,
    Exponential,
    Gaussian,
    GeneralizedExponential,
    Unknown(i32),
}

impl Variant {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Variant::Spherical,
            2 => Variant::Exponential,
            3 => Variant::Gaussian,
            4 => Variant::GeneralizedExponential,
            other => Variant::Unknown(other),
        }
    }

    pub fn to_correlation_kind(self) -> Option<CorrelationKind> {
        match self {
            Variant::Spherical => Some(CorrelationKind::Spherical),
            Variant::Exponential => Some(CorrelationKind::Exponential),
            Variant::Gaussian => Some(CorrelationKind::Gaussian),
            Variant::GeneralizedExponential => Some(CorrelationKind::GeneralizedExponential),
            Variant::Unknown(_) => None,
        }
    }
}

/// Full set of inputs to `draw_gauss_2d`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRequest {
    pub nx: usize,
    pub ny: usize,
    pub xsize: f64,
    pub ysize: f64,
    pub variant: Variant,
    pub seed: u32,
    pub r1: f64,
    pub r2: f64,
    pub angle_deg: f64,
    pub power: f64,
    pub flavour: Flavour,
    pub debug: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("nx and ny must each be at least 2, got nx={nx} ny={ny}")]
    GridTooSmall { nx: usize, ny: usize },
    #[error("xsize and ysize must be positive, got xsize={xsize} ysize={ysize}")]
    NonPositiveExtent { xsize: f64, ysize: f64 },
    #[error("range r1/r2 must be positive, got r1={r1} r2={r2}")]
    NonPositiveRange { r1: f64, r2: f64 },
    #[error("power must lie in (0, 2] for a generalised-exponential variant, got {power}")]
    PowerOutOfRange { power: f64 },
}

impl DrawRequest {
    /// Validates everything the engine itself checks before allocating the
    /// working grid. An unknown variant is *not* an error here: per the
    /// external interface, it resolves to an absent grid further downstream
    /// rather than a validation failure.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.nx < 2 || self.ny < 2 {
            return Err(RequestError::GridTooSmall { nx: self.nx, ny: self.ny });
        }
        if self.xsize <= 0.0 || self.ysize <= 0.0 {
            return Err(RequestError::NonPositiveExtent {
                xsize: self.xsize,
                ysize: self.ysize,
            });
        }
        if self.r1 <= 0.0 || self.r2 <= 0.0 {
            return Err(RequestError::NonPositiveRange { r1: self.r1, r2: self.r2 });
        }
        if matches!(self.variant, Variant::GeneralizedExponential) && !(0.0 < self.power && self.power <= 2.0) {
            return Err(RequestError::PowerOutOfRange { power: self.power });
        }
        Ok(())
    }

    pub fn angle_radians(&self) -> f64 {
        self.angle_deg * std::f64::consts::PI / 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> DrawRequest {
        DrawRequest {
            nx: 5,
            ny: 5,
            xsize: 4.0,
            ysize: 4.0,
            variant: Variant::Spherical,
            seed: 12345,
            r1: 2.0,
            r2: 2.0,
            angle_deg: 0.0,
            power: 1.0,
            flavour: Flavour::Simple,
            debug: false,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn rejects_grid_too_small() {
        let mut req = base_request();
        req.nx = 1;
        assert_eq!(req.validate(), Err(RequestError::GridTooSmall { nx: 1, ny: 5 }));
    }

    #[test]
    fn rejects_non_positive_extent() {
        let mut req = base_request();
        req.xsize = 0.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn unknown_variant_still_validates() {
        let mut req = base_request();
        req.variant = Variant::from_code(0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_power_for_generalized_exponential() {
        let mut req = base_request();
        req.variant = Variant::GeneralizedExponential;
        req.power = 3.0;
        assert!(req.validate().is_err());
    }
}

//! Value types shared across the engine: the correlation model, grid
//! storage, the pattern-richness flavour, and the external draw request.

mod correlation;
mod flavour;
mod grid;
mod request;

pub use correlation::{CorrelationKind, CorrelationModel};
pub use flavour::Flavour;
pub use grid::Grid;
pub use request::{DrawRequest, RequestError, Variant};

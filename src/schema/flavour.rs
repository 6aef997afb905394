//! Pattern-richness selector for the dyadic refinement driver.

use serde::{Deserialize, Serialize};

/// Which neighbourhood catalogue the refinement driver builds at each
/// level. The three flavours share the same draw schedule (centres, tilted
/// midpoints, border edges); they differ only in how many rings of
/// already-drawn neighbours each pattern reaches out to. A candidate ring
/// offset may point at a peer on either side of a node (left/right,
/// above/below); only the side the draw order has already reached counts
/// as "already-drawn" — the refinement driver enforces this via
/// `Grid::is_drawn`, never by weighting an undrawn cell's placeholder zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavour {
    /// First-ring neighbours only: up to four per centre/tilted pattern,
    /// three per edge pattern.
    Simple,
    /// Adds second-ring axis-aligned neighbours at `+-2*lag`.
    Standard,
    /// Adds third-ring neighbours and seeds the working grid with a 5x5
    /// Cholesky-drawn anchor block instead of growing the corners.
    Detailed,
}

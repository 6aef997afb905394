//! Deterministic random number generation: the 32-bit LCG uniform source,
//! Box-Muller Gaussian draws with the engine's cross-call cache, and
//! eigen-root multivariate normal sampling built on top of both.

mod gaussian;
mod lcg;
mod multinormal;

pub use gaussian::{normal01_pair, phi, phi_inverse, GaussianCache};
pub use lcg::RandomSource;
pub use multinormal::{draw_multinormal, init_multinormal, MultinormalWorkspace};

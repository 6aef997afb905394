//! Dyadic refinement driver: fills a working grid of side `2^m + 1` from
//! its four corners (or, for the detailed flavour, a Cholesky-drawn 5x5
//! anchor block) inward, halving the lag at every level until it reaches 1.
//!
//! At each level every node is drawn from a neighbourhood pattern whose
//! kriging weights and residual variance are solved once and reused by
//! every node sharing that exact geometric shape — this reuse is what
//! keeps a dyadic-sized grid tractable.

use std::collections::HashMap;

use crate::error::KernelError;
use crate::random::{GaussianCache, RandomSource};
use crate::schema::{CorrelationModel, Flavour, Grid};

use super::pattern::PatternCatalogue;
use super::seed_block::{draw_seed_block, KrigingMode};

/// A canonical, sorted neighbour-offset list used to recognise when two
/// nodes share a geometric pattern within the same level.
type PatternKey = Vec<(i64, i64)>;

struct LevelState<'a> {
    catalogue: &'a mut PatternCatalogue,
    cache: HashMap<PatternKey, usize>,
    next_id: usize,
    mode: KrigingMode,
}

impl<'a> LevelState<'a> {
    fn new(catalogue: &'a mut PatternCatalogue, mode: KrigingMode) -> Self {
        catalogue.reset_offsets();
        Self { catalogue, cache: HashMap::new(), next_id: 1, mode }
    }

    /// Draws one node at `(x, y)` given raw candidate neighbour offsets
    /// (already scaled to the current lag). Offsets falling outside the
    /// grid, or pointing at a cell that has not been drawn yet, are
    /// dropped — a candidate list may list both already-drawn and
    /// not-yet-drawn peers of the same level (e.g. a centre two steps to
    /// the left has been drawn, one two steps to the right has not), and
    /// only the former may ever carry a nonzero kriging weight: an
    /// undrawn cell still reads back as `0.0`, and conditioning on that
    /// would corrupt the realisation. This is how boundary nodes, and
    /// nodes early in a level's draw order, naturally end up with fewer
    /// neighbours than later interior ones.
    fn draw_node(
        &mut self,
        grid: &mut Grid,
        mxind: i64,
        corr: &CorrelationModel,
        rng: &mut RandomSource,
        gauss: &mut GaussianCache,
        x: i64,
        y: i64,
        raw_candidates: &[(i64, i64)],
    ) -> Result<(), KernelError> {
        let mut offsets: Vec<(i64, i64)> = raw_candidates
            .iter()
            .copied()
            .filter(|(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                nx >= 1 && nx <= mxind && ny >= 1 && ny <= mxind && grid.is_drawn(nx, ny)
            })
            .collect();
        offsets.sort_unstable();
        offsets.dedup();

        if offsets.is_empty() {
            let value = gauss.sample(rng, corr.sigma2);
            grid.set(x, y, value);
            return Ok(());
        }

        let n = offsets.len();
        let pattern = match self.cache.get(&offsets) {
            Some(&p) => p,
            None => {
                let p = self.next_id;
                self.next_id += 1;
                if p > super::pattern::MAX_PATTERNS {
                    return Err(KernelError::IllegalArgument(format!(
                        "refinement level needs more than {} distinct patterns",
                        super::pattern::MAX_PATTERNS
                    )));
                }
                for (k, (dx, dy)) in offsets.iter().enumerate() {
                    self.catalogue.set_offset(p, 1, k + 1, *dx, *dy);
                }
                match self.mode {
                    KrigingMode::Simple => self.catalogue.solve_simple(p, n, corr)?,
                    KrigingMode::Ordinary => self.catalogue.solve_ordinary(p, n, corr)?,
                }
                self.cache.insert(offsets.clone(), p);
                p
            }
        };

        let weights = self.catalogue.weights(pattern);
        let mut mean = 0.0;
        for (w, (dx, dy)) in weights.iter().zip(offsets.iter()) {
            mean += w * grid.get(x + dx, y + dy);
        }
        let noise = gauss.sample(rng, self.catalogue.residual_variance(pattern));
        grid.set(x, y, mean + noise);
        Ok(())
    }
}

fn ring_count(flavour: Flavour) -> usize {
    match flavour {
        Flavour::Simple => 1,
        Flavour::Standard => 2,
        Flavour::Detailed => 3,
    }
}

/// Candidate neighbours for a square-centre node at lag `lag`: the four
/// diagonal corners of its enclosing square, then successively further
/// axis-aligned rings for the richer flavours.
///
/// Both directions of each ring are listed here; `draw_node`'s
/// already-drawn filter is what actually restricts a given node to the
/// peers that precede it in the level's row-major draw order (the
/// neighbour to the left and the one above, never the one to the right or
/// below), so the candidate list itself can stay the same irrespective of
/// where in the level a given node falls.
fn centre_candidates(lag: i64, rings: usize) -> Vec<(i64, i64)> {
    let mut v = vec![(-lag, -lag), (lag, -lag), (-lag, lag), (lag, lag)];
    if rings >= 2 {
        v.push((-2 * lag, 0));
        v.push((2 * lag, 0));
        v.push((0, -2 * lag));
        v.push((0, 2 * lag));
    }
    if rings >= 3 {
        v.push((-3 * lag, 0));
        v.push((3 * lag, 0));
        v.push((-4 * lag, 0));
        v.push((4 * lag, 0));
        v.push((0, -3 * lag));
        v.push((0, 3 * lag));
        v.push((0, -4 * lag));
        v.push((0, 4 * lag));
        v.push((-3 * lag, -3 * lag));
        v.push((3 * lag, 3 * lag));
    }
    v
}

/// Candidate neighbours for a square-step (tilted midpoint / border edge)
/// node: the four axis-aligned neighbours at distance `lag`, with richer
/// rings extended along `axis` (0 = extend along x, 1 = extend along y —
/// the axis on which the node sits between two already-drawn nodes).
///
/// As with [`centre_candidates`], both directions of each ring are listed
/// here and `draw_node`'s already-drawn filter drops whichever of the pair
/// hasn't been reached yet by the current traversal.
fn tilted_candidates(lag: i64, rings: usize, axis: usize) -> Vec<(i64, i64)> {
    let mut v = vec![(-lag, 0), (lag, 0), (0, -lag), (0, lag)];
    if rings >= 2 {
        if axis == 0 {
            v.push((-2 * lag, 0));
            v.push((2 * lag, 0));
        } else {
            v.push((0, -2 * lag));
            v.push((0, 2 * lag));
        }
    }
    if rings >= 3 {
        if axis == 0 {
            v.push((-3 * lag, 0));
            v.push((3 * lag, 0));
            v.push((-3 * lag, -3 * lag));
            v.push((3 * lag, 3 * lag));
        } else {
            v.push((0, -3 * lag));
            v.push((0, 3 * lag));
            v.push((-3 * lag, -3 * lag));
            v.push((3 * lag, 3 * lag));
        }
    }
    v
}

/// Draws the four corners of the working grid with progressively growing
/// neighbour sets: corner (1,1) has none, (1, mxind) sees one prior corner,
/// (mxind, 1) sees two, (mxind, mxind) sees all three.
fn draw_corners(
    grid: &mut Grid,
    mxind: i64,
    corr: &CorrelationModel,
    mode: KrigingMode,
    catalogue: &mut PatternCatalogue,
    rng: &mut RandomSource,
    gauss: &mut GaussianCache,
) -> Result<(), KernelError> {
    let mut level = LevelState::new(catalogue, mode);
    level.draw_node(grid, mxind, corr, rng, gauss, 1, 1, &[])?;
    level.draw_node(grid, mxind, corr, rng, gauss, 1, mxind, &[(0, -(mxind - 1))])?;
    level.draw_node(
        grid,
        mxind,
        corr,
        rng,
        gauss,
        mxind,
        1,
        &[(-(mxind - 1), 0), (-(mxind - 1), mxind - 1)],
    )?;
    level.draw_node(
        grid,
        mxind,
        corr,
        rng,
        gauss,
        mxind,
        mxind,
        &[(-(mxind - 1), 0), (0, -(mxind - 1)), (-(mxind - 1), -(mxind - 1))],
    )?;
    Ok(())
}

/// Runs one refinement level at lag `lag` (spacing between already-drawn
/// nodes is `2 * lag`): square centres, then interior tilted midpoints,
/// then the four border edges.
fn run_level(
    grid: &mut Grid,
    mxind: i64,
    lag: i64,
    flavour: Flavour,
    mode: KrigingMode,
    corr: &CorrelationModel,
    catalogue: &mut PatternCatalogue,
    rng: &mut RandomSource,
    gauss: &mut GaussianCache,
) -> Result<(), KernelError> {
    let rings = ring_count(flavour);
    let step = 2 * lag;
    let mut level = LevelState::new(catalogue, mode);

    // (a) square centres.
    let centre_cands = centre_candidates(lag, rings);
    let mut y = 1 + lag;
    while y <= mxind - lag {
        let mut x = 1 + lag;
        while x <= mxind - lag {
            level.draw_node(grid, mxind, corr, rng, gauss, x, y, &centre_cands)?;
            x += step;
        }
        y += step;
    }

    // (b) interior tilted midpoints: orientation A has x aligned to the
    // step grid (strictly interior) and y offset by lag; orientation B
    // mirrors this with the axes swapped.
    let cands_a = tilted_candidates(lag, rings, 1);
    let cands_b = tilted_candidates(lag, rings, 0);

    let mut x = 1 + step;
    while x < mxind {
        let mut y = 1 + lag;
        while y <= mxind - lag {
            level.draw_node(grid, mxind, corr, rng, gauss, x, y, &cands_a)?;
            y += step;
        }
        x += step;
    }

    let mut y = 1 + step;
    while y < mxind {
        let mut x = 1 + lag;
        while x <= mxind - lag {
            level.draw_node(grid, mxind, corr, rng, gauss, x, y, &cands_b)?;
            x += step;
        }
        y += step;
    }

    // (c) border edges: the same square-step offsets, restricted to the
    // four boundary lines, where the out-of-range neighbour is simply
    // dropped by `draw_node`'s bounds filter.
    for &x in &[1i64, mxind] {
        let mut y = 1 + lag;
        while y <= mxind - lag {
            level.draw_node(grid, mxind, corr, rng, gauss, x, y, &cands_a)?;
            y += step;
        }
    }
    for &y in &[1i64, mxind] {
        let mut x = 1 + lag;
        while x <= mxind - lag {
            level.draw_node(grid, mxind, corr, rng, gauss, x, y, &cands_b)?;
            x += step;
        }
    }

    Ok(())
}

/// Dyadic dimension `m = ceil(log2(max(nx, ny) - 1))` and the resulting
/// working-grid side `mxind = 2^m + 1`.
pub fn dyadic_dimension(nx: usize, ny: usize) -> (u32, usize) {
    let span = (nx.max(ny) - 1) as f64;
    let m = span.log2().ceil() as u32;
    (m, (1usize << m) + 1)
}

/// Runs the full refinement schedule: corners or seed block, then every
/// level from the outermost lag down to 1, returning the populated working
/// grid (still at its full `mxind x mxind` size; cropping is the caller's
/// job).
pub fn refine(
    mxind: usize,
    m: u32,
    flavour: Flavour,
    mode: KrigingMode,
    corr: &CorrelationModel,
    rng: &mut RandomSource,
) -> Result<Grid, KernelError> {
    let mxind_i = mxind as i64;
    let mut grid = Grid::square(mxind);
    let mut catalogue = PatternCatalogue::new();
    let mut gauss = GaussianCache::new();

    let start_level = if flavour == Flavour::Detailed {
        draw_seed_block(&mut grid, mxind, corr, mode, rng)?;
        2
    } else {
        draw_corners(&mut grid, mxind_i, corr, mode, &mut catalogue, rng, &mut gauss)?;
        0
    };

    for level in start_level..m {
        let lag = 1i64 << (m - level - 1);
        run_level(&mut grid, mxind_i, lag, flavour, mode, corr, &mut catalogue, rng, &mut gauss)?;
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CorrelationKind;

    #[test]
    fn dyadic_dimension_matches_scenario_one() {
        let (m, mxind) = dyadic_dimension(5, 5);
        assert_eq!(m, 2);
        assert_eq!(mxind, 5);
    }

    #[test]
    fn refine_fills_every_cell_simple_flavour() {
        let corr = CorrelationModel::new(CorrelationKind::Spherical, 2.0, 2.0, 0.0, 1.0, 1.0);
        let mut rng = RandomSource::new(12345);
        let (m, mxind) = dyadic_dimension(5, 5);
        let grid = refine(mxind, m, Flavour::Simple, KrigingMode::Simple, &corr, &mut rng).unwrap();
        for j in 1..=mxind as i64 {
            for i in 1..=mxind as i64 {
                assert!(grid.get(i, j).is_finite());
            }
        }
    }

    #[test]
    fn refine_detailed_flavour_seeds_then_refines() {
        let corr =
            CorrelationModel::new(CorrelationKind::GeneralizedExponential, 8.0, 8.0, 0.0, 1.0, 1.5);
        let mut rng = RandomSource::new(42);
        let (m, mxind) = dyadic_dimension(17, 17);
        let grid = refine(mxind, m, Flavour::Detailed, KrigingMode::Simple, &corr, &mut rng).unwrap();
        for j in 1..=mxind as i64 {
            for i in 1..=mxind as i64 {
                assert!(grid.get(i, j).is_finite());
            }
        }
    }

    #[test]
    fn refine_standard_flavour_handles_nonsquare_request() {
        let corr = CorrelationModel::new(CorrelationKind::Gaussian, 4.5, 1.125, 0.0, 1.0, 1.0);
        let mut rng = RandomSource::new(7);
        let (m, mxind) = dyadic_dimension(9, 9);
        let grid = refine(mxind, m, Flavour::Standard, KrigingMode::Simple, &corr, &mut rng).unwrap();
        assert_eq!(mxind, 9);
        assert!(grid.get(5, 5).is_finite());
    }

    /// A candidate list may name both an already-drawn neighbour and an
    /// in-bounds but not-yet-drawn one (exactly what `centre_candidates`/
    /// `tilted_candidates` hand `draw_node` for a node early in a level's
    /// traversal). Only the drawn one may end up in the solved pattern.
    #[test]
    fn undrawn_in_bounds_neighbour_is_excluded_from_pattern() {
        let corr = CorrelationModel::new(CorrelationKind::Exponential, 4.0, 4.0, 0.0, 1.0, 1.0);
        let mut grid = Grid::square(9);
        let mut catalogue = PatternCatalogue::new();
        let mut rng = RandomSource::new(1);
        let mut gauss = GaussianCache::new();
        let mut level = LevelState::new(&mut catalogue, KrigingMode::Simple);

        // Draw only the left neighbour at (3, 5); (7, 5) stays undrawn.
        level.draw_node(&mut grid, 9, &corr, &mut rng, &mut gauss, 3, 5, &[]).unwrap();
        assert!(grid.is_drawn(3, 5));
        assert!(!grid.is_drawn(7, 5));

        // A centre-style candidate naming both the drawn left neighbour and
        // the undrawn right neighbour must be conditioned on the left one
        // only — the undrawn one is dropped, not read as a spurious zero.
        level
            .draw_node(&mut grid, 9, &corr, &mut rng, &mut gauss, 5, 5, &[(-2, 0), (2, 0)])
            .unwrap();

        let pattern = level.cache.get(&vec![(-2i64, 0i64)]).copied();
        assert_eq!(pattern, Some(1), "pattern should contain only the single drawn neighbour");
        assert_eq!(catalogue.weights(1).len(), 1);
    }
}

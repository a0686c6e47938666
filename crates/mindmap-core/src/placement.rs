//! Polar placement of newly inserted nodes around their parent

use crate::model::{Node, Point};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::f64::consts::PI;

/// Angular slot width between consecutive siblings.
pub const ANGLE_STEP: f64 = PI / 6.0;
/// Upper bound of the angular jitter applied under non-root parents.
pub const MAX_JITTER: f64 = 0.1;
/// Ring radius around the root.
pub const ROOT_RING_RADIUS: f64 = 180.0;
/// Ring radius around any other node.
pub const CHILD_RING_RADIUS: f64 = 120.0;
/// Upper bound of the random radial spread.
pub const MAX_SPREAD: f64 = 30.0;

/// Computes positions for new nodes. Randomness is injected so tests can
/// seed it or replace it outright.
pub struct PlacementEngine {
    rng: Box<dyn RngCore + Send + Sync>,
}

impl std::fmt::Debug for PlacementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementEngine").finish_non_exhaustive()
    }
}

impl PlacementEngine {
    /// Engine seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible engine.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + Sync + 'static) -> Self {
        PlacementEngine { rng: Box::new(rng) }
    }

    /// Angle of the `sibling_count`-th child slot, jitter included.
    pub fn angle(&mut self, parent: &Node, sibling_count: usize) -> f64 {
        let jitter = if parent.is_central {
            0.0
        } else {
            self.rng.gen_range(0.0..MAX_JITTER)
        };
        sibling_count as f64 * ANGLE_STEP + jitter
    }

    /// Position for a new child of `parent` that already has
    /// `sibling_count` children.
    pub fn place(&mut self, parent: &Node, sibling_count: usize) -> Point {
        let angle = self.angle(parent, sibling_count);
        let base = if parent.is_central { ROOT_RING_RADIUS } else { CHILD_RING_RADIUS };
        let radius = base + self.rng.gen_range(0.0..MAX_SPREAD);
        Point::new(
            parent.position.x + angle.cos() * radius,
            parent.position.y + angle.sin() * radius,
        )
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}

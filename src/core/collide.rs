use rand::{Rng, rngs::StdRng};

use crate::{
    config,
    spatial::SpatialHash,
    types::{Entity, Vec2},
};

/// Pairwise overlap relaxation on predicted positions (`pos + vel`).
/// Corrections go into velocities so the integrator's damping applies to them.
#[derive(Debug)]
pub struct Collider {
    spatial: SpatialHash,
    neighbors: Vec<usize>,
    radii: Vec<f32>,
    predicted: Vec<Vec2>,
}

impl Collider {
    pub fn new() -> Self {
        Self {
            spatial: SpatialHash::new(2.0 * config::CIRCLE_MAX_RADIUS),
            neighbors: Vec::new(),
            radii: Vec::new(),
            predicted: Vec::new(),
        }
    }

    /// Returns the number of overlapping pairs that were pushed apart.
    pub fn resolve(
        &mut self,
        entities: &mut [Entity],
        padding: f32,
        iterations: u32,
        rng: &mut StdRng,
    ) -> usize {
        self.radii.clear();
        self.radii.extend(entities.iter().map(|e| e.radius + padding));
        let max_radius = self.radii.iter().copied().fold(0.0, f32::max);
        if max_radius <= 0.0 {
            return 0;
        }

        let mut resolved = 0;
        for _ in 0..iterations {
            self.predicted.clear();
            self.predicted.extend(entities.iter().map(|e| e.pos + e.vel));
            self.spatial
                .rebuild_with(2.0 * max_radius, self.predicted.iter().copied());

            for i in 0..entities.len() {
                let xi = self.predicted[i];
                let ri = self.radii[i];
                let ri_sq = ri * ri;
                self.spatial.query_neighbors(xi, &mut self.neighbors);
                for &j in &self.neighbors {
                    if j <= i {
                        continue;
                    }
                    let (left, right) = entities.split_at_mut(j);
                    let a = &mut left[i];
                    let b = &mut right[0];

                    let rj = self.radii[j];
                    let min_dist = ri + rj;
                    let mut delta = xi - (b.pos + b.vel);
                    let mut dist_sq = delta.length_sq();
                    if dist_sq >= min_dist * min_dist {
                        continue;
                    }
                    if delta.x == 0.0 {
                        delta.x = jiggle(rng);
                        dist_sq += delta.x * delta.x;
                    }
                    if delta.y == 0.0 {
                        delta.y = jiggle(rng);
                        dist_sq += delta.y * delta.y;
                    }
                    let dist = dist_sq.sqrt();
                    let push = delta * ((min_dist - dist) / dist);
                    // The smaller body takes the larger share of the correction.
                    let rj_sq = rj * rj;
                    let share = rj_sq / (ri_sq + rj_sq);
                    a.vel += push * share;
                    b.vel -= push * (1.0 - share);
                    resolved += 1;
                }
            }
        }
        resolved
    }
}

fn jiggle(rng: &mut StdRng) -> f32 {
    let magnitude = rng.gen_range(0.5..1.0) * config::JIGGLE;
    if rng.gen_bool(0.5) { magnitude } else { -magnitude }
}

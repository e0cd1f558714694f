//! World generation — plot layout and resource scatter.
//!
//! Deterministic per world seed: the same seed always produces the same
//! homestead. Nodes never stack on one tile, and the center of the plot
//! stays clear so new players spawn onto open grass.

use crate::tables::*;
use homestead_logic::constants::node_kinds;
use homestead_logic::fieldwork::{node_hardness, node_max_health};
use spacetimedb::{ReducerContext, Table};

pub const PLOT_WIDTH: i32 = 24;
pub const PLOT_HEIGHT: i32 = 18;

/// Tiles to scatter nodes over, as a fraction of the plot.
const NODE_DENSITY: f32 = 0.18;

/// Half-extent of the clear spawn area around the plot center.
const SPAWN_CLEARING: i32 = 3;

/// Seeded LCG random number generator (no external crate).
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn from_seed(seed: u64) -> Self {
        // Avoid the all-zero state; splash the seed bits around first.
        Self {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407) | 1,
        }
    }

    fn next_f32(&mut self) -> f32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 33) as f32) / (u32::MAX as f32)
    }

    fn next_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let range = (max - min) as f32;
        min + (self.next_f32() * range) as i32
    }
}

/// Weighted node kind pick: mostly trees and rocks, the odd boulder.
fn pick_node_kind(rng: &mut SimpleRng) -> u8 {
    let roll = rng.next_f32();
    if roll < 0.40 {
        node_kinds::TREE
    } else if roll < 0.65 {
        node_kinds::ROCK
    } else if roll < 0.80 {
        node_kinds::BUSH
    } else if roll < 0.95 {
        node_kinds::WEEDS
    } else {
        node_kinds::BOULDER
    }
}

fn in_spawn_clearing(x: i32, y: i32) -> bool {
    let cx = PLOT_WIDTH / 2;
    let cy = PLOT_HEIGHT / 2;
    (x - cx).abs() <= SPAWN_CLEARING && (y - cy).abs() <= SPAWN_CLEARING
}

/// Scatter resource nodes across the plot. Returns how many were placed.
pub fn generate_world(ctx: &ReducerContext, seed: u64) -> u32 {
    let mut rng = SimpleRng::from_seed(seed);
    let target = ((PLOT_WIDTH * PLOT_HEIGHT) as f32 * NODE_DENSITY) as u32;

    let mut occupied: Vec<(i32, i32)> = Vec::new();
    let mut placed = 0u32;
    // Bounded attempts: a dense plot stops when it runs out of free tiles.
    let max_attempts = target * 10;
    let mut attempts = 0u32;

    while placed < target && attempts < max_attempts {
        attempts += 1;
        let x = rng.next_i32(0, PLOT_WIDTH);
        let y = rng.next_i32(0, PLOT_HEIGHT);
        if in_spawn_clearing(x, y) || occupied.contains(&(x, y)) {
            continue;
        }
        let kind = pick_node_kind(&mut rng);
        ctx.db.resource_node().insert(ResourceNode {
            id: 0,
            x,
            y,
            kind,
            health: node_max_health(kind),
            hardness: node_hardness(kind),
            respawn_at: 0.0,
        });
        occupied.push((x, y));
        placed += 1;
    }

    placed
}

//! Resource node respawn system.

use crate::tables::*;
use homestead_logic::fieldwork::node_max_health;
use spacetimedb::{ReducerContext, Table};

/// Bring depleted nodes back once their respawn timer lapses.
pub fn tick_respawn(ctx: &ReducerContext, sim_time: f64) {
    for node in ctx.db.resource_node().iter() {
        if node.health > 0.0 || node.respawn_at <= 0.0 || sim_time < node.respawn_at {
            continue;
        }
        let mut n = node;
        n.health = node_max_health(n.kind);
        n.respawn_at = 0.0;
        let id = n.id;
        ctx.db.resource_node().id().update(n);
        log::info!("Resource node {} respawned", id);
    }
}

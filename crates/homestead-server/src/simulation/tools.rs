//! Tool charge regeneration system.

use crate::tables::*;
use homestead_logic::tools::{regenerate, MAX_CHARGE};
use spacetimedb::{ReducerContext, Table};

/// Regenerate every equipped tool's charge toward full.
pub fn tick_tools(ctx: &ReducerContext, dt_secs: f32) {
    if dt_secs <= 0.0 {
        return;
    }
    for tool in ctx.db.tool_state().iter() {
        if tool.charge >= MAX_CHARGE {
            continue;
        }
        let mut t = tool;
        t.charge = regenerate(t.charge, dt_secs);
        ctx.db.tool_state().id().update(t);
    }
}

//! Crop growth system - advances planted crops each tick.

use crate::tables::*;
use homestead_logic::constants::tile_states;
use homestead_logic::crops::advance_growth;
use spacetimedb::{ReducerContext, Table};

/// Advance every planted crop by `dt_secs` of sim time. Watered tiles
/// grow crops faster; the water is consumed when a stage completes.
pub fn tick_crops(ctx: &ReducerContext, dt_secs: f64) {
    if dt_secs <= 0.0 {
        return;
    }
    for crop in ctx.db.crop().iter() {
        let mut c = crop;

        let tile = ctx
            .db
            .plot_tile()
            .iter()
            .find(|t| t.x == c.x && t.y == c.y);
        let watered = tile
            .as_ref()
            .is_some_and(|t| t.state == tile_states::WATERED);

        let (stage, progress) = advance_growth(c.kind, c.stage, c.progress, dt_secs, watered);
        let stage_completed = stage != c.stage;
        if stage_completed || (progress - c.progress).abs() > f64::EPSILON {
            c.stage = stage;
            c.progress = progress;
            ctx.db.crop().id().update(c);
        }

        // Water is spent once it has pushed the crop over a stage.
        if stage_completed && watered {
            if let Some(mut t) = tile {
                t.state = tile_states::TILLED;
                ctx.db.plot_tile().id().update(t);
            }
        }
    }
}

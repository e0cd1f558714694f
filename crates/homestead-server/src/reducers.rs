//! Client-facing reducers for game interaction and simulation ticking.
//!
//! Every reducer that acts on behalf of a player resolves `ctx.sender`
//! to an actor, validates the proposal through `homestead-logic`, applies
//! the mutation, and posts the verdict into that actor's `action_result`
//! row. Rejections respond `applied = false` — only a malformed call with
//! no resolvable actor is dropped with a log line, since there is nobody
//! to target the response at.

use crate::generation;
use crate::simulation;
use crate::tables::*;
use homestead_logic::constants::{action_kinds, items, request_kinds, tile_states, tool_kinds};
use homestead_logic::fieldwork::{self, ApplyOutcome, CropView, NodeView, PlotBounds, TileView};
use homestead_logic::ledger::{CreditOutcome, DebitOutcome};
use homestead_logic::shop::{self, CatalogEntry};
use homestead_logic::tools::{self, Tool};
use spacetimedb::{reducer, ReducerContext, Table};
use std::sync::OnceLock;

const SHOP_CATALOG_JSON: &str = include_str!("../../../data/shop_catalog.json");

const STARTING_BALANCE: i64 = 500;
const STARTING_SEEDS: u32 = 5;
const NODE_RESPAWN_SECS: f64 = 600.0;
const INVENTORY_SLOTS: u8 = 16;

fn catalog() -> &'static [CatalogEntry] {
    static CATALOG: OnceLock<Vec<CatalogEntry>> = OnceLock::new();
    CATALOG.get_or_init(|| match serde_json::from_str(SHOP_CATALOG_JSON) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Shop catalog failed to parse: {}", e);
            Vec::new()
        }
    })
}

// ============================================================================
// CONNECTION LIFECYCLE
// ============================================================================

/// Called when a client connects
#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    ctx.db.connected_player().insert(ConnectedPlayer {
        identity: ctx.sender,
        actor_id: None,
        connected_at: ctx.timestamp,
    });
}

/// Called when a client disconnects
#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    if let Some(player) = ctx.db.connected_player().identity().find(ctx.sender) {
        ctx.db.connected_player().identity().delete(player.identity);
    }
}

/// Player joins the homestead and creates their character
#[reducer]
pub fn player_join(ctx: &ReducerContext, name: String) {
    log::info!("Player joining: {}", name);

    if let Some(player) = ctx.db.connected_player().identity().find(ctx.sender) {
        if player.actor_id.is_some() {
            log::warn!("Player already has a character!");
            return;
        }
    }

    let (spawn_x, spawn_y) = match ctx.db.world_config().id().find(0) {
        Some(config) => (config.plot_width / 2, config.plot_height / 2),
        None => {
            log::warn!("World not initialized, cannot join");
            return;
        }
    };

    let actor_id = ctx
        .db
        .player()
        .insert(Player {
            id: 0,
            name,
            x: spawn_x,
            y: spawn_y,
            owner_identity: ctx.sender,
        })
        .id;

    // Starter toolkit: one tool per equipment slot, full charge.
    let starter_tools = [
        tool_kinds::AXE,
        tool_kinds::PICKAXE,
        tool_kinds::SCYTHE,
        tool_kinds::HOE,
        tool_kinds::WATERING_CAN,
    ];
    for (slot, kind) in starter_tools.iter().enumerate() {
        ctx.db.tool_state().insert(ToolState {
            id: 0,
            owner_id: actor_id,
            slot: slot as u8,
            kind: *kind,
            tier: 1,
            charge: tools::MAX_CHARGE,
        });
    }

    grant_item(ctx, actor_id, items::PARSNIP_SEED, STARTING_SEEDS);

    // Link player to connection
    if let Some(mut player) = ctx.db.connected_player().identity().find(ctx.sender) {
        player.actor_id = Some(actor_id);
        ctx.db.connected_player().identity().update(player);
    }

    log::info!("Player character created with id {}", actor_id);
}

// ============================================================================
// HELPERS
// ============================================================================

/// Map the calling connection to its actor id.
fn resolve_actor(ctx: &ReducerContext) -> Option<u64> {
    ctx.db
        .connected_player()
        .identity()
        .find(ctx.sender)
        .and_then(|p| p.actor_id)
}

/// Post the verdict for `actor_id`'s in-flight request. One row per actor:
/// the newest verdict overwrites whatever was there, and the client's
/// correlator drops anything whose `seq` it is not waiting on.
fn post_result(
    ctx: &ReducerContext,
    actor_id: u64,
    seq: u32,
    applied: bool,
    request_kind: u8,
    reason: String,
) {
    let row = ActionResult {
        actor_id,
        seq,
        applied,
        request_kind,
        reason,
    };
    if ctx.db.action_result().actor_id().find(actor_id).is_some() {
        ctx.db.action_result().actor_id().update(row);
    } else {
        ctx.db.action_result().insert(row);
    }
}

/// Add items to a player's inventory, merging into an existing stack or
/// taking the first free slot.
fn grant_item(ctx: &ReducerContext, owner_id: u64, item_id: u16, quantity: u32) {
    if quantity == 0 {
        return;
    }
    if let Some(mut stack) = ctx
        .db
        .item_stack()
        .iter()
        .find(|s| s.owner_id == owner_id && s.item_id == item_id)
    {
        stack.quantity += quantity;
        ctx.db.item_stack().id().update(stack);
        return;
    }
    let used: Vec<u8> = ctx
        .db
        .item_stack()
        .iter()
        .filter(|s| s.owner_id == owner_id)
        .map(|s| s.slot)
        .collect();
    let Some(slot) = (0..INVENTORY_SLOTS).find(|s| !used.contains(s)) else {
        log::warn!("Inventory full for actor {}, dropping {} items", owner_id, quantity);
        return;
    };
    ctx.db.item_stack().insert(ItemStack {
        id: 0,
        owner_id,
        slot,
        item_id,
        quantity,
    });
}

fn tile_row_at(ctx: &ReducerContext, x: i32, y: i32) -> Option<PlotTile> {
    ctx.db.plot_tile().iter().find(|t| t.x == x && t.y == y)
}

// ============================================================================
// LEDGER REDUCERS
// ============================================================================

/// Debit the shared treasury. The verdict is targeted at the caller; the
/// balance change itself is broadcast through the public `ledger` table.
#[reducer]
pub fn try_debit(ctx: &ReducerContext, seq: u32, amount: i64) {
    let Some(actor_id) = resolve_actor(ctx) else {
        log::warn!("try_debit from connection with no character");
        return;
    };
    let Some(mut row) = ctx.db.ledger().id().find(0) else {
        post_result(ctx, actor_id, seq, false, request_kinds::DEBIT, "world not initialized".into());
        return;
    };
    match homestead_logic::ledger::try_debit(row.balance, amount) {
        DebitOutcome::Applied { new_balance } => {
            row.balance = new_balance;
            ctx.db.ledger().id().update(row);
            post_result(ctx, actor_id, seq, true, request_kinds::DEBIT, String::new());
        }
        DebitOutcome::Rejected { shortfall } => {
            log::info!(
                "Debit of {} rejected for actor {}: short {} coins",
                amount,
                actor_id,
                shortfall
            );
            post_result(
                ctx,
                actor_id,
                seq,
                false,
                request_kinds::DEBIT,
                format!("insufficient funds: short {}", shortfall),
            );
        }
    }
}

/// Credit the shared treasury. Credits cannot fail, so there is no
/// targeted response — subscribers see the new balance on the `ledger`
/// table and that is the whole story.
#[reducer]
pub fn try_credit(ctx: &ReducerContext, amount: i64) {
    credit_treasury(ctx, amount);
}

fn credit_treasury(ctx: &ReducerContext, amount: i64) {
    let Some(mut row) = ctx.db.ledger().id().find(0) else {
        log::warn!("credit before world init");
        return;
    };
    match homestead_logic::ledger::try_credit(row.balance, amount) {
        CreditOutcome::Applied { new_balance, clamped } => {
            if clamped {
                log::info!("Credit clamped at treasury ceiling");
            }
            row.balance = new_balance;
            ctx.db.ledger().id().update(row);
        }
        CreditOutcome::Rejected => {
            log::warn!("Rejected negative credit of {}", amount);
        }
    }
}

/// Buy from the shop: debit the shared treasury, and only on success
/// grant the items.
#[reducer]
pub fn buy_item(ctx: &ReducerContext, seq: u32, item_id: u16, quantity: u32) {
    let Some(actor_id) = resolve_actor(ctx) else {
        log::warn!("buy_item from connection with no character");
        return;
    };
    let Some(entry) = shop::find_entry(catalog(), item_id) else {
        post_result(ctx, actor_id, seq, false, request_kinds::PURCHASE, "unknown item".into());
        return;
    };
    let Some(cost) = shop::purchase_cost(entry, quantity) else {
        post_result(ctx, actor_id, seq, false, request_kinds::PURCHASE, "bad quantity".into());
        return;
    };
    let Some(mut row) = ctx.db.ledger().id().find(0) else {
        post_result(ctx, actor_id, seq, false, request_kinds::PURCHASE, "world not initialized".into());
        return;
    };
    match homestead_logic::ledger::try_debit(row.balance, cost) {
        DebitOutcome::Applied { new_balance } => {
            row.balance = new_balance;
            ctx.db.ledger().id().update(row);
            grant_item(ctx, actor_id, item_id, quantity);
            post_result(ctx, actor_id, seq, true, request_kinds::PURCHASE, String::new());
            log::info!(
                "Actor {} bought {}x {} for {} coins",
                actor_id,
                quantity,
                entry.name,
                cost
            );
        }
        DebitOutcome::Rejected { shortfall } => {
            log::info!(
                "Purchase of {}x {} rejected: short {} coins",
                quantity,
                entry.name,
                shortfall
            );
            post_result(
                ctx,
                actor_id,
                seq,
                false,
                request_kinds::PURCHASE,
                format!("insufficient funds: short {}", shortfall),
            );
        }
    }
}

/// Sell items back to the shop: remove the stack first, then credit the
/// treasury (a credit cannot fail, so ordering is safe).
#[reducer]
pub fn sell_item(ctx: &ReducerContext, seq: u32, item_id: u16, quantity: u32) {
    let Some(actor_id) = resolve_actor(ctx) else {
        log::warn!("sell_item from connection with no character");
        return;
    };
    if quantity == 0 {
        post_result(ctx, actor_id, seq, false, request_kinds::SALE, "bad quantity".into());
        return;
    }
    let Some(entry) = shop::find_entry(catalog(), item_id) else {
        post_result(ctx, actor_id, seq, false, request_kinds::SALE, "unknown item".into());
        return;
    };
    let Some(mut stack) = ctx
        .db
        .item_stack()
        .iter()
        .find(|s| s.owner_id == actor_id && s.item_id == item_id)
    else {
        post_result(ctx, actor_id, seq, false, request_kinds::SALE, "nothing to sell".into());
        return;
    };
    if stack.quantity < quantity {
        post_result(ctx, actor_id, seq, false, request_kinds::SALE, "nothing to sell".into());
        return;
    }

    if stack.quantity == quantity {
        ctx.db.item_stack().id().delete(stack.id);
    } else {
        stack.quantity -= quantity;
        ctx.db.item_stack().id().update(stack);
    }
    credit_treasury(ctx, shop::sale_value(entry, quantity));
    post_result(ctx, actor_id, seq, true, request_kinds::SALE, String::new());
}

// ============================================================================
// TOOL ACTIONS
// ============================================================================

/// Validate and apply one proposed tool action at a plot position.
///
/// `slot` names an equipment slot for tool actions, or the inventory slot
/// holding the seed for planting. Harvesting ignores it.
#[reducer]
pub fn try_apply_action(ctx: &ReducerContext, seq: u32, action_kind: u8, x: i32, y: i32, slot: u8) {
    let Some(actor_id) = resolve_actor(ctx) else {
        log::warn!("try_apply_action from connection with no character");
        return;
    };
    let Some(config) = ctx.db.world_config().id().find(0) else {
        post_result(ctx, actor_id, seq, false, action_kind, "world not initialized".into());
        return;
    };
    let bounds = PlotBounds {
        width: config.plot_width,
        height: config.plot_height,
    };

    // Snapshot the world state the validators need.
    let nodes: Vec<NodeView> = ctx
        .db
        .resource_node()
        .iter()
        .map(|n| NodeView {
            id: n.id,
            x: n.x,
            y: n.y,
            kind: n.kind,
            health: n.health,
            hardness: n.hardness,
        })
        .collect();
    let tiles: Vec<TileView> = ctx
        .db
        .plot_tile()
        .iter()
        .map(|t| TileView {
            x: t.x,
            y: t.y,
            state: t.state,
        })
        .collect();
    let crop_views: Vec<CropView> = ctx
        .db
        .crop()
        .iter()
        .map(|c| CropView {
            id: c.id,
            x: c.x,
            y: c.y,
            kind: c.kind,
            stage: c.stage,
        })
        .collect();

    let equipped_tool = ctx
        .db
        .tool_state()
        .iter()
        .find(|t| t.owner_id == actor_id && t.slot == slot);

    let outcome = match action_kind {
        action_kinds::CHOP | action_kinds::MINE | action_kinds::CUT => match &equipped_tool {
            Some(t) => fieldwork::swing(
                action_kind,
                x,
                y,
                &Tool::new(t.kind, t.tier, t.charge),
                &nodes,
            ),
            None => ApplyOutcome::WrongTool,
        },
        action_kinds::TILL => match &equipped_tool {
            Some(t) => fieldwork::till(
                x,
                y,
                &Tool::new(t.kind, t.tier, t.charge),
                &bounds,
                &tiles,
                &nodes,
            ),
            None => ApplyOutcome::WrongTool,
        },
        action_kinds::WATER => match &equipped_tool {
            Some(t) => fieldwork::water(x, y, &Tool::new(t.kind, t.tier, t.charge), &tiles),
            None => ApplyOutcome::WrongTool,
        },
        action_kinds::PLANT => {
            let seed_item = ctx
                .db
                .item_stack()
                .iter()
                .find(|s| s.owner_id == actor_id && s.slot == slot && s.quantity > 0)
                .map(|s| s.item_id);
            match seed_item {
                Some(item) => fieldwork::plant(x, y, item, &tiles, &crop_views),
                None => ApplyOutcome::WrongTool,
            }
        }
        action_kinds::HARVEST => fieldwork::harvest(x, y, &crop_views),
        _ => {
            log::warn!("Unknown action kind {}", action_kind);
            ApplyOutcome::NoTarget
        }
    };

    commit_outcome(ctx, actor_id, action_kind, x, y, slot, config.sim_time, &outcome);

    if !outcome.applied() {
        log::info!(
            "Action '{}' at ({}, {}) rejected for actor {}: {}",
            action_kinds::name(action_kind),
            x,
            y,
            actor_id,
            outcome.reason()
        );
    }
    post_result(
        ctx,
        actor_id,
        seq,
        outcome.applied(),
        action_kind,
        outcome.reason().to_string(),
    );
}

/// Apply the world mutation a validated action calls for.
fn commit_outcome(
    ctx: &ReducerContext,
    actor_id: u64,
    action_kind: u8,
    x: i32,
    y: i32,
    slot: u8,
    sim_time: f64,
    outcome: &ApplyOutcome,
) {
    match *outcome {
        ApplyOutcome::NodeDamaged { node_id, remaining } => {
            if let Some(mut node) = ctx.db.resource_node().id().find(node_id) {
                node.health = remaining;
                ctx.db.resource_node().id().update(node);
            }
        }
        ApplyOutcome::NodeDepleted {
            node_id,
            drop_item,
            drop_count,
            replaced_by,
        } => {
            grant_item(ctx, actor_id, drop_item, drop_count);
            if let Some(mut node) = ctx.db.resource_node().id().find(node_id) {
                match replaced_by {
                    Some(kind) => {
                        node.kind = kind;
                        node.health = fieldwork::node_max_health(kind);
                        node.hardness = fieldwork::node_hardness(kind);
                    }
                    None => {
                        node.health = 0.0;
                        node.respawn_at = sim_time + NODE_RESPAWN_SECS;
                    }
                }
                ctx.db.resource_node().id().update(node);
            }
        }
        ApplyOutcome::TileTilled => {
            ctx.db.plot_tile().insert(PlotTile {
                id: 0,
                x,
                y,
                state: tile_states::TILLED,
            });
        }
        ApplyOutcome::TileWatered => {
            if let Some(mut tile) = tile_row_at(ctx, x, y) {
                tile.state = tile_states::WATERED;
                ctx.db.plot_tile().id().update(tile);
            }
        }
        ApplyOutcome::Planted { crop_kind } => {
            if let Some(mut stack) = ctx
                .db
                .item_stack()
                .iter()
                .find(|s| s.owner_id == actor_id && s.slot == slot)
            {
                if stack.quantity <= 1 {
                    ctx.db.item_stack().id().delete(stack.id);
                } else {
                    stack.quantity -= 1;
                    ctx.db.item_stack().id().update(stack);
                }
            }
            ctx.db.crop().insert(Crop {
                id: 0,
                x,
                y,
                kind: crop_kind,
                stage: 0,
                progress: 0.0,
            });
        }
        ApplyOutcome::Harvested {
            crop_id,
            yield_item,
            yield_count,
            regrow_stage,
        } => {
            grant_item(ctx, actor_id, yield_item, yield_count);
            match regrow_stage {
                Some(stage) => {
                    if let Some(mut crop) = ctx.db.crop().id().find(crop_id) {
                        crop.stage = stage;
                        crop.progress = 0.0;
                        ctx.db.crop().id().update(crop);
                    }
                }
                None => {
                    ctx.db.crop().id().delete(crop_id);
                }
            }
        }
        _ => return,
    }

    // A landed tool action spends charge.
    if outcome.applied() && tools::action_needs_tool(action_kind) {
        if let Some(mut tool) = ctx
            .db
            .tool_state()
            .iter()
            .find(|t| t.owner_id == actor_id && t.slot == slot)
        {
            tool.charge = (tool.charge - tools::swing_cost(action_kind)).max(0.0);
            ctx.db.tool_state().id().update(tool);
        }
    }
}

// ============================================================================
// SIMULATION CONTROL REDUCERS
// ============================================================================

/// Pause/unpause the simulation
#[reducer]
pub fn set_paused(ctx: &ReducerContext, paused: bool) {
    if let Some(mut config) = ctx.db.world_config().id().find(0) {
        config.paused = paused;
        ctx.db.world_config().id().update(config);
        log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
    }
}

/// Set simulation time scale
#[reducer]
pub fn set_time_scale(ctx: &ReducerContext, scale: f32) {
    if let Some(mut config) = ctx.db.world_config().id().find(0) {
        config.time_scale = scale.clamp(0.0, 100.0);
        ctx.db.world_config().id().update(config);
        log::info!("Time scale set to {}", scale);
    }
}

// ============================================================================
// WORLD SETUP & SIMULATION TICK
// ============================================================================

/// Create the world: config and treasury singletons, then the plot scatter.
#[reducer]
pub fn init_world(ctx: &ReducerContext, name: String, seed: u64) {
    if ctx.db.world_config().id().find(0).is_some() {
        log::warn!("World already initialized!");
        return;
    }
    ctx.db.world_config().insert(WorldConfig {
        id: 0,
        name: name.clone(),
        seed,
        plot_width: generation::PLOT_WIDTH,
        plot_height: generation::PLOT_HEIGHT,
        sim_time: 0.0,
        time_scale: 1.0,
        paused: false,
    });
    ctx.db.ledger().insert(Ledger {
        id: 0,
        balance: STARTING_BALANCE,
    });
    let node_count = generation::generate_world(ctx, seed);
    log::info!(
        "World '{}' initialized with {} resource nodes (treasury: {} coins)",
        name,
        node_count,
        STARTING_BALANCE
    );
}

/// Main simulation tick - called by client or scheduled reducer
#[reducer]
pub fn tick(ctx: &ReducerContext, delta_seconds: f32) {
    let Some(mut config) = ctx.db.world_config().id().find(0) else {
        return;
    };
    if config.paused {
        return;
    }

    let scaled_delta = (delta_seconds * config.time_scale) as f64;
    config.sim_time += scaled_delta;
    ctx.db.world_config().id().update(config.clone());

    simulation::tick_crops(ctx, scaled_delta);
    simulation::tick_respawn(ctx, config.sim_time);
    simulation::tick_tools(ctx, scaled_delta as f32);
}

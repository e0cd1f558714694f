//! SpacetimeDB table definitions for the homestead simulation.
//!
//! Public tables double as the broadcast channel: every subscribed client
//! observes each committed row, so a `ledger` update *is* the
//! balance-changed broadcast. Targeted results ride in `action_result`,
//! keyed by actor so a verdict can only ever land on its requester.

use spacetimedb::{table, Identity, Timestamp};

// ============================================================================
// WORLD CONFIGURATION
// ============================================================================

/// World configuration singleton (id always 0)
#[table(name = world_config, public)]
#[derive(Clone)]
pub struct WorldConfig {
    #[primary_key]
    pub id: u32,
    pub name: String,
    pub seed: u64,
    pub plot_width: i32,
    pub plot_height: i32,
    pub sim_time: f64, // Simulation time in seconds
    pub time_scale: f32,
    pub paused: bool,
}

/// Shared treasury singleton (id always 0). One purse for the whole
/// homestead; only reducers mutate it.
#[table(name = ledger, public)]
#[derive(Clone)]
pub struct Ledger {
    #[primary_key]
    pub id: u32,
    pub balance: i64,
}

// ============================================================================
// PLAYERS
// ============================================================================

/// Connection → actor mapping
#[table(name = connected_player, public)]
pub struct ConnectedPlayer {
    #[primary_key]
    pub identity: Identity,
    pub actor_id: Option<u64>,
    pub connected_at: Timestamp,
}

/// Player character on the homestead
#[table(name = player, public)]
pub struct Player {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub owner_identity: Identity,
}

/// Targeted action result — the server half of one actor's single
/// in-flight request. Overwritten on every new verdict for that actor;
/// clients match on `seq` and ignore anything stale.
#[table(name = action_result, public)]
#[derive(Clone)]
pub struct ActionResult {
    #[primary_key]
    pub actor_id: u64,
    pub seq: u32,
    pub applied: bool,
    pub request_kind: u8,
    pub reason: String,
}

// ============================================================================
// INVENTORY & EQUIPMENT
// ============================================================================

/// Slotted item stack owned by one player
#[table(name = item_stack, public)]
#[derive(Clone)]
pub struct ItemStack {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner_id: u64,
    pub slot: u8,
    pub item_id: u16,
    pub quantity: u32,
}

/// Equipped tool in one of a player's equipment slots
#[table(name = tool_state, public)]
#[derive(Clone)]
pub struct ToolState {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner_id: u64,
    pub slot: u8,
    pub kind: u8,
    pub tier: u8,
    pub charge: f32,
}

// ============================================================================
// WORLD STATE
// ============================================================================

/// Non-grass plot tile; tiles with no row are plain grass
#[table(name = plot_tile, public)]
#[derive(Clone)]
pub struct PlotTile {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub state: u8, // tile_states
}

/// Resource node (tree, rock, bush, ...). Zero health means depleted
/// and waiting on its respawn timer.
#[table(name = resource_node, public)]
#[derive(Clone)]
pub struct ResourceNode {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub kind: u8, // node_kinds
    pub health: f32,
    pub hardness: u8,
    /// Sim time at which a depleted node comes back; 0 = no respawn due.
    pub respawn_at: f64,
}

/// Planted crop
#[table(name = crop, public)]
#[derive(Clone)]
pub struct Crop {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub kind: u8, // crop_kinds
    pub stage: u8,
    pub progress: f64, // seconds into the current stage
}

//! Tool-action validation — target queries, node damage, tile work.
//!
//! One validator per action kind. Each takes a snapshot of the relevant
//! world state (nodes, tiles, crops near the aimed position), checks
//! eligibility, and reports what mutation to apply — or why nothing
//! happens. The caller owns the actual state mutation; these functions
//! never touch storage.

use crate::constants::{action_kinds, node_kinds, seed_to_crop, tile_states};
use crate::crops;
use crate::tools::{self, Tool};

/// Chebyshev tile distance a swing can reach from the aimed position.
pub const ACTION_RADIUS: i32 = 1;

/// A resource node as the validators see it. Nodes with zero health are
/// depleted and invisible to targeting until they respawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeView {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub kind: u8,
    pub health: f32,
    pub hardness: u8,
}

/// A non-grass plot tile. Tiles without a stored row are plain grass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileView {
    pub x: i32,
    pub y: i32,
    pub state: u8,
}

/// A planted crop as the validators see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropView {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub kind: u8,
    pub stage: u8,
}

/// Rectangular farmable plot; positions outside it are never valid targets.
#[derive(Debug, Clone, Copy)]
pub struct PlotBounds {
    pub width: i32,
    pub height: i32,
}

impl PlotBounds {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }
}

/// Verdict of a single action validation. The wire response collapses this
/// to `applied: bool`; the richer variants drive state mutation and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApplyOutcome {
    NodeDamaged {
        node_id: u64,
        remaining: f32,
    },
    NodeDepleted {
        node_id: u64,
        drop_item: u16,
        drop_count: u32,
        /// Node kind left behind (a felled tree leaves a stump).
        replaced_by: Option<u8>,
    },
    TileTilled,
    TileWatered,
    Planted {
        crop_kind: u8,
    },
    Harvested {
        crop_id: u64,
        yield_item: u16,
        yield_count: u32,
        regrow_stage: Option<u8>,
    },
    /// Nothing eligible at the aimed position.
    NoTarget,
    /// The slot's tool (or item) cannot serve this action kind.
    WrongTool,
    /// Tool tier below the target's hardness.
    ToolTooWeak,
    /// Not enough charge left for a swing.
    Exhausted,
    /// Target exists but is not ready (immature crop).
    NotReady,
}

impl ApplyOutcome {
    pub fn applied(&self) -> bool {
        !matches!(
            self,
            ApplyOutcome::NoTarget
                | ApplyOutcome::WrongTool
                | ApplyOutcome::ToolTooWeak
                | ApplyOutcome::Exhausted
                | ApplyOutcome::NotReady
        )
    }

    /// Short reason string for result rows and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ApplyOutcome::NodeDamaged { .. } => "damaged",
            ApplyOutcome::NodeDepleted { .. } => "depleted",
            ApplyOutcome::TileTilled => "tilled",
            ApplyOutcome::TileWatered => "watered",
            ApplyOutcome::Planted { .. } => "planted",
            ApplyOutcome::Harvested { .. } => "harvested",
            ApplyOutcome::NoTarget => "no eligible target",
            ApplyOutcome::WrongTool => "wrong tool",
            ApplyOutcome::ToolTooWeak => "tool tier too low",
            ApplyOutcome::Exhausted => "tool charge exhausted",
            ApplyOutcome::NotReady => "not ready",
        }
    }
}

// ── Node properties ─────────────────────────────────────────────────────

pub fn node_max_health(kind: u8) -> f32 {
    match kind {
        node_kinds::TREE => 100.0,
        node_kinds::STUMP => 50.0,
        node_kinds::ROCK => 75.0,
        node_kinds::BOULDER => 200.0,
        node_kinds::BUSH => 25.0,
        node_kinds::WEEDS => 10.0,
        _ => 0.0,
    }
}

pub fn node_hardness(kind: u8) -> u8 {
    match kind {
        node_kinds::BOULDER => 2,
        _ => 1,
    }
}

/// Item and count a depleted node drops.
pub fn node_drop(kind: u8) -> (u16, u32) {
    use crate::constants::items;
    match kind {
        node_kinds::TREE => (items::WOOD, 5),
        node_kinds::STUMP => (items::WOOD, 2),
        node_kinds::ROCK => (items::STONE, 3),
        node_kinds::BOULDER => (items::STONE, 8),
        node_kinds::BUSH => (items::FIBER, 2),
        node_kinds::WEEDS => (items::FIBER, 1),
        _ => (items::FIBER, 0),
    }
}

/// What stays on the tile after depletion.
pub fn node_after_depletion(kind: u8) -> Option<u8> {
    match kind {
        node_kinds::TREE => Some(node_kinds::STUMP),
        _ => None,
    }
}

/// Node kinds an action kind is allowed to hit.
pub fn action_accepts_node(action_kind: u8, node_kind: u8) -> bool {
    match action_kind {
        action_kinds::CHOP => matches!(node_kind, node_kinds::TREE | node_kinds::STUMP),
        action_kinds::MINE => matches!(node_kind, node_kinds::ROCK | node_kinds::BOULDER),
        action_kinds::CUT => matches!(node_kind, node_kinds::BUSH | node_kinds::WEEDS),
        _ => false,
    }
}

// ── Target queries ──────────────────────────────────────────────────────

fn chebyshev(ax: i32, ay: i32, bx: i32, by: i32) -> i32 {
    (ax - bx).abs().max((ay - by).abs())
}

/// Nearest live node the action kind accepts, within [`ACTION_RADIUS`] of
/// the aimed position. Ties break on distance then lowest id, so the pick
/// is deterministic for identical world state.
pub fn find_target<'a>(
    action_kind: u8,
    x: i32,
    y: i32,
    nodes: &'a [NodeView],
) -> Option<&'a NodeView> {
    nodes
        .iter()
        .filter(|n| n.health > 0.0)
        .filter(|n| action_accepts_node(action_kind, n.kind))
        .filter(|n| chebyshev(x, y, n.x, n.y) <= ACTION_RADIUS)
        .min_by_key(|n| {
            let dx = (n.x - x) as i64;
            let dy = (n.y - y) as i64;
            (dx * dx + dy * dy, n.id)
        })
}

fn tile_state_at(tiles: &[TileView], x: i32, y: i32) -> u8 {
    tiles
        .iter()
        .find(|t| t.x == x && t.y == y)
        .map(|t| t.state)
        .unwrap_or(tile_states::GRASS)
}

fn crop_at(crops: &[CropView], x: i32, y: i32) -> Option<&CropView> {
    crops.iter().find(|c| c.x == x && c.y == y)
}

fn node_blocking_tile(nodes: &[NodeView], x: i32, y: i32) -> bool {
    nodes
        .iter()
        .any(|n| n.health > 0.0 && n.x == x && n.y == y)
}

// ── Validators, one per action kind ─────────────────────────────────────

/// Swing a tool at the aimed position (chop / mine / cut).
pub fn swing(action_kind: u8, x: i32, y: i32, tool: &Tool, nodes: &[NodeView]) -> ApplyOutcome {
    if !tools::tool_accepts(tool.kind, action_kind) {
        return ApplyOutcome::WrongTool;
    }
    let Some(target) = find_target(action_kind, x, y, nodes) else {
        return ApplyOutcome::NoTarget;
    };
    if tool.tier < target.hardness {
        return ApplyOutcome::ToolTooWeak;
    }
    if tool.charge < tools::swing_cost(action_kind) {
        return ApplyOutcome::Exhausted;
    }
    let remaining = target.health - tools::swing_damage(tool.tier);
    if remaining <= 0.0 {
        let (drop_item, drop_count) = node_drop(target.kind);
        ApplyOutcome::NodeDepleted {
            node_id: target.id,
            drop_item,
            drop_count,
            replaced_by: node_after_depletion(target.kind),
        }
    } else {
        ApplyOutcome::NodeDamaged {
            node_id: target.id,
            remaining,
        }
    }
}

/// Turn a grass tile into farmable soil.
pub fn till(
    x: i32,
    y: i32,
    tool: &Tool,
    bounds: &PlotBounds,
    tiles: &[TileView],
    nodes: &[NodeView],
) -> ApplyOutcome {
    if !tools::tool_accepts(tool.kind, action_kinds::TILL) {
        return ApplyOutcome::WrongTool;
    }
    if !bounds.contains(x, y)
        || tile_state_at(tiles, x, y) != tile_states::GRASS
        || node_blocking_tile(nodes, x, y)
    {
        return ApplyOutcome::NoTarget;
    }
    if tool.charge < tools::swing_cost(action_kinds::TILL) {
        return ApplyOutcome::Exhausted;
    }
    ApplyOutcome::TileTilled
}

/// Water a tilled tile.
pub fn water(x: i32, y: i32, tool: &Tool, tiles: &[TileView]) -> ApplyOutcome {
    if !tools::tool_accepts(tool.kind, action_kinds::WATER) {
        return ApplyOutcome::WrongTool;
    }
    if tile_state_at(tiles, x, y) != tile_states::TILLED {
        return ApplyOutcome::NoTarget;
    }
    if tool.charge < tools::swing_cost(action_kinds::WATER) {
        return ApplyOutcome::Exhausted;
    }
    ApplyOutcome::TileWatered
}

/// Plant a seed from an inventory slot into farmable soil.
pub fn plant(x: i32, y: i32, seed_item: u16, tiles: &[TileView], crops: &[CropView]) -> ApplyOutcome {
    let Some(crop_kind) = seed_to_crop(seed_item) else {
        return ApplyOutcome::WrongTool;
    };
    let state = tile_state_at(tiles, x, y);
    if state != tile_states::TILLED && state != tile_states::WATERED {
        return ApplyOutcome::NoTarget;
    }
    if crop_at(crops, x, y).is_some() {
        return ApplyOutcome::NoTarget;
    }
    ApplyOutcome::Planted { crop_kind }
}

/// Pull a mature crop.
pub fn harvest(x: i32, y: i32, crop_views: &[CropView]) -> ApplyOutcome {
    let Some(crop) = crop_at(crop_views, x, y) else {
        return ApplyOutcome::NoTarget;
    };
    if !crops::is_mature(crop.kind, crop.stage) {
        return ApplyOutcome::NotReady;
    }
    let Some((yield_item, yield_count)) = crops::harvest_yield(crop.kind) else {
        return ApplyOutcome::NoTarget;
    };
    ApplyOutcome::Harvested {
        crop_id: crop.id,
        yield_item,
        yield_count,
        regrow_stage: crops::after_harvest(crop.kind),
    }
}

//! Game constants — action kinds, node kinds, tile states, tools, items.
//!
//! These are simple `u8`/`u16` constants with no database dependency.
//! Both the SpacetimeDB server and the native simtest use these.

/// Kinds of authority-validated actions a player can propose.
pub mod action_kinds {
    /// Swing an axe at a choppable target.
    pub const CHOP: u8 = 0;
    /// Swing a pickaxe at a minable target.
    pub const MINE: u8 = 1;
    /// Swing a scythe at a cuttable target.
    pub const CUT: u8 = 2;
    /// Turn a grass tile into farmable soil.
    pub const TILL: u8 = 3;
    /// Water a tilled tile.
    pub const WATER: u8 = 4;
    /// Plant a seed from an inventory slot into a tilled tile.
    pub const PLANT: u8 = 5;
    /// Pull a mature crop.
    pub const HARVEST: u8 = 6;

    pub fn name(kind: u8) -> &'static str {
        match kind {
            CHOP => "chop",
            MINE => "mine",
            CUT => "cut",
            TILL => "till",
            WATER => "water",
            PLANT => "plant",
            HARVEST => "harvest",
            _ => "unknown",
        }
    }
}

/// Request kinds tagged onto targeted result rows, so a client can tell
/// which flow a verdict belongs to. Tool actions reuse their action kind;
/// the ledger flows get their own codes well clear of that space.
pub mod request_kinds {
    pub const DEBIT: u8 = 200;
    pub const PURCHASE: u8 = 201;
    pub const SALE: u8 = 202;
}

/// Resource nodes scattered on the plot.
pub mod node_kinds {
    pub const TREE: u8 = 0;
    pub const STUMP: u8 = 1;
    pub const ROCK: u8 = 2;
    pub const BOULDER: u8 = 3;
    pub const BUSH: u8 = 4;
    pub const WEEDS: u8 = 5;
}

/// Soil state of a plot tile. Tiles with no stored row are `GRASS`.
pub mod tile_states {
    pub const GRASS: u8 = 0;
    pub const TILLED: u8 = 1;
    pub const WATERED: u8 = 2;
}

/// Hand tools occupying equipment slots.
pub mod tool_kinds {
    pub const AXE: u8 = 0;
    pub const PICKAXE: u8 = 1;
    pub const SCYTHE: u8 = 2;
    pub const HOE: u8 = 3;
    pub const WATERING_CAN: u8 = 4;

    pub fn name(kind: u8) -> &'static str {
        match kind {
            AXE => "axe",
            PICKAXE => "pickaxe",
            SCYTHE => "scythe",
            HOE => "hoe",
            WATERING_CAN => "watering can",
            _ => "unknown",
        }
    }
}

/// Stackable inventory items (u16 — the id space outgrows u8 fast).
pub mod items {
    pub const WOOD: u16 = 1;
    pub const STONE: u16 = 2;
    pub const FIBER: u16 = 3;

    pub const PARSNIP_SEED: u16 = 10;
    pub const PARSNIP: u16 = 11;
    pub const POTATO_SEED: u16 = 12;
    pub const POTATO: u16 = 13;
    pub const BLUEBERRY_SEED: u16 = 14;
    pub const BLUEBERRY: u16 = 15;

    pub const FENCE_POST: u16 = 30;
    pub const SCARECROW: u16 = 31;
}

/// Crop species growing on tilled tiles.
pub mod crop_kinds {
    pub const PARSNIP: u8 = 0;
    pub const POTATO: u8 = 1;
    pub const BLUEBERRY: u8 = 2;
}

/// Map a seed item to the crop it grows, if it is a seed at all.
pub fn seed_to_crop(item_id: u16) -> Option<u8> {
    match item_id {
        items::PARSNIP_SEED => Some(crop_kinds::PARSNIP),
        items::POTATO_SEED => Some(crop_kinds::POTATO),
        items::BLUEBERRY_SEED => Some(crop_kinds::BLUEBERRY),
        _ => None,
    }
}

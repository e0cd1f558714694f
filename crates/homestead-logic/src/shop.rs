//! Shop catalog model and purchase/sale pricing.
//!
//! The catalog ships as JSON (`data/shop_catalog.json`) consumed by both
//! the server module and the native simtest harness. Purchases debit the
//! shared treasury and only grant items when the debit applied; sales are
//! the inverse. Sell price is half the list price, floored.

use serde::Deserialize;

/// One purchasable catalog line.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub item_id: u16,
    pub name: String,
    pub price: i64,
    pub category: String,
}

/// Problems a catalog can carry; the harness refuses a world with any.
pub fn validate_catalog(entries: &[CatalogEntry]) -> Vec<String> {
    let mut problems = Vec::new();
    if entries.is_empty() {
        problems.push("catalog is empty".to_string());
    }
    for entry in entries {
        if entry.price <= 0 {
            problems.push(format!("{}: non-positive price {}", entry.name, entry.price));
        }
        if entry.name.is_empty() {
            problems.push(format!("item {}: empty name", entry.item_id));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        if !seen.insert(entry.item_id) {
            problems.push(format!("duplicate item_id {}", entry.item_id));
        }
    }
    problems
}

pub fn find_entry(entries: &[CatalogEntry], item_id: u16) -> Option<&CatalogEntry> {
    entries.iter().find(|e| e.item_id == item_id)
}

/// Total cost of `quantity` units, or `None` when the quantity is zero or
/// the math overflows.
pub fn purchase_cost(entry: &CatalogEntry, quantity: u32) -> Option<i64> {
    if quantity == 0 {
        return None;
    }
    entry.price.checked_mul(quantity as i64)
}

/// Coins credited for selling `quantity` units back.
pub fn sale_value(entry: &CatalogEntry, quantity: u32) -> i64 {
    (entry.price / 2).max(1) * quantity as i64
}

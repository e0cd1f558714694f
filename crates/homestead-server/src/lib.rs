//! Homestead Server - SpacetimeDB Module
//!
//! Cooperative farm simulation running as a SpacetimeDB module. Every
//! state-changing player action arrives here as a reducer call, is
//! validated against the shared world, and resolves into a targeted
//! per-actor result row; public tables carry the broadcast state.

mod generation;
mod reducers;
mod simulation;
mod tables;

pub use reducers::*;
pub use tables::*;

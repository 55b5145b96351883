//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Positions derive from elapsed time and frame deltas only
//! - Stable iteration order (slot creation order)
//! - No host engine or platform dependencies

pub mod collision;
pub mod orbit;
pub mod projectile;
pub mod state;
pub mod tick;

pub use collision::first_hit;
pub use orbit::OrbitLayout;
pub use projectile::{Projectile, ProjectileState, out_of_bounds};
pub use state::{Board, GameEvent, GamePhase, Slot};
pub use tick::{aim, fire, tick, timer_tick};

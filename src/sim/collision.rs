//! Star-versus-slot collision detection
//!
//! Slots are scanned in creation order and the first unfilled slot within
//! range wins, even when a later slot is closer.

use glam::Vec2;

use super::state::Slot;

/// Index of the first unfilled slot strictly closer than `hit_distance`
pub fn first_hit(pos: Vec2, slots: &[Slot], hit_distance: f32) -> Option<usize> {
    slots
        .iter()
        .position(|slot| !slot.filled && pos.distance(slot.pos) < hit_distance)
}

//! Per-frame update and input handling
//!
//! The host calls these between frames, never concurrently. Calls that are
//! not valid in the current state are silent no-ops.

use glam::Vec2;

use super::collision::first_hit;
use super::projectile::out_of_bounds;
use super::state::{Board, GameEvent, GamePhase};

/// Advance one frame: orbit, then flight, bounds and collision
pub fn tick(board: &mut Board, elapsed_ms: f64, delta_ms: f64) {
    // Orbit keeps turning after the game ends
    board.update_slots(elapsed_ms);

    if !board.is_active() {
        return;
    }

    let Some(star) = board.projectile.as_mut().filter(|p| p.is_flying()) else {
        return;
    };
    star.integrate(delta_ms);
    let (id, pos) = (star.id, star.pos);

    if out_of_bounds(pos, board.config.field) {
        log::debug!("Star {} left the field at ({:.1}, {:.1})", id, pos.x, pos.y);
        board.projectile = None;
        board.events.push(GameEvent::Lost { id });
        board.spawn_idle();
        return;
    }

    if let Some(index) = first_hit(pos, &board.slots, board.config.hit_distance) {
        log::debug!("Star {} stuck to slot {}", id, index);
        board.stick(index);
    }
}

/// Pointer moved: an idle star turns to face it
pub fn aim(board: &mut Board, pointer: Vec2) -> bool {
    if !board.is_active() {
        return false;
    }
    board
        .projectile
        .as_mut()
        .is_some_and(|star| star.aim_at(pointer))
}

/// Pointer pressed: an idle star launches toward it
pub fn fire(board: &mut Board, pointer: Vec2) -> bool {
    if !board.is_active() {
        return false;
    }
    let speed = board.config.projectile_speed;
    let Some(star) = board.projectile.as_mut() else {
        return false;
    };
    if !star.launch(pointer, speed) {
        return false;
    }
    let id = star.id;
    log::debug!("Star {} fired toward ({:.1}, {:.1})", id, pointer.x, pointer.y);
    board.events.push(GameEvent::Fired { id });
    true
}

/// One second of the round clock. Ends the game when it reaches zero.
pub fn timer_tick(board: &mut Board) {
    if !board.config.features.timer || !board.is_active() {
        return;
    }

    board.time_remaining = board.time_remaining.saturating_sub(1);
    board.events.push(GameEvent::TimeChanged {
        remaining: board.time_remaining,
    });

    if board.time_remaining == 0 {
        board.phase = GamePhase::GameOver;
        let released = board.projectile.take().map(|p| p.id);
        log::info!("Time up, final score {}", board.score);
        board.events.push(GameEvent::GameOver {
            score: board.score,
            released,
        });
    }
}

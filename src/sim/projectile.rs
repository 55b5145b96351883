//! The player's star
//!
//! Two states: Idle (follows the pointer, waits for a click) and Flight
//! (constant velocity until it leaves the field or sticks to a slot).

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angle_between;

/// Star state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    /// Waiting at the spawn point, facing the pointer
    Idle,
    /// Moving at constant velocity
    Flight,
}

/// A star entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Units per second
    pub vel: Vec2,
    /// Sprite rotation; the texture points "up", so this is heading + π/2
    pub rotation: f32,
    pub state: ProjectileState,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            state: ProjectileState::Idle,
        }
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flight
    }

    /// Direction of travel implied by the sprite rotation
    #[inline]
    pub fn heading(&self) -> f32 {
        self.rotation - FRAC_PI_2
    }

    /// Turn to face `target`. Returns false (and changes nothing) in flight.
    pub fn aim_at(&mut self, target: Vec2) -> bool {
        if self.is_flying() {
            return false;
        }
        if target != self.pos {
            self.rotation = angle_between(self.pos, target) + FRAC_PI_2;
        }
        true
    }

    /// Leave Idle toward `target` at `speed`. A target on the star itself
    /// fires along the current heading.
    pub fn launch(&mut self, target: Vec2, speed: f32) -> bool {
        if !self.aim_at(target) {
            return false;
        }
        self.vel = Vec2::from_angle(self.heading()) * speed;
        self.state = ProjectileState::Flight;
        true
    }

    /// Euler step, in flight only
    pub fn integrate(&mut self, delta_ms: f64) {
        if self.is_flying() {
            self.pos += self.vel * (delta_ms / 1000.0) as f32;
        }
    }
}

/// True when `pos` touches or crosses the field edge
#[inline]
pub fn out_of_bounds(pos: Vec2, field: Vec2) -> bool {
    pos.x <= 0.0 || pos.x >= field.x || pos.y <= 0.0 || pos.y >= field.y
}

//! Orbit Shooter - a ring of slots orbits the screen center, the player
//! fires stars to fill them
//!
//! Core modules:
//! - `sim`: Deterministic simulation (orbit, flight, collisions, game state)
//! - `scene`: Mirrors simulation state onto host-engine objects
//! - `host`: Host engine collaborator interface
//! - `config`: Scene configuration, presets and validation
//! - `demo`: Seeded autopilot for attract mode and headless runs
//! - `web`: Browser host (wasm32 only)

pub mod config;
pub mod demo;
pub mod host;
pub mod scene;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, Features, SceneConfig, Variant};
pub use host::{Handle, IntervalTimer, RecordingHost, SceneEvent, SceneHost};
pub use scene::OrbitShooterScene;

use glam::Vec2;

/// Reference configuration constants
pub mod consts {
    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 1024.0;
    pub const FIELD_HEIGHT: f32 = 768.0;

    /// Orbit defaults
    pub const SLOT_COUNT: usize = 8;
    pub const ORBIT_RADIUS: f32 = 200.0;
    /// Milliseconds per radian of orbit (lower = faster rotation)
    pub const ROTATION_PERIOD_MS: f32 = 1500.0;
    pub const SLOT_RADIUS: f32 = 10.0;
    pub const SLOT_COLOR: u32 = 0xffffff;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 600.0;
    /// Slot radius plus approximate star radius
    pub const HIT_DISTANCE: f32 = 20.0;
    pub const STAR_TEXTURE: &str = "star";

    /// Timed mode round length
    pub const ROUND_SECONDS: u32 = 30;
    /// Repeating timer interval
    pub const TIMER_INTERVAL_MS: u32 = 1000;

    /// HUD inset from the field edge
    pub const HUD_MARGIN: f32 = 16.0;

    /// Scene started by the menu transition
    pub const NEXT_SCENE: &str = "Game";
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the ray from `from` toward `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

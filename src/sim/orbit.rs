//! Orbit geometry for the slot ring
//!
//! Slot positions are a closed-form function of elapsed time:
//! - theta = t / period + index * 2π / slot_count
//! - position = center + radius * (cos theta, sin theta)
//!
//! Nothing is integrated, so positions never drift and any frame can be
//! reproduced from `t` alone.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::polar_to_cartesian;

/// The parameters a slot position depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitLayout {
    pub slot_count: usize,
    pub center: Vec2,
    pub radius: f32,
    /// Milliseconds per radian
    pub period_ms: f32,
}

impl OrbitLayout {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            slot_count: config.slot_count,
            center: config.center,
            radius: config.orbit_radius,
            period_ms: config.rotation_period_ms,
        }
    }

    /// Orbit angle of slot `index` at `t_ms`, wrapped to [0, 2π)
    pub fn slot_angle(&self, index: usize, t_ms: f64) -> f32 {
        use std::f64::consts::TAU;
        let spacing = TAU / self.slot_count.max(1) as f64;
        let theta = t_ms / self.period_ms as f64 + index as f64 * spacing;
        theta.rem_euclid(TAU) as f32
    }

    /// Screen position of slot `index` at `t_ms`
    #[inline]
    pub fn slot_position(&self, index: usize, t_ms: f64) -> Vec2 {
        self.center + polar_to_cartesian(self.radius, self.slot_angle(index, t_ms))
    }
}

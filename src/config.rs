//! Scene configuration
//!
//! One configurable scene covers every game mode; the capability flags in
//! [`Features`] switch the optional transitions on. Persisted in LocalStorage
//! on the web, read from a JSON file natively.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Optional game rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Count stuck stars and show a score HUD
    pub scoring: bool,
    /// Run a countdown that ends the game
    pub timer: bool,
    /// A full board wins the game
    pub win_state: bool,
    /// A full board empties itself and play continues
    pub auto_reset: bool,
}

/// Preset game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Orbit and shoot, nothing else
    Minimal,
    /// Score as many stars as possible before the clock runs out
    #[default]
    Timed,
    /// Fill every slot to win
    Win,
    /// Scored play without a clock, board refills forever
    Endless,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Minimal => "Minimal",
            Variant::Timed => "Timed",
            Variant::Win => "Win",
            Variant::Endless => "Endless",
        }
    }

    /// Next preset in menu order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            Variant::Minimal => Variant::Timed,
            Variant::Timed => Variant::Win,
            Variant::Win => Variant::Endless,
            Variant::Endless => Variant::Minimal,
        }
    }

    /// Preset whose rules match `features` exactly
    pub fn from_features(features: Features) -> Option<Self> {
        [Variant::Minimal, Variant::Timed, Variant::Win, Variant::Endless]
            .into_iter()
            .find(|v| v.features() == features)
    }

    pub fn features(&self) -> Features {
        match self {
            Variant::Minimal => Features::default(),
            Variant::Timed => Features {
                scoring: true,
                timer: true,
                win_state: false,
                auto_reset: true,
            },
            Variant::Win => Features {
                scoring: true,
                win_state: true,
                ..Features::default()
            },
            Variant::Endless => Features {
                scoring: true,
                auto_reset: true,
                ..Features::default()
            },
        }
    }
}

/// Rejected configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The ring needs at least one slot
    NoSlots,
    /// A dimension, speed or distance was zero, negative or not finite
    NotPositive { field: &'static str, value: f32 },
    /// Timer enabled with a zero-length round
    ZeroRoundLength,
    /// A full board cannot both win and reset
    ConflictingBoardResolution,
    /// The spawn point would be out of bounds immediately
    SpawnOutsideField { spawn: Vec2 },
    /// Config text could not be parsed
    Parse(String),
    /// No preset with this name
    UnknownVariant(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoSlots => write!(f, "slot_count must be at least 1"),
            ConfigError::NotPositive { field, value } => {
                write!(f, "{field} must be positive and finite, got {value}")
            }
            ConfigError::ZeroRoundLength => {
                write!(f, "round_seconds must be at least 1 when the timer is enabled")
            }
            ConfigError::ConflictingBoardResolution => {
                write!(f, "win_state and auto_reset cannot both be enabled")
            }
            ConfigError::SpawnOutsideField { spawn } => {
                write!(f, "spawn point ({}, {}) lies outside the field", spawn.x, spawn.y)
            }
            ConfigError::Parse(msg) => write!(f, "invalid config: {msg}"),
            ConfigError::UnknownVariant(name) => write!(f, "unknown variant {name:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal" | "orbit" => Ok(Variant::Minimal),
            "timed" | "scored" => Ok(Variant::Timed),
            "win" => Ok(Variant::Win),
            "endless" | "reset" => Ok(Variant::Endless),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of orbiting slots
    pub slot_count: usize,
    /// Orbit center in scene coordinates
    pub center: Vec2,
    pub orbit_radius: f32,
    /// Milliseconds per radian of orbit
    pub rotation_period_ms: f32,
    /// Drawn slot radius
    pub slot_radius: f32,
    /// Star speed in units per second
    pub projectile_speed: f32,
    /// Star-to-slot distance that counts as a hit (exclusive)
    pub hit_distance: f32,
    /// Play-field size (width, height), origin at the top-left corner
    pub field: Vec2,
    /// Where idle stars appear
    pub spawn: Vec2,
    /// Timed round length
    pub round_seconds: u32,
    pub features: Features,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::from_variant(Variant::default())
    }
}

impl SceneConfig {
    /// Reference layout with the preset's rules
    pub fn from_variant(variant: Variant) -> Self {
        let field = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
        Self {
            slot_count: SLOT_COUNT,
            center: field / 2.0,
            orbit_radius: ORBIT_RADIUS,
            rotation_period_ms: ROTATION_PERIOD_MS,
            slot_radius: SLOT_RADIUS,
            projectile_speed: PROJECTILE_SPEED,
            hit_distance: HIT_DISTANCE,
            field,
            spawn: field / 2.0,
            round_seconds: ROUND_SECONDS,
            features: variant.features(),
        }
    }

    /// Check every constraint the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }
        positive("orbit_radius", self.orbit_radius)?;
        positive("rotation_period_ms", self.rotation_period_ms)?;
        positive("slot_radius", self.slot_radius)?;
        positive("projectile_speed", self.projectile_speed)?;
        positive("hit_distance", self.hit_distance)?;
        positive("field.width", self.field.x)?;
        positive("field.height", self.field.y)?;

        if self.features.timer && self.round_seconds == 0 {
            return Err(ConfigError::ZeroRoundLength);
        }
        if self.features.win_state && self.features.auto_reset {
            return Err(ConfigError::ConflictingBoardResolution);
        }

        let s = self.spawn;
        let inside = s.x > 0.0 && s.x < self.field.x && s.y > 0.0 && s.y < self.field.y;
        if !inside {
            return Err(ConfigError::SpawnOutsideField { spawn: s });
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys, serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Same layout, rules switched to the preset after this one. Configs
    /// with hand-edited rules start over from the default preset.
    pub fn next_variant(&self) -> Self {
        let next = Variant::from_features(self.features)
            .map(|v| v.next())
            .unwrap_or_default();
        let preset = Self::from_variant(next);
        Self {
            round_seconds: preset.round_seconds,
            features: preset.features,
            ..self.clone()
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "orbit_shooter_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match storage.set_item(Self::STORAGE_KEY, &self.to_json()) {
                Ok(()) => log::info!("Config saved"),
                Err(e) => log::warn!("Cannot save config: {:?}", e),
            }
        }
    }

    /// Load config from `ORBIT_SHOOTER_CONFIG` (a JSON file path), else the
    /// preset named by `ORBIT_SHOOTER_VARIANT`, else the default
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("ORBIT_SHOOTER_CONFIG") {
            match std::fs::read_to_string(&path) {
                Ok(json) => match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path);
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring config {}: {}", path, e),
                },
                Err(e) => log::warn!("Cannot read config {}: {}", path, e),
            }
        }

        if let Some(variant) = std::env::var("ORBIT_SHOOTER_VARIANT")
            .ok()
            .and_then(|v| v.parse::<Variant>().ok())
        {
            log::info!("Using {} preset", variant.as_str());
            return Self::from_variant(variant);
        }

        log::info!("Using default config");
        Self::default()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for v in [Variant::Minimal, Variant::Timed, Variant::Win, Variant::Endless] {
            assert_eq!(SceneConfig::from_variant(v).validate(), Ok(()), "{}", v.as_str());
        }
    }

    #[test]
    fn test_default_is_reference_layout() {
        let c = SceneConfig::default();
        assert_eq!(c.slot_count, 8);
        assert_eq!(c.center, Vec2::new(512.0, 384.0));
        assert_eq!(c.spawn, Vec2::new(512.0, 384.0));
        assert_eq!(c.projectile_speed, 600.0);
        assert_eq!(c.hit_distance, 20.0);
        assert!(c.features.scoring && c.features.timer && c.features.auto_reset);
    }

    #[test]
    fn test_rejects_zero_slots() {
        let c = SceneConfig {
            slot_count: 0,
            ..SceneConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::NoSlots));
    }

    #[test]
    fn test_rejects_non_positive_constants() {
        let c = SceneConfig {
            projectile_speed: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "projectile_speed", .. })
        ));

        let c = SceneConfig {
            hit_distance: -1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "hit_distance", .. })
        ));

        let c = SceneConfig {
            rotation_period_ms: f32::NAN,
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "rotation_period_ms", .. })
        ));

        let c = SceneConfig {
            orbit_radius: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "orbit_radius", .. })
        ));

        let c = SceneConfig {
            slot_radius: -10.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "slot_radius", .. })
        ));

        let c = SceneConfig {
            field: Vec2::new(0.0, FIELD_HEIGHT),
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "field.width", .. })
        ));

        let c = SceneConfig {
            field: Vec2::new(FIELD_WIDTH, -768.0),
            ..SceneConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotPositive { field: "field.height", .. })
        ));
    }

    #[test]
    fn test_rejects_conflicting_rules() {
        let mut c = SceneConfig::from_variant(Variant::Win);
        c.features.auto_reset = true;
        assert_eq!(c.validate(), Err(ConfigError::ConflictingBoardResolution));

        let mut c = SceneConfig::from_variant(Variant::Timed);
        c.round_seconds = 0;
        assert_eq!(c.validate(), Err(ConfigError::ZeroRoundLength));
    }

    #[test]
    fn test_rejects_spawn_on_edge() {
        let c = SceneConfig {
            spawn: Vec2::new(0.0, 384.0),
            ..SceneConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::SpawnOutsideField { .. })));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let c = SceneConfig::from_json(r#"{ "slot_count": 5, "features": { "win_state": true } }"#)
            .unwrap();
        assert_eq!(c.slot_count, 5);
        assert_eq!(c.orbit_radius, ORBIT_RADIUS);
        assert!(c.features.win_state);
        assert!(!c.features.timer);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(SceneConfig::from_json("not json"), Err(ConfigError::Parse(_))));
        assert_eq!(
            SceneConfig::from_json(r#"{ "slot_count": 0 }"#),
            Err(ConfigError::NoSlots)
        );
    }

    #[test]
    fn test_json_round_trip() {
        let c = SceneConfig::from_variant(Variant::Endless);
        assert_eq!(SceneConfig::from_json(&c.to_json()), Ok(c));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("WIN".parse::<Variant>(), Ok(Variant::Win));
        assert_eq!("scored".parse::<Variant>(), Ok(Variant::Timed));
        assert_eq!(
            "nope".parse::<Variant>(),
            Err(ConfigError::UnknownVariant("nope".to_string()))
        );
    }

    #[test]
    fn test_variant_cycle_visits_every_preset() {
        let mut v = Variant::Minimal;
        let mut seen = vec![v];
        for _ in 0..3 {
            v = v.next();
            seen.push(v);
        }
        assert_eq!(seen, [Variant::Minimal, Variant::Timed, Variant::Win, Variant::Endless]);
        assert_eq!(v.next(), Variant::Minimal);
        for v in seen {
            assert_eq!(Variant::from_features(v.features()), Some(v));
        }
    }

    #[test]
    fn test_next_variant_keeps_layout() {
        let c = SceneConfig {
            slot_count: 5,
            orbit_radius: 150.0,
            ..SceneConfig::from_variant(Variant::Timed)
        };
        let next = c.next_variant();
        assert_eq!(next.features, Variant::Win.features());
        assert_eq!(next.slot_count, 5);
        assert_eq!(next.orbit_radius, 150.0);
        assert_eq!(next.validate(), Ok(()));

        // Hand-edited rules fall back to the default preset
        let mut custom = SceneConfig::default();
        custom.features.auto_reset = false;
        assert_eq!(custom.next_variant().features, Variant::default().features());
    }
}

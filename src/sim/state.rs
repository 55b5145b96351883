//! Board state and core simulation types
//!
//! Everything needed to reproduce a game lives in [`Board`]; the scene layer
//! only mirrors it onto host objects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::orbit::OrbitLayout;
use super::projectile::Projectile;
use crate::config::{ConfigError, SceneConfig};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Aiming and firing allowed
    Playing,
    /// Timer ran out
    GameOver,
    /// Every slot filled with the win rule on
    Won,
}

/// An orbiting target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Creation index, fixes orbit phase and collision priority
    pub index: usize,
    pub pos: Vec2,
    pub filled: bool,
    /// Star stuck to this slot
    pub attached: Option<u32>,
}

impl Slot {
    pub fn new(index: usize, pos: Vec2) -> Self {
        Self {
            index,
            pos,
            filled: false,
            attached: None,
        }
    }
}

/// State changes the presentation layer reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// New idle star at the spawn point
    Spawned { id: u32 },
    Fired { id: u32 },
    /// Star left the field and was destroyed
    Lost { id: u32 },
    /// Star attached to a slot
    Stuck { id: u32, slot: usize },
    /// Full board emptied; the listed stars are gone
    BoardReset { released: Vec<u32> },
    Won,
    ScoreChanged { score: u32 },
    TimeChanged { remaining: u32 },
    /// Timer expired; `released` is the star destroyed with it
    GameOver { score: u32, released: Option<u32> },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub config: SceneConfig,
    pub layout: OrbitLayout,
    /// Slots in creation order
    pub slots: Vec<Slot>,
    /// The one live star, idle or in flight
    pub projectile: Option<Projectile>,
    pub phase: GamePhase,
    pub score: u32,
    /// Seconds left when the timer is enabled
    pub time_remaining: u32,
    /// Last frame time seen
    pub elapsed_ms: f64,
    /// Pending events, drained by the presentation layer
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl Board {
    /// Validate `config` and lay out a fresh board with one idle star
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let layout = OrbitLayout::from_config(&config);
        let slots = (0..config.slot_count)
            .map(|i| Slot::new(i, layout.slot_position(i, 0.0)))
            .collect();
        let time_remaining = if config.features.timer {
            config.round_seconds
        } else {
            0
        };

        let mut board = Self {
            config,
            layout,
            slots,
            projectile: None,
            phase: GamePhase::Playing,
            score: 0,
            time_remaining,
            elapsed_ms: 0.0,
            events: Vec::new(),
            next_id: 1,
        };
        board.spawn_idle();
        Ok(board)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// True iff a star is in flight
    pub fn is_shooting(&self) -> bool {
        self.projectile.as_ref().is_some_and(|p| p.is_flying())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// True iff every slot holds a star
    pub fn check_win(&self) -> bool {
        self.slots.iter().all(|s| s.filled)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.filled).count()
    }

    /// Put a new idle star at the spawn point. No-op while a star exists or
    /// once the game has ended.
    pub fn spawn_idle(&mut self) {
        if !self.is_active() || self.projectile.is_some() {
            return;
        }
        let id = self.next_entity_id();
        self.projectile = Some(Projectile::new(id, self.config.spawn));
        self.events.push(GameEvent::Spawned { id });
    }

    /// Recompute slot positions for `t_ms`
    pub fn update_slots(&mut self, t_ms: f64) {
        self.elapsed_ms = t_ms;
        for slot in &mut self.slots {
            slot.pos = self.layout.slot_position(slot.index, t_ms);
        }
    }

    /// Attach the current star to slot `index` and resolve the board
    pub fn stick(&mut self, index: usize) {
        let Some(star) = self.projectile.take() else {
            return;
        };
        let Some(slot) = self.slots.get_mut(index).filter(|s| !s.filled) else {
            self.projectile = Some(star);
            return;
        };
        slot.filled = true;
        slot.attached = Some(star.id);
        self.events.push(GameEvent::Stuck {
            id: star.id,
            slot: index,
        });

        if self.config.features.scoring {
            self.score += 1;
            self.events.push(GameEvent::ScoreChanged { score: self.score });
        }

        if self.check_win() {
            let features = self.config.features;
            if features.win_state {
                self.phase = GamePhase::Won;
                self.events.push(GameEvent::Won);
                return;
            }
            if features.auto_reset {
                self.reset_slots();
            }
        }

        self.spawn_idle();
    }

    /// Empty every slot, releasing the attached stars
    fn reset_slots(&mut self) {
        let released = self
            .slots
            .iter_mut()
            .filter_map(|slot| {
                slot.filled = false;
                slot.attached.take()
            })
            .collect();
        self.events.push(GameEvent::BoardReset { released });
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

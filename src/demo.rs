//! Autopilot and headless play
//!
//! The autopilot picks a random open slot with a seeded RNG and leads it by
//! the star's time of flight. Same seed, same game.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::{ConfigError, SceneConfig};
use crate::consts::TIMER_INTERVAL_MS;
use crate::host::{IntervalTimer, RecordingHost};
use crate::scene::OrbitShooterScene;
use crate::sim::{Board, GamePhase};

/// Fixed-point iterations when leading a moving slot
const LEAD_ITERATIONS: usize = 4;

/// Headless frame length (60 Hz)
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// A chosen shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub slot: usize,
    pub target: Vec2,
}

/// Seeded computer player
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Pick the next shot. None while a star is flying, after the game has
    /// ended, or when every slot is taken.
    pub fn choose_target(&mut self, board: &Board) -> Option<Aim> {
        if !board.is_active() || board.is_shooting() {
            return None;
        }
        let star = board.projectile.as_ref()?;
        let open: Vec<usize> = board
            .slots
            .iter()
            .filter(|s| !s.filled)
            .map(|s| s.index)
            .collect();
        if open.is_empty() {
            return None;
        }

        let slot = open[self.rng.random_range(0..open.len())];
        Some(Aim {
            slot,
            target: lead_target(board, slot, star.pos),
        })
    }
}

/// Where slot `index` will be when a star fired now from `from` reaches it
pub fn lead_target(board: &Board, index: usize, from: Vec2) -> Vec2 {
    let speed = board.config.projectile_speed as f64;
    let now = board.elapsed_ms;
    let mut target = board.layout.slot_position(index, now);
    for _ in 0..LEAD_ITERATIONS {
        let flight_ms = from.distance(target) as f64 / speed * 1000.0;
        target = board.layout.slot_position(index, now + flight_ms);
    }
    target
}

/// Outcome of a headless game
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u32,
    pub shots: u32,
    pub filled: usize,
    pub elapsed_ms: f64,
}

/// Play one game with the autopilot until it ends or `limit_ms` passes
pub fn play(config: SceneConfig, seed: u64, limit_ms: f64) -> Result<Summary, ConfigError> {
    let mut scene = OrbitShooterScene::new(config)?;
    let mut host = RecordingHost::new();
    let mut pilot = Autopilot::new(seed);
    scene.create(&mut host);

    let mut timer = IntervalTimer::new(TIMER_INTERVAL_MS as f64, 0.0);
    let mut elapsed = 0.0;
    let mut shots = 0;

    while elapsed < limit_ms && scene.phase() == GamePhase::Playing {
        elapsed += FRAME_MS;
        scene.update(&mut host, elapsed, FRAME_MS);
        for _ in 0..timer.due(elapsed) {
            scene.timer_tick(&mut host);
        }

        if let Some(aim) = pilot.choose_target(scene.board()) {
            scene.pointer_move(&mut host, aim.target.x, aim.target.y);
            scene.pointer_down(&mut host, aim.target.x, aim.target.y);
            shots += 1;
            log::debug!("Shot {} at slot {}", shots, aim.slot);
        }
    }

    let summary = Summary {
        seed,
        phase: scene.phase(),
        score: scene.score(),
        shots,
        filled: scene.board().filled_count(),
        elapsed_ms: elapsed,
    };
    log::info!(
        "Headless game over: {:?}, score {} from {} shots",
        summary.phase,
        summary.score,
        summary.shots
    );
    scene.teardown(&mut host);
    Ok(summary)
}

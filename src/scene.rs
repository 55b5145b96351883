//! The orbit shooter scene
//!
//! Owns the simulation [`Board`] and one host handle per visible object.
//! After every input, frame or timer tick the board's events are replayed
//! onto the host, then positions are copied across.

use glam::Vec2;

use crate::config::{ConfigError, SceneConfig};
use crate::consts::*;
use crate::host::{Handle, SceneEvent, SceneHost, TextStyle};
use crate::sim::{self, Board, GameEvent, GamePhase};

/// Name announced in the ready notification
pub const SCENE_NAME: &str = "OrbitShooter";

/// The game scene
pub struct OrbitShooterScene {
    board: Board,
    /// One circle per slot, in slot order
    slot_shapes: Vec<Handle>,
    /// Stars stuck to slots, by slot index
    stuck: Vec<Option<Handle>>,
    /// The live star
    star: Option<Handle>,
    score_text: Option<Handle>,
    timer_text: Option<Handle>,
    /// Game over / win message
    banner: Option<Handle>,
}

impl OrbitShooterScene {
    /// Validate `config` and prepare the board. Nothing is shown until
    /// [`create`](Self::create).
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        let board = Board::new(config)?;
        let stuck = (0..board.slots.len()).map(|_| None).collect();
        Ok(Self {
            board,
            slot_shapes: Vec::new(),
            stuck,
            star: None,
            score_text: None,
            timer_text: None,
            banner: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SceneConfig {
        &self.board.config
    }

    pub fn score(&self) -> u32 {
        self.board.score
    }

    pub fn phase(&self) -> GamePhase {
        self.board.phase
    }

    pub fn is_shooting(&self) -> bool {
        self.board.is_shooting()
    }

    /// True iff every slot is filled
    pub fn check_win(&self) -> bool {
        self.board.check_win()
    }

    /// Build the visible scene and announce it
    pub fn create<H: SceneHost>(&mut self, host: &mut H) {
        let config = self.board.config.clone();

        self.slot_shapes = self
            .board
            .slots
            .iter()
            .map(|slot| host.create_circle(slot.pos, config.slot_radius, SLOT_COLOR))
            .collect();

        if config.features.scoring {
            let text = format!("Score: {}", self.board.score);
            let pos = Vec2::splat(HUD_MARGIN);
            self.score_text = Some(host.create_text(pos, &text, TextStyle::hud()));
        }
        if config.features.timer {
            let text = format!("Time: {}", self.board.time_remaining);
            let pos = Vec2::new(config.field.x - HUD_MARGIN, HUD_MARGIN);
            self.timer_text = Some(host.create_text(pos, &text, TextStyle::hud_right()));
        }

        self.apply_events(host);
        self.sync_positions(host);

        log::info!(
            "Scene created: {} slots, features {:?}",
            self.board.slots.len(),
            config.features
        );
        host.emit(&SceneEvent::Ready {
            scene: SCENE_NAME,
            board: &self.board,
        });
    }

    /// Frame callback
    pub fn update<H: SceneHost>(&mut self, host: &mut H, elapsed_ms: f64, delta_ms: f64) {
        sim::tick(&mut self.board, elapsed_ms, delta_ms);
        self.apply_events(host);
        self.sync_positions(host);
    }

    /// Pointer moved to (x, y) in scene coordinates
    pub fn pointer_move<H: SceneHost>(&mut self, host: &mut H, x: f32, y: f32) {
        if sim::aim(&mut self.board, Vec2::new(x, y)) {
            self.sync_rotation(host);
        }
    }

    /// Pointer pressed at (x, y) in scene coordinates
    pub fn pointer_down<H: SceneHost>(&mut self, host: &mut H, x: f32, y: f32) {
        if sim::fire(&mut self.board, Vec2::new(x, y)) {
            self.sync_rotation(host);
            self.apply_events(host);
        }
    }

    /// Repeating one-second timer callback
    pub fn timer_tick<H: SceneHost>(&mut self, host: &mut H) {
        sim::timer_tick(&mut self.board);
        self.apply_events(host);
    }

    /// Hand over to the next scene
    pub fn change_scene<H: SceneHost>(&self, host: &mut H) {
        host.start_scene(NEXT_SCENE);
    }

    /// Release everything and start a fresh game with the same config
    pub fn restart<H: SceneHost>(&mut self, host: &mut H) -> Result<(), ConfigError> {
        self.restart_with(host, self.board.config.clone())
    }

    /// Start a fresh game under `config`. An invalid config leaves the
    /// running game untouched.
    pub fn restart_with<H: SceneHost>(
        &mut self,
        host: &mut H,
        config: SceneConfig,
    ) -> Result<(), ConfigError> {
        let board = Board::new(config)?;
        self.teardown(host);
        self.board = board;
        self.stuck = (0..self.board.slots.len()).map(|_| None).collect();
        log::info!("Scene restarted");
        self.create(host);
        Ok(())
    }

    /// Release every host object this scene owns
    pub fn teardown<H: SceneHost>(&mut self, host: &mut H) {
        for handle in self.slot_shapes.drain(..) {
            host.destroy(handle);
        }
        for cell in &mut self.stuck {
            release(host, cell);
        }
        release(host, &mut self.star);
        release(host, &mut self.score_text);
        release(host, &mut self.timer_text);
        release(host, &mut self.banner);
    }

    fn apply_events<H: SceneHost>(&mut self, host: &mut H) {
        for event in self.board.drain_events() {
            match event {
                GameEvent::Spawned { .. } => {
                    release(host, &mut self.star);
                    let image = host.create_image(self.board.config.spawn, STAR_TEXTURE);
                    self.star = Some(image);
                }
                GameEvent::Fired { id } => host.emit(&SceneEvent::Fired { id }),
                GameEvent::Lost { .. } => {
                    release(host, &mut self.star);
                    host.emit(&SceneEvent::Lost);
                }
                GameEvent::Stuck { slot, .. } => {
                    if let Some(image) = self.star.take() {
                        match self.stuck.get_mut(slot) {
                            Some(cell) => {
                                release(host, cell);
                                *cell = Some(image);
                            }
                            None => host.destroy(image),
                        }
                    }
                    host.emit(&SceneEvent::Stuck {
                        slot,
                        score: self.board.score,
                    });
                }
                GameEvent::BoardReset { released } => {
                    log::info!("Board full, releasing {} stars", released.len());
                    for cell in &mut self.stuck {
                        release(host, cell);
                    }
                    host.emit(&SceneEvent::BoardReset);
                }
                GameEvent::Won => {
                    log::info!("Board won with score {}", self.board.score);
                    let text = self.final_message("YOU WIN!");
                    self.show_banner(host, &text);
                    host.emit(&SceneEvent::Won {
                        score: self.board.score,
                    });
                }
                GameEvent::ScoreChanged { score } => {
                    if let Some(text) = &self.score_text {
                        host.set_text(text, &format!("Score: {score}"));
                    }
                }
                GameEvent::TimeChanged { remaining } => {
                    if let Some(text) = &self.timer_text {
                        host.set_text(text, &format!("Time: {remaining}"));
                    }
                }
                GameEvent::GameOver { score, .. } => {
                    release(host, &mut self.star);
                    let text = self.final_message("GAME OVER");
                    self.show_banner(host, &text);
                    host.emit(&SceneEvent::GameOver { score });
                }
            }
        }
    }

    fn final_message(&self, headline: &str) -> String {
        if self.board.config.features.scoring {
            format!("{headline}\nScore: {}", self.board.score)
        } else {
            headline.to_string()
        }
    }

    fn show_banner<H: SceneHost>(&mut self, host: &mut H, text: &str) {
        release(host, &mut self.banner);
        let center = self.board.config.field / 2.0;
        self.banner = Some(host.create_text(center, text, TextStyle::banner()));
    }

    fn sync_positions<H: SceneHost>(&self, host: &mut H) {
        for (slot, shape) in self.board.slots.iter().zip(&self.slot_shapes) {
            host.set_position(shape, slot.pos);
        }
        // Stuck stars ride on their slots
        for (slot, cell) in self.board.slots.iter().zip(&self.stuck) {
            if let Some(image) = cell {
                host.set_position(image, slot.pos);
            }
        }
        if let (Some(image), Some(star)) = (&self.star, &self.board.projectile) {
            host.set_position(image, star.pos);
        }
    }

    fn sync_rotation<H: SceneHost>(&self, host: &mut H) {
        if let (Some(image), Some(star)) = (&self.star, &self.board.projectile) {
            host.set_rotation(image, star.rotation);
        }
    }
}

fn release<H: SceneHost>(host: &mut H, cell: &mut Option<Handle>) {
    if let Some(handle) = cell.take() {
        host.destroy(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::host::RecordingHost;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 16.0;

    fn scene(variant: Variant) -> (OrbitShooterScene, RecordingHost) {
        let mut scene = OrbitShooterScene::new(SceneConfig::from_variant(variant)).unwrap();
        let mut host = RecordingHost::new();
        scene.create(&mut host);
        (scene, host)
    }

    /// Fire at slot `index` with the orbit held at t = 0 and run frames
    /// until the star resolves. Returns the number of frames flown.
    fn shoot_at(scene: &mut OrbitShooterScene, host: &mut RecordingHost, index: usize) -> u32 {
        let target = scene.board().slots[index].pos;
        scene.pointer_move(host, target.x, target.y);
        scene.pointer_down(host, target.x, target.y);
        assert!(scene.is_shooting());
        let mut frames = 0;
        while scene.is_shooting() {
            scene.update(host, 0.0, FRAME_MS);
            frames += 1;
            assert!(frames < 200, "star never resolved");
        }
        frames
    }

    #[test]
    fn test_create_builds_hud_and_star() {
        let (scene, host) = scene(Variant::Timed);
        // 8 slots, 1 star, score and timer text
        assert_eq!(host.live_count(), 11);
        assert_eq!(host.images(STAR_TEXTURE).len(), 1);
        let mut texts = host.texts();
        texts.sort();
        assert_eq!(texts, vec!["Score: 0", "Time: 30"]);
        assert!(!scene.is_shooting());

        let ready = host.events_named("Ready");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0]["scene"], SCENE_NAME);
        assert_eq!(ready[0]["board"]["score"], 0);
    }

    #[test]
    fn test_minimal_has_no_hud() {
        let (_, host) = scene(Variant::Minimal);
        assert_eq!(host.live_count(), 9);
        assert!(host.texts().is_empty());
    }

    #[test]
    fn test_update_moves_slots() {
        let (mut scene, mut host) = scene(Variant::Timed);
        scene.update(&mut host, 1000.0, FRAME_MS);
        let layout = scene.board().layout;
        for (i, handle) in scene.slot_shapes.iter().enumerate() {
            assert_eq!(host.get(handle).unwrap().pos, layout.slot_position(i, 1000.0));
        }
    }

    #[test]
    fn test_scenario_hit_slot_zero() {
        let (mut scene, mut host) = scene(Variant::Timed);
        let frames = shoot_at(&mut scene, &mut host, 0);

        let config = scene.config();
        let hit_ms = frames as f64 * FRAME_MS;
        let flight_ms = 200.0 / config.projectile_speed as f64 * 1000.0;
        let earliest_ms = (200.0 - config.hit_distance as f64) / config.projectile_speed as f64 * 1000.0;
        assert!(hit_ms <= flight_ms + FRAME_MS, "hit after {hit_ms} ms");
        assert!(hit_ms >= earliest_ms, "hit after {hit_ms} ms");

        let board = scene.board();
        assert!(board.slots[0].filled);
        assert!(board.slots[1..].iter().all(|s| !s.filled));
        assert_eq!(scene.score(), 1);
        assert!(host.texts().contains(&"Score: 1"));

        // Stuck star plus a fresh idle one
        assert_eq!(host.images(STAR_TEXTURE).len(), 2);
        let stuck_id = scene.stuck[0].as_ref().unwrap().id();
        scene.update(&mut host, 400.0, FRAME_MS);
        assert_eq!(host.objects[&stuck_id].pos, scene.board().slots[0].pos);
        assert_eq!(host.events_named("Stuck").len(), 1);
    }

    #[test]
    fn test_scenario_timer_runs_out() {
        let (mut scene, mut host) = scene(Variant::Timed);
        for _ in 0..30 {
            scene.timer_tick(&mut host);
        }
        assert_eq!(scene.phase(), GamePhase::GameOver);
        assert!(host.texts().contains(&"Time: 0"));
        assert!(host.texts().contains(&"GAME OVER\nScore: 0"));
        assert!(host.images(STAR_TEXTURE).is_empty());

        // Later input, frames and ticks change nothing
        scene.pointer_down(&mut host, 712.0, 384.0);
        scene.timer_tick(&mut host);
        scene.update(&mut host, 100.0, FRAME_MS);
        assert!(scene.board().projectile.is_none());
        assert!(!scene.is_shooting());
        assert_eq!(host.events_named("GameOver").len(), 1);
    }

    #[test]
    fn test_timer_destroys_star_in_flight() {
        let (mut scene, mut host) = scene(Variant::Timed);
        for _ in 0..29 {
            scene.timer_tick(&mut host);
        }
        scene.pointer_down(&mut host, 512.0, 0.0);
        scene.update(&mut host, 0.0, FRAME_MS);
        assert!(scene.is_shooting());

        scene.timer_tick(&mut host);
        assert!(!scene.is_shooting());
        assert!(host.images(STAR_TEXTURE).is_empty());
    }

    #[test]
    fn test_scenario_fill_board_to_win() {
        let (mut scene, mut host) = scene(Variant::Win);
        for i in 0..7 {
            shoot_at(&mut scene, &mut host, i);
        }
        assert!(!scene.check_win());
        assert_eq!(scene.phase(), GamePhase::Playing);

        shoot_at(&mut scene, &mut host, 7);
        assert!(scene.check_win());
        assert_eq!(scene.phase(), GamePhase::Won);
        assert!(scene.board().projectile.is_none());
        assert_eq!(host.images(STAR_TEXTURE).len(), 8);
        assert!(host.texts().contains(&"YOU WIN!\nScore: 8"));
        assert_eq!(host.events_named("Won").len(), 1);

        // Nothing respawns afterwards
        scene.update(&mut host, 500.0, FRAME_MS);
        scene.pointer_down(&mut host, 0.0, 0.0);
        assert!(scene.board().projectile.is_none());
        assert_eq!(host.images(STAR_TEXTURE).len(), 8);
    }

    #[test]
    fn test_scenario_full_board_resets() {
        let (mut scene, mut host) = scene(Variant::Endless);
        let mut stuck_ids = Vec::new();
        for i in 0..8 {
            shoot_at(&mut scene, &mut host, i);
            if let Some(handle) = &scene.stuck[i] {
                stuck_ids.push(handle.id());
            }
        }
        // The eighth star is released in the same step it sticks
        assert_eq!(stuck_ids.len(), 7);

        let board = scene.board();
        assert!(board.slots.iter().all(|s| !s.filled && s.attached.is_none()));
        assert!(scene.stuck.iter().all(Option::is_none));
        for id in &stuck_ids {
            assert!(host.destroyed.contains(id));
        }
        assert_eq!(host.images(STAR_TEXTURE).len(), 1);
        assert!(!scene.is_shooting());
        assert!(board.projectile.is_some());
        assert_eq!(scene.score(), 8);
        assert_eq!(host.events_named("BoardReset").len(), 1);
    }

    #[test]
    fn test_missed_shot_respawns() {
        let (mut scene, mut host) = scene(Variant::Timed);
        scene.pointer_down(&mut host, 512.0 + 300.0 * 0.9239, 384.0 + 300.0 * 0.3827);
        let first = scene.star.as_ref().unwrap().id();
        while scene.is_shooting() {
            scene.update(&mut host, 0.0, FRAME_MS);
        }
        assert!(host.destroyed.contains(&first));
        assert_eq!(host.images(STAR_TEXTURE).len(), 1);
        let star = host.images(STAR_TEXTURE)[0];
        assert_eq!(star.pos, Vec2::new(512.0, 384.0));
        assert_eq!(host.events_named("Lost").len(), 1);
    }

    #[test]
    fn test_restart_releases_everything() {
        let (mut scene, mut host) = scene(Variant::Timed);
        shoot_at(&mut scene, &mut host, 0);
        let before: Vec<u32> = host.objects.keys().copied().collect();

        scene.restart(&mut host).unwrap();
        for id in &before {
            assert!(host.destroyed.contains(id));
        }
        assert_eq!(host.live_count(), 11);
        assert_eq!(scene.score(), 0);
        assert!(host.texts().contains(&"Score: 0"));
        assert_eq!(host.events_named("Ready").len(), 2);
    }

    #[test]
    fn test_restart_with_switches_rules() {
        let (mut scene, mut host) = scene(Variant::Timed);
        shoot_at(&mut scene, &mut host, 0);

        let next = SceneConfig::from_variant(Variant::Minimal);
        scene.restart_with(&mut host, next).unwrap();
        assert_eq!(scene.config().features, Variant::Minimal.features());
        // Slots and star only, no HUD
        assert_eq!(host.live_count(), 9);
        assert!(host.texts().is_empty());
        assert_eq!(scene.score(), 0);
    }

    #[test]
    fn test_restart_with_invalid_config_keeps_game() {
        let (mut scene, mut host) = scene(Variant::Timed);
        shoot_at(&mut scene, &mut host, 0);
        let live = host.live_count();

        let bad = SceneConfig {
            slot_count: 0,
            ..SceneConfig::default()
        };
        assert_eq!(scene.restart_with(&mut host, bad), Err(ConfigError::NoSlots));
        assert_eq!(host.live_count(), live);
        assert_eq!(scene.score(), 1);
        assert!(scene.board().slots[0].filled);
    }

    #[test]
    fn test_fire_is_announced() {
        let (mut scene, mut host) = scene(Variant::Timed);
        scene.pointer_down(&mut host, 712.0, 384.0);
        let fired = host.events_named("Fired");
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0]["id"], scene.board().projectile.as_ref().unwrap().id);

        // A second press mid-flight fires nothing
        scene.pointer_down(&mut host, 712.0, 384.0);
        assert_eq!(host.events_named("Fired").len(), 1);
    }

    #[test]
    fn test_change_scene() {
        let (scene, mut host) = scene(Variant::Timed);
        scene.change_scene(&mut host);
        assert_eq!(host.scenes_started, vec![NEXT_SCENE.to_string()]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            projectile_speed: -600.0,
            ..SceneConfig::default()
        };
        assert!(OrbitShooterScene::new(config).is_err());
    }

    proptest! {
        #[test]
        fn pointer_move_is_idempotent(x in 0.0f32..1024.0, y in 0.0f32..768.0, repeats in 1usize..5) {
            let (mut scene, mut host) = scene(Variant::Timed);
            scene.pointer_move(&mut host, x, y);
            let rotation = scene.board().projectile.as_ref().unwrap().rotation;
            for _ in 0..repeats {
                scene.pointer_move(&mut host, x, y);
            }
            let board = scene.board();
            prop_assert_eq!(board.projectile.as_ref().unwrap().rotation, rotation);
            prop_assert!(!board.is_shooting());
            prop_assert_eq!(board.score, 0);
            prop_assert!(board.slots.iter().all(|s| !s.filled));
            let image = scene.star.as_ref().unwrap();
            prop_assert_eq!(host.get(image).unwrap().rotation, rotation);
        }
    }
}

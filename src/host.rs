//! Host engine interface
//!
//! The scene never draws anything itself. It asks a [`SceneHost`] to create
//! shapes, images and text, and keeps the returned [`Handle`]s. A handle is
//! released by passing it back to [`SceneHost::destroy`], which consumes it.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;

use crate::sim::Board;

/// Opaque reference to a host-side object
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    /// Hosts mint handles; the scene only stores and returns them
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Text placement relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAnchor {
    TopLeft,
    TopRight,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub size_px: u32,
    pub anchor: TextAnchor,
    pub color: u32,
}

impl TextStyle {
    /// Score readout
    pub fn hud() -> Self {
        Self {
            size_px: 32,
            anchor: TextAnchor::TopLeft,
            color: 0xffffff,
        }
    }

    /// Timer readout
    pub fn hud_right() -> Self {
        Self {
            anchor: TextAnchor::TopRight,
            ..Self::hud()
        }
    }

    /// Game over / win message
    pub fn banner() -> Self {
        Self {
            size_px: 64,
            anchor: TextAnchor::Center,
            color: 0xffffff,
        }
    }
}

/// Application-wide notifications
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SceneEvent<'a> {
    /// Setup finished; sent once per scene start
    Ready { scene: &'a str, board: &'a Board },
    /// The live star left the spawn point
    Fired { id: u32 },
    Stuck { slot: usize, score: u32 },
    Lost,
    BoardReset,
    Won { score: u32 },
    GameOver { score: u32 },
}

impl SceneEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            SceneEvent::Ready { .. } => "Ready",
            SceneEvent::Fired { .. } => "Fired",
            SceneEvent::Stuck { .. } => "Stuck",
            SceneEvent::Lost => "Lost",
            SceneEvent::BoardReset => "BoardReset",
            SceneEvent::Won { .. } => "Won",
            SceneEvent::GameOver { .. } => "GameOver",
        }
    }
}

/// What the scene needs from the engine hosting it
pub trait SceneHost {
    fn create_circle(&mut self, pos: Vec2, radius: f32, color: u32) -> Handle;
    fn create_image(&mut self, pos: Vec2, texture: &str) -> Handle;
    fn create_text(&mut self, pos: Vec2, content: &str, style: TextStyle) -> Handle;

    fn set_position(&mut self, handle: &Handle, pos: Vec2);
    fn set_rotation(&mut self, handle: &Handle, rotation: f32);
    fn set_text(&mut self, handle: &Handle, content: &str);

    /// Release host-side resources
    fn destroy(&mut self, handle: Handle);

    /// Switch to another scene
    fn start_scene(&mut self, name: &str);

    /// Publish a notification to the rest of the application
    fn emit(&mut self, _event: &SceneEvent<'_>) {}
}

/// Repeating timer driven by the host's frame clock. Restarting the scene
/// restarts the period along with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    interval_ms: f64,
    next_ms: f64,
}

impl IntervalTimer {
    /// First tick fires `interval_ms` after `now_ms`
    pub fn new(interval_ms: f64, now_ms: f64) -> Self {
        Self {
            interval_ms,
            next_ms: now_ms + interval_ms,
        }
    }

    /// Ticks that have come due by `now_ms`. A long stall returns several.
    pub fn due(&mut self, now_ms: f64) -> u32 {
        if self.interval_ms.is_nan() || self.interval_ms <= 0.0 {
            return 0;
        }
        let mut ticks = 0;
        while now_ms >= self.next_ms {
            ticks += 1;
            self.next_ms += self.interval_ms;
        }
        ticks
    }

    /// Drop any partial period and count a full interval from `now_ms`
    pub fn restart(&mut self, now_ms: f64) {
        self.next_ms = now_ms + self.interval_ms;
    }
}

/// Kind of a recorded object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Circle { radius: f32, color: u32 },
    Image { texture: String },
    Text { style: TextStyle },
}

/// A live object in a [`RecordingHost`]
#[derive(Debug, Clone)]
pub struct HostObject {
    pub kind: ObjectKind,
    pub pos: Vec2,
    pub rotation: f32,
    pub text: Option<String>,
}

/// In-memory host: keeps every live object and logs destroys, scene
/// switches and notifications. Used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_id: u32,
    /// Live objects by handle id
    pub objects: BTreeMap<u32, HostObject>,
    /// Ids in destroy order
    pub destroyed: Vec<u32>,
    pub scenes_started: Vec<String>,
    /// Emitted notifications as JSON
    pub events: Vec<serde_json::Value>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &Handle) -> Option<&HostObject> {
        self.objects.get(&handle.id())
    }

    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    /// Live images with the given texture
    pub fn images(&self, texture: &str) -> Vec<&HostObject> {
        self.objects
            .values()
            .filter(|o| matches!(&o.kind, ObjectKind::Image { texture: t } if t == texture))
            .collect()
    }

    /// Content of every live text object
    pub fn texts(&self) -> Vec<&str> {
        self.objects
            .values()
            .filter_map(|o| o.text.as_deref())
            .collect()
    }

    /// Emitted notifications of one type
    pub fn events_named(&self, name: &str) -> Vec<&serde_json::Value> {
        self.events
            .iter()
            .filter(|e| e.get("type").and_then(|t| t.as_str()) == Some(name))
            .collect()
    }

    fn insert(&mut self, kind: ObjectKind, pos: Vec2, text: Option<String>) -> Handle {
        self.next_id += 1;
        let id = self.next_id;
        self.objects.insert(
            id,
            HostObject {
                kind,
                pos,
                rotation: 0.0,
                text,
            },
        );
        Handle::new(id)
    }

    fn object_mut(&mut self, handle: &Handle) -> Option<&mut HostObject> {
        let obj = self.objects.get_mut(&handle.id());
        if obj.is_none() {
            log::warn!("Unknown handle {}", handle.id());
        }
        obj
    }
}

impl SceneHost for RecordingHost {
    fn create_circle(&mut self, pos: Vec2, radius: f32, color: u32) -> Handle {
        self.insert(ObjectKind::Circle { radius, color }, pos, None)
    }

    fn create_image(&mut self, pos: Vec2, texture: &str) -> Handle {
        let kind = ObjectKind::Image {
            texture: texture.to_string(),
        };
        self.insert(kind, pos, None)
    }

    fn create_text(&mut self, pos: Vec2, content: &str, style: TextStyle) -> Handle {
        self.insert(ObjectKind::Text { style }, pos, Some(content.to_string()))
    }

    fn set_position(&mut self, handle: &Handle, pos: Vec2) {
        if let Some(obj) = self.object_mut(handle) {
            obj.pos = pos;
        }
    }

    fn set_rotation(&mut self, handle: &Handle, rotation: f32) {
        if let Some(obj) = self.object_mut(handle) {
            obj.rotation = rotation;
        }
    }

    fn set_text(&mut self, handle: &Handle, content: &str) {
        if let Some(obj) = self.object_mut(handle) {
            obj.text = Some(content.to_string());
        }
    }

    fn destroy(&mut self, handle: Handle) {
        if self.objects.remove(&handle.id()).is_some() {
            self.destroyed.push(handle.id());
        } else {
            log::warn!("Double destroy of handle {}", handle.id());
        }
    }

    fn start_scene(&mut self, name: &str) {
        self.scenes_started.push(name.to_string());
    }

    fn emit(&mut self, event: &SceneEvent<'_>) {
        match serde_json::to_value(event) {
            Ok(value) => self.events.push(value),
            Err(e) => log::warn!("Cannot record {} event: {}", event.name(), e),
        }
    }
}

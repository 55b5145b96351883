//! Browser host
//!
//! Maps scene objects onto absolutely positioned DOM elements inside the
//! game container, and wires animation frames, pointer events, the round
//! timer and keyboard shortcuts to the scene.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Document, HtmlElement, KeyboardEvent, PointerEvent};

use crate::config::SceneConfig;
use crate::consts::TIMER_INTERVAL_MS;
use crate::demo::Autopilot;
use crate::host::{Handle, IntervalTimer, SceneEvent, SceneHost, TextAnchor, TextStyle};
use crate::scene::OrbitShooterScene;

/// Element the scene is drawn into
pub const CONTAINER_ID: &str = "game-container";

/// Star sprite size in CSS pixels
const SPRITE_SIZE: f32 = 24.0;

struct DomObject {
    el: HtmlElement,
    pos: Vec2,
    rotation: f32,
    anchor: TextAnchor,
}

/// DOM-backed [`SceneHost`]
pub struct DomHost {
    document: Document,
    root: HtmlElement,
    next_id: u32,
    objects: HashMap<u32, DomObject>,
}

impl DomHost {
    pub fn new(container_id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let root = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str("missing game container"))?
            .dyn_into::<HtmlElement>()?;
        root.style().set_property("position", "relative")?;
        root.style().set_property("overflow", "hidden")?;

        Ok(Self {
            document,
            root,
            next_id: 0,
            objects: HashMap::new(),
        })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    fn insert(
        &mut self,
        pos: Vec2,
        anchor: TextAnchor,
        styles: &[(&str, String)],
        text: Option<&str>,
    ) -> Handle {
        self.next_id += 1;
        let id = self.next_id;

        let el = match self
            .document
            .create_element("div")
            .and_then(|e| e.dyn_into::<HtmlElement>().map_err(JsValue::from))
        {
            Ok(el) => el,
            Err(e) => {
                log::warn!("Cannot create element: {:?}", e);
                return Handle::new(id);
            }
        };

        let style = el.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("pointer-events", "none");
        for (name, value) in styles {
            let _ = style.set_property(name, value);
        }
        if let Some(text) = text {
            el.set_text_content(Some(text));
        }
        let _ = self.root.append_child(&el);

        let obj = DomObject {
            el,
            pos,
            rotation: 0.0,
            anchor,
        };
        apply_transform(&obj);
        self.objects.insert(id, obj);
        Handle::new(id)
    }

    fn dispatch(&self, event_type: &str, detail: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(detail));
        match CustomEvent::new_with_event_init_dict(event_type, &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::warn!("Cannot dispatch {}: {:?}", event_type, e),
        }
    }
}

fn css_color(color: u32) -> String {
    format!("#{:06x}", color & 0xffffff)
}

fn apply_transform(obj: &DomObject) {
    let shift = match obj.anchor {
        TextAnchor::TopLeft => "translate(0, 0)",
        TextAnchor::TopRight => "translate(-100%, 0)",
        TextAnchor::Center => "translate(-50%, -50%)",
    };
    let style = obj.el.style();
    let _ = style.set_property("left", &format!("{}px", obj.pos.x));
    let _ = style.set_property("top", &format!("{}px", obj.pos.y));
    let _ = style.set_property("transform", &format!("{} rotate({}rad)", shift, obj.rotation));
}

impl SceneHost for DomHost {
    fn create_circle(&mut self, pos: Vec2, radius: f32, color: u32) -> Handle {
        let size = format!("{}px", radius * 2.0);
        let styles = [
            ("width", size.clone()),
            ("height", size),
            ("border-radius", "50%".to_string()),
            ("background", css_color(color)),
        ];
        self.insert(pos, TextAnchor::Center, &styles, None)
    }

    fn create_image(&mut self, pos: Vec2, texture: &str) -> Handle {
        let size = format!("{}px", SPRITE_SIZE);
        let styles = [
            ("width", size.clone()),
            ("height", size),
            ("background-image", format!("url(assets/{texture}.png)")),
            ("background-size", "contain".to_string()),
        ];
        self.insert(pos, TextAnchor::Center, &styles, None)
    }

    fn create_text(&mut self, pos: Vec2, content: &str, style: TextStyle) -> Handle {
        let styles = [
            ("font-size", format!("{}px", style.size_px)),
            ("color", css_color(style.color)),
            ("white-space", "pre".to_string()),
            ("text-align", "center".to_string()),
        ];
        self.insert(pos, style.anchor, &styles, Some(content))
    }

    fn set_position(&mut self, handle: &Handle, pos: Vec2) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.pos = pos;
            apply_transform(obj);
        }
    }

    fn set_rotation(&mut self, handle: &Handle, rotation: f32) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.rotation = rotation;
            apply_transform(obj);
        }
    }

    fn set_text(&mut self, handle: &Handle, content: &str) {
        if let Some(obj) = self.objects.get(&handle.id()) {
            obj.el.set_text_content(Some(content));
        }
    }

    fn destroy(&mut self, handle: Handle) {
        if let Some(obj) = self.objects.remove(&handle.id()) {
            obj.el.remove();
        }
    }

    fn start_scene(&mut self, name: &str) {
        log::info!("Starting scene {}", name);
        self.dispatch("orbit-shooter:start-scene", name);
    }

    fn emit(&mut self, event: &SceneEvent<'_>) {
        let event_type = match event {
            SceneEvent::Ready { .. } => "current-scene-ready".to_string(),
            other => format!("orbit-shooter:{}", other.name()),
        };
        match serde_json::to_string(event) {
            Ok(json) => self.dispatch(&event_type, &json),
            Err(e) => log::warn!("Cannot serialize {} event: {}", event.name(), e),
        }
    }
}

/// Scene, host and frame clock shared between browser callbacks
struct Game {
    scene: OrbitShooterScene,
    host: DomHost,
    start_time: Option<f64>,
    last_time: Option<f64>,
    /// Scene time of the last frame
    elapsed_ms: f64,
    /// One-second round clock, restarted with the scene
    timer: IntervalTimer,
    /// Attract mode
    autopilot: Option<Autopilot>,
}

impl Game {
    fn frame(&mut self, time: f64) {
        let start = *self.start_time.get_or_insert(time);
        let delta = time - self.last_time.unwrap_or(time);
        self.last_time = Some(time);
        self.elapsed_ms = time - start;

        let Game {
            scene,
            host,
            timer,
            autopilot,
            elapsed_ms,
            ..
        } = self;
        scene.update(host, *elapsed_ms, delta);
        for _ in 0..timer.due(*elapsed_ms) {
            scene.timer_tick(host);
        }

        if let Some(aim) = autopilot.as_mut().and_then(|p| p.choose_target(scene.board())) {
            scene.pointer_move(host, aim.target.x, aim.target.y);
            scene.pointer_down(host, aim.target.x, aim.target.y);
        }
    }

    /// Start over under `config`, with a fresh round clock
    fn restart_with(&mut self, config: SceneConfig) {
        let Game {
            scene,
            host,
            timer,
            elapsed_ms,
            ..
        } = self;
        match scene.restart_with(host, config) {
            Ok(()) => timer.restart(*elapsed_ms),
            Err(e) => log::error!("Restart failed: {}", e),
        }
    }

    /// Convert client coordinates to scene coordinates
    fn to_scene(&self, client_x: i32, client_y: i32) -> Vec2 {
        let rect = self.host.root().get_bounding_client_rect();
        let field = self.scene.config().field;
        let scale_x = if rect.width() > 0.0 { field.x as f64 / rect.width() } else { 1.0 };
        let scale_y = if rect.height() > 0.0 { field.y as f64 / rect.height() } else { 1.0 };
        Vec2::new(
            ((client_x as f64 - rect.left()) * scale_x) as f32,
            ((client_y as f64 - rect.top()) * scale_y) as f32,
        )
    }
}

/// Build the scene in the page and start the loops
pub fn run() -> Result<(), JsValue> {
    let config = SceneConfig::load();
    let mut host = DomHost::new(CONTAINER_ID)?;
    let mut scene =
        OrbitShooterScene::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    scene.create(&mut host);

    let game = Rc::new(RefCell::new(Game {
        scene,
        host,
        start_time: None,
        last_time: None,
        elapsed_ms: 0.0,
        timer: IntervalTimer::new(TIMER_INTERVAL_MS as f64, 0.0),
        autopilot: None,
    }));

    setup_pointer(game.clone())?;
    setup_keys(game.clone())?;
    start_frame_loop(game)?;

    log::info!("Orbit Shooter running!");
    Ok(())
}

fn setup_pointer(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
    let root = game.borrow().host.root().clone();

    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let mut g = game.borrow_mut();
            let p = g.to_scene(event.client_x(), event.client_y());
            let Game { scene, host, .. } = &mut *g;
            scene.pointer_move(host, p.x, p.y);
        });
        root.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let mut g = game.borrow_mut();
            let p = g.to_scene(event.client_x(), event.client_y());
            let Game { scene, host, .. } = &mut *g;
            scene.pointer_down(host, p.x, p.y);
        });
        root.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn setup_keys(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
        let mut g = game.borrow_mut();
        match event.key().as_str() {
            "r" | "R" => {
                let config = g.scene.config().clone();
                g.restart_with(config);
            }
            "v" | "V" => {
                let config = g.scene.config().next_variant();
                config.save();
                g.restart_with(config);
                log::info!("Rules: {:?}", g.scene.config().features);
            }
            "d" | "D" => {
                g.autopilot = match g.autopilot {
                    Some(_) => None,
                    None => Some(Autopilot::new(js_sys::Date::now() as u64)),
                };
                log::info!("Autopilot: {}", g.autopilot.is_some());
            }
            "Enter" => {
                let Game { scene, host, .. } = &mut *g;
                scene.change_scene(host);
            }
            _ => {}
        }
    });
    window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) {
    if let Some(window) = web_sys::window() {
        let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}

fn start_frame_loop(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = frame.clone();

    *frame.borrow_mut() = Some(Closure::new(move |time: f64| {
        game.borrow_mut().frame(time);
        if let Some(callback) = next.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }));

    if let Some(callback) = frame.borrow().as_ref() {
        request_animation_frame(callback);
    }
    Ok(())
}

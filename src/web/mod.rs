//! Browser wiring: the `#bg-canvas` storm, puddle canvases, input listeners,
//! thunder playback and the animation loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlCanvasElement, MouseEvent, Window, window};

use crate::config::StormConfig;
use crate::error::StormError;
use crate::scene::StormScene;
use crate::surface::{BufferSize, Surface};
use crate::timer::CancelToken;

mod audio;
mod canvas;
mod listener;
mod puddles;

use audio::ThunderPlayer;
use canvas::CanvasSurface;
use listener::EventListener;
use puddles::PuddleSet;

const BG_CANVAS_ID: &str = "bg-canvas";

// --- Public entrypoints -------------------------------------------------------

/// Start the storm on `#bg-canvas` with the built-in configuration. Pages
/// without that canvas are left untouched.
#[wasm_bindgen]
pub fn start_storm() -> Result<(), JsValue> {
    start(StormConfig::default())?;
    Ok(())
}

/// Like [`start_storm`], with a JSON object overriding any configuration
/// fields.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_storm_with_config(json: &str) -> Result<(), JsValue> {
    start(StormConfig::from_json(json)?)?;
    Ok(())
}

/// Tear everything down: loop, timers, listeners, observers and audio.
#[wasm_bindgen]
pub fn stop_storm() {
    let runtime = STORM.with(|cell| cell.borrow_mut().take());
    if let Some(mut rt) = runtime {
        rt.shutdown();
        log::info!("storm stopped");
    }
}

pub(crate) fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub(crate) fn device_pixel_ratio() -> f64 {
    window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

fn viewport(win: &Window) -> (f64, f64) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (dim(win.inner_width()), dim(win.inner_height()))
}

// --- Runtime state ------------------------------------------------------------

thread_local! {
    static STORM: RefCell<Option<StormRuntime>> = RefCell::new(None);
}

struct StormRuntime {
    cfg: StormConfig,
    document: Document,
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
    scene: StormScene<SmallRng>,
    puddles: PuddleSet,
    thunder: ThunderPlayer,
    listeners: Vec<EventListener>,
    unlock_listeners: Vec<EventListener>,
    frame: FrameLoop,
}

impl StormRuntime {
    fn tick(&mut self, now: f64) {
        let report = self.scene.update(now);
        for _ in 0..report.thunder_cues {
            self.thunder.cue(self.scene.rng_mut());
        }
        self.scene.render(&mut self.surface);
        self.puddles.frame(now);
    }

    fn fit_canvas(&self, width: f64, height: f64) {
        let dpr = device_pixel_ratio();
        let size = BufferSize::for_css(width, height, dpr);
        self.surface.fit(&self.canvas, size, (width, height), dpr);
    }

    fn on_resize(&mut self) {
        let Some(win) = window() else {
            return;
        };
        let (w, h) = viewport(&win);
        self.fit_canvas(w, h);
        self.scene.resize(w, h);
        self.puddles = PuddleSet::register(&self.document, &self.cfg.ripple, performance_now());
        log::debug!("viewport resized to {w}x{h}");
    }

    fn unlock_audio(&mut self) {
        if self.thunder.unlock() {
            for l in &self.unlock_listeners {
                l.detach();
            }
            log::info!("audio unlocked");
        }
    }

    fn shutdown(&mut self) {
        self.frame.stop();
        self.scene.dispose();
        self.listeners.clear();
        self.unlock_listeners.clear();
        self.puddles = PuddleSet::default();
        self.thunder.close();
        let (w, h) = self.scene.size();
        self.surface.clear(w, h);
    }
}

/// Run `f` against the live runtime; no-op when stopped or already borrowed.
fn with_runtime(f: impl FnOnce(&mut StormRuntime)) {
    STORM.with(|cell| {
        if let Ok(mut slot) = cell.try_borrow_mut() {
            if let Some(rt) = slot.as_mut() {
                f(rt);
            }
        }
    });
}

// --- Startup ------------------------------------------------------------------

fn start(cfg: StormConfig) -> Result<(), StormError> {
    stop_storm();

    let win = window().ok_or(StormError::NoWindow)?;
    let document = win.document().ok_or(StormError::NoDocument)?;
    let Some(el) = document.get_element_by_id(BG_CANVAS_ID) else {
        log::info!("no #{BG_CANVAS_ID} on this page, storm disabled");
        return Ok(());
    };
    let canvas: HtmlCanvasElement = el
        .dyn_into()
        .map_err(|_| StormError::NotACanvas(BG_CANVAS_ID.to_owned()))?;
    let surface = CanvasSurface::for_canvas(&canvas, BG_CANVAS_ID)?;
    canvas.style().set_property("pointer-events", "none")?;

    let now = performance_now();
    let (w, h) = viewport(&win);
    let scene = StormScene::new(cfg.clone(), SmallRng::from_entropy(), w, h, now);
    let puddles = PuddleSet::register(&document, &cfg.ripple, now);

    let runtime = StormRuntime {
        thunder: ThunderPlayer::new(cfg.thunder.clone()),
        listeners: install_listeners(&win, &document)?,
        unlock_listeners: install_unlock_listeners(&win)?,
        frame: FrameLoop::start(),
        cfg,
        document,
        canvas,
        surface,
        scene,
        puddles,
    };
    runtime.fit_canvas(w, h);
    STORM.with(|cell| *cell.borrow_mut() = Some(runtime));
    log::info!("storm started on {w}x{h} viewport");
    Ok(())
}

// --- Event listeners ----------------------------------------------------------

fn install_listeners(win: &Window, document: &Document) -> Result<Vec<EventListener>, StormError> {
    let mut listeners = Vec::with_capacity(4);

    listeners.push(EventListener::new(win, "click", |evt: Event| {
        let Some(mouse) = evt.dyn_ref::<MouseEvent>() else {
            return;
        };
        let x = mouse.client_x() as f64;
        with_runtime(|rt| rt.scene.click(x, performance_now()));
    })?);

    listeners.push(EventListener::new(win, "mousemove", |evt: Event| {
        if let Some(mouse) = evt.dyn_ref::<MouseEvent>() {
            let x = mouse.client_x() as f64;
            with_runtime(|rt| rt.scene.pointer_moved(x));
        }
    })?);

    // `mouseleave` only fires on elements, so watch the root element.
    if let Some(root) = document.document_element() {
        listeners.push(EventListener::new(&root, "mouseleave", |_evt: Event| {
            with_runtime(|rt| rt.scene.pointer_left());
        })?);
    }

    listeners.push(EventListener::new(win, "resize", |_evt: Event| {
        with_runtime(StormRuntime::on_resize);
    })?);

    Ok(listeners)
}

fn install_unlock_listeners(win: &Window) -> Result<Vec<EventListener>, StormError> {
    ["click", "keydown", "touchstart"]
        .into_iter()
        .map(|event| {
            EventListener::new(win, event, |_evt: Event| {
                with_runtime(StormRuntime::unlock_audio);
            })
        })
        .collect()
}

// --- Animation loop -----------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct FrameLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
    cancel: CancelToken,
}

impl FrameLoop {
    fn start() -> Self {
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let handle = Rc::new(Cell::new(None));
        let h = handle.clone();
        let cancel = CancelToken::new();
        let token = cancel.clone();

        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            if token.is_cancelled() {
                return;
            }
            with_runtime(|rt| rt.tick(ts));
            if !token.is_cancelled() {
                h.set(request_frame(&f));
            }
        }) as Box<dyn FnMut(f64)>));
        handle.set(request_frame(&g));

        Self {
            callback: g,
            handle,
            cancel,
        }
    }

    fn stop(&self) {
        self.cancel.cancel();
        if let (Some(id), Some(w)) = (self.handle.take(), window()) {
            let _ = w.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

fn request_frame(f: &FrameCallback) -> Option<i32> {
    let w = window()?;
    let slot = f.borrow();
    let closure = slot.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent, ResizeObserver};

use super::canvas::CanvasSurface;
use super::listener::EventListener;
use super::{device_pixel_ratio, performance_now};
use crate::color::Accent;
use crate::config::RippleConfig;
use crate::error::StormError;
use crate::ripple::RippleField;

const PUDDLE_SELECTOR: &str = ".puddle-canvas";
const ICON_SELECTOR: &str = ".card-icon";

struct PuddleState {
    canvas: HtmlCanvasElement,
    container: Element,
    surface: CanvasSurface,
    field: RippleField,
    rng: SmallRng,
}

impl PuddleState {
    /// Re-measure the container and resize the canvas to match.
    fn fit(&mut self) {
        let (w, h) = measure(&self.container);
        let dpr = device_pixel_ratio();
        let size = self.field.resize(w, h, dpr);
        self.surface.fit(&self.canvas, size, self.field.css_size(), self.field.dpr());
    }

    fn frame(&mut self, now: f64) {
        self.field.update(now);
        self.field.render(&mut self.surface, now);
    }
}

fn measure(container: &Element) -> (f64, f64) {
    (container.client_width() as f64, container.client_height() as f64)
}

fn accent_of(container: &Element) -> Accent {
    container
        .query_selector(ICON_SELECTOR)
        .ok()
        .flatten()
        .map(|icon| Accent::from_class_attr(&icon.class_name()))
        .unwrap_or_default()
}

/// One registered puddle canvas with its observers.
struct Puddle {
    state: Rc<RefCell<PuddleState>>,
    observer: ResizeObserver,
    _on_resize: Closure<dyn FnMut()>,
    _on_click: EventListener,
}

impl Puddle {
    fn attach(canvas: HtmlCanvasElement, container: Element, cfg: &RippleConfig) -> Result<Self, StormError> {
        let surface = CanvasSurface::for_canvas(&canvas, PUDDLE_SELECTOR)?;
        let (w, h) = measure(&container);
        let field = RippleField::new(cfg.clone(), accent_of(&container), w, h, device_pixel_ratio());
        let state = Rc::new(RefCell::new(PuddleState {
            canvas,
            container: container.clone(),
            surface,
            field,
            rng: SmallRng::from_entropy(),
        }));
        state.borrow_mut().fit();

        let resize_state = state.clone();
        let on_resize = Closure::wrap(Box::new(move || {
            if let Ok(mut st) = resize_state.try_borrow_mut() {
                st.fit();
            }
        }) as Box<dyn FnMut()>);
        let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
        observer.observe(&container);

        let click_state = state.clone();
        let on_click = EventListener::new(&container, "click", move |evt| {
            let Some(mouse) = evt.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Ok(mut st) = click_state.try_borrow_mut() else {
                return;
            };
            let rect = st.container.get_bounding_client_rect();
            let x = mouse.client_x() as f64 - rect.left();
            let y = mouse.client_y() as f64 - rect.top();
            let accent = accent_of(&st.container);
            let PuddleState { field, rng, .. } = &mut *st;
            field.set_accent(accent);
            let ripple = field.spawn(rng, x, y, (rect.width(), rect.height()), performance_now());
            log::debug!("ripple at ({x:.0}, {y:.0}) reaching {:.0}px", ripple.max_radius);
        })?;

        Ok(Self {
            state,
            observer,
            _on_resize: on_resize,
            _on_click: on_click,
        })
    }
}

impl Drop for Puddle {
    fn drop(&mut self) {
        self.observer.disconnect();
        if let Ok(mut st) = self.state.try_borrow_mut() {
            st.field.dispose();
        }
    }
}

/// Every puddle field on the page.
#[derive(Default)]
pub(crate) struct PuddleSet {
    puddles: Vec<Puddle>,
}

impl PuddleSet {
    /// Find every `.puddle-canvas`, bind it to its parent container and drop
    /// the centred greeting ripple into the first one.
    pub(crate) fn register(doc: &Document, cfg: &RippleConfig, now: f64) -> Self {
        let nodes = match doc.query_selector_all(PUDDLE_SELECTOR) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("puddle lookup failed: {}", StormError::from(e));
                return Self::default();
            }
        };

        let mut puddles = Vec::new();
        for i in 0..nodes.length() {
            let Some(canvas) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlCanvasElement>().ok()) else {
                continue;
            };
            let Some(container) = canvas.parent_element() else {
                log::debug!("puddle canvas {i} has no container");
                continue;
            };
            match Puddle::attach(canvas, container, cfg) {
                Ok(p) => puddles.push(p),
                Err(e) => log::warn!("puddle canvas {i} skipped: {e}"),
            }
        }

        if cfg.welcome_ripple {
            if let Some(first) = puddles.first() {
                first.state.borrow_mut().field.welcome(now);
            }
        }
        log::info!("registered {} puddle field(s)", puddles.len());
        Self { puddles }
    }

    pub(crate) fn frame(&self, now: f64) {
        for p in &self.puddles {
            if let Ok(mut st) = p.state.try_borrow_mut() {
                st.frame(now);
            }
        }
    }
}

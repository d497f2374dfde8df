// Browser tests for the page wiring. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use storm_canvas::{start_storm, stop_storm};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().and_then(|w| w.document()).unwrap()
}

#[wasm_bindgen_test]
fn page_without_canvas_is_left_alone() {
    assert!(start_storm().is_ok());
    stop_storm();
}

#[wasm_bindgen_test]
fn storm_starts_and_stops_on_bg_canvas() {
    let doc = document();
    let canvas = doc.create_element("canvas").unwrap();
    canvas.set_id("bg-canvas");
    doc.body().unwrap().append_child(&canvas).unwrap();

    let container = doc.create_element("div").unwrap();
    let puddle = doc.create_element("canvas").unwrap();
    puddle.set_class_name("puddle-canvas");
    container.append_child(&puddle).unwrap();
    doc.body().unwrap().append_child(&container).unwrap();

    assert!(start_storm().is_ok());
    // Restarting replaces the running storm.
    assert!(start_storm().is_ok());
    stop_storm();
    stop_storm();

    canvas.remove();
    container.remove();
}

#[wasm_bindgen_test]
fn non_canvas_bg_element_is_rejected() {
    let doc = document();
    let div = doc.create_element("div").unwrap();
    div.set_id("bg-canvas");
    doc.body().unwrap().append_child(&div).unwrap();
    assert!(start_storm().is_err());
    div.remove();
}

#[wasm_bindgen_test]
fn window_resize_refits_puddle_canvases() {
    let win = web_sys::window().unwrap();
    let doc = document();
    let bg = doc.create_element("canvas").unwrap();
    bg.set_id("bg-canvas");
    doc.body().unwrap().append_child(&bg).unwrap();

    let container = doc.create_element("div").unwrap();
    container.set_attribute("style", "width:120px;height:80px").unwrap();
    let puddle: web_sys::HtmlCanvasElement = doc.create_element("canvas").unwrap().dyn_into().unwrap();
    puddle.set_class_name("puddle-canvas");
    container.append_child(&puddle).unwrap();
    doc.body().unwrap().append_child(&container).unwrap();

    let dpr = win.device_pixel_ratio();
    assert!(start_storm().is_ok());
    assert_eq!(puddle.width(), (120.0 * dpr).floor() as u32);

    container.set_attribute("style", "width:60px;height:80px").unwrap();
    let resize = web_sys::Event::new("resize").unwrap();
    win.dispatch_event(&resize).unwrap();
    assert_eq!(puddle.width(), (60.0 * dpr).floor() as u32);

    stop_storm();
    bg.remove();
    container.remove();
}

// Integration tests (native) for the `storm-canvas` crate.
// These tests drive the simulation through its public API with a seeded RNG
// and a recording surface, so they run under `cargo test` on the host.

use rand::SeedableRng;
use rand::rngs::StdRng;
use storm_canvas::color::{Accent, YELLOW};
use storm_canvas::config::{RippleConfig, StormConfig, StrikeConfig};
use storm_canvas::ripple::{RippleField, ease_out_cubic};
use storm_canvas::surface::{BufferSize, Composite, RecordingSurface};
use storm_canvas::{FrameReport, StormScene};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn scene(seed: u64) -> StormScene<StdRng> {
    StormScene::new(StormConfig::default(), StdRng::seed_from_u64(seed), 800.0, 600.0, 0.0)
}

fn run(scene: &mut StormScene<StdRng>, from: f64, to: f64) -> usize {
    let mut cues = 0;
    let mut t = from;
    while t <= to {
        cues += scene.update(t).thunder_cues;
        let mut surface = RecordingSurface::new();
        scene.render(&mut surface);
        t += FRAME_MS;
    }
    cues
}

#[test]
fn storm_strikes_on_its_own() {
    let mut s = scene(3);
    // Kick-off at 600 ms plus at least two chain links by 12 s.
    let cues = run(&mut s, 0.0, 12_000.0);
    assert!(cues >= 3, "expected autonomous thunder, got {cues}");
    assert!(s.strikes().is_running());
}

#[test]
fn single_strike_variant_never_echoes() {
    let cfg = StormConfig {
        strike: StrikeConfig {
            double_strike: false,
            ..StrikeConfig::default()
        },
        ..StormConfig::default()
    };
    let mut s = StormScene::new(cfg, StdRng::seed_from_u64(5), 800.0, 600.0, 0.0);
    let mut t = 0.0;
    while t < 30_000.0 {
        s.update(t);
        // Without echoes at most one bolt is alive at a time.
        assert!(s.strikes().bolts().len() <= 1);
        t += FRAME_MS;
    }
}

#[test]
fn click_strike_is_audible_after_short_delay() {
    let mut s = scene(11);
    s.click(200.0, 100.0);
    assert_eq!(s.update(149.0), FrameReport::default());
    assert_eq!(s.update(150.0).thunder_cues, 1);
    assert_eq!(s.strikes().bolts()[0].segments[0].x1, 200.0);
}

#[test]
fn resize_keeps_rain_inside_new_bounds() {
    let mut s = scene(17);
    run(&mut s, 0.0, 500.0);
    s.resize(400.0, 300.0);
    assert_eq!(s.size(), (400.0, 300.0));
    assert_eq!(s.rain().drops().len(), s.config().rain.drop_count);
    assert!(s.rain().splashes().is_empty());
    for d in s.rain().drops() {
        assert!((0.0..=400.0).contains(&d.x));
        assert!((0.0..=300.0).contains(&d.y));
    }
}

#[test]
fn dispose_silences_everything() {
    let mut s = scene(23);
    run(&mut s, 0.0, 700.0);
    s.dispose();
    assert_eq!(run(&mut s, 700.0, 20_000.0), 0);
    let mut surface = RecordingSurface::new();
    s.render(&mut surface);
    assert_eq!(surface.segment_passes().count(), 0);
}

#[test]
fn ripple_radius_at_half_progress_is_eased() {
    let mut field = RippleField::new(RippleConfig::default(), Accent::Blue, 200.0, 100.0, 2.0);
    assert_eq!(field.buffer_size(), BufferSize { width: 400, height: 200 });
    let mut rng = StdRng::seed_from_u64(1);
    let max_radius = field.spawn(&mut rng, 50.0, 50.0, (200.0, 100.0), 0.0).max_radius;
    assert_eq!(max_radius, 200.0 * 0.85);

    let r = field.ripples()[0].clone();
    let half = r.duration_ms / 2.0;
    assert_eq!(r.radius(half), r.max_radius * ease_out_cubic(0.5));
}

#[test]
fn yellow_marker_container_spawns_yellow_ripples() {
    let accent = Accent::from_class_attr("card-icon yellow");
    let mut field = RippleField::new(RippleConfig::default(), accent, 120.0, 80.0, 1.0);
    let mut rng = StdRng::seed_from_u64(2);
    assert_eq!(field.spawn(&mut rng, 10.0, 10.0, (120.0, 80.0), 0.0).color, YELLOW);

    let mut surface = RecordingSurface::new();
    field.render(&mut surface, 100.0);
    let circles: Vec<_> = surface.circles().collect();
    assert_eq!(circles.len(), 2);
    assert_eq!(circles[1].0.composite, Composite::Lighter);
    assert!(circles[1].0.color.starts_with("rgba(245,197,66,"));
}

#[test]
fn zero_size_container_gets_minimum_canvas() {
    let field = RippleField::new(RippleConfig::default(), Accent::Blue, 0.0, 0.0, 1.0);
    assert_eq!(field.css_size(), (2.0, 2.0));
    assert_eq!(field.buffer_size(), BufferSize { width: 2, height: 2 });
}

//! The full-viewport storm: rain, live bolts and the strike flash composed
//! into one simulation context with `update` / `render` / `dispose`.

use rand::Rng;

use crate::color::WHITE;
use crate::config::StormConfig;
use crate::rain::{RainField, wind_from_pointer};
use crate::strike::StrikeScheduler;
use crate::surface::{StrokeStyle, Surface};

const GLOW_EXTRA_WIDTH: f64 = 4.0;
const GLOW_ALPHA: f64 = 0.15;
const GLOW_BLUR: f64 = 20.0;
const CORE_ALPHA: f64 = 0.7;
const CORE_BLUR: f64 = 12.0;

/// What the host has to act on after a frame update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Thunder cues whose delay elapsed this frame.
    pub thunder_cues: usize,
}

pub struct StormScene<R: Rng> {
    cfg: StormConfig,
    rng: R,
    width: f64,
    height: f64,
    now: f64,
    pointer_x: Option<f64>,
    rain: RainField,
    strikes: StrikeScheduler,
    disposed: bool,
}

impl<R: Rng> StormScene<R> {
    pub fn new(cfg: StormConfig, mut rng: R, width: f64, height: f64, now: f64) -> Self {
        let rain = RainField::new(&mut rng, cfg.rain.clone(), width, height);
        let strikes = StrikeScheduler::new(&mut rng, cfg.strike.clone(), cfg.bolt.clone(), width, now);
        Self {
            cfg,
            rng,
            width,
            height,
            now,
            pointer_x: None,
            rain,
            strikes,
            disposed: false,
        }
    }

    /// Viewport changed: reseed rain, calm the wind and retarget autonomous
    /// strikes.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.pointer_x = None;
        self.rain.resize(&mut self.rng, width, height);
        self.strikes.set_width(width);
    }

    pub fn pointer_moved(&mut self, x: f64) {
        self.pointer_x = Some(x);
    }

    /// Pointer left the window; wind settles back to calm.
    pub fn pointer_left(&mut self) {
        self.pointer_x = None;
    }

    pub fn wind(&self) -> f64 {
        match self.pointer_x {
            Some(x) => wind_from_pointer(x, self.width, self.cfg.rain.wind_range),
            None => 0.0,
        }
    }

    pub fn click(&mut self, x: f64, now: f64) {
        if self.disposed {
            return;
        }
        self.strikes.click(&mut self.rng, x, now);
    }

    /// Fire due timers, step the rain and cull expired bolts.
    pub fn update(&mut self, now: f64) -> FrameReport {
        self.now = now;
        if self.disposed {
            return FrameReport::default();
        }
        let thunder_cues = self.strikes.poll(&mut self.rng, now);
        let wind = self.wind();
        self.rain.step(&mut self.rng, now, wind);
        self.strikes.cull(now);
        FrameReport { thunder_cues }
    }

    /// Paint the frame last passed to [`StormScene::update`]. Decays the
    /// flash after compositing it.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.clear(self.width, self.height);
        self.rain.draw(surface);

        let cfg = &self.cfg.strike;
        let flash = self.strikes.flash_mut();
        if flash.is_visible(cfg.flash_cutoff) {
            surface.fill_rect(&flash.color.hex(), flash.intensity, 0.0, 0.0, self.width, self.height);
            flash.decay(cfg.flash_decay);
        }

        let white = WHITE.hex();
        for bolt in self.strikes.bolts() {
            let fade = bolt.fade(self.now);
            let color = bolt.color.hex();
            let glow = StrokeStyle::new(color.as_str(), bolt.line_width + GLOW_EXTRA_WIDTH)
                .alpha(fade * GLOW_ALPHA)
                .round()
                .glow(color.as_str(), GLOW_BLUR);
            surface.stroke_segments(&glow, &bolt.segments);

            let core = StrokeStyle::new(white.as_str(), bolt.line_width)
                .alpha(fade * CORE_ALPHA)
                .round()
                .glow(color.as_str(), CORE_BLUR);
            surface.stroke_segments(&core, &bolt.segments);
        }
    }

    /// Stop every pending timer and release the simulation state.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.strikes.stop();
        self.strikes.cull(f64::INFINITY);
        self.strikes.flash_mut().set_intensity(0.0);
        self.rain.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn rain(&self) -> &RainField {
        &self.rain
    }

    pub fn strikes(&self) -> &StrikeScheduler {
        &self.strikes
    }

    pub fn strikes_mut(&mut self) -> &mut StrikeScheduler {
        &mut self.strikes
    }

    pub fn config(&self) -> &StormConfig {
        &self.cfg
    }

    /// Shared random source, also used by the host for thunder voices.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::generate_bolt;
    use crate::config::BoltConfig;
    use crate::surface::RecordingSurface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_PI_2;

    fn scene() -> StormScene<StdRng> {
        StormScene::new(StormConfig::default(), StdRng::seed_from_u64(99), 800.0, 600.0, 0.0)
    }

    #[test]
    fn bolt_lives_exactly_its_lifetime() {
        let mut s = scene();
        let mut rng = StdRng::seed_from_u64(1);
        let bolt = generate_bolt(&mut rng, &BoltConfig::default(), 100.0, 0.0, FRAC_PI_2, 0)
            .born(0.0, 200.0);
        s.strikes_mut().adopt(bolt);
        s.update(199.0);
        assert_eq!(s.strikes().bolts().len(), 1);
        s.update(201.0);
        assert!(s.strikes().bolts().is_empty());
    }

    #[test]
    fn render_draws_glow_and_core_per_bolt() {
        let mut s = scene();
        s.click(400.0, 0.0);
        s.update(125.0);
        let mut surface = RecordingSurface::new();
        s.render(&mut surface);

        let passes: Vec<_> = surface.segment_passes().collect();
        assert_eq!(passes.len(), 2);
        let (glow, core) = (passes[0].0, passes[1].0);
        let bolt = &s.strikes().bolts()[0];
        assert_eq!(glow.width, bolt.line_width + 4.0);
        assert!((glow.alpha - 0.5 * 0.15).abs() < 1e-12);
        assert_eq!(core.color, "#FFFFFF");
        assert!((core.alpha - 0.5 * 0.7).abs() < 1e-12);
        assert!(core.round && glow.round);
    }

    #[test]
    fn flash_composited_then_decayed() {
        let mut s = scene();
        s.click(10.0, 0.0);
        s.update(0.0);
        let mut surface = RecordingSurface::new();
        s.render(&mut surface);
        let fills: Vec<_> = surface.fills().collect();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].1, 0.07);
        assert!((s.strikes().flash().intensity - 0.07 * 0.88).abs() < 1e-12);
    }

    #[test]
    fn flash_fades_below_cutoff() {
        let mut s = scene();
        s.click(10.0, 0.0);
        let mut frames = 0;
        loop {
            s.update(frames as f64);
            let mut surface = RecordingSurface::new();
            s.render(&mut surface);
            if surface.fills().count() == 0 {
                break;
            }
            frames += 1;
            assert!(frames < 200);
        }
        assert!(s.strikes().flash().intensity <= 0.001);
    }

    #[test]
    fn wind_follows_pointer_and_resets() {
        let mut s = scene();
        assert_eq!(s.wind(), 0.0);
        s.pointer_moved(800.0);
        assert!((s.wind() - 0.3).abs() < 1e-12);
        s.pointer_left();
        assert_eq!(s.wind(), 0.0);
    }

    #[test]
    fn resize_calms_wind() {
        let mut s = scene();
        s.pointer_moved(700.0);
        assert!(s.wind() > 0.0);
        s.resize(400.0, 300.0);
        assert_eq!(s.wind(), 0.0);
    }

    #[test]
    fn dispose_stops_strikes() {
        let mut s = scene();
        s.dispose();
        assert!(s.is_disposed());
        assert_eq!(s.strikes().pending_timers(), 0);
        s.click(10.0, 0.0);
        assert_eq!(s.update(10_000.0), FrameReport::default());
        assert!(s.strikes().bolts().is_empty());
        assert!(s.rain().drops().is_empty());
    }
}

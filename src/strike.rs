//! When lightning happens, and what comes with it.
//!
//! The scheduler owns the live-bolt collection, the screen flash and a timer
//! queue. Autonomous strikes form a one-shot chain: each firing spawns a bolt
//! and queues the next one after a fresh random gap. Clicks spawn immediately.
//! Thunder cues are queued with a short delay and handed back to the caller
//! from [`StrikeScheduler::poll`].

use std::f64::consts::FRAC_PI_2;

use rand::Rng;

use crate::bolt::{Bolt, generate_bolt};
use crate::color::{Color, WHITE};
use crate::config::{BoltConfig, StrikeConfig, spread};
use crate::timer::{TimerId, TimerQueue};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Task {
    /// Next link of the autonomous chain.
    Chain,
    /// Stand-alone autonomous strike (the kick-off).
    Strike,
    Echo { x: f64, angle: f64 },
    Thunder,
}

/// Full-screen translucent overlay lit by each strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flash {
    pub intensity: f64,
    pub color: Color,
}

impl Default for Flash {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            color: WHITE,
        }
    }
}

impl Flash {
    pub fn ignite(&mut self, intensity: f64, color: Color) {
        self.intensity = intensity;
        self.color = color;
    }

    /// Reset intensity without changing the color.
    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
    }

    pub fn is_visible(&self, cutoff: f64) -> bool {
        self.intensity > cutoff
    }

    pub fn decay(&mut self, factor: f64) {
        self.intensity *= factor;
    }
}

#[derive(Debug)]
pub struct StrikeScheduler {
    cfg: StrikeConfig,
    bolt_cfg: BoltConfig,
    width: f64,
    timers: TimerQueue<Task>,
    chain: Option<TimerId>,
    bolts: Vec<Bolt>,
    flash: Flash,
}

impl StrikeScheduler {
    /// Arms the kick-off strike and the first link of the autonomous chain.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        cfg: StrikeConfig,
        bolt_cfg: BoltConfig,
        width: f64,
        now: f64,
    ) -> Self {
        let mut scheduler = Self {
            cfg,
            bolt_cfg,
            width,
            timers: TimerQueue::new(),
            chain: None,
            bolts: Vec::new(),
            flash: Flash::default(),
        };
        scheduler
            .timers
            .schedule(now + scheduler.cfg.first_strike_ms, Task::Strike);
        scheduler.arm_chain(rng, now);
        scheduler
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Fire every timer due at `now`. Returns how many thunder cues are due.
    pub fn poll<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) -> usize {
        let mut thunder = 0;
        for task in self.timers.drain_due(now) {
            match task {
                Task::Chain => {
                    self.chain = None;
                    self.spawn_autonomous(rng, now);
                    self.arm_chain(rng, now);
                }
                Task::Strike => self.spawn_autonomous(rng, now),
                Task::Echo { x, angle } => self.spawn_echo(rng, x, angle, now),
                Task::Thunder => thunder += 1,
            }
        }
        thunder
    }

    /// User-triggered strike rooted at the top of the viewport.
    pub fn click<R: Rng + ?Sized>(&mut self, rng: &mut R, x: f64, now: f64) -> &Bolt {
        let angle = FRAC_PI_2 + spread(rng, self.cfg.click_angle_spread);
        let bolt = generate_bolt(rng, &self.bolt_cfg, x, 0.0, angle, 0)
            .born(now, self.cfg.click_lifetime_ms);
        self.flash.ignite(self.cfg.click_flash, bolt.color);
        self.timers
            .schedule(now + self.cfg.click_thunder_delay_ms, Task::Thunder);
        self.push(bolt)
    }

    /// Add an already generated bolt to the live collection.
    pub fn adopt(&mut self, bolt: Bolt) {
        self.bolts.push(bolt);
    }

    /// Drop every bolt whose age exceeds its lifetime.
    pub fn cull(&mut self, now: f64) {
        self.bolts.retain(|b| !b.is_expired(now));
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut Flash {
        &mut self.flash
    }

    pub fn config(&self) -> &StrikeConfig {
        &self.cfg
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the next autonomous chain link, if the chain is armed.
    pub fn next_chain_due(&self) -> Option<f64> {
        self.chain.and_then(|id| self.timers.due_of(id))
    }

    pub fn is_running(&self) -> bool {
        self.chain.is_some_and(|id| self.timers.is_pending(id))
    }

    /// Cancel the chain and every pending echo/thunder timer.
    pub fn stop(&mut self) {
        self.timers.clear();
        self.chain = None;
    }

    fn arm_chain<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) {
        let delay = self.cfg.interval_ms.sample(rng);
        self.chain = Some(self.timers.schedule(now + delay, Task::Chain));
    }

    fn spawn_autonomous<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) {
        let x = if self.width > 0.0 {
            rng.gen_range(0.0..self.width)
        } else {
            0.0
        };
        let angle = FRAC_PI_2 + spread(rng, self.cfg.auto_angle_spread);
        let lifetime = self.cfg.auto_lifetime_ms.sample(rng);
        let bolt = generate_bolt(rng, &self.bolt_cfg, x, 0.0, angle, 0).born(now, lifetime);

        let intensity = self.cfg.auto_flash.sample(rng);
        self.flash.ignite(intensity, bolt.color);
        self.push(bolt);

        let thunder_at = now + self.cfg.thunder_delay_ms.sample(rng);
        self.timers.schedule(thunder_at, Task::Thunder);

        let p = self.cfg.double_strike_probability.clamp(0.0, 1.0);
        if self.cfg.double_strike && rng.gen_bool(p) {
            let echo_at = now + self.cfg.echo_delay_ms.sample(rng);
            self.timers.schedule(echo_at, Task::Echo { x, angle });
        }
    }

    fn spawn_echo<R: Rng + ?Sized>(&mut self, rng: &mut R, x: f64, angle: f64, now: f64) {
        let x = x + spread(rng, self.cfg.echo_offset_px);
        let angle = angle + spread(rng, self.cfg.echo_angle_spread);
        let lifetime = self.cfg.echo_lifetime_ms.sample(rng);
        let bolt = generate_bolt(rng, &self.bolt_cfg, x, 0.0, angle, 0).born(now, lifetime);
        self.flash.set_intensity(self.cfg.echo_flash);
        self.push(bolt);
    }

    fn push(&mut self, bolt: Bolt) -> &Bolt {
        self.bolts.push(bolt);
        &self.bolts[self.bolts.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scheduler(cfg: StrikeConfig) -> (StrikeScheduler, StdRng) {
        let mut rng = StdRng::seed_from_u64(21);
        let s = StrikeScheduler::new(&mut rng, cfg, BoltConfig::default(), 800.0, 0.0);
        (s, rng)
    }

    #[test]
    fn kickoff_strike_fires_after_first_delay() {
        let (mut s, mut rng) = scheduler(StrikeConfig::default());
        assert_eq!(s.poll(&mut rng, 599.0), 0);
        assert!(s.bolts().is_empty());
        s.poll(&mut rng, 600.0);
        assert_eq!(s.bolts().len(), 1);
        let bolt = &s.bolts()[0];
        assert_eq!(bolt.birth, 600.0);
        assert!((150.0..450.0).contains(&bolt.lifetime_ms));
        assert!((0.08..0.14).contains(&s.flash().intensity));
        assert_eq!(s.flash().color, bolt.color);
    }

    #[test]
    fn chain_rearms_after_every_link() {
        let (mut s, mut rng) = scheduler(StrikeConfig::default());
        let first = s.next_chain_due().expect("chain armed");
        assert!((1500.0..5000.0).contains(&first));
        s.poll(&mut rng, first);
        assert!(s.is_running());
        let second = s.next_chain_due().expect("chain re-armed");
        assert!(second > first);
    }

    #[test]
    fn autonomous_strike_queues_thunder_within_delay() {
        let cfg = StrikeConfig {
            double_strike: false,
            first_strike_ms: 0.0,
            interval_ms: crate::config::Span::new(60_000.0, 60_000.0),
            ..StrikeConfig::default()
        };
        let (mut s, mut rng) = scheduler(cfg);
        assert_eq!(s.poll(&mut rng, 0.0), 0);
        assert_eq!(s.poll(&mut rng, 99.0), 0);
        assert_eq!(s.poll(&mut rng, 400.0), 1);
    }

    #[test]
    fn certain_double_strike_adds_echo_bolt() {
        let cfg = StrikeConfig {
            double_strike_probability: 1.0,
            first_strike_ms: 0.0,
            interval_ms: crate::config::Span::new(60_000.0, 60_000.0),
            ..StrikeConfig::default()
        };
        let (mut s, mut rng) = scheduler(cfg);
        s.poll(&mut rng, 0.0);
        assert_eq!(s.bolts().len(), 1);
        s.poll(&mut rng, 140.0);
        assert_eq!(s.bolts().len(), 2);
        assert_eq!(s.flash().intensity, 0.06);
        let (trunk, echo) = (&s.bolts()[0], &s.bolts()[1]);
        assert!((echo.segments[0].x1 - trunk.segments[0].x1).abs() < 20.0);
        assert!((100.0..300.0).contains(&echo.lifetime_ms));
    }

    #[test]
    fn disabled_double_strike_never_echoes() {
        let cfg = StrikeConfig {
            double_strike: false,
            double_strike_probability: 1.0,
            first_strike_ms: 0.0,
            interval_ms: crate::config::Span::new(60_000.0, 60_000.0),
            ..StrikeConfig::default()
        };
        let (mut s, mut rng) = scheduler(cfg);
        s.poll(&mut rng, 0.0);
        s.poll(&mut rng, 1000.0);
        assert_eq!(s.bolts().len(), 1);
    }

    #[test]
    fn click_spawns_short_bolt_at_pointer() {
        let (mut s, mut rng) = scheduler(StrikeConfig::default());
        let bolt = s.click(&mut rng, 321.0, 50.0).clone();
        assert_eq!(bolt.lifetime_ms, 250.0);
        assert_eq!((bolt.segments[0].x1, bolt.segments[0].y1), (321.0, 0.0));
        assert_eq!(s.flash().intensity, 0.07);
        assert_eq!(s.poll(&mut rng, 99.0), 0);
        assert_eq!(s.poll(&mut rng, 100.0), 1);
    }

    #[test]
    fn stop_cancels_everything_pending() {
        let (mut s, mut rng) = scheduler(StrikeConfig::default());
        s.click(&mut rng, 10.0, 0.0);
        s.stop();
        assert_eq!(s.pending_timers(), 0);
        assert!(!s.is_running());
        assert_eq!(s.poll(&mut rng, 1e9), 0);
        assert_eq!(s.bolts().len(), 1);
    }

    #[test]
    fn flash_decays_geometrically() {
        let mut flash = Flash::default();
        flash.ignite(0.1, WHITE);
        flash.decay(0.88);
        assert!((flash.intensity - 0.088).abs() < 1e-12);
        assert!(flash.is_visible(0.001));
        flash.set_intensity(0.0005);
        assert!(!flash.is_visible(0.001));
    }
}

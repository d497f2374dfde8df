//! Thunder voice parameters and the user-gesture audio gate.
//!
//! Browsers refuse to start audio before a user gesture, so cues that arrive
//! earlier are dropped (not queued). Each played cue samples a new duration,
//! filter cutoff and peak gain so consecutive rumbles never sound identical.

use rand::Rng;

use crate::config::ThunderConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThunderVoice {
    pub duration_s: f64,
    pub lowpass_hz: f64,
    pub lowpass_q: f64,
    pub bandpass_hz: f64,
    pub bandpass_q: f64,
    pub peak_gain: f64,
    pub attack_s: f64,
    pub floor_gain: f64,
}

impl ThunderVoice {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, cfg: &ThunderConfig) -> Self {
        let duration_s = cfg.duration_s.sample(rng);
        Self {
            duration_s,
            lowpass_hz: cfg.lowpass_hz.sample(rng),
            lowpass_q: cfg.lowpass_q,
            bandpass_hz: cfg.bandpass_hz.sample(rng),
            bandpass_q: cfg.bandpass_q,
            peak_gain: cfg.peak_gain.sample(rng),
            attack_s: cfg.attack_s.clamp(0.0, duration_s),
            floor_gain: cfg.floor_gain.max(f64::MIN_POSITIVE),
        }
    }

    /// Noise buffer length for the given sample rate.
    pub fn frame_count(&self, sample_rate: f64) -> usize {
        (sample_rate * self.duration_s).max(1.0) as usize
    }

    /// Gain at `t` seconds after onset: linear attack to the peak, then an
    /// exponential tail reaching `floor_gain` at `duration_s`; silent outside.
    pub fn envelope(&self, t: f64) -> f64 {
        if t < 0.0 || t > self.duration_s {
            return 0.0;
        }
        if t < self.attack_s {
            return self.peak_gain * t / self.attack_s;
        }
        let tail = self.duration_s - self.attack_s;
        if tail <= 0.0 {
            return self.peak_gain;
        }
        let k = (t - self.attack_s) / tail;
        self.peak_gain * (self.floor_gain / self.peak_gain).powf(k)
    }
}

/// White noise in [-1, 1).
pub fn fill_noise<R: Rng + ?Sized>(rng: &mut R, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = rng.gen_range(-1.0f32..1.0);
    }
}

/// One-way latch opened by the first user gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AudioGate {
    unlocked: bool,
    dropped: u32,
}

impl AudioGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the gesture that actually unlocks.
    pub fn unlock(&mut self) -> bool {
        let first = !self.unlocked;
        self.unlocked = true;
        first
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether a cue may play now; locked cues are counted and discarded.
    pub fn admit(&mut self) -> bool {
        if !self.unlocked {
            self.dropped = self.dropped.saturating_add(1);
        }
        self.unlocked
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn voice() -> ThunderVoice {
        let mut rng = StdRng::seed_from_u64(8);
        ThunderVoice::sample(&mut rng, &ThunderConfig::default())
    }

    #[test]
    fn sampled_voice_within_ranges() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            let v = ThunderVoice::sample(&mut rng, &ThunderConfig::default());
            assert!((1.2..2.0).contains(&v.duration_s));
            assert!((150.0..230.0).contains(&v.lowpass_hz));
            assert!((60.0..100.0).contains(&v.bandpass_hz));
            assert!((0.12..0.20).contains(&v.peak_gain));
        }
    }

    #[test]
    fn envelope_attacks_then_decays_to_floor() {
        let v = voice();
        assert_eq!(v.envelope(0.0), 0.0);
        assert!((v.envelope(v.attack_s / 2.0) - v.peak_gain / 2.0).abs() < 1e-12);
        assert!((v.envelope(v.attack_s) - v.peak_gain).abs() < 1e-12);
        assert!((v.envelope(v.duration_s) - v.floor_gain).abs() < 1e-9);
        assert_eq!(v.envelope(v.duration_s + 0.1), 0.0);

        let mut last = v.envelope(v.attack_s);
        let mut t = v.attack_s + 0.05;
        while t < v.duration_s {
            let g = v.envelope(t);
            assert!(g < last);
            last = g;
            t += 0.05;
        }
    }

    #[test]
    fn noise_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut buf = vec![0.0f32; 4096];
        fill_noise(&mut rng, &mut buf);
        assert!(buf.iter().all(|s| (-1.0..1.0).contains(s)));
        assert!(buf.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn gate_drops_cues_until_unlocked() {
        let mut gate = AudioGate::new();
        assert!(!gate.admit());
        assert!(!gate.admit());
        assert_eq!(gate.dropped(), 2);
        assert!(gate.unlock());
        assert!(!gate.unlock());
        assert!(gate.admit());
        assert_eq!(gate.dropped(), 2);
    }

    #[test]
    fn frame_count_matches_duration() {
        let v = voice();
        assert_eq!(v.frame_count(48_000.0), (48_000.0 * v.duration_s) as usize);
    }
}

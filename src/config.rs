//! Build-time tuning for every effect.
//!
//! All values live in the `Default` impls below; nothing is read at runtime
//! unless the embedding page passes a JSON override (feature `serde_json`).
//! The boolean toggles exist so the leaner variants of the site script
//! (no double strikes, no accent-aware puddles) are just configurations.

use rand::Rng;

#[cfg(feature = "serde_json")]
use crate::error::StormError;

/// Half-open numeric range `[min, max)` sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Degenerate or inverted spans collapse to `min` instead of panicking.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && (value < self.max || (self.max <= self.min && value == self.min))
    }
}

/// Uniform sample in `(-half, half)`; zero when `half` is not positive.
pub fn spread<R: Rng + ?Sized>(rng: &mut R, half: f64) -> f64 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct StormConfig {
    pub bolt: BoltConfig,
    pub strike: StrikeConfig,
    pub rain: RainConfig,
    pub ripple: RippleConfig,
    pub thunder: ThunderConfig,
}

impl StormConfig {
    /// Parse a (possibly partial) JSON override; missing keys keep defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, StormError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct BoltConfig {
    /// Steps walked per bolt, `min_steps..max_steps` (exclusive upper bound).
    pub min_steps: usize,
    pub max_steps: usize,
    /// Segment length in px, drawn once per bolt.
    pub segment_length: Span,
    /// Per-step angle jitter half-width (radians).
    pub jitter: f64,
    pub branch_probability: f64,
    /// Deepest branch level; the trunk is depth 0. Values above
    /// [`crate::bolt::MAX_BRANCH_DEPTH`] are clamped when generating.
    pub max_depth: u8,
    /// Branch angle deviation half-width (radians).
    pub branch_spread: f64,
    /// Line width indexed by depth; deeper levels reuse the last entry.
    pub line_widths: [f64; 3],
}

impl Default for BoltConfig {
    fn default() -> Self {
        Self {
            min_steps: 12,
            max_steps: 30,
            segment_length: Span::new(8.0, 20.0),
            jitter: 0.6,
            branch_probability: 0.2,
            max_depth: 2,
            branch_spread: 0.75,
            line_widths: [2.5, 1.5, 0.8],
        }
    }
}

impl BoltConfig {
    pub fn line_width(&self, depth: u8) -> f64 {
        let idx = (depth as usize).min(self.line_widths.len() - 1);
        self.line_widths[idx]
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct StrikeConfig {
    /// Delay of the kick-off strike after start (ms).
    pub first_strike_ms: f64,
    /// Gap between autonomous strikes (ms).
    pub interval_ms: Span,
    pub auto_angle_spread: f64,
    pub click_angle_spread: f64,
    pub auto_lifetime_ms: Span,
    pub click_lifetime_ms: f64,
    pub auto_flash: Span,
    pub click_flash: f64,
    pub echo_flash: f64,
    /// Per-frame multiplier applied to the flash intensity.
    pub flash_decay: f64,
    /// Flash below this intensity is not drawn.
    pub flash_cutoff: f64,
    pub thunder_delay_ms: Span,
    pub click_thunder_delay_ms: f64,
    pub double_strike: bool,
    pub double_strike_probability: f64,
    pub echo_delay_ms: Span,
    /// Horizontal offset half-width of the echo bolt (px).
    pub echo_offset_px: f64,
    pub echo_angle_spread: f64,
    pub echo_lifetime_ms: Span,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            first_strike_ms: 600.0,
            interval_ms: Span::new(1500.0, 5000.0),
            auto_angle_spread: 0.3,
            click_angle_spread: 0.4,
            auto_lifetime_ms: Span::new(150.0, 450.0),
            click_lifetime_ms: 250.0,
            auto_flash: Span::new(0.08, 0.14),
            click_flash: 0.07,
            echo_flash: 0.06,
            flash_decay: 0.88,
            flash_cutoff: 0.001,
            thunder_delay_ms: Span::new(100.0, 400.0),
            click_thunder_delay_ms: 50.0,
            double_strike: true,
            double_strike_probability: 0.3,
            echo_delay_ms: Span::new(60.0, 140.0),
            echo_offset_px: 20.0,
            echo_angle_spread: 0.15,
            echo_lifetime_ms: Span::new(100.0, 300.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct RainConfig {
    pub drop_count: usize,
    pub drop_length: Span,
    pub initial_vy: Span,
    pub initial_vx_spread: f64,
    pub line_width: Span,
    pub drop_alpha: Span,
    pub respawn_vy: Span,
    pub respawn_vx_spread: f64,
    /// Recycled drops restart up to this far above the viewport (px).
    pub respawn_height: f64,
    /// Ground line sits this far above the bottom edge (px).
    pub ground_offset: f64,
    /// Horizontal wrap tolerance beyond each edge (px).
    pub wrap_margin: f64,
    pub sway_amplitude: f64,
    pub sway_frequency: f64,
    /// Wind is clamped to `[-wind_range, wind_range]`.
    pub wind_range: f64,
    pub wind_gain: f64,
    pub splash_alpha: f64,
    pub splash_growth: f64,
    pub splash_decay: f64,
    pub splash_cutoff: f64,
    pub splash_base_radius: f64,
    pub splash_radius_per_length: f64,
    pub splash_stroke_alpha: f64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            drop_count: 180,
            drop_length: Span::new(12.0, 26.0),
            initial_vy: Span::new(4.0, 10.0),
            initial_vx_spread: 0.4,
            line_width: Span::new(0.8, 1.4),
            drop_alpha: Span::new(0.18, 0.36),
            respawn_vy: Span::new(2.0, 6.0),
            respawn_vx_spread: 0.25,
            respawn_height: 120.0,
            ground_offset: 6.0,
            wrap_margin: 20.0,
            sway_amplitude: 0.002,
            sway_frequency: 1.5,
            wind_range: 0.3,
            wind_gain: 0.35,
            splash_alpha: 0.9,
            splash_growth: 0.6,
            splash_decay: 0.92,
            splash_cutoff: 0.02,
            splash_base_radius: 4.0,
            splash_radius_per_length: 0.12,
            splash_stroke_alpha: 0.28,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct RippleConfig {
    pub duration_ms: Span,
    /// Ripple reach as a fraction of the container's longer side.
    pub reach: f64,
    /// Smallest CSS extent a puddle canvas is allowed to take (px).
    pub min_extent: f64,
    /// Derive the ripple color from the container's `.card-icon` marker.
    pub accent_from_marker: bool,
    /// Drop a centred ripple into the first puddle on registration.
    pub welcome_ripple: bool,
    pub welcome_reach: f64,
    pub welcome_duration_ms: f64,
    pub glow_alpha: f64,
    pub core_alpha: f64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            duration_ms: Span::new(700.0, 1100.0),
            reach: 0.85,
            min_extent: 2.0,
            accent_from_marker: true,
            welcome_ripple: true,
            welcome_reach: 0.6,
            welcome_duration_ms: 900.0,
            glow_alpha: 0.14,
            core_alpha: 0.9,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ThunderConfig {
    pub duration_s: Span,
    pub lowpass_hz: Span,
    pub lowpass_q: f64,
    pub bandpass_hz: Span,
    pub bandpass_q: f64,
    pub peak_gain: Span,
    pub attack_s: f64,
    /// Gain the exponential tail decays to (must stay above zero).
    pub floor_gain: f64,
}

impl Default for ThunderConfig {
    fn default() -> Self {
        Self {
            duration_s: Span::new(1.2, 2.0),
            lowpass_hz: Span::new(150.0, 230.0),
            lowpass_q: 0.7,
            bandpass_hz: Span::new(60.0, 100.0),
            bandpass_q: 0.5,
            peak_gain: Span::new(0.12, 0.20),
            attack_s: 0.04,
            floor_gain: 0.001,
        }
    }
}

use rand::Rng;
use web_sys::{AudioContext, AudioContextState, BiquadFilterType};

use crate::audio::{AudioGate, ThunderVoice, fill_noise};
use crate::config::ThunderConfig;
use crate::error::StormError;

/// Web Audio thunder: noise → low-pass → band-pass → gain envelope.
pub(crate) struct ThunderPlayer {
    cfg: ThunderConfig,
    gate: AudioGate,
    ctx: Option<AudioContext>,
}

impl ThunderPlayer {
    pub(crate) fn new(cfg: ThunderConfig) -> Self {
        Self {
            cfg,
            gate: AudioGate::new(),
            ctx: None,
        }
    }

    /// Open the gate on the first gesture. Returns `true` if this call did it.
    pub(crate) fn unlock(&mut self) -> bool {
        if !self.gate.unlock() {
            return false;
        }
        match AudioContext::new() {
            Ok(ctx) => self.ctx = Some(ctx),
            Err(e) => log::warn!("{}", StormError::Audio(format!("{e:?}"))),
        }
        true
    }

    /// Play one rumble, or silently drop it if audio is locked or suspended.
    pub(crate) fn cue<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.gate.admit() {
            log::debug!("thunder dropped: audio locked ({} so far)", self.gate.dropped());
            return;
        }
        let Some(ctx) = &self.ctx else {
            return;
        };
        if ctx.state() == AudioContextState::Suspended {
            log::debug!("thunder dropped: context suspended");
            return;
        }
        let voice = ThunderVoice::sample(rng, &self.cfg);
        if let Err(e) = play(ctx, &voice, rng) {
            log::debug!("thunder playback failed: {e}");
        }
    }

    pub(crate) fn close(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            let _ = ctx.close();
        }
    }
}

fn play<R: Rng + ?Sized>(ctx: &AudioContext, voice: &ThunderVoice, rng: &mut R) -> Result<(), StormError> {
    let now = ctx.current_time();
    let sample_rate = ctx.sample_rate();

    let frames = voice.frame_count(sample_rate as f64);
    let mut noise = vec![0.0f32; frames];
    fill_noise(rng, &mut noise);
    let buffer = ctx.create_buffer(1, frames as u32, sample_rate)?;
    buffer.copy_to_channel(&mut noise, 0)?;

    let source = ctx.create_buffer_source()?;
    source.set_buffer(Some(&buffer));

    let lowpass = ctx.create_biquad_filter()?;
    lowpass.set_type(BiquadFilterType::Lowpass);
    lowpass.frequency().set_value(voice.lowpass_hz as f32);
    lowpass.q().set_value(voice.lowpass_q as f32);

    let bandpass = ctx.create_biquad_filter()?;
    bandpass.set_type(BiquadFilterType::Bandpass);
    bandpass.frequency().set_value(voice.bandpass_hz as f32);
    bandpass.q().set_value(voice.bandpass_q as f32);

    let gain = ctx.create_gain()?;
    let param = gain.gain();
    param.set_value_at_time(0.0, now)?;
    param.linear_ramp_to_value_at_time(voice.peak_gain as f32, now + voice.attack_s)?;
    param.exponential_ramp_to_value_at_time(voice.floor_gain as f32, now + voice.duration_s)?;

    source.connect_with_audio_node(&lowpass)?;
    lowpass.connect_with_audio_node(&bandpass)?;
    bandpass.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    source.start_with_when(now)?;
    source.stop_with_when(now + voice.duration_s)?;
    Ok(())
}

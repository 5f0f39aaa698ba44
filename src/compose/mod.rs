//! Layer composition
//!
//! Turns layer specs into one mixed buffer: synthesize speech, run the
//! layer's effect chain (gain, speed-up), overlay onto the running mix and
//! report progress after every layer.
//!
//! Manual mode synthesizes every layer's own text. Automatic mode
//! synthesizes one phrase once and derives every layer from that take.

mod layer;

pub use layer::{
    automatic_gain_db, automatic_layer_specs, automatic_rate, parse_layer_count, LayerDraft,
    LayerSpec, AUTOMATIC_BASE_RATE, AUTOMATIC_GAIN_FLOOR_DB, AUTOMATIC_GAIN_STEP_DB,
    AUTOMATIC_RATE_STEP, DEFAULT_GAIN, DEFAULT_RATE,
};

use crate::dsp::{overlay, EffectChain};
use crate::engine::AudioBuffer;
use crate::error::{Result, SublayerError};
use crate::speech::{synthesize_to_buffer, SpeechSynthesizer};

/// Receives progress in percent (0.0..=100.0) after each finished layer
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Percent complete after `done` of `total` layers
pub fn progress_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    if done >= total {
        return 100.0;
    }
    done as f64 * 100.0 / total as f64
}

/// Accumulates layers into a mix; the first layer becomes the base
#[derive(Debug, Default)]
pub struct Mixdown {
    mix: Option<AudioBuffer>,
    layers: usize,
}

impl Mixdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, layer: AudioBuffer) {
        match self.mix.as_mut() {
            Some(mix) => overlay(mix, &layer),
            None => self.mix = Some(layer),
        }
        self.layers += 1;
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    pub fn finish(self) -> Option<AudioBuffer> {
        self.mix
    }
}

/// Apply a layer's gain and rate to a copy of `speech`
pub fn render_layer(speech: &AudioBuffer, gain_db: i32, rate: f64) -> Result<AudioBuffer> {
    let mut layer = speech.clone();
    EffectChain::for_layer(gain_db, rate).process(&mut layer)?;
    Ok(layer)
}

/// Compose validated layers, synthesizing each layer's text
pub fn compose_layers(
    synth: &dyn SpeechSynthesizer,
    layers: &[LayerSpec],
    progress: &mut dyn ProgressSink,
) -> Result<AudioBuffer> {
    if layers.is_empty() {
        return Err(SublayerError::NoLayers);
    }

    let total = layers.len();
    let mut mixdown = Mixdown::new();

    for (idx, spec) in layers.iter().enumerate() {
        let _span = tracing::info_span!("layer", number = idx + 1).entered();
        let speech = synthesize_to_buffer(synth, &spec.text)?;
        let layer = render_layer(&speech, spec.gain_db, spec.playback_rate)?;
        tracing::debug!(
            gain_db = spec.gain_db,
            rate = spec.playback_rate,
            secs = layer.duration_secs(),
            "layer rendered"
        );
        mixdown.add(layer);
        progress.report(progress_percent(idx + 1, total));
    }

    mixdown.finish().ok_or(SublayerError::NoLayers)
}

/// Manual mode: validate every row, then compose.
///
/// Nothing is synthesized if any row fails validation.
pub fn compose_manual(
    synth: &dyn SpeechSynthesizer,
    drafts: &[LayerDraft],
    progress: &mut dyn ProgressSink,
) -> Result<AudioBuffer> {
    if drafts.is_empty() {
        return Err(SublayerError::NoLayers);
    }

    let specs = drafts
        .iter()
        .enumerate()
        .map(|(idx, draft)| draft.parse(idx + 1))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(layers = specs.len(), "composing manual layers");
    compose_layers(synth, &specs, progress)
}

/// Automatic mode: one synthesis of `text`, `num_layers` derived layers
pub fn compose_automatic(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    num_layers: usize,
    progress: &mut dyn ProgressSink,
) -> Result<AudioBuffer> {
    if num_layers < 1 {
        return Err(SublayerError::InvalidLayerCount {
            reason: "number of layers must be at least 1".to_string(),
        });
    }

    tracing::info!(layers = num_layers, "composing automatic layers");
    let speech = synthesize_to_buffer(synth, text)?;

    let mut mixdown = Mixdown::new();
    for (idx, spec) in automatic_layer_specs(text, num_layers).iter().enumerate() {
        let layer = render_layer(&speech, spec.gain_db, spec.playback_rate)?;
        mixdown.add(layer);
        progress.report(progress_percent(idx + 1, num_layers));
    }

    mixdown.finish().ok_or(SublayerError::NoLayers)
}

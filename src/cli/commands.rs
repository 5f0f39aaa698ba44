//! CLI Command Implementations
//!
//! Headless versions of what the window does: render a mix to disk or play
//! a file.

use std::path::Path;

use crate::app::AppState;
use crate::compose::{compose_automatic, compose_layers, LayerSpec};
use crate::config::{AppConfig, SynthEngine};
use crate::engine::{export_audio, AudioBuffer, ExportFormat};
use crate::error::Result;
use crate::playback::PlaybackController;
use crate::speech::{build_synthesizer, SpeechSynthesizer};

/// Apply the `--engine` override to a loaded config
pub fn apply_overrides(config: &mut AppConfig, engine: Option<SynthEngine>) {
    if let Some(engine) = engine {
        tracing::debug!(?engine, "engine overridden on the command line");
        config.synth.engine = engine;
    }
}

/// Launch the generator window.
pub fn gui(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    crate::gui::run(state)
}

/// Render manual layers to `output`.
pub fn manual(config: &AppConfig, layers: &[LayerSpec], output: &Path) -> Result<()> {
    let synth = build_synthesizer(&config.synth)?;
    let mix = render_manual(synth.as_ref(), layers)?;
    write_mix(&mix, output, config.export.format())
}

/// Render the automatic stack for `text` to `output`.
pub fn auto(config: &AppConfig, text: &str, num_layers: usize, output: &Path) -> Result<()> {
    let synth = build_synthesizer(&config.synth)?;
    let mix = render_automatic(synth.as_ref(), text, num_layers)?;
    write_mix(&mix, output, config.export.format())
}

/// Play `file` to the end, or forever when looping.
pub fn play(file: &Path, looping: bool) -> Result<()> {
    let mut controller = PlaybackController::default();
    controller.play_file(file, looping)?;

    println!("Playing: {}", file.display());
    if looping {
        println!("Looping, press Ctrl-C to stop");
    }
    controller.wait()
}

pub fn render_manual(synth: &dyn SpeechSynthesizer, layers: &[LayerSpec]) -> Result<AudioBuffer> {
    tracing::info!(engine = synth.name(), layers = layers.len(), "rendering manual layers");
    compose_layers(synth, layers, &mut |percent: f64| print_progress(percent))
}

pub fn render_automatic(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    num_layers: usize,
) -> Result<AudioBuffer> {
    tracing::info!(engine = synth.name(), layers = num_layers, "rendering automatic layers");
    compose_automatic(synth, text, num_layers, &mut |percent: f64| {
        print_progress(percent)
    })
}

fn write_mix(mix: &AudioBuffer, output: &Path, format: ExportFormat) -> Result<()> {
    export_audio(mix, output, format)?;
    println!(
        "Audio saved to {} ({:.2}s)",
        output.display(),
        mix.duration_secs()
    );
    Ok(())
}

fn print_progress(percent: f64) {
    eprintln!("Progress: {:>5.1}%", percent);
}

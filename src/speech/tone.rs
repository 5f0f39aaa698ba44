//! Tone synthesizer
//!
//! Produces a short sine "utterance" instead of speech. Length grows with
//! the text and pitch depends on its characters, so different affirmations
//! give different but reproducible audio. Used by tests and by
//! `--engine tone` for trying the app without a TTS install.

use std::path::Path;

use super::SpeechSynthesizer;
use crate::engine::{export_audio, generate_test_tone, ExportFormat, DEFAULT_SAMPLE_RATE};
use crate::error::Result;

const SECS_PER_CHAR: f32 = 0.08;
const MIN_SECS: f32 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct ToneSynthesizer;

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Duration in seconds of the tone for `text`
    pub fn duration_for(text: &str) -> f32 {
        (text.chars().count() as f32 * SECS_PER_CHAR).max(MIN_SECS)
    }

    fn frequency_for(text: &str) -> f32 {
        let sum: u32 = text.chars().map(|c| c as u32).sum();
        180.0 + (sum % 200) as f32
    }
}

impl SpeechSynthesizer for ToneSynthesizer {
    fn name(&self) -> &str {
        "tone"
    }

    fn synthesize_to_file(&self, text: &str, output: &Path) -> Result<()> {
        let mut tone = generate_test_tone(
            Self::frequency_for(text),
            Self::duration_for(text),
            DEFAULT_SAMPLE_RATE,
        );
        tone.apply_gain(-6.0);
        export_audio(&tone, output, ExportFormat::default())
    }
}

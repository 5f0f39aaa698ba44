//! Speech synthesis adapters
//!
//! This module provides:
//! - `SpeechSynthesizer` trait: text in, WAV file out
//! - `CommandSynthesizer`: runs an external TTS program (espeak-ng, Coqui `tts`, custom)
//! - `ToneSynthesizer`: deterministic stand-in that needs no TTS install
//! - `synthesize_to_buffer`: temp-file round trip into an `AudioBuffer`

mod command;
mod tone;

pub use command::{CommandSynthesizer, COQUI_DEFAULT_MODEL};
pub use tone::ToneSynthesizer;

use std::path::Path;

use crate::config::{SynthConfig, SynthEngine};
use crate::engine::{import_audio, AudioBuffer};
use crate::error::{Result, SublayerError};

/// Turns text into a speech WAV file
pub trait SpeechSynthesizer: Send + Sync {
    /// Short engine name for logs and error messages
    fn name(&self) -> &str;

    /// Write spoken `text` to a WAV file at `output`
    fn synthesize_to_file(&self, text: &str, output: &Path) -> Result<()>;
}

/// Synthesize `text` into memory.
///
/// The engine writes to a named temporary `.wav` which is removed when this
/// returns, whether synthesis succeeded or not.
pub fn synthesize_to_buffer(synth: &dyn SpeechSynthesizer, text: &str) -> Result<AudioBuffer> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SublayerError::EmptyText);
    }

    let temp_path = tempfile::Builder::new()
        .prefix("sublayer-tts-")
        .suffix(".wav")
        .tempfile()?
        .into_temp_path();

    if let Err(e) = synth.synthesize_to_file(text, &temp_path) {
        tracing::error!(engine = synth.name(), error = %e, "speech synthesis failed");
        return Err(e);
    }
    tracing::info!(engine = synth.name(), text, "generated speech");

    import_audio(&temp_path).map_err(|e| SublayerError::Synthesis {
        reason: format!("{} produced unreadable audio: {}", synth.name(), e),
        source: None,
    })
}

/// Build the synthesizer selected in the configuration
pub fn build_synthesizer(config: &SynthConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    let synth: Box<dyn SpeechSynthesizer> = match config.engine {
        SynthEngine::Espeak => Box::new(CommandSynthesizer::espeak(config.voice.as_deref())),
        SynthEngine::Coqui => Box::new(CommandSynthesizer::coqui(&config.coqui_model)),
        SynthEngine::Tone => Box::new(ToneSynthesizer::new()),
        SynthEngine::Command => {
            let template = config.command.as_ref().ok_or_else(|| SublayerError::Config {
                reason: "engine \"command\" needs a synth.command template".to_string(),
            })?;
            Box::new(CommandSynthesizer::from_template(template)?)
        }
    };
    Ok(synth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandTemplate;

    struct FailingSynth;

    impl SpeechSynthesizer for FailingSynth {
        fn name(&self) -> &str {
            "failing"
        }

        fn synthesize_to_file(&self, _text: &str, _output: &Path) -> Result<()> {
            Err(SublayerError::Synthesis {
                reason: "engine crashed".to_string(),
                source: None,
            })
        }
    }

    /// Leaves the temp file untouched (zero bytes)
    struct SilentSynth;

    impl SpeechSynthesizer for SilentSynth {
        fn name(&self) -> &str {
            "silent"
        }

        fn synthesize_to_file(&self, _text: &str, _output: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_synthesize_to_buffer_with_tone() {
        let buffer = synthesize_to_buffer(&ToneSynthesizer::new(), "I am calm").unwrap();
        assert!(!buffer.is_empty());
        assert_eq!(buffer.sample_rate, crate::engine::DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_empty_text_is_rejected_before_synthesis() {
        let result = synthesize_to_buffer(&FailingSynth, "   ");
        assert!(matches!(result, Err(SublayerError::EmptyText)));
    }

    #[test]
    fn test_synthesis_failure_propagates() {
        let result = synthesize_to_buffer(&FailingSynth, "hello");
        assert!(matches!(result, Err(SublayerError::Synthesis { .. })));
    }

    #[test]
    fn test_unreadable_output_is_a_synthesis_error() {
        let result = synthesize_to_buffer(&SilentSynth, "hello");
        assert!(matches!(result, Err(SublayerError::Synthesis { .. })));
    }

    #[test]
    fn test_build_synthesizer_by_engine() {
        let mut config = SynthConfig::default();
        assert_eq!(build_synthesizer(&config).unwrap().name(), "espeak-ng");

        config.engine = SynthEngine::Tone;
        assert_eq!(build_synthesizer(&config).unwrap().name(), "tone");

        config.engine = SynthEngine::Command;
        assert!(build_synthesizer(&config).is_err());

        config.command = Some(CommandTemplate {
            program: "say".to_string(),
            args: vec!["-o".to_string(), "{output}".to_string(), "{text}".to_string()],
        });
        assert_eq!(build_synthesizer(&config).unwrap().name(), "say");
    }
}

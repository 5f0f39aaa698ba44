//! External-program speech engines
//!
//! Any TTS tool that can write a WAV file from the command line works: the
//! argument list is a template where `{text}` and `{output}` are replaced
//! per call. The program is spawned directly, never through a shell.
//!
//! Presets:
//! - espeak-ng (install with: sudo apt install espeak-ng)
//! - Coqui TTS `tts` CLI (install with: pip install TTS)

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use super::SpeechSynthesizer;
use crate::config::CommandTemplate;
use crate::error::{Result, SublayerError};

/// Voice model used by the Coqui preset
pub const COQUI_DEFAULT_MODEL: &str = "tts_models/en/ljspeech/tacotron2-DDC";

const TEXT_PLACEHOLDER: &str = "{text}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Speech engine backed by an external program
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// espeak-ng writing a WAV with `-w`
    ///
    /// The text follows `--` so affirmations starting with `-` are not options.
    pub fn espeak(voice: Option<&str>) -> Self {
        let mut args = Vec::new();
        if let Some(voice) = voice {
            args.push("-v".to_string());
            args.push(voice.to_string());
        }
        args.extend(["-w", OUTPUT_PLACEHOLDER, "--", TEXT_PLACEHOLDER].map(String::from));
        Self {
            program: "espeak-ng".to_string(),
            args,
        }
    }

    /// Coqui TTS command line with the given model name
    pub fn coqui(model: &str) -> Self {
        Self {
            program: "tts".to_string(),
            args: vec![
                format!("--text={}", TEXT_PLACEHOLDER),
                "--model_name".to_string(),
                model.to_string(),
                "--out_path".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
            ],
        }
    }

    /// User-defined program; the template must mention `{output}`
    pub fn from_template(template: &CommandTemplate) -> Result<Self> {
        if template.program.trim().is_empty() {
            return Err(SublayerError::Config {
                reason: "speech command program is empty".to_string(),
            });
        }
        if !template.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            return Err(SublayerError::Config {
                reason: format!(
                    "speech command arguments must contain {} so the WAV can be found",
                    OUTPUT_PLACEHOLDER
                ),
            });
        }
        Ok(Self {
            program: template.program.clone(),
            args: template.args.clone(),
        })
    }

    /// Concrete argument list for one call
    pub fn render_args(&self, text: &str, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(OUTPUT_PLACEHOLDER, &output)
                    .replace(TEXT_PLACEHOLDER, text)
            })
            .collect()
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn synthesize_to_file(&self, text: &str, output: &Path) -> Result<()> {
        let args = self.render_args(text, output);
        tracing::debug!(program = %self.program, ?args, "running speech engine");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SublayerError::EngineUnavailable {
                    engine: self.program.clone(),
                });
            }
            Err(e) => {
                return Err(SublayerError::Synthesis {
                    reason: format!("failed to start {}", self.program),
                    source: Some(e),
                });
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SublayerError::Synthesis {
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    result.status,
                    stderr.trim()
                ),
                source: None,
            });
        }

        let written = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(SublayerError::Synthesis {
                reason: format!("{} did not write {}", self.program, output.display()),
                source: None,
            });
        }

        Ok(())
    }
}

//! Application state
//!
//! Everything the window shows lives here, independent of the UI toolkit:
//! the manual layer rows, the automatic form, the last mix, progress and
//! the playback controller. Every user action is a method that returns a
//! `Notice` for the UI to show, or `None` when there is nothing to say.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::compose::{compose_automatic, compose_manual, parse_layer_count, LayerDraft};
use crate::config::AppConfig;
use crate::engine::{export_audio, AudioBuffer, ExportFormat};
use crate::error::{Result, SublayerError};
use crate::playback::{PlaybackController, PlaybackState};
use crate::speech::{build_synthesizer, SpeechSynthesizer};

/// Default "Number of Layers" field
pub const DEFAULT_LAYER_COUNT: &str = "1";

/// Which form is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Manual,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message box the UI should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: "Warning".to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Map an error to the dialog the user sees
    pub fn from_error(err: &SublayerError) -> Self {
        let mut message = format!("{}.", err);
        for hint in err.recovery_suggestions() {
            message.push_str("\n- ");
            message.push_str(hint);
        }

        if err.is_warning() {
            Self {
                level: NoticeLevel::Warning,
                title: "Warning".to_string(),
                message,
            }
        } else if err.is_validation() {
            Self::error("Invalid Input", message)
        } else {
            Self::error("Error", message)
        }
    }
}

/// State behind the generator window
pub struct AppState {
    pub mode: Mode,
    /// Manual rows, in display order
    pub layers: Vec<LayerDraft>,
    pub auto_text: String,
    pub auto_count: String,
    pub looping: bool,
    progress: f64,
    mix: Option<AudioBuffer>,
    playback: PlaybackController,
    synth: Box<dyn SpeechSynthesizer>,
    export_format: ExportFormat,
}

impl AppState {
    pub fn new(
        synth: Box<dyn SpeechSynthesizer>,
        playback: PlaybackController,
        export_format: ExportFormat,
    ) -> Self {
        Self {
            mode: Mode::Manual,
            layers: Vec::new(),
            auto_text: String::new(),
            auto_count: DEFAULT_LAYER_COUNT.to_string(),
            looping: false,
            progress: 0.0,
            mix: None,
            playback,
            synth,
            export_format,
        }
    }

    /// Build the synthesizer and export format from `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let synth = build_synthesizer(&config.synth)?;
        Ok(Self::new(
            synth,
            PlaybackController::default(),
            config.export.format(),
        ))
    }

    pub fn synth_name(&self) -> &str {
        self.synth.name()
    }

    /// Progress of the last generation, 0.0..=100.0
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn mix(&self) -> Option<&AudioBuffer> {
        self.mix.as_ref()
    }

    pub fn playback_state(&mut self) -> PlaybackState {
        self.playback.state()
    }

    pub fn can_save(&self) -> bool {
        self.mix.is_some()
    }

    pub fn can_play(&self) -> bool {
        self.mix.is_some()
    }

    pub fn can_stop(&mut self) -> bool {
        self.playback.is_playing()
    }

    // ========================================================================
    // Manual form
    // ========================================================================

    pub fn add_layer(&mut self) {
        self.layers.push(LayerDraft::default());
    }

    /// Remove row `index`; later rows shift up and renumber
    pub fn remove_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.layers.remove(index);
        }
    }

    /// Reset every row to empty text, gain "0", rate "1.0"
    pub fn clear_manual(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }

    /// Append a copy of every row, keeping order
    pub fn copy_manual_layers(&mut self) {
        let copies = self.layers.clone();
        self.layers.extend(copies);
    }

    // ========================================================================
    // Automatic form
    // ========================================================================

    pub fn clear_automatic(&mut self) {
        self.auto_text.clear();
        self.auto_count = DEFAULT_LAYER_COUNT.to_string();
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// "Generate": compose the manual rows
    pub fn generate_manual(&mut self) -> Notice {
        if self.layers.is_empty() {
            return Notice::warning("No layers to generate audio.");
        }

        self.progress = 0.0;
        let synth = self.synth.as_ref();
        let progress = &mut self.progress;
        let result = compose_manual(synth, &self.layers, &mut |p: f64| *progress = p);
        self.finish_generation(result)
    }

    /// "Generate Automatic Layers": compose the automatic stack
    pub fn generate_automatic(&mut self) -> Notice {
        let num_layers = match parse_layer_count(&self.auto_count) {
            Ok(n) => n,
            Err(e) => return Notice::from_error(&e),
        };

        self.progress = 0.0;
        let synth = self.synth.as_ref();
        let progress = &mut self.progress;
        let result = compose_automatic(synth, &self.auto_text, num_layers, &mut |p: f64| {
            *progress = p
        });
        self.finish_generation(result)
    }

    /// Generate for whichever mode is active
    pub fn generate(&mut self) -> Notice {
        match self.mode {
            Mode::Manual => self.generate_manual(),
            Mode::Automatic => self.generate_automatic(),
        }
    }

    fn finish_generation(&mut self, result: Result<AudioBuffer>) -> Notice {
        match result {
            Ok(mix) => {
                tracing::info!(secs = mix.duration_secs(), "mix ready");
                self.mix = Some(mix);
                Notice::info("Success", "Audio generated successfully.")
            }
            Err(e) => {
                tracing::error!(code = e.error_code(), error = %e, "generation failed");
                Notice::from_error(&e)
            }
        }
    }

    // ========================================================================
    // Export and playback
    // ========================================================================

    /// Suggested file name for the save dialog
    pub fn default_export_name() -> String {
        format!("affirmations-{}.wav", Local::now().format("%Y%m%d-%H%M%S"))
    }

    /// Export the mix to `path`, appending `.wav` when missing
    pub fn save_to(&self, path: &Path) -> Notice {
        let Some(mix) = self.mix.as_ref() else {
            return Notice::warning("No audio generated to save.");
        };

        let path = with_wav_extension(path);
        match export_audio(mix, &path, self.export_format) {
            Ok(()) => Notice::info("Success", format!("Audio saved to {}", path.display())),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "save failed");
                Notice::from_error(&e)
            }
        }
    }

    /// Start playing the mix, honouring the loop checkbox
    pub fn play(&mut self) -> Option<Notice> {
        let Some(mix) = self.mix.as_ref() else {
            return Some(Notice::from_error(&SublayerError::NothingToPlay));
        };

        match self.playback.play(mix, self.looping) {
            Ok(()) => None,
            Err(e) => Some(Notice::from_error(&e)),
        }
    }

    /// Stop playback; a no-op when nothing plays
    pub fn stop(&mut self) -> Option<Notice> {
        match self.playback.stop() {
            Ok(_) => None,
            Err(e) => Some(Notice::from_error(&e)),
        }
    }
}

fn with_wav_extension(path: &Path) -> PathBuf {
    let has_wav = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if has_wav {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".wav");
        PathBuf::from(name)
    }
}

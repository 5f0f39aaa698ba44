//! Error handling for Sublayer
//!
//! Every error carries a stable code and, where it helps, recovery
//! suggestions that the UI shows next to the message.

use thiserror::Error;

/// Result type alias for Sublayer operations
pub type Result<T> = std::result::Result<T, SublayerError>;

/// Main error type for Sublayer operations
#[derive(Error, Debug)]
pub enum SublayerError {
    // Validation Errors
    #[error("Layer {index}: {reason}")]
    InvalidLayer { index: usize, reason: String },

    #[error("Invalid number of layers: {reason}")]
    InvalidLayerCount { reason: String },

    #[error("No layers to generate audio")]
    NoLayers,

    #[error("Affirmation text is empty")]
    EmptyText,

    // Synthesis Errors
    #[error("Speech synthesis failed: {reason}")]
    Synthesis {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Speech engine not available: {engine}")]
    EngineUnavailable { engine: String },

    // Audio Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    #[error("Audio too short ({duration_secs:.2}s) for {chunk_ms}ms chunks at {rate:.1}x speedup")]
    AudioTooShort {
        duration_secs: f64,
        chunk_ms: u32,
        rate: f64,
    },

    #[error("Processing error: {reason}")]
    Processing { reason: String },

    // Export / Playback Errors
    #[error("Export failed: {reason}")]
    Export { reason: String },

    #[error("Playback failed: {reason}")]
    Playback { reason: String },

    #[error("Audio is already playing")]
    AlreadyPlaying,

    #[error("No audio generated to play")]
    NothingToPlay,

    #[error("Window error: {reason}")]
    Gui { reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SublayerError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SublayerError::InvalidLayer { .. } => "INVALID_LAYER",
            SublayerError::InvalidLayerCount { .. } => "INVALID_LAYER_COUNT",
            SublayerError::NoLayers => "NO_LAYERS",
            SublayerError::EmptyText => "EMPTY_TEXT",
            SublayerError::Synthesis { .. } => "SYNTHESIS_ERROR",
            SublayerError::EngineUnavailable { .. } => "ENGINE_UNAVAILABLE",
            SublayerError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SublayerError::InvalidAudio { .. } => "INVALID_AUDIO",
            SublayerError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SublayerError::EmptyAudio => "EMPTY_AUDIO",
            SublayerError::AudioTooShort { .. } => "AUDIO_TOO_SHORT",
            SublayerError::Processing { .. } => "PROCESSING_ERROR",
            SublayerError::Export { .. } => "EXPORT_ERROR",
            SublayerError::Playback { .. } => "PLAYBACK_ERROR",
            SublayerError::AlreadyPlaying => "ALREADY_PLAYING",
            SublayerError::NothingToPlay => "NOTHING_TO_PLAY",
            SublayerError::Gui { .. } => "GUI_ERROR",
            SublayerError::Config { .. } => "CONFIG_ERROR",
            SublayerError::Io(_) => "IO_ERROR",
            SublayerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Input problems the user can fix by editing the form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SublayerError::InvalidLayer { .. }
                | SublayerError::InvalidLayerCount { .. }
                | SublayerError::NoLayers
                | SublayerError::EmptyText
        )
    }

    /// Errors shown as a warning rather than an error dialog
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SublayerError::NoLayers | SublayerError::AlreadyPlaying | SublayerError::NothingToPlay
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SublayerError::InvalidLayer { .. } => vec![
                "Volume must be a whole number of decibels, e.g. -10",
                "Play rate must be a number, e.g. 1.0 or 1.5",
            ],
            SublayerError::InvalidLayerCount { .. } => {
                vec!["Enter a whole number of layers, at least 1"]
            }
            SublayerError::EngineUnavailable { .. } => vec![
                "Install espeak-ng (sudo apt install espeak-ng)",
                "Or install Coqui TTS (pip install TTS) and select the coqui engine",
            ],
            SublayerError::AudioTooShort { .. } => vec![
                "Use a longer affirmation",
                "Lower the play rate of this layer",
            ],
            SublayerError::Playback { .. } => vec![
                "Check that an audio output device is connected",
                "Save the audio and play it in another application",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = SublayerError::InvalidLayer {
            index: 2,
            reason: "volume 'abc' is not a whole number".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_LAYER");
        assert_eq!(err.to_string(), "Layer 2: volume 'abc' is not a whole number");
    }

    #[test]
    fn test_classification() {
        assert!(SublayerError::NoLayers.is_validation());
        assert!(SublayerError::NoLayers.is_warning());
        assert!(SublayerError::AlreadyPlaying.is_warning());
        assert!(!SublayerError::AlreadyPlaying.is_validation());
        assert!(!SublayerError::EmptyAudio.is_warning());
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = SublayerError::EngineUnavailable {
            engine: "espeak-ng".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(SublayerError::EmptyAudio.recovery_suggestions().is_empty());
    }
}

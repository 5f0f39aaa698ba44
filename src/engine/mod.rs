//! Audio Engine Module
//!
//! Core audio types:
//! - Audio buffer management
//! - WAV file I/O and format conforming

pub mod buffer;
pub mod io;

pub use buffer::{AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE};
pub use io::{conform, export_audio, generate_test_tone, import_audio, ExportFormat};

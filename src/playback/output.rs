//! Audio output devices
//!
//! `AudioOutput` opens a WAV file for playback. Implementations are called
//! from the playback thread, so a device handle never has to cross threads.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Result, SublayerError};

/// Opens a file on an output device
pub trait AudioOutput: Send + Sync + 'static {
    fn open(&self, path: &Path, looping: bool) -> Result<Box<dyn ActivePlayback>>;
}

/// A file that is currently playing
pub trait ActivePlayback {
    /// True once a non-looping source has played to its end
    fn is_finished(&self) -> bool;

    fn stop(&mut self);
}

/// The system's default output device through rodio
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioOutput;

struct RodioPlayback {
    // Dropping the stream silences the sink
    _stream: OutputStream,
    sink: Sink,
}

impl AudioOutput for RodioOutput {
    fn open(&self, path: &Path, looping: bool) -> Result<Box<dyn ActivePlayback>> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| SublayerError::Playback {
            reason: format!("no audio output device: {}", e),
        })?;
        let sink = Sink::try_new(&handle).map_err(|e| SublayerError::Playback {
            reason: format!("failed to create sink: {}", e),
        })?;

        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| SublayerError::Playback {
            reason: format!("failed to decode {}: {}", path.display(), e),
        })?;

        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        tracing::debug!(path = %path.display(), looping, "rodio sink started");

        Ok(Box::new(RodioPlayback {
            _stream: stream,
            sink,
        }))
    }
}

impl ActivePlayback for RodioPlayback {
    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

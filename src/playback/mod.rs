//! Playback controller
//!
//! Plays the current mix on one background thread. The mix is exported to a
//! temporary WAV, the thread opens it on an `AudioOutput` and polls a
//! `CancellationToken` until playback ends or is stopped.
//!
//! State machine:
//! - Idle -> Playing on `play`
//! - Playing -> Stopped on `stop` (cancel + join)
//! - Playing -> Idle when a non-looping playback reaches the end
//! - Stopped -> Playing on `play`
//!
//! Only one playback runs at a time; `play` while playing is rejected.

mod output;

pub use output::{ActivePlayback, AudioOutput, RodioOutput};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use tempfile::TempPath;

use crate::engine::{export_audio, AudioBuffer, ExportFormat};
use crate::error::{Result, SublayerError};

/// How often the playback thread checks for cancellation and end of stream
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cooperative stop signal shared with the playback thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Playback controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing has played yet, or the last playback ran to its end
    #[default]
    Idle,
    /// The playback thread is running
    Playing,
    /// Playback was stopped by the user
    Stopped,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Playing => write!(f, "Playing"),
            PlaybackState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// What the playback thread should open
enum PlaybackSource {
    /// Exported mix, deleted when the thread finishes
    Temp(TempPath),
    /// A file the user owns
    File(PathBuf),
}

impl PlaybackSource {
    fn path(&self) -> &Path {
        match self {
            PlaybackSource::Temp(path) => path,
            PlaybackSource::File(path) => path,
        }
    }
}

struct Session {
    token: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

/// Owns the playback thread and its cancellation token
pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    session: Option<Session>,
    state: PlaybackState,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(Arc::new(RodioOutput))
    }
}

impl PlaybackController {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            session: None,
            state: PlaybackState::Idle,
        }
    }

    /// Current state, noticing playbacks that finished on their own
    pub fn state(&mut self) -> PlaybackState {
        self.reap_finished();
        self.state
    }

    pub fn is_playing(&mut self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Export `mix` to a temporary WAV and start playing it
    ///
    /// Returns once the output device has opened the file.
    ///
    /// # Errors
    /// * `AlreadyPlaying` - a playback is still running; nothing is started
    /// * `Playback` - the output device could not be opened
    pub fn play(&mut self, mix: &AudioBuffer, looping: bool) -> Result<()> {
        if self.is_playing() {
            tracing::warn!("play requested while already playing");
            return Err(SublayerError::AlreadyPlaying);
        }

        let temp_path = tempfile::Builder::new()
            .prefix("sublayer-play-")
            .suffix(".wav")
            .tempfile()?
            .into_temp_path();
        export_audio(mix, &temp_path, ExportFormat::default())?;

        self.spawn(PlaybackSource::Temp(temp_path), looping)
    }

    /// Play an existing WAV file
    pub fn play_file(&mut self, path: &Path, looping: bool) -> Result<()> {
        if self.is_playing() {
            return Err(SublayerError::AlreadyPlaying);
        }
        if !path.exists() {
            return Err(SublayerError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        self.spawn(PlaybackSource::File(path.to_path_buf()), looping)
    }

    /// Signal the playback thread to stop and wait for it
    ///
    /// Returns `false` when nothing was playing.
    pub fn stop(&mut self) -> Result<bool> {
        self.reap_finished();
        let Some(session) = self.session.take() else {
            return Ok(false);
        };

        session.token.cancel();
        let result = join(session.handle);
        self.state = PlaybackState::Stopped;
        tracing::info!("playback stopped");
        result.map(|_| true)
    }

    /// Block until the current playback ends on its own
    pub fn wait(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            let result = join(session.handle);
            self.state = PlaybackState::Idle;
            return result;
        }
        Ok(())
    }

    fn spawn(&mut self, source: PlaybackSource, looping: bool) -> Result<()> {
        let token = CancellationToken::new();
        let thread_token = token.clone();
        let output = Arc::clone(&self.output);
        let (opened_tx, opened_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("sublayer-playback".to_string())
            .spawn(move || run_playback(&*output, source, looping, &thread_token, opened_tx))?;

        // The device is opened on the playback thread; wait for the outcome
        match opened_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                join(handle)?;
                tracing::error!(error = %e, "could not open audio output");
                return Err(e);
            }
            Err(_) => {
                join(handle)?;
                return Err(SublayerError::Playback {
                    reason: "playback thread exited before opening the output".to_string(),
                });
            }
        }

        tracing::info!(looping, "playback started");
        self.session = Some(Session { token, handle });
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn reap_finished(&mut self) {
        let finished = self
            .session
            .as_ref()
            .is_some_and(|session| session.handle.is_finished());
        if !finished {
            return;
        }
        if let Some(session) = self.session.take() {
            if let Err(e) = join(session.handle) {
                tracing::error!(error = %e, "playback ended with an error");
            }
            self.state = PlaybackState::Idle;
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "playback did not shut down cleanly");
        }
    }
}

fn join(handle: JoinHandle<Result<()>>) -> Result<()> {
    handle.join().map_err(|_| SublayerError::Playback {
        reason: "playback thread panicked".to_string(),
    })?
}

/// Body of the playback thread
fn run_playback(
    output: &dyn AudioOutput,
    source: PlaybackSource,
    looping: bool,
    token: &CancellationToken,
    opened: mpsc::Sender<Result<()>>,
) -> Result<()> {
    let mut playback = match output.open(source.path(), looping) {
        Ok(playback) => {
            // The receiver only goes away if the controller is gone
            let _ = opened.send(Ok(()));
            playback
        }
        Err(e) => {
            let _ = opened.send(Err(e));
            return Ok(());
        }
    };

    loop {
        if token.is_cancelled() {
            playback.stop();
            break;
        }
        if playback.is_finished() {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    // The temp file must outlive the output that reads it
    drop(playback);
    drop(source);
    Ok(())
}

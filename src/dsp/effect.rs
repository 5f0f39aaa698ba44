//! Effect trait definition
//!
//! Base trait for the per-layer transforms (gain, speed-up).

use crate::engine::AudioBuffer;
use crate::error::Result;

/// Base trait for all DSP effects
///
/// Effects process audio buffers in-place. Unlike a streaming effect, a
/// layer transform may change the buffer length (speed-up shortens it),
/// and it may fail when the input cannot support the transform.
pub trait Effect: Send + Sync {
    /// Process audio buffer in-place
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()>;

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable description including current settings
    fn display_name(&self) -> String;

    /// True when processing would leave the buffer unchanged
    fn is_identity(&self) -> bool {
        false
    }
}

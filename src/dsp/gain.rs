//! Gain Effect
//!
//! Volume adjustment in whole or fractional decibels. A layer's volume
//! field is added to its speech in dB, so `-5` makes the layer about
//! 44% quieter in amplitude.

use crate::dsp::effect::Effect;
use crate::engine::buffer::db_to_linear;
use crate::engine::AudioBuffer;
use crate::error::Result;

// ============================================================================
// Gain Effect
// ============================================================================

/// Simple gain adjustment effect
///
/// # Example
/// ```
/// use sublayer::dsp::{Effect, Gain};
/// use sublayer::engine::{AudioBuffer, ChannelLayout};
///
/// let mut gain = Gain::new(-6.0);
/// let mut buffer = AudioBuffer::new(1024, ChannelLayout::Mono, 22050);
/// gain.process(&mut buffer).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Gain {
    gain_db: f32,
    gain_linear: f32,
}

impl Gain {
    /// Create a new gain effect
    ///
    /// # Arguments
    /// * `gain_db` - Gain in decibels, added as is. Samples are not clipped
    ///   here; integer WAV export clamps to full scale.
    pub fn new(gain_db: f32) -> Self {
        Self {
            gain_db,
            gain_linear: db_to_linear(gain_db),
        }
    }
}

impl Effect for Gain {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        if self.is_identity() {
            return Ok(());
        }

        for channel in buffer.samples.iter_mut() {
            for sample in channel.iter_mut() {
                *sample *= self.gain_linear;
            }
        }
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "gain"
    }

    fn display_name(&self) -> String {
        format!("Gain {:+.1} dB", self.gain_db)
    }

    fn is_identity(&self) -> bool {
        (self.gain_linear - 1.0).abs() < f32::EPSILON
    }
}

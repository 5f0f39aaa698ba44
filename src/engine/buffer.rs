//! Audio Buffer Management
//!
//! Provides the in-memory audio type every layer and the final mix live in.
//! Buffers keep the sample rate of whatever produced them (usually the
//! speech engine); layers are conformed to the mix when overlaid.

use crate::error::{Result, SublayerError};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate used when nothing else dictates one (LJSpeech voices run at 22.05kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude (0.0 to 1.0+ range)
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Calculate the RMS level of an audio buffer in dB
///
/// Returns -f32::INFINITY for empty or silent buffers.
pub fn calculate_rms(buffer: &AudioBuffer) -> f32 {
    let total_samples = buffer.num_channels() * buffer.len();
    if total_samples == 0 {
        return f32::NEG_INFINITY;
    }

    let sum_squares: f64 = buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .map(|&s| (s as f64) * (s as f64))
        .sum();

    let rms = (sum_squares / total_samples as f64).sqrt() as f32;
    linear_to_db(rms)
}

/// Absolute peak sample value across all channels
pub fn calculate_peak(buffer: &AudioBuffer) -> f32 {
    buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .fold(0.0_f32, |peak, &s| peak.max(s.abs()))
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    #[default]
    Mono,
    /// Two channels (stereo: left, right)
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type
///
/// Stores audio as non-interleaved 32-bit floating point samples.
/// Each channel is a separate `Vec<f32>`; all channels have the same length.
///
/// # Example
/// ```
/// use sublayer::engine::buffer::{AudioBuffer, ChannelLayout};
///
/// // One second of stereo silence at 22.05kHz
/// let buffer = AudioBuffer::new(22050, ChannelLayout::Stereo, 22050);
/// assert_eq!(buffer.channels(), 2);
/// assert_eq!(buffer.len(), 22050);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new zeroed buffer with the given length, layout and sample rate
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        let num_channels = layout.num_channels();
        Self {
            samples: vec![vec![0.0_f32; num_samples]; num_channels],
            sample_rate,
        }
    }

    /// Build a buffer from per-channel sample vectors
    ///
    /// Fails if there are no channels, more than two, or the channels differ in length.
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if ChannelLayout::from_count(samples.len()).is_none() {
            return Err(SublayerError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", samples.len()),
            });
        }
        let len = samples[0].len();
        if samples.iter().any(|ch| ch.len() != len) {
            return Err(SublayerError::InvalidAudio {
                reason: "channels have different lengths".to_string(),
                source: None,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Arguments
    /// * `interleaved` - Interleaved sample data (L, R, L, R, ... for stereo)
    /// * `layout` - Channel configuration
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    /// Result containing the AudioBuffer, or error if data length doesn't match layout
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.len() % num_channels != 0 {
            return Err(SublayerError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved format (L, R, L, R, ... for stereo)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_channels = self.channels();
        let num_samples = self.len();

        let mut interleaved = Vec::with_capacity(num_channels * num_samples);
        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Alias for channels()
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Channel layout, or None for an unsupported channel count
    pub fn channel_layout(&self) -> Option<ChannelLayout> {
        ChannelLayout::from_count(self.channels())
    }

    /// Number of frames covering `ms` milliseconds at this buffer's rate
    #[inline]
    pub fn frames_for_ms(&self, ms: u32) -> usize {
        (ms as u64 * self.sample_rate as u64 / 1000) as usize
    }

    /// Get a read-only slice of one channel
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Get a mutable slice of one channel
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Copy frames `start..end` (clamped to the buffer) into a new buffer
    pub fn slice(&self, start: usize, end: usize) -> AudioBuffer {
        let end = end.min(self.len());
        let start = start.min(end);
        AudioBuffer {
            samples: self
                .samples
                .iter()
                .map(|ch| ch[start..end].to_vec())
                .collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Append another buffer's frames; both must share channel count
    pub fn extend_from(&mut self, other: &AudioBuffer) -> Result<()> {
        if other.channels() != self.channels() {
            return Err(SublayerError::Processing {
                reason: format!(
                    "cannot append {}-channel audio to {}-channel audio",
                    other.channels(),
                    self.channels()
                ),
            });
        }
        for (dst, src) in self.samples.iter_mut().zip(&other.samples) {
            dst.extend_from_slice(src);
        }
        Ok(())
    }

    /// Check if all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }

    /// Apply gain to all samples
    pub fn apply_gain(&mut self, gain_db: f32) {
        let gain_linear = db_to_linear(gain_db);
        for channel in &mut self.samples {
            for sample in channel.iter_mut() {
                *sample *= gain_linear;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_buffer(samples: Vec<Vec<f32>>) -> AudioBuffer {
        AudioBuffer {
            samples,
            sample_rate: 1000,
        }
    }

    #[test]
    fn test_db_to_linear() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);
        assert!(db_to_linear(-120.0) < 1e-5);
    }

    #[test]
    fn test_linear_to_db() {
        assert!((linear_to_db(1.0) - 0.0).abs() < 1e-6);
        assert!((linear_to_db(0.1) - (-20.0)).abs() < 1e-4);
        assert!(linear_to_db(0.0).is_infinite() && linear_to_db(0.0).is_sign_negative());
    }

    #[test]
    fn test_calculate_rms_and_peak() {
        let silent = create_test_buffer(vec![vec![0.0; 100]]);
        assert!(calculate_rms(&silent).is_infinite());
        assert_eq!(calculate_peak(&silent), 0.0);

        let dc = create_test_buffer(vec![vec![0.5; 100], vec![-1.0; 100]]);
        assert_eq!(calculate_peak(&dc), 1.0);
    }

    #[test]
    fn test_from_interleaved_stereo() {
        let data = [1.0, 5.0, 2.0, 6.0, 3.0, 7.0];
        let buffer = AudioBuffer::from_interleaved(&data, ChannelLayout::Stereo, 1000).unwrap();
        assert_eq!(buffer.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(buffer.channel(1), &[5.0, 6.0, 7.0]);
        assert_eq!(buffer.to_interleaved(), data.to_vec());
    }

    #[test]
    fn test_from_interleaved_rejects_ragged_data() {
        let result = AudioBuffer::from_interleaved(&[1.0, 2.0, 3.0], ChannelLayout::Stereo, 1000);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_channels_validates_shape() {
        assert!(AudioBuffer::from_channels(vec![], 1000).is_err());
        assert!(AudioBuffer::from_channels(vec![vec![0.0; 3], vec![0.0; 2]], 1000).is_err());
        assert!(AudioBuffer::from_channels(vec![vec![0.0; 3]; 3], 1000).is_err());
        let ok = AudioBuffer::from_channels(vec![vec![0.0; 3]; 2], 1000).unwrap();
        assert_eq!(ok.channel_layout(), Some(ChannelLayout::Stereo));
    }

    #[test]
    fn test_duration_and_frames_for_ms() {
        let buffer = AudioBuffer::new(22050, ChannelLayout::Mono, 22050);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
        assert_eq!(buffer.frames_for_ms(150), 3307);
        assert_eq!(buffer.frames_for_ms(1000), 22050);
    }

    #[test]
    fn test_slice_clamps_to_bounds() {
        let buffer = create_test_buffer(vec![vec![0.0, 1.0, 2.0, 3.0]]);
        assert_eq!(buffer.slice(1, 3).channel(0), &[1.0, 2.0]);
        assert_eq!(buffer.slice(2, 100).channel(0), &[2.0, 3.0]);
        assert!(buffer.slice(10, 20).is_empty());
    }

    #[test]
    fn test_extend_from() {
        let mut a = create_test_buffer(vec![vec![1.0]]);
        let b = create_test_buffer(vec![vec![2.0, 3.0]]);
        a.extend_from(&b).unwrap();
        assert_eq!(a.channel(0), &[1.0, 2.0, 3.0]);

        let stereo = create_test_buffer(vec![vec![0.0], vec![0.0]]);
        assert!(a.extend_from(&stereo).is_err());
    }

    #[test]
    fn test_apply_gain() {
        let mut buffer = create_test_buffer(vec![vec![0.5, -0.5]]);
        buffer.apply_gain(-20.0);
        assert!((buffer.channel(0)[0] - 0.05).abs() < 1e-6);
        assert!((buffer.channel(0)[1] + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_is_finite() {
        let mut buffer = create_test_buffer(vec![vec![0.0, 0.5]]);
        assert!(buffer.is_finite());
        buffer.channel_mut(0)[1] = f32::NAN;
        assert!(!buffer.is_finite());
    }
}

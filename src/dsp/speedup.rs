//! Speed-up Effect
//!
//! Shortens audio without raising its pitch by dropping a slice from every
//! fixed-size chunk and crossfading what is left back together. Speech at
//! 10x stays recognisable as a voice texture rather than a chipmunk squeak.
//!
//! For a rate `r` and chunk length `c` (ms):
//! - below 2x, `c` is kept and `c * (1 - 1/r) / (1/r)` ms are removed per chunk
//! - from 2x up, `c` ms are removed and `c / r / (1 - 1/r)` ms are kept
//!
//! The last chunk is kept whole. Quantities are truncated to whole
//! milliseconds before converting to frames.

use crate::dsp::effect::Effect;
use crate::dsp::mix::append_with_crossfade;
use crate::engine::AudioBuffer;
use crate::error::{Result, SublayerError};

/// Chunk length used for layer speed-up
pub const DEFAULT_CHUNK_MS: u32 = 150;

/// Crossfade between kept chunks
pub const DEFAULT_CROSSFADE_MS: u32 = 25;

/// Millisecond layout of one speed-up pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedUpPlan {
    /// Audio kept from each chunk (before crossfade overlap)
    pub keep_ms: u32,
    /// Audio removed from each chunk
    pub remove_ms: u32,
    /// Overlap between consecutive kept chunks
    pub crossfade_ms: u32,
}

impl SpeedUpPlan {
    /// Length of one input chunk
    pub fn chunk_ms(&self) -> u32 {
        self.keep_ms + self.remove_ms
    }
}

/// Chunked speed-up with crossfade
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedUp {
    rate: f64,
    chunk_ms: u32,
    crossfade_ms: u32,
}

impl SpeedUp {
    /// Speed-up with the default 150 ms chunks and 25 ms crossfade
    pub fn new(rate: f64) -> Self {
        Self::with_chunking(rate, DEFAULT_CHUNK_MS, DEFAULT_CROSSFADE_MS)
    }

    pub fn with_chunking(rate: f64, chunk_ms: u32, crossfade_ms: u32) -> Self {
        Self {
            rate,
            chunk_ms,
            crossfade_ms,
        }
    }

    /// Compute the chunk layout, or `None` when the rate removes nothing
    pub fn plan(&self) -> Option<SpeedUpPlan> {
        if !self.rate.is_finite() || self.rate <= 1.0 {
            return None;
        }

        let atk = 1.0 / self.rate;
        let chunk = self.chunk_ms as f64;
        let (keep_ms, remove_ms) = if self.rate < 2.0 {
            (self.chunk_ms, (chunk * (1.0 - atk) / atk) as u32)
        } else {
            ((atk * chunk / (1.0 - atk)) as u32, self.chunk_ms)
        };

        if remove_ms == 0 {
            return None;
        }

        Some(SpeedUpPlan {
            keep_ms,
            remove_ms,
            crossfade_ms: self.crossfade_ms.min(remove_ms - 1),
        })
    }
}

impl Effect for SpeedUp {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        if !self.rate.is_finite() || self.rate < 1.0 {
            return Err(SublayerError::Processing {
                reason: format!("cannot speed up audio by a factor of {}", self.rate),
            });
        }
        let Some(plan) = self.plan() else {
            return Ok(());
        };

        let chunk_frames = buffer.frames_for_ms(plan.chunk_ms()).max(1);
        let num_chunks = buffer.len().div_ceil(chunk_frames);
        if num_chunks < 2 {
            return Err(SublayerError::AudioTooShort {
                duration_secs: buffer.duration_secs(),
                chunk_ms: plan.keep_ms,
                rate: self.rate,
            });
        }

        let crossfade = buffer.frames_for_ms(plan.crossfade_ms);
        let trim = buffer.frames_for_ms(plan.remove_ms - plan.crossfade_ms);
        let keep = chunk_frames.saturating_sub(trim);

        let mut out = buffer.slice(0, keep);
        for idx in 1..num_chunks - 1 {
            let start = idx * chunk_frames;
            let piece = buffer.slice(start, start + keep);
            append_with_crossfade(&mut out, &piece, crossfade)?;
        }
        let last = buffer.slice((num_chunks - 1) * chunk_frames, buffer.len());
        out.extend_from(&last)?;

        tracing::trace!(
            rate = self.rate,
            input_frames = buffer.len(),
            output_frames = out.len(),
            "speed-up applied"
        );
        *buffer = out;
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "speedup"
    }

    fn display_name(&self) -> String {
        format!("Speed-up {:.2}x", self.rate)
    }

    fn is_identity(&self) -> bool {
        self.rate >= 1.0 && self.plan().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_test_tone;

    const RATE: u32 = 8000;

    #[test]
    fn test_plan_below_two() {
        let plan = SpeedUp::new(1.5).plan().unwrap();
        assert_eq!(plan.keep_ms, 150);
        assert_eq!(plan.remove_ms, 75);
        assert_eq!(plan.crossfade_ms, 25);
    }

    #[test]
    fn test_plan_at_ten() {
        let plan = SpeedUp::new(10.0).plan().unwrap();
        assert_eq!(plan.keep_ms, 16);
        assert_eq!(plan.remove_ms, 150);
        assert_eq!(plan.crossfade_ms, 25);
        assert_eq!(plan.chunk_ms(), 166);
    }

    #[test]
    fn test_plan_crossfade_capped_by_removed_slice() {
        // 1.05x removes 7 ms per chunk, so crossfade is capped at 6 ms
        let plan = SpeedUp::new(1.05).plan().unwrap();
        assert_eq!(plan.remove_ms, 7);
        assert_eq!(plan.crossfade_ms, 6);
    }

    #[test]
    fn test_unity_and_tiny_rates_are_noops() {
        assert!(SpeedUp::new(1.0).plan().is_none());
        assert!(SpeedUp::new(1.0).is_identity());
        assert!(SpeedUp::new(1.001).plan().is_none());

        let mut buffer = generate_test_tone(220.0, 1.0, RATE);
        let before = buffer.clone();
        SpeedUp::new(1.0).process(&mut buffer).unwrap();
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_rejects_slowdown() {
        let mut buffer = generate_test_tone(220.0, 1.0, RATE);
        assert!(SpeedUp::new(0.5).process(&mut buffer).is_err());
        assert!(SpeedUp::new(f64::NAN).process(&mut buffer).is_err());
    }

    #[test]
    fn test_double_speed_halves_duration() {
        let mut buffer = generate_test_tone(220.0, 10.0, RATE);
        SpeedUp::new(2.0).process(&mut buffer).unwrap();
        let secs = buffer.duration_secs();
        assert!((secs - 5.0).abs() < 0.15, "got {secs}s");
    }

    #[test]
    fn test_ten_times_speed() {
        let mut buffer = generate_test_tone(220.0, 10.0, RATE);
        SpeedUp::new(10.0).process(&mut buffer).unwrap();
        let secs = buffer.duration_secs();
        assert!((secs - 1.0).abs() < 0.1, "got {secs}s");
        assert!(buffer.is_finite());
    }

    #[test]
    fn test_too_short_for_chunking() {
        let mut buffer = generate_test_tone(220.0, 0.1, RATE);
        let err = SpeedUp::new(10.0).process(&mut buffer).unwrap_err();
        assert!(matches!(err, SublayerError::AudioTooShort { .. }));
    }
}

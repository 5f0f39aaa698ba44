//! Mixing primitives: overlay and crossfaded append.
//!
//! Overlay adds one buffer onto another at offset zero; the base keeps its
//! length and anything of the layer past the end of the base is dropped.
//! Samples are summed in float and only clamped on export.

use crate::engine::{conform, AudioBuffer, ChannelLayout};
use crate::error::{Result, SublayerError};

/// Attenuation at the silent end of a crossfade
const FADE_FLOOR_DB: f32 = -120.0;

/// Overlay `layer` onto `base` starting at frame zero.
///
/// The layer is conformed to the base's sample rate. If either side is
/// stereo the result is stereo.
pub fn overlay(base: &mut AudioBuffer, layer: &AudioBuffer) {
    let layout = if base.channels().max(layer.channels()) > 1 {
        ChannelLayout::Stereo
    } else {
        ChannelLayout::Mono
    };

    if base.channel_layout() != Some(layout) {
        *base = conform(base, base.sample_rate, layout);
    }
    let layer = conform(layer, base.sample_rate, layout);

    for (dst, src) in base.samples.iter_mut().zip(&layer.samples) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d += s;
        }
    }
}

/// Append `next` to `head`, crossfading the last `crossfade` frames of
/// `head` with the first `crossfade` frames of `next`.
///
/// Fades move linearly in decibels between 0 dB and -120 dB.
pub fn append_with_crossfade(
    head: &mut AudioBuffer,
    next: &AudioBuffer,
    crossfade: usize,
) -> Result<()> {
    if crossfade == 0 {
        return head.extend_from(next);
    }
    if crossfade > head.len() || crossfade > next.len() {
        return Err(SublayerError::Processing {
            reason: format!(
                "crossfade of {} frames is longer than the audio ({} / {} frames)",
                crossfade,
                head.len(),
                next.len()
            ),
        });
    }
    if head.channels() != next.channels() {
        return Err(SublayerError::Processing {
            reason: "cannot crossfade buffers with different channel counts".to_string(),
        });
    }

    let start = head.len() - crossfade;
    for (dst, src) in head.samples.iter_mut().zip(&next.samples) {
        for i in 0..crossfade {
            let t = i as f32 / crossfade as f32;
            let fade_out = fade_gain(t);
            let fade_in = fade_gain(1.0 - t);
            dst[start + i] = dst[start + i] * fade_out + src[i] * fade_in;
        }
        dst.extend_from_slice(&src[crossfade..]);
    }
    Ok(())
}

#[inline]
fn fade_gain(position: f32) -> f32 {
    crate::engine::buffer::db_to_linear(FADE_FLOOR_DB * position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mono(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::from_channels(vec![samples], 1000).unwrap()
    }

    #[test]
    fn test_overlay_sums_and_keeps_base_length() {
        let mut base = mono(vec![0.1, 0.2, 0.3]);
        let layer = mono(vec![0.5, 0.5, 0.5, 0.5, 0.5]);
        overlay(&mut base, &layer);

        assert_eq!(base.len(), 3);
        assert_relative_eq!(base.channel(0)[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(base.channel(0)[2], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_overlay_shorter_layer_leaves_tail() {
        let mut base = mono(vec![0.1; 4]);
        overlay(&mut base, &mono(vec![0.2]));
        assert_relative_eq!(base.channel(0)[0], 0.3, epsilon = 1e-6);
        assert_relative_eq!(base.channel(0)[3], 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_overlay_promotes_to_stereo() {
        let mut base = mono(vec![0.1; 2]);
        let layer =
            AudioBuffer::from_channels(vec![vec![0.2; 2], vec![0.4; 2]], 1000).unwrap();
        overlay(&mut base, &layer);

        assert_eq!(base.channels(), 2);
        assert_relative_eq!(base.channel(0)[0], 0.3, epsilon = 1e-6);
        assert_relative_eq!(base.channel(1)[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_append_without_crossfade() {
        let mut head = mono(vec![1.0, 1.0]);
        append_with_crossfade(&mut head, &mono(vec![0.5]), 0).unwrap();
        assert_eq!(head.channel(0), &[1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_append_with_crossfade_overlaps() {
        let mut head = mono(vec![1.0; 10]);
        let next = mono(vec![1.0; 10]);
        append_with_crossfade(&mut head, &next, 4).unwrap();

        assert_eq!(head.len(), 16);
        // Start of the crossfade is all head
        assert_relative_eq!(head.channel(0)[6], 1.0, epsilon = 1e-5);
        // After the crossfade it is all next
        assert_relative_eq!(head.channel(0)[15], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_append_crossfade_too_long() {
        let mut head = mono(vec![1.0; 2]);
        let result = append_with_crossfade(&mut head, &mono(vec![1.0; 10]), 5);
        assert!(result.is_err());
    }
}

//! Audio file I/O for Sublayer
//!
//! Handles reading the WAV files the speech engine writes and exporting the
//! finished mix. Buffers keep their native sample rate on import; `conform`
//! brings a layer onto the mix's rate and channel layout before overlaying.
//!
//! Sample rate conversion uses linear interpolation.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{Result, SublayerError};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Target sample rate; `None` keeps the buffer's own rate
    pub sample_rate: Option<u32>,
    /// Bit depth: 16, 24, or 32 (default: 16)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat {
            sample_rate: None,
            bit_depth: 16,
        }
    }
}

impl ExportFormat {
    /// Create a new export format with the given sample rate and bit depth
    pub fn new(sample_rate: Option<u32>, bit_depth: u16) -> Self {
        ExportFormat {
            sample_rate,
            bit_depth,
        }
    }
}

/// Import a WAV file as an AudioBuffer
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the audio has more than 2 channels
/// * `EmptyAudio` - If the file holds no samples
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(SublayerError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| SublayerError::InvalidAudio {
        reason: format!("Failed to open WAV file {}: {}", path.display(), e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let layout = ChannelLayout::from_count(channels).ok_or_else(|| {
        SublayerError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        }
    })?;

    let samples_f32 = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let buffer = AudioBuffer::from_interleaved(&samples_f32, layout, spec.sample_rate)?;

    if buffer.is_empty() {
        return Err(SublayerError::EmptyAudio);
    }

    tracing::debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels,
        duration_secs = buffer.duration_secs(),
        "imported audio"
    );

    Ok(buffer)
}

/// Export an AudioBuffer to a WAV file
///
/// Samples are clamped to [-1.0, 1.0] on the way out for integer formats,
/// so an overlaid mix saturates instead of wrapping.
pub fn export_audio(buffer: &AudioBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    if !matches!(format.bit_depth, 16 | 24 | 32) {
        return Err(SublayerError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", format.bit_depth),
        });
    }

    let channels = buffer.num_channels() as u16;
    let target_rate = format.sample_rate.unwrap_or(buffer.sample_rate);

    let interleaved = if target_rate != buffer.sample_rate {
        let layout = buffer.channel_layout().unwrap_or_default();
        conform(buffer, target_rate, layout).to_interleaved()
    } else {
        buffer.to_interleaved()
    };

    let spec = WavSpec {
        channels,
        sample_rate: target_rate,
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(export_error)?;

    match format.bit_depth {
        16 => {
            for sample in interleaved {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(export_error)?;
            }
        }
        24 => {
            for sample in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(export_error)?;
            }
        }
        _ => {
            for sample in interleaved {
                writer.write_sample(sample).map_err(export_error)?;
            }
        }
    }

    writer.finalize().map_err(export_error)?;

    tracing::info!(path = %path.display(), bit_depth = format.bit_depth, "exported audio");
    Ok(())
}

/// Bring `buffer` onto the given sample rate and channel layout
///
/// Mono is duplicated into both stereo channels; stereo is averaged down to mono.
pub fn conform(buffer: &AudioBuffer, sample_rate: u32, layout: ChannelLayout) -> AudioBuffer {
    let resampled = if buffer.sample_rate != sample_rate && buffer.sample_rate != 0 {
        resample_channels(&buffer.samples, buffer.sample_rate, sample_rate)
    } else {
        buffer.samples.clone()
    };

    let samples = match (resampled.len(), layout) {
        (1, ChannelLayout::Stereo) => vec![resampled[0].clone(), resampled[0].clone()],
        (2, ChannelLayout::Mono) => vec![resampled[0]
            .iter()
            .zip(&resampled[1])
            .map(|(l, r)| (l + r) * 0.5)
            .collect()],
        _ => resampled,
    };

    AudioBuffer {
        samples,
        sample_rate,
    }
}

/// Generate a mono sine wave
///
/// Used by the tone synthesizer and in tests.
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono, sample_rate);

    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
        *sample = (angular_freq * i as f32).sin();
    }

    buffer
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn export_error(e: hound::Error) -> SublayerError {
    match e {
        hound::Error::IoError(io) => SublayerError::Io(io),
        other => SublayerError::Export {
            reason: other.to_string(),
        },
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    fn invalid(bits: &str, e: hound::Error) -> SublayerError {
        SublayerError::InvalidAudio {
            reason: format!("Failed to read {} samples: {}", bits, e),
            source: Some(Box::new(e)),
        }
    }

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("float", e)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("16-bit", e)),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("32-bit int", e)),
            _ => Err(SublayerError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

fn resample_channels(channels: &[Vec<f32>], source_rate: u32, target_rate: u32) -> Vec<Vec<f32>> {
    let ratio = target_rate as f64 / source_rate as f64;

    channels
        .iter()
        .map(|channel| resample_linear(channel, ratio))
        .collect()
}

/// Linear interpolation resampling
fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_test_tone() {
        let buffer = generate_test_tone(440.0, 1.0, 22050);
        assert_eq!(buffer.len(), 22050);
        assert_eq!(buffer.num_channels(), 1);
        assert_eq!(buffer.sample_rate, 22050);
    }

    #[test]
    fn test_export_resamples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resampled.wav");

        let buffer = generate_test_tone(440.0, 0.5, 22050);
        export_audio(&buffer, &path, ExportFormat::new(Some(44100), 16)).unwrap();

        let imported = import_audio(&path).unwrap();
        assert_eq!(imported.sample_rate, 44100);
        assert_eq!(imported.len(), 22050);
    }

    #[test]
    fn test_resample_linear_upsample() {
        let resampled = resample_linear(&[0.0, 1.0, 0.0], 2.0);
        assert_eq!(resampled.len(), 6);
        assert!((resampled[1] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        assert_eq!(resample_linear(&samples, 0.5).len(), 4);
    }

    #[test]
    fn test_conform_mono_to_stereo() {
        let mono = AudioBuffer::from_channels(vec![vec![0.1, 0.2, 0.3]], 1000).unwrap();
        let stereo = conform(&mono, 1000, ChannelLayout::Stereo);
        assert_eq!(stereo.channels(), 2);
        assert_eq!(stereo.channel(0), stereo.channel(1));
        assert_eq!(stereo.channel(0), mono.channel(0));
    }

    #[test]
    fn test_conform_stereo_to_mono_and_rate() {
        let stereo =
            AudioBuffer::from_channels(vec![vec![1.0; 100], vec![0.0; 100]], 1000).unwrap();
        let mono = conform(&stereo, 2000, ChannelLayout::Mono);
        assert_eq!(mono.channels(), 1);
        assert_eq!(mono.sample_rate, 2000);
        assert_eq!(mono.len(), 200);
        assert!((mono.channel(0)[10] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_export_import_16_bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let buffer = generate_test_tone(440.0, 0.25, 22050);
        export_audio(&buffer, &path, ExportFormat::default()).unwrap();

        let imported = import_audio(&path).unwrap();
        assert_eq!(imported.sample_rate, 22050);
        assert_eq!(imported.len(), buffer.len());
        for (a, b) in imported.channel(0).iter().zip(buffer.channel(0)) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_export_clamps_overdriven_samples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        let buffer = AudioBuffer::from_channels(vec![vec![2.0, -3.0, 0.5]], 8000).unwrap();
        export_audio(&buffer, &path, ExportFormat::default()).unwrap();

        let imported = import_audio(&path).unwrap();
        assert!(imported.channel(0)[0] > 0.99);
        assert!(imported.channel(0)[1] < -0.99);
    }

    #[test]
    fn test_export_rejects_unknown_bit_depth() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let buffer = generate_test_tone(440.0, 0.1, 8000);
        let result = export_audio(&buffer, &path, ExportFormat::new(None, 12));
        assert!(matches!(result, Err(SublayerError::UnsupportedFormat { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_import_missing_file() {
        let result = import_audio(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(SublayerError::FileNotFound { .. })));
    }

    #[test]
    fn test_import_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("text.wav");
        std::fs::write(&path, b"not a wav file").unwrap();
        assert!(matches!(
            import_audio(&path),
            Err(SublayerError::InvalidAudio { .. })
        ));
    }
}

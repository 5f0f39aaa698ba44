//! Layer value types
//!
//! `LayerDraft` is what the user typed into one row of the manual form;
//! `LayerSpec` is the validated layer the composer works with.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SublayerError};

/// Default volume field of a new manual row
pub const DEFAULT_GAIN: &str = "0";

/// Default play rate field of a new manual row
pub const DEFAULT_RATE: &str = "1.0";

/// Quietest gain in the automatic stack
pub const AUTOMATIC_GAIN_FLOOR_DB: i32 = -25;

/// Gain drop per automatic layer
pub const AUTOMATIC_GAIN_STEP_DB: i32 = -5;

/// Play rate of the first automatic layer
pub const AUTOMATIC_BASE_RATE: f64 = 10.0;

/// Play rate increase per automatic layer
pub const AUTOMATIC_RATE_STEP: f64 = 0.2;

/// One validated layer: speech text, gain in dB and playback rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub text: String,
    pub gain_db: i32,
    pub playback_rate: f64,
}

impl LayerSpec {
    pub fn new(text: impl Into<String>, gain_db: i32, playback_rate: f64) -> Self {
        Self {
            text: text.into(),
            gain_db,
            playback_rate,
        }
    }
}

/// Raw fields of one manual layer row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDraft {
    pub text: String,
    pub gain: String,
    pub rate: String,
}

impl Default for LayerDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            gain: DEFAULT_GAIN.to_string(),
            rate: DEFAULT_RATE.to_string(),
        }
    }
}

impl LayerDraft {
    pub fn new(text: impl Into<String>, gain: impl Into<String>, rate: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            gain: gain.into(),
            rate: rate.into(),
        }
    }

    /// Reset text to empty and numbers to their defaults
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate into a `LayerSpec`
    ///
    /// `number` is the 1-based row number used in error messages. Gain must
    /// be a whole number; rate must be a finite number of at least 1.0.
    pub fn parse(&self, number: usize) -> Result<LayerSpec> {
        let invalid = |reason: String| SublayerError::InvalidLayer {
            index: number,
            reason,
        };

        let gain_db: i32 = self.gain.trim().parse().map_err(|_| {
            invalid(format!("volume '{}' is not a whole number of dB", self.gain))
        })?;

        let rate: f64 = self
            .rate
            .trim()
            .parse()
            .map_err(|_| invalid(format!("play rate '{}' is not a number", self.rate)))?;
        if !rate.is_finite() || rate < 1.0 {
            return Err(invalid(format!(
                "play rate {} must be at least 1.0 (layers can only be sped up)",
                self.rate.trim()
            )));
        }

        if self.text.trim().is_empty() {
            return Err(invalid("affirmation text is empty".to_string()));
        }

        Ok(LayerSpec::new(self.text.trim(), gain_db, rate))
    }
}

impl From<&LayerSpec> for LayerDraft {
    fn from(spec: &LayerSpec) -> Self {
        Self::new(
            spec.text.clone(),
            spec.gain_db.to_string(),
            spec.playback_rate.to_string(),
        )
    }
}

/// Gain of automatic layer `index`: max(-25, -5 * index)
pub fn automatic_gain_db(index: usize) -> i32 {
    let index = i32::try_from(index).unwrap_or(i32::MAX);
    index
        .saturating_mul(AUTOMATIC_GAIN_STEP_DB)
        .max(AUTOMATIC_GAIN_FLOOR_DB)
}

/// Rate of automatic layer `index`: 10 + 0.2 * index
pub fn automatic_rate(index: usize) -> f64 {
    AUTOMATIC_BASE_RATE + AUTOMATIC_RATE_STEP * index as f64
}

/// The full automatic stack for `text`
pub fn automatic_layer_specs(text: &str, num_layers: usize) -> Vec<LayerSpec> {
    (0..num_layers)
        .map(|i| LayerSpec::new(text, automatic_gain_db(i), automatic_rate(i)))
        .collect()
}

/// Parse the "Number of Layers" field
pub fn parse_layer_count(input: &str) -> Result<usize> {
    let count: i64 = input.trim().parse().map_err(|_| SublayerError::InvalidLayerCount {
        reason: format!("'{}' is not a whole number", input),
    })?;
    if count < 1 {
        return Err(SublayerError::InvalidLayerCount {
            reason: "number of layers must be at least 1".to_string(),
        });
    }
    usize::try_from(count).map_err(|_| SublayerError::InvalidLayerCount {
        reason: format!("{} layers is too many", count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_automatic_gains_for_six_layers() {
        let gains: Vec<i32> = (0..6).map(automatic_gain_db).collect();
        assert_eq!(gains, vec![0, -5, -10, -15, -20, -25]);
    }

    #[test]
    fn test_automatic_gain_floor() {
        assert_eq!(automatic_gain_db(6), -25);
        assert_eq!(automatic_gain_db(100), -25);
        assert_eq!(automatic_gain_db(usize::MAX), -25);
    }

    #[test]
    fn test_automatic_rates() {
        assert_relative_eq!(automatic_rate(0), 10.0);
        assert_relative_eq!(automatic_rate(1), 10.2);
        assert_relative_eq!(automatic_rate(5), 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_automatic_layer_specs() {
        let specs = automatic_layer_specs("I am calm", 3);
        assert_eq!(specs.len(), 3);
        assert!(specs.iter().all(|s| s.text == "I am calm"));
        assert_eq!(specs[2].gain_db, -10);
        assert_relative_eq!(specs[2].playback_rate, 10.4, epsilon = 1e-12);
    }

    #[test]
    fn test_draft_defaults() {
        let draft = LayerDraft::default();
        assert_eq!(draft.gain, "0");
        assert_eq!(draft.rate, "1.0");
        assert!(draft.text.is_empty());
    }

    #[test]
    fn test_draft_parse_ok() {
        let spec = LayerDraft::new(" I am strong ", "-10", " 1.5").parse(1).unwrap();
        assert_eq!(spec, LayerSpec::new("I am strong", -10, 1.5));
    }

    #[test]
    fn test_draft_parse_rejects_non_numeric() {
        let err = LayerDraft::new("x", "loud", "1.0").parse(3).unwrap_err();
        assert!(matches!(err, SublayerError::InvalidLayer { index: 3, .. }));

        assert!(LayerDraft::new("x", "0", "fast").parse(1).is_err());
        assert!(LayerDraft::new("x", "1.5", "1.0").parse(1).is_err());
    }

    #[test]
    fn test_draft_parse_rejects_slowdown_and_empty_text() {
        assert!(LayerDraft::new("x", "0", "0.5").parse(1).is_err());
        assert!(LayerDraft::new("x", "0", "inf").parse(1).is_err());
        assert!(LayerDraft::new("  ", "0", "1.0").parse(1).is_err());
    }

    #[test]
    fn test_draft_clear() {
        let mut draft = LayerDraft::new("text", "-3", "2.0");
        draft.clear();
        assert_eq!(draft, LayerDraft::default());
    }

    #[test]
    fn test_parse_layer_count() {
        assert_eq!(parse_layer_count(" 4 ").unwrap(), 4);
        assert!(matches!(
            parse_layer_count("0"),
            Err(SublayerError::InvalidLayerCount { .. })
        ));
        assert!(parse_layer_count("-2").is_err());
        assert!(parse_layer_count("three").is_err());
    }
}

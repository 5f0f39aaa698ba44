//! Per-layer effect chain
//!
//! Effects are processed in chain order (index 0 first). Gain always runs
//! before speed-up so the crossfades work on the already-scaled signal.

use super::{Effect, Gain, SpeedUp};
use crate::engine::AudioBuffer;
use crate::error::{Result, SublayerError};

/// Order priority for effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectPosition {
    Gain = 0,
    SpeedUp = 1,
    Other = 2,
}

impl EffectPosition {
    /// Get recommended position for an effect type
    pub fn for_effect_type(effect_type: &str) -> Self {
        match effect_type {
            "gain" => EffectPosition::Gain,
            "speedup" => EffectPosition::SpeedUp,
            _ => EffectPosition::Other,
        }
    }
}

/// Chain of effects applied to one layer
#[derive(Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn Effect>>,
}

impl EffectChain {
    /// Create a new empty effect chain
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Chain for a layer: gain in dB, then speed-up unless the rate is 1.0
    pub fn for_layer(gain_db: i32, rate: f64) -> Self {
        let mut chain = Self::new();
        chain.add(Box::new(Gain::new(gain_db as f32)));
        if rate != 1.0 {
            chain.add(Box::new(SpeedUp::new(rate)));
        }
        chain
    }

    /// Add an effect at its recommended position
    pub fn add(&mut self, effect: Box<dyn Effect>) {
        let position = self.get_recommended_position(effect.effect_type());
        self.effects.insert(position, effect);
    }

    /// Process the entire chain, stopping at the first failing effect
    pub fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        for effect in &mut self.effects {
            if effect.is_identity() {
                continue;
            }
            effect.process(buffer)?;
            if !buffer.is_finite() {
                return Err(SublayerError::Processing {
                    reason: format!("{} produced invalid audio (NaN/Inf)", effect.display_name()),
                });
            }
        }
        Ok(())
    }

    fn get_recommended_position(&self, effect_type: &str) -> usize {
        let priority = EffectPosition::for_effect_type(effect_type);

        self.effects
            .iter()
            .position(|e| EffectPosition::for_effect_type(e.effect_type()) > priority)
            .unwrap_or(self.effects.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_test_tone;

    #[test]
    fn test_effect_position_ordering() {
        assert!(EffectPosition::Gain < EffectPosition::SpeedUp);
        assert!(EffectPosition::SpeedUp < EffectPosition::Other);
    }

    #[test]
    fn test_gain_inserted_before_speedup() {
        let mut chain = EffectChain::new();
        chain.add(Box::new(SpeedUp::new(2.0)));
        chain.add(Box::new(Gain::new(-3.0)));

        let types: Vec<_> = chain.effects.iter().map(|e| e.effect_type()).collect();
        assert_eq!(types, vec!["gain", "speedup"]);
    }

    #[test]
    fn test_for_layer_skips_unity_rate() {
        assert_eq!(EffectChain::for_layer(0, 1.0).effects.len(), 1);
        assert_eq!(EffectChain::for_layer(-5, 10.0).effects.len(), 2);
    }

    #[test]
    fn test_chain_processes_in_order() {
        let mut buffer = generate_test_tone(220.0, 4.0, 8000);
        let mut chain = EffectChain::for_layer(-6, 2.0);
        chain.process(&mut buffer).unwrap();
        assert!(buffer.duration_secs() < 2.5);
        assert!(crate::engine::buffer::calculate_peak(&buffer) < 0.6);
    }
}

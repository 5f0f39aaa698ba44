//! DSP transforms applied to speech layers.
//!
//! Gain and speed-up implement the `Effect` trait and are combined per
//! layer in an `EffectChain`; `mix` holds overlay and crossfaded append.

mod chain;
mod effect;
mod gain;
pub mod mix;
mod speedup;

pub use chain::{EffectChain, EffectPosition};
pub use effect::Effect;
pub use gain::Gain;
pub use mix::{append_with_crossfade, overlay};
pub use speedup::{SpeedUp, SpeedUpPlan, DEFAULT_CHUNK_MS, DEFAULT_CROSSFADE_MS};

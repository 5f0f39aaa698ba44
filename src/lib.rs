//! Sublayer - Layered Affirmation Audio Generator
//!
//! Sublayer turns affirmation text into a single audio track made of many
//! overlaid speech layers, each with its own volume and playback speed.
//!
//! # Architecture
//!
//! - `speech`: text to speech through an external engine
//! - `dsp`: per-layer effects (gain, speed-up) and mixing
//! - `compose`: manual and automatic layer stacks
//! - `playback`: one background playback thread with stop and loop
//! - `app` / `gui`: window state and the egui front end
//! - `cli`: headless rendering and playback

pub mod app;
pub mod cli;
pub mod compose;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod gui;
pub mod playback;
pub mod speech;

pub use error::{Result, SublayerError};

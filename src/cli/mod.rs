//! CLI Module
//!
//! Command-line interface for the Sublayer affirmation generator.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::compose::{LayerDraft, LayerSpec, DEFAULT_GAIN, DEFAULT_RATE};
use crate::config::SynthEngine;
use crate::error::{Result, SublayerError};

/// Sublayer - layered subliminal affirmation audio generator
#[derive(Parser, Debug)]
#[command(name = "sublayer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Speech engine, overriding the config file
    #[arg(long, global = true)]
    pub engine: Option<SynthEngine>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the generator window (default)
    #[command(name = "gui")]
    Gui,

    /// Render manually specified layers to a WAV file
    #[command(name = "manual")]
    Manual {
        /// Layer as TEXT or TEXT:GAIN:RATE, repeat for more layers
        #[arg(short, long = "layer", required = true, value_parser = parse_layer_arg)]
        layers: Vec<LayerSpec>,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render the automatic layer stack for one affirmation
    #[command(name = "auto")]
    Auto {
        /// Affirmation text
        #[arg(short, long)]
        text: String,

        /// Number of layers
        #[arg(short = 'n', long, default_value_t = 1)]
        layers: usize,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Play a WAV file until it ends or the process is interrupted
    #[command(name = "play")]
    Play {
        /// WAV file to play
        file: PathBuf,

        /// Repeat until interrupted
        #[arg(short, long = "loop")]
        looping: bool,
    },
}

/// Parse `TEXT` or `TEXT:GAIN:RATE`.
///
/// Gain and rate are only taken from the last two colon fields when both
/// are numbers, so text such as "Meet at 10:30" stays whole. Text that
/// itself ends in two numeric fields needs an explicit `:GAIN:RATE` suffix.
pub fn parse_layer_arg(arg: &str) -> Result<LayerSpec> {
    let parts: Vec<&str> = arg.rsplitn(3, ':').collect();
    let draft = match parts.as_slice() {
        [rate, gain, text] if is_number(gain) && is_number(rate) => {
            LayerDraft::new(*text, *gain, *rate)
        }
        _ => LayerDraft::new(arg, DEFAULT_GAIN, DEFAULT_RATE),
    };

    draft.parse(1).map_err(|e| match e {
        SublayerError::InvalidLayer { reason, .. } => SublayerError::Config {
            reason: format!("--layer '{}': {}", arg, reason),
        },
        other => other,
    })
}

fn is_number(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use test_case::test_case;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test_case("I am calm", "I am calm", 0, 1.0 ; "text only")]
    #[test_case("Meet at 10:30", "Meet at 10:30", 0, 1.0 ; "time in text")]
    #[test_case("Ratio 3:2", "Ratio 3:2", 0, 1.0 ; "single numeric field stays text")]
    #[test_case("Meet at 10:30:0:1.0", "Meet at 10:30", 0, 1.0 ; "time in text with values")]
    #[test_case("I am calm:-6:1.5", "I am calm", -6, 1.5 ; "text gain and rate")]
    #[test_case("Note: I am calm", "Note: I am calm", 0, 1.0 ; "colon in text")]
    #[test_case("Note: I am calm:-3:2", "Note: I am calm", -3, 2.0 ; "colon in text with values")]
    fn test_parse_layer_arg(arg: &str, text: &str, gain_db: i32, rate: f64) {
        assert_eq!(
            parse_layer_arg(arg).unwrap(),
            LayerSpec::new(text, gain_db, rate)
        );
    }

    #[test_case("I am calm:1.5:1.0" ; "fractional gain")]
    #[test_case("I am calm:0:0.5" ; "slowdown")]
    #[test_case(":0:1.0" ; "empty text")]
    fn test_parse_layer_arg_rejects(arg: &str) {
        assert!(matches!(
            parse_layer_arg(arg),
            Err(SublayerError::Config { .. })
        ));
    }

    #[test]
    fn test_manual_command_parses() {
        let cli = Cli::try_parse_from([
            "sublayer",
            "--engine",
            "tone",
            "manual",
            "--layer",
            "I am calm",
            "--layer",
            "I am strong:-10:2.0",
            "-o",
            "out.wav",
        ])
        .unwrap();

        assert_eq!(cli.engine, Some(SynthEngine::Tone));
        match cli.command {
            Some(Commands::Manual { layers, output }) => {
                assert_eq!(layers.len(), 2);
                assert_eq!(layers[1].gain_db, -10);
                assert_eq!(output, PathBuf::from("out.wav"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_command_means_gui() {
        let cli = Cli::try_parse_from(["sublayer"]).unwrap();
        assert!(cli.command.is_none());
    }
}

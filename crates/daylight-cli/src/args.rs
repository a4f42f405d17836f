//! Command-line argument definitions.
//!
//! ```text
//! daylight get                 # effective theme
//! daylight set dark            # store a preference
//! daylight toggle              # flip light/dark
//! daylight status              # preference, theme, system mode, controls
//! daylight watch               # follow system changes until interrupted
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use daylight::Preference;

/// Environment variable overriding the default store location.
pub const STORE_ENV: &str = "DAYLIGHT_STORE";

#[derive(Debug, Parser)]
#[command(name = "daylight")]
#[command(about = "Light/dark theme preference with system color mode tracking")]
#[command(version)]
pub struct Cli {
    /// Preference store file (JSON). Defaults to $DAYLIGHT_STORE, then
    /// $XDG_CONFIG_HOME/daylight/state.json or ~/.config/daylight/state.json
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Controller configuration file (YAML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the effective theme
    Get,
    /// Store a preference and print the resulting theme
    Set {
        /// light, dark or auto
        mode: Preference,
    },
    /// Switch to the opposite of the current theme
    Toggle,
    /// Show preference, effective theme, system mode and toggle controls
    Status,
    /// Follow system color mode changes
    Watch {
        /// Milliseconds between system checks
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(10..))]
        interval_ms: u64,

        /// Stop after this many checks instead of running until interrupted
        #[arg(long, value_name = "N")]
        count: Option<u64>,
    },
}

//! CLI argument definitions for AquaQuery.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// AquaQuery -- ask questions about groundwater resources.
#[derive(Debug, Parser)]
#[command(
    name = "aquaquery",
    version,
    about = "AquaQuery -- groundwater question answering",
    long_about = "Classifies natural-language questions about regional groundwater \
                  status and answers them from CGWB-style assessment data."
)]
pub struct Cli {
    /// Configuration file.  Missing files fall back to built-in defaults.
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive question loop.
    Repl {
        /// Session to continue across questions.
        #[arg(long, short, default_value = "repl")]
        session: String,
    },

    /// Answer a single question and exit.
    Ask {
        /// The question.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Session id.  Without one the question is anonymous.
        #[arg(long, short)]
        session: Option<String>,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server.
    Serve {
        /// Address to bind to; overrides the configuration file.
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on; overrides the configuration file.
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Show dataset and configuration summary.
    Status,
}

//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::models::Personality;

/// Companion - a scripted chat companion in your terminal
#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Starting personality preset (sweet, playful, supportive, romantic)
    #[arg(short, long, default_value = "sweet")]
    pub personality: Personality,

    /// Seed the random source for reproducible replies and delays
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the simulated typing delay
    #[arg(long)]
    pub instant: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat interactively in the terminal (default)
    Chat,

    /// Run the local web chat server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 58262)]
        port: u16,
    },

    /// List personality presets and their canned replies
    Personalities,
}

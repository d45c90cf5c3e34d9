//! Companion - a scripted chat companion with four personality presets.
//!
//! The conversation engine keeps the message history, the active
//! personality, and a pending-reply flag; replies come from six ordered
//! keyword rules with a per-personality random fallback, produced after a
//! simulated typing delay.
//!
//! Front ends:
//! - Interactive terminal chat (default command)
//! - Local web chat server with a WebSocket event stream (`serve`)

mod cli;
mod engine;
mod models;
mod server;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}

//! CLI command execution.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::engine::{ConversationEngine, EngineOptions, SubmitOutcome};
use crate::models::{Personality, Sender};
use crate::server;

use super::args::{Cli, Commands};

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let mut options = EngineOptions::new().personality(cli.personality);
    if let Some(seed) = cli.seed {
        options = options.seed(seed);
    }
    if cli.instant {
        options = options.instant();
    }

    match cli.command {
        None | Some(Commands::Chat) => run_chat(options).await,
        Some(Commands::Serve { port }) => server::start_server(options, port).await,
        Some(Commands::Personalities) => {
            list_personalities();
            Ok(())
        }
    }
}

/// Print every preset with its canned replies.
fn list_personalities() {
    for personality in Personality::ALL {
        println!("{} ({})", personality.label(), personality);
        for reply in personality.fallback_replies() {
            println!("  - {reply}");
        }
        println!();
    }
}

/// Interactive terminal chat over stdin.
async fn run_chat(options: EngineOptions) -> Result<()> {
    let engine = ConversationEngine::new(options);

    println!("Companion chat - /help for commands, /quit to leave");
    println!("Personality: {}", engine.personality().await.label());
    println!();
    for message in engine.messages().await {
        print_message(&message.sender.to_string(), &message.text);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        if let Some(command) = line.trim().strip_prefix('/') {
            if !handle_slash_command(&engine, command).await {
                break;
            }
            prompt()?;
            continue;
        }

        match engine.submit(&line).await {
            SubmitOutcome::Accepted { reply, .. } => {
                println!("(companion is typing...)");
                let message = reply.wait().await?;
                print_message(&message.sender.to_string(), &message.text);
            }
            // The REPL waits out every reply, so "busy" never happens here;
            // empty input just falls through to a fresh prompt.
            SubmitOutcome::RejectedEmpty | SubmitOutcome::RejectedBusy => {}
        }

        prompt()?;
    }

    Ok(())
}

/// Handle a `/command` line. Returns false when the REPL should exit.
async fn handle_slash_command(engine: &ConversationEngine, command: &str) -> bool {
    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();

    match name {
        "quit" | "q" | "exit" => return false,
        "help" => {
            println!("Commands:");
            println!("  /personality <name>  Switch preset (sweet, playful, supportive, romantic)");
            println!("  /personalities       List presets and their canned replies");
            println!("  /quit                Leave the chat");
        }
        "personalities" => list_personalities(),
        "personality" => match rest.parse::<Personality>() {
            Ok(personality) => {
                engine.set_personality(personality).await;
                println!("Switched to {}", personality.label());
            }
            Err(e) => eprintln!("{e}"),
        },
        other => eprintln!("Unknown command: /{other} (try /help)"),
    }

    true
}

fn print_message(sender: &str, text: &str) {
    println!("{sender}> {text}");
}

fn prompt() -> Result<()> {
    print!("{}> ", Sender::User);
    std::io::stdout().flush().context("Failed to flush stdout")
}

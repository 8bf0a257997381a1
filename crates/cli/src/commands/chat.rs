//! `streamcall chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use streamcall_agent::{Agent, AgentStreamEvent};
use streamcall_config::AppConfig;
use streamcall_core::error::ProviderError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Lines that end an interactive session.
const EXIT_WORDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider = match streamcall_providers::build_from_config(&config) {
        Ok(provider) => provider,
        Err(ProviderError::NotConfigured(reason)) => {
            eprintln!();
            eprintln!("  ERROR: No API key configured!");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    STREAMCALL_API_KEY = 'sk-...'");
            eprintln!("    OPENAI_API_KEY     = 'sk-...'");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_path().display());
            eprintln!();
            return Err(reason.into());
        }
        Err(e) => return Err(e.into()),
    };

    let services = Arc::new(streamcall_services::default_registry());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let agent = Agent::new(provider, &config.model, config.temperature, services)
        .with_max_tokens(config.max_tokens)
        .with_max_depth(config.max_depth)
        .with_system_message(&config.system_message)
        .with_output(tx);

    if let Some(msg) = message {
        // Single message mode
        let reply = turn(&agent, &mut rx, msg).await?;
        if is_error(&reply) {
            return Err(reply.into());
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  streamcall — Interactive Mode");
    println!();
    println!("  Endpoint:  {}", config.api_url);
    println!("  Model:     {}", config.model);
    println!(
        "  Commands:  {}",
        streamcall_services::command_descriptors()
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if EXIT_WORDS.contains(&text) {
            break;
        }
        if !text.is_empty() {
            print!("  Assistant > ");
            turn(&agent, &mut rx, text.to_string()).await?;
            println!();
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn is_error(reply: &str) -> bool {
    reply.starts_with("error: ")
}

/// Submit one message, rendering events while the agent works.
async fn turn(
    agent: &Agent,
    rx: &mut mpsc::UnboundedReceiver<AgentStreamEvent>,
    text: String,
) -> std::io::Result<String> {
    let submit = agent.submit(text);
    tokio::pin!(submit);

    let reply = loop {
        tokio::select! {
            reply = &mut submit => break reply,
            Some(event) = rx.recv() => render(&event)?,
        }
    };

    // Events sent just before the reply resolved
    while let Ok(event) = rx.try_recv() {
        render(&event)?;
    }

    if is_error(&reply) {
        eprintln!("\n  [Error] {reply}");
    } else {
        println!();
    }
    Ok(reply)
}

fn render(event: &AgentStreamEvent) -> std::io::Result<()> {
    match event {
        AgentStreamEvent::Chunk { content } => {
            let mut stdout = std::io::stdout();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
        AgentStreamEvent::FunctionCall { name, .. } => eprintln!("\n  [calling {name}]"),
        AgentStreamEvent::FunctionResult {
            name,
            success: false,
            ..
        } => eprintln!("  [{name} failed]"),
        AgentStreamEvent::FunctionResult { .. }
        | AgentStreamEvent::Done { .. }
        | AgentStreamEvent::Error { .. } => {}
    }
    Ok(())
}

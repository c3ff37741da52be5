//! Utility binary for checking whether an agent session is running
//! This is a diagnostic tool, not part of the main application
//!
//! Usage: check_session [channel]   (falls back to AGENT_CHANNEL)

use companion_core::session::{HttpSessionApi, SessionApi};
use companion_core::Config;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    config.validate()?;

    let channel = match env::args().nth(1).or_else(|| env::var("AGENT_CHANNEL").ok()) {
        Some(channel) if !channel.trim().is_empty() => channel,
        _ => anyhow::bail!("No channel given: pass one as an argument or set AGENT_CHANNEL"),
    };

    println!("Checking agent session...\n");
    println!("   Server:  {}", config.server.base_url);
    println!("   Channel: {}", channel);

    let api = HttpSessionApi::from_config(&config.server)?;
    match api.ping(&channel).await {
        Ok(response) if response.code.is_success() => {
            println!("\n   ✓ Session is running");
        }
        Ok(response) => {
            println!(
                "\n   ✗ No running session (code {}, {})",
                response.code,
                response.message()
            );
        }
        Err(e) => {
            eprintln!("\n   ✗ Ping failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

//! Aggregate one show and print it together with one window of episodes.
//! Usage:
//!   cargo run --bin au_props -- <show_id> [season]
//! Requires AU_API_URL in the environment (.env supported).

use animelink::app::AppState;
use animelink::config::Config;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let mut args = env::args().skip(1);
    let Some(show_id) = args.next() else {
        eprintln!("Usage: cargo run --bin au_props -- <show_id> [season]");
        std::process::exit(2);
    };
    let season: u32 = match args.next() {
        Some(raw) => raw.parse().context("season must be a non-negative integer")?,
        None => 0,
    };

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    let report = state
        .shows
        .fetch_show_report(&show_id)
        .await
        .with_context(|| format!("Failed to aggregate show '{}'", show_id))?;
    println!("{}", serde_json::to_string_pretty(&report.show)?);
    for failure in &report.failures {
        println!("degraded: {} -> {}", failure.source, failure.error);
    }

    let episodes = state
        .episodes
        .fetch_episodes(&show_id, season)
        .await
        .with_context(|| format!("Failed to list season {} of '{}'", season, show_id))?;
    println!("--- season {} ({} episodes) ---", season, episodes.len());
    for ep in episodes {
        println!(
            "{:>6} {:<40} {}",
            ep.number,
            ep.title.as_deref().unwrap_or("-"),
            ep.id
        );
    }
    Ok(())
}

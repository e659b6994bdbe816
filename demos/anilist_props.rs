use animelink::anilist::{AniListApi, AniListClient};
use animelink::config::SourceConfig;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ANILIST_URL: &str = "https://graphql.anilist.co";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --example anilist_props -- <anilist_id>");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    let id: u64 = env::args()
        .nth(1)
        .unwrap_or_else(|| usage())
        .parse()
        .unwrap_or_else(|_| usage());
    let base = env::var("ANILIST_API_URL").unwrap_or_else(|_| DEFAULT_ANILIST_URL.to_string());
    let client = AniListClient::new(&SourceConfig::parse(&base)?)?;
    info!("AniList fetch: id={}", id);

    let show = client
        .fetch_show(id)
        .await
        .with_context(|| format!("AniList show {}", id))?;
    info!("--- AniList show ---");
    if let Some(title) = &show.title {
        info!("romaji: {}", title.romaji.as_deref().unwrap_or("<none>"));
        info!("english: {}", title.english.as_deref().unwrap_or("<none>"));
        info!("native: {}", title.native.as_deref().unwrap_or("<none>"));
    }
    info!(
        "cover: {}",
        show.cover_image
            .as_ref()
            .and_then(|c| c.extra_large.as_deref().or(c.large.as_deref()))
            .unwrap_or("<none>")
    );
    info!("banner: {}", show.banner_image.as_deref().unwrap_or("<none>"));

    match client.fetch_episodes(id).await {
        Ok(episodes) => {
            info!("--- Streaming episodes ({}) ---", episodes.len());
            for ep in episodes {
                info!(
                    "#{} {} [{}]",
                    ep.number,
                    ep.title,
                    ep.thumbnail.as_deref().unwrap_or("no thumbnail")
                );
            }
        }
        Err(e) => warn!("Streaming episodes unavailable: {}", e),
    }
    Ok(())
}

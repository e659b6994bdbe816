//! Regenerates the static feed files served under /feed.
//! Usage:
//!   cargo run --example generate_feed -- collections
//!   cargo run --example generate_feed -- trending
//! `collections` needs AU_API_URL; output paths follow FEED_*_PATH.

use animelink::animeunity::AnimeUnityClient;
use animelink::config::{FeedConfig, SourceConfig};
use animelink::feed::{default_collections, generate_collections, resize_trending};
use animelink::models::{ShowKind, TrendingShow};
use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DELAY_BETWEEN_COLLECTIONS: Duration = Duration::from_millis(2500);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn feed_config() -> FeedConfig {
    let path = |key: &str, default: &str| -> PathBuf {
        env::var(key)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
            .into()
    };
    FeedConfig {
        collections_path: path("FEED_COLLECTIONS_PATH", "assets/au_feed_collections.json"),
        trending_path: path("FEED_TRENDING_PATH", "assets/au_feed_trending_shows.json"),
    }
}

async fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn trending_seed() -> Vec<TrendingShow> {
    let show = |id: &str, kind, title: &str, overview: &str, date: &str, genre: &str, images: [&str; 3]| {
        let tmdb = |file: &str| Some(format!("https://image.tmdb.org/t/p/original/{}", file));
        TrendingShow {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            overview: overview.to_string(),
            genres: vec![genre.to_string()],
            duration: 0,
            release_date: Some(date.to_string()),
            poster_url: tmdb(images[0]),
            backdrop_url: tmdb(images[1]),
            logo_url: tmdb(images[2]),
        }
    };
    vec![
        show(
            "336-il-castello-errante-di-howl-ita",
            ShowKind::Movie,
            "Il castello errante di Howl",
            "Cosa farà Sophie e cosa capiterà tra lei e Howl?",
            "2005-06-10",
            "Fantasy",
            [
                "fXKg3wkHfWoZEiJUZYxcrdPNWKi.jpg",
                "tjMiLkVfOmbx3kUtKSmkLimiw8x.jpg",
                "cOcqGC1mgPoRYvaUxPMACEKOKjz.png",
            ],
        ),
        show(
            "4821-nana",
            ShowKind::Series,
            "Nana",
            "Due ventenni accomunate dal nome e dalla decisione di trasferirsi a Tokyo",
            "2006-04-05",
            "Drama",
            [
                "eWqk7Hih3t2t1ZhiDbHFMZVJCrF.jpg",
                "q3EV3IdRCdREZXIKLHAhoZufteg.jpg",
                "u7OPSU24Ib5G8iYCswMYPrMUwp2.png",
            ],
        ),
        show(
            "2791-jujutsu-kaisen",
            ShowKind::Series,
            "Jujutsu Kaisen",
            "A boy fights... for 'the right death'",
            "2020-10-03",
            "Shounen",
            [
                "g1p1Vx6FgUEY6fDRnOCncQ9V21o.jpg",
                "prJcvQ5uRuqo2Um1loBbqoKoyBS.jpg",
                "n0xjdQWNVVUCXyIEJjpUDqWDcw.png",
            ],
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();
    let feed = feed_config();

    match env::args().nth(1).as_deref() {
        Some("collections") => {
            let base = env::var("AU_API_URL").map_err(|_| anyhow!("AU_API_URL must be set"))?;
            let client = AnimeUnityClient::new(&SourceConfig::parse(&base)?)?;
            let collections =
                generate_collections(&client, &default_collections(), DELAY_BETWEEN_COLLECTIONS)
                    .await?;
            write_json(&feed.collections_path, &collections).await
        }
        Some("trending") => write_json(&feed.trending_path, &resize_trending(trending_seed())).await,
        _ => {
            eprintln!("Usage: cargo run --example generate_feed -- <collections|trending>");
            std::process::exit(2);
        }
    }
}

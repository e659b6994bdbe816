use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

const DEFAULT_JIKAN_URL: &str = "https://api.jikan.moe/v4/";
const DEFAULT_ANILIST_URL: &str = "https://graphql.anilist.co";
const DEFAULT_COLLECTIONS_PATH: &str = "assets/au_feed_collections.json";
const DEFAULT_TRENDING_PATH: &str = "assets/au_feed_trending_shows.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3146";

/// Where one upstream catalog lives.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub base_url: Url,
}

impl SourceConfig {
    /// Parses a base URL, making sure relative joins stay under its path.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(raw.trim()).with_context(|| format!("Invalid base URL '{}'", raw))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub collections_path: PathBuf,
    pub trending_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub animeunity: SourceConfig,
    pub jikan: SourceConfig,
    pub anilist: SourceConfig,
    /// Kitsu is only consulted when configured.
    pub kitsu: Option<SourceConfig>,
    pub feed: FeedConfig,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let animeunity = env::var("AU_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("AU_API_URL must be set"))?;

        let kitsu = match optional_var("KITSU_API_URL") {
            Some(raw) => Some(SourceConfig::parse(&raw)?),
            None => None,
        };

        let bind_addr = optional_var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        Ok(Self {
            animeunity: SourceConfig::parse(&animeunity)?,
            jikan: SourceConfig::parse(
                &optional_var("JIKAN_API_URL").unwrap_or_else(|| DEFAULT_JIKAN_URL.to_string()),
            )?,
            anilist: SourceConfig::parse(
                &optional_var("ANILIST_API_URL")
                    .unwrap_or_else(|| DEFAULT_ANILIST_URL.to_string()),
            )?,
            kitsu,
            feed: FeedConfig {
                collections_path: optional_var("FEED_COLLECTIONS_PATH")
                    .unwrap_or_else(|| DEFAULT_COLLECTIONS_PATH.to_string())
                    .into(),
                trending_path: optional_var("FEED_TRENDING_PATH")
                    .unwrap_or_else(|| DEFAULT_TRENDING_PATH.to_string())
                    .into(),
            },
            bind_addr,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

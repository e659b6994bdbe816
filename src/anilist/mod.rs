use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

mod client;

pub use client::AniListClient;

static EPISODE_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Episode\s+(\d+)\s*-\s*(.+)").expect("episode title pattern is valid")
});

/// AniList GraphQL. Supplies banners and episode thumbnails.
#[async_trait]
pub trait AniListApi: Send + Sync {
    async fn fetch_show(&self, id: u64) -> Result<AniListShow>;
    /// Streaming episodes with numbers parsed from their titles.
    async fn fetch_episodes(&self, id: u64) -> Result<Vec<AniListEpisode>>;
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AniListShow {
    #[serde(default)]
    pub title: Option<AniListTitle>,
    #[serde(rename = "coverImage", default)]
    pub cover_image: Option<AniListCover>,
    #[serde(rename = "bannerImage", default)]
    pub banner_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AniListCover {
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AniListEpisode {
    pub number: u64,
    pub title: String,
    pub thumbnail: Option<String>,
}

/// Splits `"Episode 5 - The Arrival"` into `(5, "The Arrival")`.
pub fn parse_episode_title(raw: &str) -> Result<(u64, String)> {
    let invalid = || Error::MalformedResponse(format!("invalid episode title format: {}", raw));
    let caps = EPISODE_TITLE.captures(raw).ok_or_else(invalid)?;
    let number = caps[1].parse().map_err(|_| invalid())?;
    Ok((number, caps[2].trim().to_string()))
}

#[async_trait]
impl AniListApi for AniListClient {
    async fn fetch_show(&self, id: u64) -> Result<AniListShow> {
        self.fetch_media_show(id).await
    }

    async fn fetch_episodes(&self, id: u64) -> Result<Vec<AniListEpisode>> {
        self.fetch_streaming_episodes(id).await
    }
}

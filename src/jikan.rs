use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::http;

/// MyAnimeList mirror. Supplies posters, scores and episode titles.
#[async_trait]
pub trait JikanApi: Send + Sync {
    async fn fetch_show(&self, mal_id: u64) -> Result<JikanShow>;
    /// One page (100 entries) of the episode list; `page` is 1-based.
    async fn fetch_episodes(&self, mal_id: u64, page: u32) -> Result<Vec<JikanEpisode>>;
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JikanShow {
    pub mal_id: u64,
    #[serde(default)]
    pub images: Option<JikanImages>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub synopsis: Option<String>,
}

impl JikanShow {
    pub fn large_poster(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|i| i.jpg.as_ref())
            .and_then(|j| j.large_image_url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JikanImages {
    #[serde(default)]
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JikanImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JikanEpisode {
    /// Absolute episode number.
    pub mal_id: u64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Clone)]
pub struct JikanClient {
    client: Client,
    base_url: Url,
}

impl JikanClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client("Jikan")?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl JikanApi for JikanClient {
    async fn fetch_show(&self, mal_id: u64) -> Result<JikanShow> {
        let url = http::endpoint(&self.base_url, &format!("anime/{}", mal_id))?;
        let envelope: Envelope<JikanShow> = http::get_json(&self.client, url).await?;
        Ok(envelope.data)
    }

    async fn fetch_episodes(&self, mal_id: u64, page: u32) -> Result<Vec<JikanEpisode>> {
        let mut url = http::endpoint(&self.base_url, &format!("anime/{}/episodes", mal_id))?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        let envelope: Envelope<Vec<JikanEpisode>> = http::get_json(&self.client, url).await?;
        Ok(envelope.data)
    }
}

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{parse_episode_title, AniListEpisode, AniListShow};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::http;

const SHOW_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    title { romaji english native }
    coverImage { extraLarge large medium }
    bannerImage
  }
}
"#;

const EPISODES_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    streamingEpisodes { title thumbnail }
  }
}
"#;

#[derive(Debug, Clone)]
pub struct AniListClient {
    client: Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
    status: Option<i32>,
}

#[derive(Deserialize)]
struct MediaData<T> {
    #[serde(rename = "Media")]
    media: Option<T>,
}

#[derive(Deserialize)]
struct StreamingMedia {
    #[serde(rename = "streamingEpisodes", default)]
    streaming_episodes: Option<Vec<StreamingEpisode>>,
}

#[derive(Deserialize)]
struct StreamingEpisode {
    title: Option<String>,
    thumbnail: Option<String>,
}

impl AniListClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client("AniList")?,
            endpoint: config.base_url.clone(),
        })
    }

    pub(crate) async fn fetch_media_show(&self, id: u64) -> Result<AniListShow> {
        self.query_media(SHOW_QUERY, id).await
    }

    pub(crate) async fn fetch_streaming_episodes(&self, id: u64) -> Result<Vec<AniListEpisode>> {
        let media: StreamingMedia = self.query_media(EPISODES_QUERY, id).await?;
        media
            .streaming_episodes
            .unwrap_or_default()
            .into_iter()
            .map(|ep| {
                let raw = ep.title.unwrap_or_default();
                let (number, title) = parse_episode_title(&raw)?;
                Ok(AniListEpisode {
                    number,
                    title,
                    thumbnail: ep.thumbnail.filter(|t| !t.is_empty()),
                })
            })
            .collect()
    }

    async fn query_media<T: DeserializeOwned>(&self, query: &str, id: u64) -> Result<T> {
        let body = json!({
            "query": query,
            "variables": { "id": id }
        });
        let parsed: GraphQlResponse<MediaData<T>> =
            http::post_json(&self.client, self.endpoint.clone(), &body).await?;

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let msg = errors
                .into_iter()
                .map(|e| match e.status {
                    Some(s) => format!("{} (status {})", e.message, s),
                    None => e.message,
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::UpstreamFetch(format!("AniList GraphQL error: {}", msg)));
        }

        parsed
            .data
            .and_then(|d| d.media)
            .ok_or_else(|| Error::MalformedResponse(format!("AniList returned no media for id {}", id)))
    }
}

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::http;

const JSON_API: &str = "application/vnd.api+json";

/// How to address a show on Kitsu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitsuLookup {
    Kitsu(u64),
    /// Resolved through Kitsu's MyAnimeList mappings first.
    Mal(u64),
}

#[async_trait]
pub trait KitsuApi: Send + Sync {
    async fn fetch_show(&self, lookup: KitsuLookup) -> Result<KitsuShow>;
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct KitsuShow {
    #[serde(rename = "posterImage", default)]
    pub poster_image: Option<KitsuImage>,
    #[serde(rename = "coverImage", default)]
    pub cover_image: Option<KitsuImage>,
}

impl KitsuShow {
    pub fn poster(&self) -> Option<&str> {
        self.poster_image.as_ref().and_then(KitsuImage::best)
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover_image.as_ref().and_then(KitsuImage::best)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct KitsuImage {
    pub original: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
    pub tiny: Option<String>,
}

impl KitsuImage {
    /// Largest size available.
    pub fn best(&self) -> Option<&str> {
        [&self.original, &self.large, &self.medium, &self.small, &self.tiny]
            .into_iter()
            .find_map(|s| s.as_deref().filter(|u| !u.is_empty()))
    }
}

#[derive(Deserialize)]
struct ShowDocument {
    data: ShowResource,
}

#[derive(Deserialize)]
struct ShowResource {
    attributes: KitsuShow,
}

#[derive(Deserialize)]
struct MappingDocument {
    #[serde(default)]
    data: Vec<MappingResource>,
}

#[derive(Deserialize)]
struct MappingResource {
    relationships: MappingRelationships,
}

#[derive(Deserialize)]
struct MappingRelationships {
    item: RelationshipLinks,
}

#[derive(Deserialize)]
struct RelationshipLinks {
    links: Links,
}

#[derive(Deserialize)]
struct Links {
    related: String,
}

#[derive(Debug, Clone)]
pub struct KitsuClient {
    client: Client,
    base_url: Url,
}

impl KitsuClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API));
        Ok(Self {
            client: http::build_client_with_headers("Kitsu", headers)?,
            base_url: config.base_url.clone(),
        })
    }

    async fn resolve_mal(&self, mal_id: u64) -> Result<Url> {
        let mut url = http::endpoint(&self.base_url, "mappings")?;
        url.query_pairs_mut()
            .append_pair("filter[externalSite]", "myanimelist/anime")
            .append_pair("filter[externalId]", &mal_id.to_string());

        let text = http::send(self.client.get(url.clone()), &url).await?;
        let doc: MappingDocument = http::decode_json(&url, &text)?;
        let related = doc
            .data
            .into_iter()
            .next()
            .map(|m| m.relationships.item.links.related)
            .ok_or_else(|| Error::MappingNotFound(format!("MAL id {} on Kitsu", mal_id)))?;

        Url::parse(&related).map_err(|e| {
            Error::MalformedResponse(format!("Kitsu mapping link '{}' is invalid: {}", related, e))
        })
    }
}

#[async_trait]
impl KitsuApi for KitsuClient {
    async fn fetch_show(&self, lookup: KitsuLookup) -> Result<KitsuShow> {
        let url = match lookup {
            KitsuLookup::Kitsu(id) => http::endpoint(&self.base_url, &format!("anime/{}", id))?,
            KitsuLookup::Mal(mal_id) => self.resolve_mal(mal_id).await?,
        };
        let text = http::send(self.client.get(url.clone()), &url).await?;
        let doc: ShowDocument = http::decode_json(&url, &text)?;
        Ok(doc.data.attributes)
    }
}

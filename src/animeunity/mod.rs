use async_trait::async_trait;
use url::Url;

use crate::error::Result;

mod client;
mod types;

pub use client::AnimeUnityClient;
pub use types::{AuEpisode, AuGenre, AuScore, AuShow};

/// Primary catalog. Every show, episode listing and embed URL originates here.
#[async_trait]
pub trait AnimeUnityApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<AuShow>>;
    async fn fetch_show(&self, id: u64) -> Result<AuShow>;
    /// Episodes `start..=start + limit - 1`, in catalog order.
    async fn fetch_episodes(&self, show_id: u64, start: u64, limit: u64)
        -> Result<Vec<AuEpisode>>;
    async fn fetch_embed_url(&self, media_id: u64) -> Result<Url>;
    async fn fetch_archive(&self, page: u32, query: &ArchiveQuery) -> Result<Vec<AuShow>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOrder {
    Popularity,
    MostViewed,
}

/// Filters for the `top-anime` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveQuery {
    pub order: Option<ArchiveOrder>,
    /// Catalog type such as `TV` or `Movie`.
    pub kind: Option<String>,
}

#[async_trait]
impl AnimeUnityApi for AnimeUnityClient {
    async fn search(&self, query: &str) -> Result<Vec<AuShow>> {
        self.search_by_title(query).await
    }

    async fn fetch_show(&self, id: u64) -> Result<AuShow> {
        self.fetch_show_page(id).await
    }

    async fn fetch_episodes(
        &self,
        show_id: u64,
        start: u64,
        limit: u64,
    ) -> Result<Vec<AuEpisode>> {
        self.fetch_episode_range(show_id, start, limit).await
    }

    async fn fetch_embed_url(&self, media_id: u64) -> Result<Url> {
        self.fetch_embed(media_id).await
    }

    async fn fetch_archive(&self, page: u32, query: &ArchiveQuery) -> Result<Vec<AuShow>> {
        self.fetch_archive_page(page, query).await
    }
}

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::animeunity::AnimeUnityApi;
use crate::error::{Error, Result};
use crate::id::{decode, MediaRef};
use crate::models::VideoAsset;

/// Turns an embed page into a playable manifest.
#[async_trait]
pub trait PlaylistResolver: Send + Sync {
    async fn resolve(&self, embed_url: &Url) -> Result<VideoAsset>;
}

/// Hands the embed URL back as the asset, leaving playlist extraction to the player.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedPassthrough;

#[async_trait]
impl PlaylistResolver for EmbedPassthrough {
    async fn resolve(&self, embed_url: &Url) -> Result<VideoAsset> {
        Ok(VideoAsset {
            url: embed_url.to_string(),
            headers: BTreeMap::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    IdDecoded,
    MediaIdResolved,
    EmbedUrlFetched,
    AssetResolved,
    Failed,
}

pub struct VideoResolver {
    animeunity: Arc<dyn AnimeUnityApi>,
    playlist: Arc<dyn PlaylistResolver>,
}

impl VideoResolver {
    pub fn new(animeunity: Arc<dyn AnimeUnityApi>, playlist: Arc<dyn PlaylistResolver>) -> Self {
        Self {
            animeunity,
            playlist,
        }
    }

    /// Resolves an episode id, or a movie's show id, to exactly one asset.
    pub async fn fetch_video_assets(&self, id: &str) -> Result<Vec<VideoAsset>> {
        match self.resolve(id).await {
            Ok(asset) => Ok(vec![asset]),
            Err(err) => {
                debug!(id = %id, state = ?Stage::Failed, "Video resolution failed: {}", err);
                Err(err)
            }
        }
    }

    async fn resolve(&self, id: &str) -> Result<VideoAsset> {
        debug!(id = %id, state = ?Stage::Start);
        let target = decode(id)?;
        debug!(id = %id, state = ?Stage::IdDecoded, media_ref = ?target);

        let media_id = match target {
            MediaRef::Episode(episode) => Some(episode.media_id),
            MediaRef::Show { primary_id } => self
                .animeunity
                .fetch_episodes(primary_id, 1, 1)
                .await?
                .first()
                .map(|ep| ep.id),
        };
        let media_id = media_id
            .filter(|&m| m != 0)
            .ok_or_else(|| Error::MediaNotFound(id.to_string()))?;
        debug!(id = %id, state = ?Stage::MediaIdResolved, media_id);

        let embed_url = self.animeunity.fetch_embed_url(media_id).await?;
        debug!(id = %id, state = ?Stage::EmbedUrlFetched, embed_url = %embed_url);

        let asset = self.playlist.resolve(&embed_url).await?;
        debug!(id = %id, state = ?Stage::AssetResolved);
        info!(id = %id, media_id, "Resolved video asset");
        Ok(asset)
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::anilist::AniListApi;
use crate::animeunity::{AnimeUnityApi, AuEpisode};
use crate::enrichment::{attempt, EnrichmentSource};
use crate::error::Result;
use crate::id::{compose_episode_id, decompose_show_id};
use crate::jikan::JikanApi;
use crate::models::{Episode, Season};

/// Episodes per season bucket.
pub const SEASON_WINDOW: u64 = 100;

/// One page of the primary episode listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    /// 1-based absolute number of the first episode.
    pub start: u64,
    pub limit: u64,
}

impl SeasonWindow {
    /// Inclusive upper bound.
    pub fn end(&self) -> u64 {
        self.start + self.limit - 1
    }
}

pub fn season_window(season: u32) -> SeasonWindow {
    SeasonWindow {
        start: u64::from(season) * SEASON_WINDOW + 1,
        limit: SEASON_WINDOW,
    }
}

/// Splits `total` episodes into named buckets: 250 gives "1-100", "101-200", "201-250".
pub fn seasons_for(total: u64) -> Vec<Season> {
    let count = total.div_ceil(SEASON_WINDOW);
    (0..count)
        .map(|idx| {
            let start = idx * SEASON_WINDOW + 1;
            let end = ((idx + 1) * SEASON_WINDOW).min(total);
            Season {
                number: idx as u32,
                name: format!("{}-{}", start, end),
            }
        })
        .collect()
}

pub struct EpisodeWindower {
    animeunity: Arc<dyn AnimeUnityApi>,
    jikan: Arc<dyn JikanApi>,
    anilist: Arc<dyn AniListApi>,
}

impl EpisodeWindower {
    pub fn new(
        animeunity: Arc<dyn AnimeUnityApi>,
        jikan: Arc<dyn JikanApi>,
        anilist: Arc<dyn AniListApi>,
    ) -> Self {
        Self {
            animeunity,
            jikan,
            anilist,
        }
    }

    /// Episodes of one zero-based season, titled and thumbnailed where the
    /// secondary catalogs know them.
    pub async fn fetch_episodes(&self, show_id: &str, season: u32) -> Result<Vec<Episode>> {
        let primary_id = decompose_show_id(show_id)?;
        let window = season_window(season);
        debug!(
            show_id = %show_id,
            start = window.start,
            end = window.end(),
            "Fetching episode window"
        );

        let listing = self
            .animeunity
            .fetch_episodes(primary_id, window.start, window.limit)
            .await?;
        if listing.is_empty() {
            return Ok(Vec::new());
        }

        let show = self.animeunity.fetch_show(primary_id).await?;
        // Jikan pages are 1-based; the last season index has no page.
        let jikan_page = season.checked_add(1);
        let (titles, thumbnails) = tokio::join!(
            attempt(EnrichmentSource::Jikan, jikan_page.and(show.mal_id), |id| {
                self.jikan.fetch_episodes(id, jikan_page.unwrap_or(season))
            }),
            attempt(EnrichmentSource::AniList, show.anilist_id, |id| {
                self.anilist.fetch_episodes(id)
            }),
        );

        let titles: HashMap<u64, String> = titles
            .into_parts()
            .0
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ep| ep.title.map(|t| (ep.mal_id, t)))
            .collect();
        let thumbnails: HashMap<u64, String> = thumbnails
            .into_parts()
            .0
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ep| ep.thumbnail.map(|t| (ep.number, t)))
            .collect();

        let episodes: Vec<Episode> = listing
            .iter()
            .enumerate()
            .map(|(idx, ep)| {
                let number = episode_number(ep, window.start + idx as u64);
                let key = join_key(number);
                Episode {
                    id: compose_episode_id(show_id, ep.id),
                    number,
                    title: key.and_then(|k| titles.get(&k).cloned()),
                    thumbnail_url: key.and_then(|k| thumbnails.get(&k).cloned()),
                }
            })
            .collect();

        info!(
            show_id = %show_id,
            season,
            episodes = episodes.len(),
            titled = episodes.iter().filter(|e| e.title.is_some()).count(),
            "Built episode window"
        );
        Ok(episodes)
    }
}

/// Catalog number, or the absolute position when the catalog sends garbage.
fn episode_number(ep: &AuEpisode, position: u64) -> f64 {
    ep.number
        .as_deref()
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(position as f64)
}

/// Only whole episode numbers join against the secondary catalogs.
fn join_key(number: f64) -> Option<u64> {
    (number >= 0.0 && number.fract() == 0.0).then_some(number as u64)
}

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::anilist::AniListApi;
use crate::animeunity::{AnimeUnityApi, AuScore};
use crate::enrichment::{attempt, Attempt, EnrichmentFailure, EnrichmentSource};
use crate::episodes::seasons_for;
use crate::error::Result;
use crate::id::decompose_show_id;
use crate::jikan::JikanApi;
use crate::kitsu::{KitsuApi, KitsuLookup};
use crate::models::{Show, ShowKind, ShowStatus};

/// A show together with the secondary lookups that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowReport {
    pub show: Show,
    pub failures: Vec<EnrichmentFailure>,
}

/// Builds the canonical [`Show`] from the primary catalog and layers
/// images and scores from the secondary ones on top.
pub struct ShowAggregator {
    animeunity: Arc<dyn AnimeUnityApi>,
    jikan: Arc<dyn JikanApi>,
    anilist: Arc<dyn AniListApi>,
    kitsu: Option<Arc<dyn KitsuApi>>,
}

impl ShowAggregator {
    pub fn new(
        animeunity: Arc<dyn AnimeUnityApi>,
        jikan: Arc<dyn JikanApi>,
        anilist: Arc<dyn AniListApi>,
    ) -> Self {
        Self {
            animeunity,
            jikan,
            anilist,
            kitsu: None,
        }
    }

    /// Enables Kitsu as a last-resort image source.
    pub fn with_kitsu(mut self, kitsu: Arc<dyn KitsuApi>) -> Self {
        self.kitsu = Some(kitsu);
        self
    }

    pub async fn fetch_show(&self, id: &str) -> Result<Show> {
        Ok(self.fetch_show_report(id).await?.show)
    }

    pub async fn fetch_show_report(&self, id: &str) -> Result<ShowReport> {
        let primary_id = decompose_show_id(id)?;
        let au = self.animeunity.fetch_show(primary_id).await?;

        let kitsu_lookup = async {
            match &self.kitsu {
                Some(kitsu) => {
                    attempt(EnrichmentSource::Kitsu, au.mal_id, |mal| {
                        kitsu.fetch_show(KitsuLookup::Mal(mal))
                    })
                    .await
                }
                None => Attempt::Skipped,
            }
        };
        let (mal, anilist, kitsu) = tokio::join!(
            attempt(EnrichmentSource::Jikan, au.mal_id, |id| self.jikan.fetch_show(id)),
            attempt(EnrichmentSource::AniList, au.anilist_id, |id| {
                self.anilist.fetch_show(id)
            }),
            kitsu_lookup,
        );

        let mut failures = Vec::new();
        let (mal, failed) = mal.into_parts();
        failures.extend(failed);
        let (anilist, failed) = anilist.into_parts();
        failures.extend(failed);
        let (kitsu, failed) = kitsu.into_parts();
        failures.extend(failed);

        let mal_poster = mal.as_ref().and_then(|m| m.large_poster());
        let kitsu_poster = kitsu.as_ref().and_then(|k| k.poster());
        let poster_url = mal_poster
            .or(kitsu_poster)
            .map(str::to_string)
            .or_else(|| au.imageurl.clone());

        let banner = anilist
            .as_ref()
            .and_then(|a| a.banner_image.as_deref())
            .filter(|b| !b.is_empty());
        let kitsu_cover = kitsu.as_ref().and_then(|k| k.cover());
        let backdrop_url = banner
            .or(kitsu_cover)
            .map(str::to_string)
            .or_else(|| au.imageurl_cover.clone());

        let mut rating = parse_rating(au.score.as_ref());
        if let Some(score) = mal.as_ref().and_then(|m| m.score).filter(|s| *s > 0.0) {
            rating = score;
        }

        let kind = ShowKind::from_au_type(&au.show_type);
        let seasons = match kind {
            ShowKind::Series => Some(seasons_for(au.episodes_count.unwrap_or(0))),
            ShowKind::Movie => None,
        };

        let show = Show {
            id: id.to_string(),
            kind,
            title: au.display_title(),
            overview: au.plot.clone().unwrap_or_default(),
            genres: au
                .genres
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|g| g.name.clone())
                .collect(),
            duration: duration_seconds(au.episodes_length),
            release_date: release_date(au.date.as_deref(), au.season.as_deref()),
            seasons,
            poster_url,
            backdrop_url,
            rating,
            status: au.status.as_deref().and_then(map_status),
        };

        info!(
            show_id = %id,
            title = %show.title,
            degraded = failures.len(),
            "Aggregated show"
        );
        Ok(ShowReport { show, failures })
    }
}

/// Catalog score as a number; anything unparsable counts as unrated.
pub fn parse_rating(score: Option<&AuScore>) -> f64 {
    let value = match score {
        Some(AuScore::Number(n)) => *n,
        Some(AuScore::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn map_status(raw: &str) -> Option<ShowStatus> {
    match raw.trim().to_lowercase().as_str() {
        "in corso" => Some(ShowStatus::Airing),
        "terminato" => Some(ShowStatus::Ended),
        "in uscita" => Some(ShowStatus::Upcoming),
        "droppato" => Some(ShowStatus::Canceled),
        _ => None,
    }
}

/// First day of the airing season, e.g. `("2006", Some("Primavera"))` gives `2006-04-01`.
pub fn release_date(year: Option<&str>, season: Option<&str>) -> Option<String> {
    let year: i32 = year?.trim().parse().ok()?;
    let month = match season.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("primavera") => 4,
        Some("estate") => 7,
        Some("autunno") => 10,
        _ => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.format("%Y-%m-%d").to_string())
}

fn duration_seconds(minutes: Option<f64>) -> u64 {
    match minutes {
        Some(m) if m.is_finite() && m > 0.0 => (m * 60.0).round() as u64,
        _ => 0,
    }
}

//! In-memory sources shared by the unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

use crate::anilist::{AniListApi, AniListEpisode, AniListShow};
use crate::animeunity::{AnimeUnityApi, ArchiveQuery, AuEpisode, AuShow};
use crate::error::{Error, Result};
use crate::jikan::{JikanApi, JikanEpisode, JikanShow};
use crate::kitsu::{KitsuApi, KitsuLookup, KitsuShow};

pub(crate) fn down(source: &str) -> Error {
    Error::UpstreamFetch(format!("{} unavailable", source))
}

pub(crate) fn au_episode(id: u64, number: &str) -> AuEpisode {
    AuEpisode {
        id,
        number: Some(number.to_string()),
        anime_id: None,
        scws_id: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeAnimeUnity {
    pub(crate) shows: HashMap<u64, AuShow>,
    /// Full episode list; windows are sliced out of it.
    pub(crate) episodes: Vec<AuEpisode>,
    /// Returned for every window when set, regardless of `start`.
    pub(crate) fixed_window: Option<Vec<AuEpisode>>,
    pub(crate) embed: Option<String>,
    pub(crate) archive: HashMap<u32, Vec<AuShow>>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeAnimeUnity {
    pub(crate) fn with_show(show: AuShow) -> Self {
        let mut shows = HashMap::new();
        shows.insert(show.id, show);
        Self {
            shows,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AnimeUnityApi for FakeAnimeUnity {
    async fn search(&self, query: &str) -> Result<Vec<AuShow>> {
        self.record(format!("search:{}", query));
        let mut shows: Vec<AuShow> = self.shows.values().cloned().collect();
        shows.sort_by_key(|s| s.id);
        Ok(shows)
    }

    async fn fetch_show(&self, id: u64) -> Result<AuShow> {
        self.record(format!("show:{}", id));
        self.shows.get(&id).cloned().ok_or_else(|| down("AnimeUnity"))
    }

    async fn fetch_episodes(
        &self,
        show_id: u64,
        start: u64,
        limit: u64,
    ) -> Result<Vec<AuEpisode>> {
        self.record(format!("episodes:{}:{}:{}", show_id, start, limit));
        if let Some(window) = &self.fixed_window {
            return Ok(window.clone());
        }
        Ok(self
            .episodes
            .iter()
            .skip(start.saturating_sub(1) as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_embed_url(&self, media_id: u64) -> Result<Url> {
        self.record(format!("embed:{}", media_id));
        let raw = self.embed.as_deref().ok_or_else(|| down("AnimeUnity"))?;
        Url::parse(raw).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    async fn fetch_archive(&self, page: u32, query: &ArchiveQuery) -> Result<Vec<AuShow>> {
        self.record(format!("archive:{}:{:?}", page, query));
        Ok(self.archive.get(&page).cloned().unwrap_or_default())
    }
}

pub(crate) struct FakeJikan {
    pub(crate) show: Result<JikanShow>,
    pub(crate) episodes: Result<Vec<JikanEpisode>>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeJikan {
    pub(crate) fn new(show: Result<JikanShow>, episodes: Result<Vec<JikanEpisode>>) -> Self {
        Self {
            show,
            episodes,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::new(Err(down("Jikan")), Err(down("Jikan")))
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JikanApi for FakeJikan {
    async fn fetch_show(&self, mal_id: u64) -> Result<JikanShow> {
        self.calls.lock().unwrap().push(format!("show:{}", mal_id));
        self.show.clone()
    }

    async fn fetch_episodes(&self, mal_id: u64, page: u32) -> Result<Vec<JikanEpisode>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("episodes:{}:{}", mal_id, page));
        self.episodes.clone()
    }
}

pub(crate) struct FakeAniList {
    pub(crate) show: Result<AniListShow>,
    pub(crate) episodes: Result<Vec<AniListEpisode>>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeAniList {
    pub(crate) fn new(show: Result<AniListShow>, episodes: Result<Vec<AniListEpisode>>) -> Self {
        Self {
            show,
            episodes,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::new(Err(down("AniList")), Err(down("AniList")))
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AniListApi for FakeAniList {
    async fn fetch_show(&self, id: u64) -> Result<AniListShow> {
        self.calls.lock().unwrap().push(format!("show:{}", id));
        self.show.clone()
    }

    async fn fetch_episodes(&self, id: u64) -> Result<Vec<AniListEpisode>> {
        self.calls.lock().unwrap().push(format!("episodes:{}", id));
        self.episodes.clone()
    }
}

pub(crate) struct FakeKitsu {
    pub(crate) show: Result<KitsuShow>,
    pub(crate) lookups: Mutex<Vec<KitsuLookup>>,
}

impl FakeKitsu {
    pub(crate) fn new(show: Result<KitsuShow>) -> Self {
        Self {
            show,
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl KitsuApi for FakeKitsu {
    async fn fetch_show(&self, lookup: KitsuLookup) -> Result<KitsuShow> {
        self.lookups.lock().unwrap().push(lookup);
        self.show.clone()
    }
}

//! Home feed: pre-generated collections and trending lists, plus the pieces
//! the offline generator uses to build them.

use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::animeunity::{AnimeUnityApi, ArchiveOrder, ArchiveQuery, AuShow};
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::models::{FeedCollection, TrendingShow};
use crate::search::entry_from_au;

/// Archive pages fetched per collection.
pub const PAGES_PER_COLLECTION: u32 = 2;

/// Serves the generated feed files. Files are re-read on every call so a
/// regenerated feed is picked up without a restart.
#[derive(Debug, Clone)]
pub struct FeedProvider {
    collections_path: PathBuf,
    trending_path: PathBuf,
}

impl FeedProvider {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            collections_path: config.collections_path.clone(),
            trending_path: config.trending_path.clone(),
        }
    }

    pub async fn feed_collections(&self) -> Result<Vec<FeedCollection>> {
        load_list(&self.collections_path).await
    }

    pub async fn trending_shows(&self) -> Result<Vec<TrendingShow>> {
        load_list(&self.trending_path).await
    }
}

async fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Feed file missing, serving empty list");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(Error::UpstreamFetch(format!(
                "reading {} failed: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&raw)
        .map_err(|e| Error::MalformedResponse(format!("{} is not a valid feed: {}", path.display(), e)))
}

/// One collection the generator builds from the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub query: ArchiveQuery,
    /// Keep only dubbed shows when set, only subbed ones otherwise.
    pub dubbed: bool,
}

impl CollectionSpec {
    fn new(name: &str, order: Option<ArchiveOrder>, kind: Option<&str>, dubbed: bool) -> Self {
        Self {
            name: name.to_string(),
            query: ArchiveQuery {
                order,
                kind: kind.map(str::to_string),
            },
            dubbed,
        }
    }
}

pub fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::new("Gli anime più visti", Some(ArchiveOrder::MostViewed), None, false),
        CollectionSpec::new(
            "Gli anime doppiati più visti",
            Some(ArchiveOrder::MostViewed),
            None,
            true,
        ),
        CollectionSpec::new("Anime del momento", Some(ArchiveOrder::Popularity), None, false),
        CollectionSpec::new("I film anime più apprezzati", None, Some("Movie"), false),
        CollectionSpec::new("I film anime doppiati più apprezzati", None, Some("Movie"), true),
        CollectionSpec::new("Le serie anime più amate", None, Some("TV"), false),
        CollectionSpec::new("Le serie anime doppiate più amate", None, Some("TV"), true),
    ]
}

/// `"Anime del momento"` becomes `"au-anime-del-momento"`.
pub fn collection_id(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("au-{}", slug)
}

pub fn build_collection(name: &str, shows: &[AuShow], dubbed: bool) -> FeedCollection {
    let shows: Vec<_> = shows
        .iter()
        .filter(|s| s.is_dubbed() == dubbed)
        .map(entry_from_au)
        .collect();
    info!(collection = %name, shows = shows.len(), "Generated collection");
    FeedCollection {
        id: collection_id(name),
        name: name.to_string(),
        shows,
    }
}

/// Builds every collection in order, pausing `delay` after each one.
pub async fn generate_collections(
    animeunity: &dyn AnimeUnityApi,
    specs: &[CollectionSpec],
    delay: Duration,
) -> Result<Vec<FeedCollection>> {
    let mut collections = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut shows = Vec::new();
        for page in 1..=PAGES_PER_COLLECTION {
            shows.extend(animeunity.fetch_archive(page, &spec.query).await?);
        }
        collections.push(build_collection(&spec.name, &shows, spec.dubbed));
        if !delay.is_zero() {
            debug!("Waiting {:?} before the next collection", delay);
            tokio::time::sleep(delay).await;
        }
    }
    Ok(collections)
}

/// Swaps the `original` size segment of a TMDB image URL for `size`.
pub fn resize_tmdb_image(url: &str, size: &str) -> String {
    url.replacen("original", size, 1)
}

/// Downsizes artwork for the trending carousel.
pub fn resize_trending(shows: Vec<TrendingShow>) -> Vec<TrendingShow> {
    shows
        .into_iter()
        .map(|mut show| {
            show.logo_url = show.logo_url.map(|u| resize_tmdb_image(&u, "w500"));
            show.poster_url = show.poster_url.map(|u| resize_tmdb_image(&u, "w780"));
            show.backdrop_url = show.backdrop_url.map(|u| resize_tmdb_image(&u, "w1280"));
            show
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShowKind;
    use crate::testing::FakeAnimeUnity;

    fn au(id: u64, dub: i64) -> AuShow {
        AuShow {
            id,
            slug: format!("show-{}", id),
            title_eng: Some(format!("Show {}", id)),
            show_type: "TV".to_string(),
            dub: Some(dub),
            ..AuShow::default()
        }
    }

    #[test]
    fn collection_ids_are_slugged() {
        assert_eq!(collection_id("Anime del momento"), "au-anime-del-momento");
        assert_eq!(collection_id("Gli anime più visti"), "au-gli-anime-più-visti");
    }

    #[test]
    fn collections_filter_on_dub_flag() {
        let shows = vec![au(1, 0), au(2, 1), au(3, 0)];
        let subbed = build_collection("Subbed", &shows, false);
        let dubbed = build_collection("Dubbed", &shows, true);
        let ids = |c: &FeedCollection| c.shows.iter().map(|s| s.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&subbed), vec!["1-show-1", "3-show-3"]);
        assert_eq!(ids(&dubbed), vec!["2-show-2"]);
        assert_eq!(dubbed.id, "au-dubbed");
    }

    #[tokio::test]
    async fn generator_reads_two_pages_per_collection() {
        let mut fake = FakeAnimeUnity::default();
        fake.archive.insert(1, vec![au(1, 0)]);
        fake.archive.insert(2, vec![au(2, 0), au(3, 1)]);
        let specs = vec![CollectionSpec::new("Anime del momento", Some(ArchiveOrder::Popularity), None, false)];

        let collections = generate_collections(&fake, &specs, Duration::ZERO).await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].shows.len(), 2);
        assert_eq!(fake.calls().len(), 2);
        assert!(fake.calls()[1].starts_with("archive:2:"));
    }

    #[test]
    fn trending_images_are_resized_per_role() {
        let show = TrendingShow {
            id: "2791-jujutsu-kaisen".to_string(),
            kind: ShowKind::Series,
            title: "Jujutsu Kaisen".to_string(),
            overview: String::new(),
            genres: vec![],
            duration: 0,
            release_date: Some("2020-10-03".to_string()),
            poster_url: Some("https://image.tmdb.org/t/p/original/p.jpg".to_string()),
            backdrop_url: Some("https://image.tmdb.org/t/p/original/b.jpg".to_string()),
            logo_url: Some("https://image.tmdb.org/t/p/original/l.png".to_string()),
        };
        let resized = resize_trending(vec![show]).remove(0);
        assert_eq!(resized.poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w780/p.jpg"));
        assert_eq!(resized.backdrop_url.as_deref(), Some("https://image.tmdb.org/t/p/w1280/b.jpg"));
        assert_eq!(resized.logo_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/l.png"));
    }

    #[tokio::test]
    async fn provider_serves_files_and_tolerates_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let collections = dir.path().join("collections.json");
        std::fs::write(
            &collections,
            r#"[{"id":"au-x","name":"X","shows":[{"kind":"series","id":"1-a","title":"A","posterURL":"p","year":2020}]}]"#,
        )
        .unwrap();
        let provider = FeedProvider::new(&FeedConfig {
            collections_path: collections,
            trending_path: dir.path().join("missing.json"),
        });

        let loaded = provider.feed_collections().await.unwrap();
        assert_eq!(loaded[0].shows[0].id, "1-a");
        assert!(provider.trending_shows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let trending = dir.path().join("trending.json");
        std::fs::write(&trending, "{not json").unwrap();
        let provider = FeedProvider::new(&FeedConfig {
            collections_path: dir.path().join("none.json"),
            trending_path: trending,
        });

        assert!(matches!(
            provider.trending_shows().await,
            Err(Error::MalformedResponse(_))
        ));
    }
}

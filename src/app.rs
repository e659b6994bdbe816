use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::anilist::{AniListApi, AniListClient};
use crate::animeunity::{AnimeUnityApi, AnimeUnityClient};
use crate::config::Config;
use crate::episodes::EpisodeWindower;
use crate::error::Error;
use crate::feed::FeedProvider;
use crate::jikan::{JikanApi, JikanClient};
use crate::kitsu::{KitsuApi, KitsuClient};
use crate::models::{Episode, FeedCollection, Show, ShowEntry, TrendingShow, VideoAsset};
use crate::search::search_shows;
use crate::show::ShowAggregator;
use crate::video::{EmbedPassthrough, PlaylistResolver, VideoResolver};

#[derive(Clone)]
pub struct AppState {
    pub animeunity: Arc<dyn AnimeUnityApi>,
    pub shows: Arc<ShowAggregator>,
    pub episodes: Arc<EpisodeWindower>,
    pub videos: Arc<VideoResolver>,
    pub feed: Arc<FeedProvider>,
}

impl AppState {
    /// Wires the federation components around the given sources.
    pub fn from_sources(
        animeunity: Arc<dyn AnimeUnityApi>,
        jikan: Arc<dyn JikanApi>,
        anilist: Arc<dyn AniListApi>,
        kitsu: Option<Arc<dyn KitsuApi>>,
        playlist: Arc<dyn PlaylistResolver>,
        feed: FeedProvider,
    ) -> Self {
        let mut shows = ShowAggregator::new(animeunity.clone(), jikan.clone(), anilist.clone());
        if let Some(kitsu) = kitsu {
            shows = shows.with_kitsu(kitsu);
        }
        Self {
            animeunity: animeunity.clone(),
            shows: Arc::new(shows),
            episodes: Arc::new(EpisodeWindower::new(animeunity.clone(), jikan, anilist)),
            videos: Arc::new(VideoResolver::new(animeunity, playlist)),
            feed: Arc::new(feed),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let animeunity: Arc<dyn AnimeUnityApi> = Arc::new(AnimeUnityClient::new(&config.animeunity)?);
        let jikan: Arc<dyn JikanApi> = Arc::new(JikanClient::new(&config.jikan)?);
        let anilist: Arc<dyn AniListApi> = Arc::new(AniListClient::new(&config.anilist)?);
        let kitsu = match &config.kitsu {
            Some(source) => {
                info!("Kitsu image fallback enabled ({})", source.base_url);
                Some(Arc::new(KitsuClient::new(source)?) as Arc<dyn KitsuApi>)
            }
            None => None,
        };
        Ok(Self::from_sources(
            animeunity,
            jikan,
            anilist,
            kitsu,
            Arc::new(EmbedPassthrough),
            FeedProvider::new(&config.feed),
        ))
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/shows/:id", get(show))
        .route("/shows/:id/episodes", get(episodes))
        .route("/videos", get(videos))
        .route("/feed/collections", get(feed_collections))
        .route("/feed/trending", get(feed_trending))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Library error rendered as `{"error": ...}` with a status per kind.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::MalformedId(_) => StatusCode::BAD_REQUEST,
            Error::MediaNotFound(_) | Error::MappingNotFound(_) => StatusCode::NOT_FOUND,
            Error::UpstreamFetch(_) | Error::MalformedResponse(_) | Error::Playlist(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

#[derive(Deserialize)]
struct EpisodeParams {
    #[serde(default)]
    season: u32,
}

#[derive(Deserialize)]
struct VideoParams {
    id: String,
}

async fn health() -> &'static str {
    "OK"
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<ShowEntry>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(search_shows(state.animeunity.as_ref(), query).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Show> {
    Ok(Json(state.shows.fetch_show(&id).await?))
}

async fn episodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<EpisodeParams>,
) -> ApiResult<Vec<Episode>> {
    Ok(Json(state.episodes.fetch_episodes(&id, params.season).await?))
}

async fn videos(
    State(state): State<AppState>,
    Query(params): Query<VideoParams>,
) -> ApiResult<Vec<VideoAsset>> {
    Ok(Json(state.videos.fetch_video_assets(&params.id).await?))
}

async fn feed_collections(State(state): State<AppState>) -> ApiResult<Vec<FeedCollection>> {
    Ok(Json(state.feed.feed_collections().await?))
}

async fn feed_trending(State(state): State<AppState>) -> ApiResult<Vec<TrendingShow>> {
    Ok(Json(state.feed.trending_shows().await?))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

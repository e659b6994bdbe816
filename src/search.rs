use tracing::info;

use crate::animeunity::{AnimeUnityApi, AuShow};
use crate::error::Result;
use crate::id::compose_show_id;
use crate::models::{ShowEntry, ShowKind};

/// Projects a catalog record into a listing entry.
pub fn entry_from_au(show: &AuShow) -> ShowEntry {
    ShowEntry {
        kind: ShowKind::from_au_type(&show.show_type),
        id: compose_show_id(show.id, &show.slug),
        title: show.display_title(),
        poster_url: show.imageurl.clone().unwrap_or_default(),
        year: show.year(),
    }
}

pub async fn search_shows(animeunity: &dyn AnimeUnityApi, query: &str) -> Result<Vec<ShowEntry>> {
    let shows = animeunity.search(query).await?;
    info!(query = %query, hits = shows.len(), "Searched catalog");
    Ok(shows.iter().map(entry_from_au).collect())
}

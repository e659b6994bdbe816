use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShowKind {
    Movie,
    Series,
}

impl ShowKind {
    /// The primary catalog only distinguishes movies; everything else is a series.
    pub fn from_au_type(raw: &str) -> Self {
        if raw == "Movie" {
            ShowKind::Movie
        } else {
            ShowKind::Series
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    Airing,
    Ended,
    Upcoming,
    Canceled,
}

/// Search and feed projection of a show.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShowEntry {
    pub kind: ShowKind,
    pub id: String,
    pub title: String,
    #[serde(rename = "posterURL")]
    pub poster_url: String,
    /// Absent when the catalog year is not a number.
    pub year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String,
    pub kind: ShowKind,
    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    /// Seconds.
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<Season>>,
    #[serde(rename = "posterURL")]
    pub poster_url: Option<String>,
    #[serde(rename = "backdropURL")]
    pub backdrop_url: Option<String>,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShowStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Season {
    pub number: u32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Episode {
    pub id: String,
    pub number: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "thumbnailURL", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Playable manifest, handed back exactly as the playlist resolver produced it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FeedCollection {
    pub id: String,
    pub name: String,
    pub shows: Vec<ShowEntry>,
}

/// Hand-curated show highlighted on the home feed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingShow {
    pub id: String,
    pub kind: ShowKind,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(rename = "posterURL", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(rename = "backdropURL", default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(rename = "logoURL", default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

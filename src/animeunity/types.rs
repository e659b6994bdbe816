use serde::{Deserialize, Deserializer};

/// Show record as embedded in the catalog pages.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AuShow {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_eng: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    /// Release year, sent either as `"2006"` or `2006`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    /// Minutes per episode.
    #[serde(default)]
    pub episodes_length: Option<f64>,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "type", default)]
    pub show_type: String,
    #[serde(default)]
    pub score: Option<AuScore>,
    #[serde(default)]
    pub dub: Option<i64>,
    #[serde(default)]
    pub imageurl: Option<String>,
    #[serde(default)]
    pub imageurl_cover: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub anilist_id: Option<u64>,
    #[serde(default)]
    pub mal_id: Option<u64>,
    #[serde(default)]
    pub genres: Option<Vec<AuGenre>>,
    /// Filled from the sibling `episodes_count` attribute, never from the JSON.
    #[serde(skip)]
    pub episodes_count: Option<u64>,
}

impl AuShow {
    pub fn is_dubbed(&self) -> bool {
        self.dub == Some(1)
    }

    /// English title, or the native one when the English title is blank.
    pub fn display_title(&self) -> String {
        self.title_eng
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| self.title.as_deref().map(str::trim))
            .unwrap_or_default()
            .to_string()
    }

    pub fn year(&self) -> Option<i32> {
        self.date.as_deref().and_then(|d| d.trim().parse().ok())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuGenre {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

/// The catalog sends scores as decimal strings, sometimes as numbers.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AuScore {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuEpisode {
    /// Media id of the playable asset.
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    /// Display number such as `"12"` or `"12.5"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(default)]
    pub anime_id: Option<u64>,
    #[serde(default)]
    pub scws_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EpisodePage {
    #[serde(default)]
    pub(crate) episodes: Option<Vec<AuEpisode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArchivePage {
    #[serde(default)]
    pub(crate) data: Vec<AuShow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<NumberOrString>::deserialize(deserializer)?.map(|v| match v {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s,
        }),
    )
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("invalid id {}", n))),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid id '{}'", s))),
    }
}

//! Best-effort lookups against secondary catalogs.

use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentSource {
    Jikan,
    AniList,
    Kitsu,
}

impl fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnrichmentSource::Jikan => "Jikan",
            EnrichmentSource::AniList => "AniList",
            EnrichmentSource::Kitsu => "Kitsu",
        };
        f.write_str(name)
    }
}

/// A secondary lookup that failed and was dropped in favour of the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentFailure {
    pub source: EnrichmentSource,
    pub error: Error,
}

/// Outcome of one optional lookup: skipped, enriched, or failed.
#[derive(Debug)]
pub(crate) enum Attempt<T> {
    Skipped,
    Enriched(T),
    Failed(EnrichmentFailure),
}

impl<T> Attempt<T> {
    pub(crate) fn into_parts(self) -> (Option<T>, Option<EnrichmentFailure>) {
        match self {
            Attempt::Skipped => (None, None),
            Attempt::Enriched(value) => (Some(value), None),
            Attempt::Failed(failure) => (None, Some(failure)),
        }
    }
}

/// Runs `fetch` only when `id` is present. Failures are logged, never propagated.
pub(crate) async fn attempt<T, F, Fut>(
    source: EnrichmentSource,
    id: Option<u64>,
    fetch: F,
) -> Attempt<T>
where
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let Some(id) = id else {
        return Attempt::Skipped;
    };
    match fetch(id).await {
        Ok(value) => Attempt::Enriched(value),
        Err(error) => {
            warn!(source = %source, id, "Enrichment lookup failed: {}", error);
            Attempt::Failed(EnrichmentFailure { source, error })
        }
    }
}

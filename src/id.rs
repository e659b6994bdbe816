//! Composite identifiers.
//!
//! A show is addressed as `<primaryId>-<slug>` and an episode as
//! `<showId>/<mediaId>`. Every other module goes through these functions
//! instead of splitting ids by hand.

use crate::error::{Error, Result};

const SHOW_SEPARATOR: char = '-';
const EPISODE_SEPARATOR: char = '/';

/// The two halves of an episode id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRef {
    /// Full show composite id, slug included.
    pub show_id: String,
    pub media_id: u64,
}

/// What a composite id points at after applying the decoding rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Show { primary_id: u64 },
    Episode(EpisodeRef),
}

pub fn compose_show_id(primary_id: u64, slug: &str) -> String {
    format!("{primary_id}{SHOW_SEPARATOR}{slug}")
}

/// Recovers the primary numeric id from a show id. The slug is ignored.
pub fn decompose_show_id(id: &str) -> Result<u64> {
    let leading = id.split(SHOW_SEPARATOR).next().unwrap_or_default();
    parse_numeric(leading).ok_or_else(|| Error::MalformedId(id.to_string()))
}

pub fn compose_episode_id(show_id: &str, media_id: u64) -> String {
    format!("{show_id}{EPISODE_SEPARATOR}{media_id}")
}

pub fn decompose_episode_id(id: &str) -> Result<EpisodeRef> {
    let (show_id, media) = id
        .split_once(EPISODE_SEPARATOR)
        .ok_or_else(|| Error::MalformedId(id.to_string()))?;
    decompose_show_id(show_id).map_err(|_| Error::MalformedId(id.to_string()))?;
    let media_id = parse_numeric(media).ok_or_else(|| Error::MalformedId(id.to_string()))?;
    Ok(EpisodeRef {
        show_id: show_id.to_string(),
        media_id,
    })
}

/// Splits on `/` first, then on `-`.
pub fn decode(id: &str) -> Result<MediaRef> {
    if id.contains(EPISODE_SEPARATOR) {
        return decompose_episode_id(id).map(MediaRef::Episode);
    }
    decompose_show_id(id).map(|primary_id| MediaRef::Show { primary_id })
}

fn parse_numeric(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_id_round_trips_through_primary_id() {
        for (n, slug) in [(1, "a"), (2791, "jujutsu-kaisen"), (336, "il-castello-errante-di-howl-ita"), (7, "")] {
            let id = compose_show_id(n, slug);
            assert_eq!(id.split('-').next(), Some(n.to_string().as_str()));
            assert_eq!(decompose_show_id(&id), Ok(n));
        }
    }

    #[test]
    fn rejects_show_id_without_numeric_prefix() {
        assert_eq!(
            decompose_show_id("naruto-123"),
            Err(Error::MalformedId("naruto-123".to_string()))
        );
        assert!(decompose_show_id("").is_err());
        assert!(decompose_show_id("-slug").is_err());
        assert!(decompose_show_id("12a-slug").is_err());
    }

    #[test]
    fn accepts_show_id_without_slug() {
        assert_eq!(decompose_show_id("4821"), Ok(4821));
    }

    #[test]
    fn episode_id_round_trips() {
        let id = compose_episode_id("4821-nana", 55012);
        assert_eq!(id, "4821-nana/55012");
        assert_eq!(
            decompose_episode_id(&id),
            Ok(EpisodeRef {
                show_id: "4821-nana".to_string(),
                media_id: 55012,
            })
        );
    }

    #[test]
    fn episode_id_requires_separator_and_numeric_media() {
        assert!(matches!(
            decompose_episode_id("4821-nana"),
            Err(Error::MalformedId(_))
        ));
        assert!(matches!(
            decompose_episode_id("4821-nana/abc"),
            Err(Error::MalformedId(_))
        ));
        assert!(matches!(
            decompose_episode_id("4821-nana/1/2"),
            Err(Error::MalformedId(_))
        ));
    }

    #[test]
    fn episode_id_requires_numeric_show_prefix() {
        assert_eq!(
            decompose_episode_id("/55"),
            Err(Error::MalformedId("/55".to_string()))
        );
        assert_eq!(
            decompose_episode_id("abc/55"),
            Err(Error::MalformedId("abc/55".to_string()))
        );
        assert!(matches!(decode("nana-x/55"), Err(Error::MalformedId(_))));
    }

    #[test]
    fn decode_picks_episode_form_first() {
        assert_eq!(
            decode("2791-jujutsu-kaisen/9001"),
            Ok(MediaRef::Episode(EpisodeRef {
                show_id: "2791-jujutsu-kaisen".to_string(),
                media_id: 9001,
            }))
        );
        assert_eq!(
            decode("336-il-castello-errante-di-howl-ita"),
            Ok(MediaRef::Show { primary_id: 336 })
        );
    }
}

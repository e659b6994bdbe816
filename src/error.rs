use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the source clients and the federation components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Transport failure or non-2xx response from an upstream service.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// The upstream answered but the payload did not have the expected shape.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// A composite identifier could not be decoded.
    #[error("malformed id '{0}'")]
    MalformedId(String),

    /// No playable media id could be determined for the given id.
    #[error("no media found for '{0}'")]
    MediaNotFound(String),

    /// A foreign id could not be mapped to a native one.
    #[error("no mapping found for {0}")]
    MappingNotFound(String),

    /// The playlist resolver rejected the embed URL.
    #[error("playlist resolution failed: {0}")]
    Playlist(String),
}

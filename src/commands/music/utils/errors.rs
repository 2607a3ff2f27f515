//! Errors produced while turning user input into search terms.

use thiserror::Error;

use crate::commands::music::audio_sources::LinkKind;
use crate::commands::music::audio_sources::spotify::SpotifyError;

/// The input was a link to a platform this bot cannot resolve (YouTube).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("YouTube links are not supported, share a Spotify link or search text instead: {link}")]
pub struct UnsupportedLinkError {
    /// The rejected input, as given.
    pub link: String,
}

/// Failures while expanding a reference into search terms.
/// These are reported to the invoking user and never touch the bot session.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    UnsupportedLink(#[from] UnsupportedLinkError),

    #[error("Spotify {kind} '{id}' was not found")]
    NotFound { kind: LinkKind, id: String },

    #[error("No Spotify tracks matched '{0}'")]
    NoMatch(String),

    #[error("Spotify request failed: {0}")]
    Upstream(#[source] SpotifyError),
}

/// Result type for resolution operations.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

//! Classifies raw user input as a Spotify link or free-text search.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

use crate::commands::music::utils::errors::UnsupportedLinkError;

use super::youtube::YoutubeApi;

/// Host serving Spotify share links.
const SPOTIFY_HOST: &str = "open.spotify.com";

/// Regex to match and capture Spotify URIs such as `spotify:album:<id>`.
static SPOTIFY_URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^spotify:([a-z]+):([a-zA-Z0-9]+)$").unwrap());

/// The Spotify entity a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Track,
    Album,
    Playlist,
}

impl LinkKind {
    /// Maps a path keyword onto a kind. Anything that isn't a track or an album
    /// is looked up as a playlist.
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "track" => LinkKind::Track,
            "album" => LinkKind::Album,
            _ => LinkKind::Playlist,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkKind::Track => "track",
            LinkKind::Album => "album",
            LinkKind::Playlist => "playlist",
        })
    }
}

/// Coarse classification of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    FreeText,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    FreeText,
    Link { kind: LinkKind, id: String },
}

/// A classified user input. Link details exist only for links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    raw_input: String,
    target: Target,
}

impl MediaReference {
    pub fn free_text(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            target: Target::FreeText,
        }
    }

    pub fn link(raw_input: impl Into<String>, kind: LinkKind, id: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            target: Target::Link {
                kind,
                id: id.into(),
            },
        }
    }

    /// Classifies `input`.
    ///
    /// YouTube links are rejected outright. Spotify share links and URIs become
    /// `Link` references with the id taken verbatim from the path. Everything
    /// else is free text, kept exactly as typed.
    pub fn classify(input: &str) -> Result<Self, UnsupportedLinkError> {
        if YoutubeApi::is_youtube_url(input) {
            return Err(UnsupportedLinkError {
                link: input.to_string(),
            });
        }

        match spotify_identifiers(input.trim()) {
            Some((kind, id)) => Ok(Self::link(input, kind, id)),
            None => Ok(Self::free_text(input)),
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn kind(&self) -> ReferenceKind {
        match self.target {
            Target::FreeText => ReferenceKind::FreeText,
            Target::Link { .. } => ReferenceKind::Link,
        }
    }

    pub fn link_kind(&self) -> Option<LinkKind> {
        match &self.target {
            Target::Link { kind, .. } => Some(*kind),
            Target::FreeText => None,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match &self.target {
            Target::Link { id, .. } => Some(id),
            Target::FreeText => None,
        }
    }
}

/// Extracts `(kind, id)` from a Spotify share link or URI.
fn spotify_identifiers(input: &str) -> Option<(LinkKind, String)> {
    if let Some(captures) = SPOTIFY_URI_REGEX.captures(input) {
        let kind = LinkKind::from_keyword(captures.get(1)?.as_str());
        return Some((kind, captures.get(2)?.as_str().to_string()));
    }

    // Share links are often pasted without a scheme.
    let url = if input.starts_with(SPOTIFY_HOST) {
        Url::parse(&format!("https://{}", input)).ok()?
    } else {
        Url::parse(input).ok()?
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str() != Some(SPOTIFY_HOST) {
        return None;
    }

    // The id is the last segment and the keyword the one before it, which also
    // covers `intl-xx/` prefixes and legacy `user/<name>/playlist/<id>` paths.
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let [.., keyword, id] = segments.as_slice() else {
        return None;
    };

    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some((LinkKind::from_keyword(keyword), id.to_string()))
}

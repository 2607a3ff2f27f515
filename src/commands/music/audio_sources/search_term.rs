//! Defines `SearchTerm`, the "artist title" string handed to the playback queue.

use std::fmt;

/// A single playable-track search string of the form `"{artist} {title}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Builds a term from an artist and a title.
    /// Tracks with no credited artist fall back to the bare title.
    pub fn new(artist: Option<&str>, title: &str) -> Self {
        match artist {
            Some(artist) if !artist.is_empty() => Self(format!("{} {}", artist, title)),
            _ => Self(title.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

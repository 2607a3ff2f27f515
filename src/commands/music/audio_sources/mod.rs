//! This module covers where tracks come from: classifying user input, the
//! Spotify client that expands links, and the search terms they become.

/// Submodule classifying raw input into a `MediaReference`.
pub mod media_reference;
/// Submodule defining `SearchTerm`, the unit handed to the playback queue.
pub mod search_term;
/// Submodule implementing the `MusicPlatformClient` trait for Spotify.
pub mod spotify;
/// Submodule recognizing YouTube links, which are rejected.
pub mod youtube;

pub use media_reference::{LinkKind, MediaReference, ReferenceKind};
pub use search_term::SearchTerm;

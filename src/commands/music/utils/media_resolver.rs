//! Expands a classified `MediaReference` into the ordered search terms the
//! playback queue consumes.

use std::sync::Arc;
use tracing::{debug, info};

use crate::commands::music::audio_sources::spotify::{MusicPlatformClient, SpotifyError};
use crate::commands::music::audio_sources::{LinkKind, MediaReference, ReferenceKind, SearchTerm};

use super::errors::{ResolutionError, ResolutionResult};

/// Resolves references against a music platform client.
pub struct MediaResolver<C> {
    client: Arc<C>,
}

impl<C: MusicPlatformClient> MediaResolver<C> {
    /// The client should already be authenticated.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Classifies `input` and resolves it.
    /// YouTube links fail here without any request being made.
    pub async fn resolve_input(&self, input: &str) -> ResolutionResult<Vec<SearchTerm>> {
        let reference = MediaReference::classify(input)?;
        self.resolve(&reference).await
    }

    /// Resolves a reference into search terms, in platform order.
    ///
    /// Albums credit every track to the album's primary artist, while playlists
    /// credit each track's own primary artist. Free text yields the single best
    /// search hit, or `ResolutionError::NoMatch` when there is none.
    pub async fn resolve(&self, reference: &MediaReference) -> ResolutionResult<Vec<SearchTerm>> {
        let terms = match (reference.kind(), reference.link_kind(), reference.entity_id()) {
            (ReferenceKind::Link, Some(LinkKind::Track), Some(id)) => self.resolve_track(id).await?,
            (ReferenceKind::Link, Some(LinkKind::Album), Some(id)) => self.resolve_album(id).await?,
            (ReferenceKind::Link, Some(LinkKind::Playlist), Some(id)) => {
                self.resolve_playlist(id).await?
            }
            _ => self.resolve_search(reference.raw_input()).await?,
        };

        info!(
            "Resolved '{}' into {} search terms",
            reference.raw_input(),
            terms.len()
        );
        Ok(terms)
    }

    async fn resolve_track(&self, id: &str) -> ResolutionResult<Vec<SearchTerm>> {
        let track = self
            .client
            .get_track(id)
            .await
            .map_err(|e| lookup_error(LinkKind::Track, id, e))?;

        Ok(vec![SearchTerm::new(track.primary_artist(), &track.name)])
    }

    async fn resolve_album(&self, id: &str) -> ResolutionResult<Vec<SearchTerm>> {
        let album = self
            .client
            .get_album(id)
            .await
            .map_err(|e| lookup_error(LinkKind::Album, id, e))?;

        let artist = album.primary_artist();
        Ok(album
            .tracks
            .iter()
            .map(|track| SearchTerm::new(artist, &track.name))
            .collect())
    }

    async fn resolve_playlist(&self, id: &str) -> ResolutionResult<Vec<SearchTerm>> {
        let playlist = self
            .client
            .get_playlist(id)
            .await
            .map_err(|e| lookup_error(LinkKind::Playlist, id, e))?;

        Ok(playlist
            .tracks
            .iter()
            .map(|track| SearchTerm::new(track.primary_artist(), &track.name))
            .collect())
    }

    async fn resolve_search(&self, query: &str) -> ResolutionResult<Vec<SearchTerm>> {
        if query.trim().is_empty() {
            return Err(ResolutionError::NoMatch(query.to_string()));
        }

        let results = self
            .client
            .search(query, 1)
            .await
            .map_err(ResolutionError::Upstream)?;

        match results.first() {
            Some(track) => Ok(vec![SearchTerm::new(track.primary_artist(), &track.name)]),
            None => {
                debug!("Search for '{}' returned no tracks", query);
                Err(ResolutionError::NoMatch(query.to_string()))
            }
        }
    }
}

/// Maps a client failure for a specific entity onto a resolution error.
fn lookup_error(kind: LinkKind, id: &str, error: SpotifyError) -> ResolutionError {
    match error {
        SpotifyError::NotFound => ResolutionError::NotFound {
            kind,
            id: id.to_string(),
        },
        other => ResolutionError::Upstream(other),
    }
}

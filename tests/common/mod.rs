//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use ckbot::commands::music::audio_sources::spotify::{
    MusicPlatformClient, SpotifyAlbum, SpotifyArtist, SpotifyCredentials, SpotifyError,
    SpotifyPlaylist, SpotifyResult, SpotifyTrack,
};
use serenity::async_trait;

pub fn credentials() -> SpotifyCredentials {
    SpotifyCredentials {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        redirect_uri: None,
        scope: None,
        username: None,
    }
}

pub fn track(artist: &str, name: &str) -> SpotifyTrack {
    SpotifyTrack::new(artist, name)
}

pub fn album(artist: &str, tracks: Vec<SpotifyTrack>) -> SpotifyAlbum {
    SpotifyAlbum {
        name: "Test Album".to_string(),
        artists: vec![SpotifyArtist {
            name: artist.to_string(),
        }],
        tracks,
    }
}

/// In-memory catalogue that counts every lookup it serves.
/// Unknown ids answer with `SpotifyError::NotFound`.
#[derive(Default)]
pub struct StubSpotify {
    pub tracks: HashMap<String, SpotifyTrack>,
    pub albums: HashMap<String, SpotifyAlbum>,
    pub playlists: HashMap<String, SpotifyPlaylist>,
    pub search_results: Vec<SpotifyTrack>,
    calls: AtomicUsize,
    searches: AtomicUsize,
}

impl StubSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, id: &str, track: SpotifyTrack) -> Self {
        self.tracks.insert(id.to_string(), track);
        self
    }

    pub fn with_album(mut self, id: &str, album: SpotifyAlbum) -> Self {
        self.albums.insert(id.to_string(), album);
        self
    }

    pub fn with_playlist(mut self, id: &str, tracks: Vec<SpotifyTrack>) -> Self {
        self.playlists
            .insert(id.to_string(), SpotifyPlaylist { tracks });
        self
    }

    pub fn with_search_results(mut self, results: Vec<SpotifyTrack>) -> Self {
        self.search_results = results;
        self
    }

    /// Total number of requests made, searches included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn lookup<T: Clone>(&self, map: &HashMap<String, T>, id: &str) -> SpotifyResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        map.get(id).cloned().ok_or(SpotifyError::NotFound)
    }
}

#[async_trait]
impl MusicPlatformClient for StubSpotify {
    async fn authenticate(&self) -> SpotifyResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("stub-token".to_string())
    }

    async fn get_track(&self, track_id: &str) -> SpotifyResult<SpotifyTrack> {
        self.lookup(&self.tracks, track_id)
    }

    async fn get_album(&self, album_id: &str) -> SpotifyResult<SpotifyAlbum> {
        self.lookup(&self.albums, album_id)
    }

    async fn get_playlist(&self, playlist_id: &str) -> SpotifyResult<SpotifyPlaylist> {
        self.lookup(&self.playlists, playlist_id)
    }

    async fn search(&self, _query: &str, limit: u32) -> SpotifyResult<Vec<SpotifyTrack>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .search_results
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

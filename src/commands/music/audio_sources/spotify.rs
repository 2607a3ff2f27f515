//! Spotify Web API client used to expand links and searches into tracks.
//! Handles authentication (client credentials flow), pagination and response
//! validation so callers only ever see typed records.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serenity::async_trait;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

/// Base URL of the Spotify Web API.
const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
/// Base URL of the Spotify accounts service (token endpoint).
const SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
/// Largest page size the album tracks endpoint accepts.
const ALBUM_PAGE_LIMIT: u32 = 50;

/// Errors returned by the Spotify client.
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// The requested entity does not exist (HTTP 404).
    #[error("Resource not found")]
    NotFound,

    #[error("Spotify authentication failed: {0}")]
    Auth(String),

    #[error("Failed to reach Spotify: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Result type specific to Spotify API operations.
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Credentials and OAuth parameters for the Spotify application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    /// Only used by an interactive authorization flow.
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub username: Option<String>,
}

/// An artist credit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

/// A track as returned by the track, album, playlist and search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
}

impl SpotifyTrack {
    pub fn new(artist: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            artists: vec![SpotifyArtist {
                name: artist.to_string(),
            }],
        }
    }

    /// The first credited artist, if any.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

/// An album with its complete track listing, in album order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyAlbum {
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
    pub tracks: Vec<SpotifyTrack>,
}

impl SpotifyAlbum {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

/// The tracks of a playlist, in playlist order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpotifyPlaylist {
    pub tracks: Vec<SpotifyTrack>,
}

/// Interface to the music platform consumed by the resolver.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MusicPlatformClient: Send + Sync {
    /// Obtains (or reuses) an access token.
    async fn authenticate(&self) -> SpotifyResult<String>;

    async fn get_track(&self, track_id: &str) -> SpotifyResult<SpotifyTrack>;

    /// Fetches an album and every page of its track listing.
    async fn get_album(&self, album_id: &str) -> SpotifyResult<SpotifyAlbum>;

    /// Fetches only the `tracks` field of a playlist, following every page.
    async fn get_playlist(&self, playlist_id: &str) -> SpotifyResult<SpotifyPlaylist>;

    /// Searches tracks, best match first.
    async fn search(&self, query: &str, limit: u32) -> SpotifyResult<Vec<SpotifyTrack>>;
}

/// Response from Spotify's token endpoint.
#[derive(Debug, Deserialize)]
struct SpotifyToken {
    /// The OAuth2 access token.
    access_token: String,
    /// The duration in seconds for which the token is valid.
    expires_in: u64,
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    fn is_expired(&self) -> bool {
        let expiry = Duration::from_secs(self.expires_in);
        let elapsed = self.created_at.elapsed();
        // Consider it expired 30 seconds before actual expiry
        elapsed > expiry.saturating_sub(Duration::from_secs(30))
    }
}

/// One page of a paginated listing.
#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumResponse {
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    tracks: Paging<SpotifyTrack>,
}

/// Playlist requested with `fields=tracks`.
#[derive(Debug, Deserialize)]
struct PlaylistTracksResponse {
    tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    /// `null` for tracks that were removed or are local files.
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Paging<SpotifyTrack>,
}

/// Live client for the Spotify Web API.
pub struct SpotifyApi {
    http: reqwest::Client,
    credentials: SpotifyCredentials,
    api_url: String,
    accounts_url: String,
    token: Mutex<Option<SpotifyToken>>,
}

impl SpotifyApi {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_base_urls(credentials, SPOTIFY_API_URL, SPOTIFY_ACCOUNTS_URL)
    }

    /// Creates a client against custom endpoints (used to point at a mock server).
    pub fn with_base_urls(
        credentials: SpotifyCredentials,
        api_url: impl Into<String>,
        accounts_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            api_url: api_url.into(),
            accounts_url: accounts_url.into(),
            token: Mutex::new(None),
        }
    }

    /// Returns the cached token, requesting a new one through the client
    /// credentials flow when it is missing or about to expire.
    async fn access_token(&self) -> SpotifyResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = &*token_lock {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting new Spotify access token");
        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let params = [("grant_type", "client_credentials")];
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(SpotifyError::Auth(format!("{} - {}", status, text)));
        }

        let token = response
            .json::<SpotifyToken>()
            .await
            .map_err(|e| SpotifyError::Auth(format!("Failed to parse Spotify token: {}", e)))?;

        let access_token = token.access_token.clone();
        *token_lock = Some(token);

        Ok(access_token)
    }

    /// Sends an authorized GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> SpotifyResult<T> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(url)
            .query(query)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SpotifyError::NotFound);
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Walks the `next` links of a listing, appending every item in order.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: Paging<T>,
        items: &mut Vec<T>,
    ) -> SpotifyResult<()> {
        let mut next = first.next;
        items.extend(first.items);

        while let Some(url) = next {
            debug!("Following Spotify page {}", url);
            let page: Paging<T> = self.get_json(&url, &[]).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(())
    }
}

#[async_trait]
impl MusicPlatformClient for SpotifyApi {
    async fn authenticate(&self) -> SpotifyResult<String> {
        let token = self.access_token().await?;
        info!("Authenticated with Spotify as client {}", self.credentials.client_id);
        Ok(token)
    }

    async fn get_track(&self, track_id: &str) -> SpotifyResult<SpotifyTrack> {
        debug!("Loading track {}", track_id);
        self.get_json(&format!("{}/tracks/{}", self.api_url, track_id), &[])
            .await
    }

    async fn get_album(&self, album_id: &str) -> SpotifyResult<SpotifyAlbum> {
        debug!("Loading album {}", album_id);
        let limit = ALBUM_PAGE_LIMIT.to_string();
        let album: AlbumResponse = self
            .get_json(
                &format!("{}/albums/{}", self.api_url, album_id),
                &[("limit", limit.as_str())],
            )
            .await?;

        let mut tracks = Vec::new();
        self.collect_pages(album.tracks, &mut tracks).await?;

        Ok(SpotifyAlbum {
            name: album.name,
            artists: album.artists,
            tracks,
        })
    }

    async fn get_playlist(&self, playlist_id: &str) -> SpotifyResult<SpotifyPlaylist> {
        debug!("Loading playlist {}", playlist_id);
        let playlist: PlaylistTracksResponse = self
            .get_json(
                &format!("{}/playlists/{}", self.api_url, playlist_id),
                &[("fields", "tracks")],
            )
            .await?;

        let mut items = Vec::new();
        self.collect_pages(playlist.tracks, &mut items).await?;

        let total = items.len();
        let tracks: Vec<SpotifyTrack> = items.into_iter().filter_map(|item| item.track).collect();
        if tracks.len() < total {
            debug!(
                "Skipped {} unavailable entries in playlist {}",
                total - tracks.len(),
                playlist_id
            );
        }

        Ok(SpotifyPlaylist { tracks })
    }

    async fn search(&self, query: &str, limit: u32) -> SpotifyResult<Vec<SpotifyTrack>> {
        debug!("Searching Spotify for '{}'", query);
        let limit = limit.to_string();
        let response: SearchResponse = self
            .get_json(
                &format!("{}/search", self.api_url),
                &[("q", query), ("type", "track"), ("limit", limit.as_str())],
            )
            .await?;

        Ok(response.tracks.items)
    }
}

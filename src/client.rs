//! HTTP client for the playlist API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::models::{
    ArchiveRequest, ErrorMessage, Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack,
    SkippedTrackHistory, SkippedTrackRequest, SpotifyTrack,
};
use crate::tabs::PlaylistDataSource;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    server: String,
    spotify_tracks: Option<PathBuf>,
}

impl ApiClient {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server: server.into().trim_end_matches('/').to_string(),
            spotify_tracks: None,
        }
    }

    /// Serve Spotify tracks from an already-fetched JSON file
    pub fn with_spotify_tracks(mut self, path: impl Into<PathBuf>) -> Self {
        self.spotify_tracks = Some(path.into());
        self
    }

    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        self.get_json("/playlists").await
    }

    pub async fn get_playlist(&self, id: &str) -> Result<Playlist> {
        self.get_json(&format!("/playlists/{}", id)).await
    }

    pub async fn create_playlist(&self, request: &PlaylistRequest) -> Result<Playlist> {
        self.send_json(self.http.post(self.url("/playlists")), request)
            .await
    }

    pub async fn update_playlist(
        &self,
        id: &str,
        update: &PlaylistUpdateRequest,
    ) -> Result<Playlist> {
        self.send_json(self.http.put(self.url(&format!("/playlists/{}", id))), update)
            .await
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/playlists/{}", id)))
            .send()
            .await
            .context("Failed to connect to server")?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn get_skipped_tracks(&self, id: &str) -> Result<Vec<SkippedTrack>> {
        self.get_json(&format!("/playlists/{}/skipped-tracks", id))
            .await
    }

    pub async fn get_skipped_track_history(&self, id: &str) -> Result<Vec<SkippedTrackHistory>> {
        self.get_json(&format!("/playlists/{}/skipped-tracks/history", id))
            .await
    }

    pub async fn record_skip(&self, id: &str, request: &SkippedTrackRequest) -> Result<SkippedTrack> {
        let url = self.url(&format!("/playlists/{}/skipped-tracks", id));
        self.send_json(self.http.post(url), request).await
    }

    pub async fn archive_skipped_tracks(
        &self,
        id: &str,
        request: &ArchiveRequest,
    ) -> Result<Vec<SkippedTrackHistory>> {
        let url = self.url(&format!("/playlists/{}/skipped-tracks/archive", id));
        self.send_json(self.http.post(url), request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .context("Failed to connect to server")?;

        check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    async fn send_json<B, T>(&self, request: reqwest::RequestBuilder, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = request
            .json(body)
            .send()
            .await
            .context("Failed to connect to server")?;

        check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }
}

/// Turn non-success responses into errors carrying the server's message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ErrorMessage>().await {
        Ok(error) => anyhow::bail!("{} ({})", error.message, status),
        Err(_) => anyhow::bail!("Server returned error: {}", status),
    }
}

#[async_trait]
impl PlaylistDataSource for ApiClient {
    async fn skipped_tracks(&self, playlist_id: &str) -> Result<Vec<SkippedTrack>> {
        self.get_skipped_tracks(playlist_id).await
    }

    async fn skipped_track_history(&self, playlist_id: &str) -> Result<Vec<SkippedTrackHistory>> {
        self.get_skipped_track_history(playlist_id).await
    }

    async fn spotify_tracks(&self, _playlist_id: &str) -> Result<Vec<SpotifyTrack>> {
        let Some(path) = &self.spotify_tracks else {
            return Ok(Vec::new());
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read Spotify tracks: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse Spotify tracks: {}", path.display()))
    }

    async fn delete_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<Vec<SkippedTrackHistory>> {
        let request = ArchiveRequest {
            track_ids: track_ids.to_vec(),
        };
        self.archive_skipped_tracks(playlist_id, &request).await
    }
}

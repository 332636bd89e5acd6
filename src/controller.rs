//! Existence-checked orchestration over a [`PlaylistStore`].
//!
//! Every id-scoped operation first looks the playlist up and reports
//! [`ApiError::PlaylistNotFound`] before touching anything else. Creation
//! reports [`ApiError::PlaylistAlreadyExists`] instead of calling the store.
//! The lookup and the action are separate store calls with no transaction
//! between them.

use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::models::{
    ArchiveRequest, Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack,
    SkippedTrackHistory, SkippedTrackRequest,
};
use crate::store::PlaylistStore;

#[derive(Clone)]
pub struct DataController {
    store: Arc<dyn PlaylistStore>,
}

impl DataController {
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self { store }
    }

    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.store.get_playlists().await?)
    }

    pub async fn get_playlist(&self, id: &str) -> Result<Playlist> {
        self.require_playlist(id).await
    }

    pub async fn create_playlist(&self, request: PlaylistRequest) -> Result<Playlist> {
        if self.store.get_playlist(&request.id).await?.is_some() {
            tracing::warn!("Playlist {} already exists", request.id);
            return Err(ApiError::PlaylistAlreadyExists(request.id));
        }

        Ok(self.store.add_playlist(request).await?)
    }

    pub async fn update_playlist(
        &self,
        id: &str,
        update: PlaylistUpdateRequest,
    ) -> Result<Playlist> {
        self.require_playlist(id).await?;

        // Deleted between the two calls
        self.store
            .update_playlist(id, update)
            .await?
            .ok_or_else(|| ApiError::PlaylistNotFound(id.to_string()))
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<()> {
        self.require_playlist(id).await?;
        Ok(self.store.delete_playlist(id).await?)
    }

    pub async fn skipped_tracks(&self, id: &str) -> Result<Vec<SkippedTrack>> {
        self.require_playlist(id).await?;
        Ok(self.store.get_playlist_skipped_tracks(id).await?)
    }

    pub async fn skipped_track_history(&self, id: &str) -> Result<Vec<SkippedTrackHistory>> {
        self.require_playlist(id).await?;
        Ok(self.store.get_playlist_skipped_track_history(id).await?)
    }

    pub async fn record_skip(&self, id: &str, request: SkippedTrackRequest) -> Result<SkippedTrack> {
        self.require_playlist(id).await?;
        Ok(self.store.add_skipped_track(id, request).await?)
    }

    pub async fn archive_skipped_tracks(
        &self,
        id: &str,
        request: ArchiveRequest,
    ) -> Result<Vec<SkippedTrackHistory>> {
        self.require_playlist(id).await?;
        Ok(self
            .store
            .archive_skipped_tracks(id, &request.track_ids)
            .await?)
    }

    async fn require_playlist(&self, id: &str) -> Result<Playlist> {
        self.store.get_playlist(id).await?.ok_or_else(|| {
            tracing::warn!("Playlist {} not found", id);
            ApiError::PlaylistNotFound(id.to_string())
        })
    }
}

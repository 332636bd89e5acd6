//! Persistence-facing capability set consumed by the data controller.
//!
//! Two adapters implement [`PlaylistStore`]: [`crate::database::PlaylistDatabase`]
//! backed by SQLite and [`crate::memory::MemoryPlaylistStore`] for tests and
//! throwaway runs.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack, SkippedTrackHistory,
    SkippedTrackRequest,
};

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// All playlists ordered by id
    async fn get_playlists(&self) -> Result<Vec<Playlist>>;

    /// `None` when no playlist has this id
    async fn get_playlist(&self, id: &str) -> Result<Option<Playlist>>;

    /// Persist a new playlist. Uniqueness is the caller's concern.
    async fn add_playlist(&self, request: PlaylistRequest) -> Result<Playlist>;

    /// Apply a partial update, `None` when the playlist does not exist
    async fn update_playlist(
        &self,
        id: &str,
        update: PlaylistUpdateRequest,
    ) -> Result<Option<Playlist>>;

    /// Remove a playlist together with its skipped tracks and history
    async fn delete_playlist(&self, id: &str) -> Result<()>;

    /// Skip events ordered by skipped date, then track id
    async fn get_playlist_skipped_tracks(&self, id: &str) -> Result<Vec<SkippedTrack>>;

    async fn get_playlist_skipped_track_history(
        &self,
        id: &str,
    ) -> Result<Vec<SkippedTrackHistory>>;

    /// Record one skip event. Recording the same event twice is a no-op.
    async fn add_skipped_track(
        &self,
        playlist_id: &str,
        request: SkippedTrackRequest,
    ) -> Result<SkippedTrack>;

    /// Move every live skip event of `track_ids` into history
    async fn archive_skipped_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<Vec<SkippedTrackHistory>>;
}

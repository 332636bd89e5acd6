use anyhow::Result;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{
    Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack, SkippedTrackHistory,
    SkippedTrackRequest,
};
use crate::store::PlaylistStore;

#[derive(Default)]
struct MemoryState {
    playlists: BTreeMap<String, Playlist>,
    skipped_tracks: Vec<SkippedTrack>,
    history: Vec<SkippedTrackHistory>,
}

/// In-memory [`PlaylistStore`], nothing survives a restart
#[derive(Clone, Default)]
pub struct MemoryPlaylistStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already holding `playlists`
    pub fn with_playlists(playlists: impl IntoIterator<Item = Playlist>) -> Self {
        let state = MemoryState {
            playlists: playlists
                .into_iter()
                .map(|playlist| (playlist.id.clone(), playlist))
                .collect(),
            ..MemoryState::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl PlaylistStore for MemoryPlaylistStore {
    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.state.read().await.playlists.values().cloned().collect())
    }

    async fn get_playlist(&self, id: &str) -> Result<Option<Playlist>> {
        Ok(self.state.read().await.playlists.get(id).cloned())
    }

    async fn add_playlist(&self, request: PlaylistRequest) -> Result<Playlist> {
        let mut state = self.state.write().await;

        // Mirrors the primary key failure of the SQLite store
        if state.playlists.contains_key(&request.id) {
            anyhow::bail!("Playlist {} is already stored", request.id);
        }

        let playlist = Playlist::from(request);
        state
            .playlists
            .insert(playlist.id.clone(), playlist.clone());
        Ok(playlist)
    }

    async fn update_playlist(
        &self,
        id: &str,
        update: PlaylistUpdateRequest,
    ) -> Result<Option<Playlist>> {
        let mut state = self.state.write().await;
        Ok(state.playlists.get_mut(id).map(|playlist| {
            playlist.apply(update);
            playlist.clone()
        }))
    }

    async fn delete_playlist(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.playlists.remove(id);
        state.skipped_tracks.retain(|track| track.playlist_id != id);
        state.history.retain(|track| track.playlist_id != id);
        Ok(())
    }

    async fn get_playlist_skipped_tracks(&self, id: &str) -> Result<Vec<SkippedTrack>> {
        let state = self.state.read().await;
        let mut tracks: Vec<SkippedTrack> = state
            .skipped_tracks
            .iter()
            .filter(|track| track.playlist_id == id)
            .cloned()
            .collect();
        tracks.sort_by(|a, b| {
            a.skipped_date
                .cmp(&b.skipped_date)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });
        Ok(tracks)
    }

    async fn get_playlist_skipped_track_history(
        &self,
        id: &str,
    ) -> Result<Vec<SkippedTrackHistory>> {
        let state = self.state.read().await;
        let mut history: Vec<SkippedTrackHistory> = state
            .history
            .iter()
            .filter(|track| track.playlist_id == id)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            a.skipped_date
                .cmp(&b.skipped_date)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });
        Ok(history)
    }

    async fn add_skipped_track(
        &self,
        playlist_id: &str,
        request: SkippedTrackRequest,
    ) -> Result<SkippedTrack> {
        let mut state = self.state.write().await;

        if !state.playlists.contains_key(playlist_id) {
            anyhow::bail!("Playlist {} is not stored", playlist_id);
        }

        let track = SkippedTrack {
            track_id: request.track_id,
            playlist_id: playlist_id.to_string(),
            // Same microsecond precision the SQLite store keeps
            skipped_date: request
                .skipped_date
                .unwrap_or_else(Utc::now)
                .trunc_subsecs(6),
        };

        if !state.skipped_tracks.contains(&track) {
            state.skipped_tracks.push(track.clone());
        }
        Ok(track)
    }

    async fn archive_skipped_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<Vec<SkippedTrackHistory>> {
        let mut state = self.state.write().await;

        let (moved, kept): (Vec<SkippedTrack>, Vec<SkippedTrack>) =
            std::mem::take(&mut state.skipped_tracks)
                .into_iter()
                .partition(|track| {
                    track.playlist_id == playlist_id && track_ids.contains(&track.track_id)
                });
        state.skipped_tracks = kept;

        let mut archived: Vec<SkippedTrackHistory> =
            moved.into_iter().map(SkippedTrackHistory::from).collect();
        archived.sort_by(|a, b| {
            a.skipped_date
                .cmp(&b.skipped_date)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });

        for entry in &archived {
            if !state.history.contains(entry) {
                state.history.push(entry.clone());
            }
        }

        Ok(archived)
    }
}

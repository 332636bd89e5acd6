//! View state behind the playlist detail page.
//!
//! A [`PlaylistTabs`] holds three independently loaded sections (skipped
//! tracks, skipped-track history and Spotify tracks) and the state of the
//! delete-confirmation modal. Each section carries its own loading flag and
//! error so a slow or failing fetch never blocks the others.

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::models::{SkippedTrack, SkippedTrackHistory, SpotifyTrack};
use crate::table::Column;

/// Where the detail page gets its data from
#[async_trait]
pub trait PlaylistDataSource: Send + Sync {
    async fn skipped_tracks(&self, playlist_id: &str) -> Result<Vec<SkippedTrack>>;

    async fn skipped_track_history(&self, playlist_id: &str) -> Result<Vec<SkippedTrackHistory>>;

    async fn spotify_tracks(&self, playlist_id: &str) -> Result<Vec<SpotifyTrack>>;

    /// Archive the skip events of `track_ids`, returning the history created
    async fn delete_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<Vec<SkippedTrackHistory>>;
}

#[derive(Debug, Clone)]
pub struct Section<T> {
    pub loading: bool,
    pub items: Vec<T>,
    pub error: Option<String>,
    pub columns: Vec<Column>,
    empty_message: &'static str,
}

impl<T> Section<T> {
    fn new(columns: Vec<Column>, empty_message: &'static str) -> Self {
        Self {
            loading: true,
            items: Vec::new(),
            error: None,
            columns,
            empty_message,
        }
    }

    fn finish(&mut self, result: Result<Vec<T>>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                self.items.clear();
                self.error = Some(format!("{:#}", e));
            }
        }
    }

    /// Whether the table should be drawn (still loading, or has rows)
    pub fn shows_table(&self) -> bool {
        self.loading || !self.items.is_empty()
    }

    /// Placeholder text once loading finished without rows
    pub fn empty_message(&self) -> Option<&'static str> {
        (!self.loading && self.items.is_empty()).then_some(self.empty_message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteModal {
    pub open: bool,
    pub saving: bool,
    pub error: Option<String>,
    pub track_ids: Vec<String>,
}

pub fn skipped_track_columns() -> Vec<Column> {
    vec![
        Column::sortable("Track", "trackId"),
        Column::sortable("Skipped", "skippedDate"),
    ]
}

pub fn skipped_track_history_columns() -> Vec<Column> {
    vec![
        Column::sortable("Track", "trackId"),
        Column::sortable("Skipped", "skippedDate"),
    ]
}

pub fn spotify_track_columns() -> Vec<Column> {
    vec![
        Column::fixed("", "image"),
        Column::sortable("Title", "title"),
        Column::sortable("Artist", "artist"),
        Column::sortable("Album", "album"),
        Column::sortable("Duration", "duration"),
    ]
}

enum Fetched {
    SkippedTracks(Result<Vec<SkippedTrack>>),
    SkippedTrackHistory(Result<Vec<SkippedTrackHistory>>),
    SpotifyTracks(Result<Vec<SpotifyTrack>>),
}

#[derive(Debug, Clone)]
pub struct PlaylistTabs {
    pub id: String,
    pub skipped_tracks: Section<SkippedTrack>,
    pub skipped_track_history: Section<SkippedTrackHistory>,
    pub spotify_tracks: Section<SpotifyTrack>,
    pub delete: DeleteModal,
}

impl PlaylistTabs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skipped_tracks: Section::new(skipped_track_columns(), "No skipped tracks found."),
            skipped_track_history: Section::new(
                skipped_track_history_columns(),
                "No skipped tracks found.",
            ),
            spotify_tracks: Section::new(spotify_track_columns(), "No Spotify tracks found."),
            delete: DeleteModal::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.skipped_tracks.loading
            || self.skipped_track_history.loading
            || self.spotify_tracks.loading
    }

    pub async fn load(&mut self, source: &dyn PlaylistDataSource) {
        self.load_with(source, |_| {}).await
    }

    /// Run the three fetches concurrently, applying each result to its
    /// section as soon as it arrives and calling `on_update` after each one.
    pub async fn load_with<F>(&mut self, source: &dyn PlaylistDataSource, mut on_update: F)
    where
        F: FnMut(&PlaylistTabs),
    {
        self.skipped_tracks.loading = true;
        self.skipped_track_history.loading = true;
        self.spotify_tracks.loading = true;

        let id = self.id.clone();
        let mut pending: FuturesUnordered<BoxFuture<'_, Fetched>> = FuturesUnordered::new();
        pending.push(
            source
                .skipped_tracks(&id)
                .map(Fetched::SkippedTracks)
                .boxed(),
        );
        pending.push(
            source
                .skipped_track_history(&id)
                .map(Fetched::SkippedTrackHistory)
                .boxed(),
        );
        pending.push(
            source
                .spotify_tracks(&id)
                .map(Fetched::SpotifyTracks)
                .boxed(),
        );

        while let Some(fetched) = pending.next().await {
            match fetched {
                Fetched::SkippedTracks(result) => {
                    if let Err(e) = &result {
                        tracing::warn!("Failed to load skipped tracks for {}: {:#}", id, e);
                    }
                    self.skipped_tracks.finish(result);
                }
                Fetched::SkippedTrackHistory(result) => {
                    if let Err(e) = &result {
                        tracing::warn!("Failed to load skipped track history for {}: {:#}", id, e);
                    }
                    self.skipped_track_history.finish(result);
                }
                Fetched::SpotifyTracks(result) => {
                    if let Err(e) = &result {
                        tracing::warn!("Failed to load Spotify tracks for {}: {:#}", id, e);
                    }
                    self.spotify_tracks.finish(result);
                }
            }
            on_update(self);
        }
    }

    pub fn open_delete(&mut self, track_ids: Vec<String>) {
        if self.delete.saving {
            return;
        }
        self.delete = DeleteModal {
            open: true,
            saving: false,
            error: None,
            track_ids,
        };
    }

    /// Close the modal unless a deletion is in flight
    pub fn close_delete(&mut self) {
        if self.delete.saving {
            return;
        }
        self.delete.open = false;
        self.delete.error = None;
    }

    pub async fn submit_delete(&mut self, source: &dyn PlaylistDataSource) -> bool {
        self.submit_delete_with(source, |_| {}).await
    }

    /// Delete the tracks pending in the modal.
    ///
    /// `on_update` runs once the modal enters the saving state and again
    /// after it leaves it. Returns `true` when the deletion went through.
    /// Ignored (returns `false`) when the modal is closed or a deletion is
    /// already running.
    pub async fn submit_delete_with<F>(
        &mut self,
        source: &dyn PlaylistDataSource,
        mut on_update: F,
    ) -> bool
    where
        F: FnMut(&PlaylistTabs),
    {
        let Some(track_ids) = self.begin_delete() else {
            return false;
        };
        on_update(self);

        let result = source.delete_tracks(&self.id, &track_ids).await;
        let deleted = self.finish_delete(result);
        on_update(self);

        deleted
    }

    /// Enter the saving state, handing out the track ids to delete.
    ///
    /// `None` when the modal is closed or a deletion is already in flight.
    pub fn begin_delete(&mut self) -> Option<Vec<String>> {
        if !self.delete.open || self.delete.saving {
            return None;
        }

        self.delete.saving = true;
        self.delete.error = None;
        Some(self.delete.track_ids.clone())
    }

    /// Apply the outcome of a deletion started with [`Self::begin_delete`].
    ///
    /// On success the modal closes, the archived skip events leave the
    /// skipped-track section and join the history section. On failure the
    /// modal stays open with the error so the user can retry.
    pub fn finish_delete(&mut self, result: Result<Vec<SkippedTrackHistory>>) -> bool {
        if !self.delete.saving {
            return false;
        }
        self.delete.saving = false;

        match result {
            Ok(archived) => {
                let deleted = std::mem::take(&mut self.delete.track_ids);
                self.skipped_tracks
                    .items
                    .retain(|track| !deleted.contains(&track.track_id));

                let history = &mut self.skipped_track_history.items;
                for entry in archived {
                    if !history.contains(&entry) {
                        history.push(entry);
                    }
                }
                history.sort_by(|a, b| {
                    a.skipped_date
                        .cmp(&b.skipped_date)
                        .then_with(|| a.track_id.cmp(&b.track_id))
                });

                self.delete.open = false;
                tracing::debug!("Deleted {} tracks from playlist {}", deleted.len(), self.id);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete tracks from playlist {}: {:#}", self.id, e);
                self.delete.error = Some(format!("{:#}", e));
                false
            }
        }
    }
}

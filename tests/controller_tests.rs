use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use playlist_janitor::controller::DataController;
use playlist_janitor::error::ApiError;
use playlist_janitor::memory::MemoryPlaylistStore;
use playlist_janitor::models::{
    ArchiveRequest, Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack,
    SkippedTrackHistory, SkippedTrackRequest,
};
use playlist_janitor::store::PlaylistStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper counting calls per operation
#[derive(Default)]
struct CountingStore {
    inner: MemoryPlaylistStore,
    added: Option<Playlist>,
    get_playlist_calls: AtomicUsize,
    add_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    skipped_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl CountingStore {
    fn with_playlists(playlists: impl IntoIterator<Item = Playlist>) -> Self {
        Self {
            inner: MemoryPlaylistStore::with_playlists(playlists),
            ..Self::default()
        }
    }

    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistStore for CountingStore {
    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        self.inner.get_playlists().await
    }

    async fn get_playlist(&self, id: &str) -> Result<Option<Playlist>> {
        self.get_playlist_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_playlist(id).await
    }

    async fn add_playlist(&self, request: PlaylistRequest) -> Result<Playlist> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        match &self.added {
            Some(playlist) => Ok(playlist.clone()),
            None => self.inner.add_playlist(request).await,
        }
    }

    async fn update_playlist(
        &self,
        id: &str,
        update: PlaylistUpdateRequest,
    ) -> Result<Option<Playlist>> {
        self.inner.update_playlist(id, update).await
    }

    async fn delete_playlist(&self, id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_playlist(id).await
    }

    async fn get_playlist_skipped_tracks(&self, id: &str) -> Result<Vec<SkippedTrack>> {
        self.skipped_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_playlist_skipped_tracks(id).await
    }

    async fn get_playlist_skipped_track_history(
        &self,
        id: &str,
    ) -> Result<Vec<SkippedTrackHistory>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_playlist_skipped_track_history(id).await
    }

    async fn add_skipped_track(
        &self,
        playlist_id: &str,
        request: SkippedTrackRequest,
    ) -> Result<SkippedTrack> {
        self.inner.add_skipped_track(playlist_id, request).await
    }

    async fn archive_skipped_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<Vec<SkippedTrackHistory>> {
        self.inner.archive_skipped_tracks(playlist_id, track_ids).await
    }
}

fn playlist(id: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        skip_threshold: Some(30),
        ignore_initial_skips: true,
        auto_cleanup_limit: Some(3),
    }
}

fn controller(store: &Arc<CountingStore>) -> DataController {
    DataController::new(store.clone())
}

#[tokio::test]
async fn test_list_playlists_returns_store_playlists() {
    let store = Arc::new(CountingStore::with_playlists([playlist("b"), playlist("a")]));

    let playlists = controller(&store).list_playlists().await.unwrap();

    assert_eq!(playlists, vec![playlist("a"), playlist("b")]);
}

#[tokio::test]
async fn test_list_playlists_empty_store() {
    let store = Arc::new(CountingStore::default());

    let playlists = controller(&store).list_playlists().await.unwrap();

    assert!(playlists.is_empty());
}

#[tokio::test]
async fn test_get_playlist_returns_playlist() {
    let store = Arc::new(CountingStore::with_playlists([playlist("abc")]));

    let found = controller(&store).get_playlist("abc").await.unwrap();

    assert_eq!(found, playlist("abc"));
    assert_eq!(CountingStore::count(&store.get_playlist_calls), 1);
}

#[tokio::test]
async fn test_get_playlist_not_found() {
    let store = Arc::new(CountingStore::default());

    let err = controller(&store).get_playlist("xyz").await.unwrap_err();

    assert!(matches!(err, ApiError::PlaylistNotFound(ref id) if id == "xyz"));
    assert_eq!(err.to_string(), "Could not find playlist with id: xyz");
    assert_eq!(CountingStore::count(&store.get_playlist_calls), 1);
}

#[tokio::test]
async fn test_create_playlist_calls_add_once_and_returns_its_result() {
    let stored = playlist("from-store");
    let store = Arc::new(CountingStore {
        added: Some(stored.clone()),
        ..CountingStore::default()
    });

    let created = controller(&store)
        .create_playlist(PlaylistRequest::new("abc"))
        .await
        .unwrap();

    assert_eq!(created, stored);
    assert_eq!(CountingStore::count(&store.get_playlist_calls), 1);
    assert_eq!(CountingStore::count(&store.add_calls), 1);
}

#[tokio::test]
async fn test_create_playlist_already_exists() {
    let store = Arc::new(CountingStore::with_playlists([playlist("abc")]));

    let err = controller(&store)
        .create_playlist(PlaylistRequest::new("abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::PlaylistAlreadyExists(_)));
    assert_eq!(err.to_string(), "Playlist with id: abc already exists");
    assert_eq!(CountingStore::count(&store.add_calls), 0);
}

#[tokio::test]
async fn test_delete_playlist_removes_playlist() {
    let store = Arc::new(CountingStore::with_playlists([playlist("abc")]));

    controller(&store).delete_playlist("abc").await.unwrap();

    assert_eq!(CountingStore::count(&store.delete_calls), 1);
    assert!(store.inner.get_playlist("abc").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_playlist_not_found() {
    let store = Arc::new(CountingStore::default());

    let err = controller(&store).delete_playlist("id").await.unwrap_err();

    assert_eq!(err.to_string(), "Could not find playlist with id: id");
    assert_eq!(CountingStore::count(&store.delete_calls), 0);
}

#[tokio::test]
async fn test_skipped_tracks_returns_store_tracks() {
    let store = Arc::new(CountingStore::with_playlists([playlist("id")]));
    let skipped_date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    for track_id in ["t1", "t2"] {
        store
            .inner
            .add_skipped_track(
                "id",
                SkippedTrackRequest {
                    track_id: track_id.to_string(),
                    skipped_date: Some(skipped_date),
                },
            )
            .await
            .unwrap();
    }

    let tracks = controller(&store).skipped_tracks("id").await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].track_id, "t1");
    assert_eq!(tracks[1].track_id, "t2");
    assert_eq!(CountingStore::count(&store.skipped_calls), 1);
}

#[tokio::test]
async fn test_skipped_tracks_empty_for_known_playlist() {
    let store = Arc::new(CountingStore::with_playlists([playlist("id")]));

    let tracks = controller(&store).skipped_tracks("id").await.unwrap();

    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_skipped_tracks_not_found() {
    let store = Arc::new(CountingStore::default());

    let err = controller(&store).skipped_tracks("id").await.unwrap_err();

    assert_eq!(err.to_string(), "Could not find playlist with id: id");
    assert_eq!(CountingStore::count(&store.get_playlist_calls), 1);
    assert_eq!(CountingStore::count(&store.skipped_calls), 0);
}

#[tokio::test]
async fn test_skipped_track_history_not_found() {
    let store = Arc::new(CountingStore::default());

    let err = controller(&store)
        .skipped_track_history("gone")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::PlaylistNotFound(_)));
    assert_eq!(CountingStore::count(&store.history_calls), 0);
}

#[tokio::test]
async fn test_update_playlist_changes_only_supplied_fields() {
    let store = Arc::new(CountingStore::with_playlists([playlist("abc")]));

    let updated = controller(&store)
        .update_playlist(
            "abc",
            PlaylistUpdateRequest {
                auto_cleanup_limit: Some(10),
                ..PlaylistUpdateRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.auto_cleanup_limit, Some(10));
    assert_eq!(updated.skip_threshold, Some(30));
    assert!(updated.ignore_initial_skips);
}

#[tokio::test]
async fn test_update_playlist_not_found() {
    let store = Arc::new(CountingStore::default());

    let err = controller(&store)
        .update_playlist("abc", PlaylistUpdateRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::PlaylistNotFound(_)));
}

#[tokio::test]
async fn test_record_and_archive_skips() {
    let store = Arc::new(CountingStore::with_playlists([playlist("abc")]));
    let controller = controller(&store);

    controller
        .record_skip(
            "abc",
            SkippedTrackRequest {
                track_id: "t1".to_string(),
                skipped_date: None,
            },
        )
        .await
        .unwrap();

    let archived = controller
        .archive_skipped_tracks(
            "abc",
            ArchiveRequest {
                track_ids: vec!["t1".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(archived.len(), 1);
    assert!(controller.skipped_tracks("abc").await.unwrap().is_empty());
    assert_eq!(controller.skipped_track_history("abc").await.unwrap(), archived);
}

#[tokio::test]
async fn test_record_skip_not_found() {
    let store = Arc::new(CountingStore::default());

    let err = controller(&store)
        .record_skip(
            "abc",
            SkippedTrackRequest {
                track_id: "t1".to_string(),
                skipped_date: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::PlaylistNotFound(_)));
}

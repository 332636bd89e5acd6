use chrono::{Duration, TimeZone, Utc};
use playlist_janitor::memory::MemoryPlaylistStore;
use playlist_janitor::models::{PlaylistRequest, SkippedTrackRequest};
use playlist_janitor::store::PlaylistStore;

fn skip(track_id: &str, minutes: i64) -> SkippedTrackRequest {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    SkippedTrackRequest {
        track_id: track_id.to_string(),
        skipped_date: Some(base + Duration::minutes(minutes)),
    }
}

#[tokio::test]
async fn test_duplicate_add_is_storage_error() {
    let store = MemoryPlaylistStore::new();

    store.add_playlist(PlaylistRequest::new("abc")).await.unwrap();
    assert!(store.add_playlist(PlaylistRequest::new("abc")).await.is_err());
    assert_eq!(store.get_playlists().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_cascades_to_skips_and_history() {
    let store = MemoryPlaylistStore::new();
    store.add_playlist(PlaylistRequest::new("abc")).await.unwrap();
    store.add_playlist(PlaylistRequest::new("keep")).await.unwrap();
    store.add_skipped_track("abc", skip("t1", 0)).await.unwrap();
    store.add_skipped_track("abc", skip("t2", 1)).await.unwrap();
    store.add_skipped_track("keep", skip("t3", 2)).await.unwrap();
    store
        .archive_skipped_tracks("abc", &["t1".to_string()])
        .await
        .unwrap();
    store
        .archive_skipped_tracks("keep", &["t3".to_string()])
        .await
        .unwrap();

    store.delete_playlist("abc").await.unwrap();

    assert!(store.get_playlist("abc").await.unwrap().is_none());
    assert!(store.get_playlist_skipped_tracks("abc").await.unwrap().is_empty());
    assert!(
        store
            .get_playlist_skipped_track_history("abc")
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        store
            .get_playlist_skipped_track_history("keep")
            .await
            .unwrap()
            .len(),
        1
    );

    // A recreated playlist starts clean
    store.add_playlist(PlaylistRequest::new("abc")).await.unwrap();
    assert!(store.get_playlist_skipped_tracks("abc").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_skip_dates_kept_to_microseconds() {
    let store = MemoryPlaylistStore::new();
    store.add_playlist(PlaylistRequest::new("abc")).await.unwrap();

    let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Duration::microseconds(7);
    for nanos in [100, 900] {
        let recorded = store
            .add_skipped_track(
                "abc",
                SkippedTrackRequest {
                    track_id: "t1".to_string(),
                    skipped_date: Some(base + Duration::nanoseconds(nanos)),
                },
            )
            .await
            .unwrap();
        assert_eq!(recorded.skipped_date, base);
    }

    let tracks = store.get_playlist_skipped_tracks("abc").await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].skipped_date, base);
}

#[tokio::test]
async fn test_skip_for_unknown_playlist_fails() {
    let store = MemoryPlaylistStore::new();

    assert!(store.add_skipped_track("ghost", skip("t1", 0)).await.is_err());
}

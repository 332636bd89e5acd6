use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::controller::DataController;
use crate::error::Result;
use crate::models::{
    ArchiveRequest, Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack,
    SkippedTrackHistory, SkippedTrackRequest,
};
use crate::store::PlaylistStore;
use crate::table::{SortKey, SortOrder, sort_rows};

#[derive(Clone)]
pub struct AppState {
    pub controller: DataController,
}

/// Router over `store`, static assets served from `static_dir` under `/web`
pub fn create_router(store: Arc<dyn PlaylistStore>, static_dir: Option<PathBuf>) -> Router {
    let state = AppState {
        controller: DataController::new(store),
    };

    let router = Router::new()
        .route("/", get(root))
        .route("/playlists", get(list_playlists).post(create_playlist))
        .route(
            "/playlists/:id",
            get(get_playlist)
                .put(update_playlist)
                .delete(delete_playlist),
        )
        .route(
            "/playlists/:id/skipped-tracks",
            get(get_skipped_tracks).post(record_skipped_track),
        )
        .route(
            "/playlists/:id/skipped-tracks/history",
            get(get_skipped_track_history),
        )
        .route(
            "/playlists/:id/skipped-tracks/archive",
            post(archive_skipped_tracks),
        );

    let router = match static_dir {
        Some(dir) => router.nest_service("/web", ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Playlist Janitor API v0.1.0"
}

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl SortQuery {
    fn apply<T: SortKey>(&self, rows: &mut [T]) {
        if let Some(accessor) = &self.sort {
            sort_rows(rows, accessor, self.order.unwrap_or_default());
        }
    }
}

// ========== PLAYLIST ENDPOINTS ==========

/// List all playlists
async fn list_playlists(
    State(state): State<AppState>,
    Query(sort): Query<SortQuery>,
) -> Result<Json<Vec<Playlist>>> {
    tracing::debug!("Fetching all playlists");

    let mut playlists = state.controller.list_playlists().await?;
    sort.apply(&mut playlists);

    tracing::debug!("Returning {} playlists", playlists.len());
    Ok(Json(playlists))
}

/// Get a specific playlist by ID
async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Playlist>> {
    tracing::debug!("Fetching playlist: {}", id);

    let playlist = state.controller.get_playlist(&id).await?;

    tracing::debug!("Playlist {} found", id);
    Ok(Json(playlist))
}

/// Start monitoring a new playlist
async fn create_playlist(
    State(state): State<AppState>,
    Json(request): Json<PlaylistRequest>,
) -> Result<Json<Playlist>> {
    tracing::debug!("Creating playlist: {}", request.id);

    let playlist = state.controller.create_playlist(request).await?;

    tracing::debug!("Successfully created playlist: {}", playlist.id);
    Ok(Json(playlist))
}

/// Update a playlist's cleanup settings
async fn update_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<PlaylistUpdateRequest>,
) -> Result<Json<Playlist>> {
    tracing::debug!("Updating playlist: {}", id);

    let playlist = state.controller.update_playlist(&id, update).await?;

    tracing::debug!("Successfully updated playlist: {}", id);
    Ok(Json(playlist))
}

/// Stop monitoring a playlist
async fn delete_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    tracing::debug!("Deleting playlist: {}", id);

    state.controller.delete_playlist(&id).await?;

    tracing::debug!("Successfully deleted playlist: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// ========== SKIPPED TRACK ENDPOINTS ==========

/// List the live skip events of a playlist
async fn get_skipped_tracks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(sort): Query<SortQuery>,
) -> Result<Json<Vec<SkippedTrack>>> {
    tracing::debug!("Fetching skipped tracks for playlist: {}", id);

    let mut tracks = state.controller.skipped_tracks(&id).await?;
    sort.apply(&mut tracks);

    tracing::debug!("Returning {} skipped tracks for {}", tracks.len(), id);
    Ok(Json(tracks))
}

/// Record a skip event reported by the playback tracker
async fn record_skipped_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SkippedTrackRequest>,
) -> Result<Json<SkippedTrack>> {
    tracing::debug!("Recording skip of track {} in playlist {}", request.track_id, id);

    let track = state.controller.record_skip(&id, request).await?;

    Ok(Json(track))
}

/// List archived skip events of a playlist
async fn get_skipped_track_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(sort): Query<SortQuery>,
) -> Result<Json<Vec<SkippedTrackHistory>>> {
    tracing::debug!("Fetching skipped track history for playlist: {}", id);

    let mut history = state.controller.skipped_track_history(&id).await?;
    sort.apply(&mut history);

    tracing::debug!("Returning {} history entries for {}", history.len(), id);
    Ok(Json(history))
}

/// Move skip events of the given tracks into history
async fn archive_skipped_tracks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ArchiveRequest>,
) -> Result<Json<Vec<SkippedTrackHistory>>> {
    tracing::debug!(
        "Archiving {} tracks in playlist {}",
        request.track_ids.len(),
        id
    );

    let archived = state.controller.archive_skipped_tracks(&id, request).await?;

    tracing::debug!("Archived {} skip events for {}", archived.len(), id);
    Ok(Json(archived))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored playlist and its cleanup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Playlist {
    pub id: String,
    /// Skip threshold for playlist tracks in seconds
    pub skip_threshold: Option<i64>,
    pub ignore_initial_skips: bool,
    /// Auto track-cleanup limit for playlist tracks
    pub auto_cleanup_limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaylistRequest {
    pub id: String,
    #[serde(default)]
    pub skip_threshold: Option<i64>,
    #[serde(default)]
    pub ignore_initial_skips: bool,
    #[serde(default)]
    pub auto_cleanup_limit: Option<i64>,
}

impl PlaylistRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skip_threshold: None,
            ignore_initial_skips: false,
            auto_cleanup_limit: None,
        }
    }
}

impl From<PlaylistRequest> for Playlist {
    fn from(request: PlaylistRequest) -> Self {
        Self {
            id: request.id,
            skip_threshold: request.skip_threshold,
            ignore_initial_skips: request.ignore_initial_skips,
            auto_cleanup_limit: request.auto_cleanup_limit,
        }
    }
}

/// Partial update: only the supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaylistUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_initial_skips: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_cleanup_limit: Option<i64>,
}

impl Playlist {
    pub fn apply(&mut self, update: PlaylistUpdateRequest) {
        if let Some(skip_threshold) = update.skip_threshold {
            self.skip_threshold = Some(skip_threshold);
        }
        if let Some(ignore_initial_skips) = update.ignore_initial_skips {
            self.ignore_initial_skips = ignore_initial_skips;
        }
        if let Some(auto_cleanup_limit) = update.auto_cleanup_limit {
            self.auto_cleanup_limit = Some(auto_cleanup_limit);
        }
    }
}

/// A single skip event recorded against a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkippedTrack {
    pub track_id: String,
    pub playlist_id: String,
    pub skipped_date: DateTime<Utc>,
}

/// An archived skip event. Same shape as [`SkippedTrack`], never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkippedTrackHistory {
    pub track_id: String,
    pub playlist_id: String,
    pub skipped_date: DateTime<Utc>,
}

impl From<SkippedTrack> for SkippedTrackHistory {
    fn from(track: SkippedTrack) -> Self {
        Self {
            track_id: track.track_id,
            playlist_id: track.playlist_id,
            skipped_date: track.skipped_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkippedTrackRequest {
    pub track_id: String,
    #[serde(default)]
    pub skipped_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveRequest {
    pub track_ids: Vec<String>,
}

/// Track data fetched from Spotify by an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpotifyTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

/// Error body returned for every non-success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

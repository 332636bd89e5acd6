use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::models::{
    Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrack, SkippedTrackHistory,
    SkippedTrackRequest,
};
use crate::store::PlaylistStore;

type PlaylistRow = (String, Option<i64>, bool, Option<i64>);
type SkipRow = (String, String, String);

#[derive(Clone)]
pub struct PlaylistDatabase {
    pool: SqlitePool,
}

impl PlaylistDatabase {
    /// Create a new playlist database connection
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            tracing::debug!("Created/verified directory: {}", parent.display());
        }

        let db_url = format!("sqlite:{}", db_path.display());
        tracing::debug!("Connecting to playlist database: {}", db_url);

        // Cascading deletes rely on foreign key enforcement
        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to playlist database at: {}",
                    db_path.display()
                )
            })?;

        let db = Self { pool };
        db.initialize().await?;

        tracing::info!("Playlist database initialized: {}", db_path.display());

        Ok(db)
    }

    /// Create tables and indexes
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS playlists (
                id TEXT PRIMARY KEY,
                skip_threshold INTEGER,
                ignore_initial_skips INTEGER NOT NULL DEFAULT 0,
                auto_cleanup_limit INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create playlists table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skipped_tracks (
                track_id TEXT NOT NULL,
                playlist_id TEXT NOT NULL,
                skipped_date TEXT NOT NULL,
                PRIMARY KEY (track_id, playlist_id, skipped_date),
                FOREIGN KEY (playlist_id) REFERENCES playlists(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create skipped_tracks table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skipped_track_history (
                track_id TEXT NOT NULL,
                playlist_id TEXT NOT NULL,
                skipped_date TEXT NOT NULL,
                PRIMARY KEY (track_id, playlist_id, skipped_date),
                FOREIGN KEY (playlist_id) REFERENCES playlists(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create skipped_track_history table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_skipped_tracks_playlist_id
            ON skipped_tracks(playlist_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create skipped_tracks index")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_skipped_track_history_playlist_id
            ON skipped_track_history(playlist_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create skipped_track_history index")?;

        Ok(())
    }

    async fn fetch_skips(&self, table: &str, playlist_id: &str) -> Result<Vec<SkipRow>> {
        let sql = format!(
            r#"
            SELECT track_id, playlist_id, skipped_date
            FROM {table}
            WHERE playlist_id = ?
            ORDER BY skipped_date, track_id
            "#
        );

        sqlx::query_as::<_, SkipRow>(&sql)
            .bind(playlist_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch {} for playlist {}", table, playlist_id))
    }
}

/// Dates are stored as fixed-width RFC 3339 so text ordering matches time ordering
fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let date = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid skipped date in database: {}", value))?;
    Ok(date.with_timezone(&Utc))
}

fn playlist_from_row(
    (id, skip_threshold, ignore_initial_skips, auto_cleanup_limit): PlaylistRow,
) -> Playlist {
    Playlist {
        id,
        skip_threshold,
        ignore_initial_skips,
        auto_cleanup_limit,
    }
}

fn skipped_track_from_row((track_id, playlist_id, skipped_date): SkipRow) -> Result<SkippedTrack> {
    Ok(SkippedTrack {
        track_id,
        playlist_id,
        skipped_date: parse_date(&skipped_date)?,
    })
}

#[async_trait]
impl PlaylistStore for PlaylistDatabase {
    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        let rows = sqlx::query_as::<_, PlaylistRow>(
            r#"
            SELECT id, skip_threshold, ignore_initial_skips, auto_cleanup_limit
            FROM playlists
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch playlists")?;

        Ok(rows.into_iter().map(playlist_from_row).collect())
    }

    async fn get_playlist(&self, id: &str) -> Result<Option<Playlist>> {
        let row = sqlx::query_as::<_, PlaylistRow>(
            r#"
            SELECT id, skip_threshold, ignore_initial_skips, auto_cleanup_limit
            FROM playlists
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch playlist")?;

        Ok(row.map(playlist_from_row))
    }

    async fn add_playlist(&self, request: PlaylistRequest) -> Result<Playlist> {
        let playlist = Playlist::from(request);

        sqlx::query(
            r#"
            INSERT INTO playlists (id, skip_threshold, ignore_initial_skips, auto_cleanup_limit)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&playlist.id)
        .bind(playlist.skip_threshold)
        .bind(playlist.ignore_initial_skips)
        .bind(playlist.auto_cleanup_limit)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert playlist {}", playlist.id))?;

        Ok(playlist)
    }

    async fn update_playlist(
        &self,
        id: &str,
        update: PlaylistUpdateRequest,
    ) -> Result<Option<Playlist>> {
        let Some(mut playlist) = self.get_playlist(id).await? else {
            return Ok(None);
        };

        playlist.apply(update);

        sqlx::query(
            r#"
            UPDATE playlists
            SET skip_threshold = ?, ignore_initial_skips = ?, auto_cleanup_limit = ?
            WHERE id = ?
            "#,
        )
        .bind(playlist.skip_threshold)
        .bind(playlist.ignore_initial_skips)
        .bind(playlist.auto_cleanup_limit)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update playlist")?;

        Ok(Some(playlist))
    }

    async fn delete_playlist(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete playlist")?;

        tracing::debug!(
            "Deleted playlist {} ({} rows affected)",
            id,
            result.rows_affected()
        );
        Ok(())
    }

    async fn get_playlist_skipped_tracks(&self, id: &str) -> Result<Vec<SkippedTrack>> {
        self.fetch_skips("skipped_tracks", id)
            .await?
            .into_iter()
            .map(skipped_track_from_row)
            .collect()
    }

    async fn get_playlist_skipped_track_history(
        &self,
        id: &str,
    ) -> Result<Vec<SkippedTrackHistory>> {
        self.fetch_skips("skipped_track_history", id)
            .await?
            .into_iter()
            .map(|row| skipped_track_from_row(row).map(SkippedTrackHistory::from))
            .collect()
    }

    async fn add_skipped_track(
        &self,
        playlist_id: &str,
        request: SkippedTrackRequest,
    ) -> Result<SkippedTrack> {
        let skipped_date = request.skipped_date.unwrap_or_else(Utc::now);
        let stored_date = format_date(&skipped_date);

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO skipped_tracks (track_id, playlist_id, skipped_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&request.track_id)
        .bind(playlist_id)
        .bind(&stored_date)
        .execute(&self.pool)
        .await
        .context("Failed to record skipped track")?;

        Ok(SkippedTrack {
            track_id: request.track_id,
            playlist_id: playlist_id.to_string(),
            skipped_date: parse_date(&stored_date)?,
        })
    }

    async fn archive_skipped_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<Vec<SkippedTrackHistory>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start archive transaction")?;

        let mut archived = Vec::new();
        for track_id in track_ids {
            let rows = sqlx::query_as::<_, SkipRow>(
                r#"
                SELECT track_id, playlist_id, skipped_date
                FROM skipped_tracks
                WHERE playlist_id = ? AND track_id = ?
                ORDER BY skipped_date
                "#,
            )
            .bind(playlist_id)
            .bind(track_id)
            .fetch_all(&mut *tx)
            .await
            .context("Failed to fetch skipped tracks to archive")?;

            for (track_id, playlist_id, skipped_date) in rows {
                sqlx::query(
                    r#"
                    INSERT OR IGNORE INTO skipped_track_history (track_id, playlist_id, skipped_date)
                    VALUES (?, ?, ?)
                    "#,
                )
                .bind(&track_id)
                .bind(&playlist_id)
                .bind(&skipped_date)
                .execute(&mut *tx)
                .await
                .context("Failed to insert skipped track history")?;

                archived.push(SkippedTrackHistory {
                    skipped_date: parse_date(&skipped_date)?,
                    track_id,
                    playlist_id,
                });
            }

            sqlx::query("DELETE FROM skipped_tracks WHERE playlist_id = ? AND track_id = ?")
                .bind(playlist_id)
                .bind(track_id)
                .execute(&mut *tx)
                .await
                .context("Failed to remove archived skipped tracks")?;
        }

        tx.commit()
            .await
            .context("Failed to commit archive transaction")?;

        archived.sort_by(|a, b| {
            a.skipped_date
                .cmp(&b.skipped_date)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });

        Ok(archived)
    }
}

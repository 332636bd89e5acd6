use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use playlist_janitor::client::ApiClient;
use playlist_janitor::models::{
    ArchiveRequest, Playlist, PlaylistRequest, PlaylistUpdateRequest, SkippedTrackRequest,
};
use playlist_janitor::table::{Column, SortKey, SortOrder, TableHead, sort_rows};
use playlist_janitor::tabs::{PlaylistTabs, Section};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "janitor-client")]
#[command(about = "Playlist Janitor CLI Client", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "JANITOR_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser)]
enum Command {
    /// List all monitored playlists
    List,
    /// Show playlist settings
    Info { id: String },
    /// Start monitoring a playlist
    Create {
        /// Spotify playlist ID
        id: String,
        /// Skip threshold in seconds
        #[arg(long)]
        skip_threshold: Option<i64>,
        /// Ignore initial skips during playback
        #[arg(long)]
        ignore_initial_skips: bool,
        /// Auto track-cleanup limit
        #[arg(long)]
        auto_cleanup_limit: Option<i64>,
    },
    /// Update playlist settings
    Update {
        id: String,
        #[arg(long)]
        skip_threshold: Option<i64>,
        #[arg(long)]
        ignore_initial_skips: Option<bool>,
        #[arg(long)]
        auto_cleanup_limit: Option<i64>,
    },
    /// Stop monitoring a playlist
    Delete { id: String },
    /// Record a skipped track
    Skip {
        playlist_id: String,
        track_id: String,
        /// Skip time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Move skipped tracks into history
    Archive {
        playlist_id: String,
        track_ids: Vec<String>,
    },
    /// Show skipped tracks, history and Spotify tracks of a playlist
    Tabs {
        id: String,
        /// JSON file with the playlist's already-fetched Spotify tracks
        #[arg(long)]
        spotify_tracks: Option<PathBuf>,
        /// Column accessor to sort by (e.g. skippedDate, title)
        #[arg(long)]
        sort: Option<String>,
        /// Sort order, asc or desc
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server);

    match cli.command.unwrap_or(Command::List) {
        Command::List => list_playlists(&client).await?,
        Command::Info { id } => show_playlist_info(&client, &id).await?,
        Command::Create {
            id,
            skip_threshold,
            ignore_initial_skips,
            auto_cleanup_limit,
        } => {
            let request = PlaylistRequest {
                id,
                skip_threshold,
                ignore_initial_skips,
                auto_cleanup_limit,
            };
            let playlist = client.create_playlist(&request).await?;
            println!("✓ Monitoring playlist {}", playlist.id);
            print_playlist(&playlist);
        }
        Command::Update {
            id,
            skip_threshold,
            ignore_initial_skips,
            auto_cleanup_limit,
        } => {
            let update = PlaylistUpdateRequest {
                skip_threshold,
                ignore_initial_skips,
                auto_cleanup_limit,
            };
            let playlist = client.update_playlist(&id, &update).await?;
            println!("✓ Updated playlist {}", playlist.id);
            print_playlist(&playlist);
        }
        Command::Delete { id } => {
            client.delete_playlist(&id).await?;
            println!("✓ Stopped monitoring playlist {}", id);
        }
        Command::Skip {
            playlist_id,
            track_id,
            at,
        } => {
            let request = SkippedTrackRequest {
                track_id,
                skipped_date: at,
            };
            let skipped = client.record_skip(&playlist_id, &request).await?;
            println!(
                "✓ Recorded skip of {} at {}",
                skipped.track_id,
                skipped.skipped_date.to_rfc3339()
            );
        }
        Command::Archive {
            playlist_id,
            track_ids,
        } => {
            if track_ids.is_empty() {
                anyhow::bail!("No track IDs provided");
            }
            let archived = client
                .archive_skipped_tracks(&playlist_id, &ArchiveRequest { track_ids })
                .await?;
            println!("✓ Archived {} skip events", archived.len());
        }
        Command::Tabs {
            id,
            spotify_tracks,
            sort,
            order,
        } => {
            let client = match spotify_tracks {
                Some(path) => client.with_spotify_tracks(path),
                None => client,
            };
            show_tabs(&client, &id, sort.as_deref(), order).await?;
        }
    }

    Ok(())
}

async fn list_playlists(client: &ApiClient) -> Result<()> {
    let playlists = client.list_playlists().await?;

    if playlists.is_empty() {
        println!("No playlists found.");
        return Ok(());
    }

    println!("Playlists ({}):", playlists.len());
    println!("{:-<80}", "");

    for playlist in &playlists {
        print_playlist(playlist);
        println!();
    }

    Ok(())
}

async fn show_playlist_info(client: &ApiClient, id: &str) -> Result<()> {
    let playlist = client.get_playlist(id).await?;
    let skipped = client.get_skipped_tracks(id).await?;

    println!("Playlist Information:");
    println!("{:-<80}", "");
    print_playlist(&playlist);
    println!("   Skipped tracks: {}", skipped.len());

    Ok(())
}

fn print_playlist(playlist: &Playlist) {
    println!("📋 {}", playlist.id);
    match playlist.skip_threshold {
        Some(seconds) => println!("   Skip threshold: {}s", seconds),
        None => println!("   Skip threshold: none"),
    }
    println!("   Ignore initial skips: {}", playlist.ignore_initial_skips);
    match playlist.auto_cleanup_limit {
        Some(limit) => println!("   Auto cleanup limit: {}", limit),
        None => println!("   Auto cleanup limit: none"),
    }
}

async fn show_tabs(
    client: &ApiClient,
    id: &str,
    sort: Option<&str>,
    order: SortOrder,
) -> Result<()> {
    let mut tabs = PlaylistTabs::new(id);
    tabs.load_with(client, |tabs| {
        let done = [
            !tabs.skipped_tracks.loading,
            !tabs.skipped_track_history.loading,
            !tabs.spotify_tracks.loading,
        ];
        let loaded = done.iter().filter(|done| **done).count();
        eprintln!("Loaded {}/3 sections", loaded);
    })
    .await;

    println!("Skipped Tracks");
    print_section(&mut tabs.skipped_tracks, sort, order, |track, accessor| {
        match accessor {
            "trackId" => track.track_id.clone(),
            "skippedDate" => track.skipped_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            _ => String::new(),
        }
    });

    println!("Skipped Track History");
    print_section(
        &mut tabs.skipped_track_history,
        sort,
        order,
        |track, accessor| match accessor {
            "trackId" => track.track_id.clone(),
            "skippedDate" => track.skipped_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            _ => String::new(),
        },
    );

    println!("Tracks");
    print_section(&mut tabs.spotify_tracks, sort, order, |track, accessor| {
        match accessor {
            "title" => track.title.clone(),
            "artist" => track.artist.clone(),
            "album" => track.album.clone().unwrap_or_default(),
            "duration" => track
                .duration_ms
                .map(|ms| format!("{:02}:{:02}", ms / 60_000, (ms / 1000) % 60))
                .unwrap_or_default(),
            _ => String::new(),
        }
    });

    Ok(())
}

/// Print one tab as a text table, sorted when `sort` names one of its columns
fn print_section<T, F>(
    section: &mut Section<T>,
    sort: Option<&str>,
    order: SortOrder,
    cell: F,
) where
    T: SortKey,
    F: Fn(&T, &str) -> String,
{
    println!("{:=<80}", "");

    if let Some(error) = &section.error {
        println!("⚠️  {}", error);
        println!();
        return;
    }

    if let Some(message) = section.empty_message() {
        println!("{}", message);
        println!();
        return;
    }

    let mut requested = None;
    let mut head = TableHead::new(section.columns.clone(), |accessor: &str, order: SortOrder| {
        requested = Some((accessor.to_string(), order));
    });

    // Replay header clicks until the requested order is reached
    if let Some(accessor) = sort {
        head.click(accessor);
        if order == SortOrder::Desc {
            head.click(accessor);
        }
    }

    let columns: Vec<Column> = head.columns().to_vec();
    let labels = head.labels();
    drop(head);

    if let Some((accessor, order)) = requested {
        sort_rows(&mut section.items, &accessor, order);
    }

    let header: Vec<String> = labels.iter().map(|label| format!("{:<24}", label)).collect();
    println!("{}", header.join(" "));
    println!("{:-<80}", "");

    for item in &section.items {
        let row: Vec<String> = columns
            .iter()
            .map(|column| format!("{:<24}", cell(item, &column.accessor)))
            .collect();
        println!("{}", row.join(" "));
    }
    println!();
}

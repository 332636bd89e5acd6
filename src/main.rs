use anyhow::{Context, Result};
use clap::Parser;
use playlist_janitor::database::PlaylistDatabase;
use playlist_janitor::memory::MemoryPlaylistStore;
use playlist_janitor::server;
use playlist_janitor::store::PlaylistStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playlist-janitor")]
#[command(about = "Playlist Janitor API Server", long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(short, long, env = "JANITOR_DATABASE_PATH", default_value = "data/playlists.db")]
    database: PathBuf,

    /// Keep everything in memory instead of using the database file
    #[arg(long)]
    in_memory: bool,

    /// Address to bind to
    #[arg(long, env = "JANITOR_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "JANITOR_PORT", default_value = "3000")]
    port: u16,

    /// Directory of prebuilt web assets served under /web
    #[arg(long, env = "JANITOR_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("playlist_janitor=debug,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Playlist Janitor");

    let store: Arc<dyn PlaylistStore> = if cli.in_memory {
        tracing::info!("Using in-memory playlist store");
        Arc::new(MemoryPlaylistStore::new())
    } else {
        tracing::info!("Database path: {}", cli.database.display());
        Arc::new(
            PlaylistDatabase::new(&cli.database)
                .await
                .context("Failed to open playlist database")?,
        )
    };

    let static_dir = if cli.static_dir.is_dir() {
        Some(cli.static_dir.clone())
    } else {
        tracing::warn!(
            "Static directory {} not found, web client disabled",
            cli.static_dir.display()
        );
        None
    };

    let app = server::create_router(store, static_dir);
    let addr = format!("{}:{}", cli.host, cli.port);

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET    /playlists                                - List playlists");
    tracing::info!("  POST   /playlists                                - Monitor a playlist");
    tracing::info!("  GET    /playlists/:id                            - Get playlist");
    tracing::info!("  PUT    /playlists/:id                            - Update playlist");
    tracing::info!("  DELETE /playlists/:id                            - Stop monitoring");
    tracing::info!("  GET    /playlists/:id/skipped-tracks             - List skipped tracks");
    tracing::info!("  POST   /playlists/:id/skipped-tracks             - Record a skip");
    tracing::info!("  GET    /playlists/:id/skipped-tracks/history     - List archived skips");
    tracing::info!("  POST   /playlists/:id/skipped-tracks/archive     - Archive skips");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

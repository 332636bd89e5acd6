//! Playlist Janitor - monitored Spotify playlists and their skipped tracks
//!
//! This library provides the HTTP API over a playlist store, the SQLite and
//! in-memory store adapters, and the view logic used by the terminal client.

pub mod client;
pub mod controller;
pub mod database;
pub mod error;
pub mod memory;
pub mod models;
pub mod server;
pub mod store;
pub mod table;
pub mod tabs;

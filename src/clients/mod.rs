//! External collaborator clients.
//!
//! Three HTTP+JSON services are involved: the media server (read-only watch
//! state) and the two acquisition catalogs (read/write). The traits here are
//! the seams the mapper and the cleanup runner are generic over; the
//! `reqwest`-backed implementations live in their own modules and the tests
//! substitute in-memory fakes.

mod jellyfin;
mod radarr;
mod sonarr;

pub use jellyfin::JellyfinClient;
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;

use crate::Result;
use crate::models::{EpisodeEntry, MovieEntry, SeriesEntry, Tag, User, WatchedItem};
use std::time::Duration;

/// Read-only source of per-user watch state.
pub trait WatchHistory {
    /// Lists all user accounts.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn users(&self) -> Result<Vec<User>>;

    /// Lists all movies the given user has fully played.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn watched_movies(&self, user_id: &str) -> Result<Vec<WatchedItem>>;

    /// Lists all episodes the given user has fully played.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn watched_episodes(&self, user_id: &str) -> Result<Vec<WatchedItem>>;
}

/// The movie catalog service: list, tags, and deletion.
pub trait MovieCatalog {
    /// Lists every movie in the catalog.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn movies(&self) -> Result<Vec<MovieEntry>>;

    /// Lists the catalog's tags.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn tags(&self) -> Result<Vec<Tag>>;

    /// Deletes a movie by catalog id, removing its files from disk and
    /// without adding an import exclusion.
    ///
    /// Returns `Ok(false)` when the catalog answers with a non-success
    /// status; that is a per-item failure, not a run-aborting fault.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call cannot be made at all.
    fn delete_movie(&self, id: i64) -> Result<bool>;
}

/// The series/episode catalog service: list, tags, and episode-file deletion.
pub trait SeriesCatalog {
    /// Lists every series in the catalog.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn series(&self) -> Result<Vec<SeriesEntry>>;

    /// Lists a series' episodes.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn episodes(&self, series_id: i64) -> Result<Vec<EpisodeEntry>>;

    /// Lists the catalog's tags.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails.
    fn tags(&self) -> Result<Vec<Tag>>;

    /// Deletes a single episode file by file id.
    ///
    /// Returns `Ok(false)` on a non-success status (per-item failure).
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call cannot be made at all.
    fn delete_episode_file(&self, file_id: i64) -> Result<bool>;

    /// Deletes a batch of episode files in one call.
    ///
    /// Returns `Ok(false)` on a non-success status (per-item failure).
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call cannot be made at all.
    fn delete_episode_files(&self, file_ids: &[i64]) -> Result<bool>;
}

/// HTTP timeouts for collaborator requests.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl HttpConfig {
    /// Loads HTTP configuration from environment variables.
    ///
    /// Reads `WATCHSWEEP_HTTP_TIMEOUT_MS` and
    /// `WATCHSWEEP_HTTP_CONNECT_TIMEOUT_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = std::env::var("WATCHSWEEP_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_ms = v;
        }
        if let Some(v) = std::env::var("WATCHSWEEP_HTTP_CONNECT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.connect_timeout_ms = v;
        }
        config
    }
}

/// Builds a blocking HTTP client with the configured timeouts.
#[must_use]
pub fn build_http_client(config: HttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

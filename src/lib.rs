//! # Watchsweep
//!
//! Reconciles "watched" state reported by a media server against two
//! content-acquisition catalogs (movies and series/episodes) and deletes
//! on-disk media once the retention policy is satisfied.
//!
//! Deletions always go through the catalogs' own APIs so their databases
//! stay consistent; watchsweep never removes files from disk directly.
//!
//! ## Pipeline
//!
//! For each watched item: missing last-played skip, grace-period skip,
//! catalog match (path first, provider-id fallback for movies), keep-tag
//! exclusion (movies only), then deletion. Two phases run sequentially:
//! all movies, then all episodes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use watchsweep::{CleanupRunner, MediaMapper, SweepConfig};
//! use watchsweep::clients::{JellyfinClient, RadarrClient, SonarrClient};
//!
//! let config = SweepConfig::from_env();
//! let mapper = MediaMapper::new(
//!     RadarrClient::new(&config.radarr.base_url, &config.radarr.api_key),
//!     SonarrClient::new(&config.sonarr.base_url, &config.sonarr.api_key),
//!     config.prefixes.clone(),
//! );
//! let jellyfin = JellyfinClient::new(&config.jellyfin.base_url, &config.jellyfin.api_key);
//! let stats = CleanupRunner::new(jellyfin, mapper, &config).run()?;
//! println!("{}", stats.summary());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cleanup;
pub mod clients;
pub mod config;
pub mod mapper;
pub mod models;
pub mod observability;
pub mod paths;
pub mod policy;

// Re-exports for convenience
pub use cleanup::{CleanupRunner, CleanupStats, PhaseStats};
pub use clients::{
    JellyfinClient, MovieCatalog, RadarrClient, SeriesCatalog, SonarrClient, WatchHistory,
};
pub use config::{MountPrefixes, ServiceEndpoint, SweepConfig};
pub use mapper::{CatalogService, MediaMapper, MovieMatch};
pub use models::{EpisodeEntry, MovieEntry, SeriesEntry, Tag, User, WatchedItem};
pub use paths::normalize;
pub use policy::{GracePeriod, KeepTag};

/// Error type for watchsweep operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// "No match found" is deliberately **not** an error: lookups return
/// `Option::None` so a down service (`Transport`) can never be conflated
/// with an item that simply is not in a catalog.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Config` | Missing API key, configured primary user not found, unparseable config file |
/// | `Transport` | A collaborator HTTP call fails or a list endpoint returns a non-success status |
/// | `Response` | A collaborator returns a payload that cannot be deserialized |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid or incomplete configuration.
    ///
    /// Raised when:
    /// - A required API key is empty
    /// - The configured primary user does not exist on the media server
    /// - A config file cannot be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// A collaborator call failed at the transport level.
    ///
    /// Raised when:
    /// - The HTTP request cannot be sent (connect/timeout failures)
    /// - A read endpoint returns a non-success status
    ///
    /// Propagates to the caller and aborts the current run; it is never
    /// swallowed into a "not found" outcome.
    #[error("{service} transport error: {cause}")]
    Transport {
        /// The collaborator that failed.
        service: String,
        /// The underlying cause.
        cause: String,
    },

    /// A collaborator returned a response that could not be interpreted.
    #[error("{service} returned an unexpected response: {cause}")]
    Response {
        /// The collaborator that responded.
        service: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds a transport error for a named collaborator.
    pub fn transport(service: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Transport {
            service: service.into(),
            cause: cause.to_string(),
        }
    }

    /// Builds a response error for a named collaborator.
    pub fn response(service: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Response {
            service: service.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for watchsweep operations.
pub type Result<T> = std::result::Result<T, Error>;

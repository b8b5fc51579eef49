//! Domain model shared by the mapper and the cleanup runner.
//!
//! These are the in-process shapes; the wire-level serde structs live with
//! the client that owns each API.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A media-server user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Server-side user identifier.
    pub id: String,
    /// Display name, matched case-insensitively against the configured
    /// primary user.
    pub name: String,
}

/// Series/season/episode detail carried by watched episodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeInfo {
    /// Series display name, used to group the episode phase's log output.
    pub series_name: String,
    /// Season number.
    pub season: u32,
    /// Episode number within the season.
    pub episode: u32,
}

/// A movie or episode the media server reports as fully played.
///
/// Produced fresh on every fetch and immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedItem {
    /// Media-server item identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// On-disk path as the media server sees it.
    pub path: Option<String>,
    /// External provider ids (e.g. `"Tmdb" -> "603"`), usable as fallback
    /// match keys when paths disagree.
    pub provider_ids: HashMap<String, String>,
    /// When the item was last played, on the UTC timeline. `None` means the
    /// server never recorded a playback time; such items are never eligible
    /// for deletion.
    pub last_played: Option<DateTime<Utc>>,
    /// Present iff the item is an episode.
    pub episode: Option<EpisodeInfo>,
}

impl WatchedItem {
    /// The item's TMDb id, when present and numeric.
    #[must_use]
    pub fn tmdb_id(&self) -> Option<i64> {
        self.provider_ids.get("Tmdb").and_then(|v| v.parse().ok())
    }

    /// Name used in logs: `Series - S01E02` for episodes, the plain name
    /// otherwise.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.episode.as_ref().map_or_else(
            || self.name.clone(),
            |ep| format!("{} - S{:02}E{:02}", ep.series_name, ep.season, ep.episode),
        )
    }
}

/// A movie record held by the movie catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieEntry {
    /// Catalog-side identifier.
    pub id: i64,
    /// Title, for log output.
    pub title: String,
    /// Whether the catalog has a file on disk for this movie.
    pub has_file: bool,
    /// On-disk path of the movie file, as the catalog sees it.
    pub path: Option<String>,
    /// TMDb cross-reference id.
    pub tmdb_id: Option<i64>,
    /// Tag ids attached to the movie.
    pub tags: Vec<i64>,
}

/// A series record held by the series catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesEntry {
    /// Catalog-side series identifier.
    pub id: i64,
    /// Series title.
    pub title: String,
}

/// An episode record held by the series catalog.
///
/// The file-level identifier (`file_id`) is distinct from the episode's own
/// identifier; deletions operate on the file id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEntry {
    /// The episode's own identifier.
    pub id: i64,
    /// Identifier of the episode's file, the deletion key.
    pub file_id: i64,
    /// Whether the episode has a file on disk.
    pub has_file: bool,
    /// On-disk path of the episode file, as the catalog sees it.
    pub path: Option<String>,
    /// Season number.
    pub season: u32,
    /// Episode number within the season.
    pub episode: u32,
}

/// A catalog tag: id plus label text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag identifier.
    pub id: i64,
    /// Label text, matched case-insensitively against the keep label.
    pub label: String,
}

//! Media-server client (Jellyfin/Emby API surface).
//!
//! Read-only: lists users and fully-played items for one user. Auth is a
//! single persistent API token sent as `X-Emby-Token`.

use super::{HttpConfig, WatchHistory, build_http_client};
use crate::models::{EpisodeInfo, User, WatchedItem};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const SERVICE: &str = "jellyfin";

const MOVIE_FIELDS: &str = "Path,ProviderIds,UserData,DateCreated";
const EPISODE_FIELDS: &str =
    "Path,ProviderIds,UserData,DateCreated,SeasonId,SeriesId,IndexNumber,ParentIndexNumber,SeriesName";

/// Blocking media-server client.
pub struct JellyfinClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// API token.
    api_key: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl JellyfinClient {
    /// Creates a new client for the given base URL and API token.
    #[must_use]
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: build_http_client(HttpConfig::from_env()),
        }
    }

    /// Sets HTTP timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .header("X-Emby-Token", &self.api_key)
            .send()
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(service = SERVICE, %status, url = %url, "Request failed");
            return Err(Error::transport(
                SERVICE,
                format!("GET {path} returned {status}: {body}"),
            ));
        }

        response.json().map_err(|e| Error::response(SERVICE, e))
    }

    fn watched_items(&self, user_id: &str, kind: ItemKind) -> Result<Vec<WatchedItem>> {
        let (item_type, fields) = match kind {
            ItemKind::Movie => ("Movie", MOVIE_FIELDS),
            ItemKind::Episode => ("Episode", EPISODE_FIELDS),
        };
        let envelope: ItemsEnvelope = self.get(
            &format!("/Users/{user_id}/Items"),
            &[
                ("IncludeItemTypes", item_type),
                ("Recursive", "true"),
                ("IsPlayed", "true"),
                ("Fields", fields),
            ],
        )?;

        Ok(envelope
            .items
            .into_iter()
            .map(|item| item.into_watched(kind))
            .collect())
    }
}

impl WatchHistory for JellyfinClient {
    fn users(&self) -> Result<Vec<User>> {
        let users: Vec<JellyfinUser> = self.get("/Users", &[])?;
        Ok(users
            .into_iter()
            .map(|u| User {
                id: u.id,
                name: u.name,
            })
            .collect())
    }

    fn watched_movies(&self, user_id: &str) -> Result<Vec<WatchedItem>> {
        self.watched_items(user_id, ItemKind::Movie)
    }

    fn watched_episodes(&self, user_id: &str) -> Result<Vec<WatchedItem>> {
        self.watched_items(user_id, ItemKind::Episode)
    }
}

#[derive(Clone, Copy)]
enum ItemKind {
    Movie,
    Episode,
}

/// A user account on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinUser {
    id: String,
    name: String,
}

/// Envelope around item listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsEnvelope {
    items: Vec<JellyfinItem>,
}

/// An item on the wire; movie and episode listings share this shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinItem {
    id: String,
    name: String,
    path: Option<String>,
    #[serde(default)]
    provider_ids: HashMap<String, String>,
    user_data: Option<JellyfinUserData>,
    series_name: Option<String>,
    index_number: Option<u32>,
    parent_index_number: Option<u32>,
}

/// Per-user playback state.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinUserData {
    last_played_date: Option<DateTime<Utc>>,
}

impl JellyfinItem {
    fn into_watched(self, kind: ItemKind) -> WatchedItem {
        let episode = match kind {
            ItemKind::Movie => None,
            ItemKind::Episode => Some(EpisodeInfo {
                series_name: self
                    .series_name
                    .unwrap_or_else(|| "Unknown".to_string()),
                season: self.parent_index_number.unwrap_or(0),
                episode: self.index_number.unwrap_or(0),
            }),
        };

        WatchedItem {
            id: self.id,
            name: self.name,
            path: self.path,
            provider_ids: self.provider_ids,
            last_played: self.user_data.and_then(|u| u.last_played_date),
            episode,
        }
    }
}

//! Series/episode catalog client (Sonarr v3 API surface).
//!
//! Lists series, per-series episodes, and tags; deletes episode files one at
//! a time or in bulk. Episode files carry their own id distinct from the
//! episode id, and deletion operates on the file id.

use super::{HttpConfig, SeriesCatalog, build_http_client};
use crate::models::{EpisodeEntry, SeriesEntry, Tag};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "sonarr";

/// Blocking series catalog client.
pub struct SonarrClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// API key.
    api_key: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl SonarrClient {
    /// Creates a new client for the given base URL and API key.
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
            .header("X-Api-Key", &self.api_key)
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

    fn delete(&self, path: &str, body: Option<&BulkDeleteBody>) -> Result<bool> {
        let mut request = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .header("X-Api-Key", &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            let body = response.text().unwrap_or_default();
            tracing::error!(service = SERVICE, %status, path = %path, body = %body, "Delete failed");
            Ok(false)
        }
    }
}

impl SeriesCatalog for SonarrClient {
    fn series(&self) -> Result<Vec<SeriesEntry>> {
        let series: Vec<SonarrSeries> = self.get("/api/v3/series", &[])?;
        Ok(series
            .into_iter()
            .map(|s| SeriesEntry {
                id: s.id,
                title: s.title,
            })
            .collect())
    }

    fn episodes(&self, series_id: i64) -> Result<Vec<EpisodeEntry>> {
        let episodes: Vec<SonarrEpisode> =
            self.get("/api/v3/episode", &[("seriesId", &series_id.to_string())])?;
        Ok(episodes
            .into_iter()
            .map(SonarrEpisode::into_entry)
            .collect())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let tags: Vec<SonarrTag> = self.get("/api/v3/tag", &[])?;
        Ok(tags
            .into_iter()
            .map(|t| Tag {
                id: t.id,
                label: t.label,
            })
            .collect())
    }

    fn delete_episode_file(&self, file_id: i64) -> Result<bool> {
        self.delete(&format!("/api/v3/episodefile/{file_id}"), None)
    }

    fn delete_episode_files(&self, file_ids: &[i64]) -> Result<bool> {
        self.delete(
            "/api/v3/episodefile/bulk",
            Some(&BulkDeleteBody {
                episode_file_ids: file_ids.to_vec(),
            }),
        )
    }
}

/// A series on the wire.
#[derive(Debug, Deserialize)]
struct SonarrSeries {
    id: i64,
    title: String,
}

/// An episode on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrEpisode {
    id: i64,
    #[serde(default)]
    episode_file_id: i64,
    #[serde(default)]
    has_file: bool,
    episode_file: Option<SonarrEpisodeFile>,
    season_number: u32,
    episode_number: u32,
}

/// The episode's on-disk file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrEpisodeFile {
    path: String,
}

/// A tag on the wire.
#[derive(Debug, Deserialize)]
struct SonarrTag {
    id: i64,
    label: String,
}

/// Body for the bulk episode-file delete endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkDeleteBody {
    episode_file_ids: Vec<i64>,
}

impl SonarrEpisode {
    fn into_entry(self) -> EpisodeEntry {
        EpisodeEntry {
            id: self.id,
            file_id: self.episode_file_id,
            has_file: self.has_file,
            path: self.episode_file.map(|f| f.path),
            season: self.season_number,
            episode: self.episode_number,
        }
    }
}

//! Movie catalog client (Radarr v3 API surface).
//!
//! Lists movies and tags, and deletes movies by catalog id. Deletion asks
//! the catalog to remove the file from disk and to not add the title to the
//! import-exclusion list, so the same movie can be re-added later.

use super::{HttpConfig, MovieCatalog, build_http_client};
use crate::models::{MovieEntry, Tag};
use crate::{Error, Result};
use serde::Deserialize;

const SERVICE: &str = "radarr";

/// Blocking movie catalog client.
pub struct RadarrClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// API key.
    api_key: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl RadarrClient {
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

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
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
}

impl MovieCatalog for RadarrClient {
    fn movies(&self) -> Result<Vec<MovieEntry>> {
        let movies: Vec<RadarrMovie> = self.get("/api/v3/movie")?;
        Ok(movies.into_iter().map(RadarrMovie::into_entry).collect())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let tags: Vec<RadarrTag> = self.get("/api/v3/tag")?;
        Ok(tags
            .into_iter()
            .map(|t| Tag {
                id: t.id,
                label: t.label,
            })
            .collect())
    }

    fn delete_movie(&self, id: i64) -> Result<bool> {
        let response = self
            .client
            .delete(format!("{}/api/v3/movie/{id}", self.base_url))
            .query(&[("deleteFiles", "true"), ("addImportExclusion", "false")])
            .header("X-Api-Key", &self.api_key)
            .send()
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            let body = response.text().unwrap_or_default();
            tracing::error!(service = SERVICE, movie_id = id, %status, body = %body, "Delete failed");
            Ok(false)
        }
    }
}

/// A movie on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovie {
    id: i64,
    title: String,
    #[serde(default)]
    has_file: bool,
    movie_file: Option<RadarrMovieFile>,
    tmdb_id: Option<i64>,
    #[serde(default)]
    tags: Vec<i64>,
}

/// The movie's on-disk file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovieFile {
    path: String,
}

/// A tag on the wire.
#[derive(Debug, Deserialize)]
struct RadarrTag {
    id: i64,
    label: String,
}

impl RadarrMovie {
    fn into_entry(self) -> MovieEntry {
        MovieEntry {
            id: self.id,
            title: self.title,
            has_file: self.has_file,
            path: self.movie_file.map(|f| f.path),
            tmdb_id: self.tmdb_id,
            tags: self.tags,
        }
    }
}

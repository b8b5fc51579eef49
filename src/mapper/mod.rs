//! Maps watched items to catalog identifiers and performs deletions.
//!
//! The mapper owns one run's worth of catalog state: a movie cache, a series
//! cache, a per-series episode cache, and one tag cache per catalog. Each
//! cache is populated at most once, on first use, unless a mutating call
//! invalidates it:
//!
//! - a movie deletion evicts exactly the deleted entry (cheap, precise);
//! - an episode-file deletion clears the **entire** episode cache. Episode
//!   identifiers may shift after any deletion within a series, and the
//!   invalidation does not track which series was affected, so the coarse
//!   clear is the safe choice at the cost of a re-fetch on the next lookup.
//!
//! Movie resolution is an ordered chain of matchers: exact normalized-path
//! match first, then the TMDb provider-id fallback. Episodes match by path
//! only. "No match" is a normal `None` result, never an error.

use crate::clients::{MovieCatalog, SeriesCatalog};
use crate::config::MountPrefixes;
use crate::models::{EpisodeEntry, MovieEntry, SeriesEntry, WatchedItem};
use crate::paths::normalize;
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Which catalog service a tag lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogService {
    /// The movie catalog.
    Movies,
    /// The series/episode catalog.
    Series,
}

impl CatalogService {
    /// Lowercase name for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Series => "series",
        }
    }
}

/// A successful movie resolution: the catalog id plus the entry's tag set,
/// which the cleanup pipeline checks against the keep tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieMatch {
    /// Catalog-side movie identifier.
    pub id: i64,
    /// Tag ids attached to the matched entry.
    pub tags: Vec<i64>,
}

/// Movie matcher strategies, evaluated in order; the first non-`None`
/// result wins. Additional strategies slot in here without restructuring
/// the resolution path.
#[derive(Debug, Clone, Copy)]
enum MovieMatcher {
    /// Exact match on normalized file path.
    Path,
    /// Fallback match on the TMDb provider id.
    ProviderId,
}

const MOVIE_MATCHERS: &[MovieMatcher] = &[MovieMatcher::Path, MovieMatcher::ProviderId];

/// Per-run mapper between watched items and the two catalogs.
///
/// Created at orchestrator construction and discarded at run end; caches are
/// private per-instance state, never process-wide.
pub struct MediaMapper<M: MovieCatalog, S: SeriesCatalog> {
    movie_catalog: M,
    series_catalog: S,
    prefixes: MountPrefixes,
    /// Movie id -> entry, filtered to entries with a file.
    movie_cache: Option<HashMap<i64, MovieEntry>>,
    /// Series id -> series metadata.
    series_cache: Option<HashMap<i64, SeriesEntry>>,
    /// Series id -> episodes with a file, populated lazily per series.
    episode_cache: HashMap<i64, Vec<EpisodeEntry>>,
    /// Tag id -> label, per catalog.
    movie_tag_cache: Option<HashMap<i64, String>>,
    series_tag_cache: Option<HashMap<i64, String>>,
}

impl<M: MovieCatalog, S: SeriesCatalog> MediaMapper<M, S> {
    /// Creates a mapper over the two catalog clients.
    pub fn new(movie_catalog: M, series_catalog: S, prefixes: MountPrefixes) -> Self {
        Self {
            movie_catalog,
            series_catalog,
            prefixes,
            movie_cache: None,
            series_cache: None,
            episode_cache: HashMap::new(),
            movie_tag_cache: None,
            series_tag_cache: None,
        }
    }

    fn ensure_movie_cache(&mut self) -> Result<()> {
        if self.movie_cache.is_none() {
            let movies = self.movie_catalog.movies()?;
            let cache: HashMap<i64, MovieEntry> = movies
                .into_iter()
                .filter(|m| m.has_file)
                .map(|m| (m.id, m))
                .collect();
            info!(count = cache.len(), "Cached movie catalog");
            self.movie_cache = Some(cache);
        }
        Ok(())
    }

    fn ensure_series_cache(&mut self) -> Result<()> {
        if self.series_cache.is_none() {
            let series = self.series_catalog.series()?;
            let cache: HashMap<i64, SeriesEntry> =
                series.into_iter().map(|s| (s.id, s)).collect();
            info!(count = cache.len(), "Cached series catalog");
            self.series_cache = Some(cache);
        }
        Ok(())
    }

    fn cached_episodes(&mut self, series_id: i64) -> Result<&[EpisodeEntry]> {
        if !self.episode_cache.contains_key(&series_id) {
            let episodes = self.series_catalog.episodes(series_id)?;
            let episodes: Vec<EpisodeEntry> =
                episodes.into_iter().filter(|e| e.has_file).collect();
            debug!(series_id, count = episodes.len(), "Cached episodes for series");
            self.episode_cache.insert(series_id, episodes);
        }
        Ok(self
            .episode_cache
            .get(&series_id)
            .map_or(&[], Vec::as_slice))
    }

    /// Resolves a watched movie to a catalog id via the matcher chain.
    ///
    /// Tries an exact normalized-path match first, then the TMDb fallback
    /// when the item carries one. Returns the matched entry's tag set along
    /// with the id so the caller can apply the keep-tag policy.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the catalog; "no match" is
    /// `Ok(None)`.
    pub fn resolve_movie(&mut self, item: &WatchedItem) -> Result<Option<MovieMatch>> {
        for matcher in MOVIE_MATCHERS {
            let id = match matcher {
                MovieMatcher::Path => match item.path.as_deref() {
                    Some(path) => self.find_movie_by_path(path)?,
                    None => None,
                },
                MovieMatcher::ProviderId => match item.tmdb_id() {
                    Some(tmdb) => self.find_movie_by_tmdb(tmdb)?,
                    None => None,
                },
            };
            if let Some(id) = id {
                let tags = self.movie_tags(id);
                return Ok(Some(MovieMatch { id, tags }));
            }
        }
        warn!(item = %item.display_name(), "No movie catalog match");
        Ok(None)
    }

    /// Finds a movie by exact normalized file path.
    ///
    /// # Errors
    ///
    /// Propagates transport failures when the movie cache must be fetched.
    pub fn find_movie_by_path(&mut self, path: &str) -> Result<Option<i64>> {
        self.ensure_movie_cache()?;
        let key = normalize(path, &self.prefixes.watch_movies);
        let Some(cache) = &self.movie_cache else {
            return Ok(None);
        };

        for (id, movie) in cache {
            let Some(movie_path) = movie.path.as_deref() else {
                continue;
            };
            if normalize(movie_path, &self.prefixes.movie_catalog) == key {
                debug!(movie_id = id, title = %movie.title, "Matched movie by path");
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }

    /// Finds a movie by TMDb id (fallback matcher).
    ///
    /// # Errors
    ///
    /// Propagates transport failures when the movie cache must be fetched.
    pub fn find_movie_by_tmdb(&mut self, tmdb_id: i64) -> Result<Option<i64>> {
        self.ensure_movie_cache()?;
        let Some(cache) = &self.movie_cache else {
            return Ok(None);
        };

        for (id, movie) in cache {
            if movie.tmdb_id == Some(tmdb_id) {
                debug!(movie_id = id, title = %movie.title, "Matched movie by TMDb id");
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }

    /// Tag ids of a cached movie, empty when the id is not cached.
    fn movie_tags(&self, id: i64) -> Vec<i64> {
        self.movie_cache
            .as_ref()
            .and_then(|cache| cache.get(&id))
            .map(|movie| movie.tags.clone())
            .unwrap_or_default()
    }

    /// Finds an episode file by exact normalized path.
    ///
    /// With a series id, only that series' cached episode list is scanned.
    /// Without one, every series' list is scanned, fetching lazily per
    /// series; that is the expensive fallback. Returns the episode-file id,
    /// not the episode id.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the series catalog.
    pub fn find_episode_by_path(
        &mut self,
        path: &str,
        series_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let key = normalize(path, &self.prefixes.watch_tv);

        let series_ids: Vec<i64> = match series_id {
            Some(id) => vec![id],
            None => {
                self.ensure_series_cache()?;
                self.series_cache
                    .as_ref()
                    .map(|cache| cache.keys().copied().collect())
                    .unwrap_or_default()
            }
        };

        for sid in series_ids {
            let prefix = self.prefixes.series_catalog.clone();
            for episode in self.cached_episodes(sid)? {
                let Some(episode_path) = episode.path.as_deref() else {
                    continue;
                };
                if normalize(episode_path, &prefix) == key {
                    debug!(
                        series_id = sid,
                        season = episode.season,
                        episode = episode.episode,
                        file_id = episode.file_id,
                        "Matched episode by path"
                    );
                    return Ok(Some(episode.file_id));
                }
            }
        }
        Ok(None)
    }

    /// Deletes a movie, asking the catalog to remove files from disk and to
    /// skip the import-exclusion list.
    ///
    /// Dry-run logs the intent and reports success without any network
    /// effect; caches are left untouched. Real mode evicts the single cache
    /// entry on success. `Ok(false)` is a per-item failure.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the catalog.
    pub fn delete_movie(&mut self, id: i64, dry_run: bool) -> Result<bool> {
        if dry_run {
            info!(movie_id = id, "[DRY RUN] Would delete movie");
            return Ok(true);
        }

        let deleted = self.movie_catalog.delete_movie(id)?;
        if deleted {
            info!(movie_id = id, "Deleted movie");
            if let Some(cache) = &mut self.movie_cache {
                cache.remove(&id);
            }
        }
        Ok(deleted)
    }

    /// Deletes a single episode file.
    ///
    /// Same dry-run contract as [`Self::delete_movie`]. Real-mode success
    /// clears the entire episode cache.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the catalog.
    pub fn delete_episode_file(&mut self, file_id: i64, dry_run: bool) -> Result<bool> {
        if dry_run {
            info!(file_id, "[DRY RUN] Would delete episode file");
            return Ok(true);
        }

        let deleted = self.series_catalog.delete_episode_file(file_id)?;
        if deleted {
            info!(file_id, "Deleted episode file");
            self.episode_cache.clear();
        }
        Ok(deleted)
    }

    /// Deletes a batch of episode files in one call.
    ///
    /// Same dry-run and cache-invalidation contract as
    /// [`Self::delete_episode_file`]: real-mode success clears the whole
    /// episode cache regardless of batch size.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the catalog.
    pub fn bulk_delete_episode_files(&mut self, file_ids: &[i64], dry_run: bool) -> Result<bool> {
        if dry_run {
            info!(
                count = file_ids.len(),
                ?file_ids,
                "[DRY RUN] Would bulk delete episode files"
            );
            return Ok(true);
        }

        let deleted = self.series_catalog.delete_episode_files(file_ids)?;
        if deleted {
            info!(count = file_ids.len(), "Bulk deleted episode files");
            self.episode_cache.clear();
        }
        Ok(deleted)
    }

    /// Resolves a tag label to its id in the given catalog,
    /// case-insensitively. Absence is a normal `None`, not an error.
    ///
    /// # Errors
    ///
    /// Propagates transport failures when the tag cache must be fetched.
    pub fn resolve_tag_id(&mut self, service: CatalogService, label: &str) -> Result<Option<i64>> {
        match service {
            CatalogService::Movies => {
                if self.movie_tag_cache.is_none() {
                    let tags = self.movie_catalog.tags()?;
                    info!(count = tags.len(), "Cached movie catalog tags");
                    self.movie_tag_cache =
                        Some(tags.into_iter().map(|t| (t.id, t.label)).collect());
                }
            }
            CatalogService::Series => {
                if self.series_tag_cache.is_none() {
                    let tags = self.series_catalog.tags()?;
                    info!(count = tags.len(), "Cached series catalog tags");
                    self.series_tag_cache =
                        Some(tags.into_iter().map(|t| (t.id, t.label)).collect());
                }
            }
        }

        let cache = match service {
            CatalogService::Movies => self.movie_tag_cache.as_ref(),
            CatalogService::Series => self.series_tag_cache.as_ref(),
        };
        Ok(cache.and_then(|tags| {
            tags.iter()
                .find(|(_, l)| l.eq_ignore_ascii_case(label))
                .map(|(id, _)| *id)
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use crate::Error;
    use std::cell::{Cell, RefCell};

    /// In-memory movie catalog counting fetches and recording deletes.
    struct FakeMovies {
        movies: Vec<MovieEntry>,
        tags: Vec<Tag>,
        list_calls: Cell<usize>,
        deleted: RefCell<Vec<i64>>,
        delete_succeeds: bool,
    }

    impl FakeMovies {
        fn new(movies: Vec<MovieEntry>) -> Self {
            Self {
                movies,
                tags: vec![Tag {
                    id: 5,
                    label: "keep".to_string(),
                }],
                list_calls: Cell::new(0),
                deleted: RefCell::new(Vec::new()),
                delete_succeeds: true,
            }
        }
    }

    impl MovieCatalog for FakeMovies {
        fn movies(&self) -> Result<Vec<MovieEntry>> {
            self.list_calls.set(self.list_calls.get() + 1);
            Ok(self.movies.clone())
        }

        fn tags(&self) -> Result<Vec<Tag>> {
            Ok(self.tags.clone())
        }

        fn delete_movie(&self, id: i64) -> Result<bool> {
            self.deleted.borrow_mut().push(id);
            Ok(self.delete_succeeds)
        }
    }

    /// In-memory series catalog.
    struct FakeSeries {
        series: Vec<SeriesEntry>,
        episodes: HashMap<i64, Vec<EpisodeEntry>>,
        episode_calls: Cell<usize>,
        deleted_files: RefCell<Vec<i64>>,
    }

    impl FakeSeries {
        fn empty() -> Self {
            Self {
                series: Vec::new(),
                episodes: HashMap::new(),
                episode_calls: Cell::new(0),
                deleted_files: RefCell::new(Vec::new()),
            }
        }
    }

    impl SeriesCatalog for FakeSeries {
        fn series(&self) -> Result<Vec<SeriesEntry>> {
            Ok(self.series.clone())
        }

        fn episodes(&self, series_id: i64) -> Result<Vec<EpisodeEntry>> {
            self.episode_calls.set(self.episode_calls.get() + 1);
            Ok(self.episodes.get(&series_id).cloned().unwrap_or_default())
        }

        fn tags(&self) -> Result<Vec<Tag>> {
            Ok(Vec::new())
        }

        fn delete_episode_file(&self, file_id: i64) -> Result<bool> {
            self.deleted_files.borrow_mut().push(file_id);
            Ok(true)
        }

        fn delete_episode_files(&self, file_ids: &[i64]) -> Result<bool> {
            self.deleted_files.borrow_mut().extend_from_slice(file_ids);
            Ok(true)
        }
    }

    /// Movie catalog whose every call fails at the transport level.
    struct DownMovies;

    impl MovieCatalog for DownMovies {
        fn movies(&self) -> Result<Vec<MovieEntry>> {
            Err(Error::transport("radarr", "connection refused"))
        }

        fn tags(&self) -> Result<Vec<Tag>> {
            Err(Error::transport("radarr", "connection refused"))
        }

        fn delete_movie(&self, _id: i64) -> Result<bool> {
            Err(Error::transport("radarr", "connection refused"))
        }
    }

    fn movie(id: i64, path: &str, tmdb: i64, tags: Vec<i64>) -> MovieEntry {
        MovieEntry {
            id,
            title: format!("Movie {id}"),
            has_file: true,
            path: Some(path.to_string()),
            tmdb_id: Some(tmdb),
            tags,
        }
    }

    fn episode(file_id: i64, season: u32, number: u32, path: &str) -> EpisodeEntry {
        EpisodeEntry {
            id: file_id * 100,
            file_id,
            has_file: true,
            path: Some(path.to_string()),
            season,
            episode: number,
        }
    }

    fn prefixes() -> MountPrefixes {
        MountPrefixes::default()
    }

    fn watched(path: &str, tmdb: Option<i64>) -> WatchedItem {
        let mut provider_ids = HashMap::new();
        if let Some(tmdb) = tmdb {
            provider_ids.insert("Tmdb".to_string(), tmdb.to_string());
        }
        WatchedItem {
            id: "j1".to_string(),
            name: "Item".to_string(),
            path: Some(path.to_string()),
            provider_ids,
            last_played: None,
            episode: None,
        }
    }

    #[test]
    fn test_movie_cache_populated_once() {
        let movies = FakeMovies::new(vec![movie(1, "/movies/A/a.mkv", 100, vec![])]);
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());

        assert_eq!(
            mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap(),
            Some(1)
        );
        assert_eq!(
            mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap(),
            Some(1)
        );
        assert_eq!(mapper.movie_catalog.list_calls.get(), 1);
    }

    #[test]
    fn test_entries_without_file_are_filtered() {
        let mut no_file = movie(2, "/movies/B/b.mkv", 200, vec![]);
        no_file.has_file = false;
        let movies = FakeMovies::new(vec![no_file]);
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());

        assert_eq!(mapper.find_movie_by_path("/media/movies/B/b.mkv").unwrap(), None);
        assert_eq!(mapper.find_movie_by_tmdb(200).unwrap(), None);
    }

    #[test]
    fn test_matcher_chain_prefers_path_then_falls_back_to_tmdb() {
        let movies = FakeMovies::new(vec![
            movie(1, "/movies/A/a.mkv", 100, vec![]),
            movie(2, "/movies/B/b.mkv", 200, vec![7]),
        ]);
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());

        // Path matches movie 1 even though the TMDb id points at movie 2.
        let matched = mapper
            .resolve_movie(&watched("/media/movies/A/a.mkv", Some(200)))
            .unwrap()
            .unwrap();
        assert_eq!(matched.id, 1);

        // Unmatched path falls back to the provider id.
        let matched = mapper
            .resolve_movie(&watched("/media/movies/elsewhere/x.mkv", Some(200)))
            .unwrap()
            .unwrap();
        assert_eq!(matched.id, 2);
        assert_eq!(matched.tags, vec![7]);

        // Neither path nor provider id: a normal None, not an error.
        assert!(mapper
            .resolve_movie(&watched("/media/movies/elsewhere/x.mkv", None))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_transport_error_propagates_from_resolution() {
        let mut mapper = MediaMapper::new(DownMovies, FakeSeries::empty(), prefixes());
        let err = mapper
            .resolve_movie(&watched("/media/movies/A/a.mkv", None))
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[test]
    fn test_dry_run_delete_makes_no_call_and_keeps_cache() {
        let movies = FakeMovies::new(vec![movie(1, "/movies/A/a.mkv", 100, vec![])]);
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());
        mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap();

        assert!(mapper.delete_movie(1, true).unwrap());
        assert!(mapper.movie_catalog.deleted.borrow().is_empty());

        // Entry still cached, no re-fetch.
        assert_eq!(
            mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap(),
            Some(1)
        );
        assert_eq!(mapper.movie_catalog.list_calls.get(), 1);
    }

    #[test]
    fn test_real_delete_evicts_only_that_movie() {
        let movies = FakeMovies::new(vec![
            movie(1, "/movies/A/a.mkv", 100, vec![]),
            movie(2, "/movies/B/b.mkv", 200, vec![]),
        ]);
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());
        mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap();

        assert!(mapper.delete_movie(1, false).unwrap());
        assert_eq!(*mapper.movie_catalog.deleted.borrow(), vec![1]);

        // Deleted entry is gone, its sibling is still served from cache.
        assert_eq!(mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap(), None);
        assert_eq!(
            mapper.find_movie_by_path("/media/movies/B/b.mkv").unwrap(),
            Some(2)
        );
        assert_eq!(mapper.movie_catalog.list_calls.get(), 1);
    }

    #[test]
    fn test_failed_delete_keeps_cache_entry() {
        let mut movies = FakeMovies::new(vec![movie(1, "/movies/A/a.mkv", 100, vec![])]);
        movies.delete_succeeds = false;
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());

        assert!(!mapper.delete_movie(1, false).unwrap());
        assert_eq!(
            mapper.find_movie_by_path("/media/movies/A/a.mkv").unwrap(),
            Some(1)
        );
    }

    fn series_fixture() -> FakeSeries {
        let mut fake = FakeSeries::empty();
        fake.series = vec![SeriesEntry {
            id: 10,
            title: "Breaking Bad".to_string(),
        }];
        fake.episodes.insert(
            10,
            vec![
                episode(42, 1, 1, "/tv/Breaking Bad/Season 01/e1.mkv"),
                episode(43, 1, 2, "/tv/Breaking Bad/Season 01/e2.mkv"),
            ],
        );
        fake
    }

    #[test]
    fn test_episode_match_scoped_and_full_scan() {
        let movies = FakeMovies::new(Vec::new());
        let mut mapper = MediaMapper::new(movies, series_fixture(), prefixes());

        // Scoped to a series.
        assert_eq!(
            mapper
                .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e2.mkv", Some(10))
                .unwrap(),
            Some(43)
        );

        // Full scan across every cached series.
        assert_eq!(
            mapper
                .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e1.mkv", None)
                .unwrap(),
            Some(42)
        );

        // Both lookups hit the same cached list.
        assert_eq!(mapper.series_catalog.episode_calls.get(), 1);
    }

    #[test]
    fn test_episode_delete_clears_entire_cache() {
        let movies = FakeMovies::new(Vec::new());
        let mut mapper = MediaMapper::new(movies, series_fixture(), prefixes());
        mapper
            .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e1.mkv", Some(10))
            .unwrap();
        assert_eq!(mapper.series_catalog.episode_calls.get(), 1);

        assert!(mapper.delete_episode_file(42, false).unwrap());

        // Next lookup re-fetches: the whole cache was cleared.
        mapper
            .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e2.mkv", Some(10))
            .unwrap();
        assert_eq!(mapper.series_catalog.episode_calls.get(), 2);
    }

    #[test]
    fn test_bulk_delete_dry_run_and_real_cache_contract() {
        let movies = FakeMovies::new(Vec::new());
        let mut mapper = MediaMapper::new(movies, series_fixture(), prefixes());
        mapper
            .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e1.mkv", Some(10))
            .unwrap();

        // Dry-run: no call, cache untouched.
        assert!(mapper.bulk_delete_episode_files(&[42, 43], true).unwrap());
        assert!(mapper.series_catalog.deleted_files.borrow().is_empty());
        assert_eq!(mapper.series_catalog.episode_calls.get(), 1);
        mapper
            .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e2.mkv", Some(10))
            .unwrap();
        assert_eq!(mapper.series_catalog.episode_calls.get(), 1);

        // Real: full clear regardless of batch size.
        assert!(mapper.bulk_delete_episode_files(&[42, 43], false).unwrap());
        assert_eq!(*mapper.series_catalog.deleted_files.borrow(), vec![42, 43]);
        mapper
            .find_episode_by_path("/media/tv/Breaking Bad/Season 01/e1.mkv", Some(10))
            .unwrap();
        assert_eq!(mapper.series_catalog.episode_calls.get(), 2);
    }

    #[test]
    fn test_resolve_tag_id_case_insensitive() {
        let movies = FakeMovies::new(Vec::new());
        let mut mapper = MediaMapper::new(movies, FakeSeries::empty(), prefixes());

        assert_eq!(
            mapper.resolve_tag_id(CatalogService::Movies, "KEEP").unwrap(),
            Some(5)
        );
        assert_eq!(
            mapper.resolve_tag_id(CatalogService::Movies, "missing").unwrap(),
            None
        );
        // Series catalog has no tags at all: absent, not an error.
        assert_eq!(
            mapper.resolve_tag_id(CatalogService::Series, "keep").unwrap(),
            None
        );
    }
}

//! Cleanup orchestration: phases, per-item policy pipeline, statistics.
//!
//! Two phases run strictly sequentially: all movies, then all episodes.
//! Episodes are grouped by series name purely for log readability. Each
//! item passes through the checks in a fixed order, and the order decides
//! which counter increments, so it is part of the observable contract:
//!
//! 1. missing last-played timestamp -> skipped (unknown state)
//! 2. within grace period -> skipped
//! 3. eligible
//! 4. no catalog match -> skipped (not found)
//! 5. keep tag present (movies only) -> skipped
//! 6. delete -> deleted or failed
//!
//! Every state is terminal per item; there are no retries. A transport
//! error aborts the remaining phase(s), but the statistics collected so far
//! are still logged before the error surfaces.

use crate::clients::{MovieCatalog, SeriesCatalog, WatchHistory};
use crate::config::SweepConfig;
use crate::mapper::{CatalogService, MediaMapper};
use crate::models::WatchedItem;
use crate::policy::{GracePeriod, KeepTag};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{debug, info, warn};

/// Converts usize to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn usize_to_f64(value: usize) -> f64 {
    let capped = u32::try_from(value).unwrap_or(u32::MAX);
    f64::from(capped)
}

/// Outcome counters for one phase (movies or episodes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// Watched items fetched.
    pub watched: usize,
    /// Skipped: no recorded playback timestamp.
    pub skipped_unknown: usize,
    /// Skipped: still within the grace period.
    pub skipped_grace: usize,
    /// Past the grace period and considered for deletion.
    pub eligible: usize,
    /// Skipped: no catalog match.
    pub skipped_not_found: usize,
    /// Skipped: carries the keep tag.
    pub skipped_keep_tag: usize,
    /// Deleted (or would be, in dry-run).
    pub deleted: usize,
    /// Deletion call answered with a non-success status.
    pub failed: usize,
}

impl PhaseStats {
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "{name}:");
        let _ = writeln!(out, "  Watched: {}", self.watched);
        let _ = writeln!(out, "  Skipped (no playback date): {}", self.skipped_unknown);
        let _ = writeln!(out, "  Skipped (within grace period): {}", self.skipped_grace);
        let _ = writeln!(out, "  Eligible for deletion: {}", self.eligible);
        let _ = writeln!(out, "  Skipped (not found): {}", self.skipped_not_found);
        let _ = writeln!(out, "  Skipped (keep tag): {}", self.skipped_keep_tag);
        let _ = writeln!(out, "  Deleted: {}", self.deleted);
        let _ = writeln!(out, "  Failed: {}", self.failed);
    }
}

/// Statistics for one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Movie phase counters.
    pub movies: PhaseStats,
    /// Episode phase counters.
    pub episodes: PhaseStats,
    /// Whether the run was a dry run.
    pub dry_run: bool,
}

impl CleanupStats {
    /// Whether any item-level deletion failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.movies.failed > 0 || self.episodes.failed > 0
    }

    /// Total deletions across both phases.
    #[must_use]
    pub const fn total_deleted(&self) -> usize {
        self.movies.deleted + self.episodes.deleted
    }

    /// Human-readable multi-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mode = if self.dry_run { " (DRY RUN)" } else { "" };
        let mut out = String::new();
        let _ = writeln!(out, "CLEANUP SUMMARY{mode}");
        self.movies.render("Movies", &mut out);
        self.episodes.render("Episodes", &mut out);
        out.truncate(out.trim_end().len());
        out
    }
}

/// Drives one cleanup run over a watch-state source and the two catalogs.
///
/// Owns the mapper (and therefore all per-run caches); construct one runner
/// per run and discard it afterwards.
pub struct CleanupRunner<W, M, S>
where
    W: WatchHistory,
    M: MovieCatalog,
    S: SeriesCatalog,
{
    watch: W,
    mapper: MediaMapper<M, S>,
    grace: GracePeriod,
    dry_run: bool,
    keep_tag_label: String,
    primary_user: String,
    stats: CleanupStats,
}

impl<W, M, S> CleanupRunner<W, M, S>
where
    W: WatchHistory,
    M: MovieCatalog,
    S: SeriesCatalog,
{
    /// Creates a runner from a watch-state source, a mapper, and the run
    /// configuration.
    pub fn new(watch: W, mapper: MediaMapper<M, S>, config: &SweepConfig) -> Self {
        Self {
            watch,
            mapper,
            grace: GracePeriod::new(config.grace_period_days),
            dry_run: config.dry_run,
            keep_tag_label: config.keep_tag_label.clone(),
            primary_user: config.primary_user.clone(),
            stats: CleanupStats {
                dry_run: config.dry_run,
                ..CleanupStats::default()
            },
        }
    }

    /// Statistics collected so far.
    #[must_use]
    pub const fn stats(&self) -> &CleanupStats {
        &self.stats
    }

    /// Executes the run: movie phase, then episode phase.
    ///
    /// The summary is logged whether or not the run completes; on success
    /// the collected statistics are returned.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the primary user is unknown, or a
    /// transport error when a collaborator call fails mid-run.
    pub fn run(&mut self) -> Result<CleanupStats> {
        info!(
            mode = if self.dry_run { "DRY RUN" } else { "LIVE" },
            grace_period_days = self.grace.days(),
            primary_user = %self.primary_user,
            keep_tag = %self.keep_tag_label,
            "Media cleanup starting"
        );

        let outcome = self.execute();
        info!("\n{}", self.stats.summary());

        metrics::counter!("cleanup_runs_total", "dry_run" => self.dry_run.to_string())
            .increment(1);
        metrics::gauge!("cleanup_movies_deleted").set(usize_to_f64(self.stats.movies.deleted));
        metrics::gauge!("cleanup_episodes_deleted").set(usize_to_f64(self.stats.episodes.deleted));
        metrics::gauge!("cleanup_failed_deletions")
            .set(usize_to_f64(self.stats.movies.failed + self.stats.episodes.failed));

        outcome.map(|()| self.stats)
    }

    fn execute(&mut self) -> Result<()> {
        let user_id = self.primary_user_id()?;
        let movie_keep = self.resolve_keep_tag(CatalogService::Movies)?;
        // The label is resolved for the series catalog too so a missing tag
        // is surfaced up front, but episodes get no tag check below: the
        // watched-episode payload carries no series-catalog id to look tags
        // up with. Known asymmetry, kept as-is.
        let _series_keep = self.resolve_keep_tag(CatalogService::Series)?;

        self.cleanup_movies(&user_id, movie_keep)?;
        self.cleanup_episodes(&user_id)
    }

    /// Resolves the configured primary user to an id, case-insensitively.
    fn primary_user_id(&self) -> Result<String> {
        let users = self.watch.users()?;
        let Some(user) = users
            .iter()
            .find(|u| u.name.eq_ignore_ascii_case(&self.primary_user))
        else {
            let available: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
            warn!(?available, "Primary user not found");
            return Err(Error::Config(format!(
                "primary user not found: {}",
                self.primary_user
            )));
        };
        info!(user = %user.name, id = %user.id, "Primary user resolved");
        Ok(user.id.clone())
    }

    /// Resolves the keep-tag label against one catalog.
    ///
    /// A missing label is a soft warning: the run proceeds with that
    /// catalog's tag exclusion disabled (fail-open).
    fn resolve_keep_tag(&mut self, service: CatalogService) -> Result<KeepTag> {
        let id = self.mapper.resolve_tag_id(service, &self.keep_tag_label)?;
        match id {
            Some(id) => info!(
                service = service.as_str(),
                tag_id = id,
                label = %self.keep_tag_label,
                "Keep tag resolved"
            ),
            None => warn!(
                service = service.as_str(),
                label = %self.keep_tag_label,
                "Keep tag not found; every item in this catalog is eligible"
            ),
        }
        Ok(KeepTag::new(id))
    }

    fn cleanup_movies(&mut self, user_id: &str, keep: KeepTag) -> Result<()> {
        info!("PHASE: cleaning up movies");
        let watched = self.watch.watched_movies(user_id)?;
        self.stats.movies.watched = watched.len();
        info!(count = watched.len(), "Fetched watched movies");

        let now = Utc::now();
        for item in &watched {
            self.process_movie(item, keep, now)?;
        }
        Ok(())
    }

    fn process_movie(&mut self, item: &WatchedItem, keep: KeepTag, now: DateTime<Utc>) -> Result<()> {
        let name = item.display_name();

        let Some(last_played) = item.last_played else {
            warn!(item = %name, "Skipping: no playback date recorded");
            self.stats.movies.skipped_unknown += 1;
            return Ok(());
        };

        let days_ago = (now - last_played).num_days();
        if !self.grace.is_past(last_played, now) {
            info!(item = %name, days_ago, "Skipping: within grace period");
            self.stats.movies.skipped_grace += 1;
            return Ok(());
        }

        self.stats.movies.eligible += 1;

        let Some(matched) = self.mapper.resolve_movie(item)? else {
            warn!(item = %name, "Cannot delete: not found in movie catalog");
            self.stats.movies.skipped_not_found += 1;
            return Ok(());
        };

        if keep.excludes(&matched.tags) {
            info!(item = %name, "Skipping: has keep tag");
            self.stats.movies.skipped_keep_tag += 1;
            return Ok(());
        }

        info!(item = %name, days_ago, "Deleting movie");
        if self.mapper.delete_movie(matched.id, self.dry_run)? {
            self.stats.movies.deleted += 1;
        } else {
            self.stats.movies.failed += 1;
        }
        Ok(())
    }

    fn cleanup_episodes(&mut self, user_id: &str) -> Result<()> {
        info!("PHASE: cleaning up episodes");
        let watched = self.watch.watched_episodes(user_id)?;
        self.stats.episodes.watched = watched.len();
        info!(count = watched.len(), "Fetched watched episodes");

        // Grouped by series for readable logs only; the per-item pipeline
        // is identical regardless of grouping.
        let mut by_series: BTreeMap<String, Vec<&WatchedItem>> = BTreeMap::new();
        for item in &watched {
            let series = item
                .episode
                .as_ref()
                .map_or("Unknown", |ep| ep.series_name.as_str());
            by_series.entry(series.to_string()).or_default().push(item);
        }
        info!(series = by_series.len(), "Across series");

        let now = Utc::now();
        for (series_name, episodes) in by_series {
            info!(series = %series_name, count = episodes.len(), "Processing series");
            for item in episodes {
                self.process_episode(item, now)?;
            }
        }
        Ok(())
    }

    fn process_episode(&mut self, item: &WatchedItem, now: DateTime<Utc>) -> Result<()> {
        let name = item.display_name();

        let Some(last_played) = item.last_played else {
            warn!(item = %name, "Skipping: no playback date recorded");
            self.stats.episodes.skipped_unknown += 1;
            return Ok(());
        };

        let days_ago = (now - last_played).num_days();
        if !self.grace.is_past(last_played, now) {
            debug!(item = %name, days_ago, "Skipping: within grace period");
            self.stats.episodes.skipped_grace += 1;
            return Ok(());
        }

        self.stats.episodes.eligible += 1;

        let Some(path) = item.path.as_deref() else {
            warn!(item = %name, "Cannot delete: no path reported");
            self.stats.episodes.skipped_not_found += 1;
            return Ok(());
        };
        let Some(file_id) = self.mapper.find_episode_by_path(path, None)? else {
            warn!(item = %name, "Cannot delete: not found in series catalog");
            self.stats.episodes.skipped_not_found += 1;
            return Ok(());
        };

        // No keep-tag check for episodes; see `execute`.

        info!(item = %name, days_ago, "Deleting episode file");
        if self.mapper.delete_episode_file(file_id, self.dry_run)? {
            self.stats.episodes.deleted += 1;
        } else {
            self.stats.episodes.failed += 1;
        }
        Ok(())
    }
}

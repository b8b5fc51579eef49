//! Configuration management.
//!
//! Layering, lowest to highest precedence: built-in defaults, environment
//! variables, an optional TOML config file, then CLI flags (applied by the
//! binary). The environment variable names match the deployment this tool
//! grew out of (`JELLYFIN_URL`, `RADARR_API_KEY`, `GRACE_PERIOD_DAYS`, ...).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Base URL plus the single persistent credential for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Service base URL.
    pub base_url: String,
    /// API key; must be non-empty before a run starts.
    pub api_key: String,
}

/// Mount prefixes for the two path-matching pairs.
///
/// The media server and each catalog mount the same library under different
/// roots; these prefixes are stripped before paths are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPrefixes {
    /// Media-server mount of the movie library.
    pub watch_movies: String,
    /// Media-server mount of the TV library.
    pub watch_tv: String,
    /// Movie catalog's mount of the movie library.
    pub movie_catalog: String,
    /// Series catalog's mount of the TV library.
    pub series_catalog: String,
}

impl Default for MountPrefixes {
    fn default() -> Self {
        Self {
            watch_movies: "/media/movies/".to_string(),
            watch_tv: "/media/tv/".to_string(),
            movie_catalog: "/movies/".to_string(),
            series_catalog: "/tv/".to_string(),
        }
    }
}

/// Main configuration for a cleanup run.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Days since last playback before an item becomes eligible.
    pub grace_period_days: u32,
    /// Simulate deletions instead of performing them. Defaults to `true`.
    pub dry_run: bool,
    /// Tag label whose presence exempts an item from deletion.
    pub keep_tag_label: String,
    /// Media-server user whose watch state drives the run.
    pub primary_user: String,
    /// Media server endpoint.
    pub jellyfin: ServiceEndpoint,
    /// Movie catalog endpoint.
    pub radarr: ServiceEndpoint,
    /// Series catalog endpoint.
    pub sonarr: ServiceEndpoint,
    /// Mount prefixes for path matching.
    pub prefixes: MountPrefixes,
    /// Optional log file, in addition to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grace_period_days: 5,
            dry_run: true,
            keep_tag_label: "keep".to_string(),
            primary_user: "admin".to_string(),
            jellyfin: ServiceEndpoint::default(),
            radarr: ServiceEndpoint::default(),
            sonarr: ServiceEndpoint::default(),
            prefixes: MountPrefixes::default(),
            log_file: None,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl SweepConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from environment variables over the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(days) = env_string("GRACE_PERIOD_DAYS").and_then(|v| v.parse().ok()) {
            config.grace_period_days = days;
        }
        if let Some(dry_run) = env_string("DRY_RUN") {
            config.dry_run = dry_run.eq_ignore_ascii_case("true");
        }
        if let Some(label) = env_string("KEEP_TAG_LABEL") {
            config.keep_tag_label = label;
        }
        if let Some(user) = env_string("PRIMARY_USER_NAME") {
            config.primary_user = user;
        }

        if let Some(url) = env_string("JELLYFIN_URL") {
            config.jellyfin.base_url = url;
        }
        if let Some(key) = env_string("JELLYFIN_API_KEY") {
            config.jellyfin.api_key = key;
        }
        if let Some(url) = env_string("RADARR_URL") {
            config.radarr.base_url = url;
        }
        if let Some(key) = env_string("RADARR_API_KEY") {
            config.radarr.api_key = key;
        }
        if let Some(url) = env_string("SONARR_URL") {
            config.sonarr.base_url = url;
        }
        if let Some(key) = env_string("SONARR_API_KEY") {
            config.sonarr.api_key = key;
        }

        if let Some(prefix) = env_string("JELLYFIN_MOVIE_PREFIX") {
            config.prefixes.watch_movies = prefix;
        }
        if let Some(prefix) = env_string("JELLYFIN_TV_PREFIX") {
            config.prefixes.watch_tv = prefix;
        }
        if let Some(prefix) = env_string("RADARR_PREFIX") {
            config.prefixes.movie_catalog = prefix;
        }
        if let Some(prefix) = env_string("SONARR_PREFIX") {
            config.prefixes.series_catalog = prefix;
        }

        if let Some(file) = env_string("WATCHSWEEP_LOG_FILE") {
            config.log_file = Some(PathBuf::from(file));
        }

        config
    }

    /// Loads configuration from a TOML file, applied over the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("cannot parse {}: {e}", path.display()))
        })?;

        Ok(Self::from_env().with_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir (`~/.config/watchsweep/config.toml` on
    /// Linux) and falls back to environment-only configuration when no file
    /// is found or readable.
    #[must_use]
    pub fn load_default() -> Self {
        if let Some(dirs) = directories::BaseDirs::new() {
            let config_path = dirs.config_dir().join("watchsweep").join("config.toml");
            if config_path.exists() {
                if let Ok(config) = Self::load_from_file(&config_path) {
                    return config;
                }
            }
        }
        Self::from_env()
    }

    /// Applies non-empty config-file values over `self`.
    fn with_config_file(mut self, file: ConfigFile) -> Self {
        if let Some(days) = file.grace_period_days {
            self.grace_period_days = days;
        }
        if let Some(dry_run) = file.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(label) = file.keep_tag_label {
            self.keep_tag_label = label;
        }
        if let Some(user) = file.primary_user {
            self.primary_user = user;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = Some(PathBuf::from(log_file));
        }

        for (section, endpoint) in [
            (file.jellyfin, &mut self.jellyfin),
            (file.radarr, &mut self.radarr),
            (file.sonarr, &mut self.sonarr),
        ] {
            if let Some(section) = section {
                if let Some(url) = section.url {
                    endpoint.base_url = url;
                }
                if let Some(key) = section.api_key {
                    endpoint.api_key = key;
                }
            }
        }

        if let Some(prefixes) = file.prefixes {
            if let Some(p) = prefixes.watch_movies {
                self.prefixes.watch_movies = p;
            }
            if let Some(p) = prefixes.watch_tv {
                self.prefixes.watch_tv = p;
            }
            if let Some(p) = prefixes.movie_catalog {
                self.prefixes.movie_catalog = p;
            }
            if let Some(p) = prefixes.series_catalog {
                self.prefixes.series_catalog = p;
            }
        }

        self
    }

    /// Verifies every required credential is present.
    ///
    /// Runs before any work begins; a missing key aborts the process with a
    /// failure exit code.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing key.
    pub fn validate_credentials(&self) -> Result<()> {
        for (key, name) in [
            (&self.jellyfin.api_key, "JELLYFIN_API_KEY"),
            (&self.radarr.api_key, "RADARR_API_KEY"),
            (&self.sonarr.api_key, "SONARR_API_KEY"),
        ] {
            if key.is_empty() {
                return Err(Error::Config(format!("{name} is not set")));
            }
        }
        Ok(())
    }

    /// Sets the grace period.
    #[must_use]
    pub const fn with_grace_period_days(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the keep-tag label.
    #[must_use]
    pub fn with_keep_tag_label(mut self, label: impl Into<String>) -> Self {
        self.keep_tag_label = label.into();
        self
    }

    /// Sets the primary user.
    #[must_use]
    pub fn with_primary_user(mut self, user: impl Into<String>) -> Self {
        self.primary_user = user.into();
        self
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    grace_period_days: Option<u32>,
    dry_run: Option<bool>,
    keep_tag_label: Option<String>,
    primary_user: Option<String>,
    log_file: Option<String>,
    jellyfin: Option<ConfigFileEndpoint>,
    radarr: Option<ConfigFileEndpoint>,
    sonarr: Option<ConfigFileEndpoint>,
    prefixes: Option<ConfigFilePrefixes>,
}

/// Endpoint section in the config file.
#[derive(Debug, Deserialize, Default)]
struct ConfigFileEndpoint {
    url: Option<String>,
    api_key: Option<String>,
}

/// Prefixes section in the config file.
#[derive(Debug, Deserialize, Default)]
struct ConfigFilePrefixes {
    watch_movies: Option<String>,
    watch_tv: Option<String>,
    movie_catalog: Option<String>,
    series_catalog: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_deployment() {
        let config = SweepConfig::default();
        assert_eq!(config.grace_period_days, 5);
        assert!(config.dry_run);
        assert_eq!(config.keep_tag_label, "keep");
        assert_eq!(config.primary_user, "admin");
        assert_eq!(config.prefixes.watch_movies, "/media/movies/");
        assert_eq!(config.prefixes.series_catalog, "/tv/");
    }

    #[test]
    fn test_validate_credentials_names_missing_key() {
        let mut config = SweepConfig::default();
        config.jellyfin.api_key = "jf".to_string();
        config.sonarr.api_key = "sn".to_string();

        let err = config.validate_credentials().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: RADARR_API_KEY is not set"
        );

        config.radarr.api_key = "rd".to_string();
        assert!(config.validate_credentials().is_ok());
    }

    #[test]
    fn test_config_file_overrides() {
        let file: ConfigFile = toml::from_str(
            r#"
            grace_period_days = 14
            dry_run = false
            primary_user = "alice"

            [radarr]
            url = "http://radarr:7878"
            api_key = "secret"

            [prefixes]
            watch_movies = "/library/movies/"
            "#,
        )
        .unwrap();
        let config = SweepConfig::default().with_config_file(file);

        assert_eq!(config.grace_period_days, 14);
        assert!(!config.dry_run);
        assert_eq!(config.primary_user, "alice");
        assert_eq!(config.radarr.base_url, "http://radarr:7878");
        assert_eq!(config.radarr.api_key, "secret");
        assert_eq!(config.prefixes.watch_movies, "/library/movies/");
        // Untouched sections keep their defaults.
        assert_eq!(config.keep_tag_label, "keep");
        assert_eq!(config.prefixes.watch_tv, "/media/tv/");
    }

    #[test]
    fn test_load_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "keep_tag_label = \"forever\"").unwrap();

        let config = SweepConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.keep_tag_label, "forever");
    }

    #[test]
    fn test_load_from_missing_file_is_a_config_error() {
        let err = SweepConfig::load_from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builders() {
        let config = SweepConfig::new()
            .with_grace_period_days(30)
            .with_dry_run(false)
            .with_keep_tag_label("hold")
            .with_primary_user("bob");
        assert_eq!(config.grace_period_days, 30);
        assert!(!config.dry_run);
        assert_eq!(config.keep_tag_label, "hold");
        assert_eq!(config.primary_user, "bob");
    }
}

//! Path normalization across service mount points.
//!
//! The media server and the two catalog services see the same files under
//! different mounts (e.g. `/media/movies/...` vs `/movies/...`). Paths are
//! reduced to a shared comparison key by stripping the configured mount
//! prefix, percent-decoding, and trimming separators.
//!
//! Comparison of normalized paths is **case-sensitive** by exact string
//! equality. Mounts that disagree on case will produce false negatives;
//! those items fall through to the provider-id matcher (movies) or are
//! reported as not found.

use percent_encoding::percent_decode_str;

/// Normalizes a file path for cross-service comparison.
///
/// - Strips `prefix` from the front of `path` (no-op if the path does not
///   start with it)
/// - Percent-decodes the remainder (invalid UTF-8 sequences are decoded
///   lossily)
/// - Trims leading and trailing `/`
///
/// Pure and deterministic; performs no I/O.
///
/// # Examples
///
/// ```rust
/// use watchsweep::paths::normalize;
///
/// let key = normalize(
///     "/media/movies/The Matrix (1999)/The Matrix (1999) REMUX-2160p.mkv",
///     "/media/movies/",
/// );
/// assert_eq!(key, "The Matrix (1999)/The Matrix (1999) REMUX-2160p.mkv");
/// ```
#[must_use]
pub fn normalize(path: &str, prefix: &str) -> String {
    let stripped = if prefix.is_empty() {
        path
    } else {
        path.strip_prefix(prefix).unwrap_or(path)
    };
    let decoded = percent_decode_str(stripped).decode_utf8_lossy();
    decoded.trim_matches('/').to_string()
}

//! Mount-path derivation for route modules.
//!
//! A module's logical path relative to the routes root maps onto the URL
//! prefix it is served under: platform separators become `/`, a source
//! suffix is stripped, and the configured context prefix is prepended.
//! Derivation is pure and runs exactly once per module at startup, before
//! any request is served.

use thiserror::Error;

/// A mount path could not be derived; always a fatal startup condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("context path must not be empty")]
    EmptyContextPath,
    #[error("context path `{0}` must start with '/'")]
    RelativeContextPath(String),
    #[error("context path `{0}` must not end with '/'")]
    TrailingSlash(String),
    #[error("module path `{0}` is empty after normalization")]
    EmptyModulePath(String),
}

/// Derive the URL prefix for a module declared at `relative_path`.
///
/// `relative_path` is written the way the file would sit under a routes
/// root (`"in_transit"`, `"admin/exports"`), optionally with a `.rs`
/// suffix or backslash separators, both of which are normalized away.
/// Distinct relative paths must yield distinct results; the caller treats
/// a collision as a startup defect rather than something to recover from.
pub fn mount_path(context_path: &str, relative_path: &str) -> Result<String, MountError> {
    if context_path.is_empty() {
        return Err(MountError::EmptyContextPath);
    }
    if !context_path.starts_with('/') {
        return Err(MountError::RelativeContextPath(context_path.to_owned()));
    }
    if context_path.ends_with('/') {
        return Err(MountError::TrailingSlash(context_path.to_owned()));
    }

    let normalized = relative_path.replace('\\', "/");
    let normalized = normalized.strip_suffix(".rs").unwrap_or(&normalized);
    let normalized = normalized.trim_matches('/');
    if normalized.is_empty() {
        return Err(MountError::EmptyModulePath(relative_path.to_owned()));
    }

    Ok(format!("{context_path}/{normalized}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_module_under_context_prefix() {
        assert_eq!(mount_path("/api", "a/b").unwrap(), "/api/a/b");
    }

    #[test]
    fn separators_and_suffix_are_normalized() {
        assert_eq!(
            mount_path("/api", "admin\\exports.rs").unwrap(),
            "/api/admin/exports"
        );
    }

    #[test]
    fn leading_separators_are_trimmed() {
        assert_eq!(mount_path("/api", "/in_transit").unwrap(), "/api/in_transit");
    }

    #[test]
    fn distinct_relative_paths_stay_distinct() {
        let a = mount_path("/api", "a/b").unwrap();
        let b = mount_path("/api", "a/c").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn context_path_must_be_predictable() {
        assert_eq!(mount_path("", "a").unwrap_err(), MountError::EmptyContextPath);
        assert_eq!(
            mount_path("api", "a").unwrap_err(),
            MountError::RelativeContextPath("api".to_owned())
        );
        assert_eq!(
            mount_path("/api/", "a").unwrap_err(),
            MountError::TrailingSlash("/api/".to_owned())
        );
    }

    #[test]
    fn module_path_must_survive_normalization() {
        assert_eq!(
            mount_path("/api", ".rs").unwrap_err(),
            MountError::EmptyModulePath(".rs".to_owned())
        );
    }
}

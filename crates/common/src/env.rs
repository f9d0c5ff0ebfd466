//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Check that the static asset directory exists; warn when it is missing.
///
/// Returns whether the directory is present so the router can decide to mount it.
pub async fn ensure_env(static_dir: &str) -> bool {
    match tokio::fs::metadata(static_dir).await {
        Ok(meta) if meta.is_dir() => true,
        Ok(_) => {
            warn!(%static_dir, "static path is not a directory; static assets will 404");
            false
        }
        Err(_) => {
            warn!(%static_dir, "static assets directory not found; static assets will 404");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn missing_dir_reports_false() {
        assert!(!ensure_env("/definitely/not/here/static").await);
    }

    #[tokio::test]
    async fn existing_dir_reports_true() {
        let dir = std::env::temp_dir();
        assert!(ensure_env(dir.to_str().unwrap_or(".")).await);
    }
}

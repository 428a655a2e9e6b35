//! File system helpers.

use tokio::fs;
use tracing::info;

use crate::error::Result;

/// Ensure the output directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a throwaway file.
/// Catching a read-only output location here is much cheaper than losing a
/// worker's first flush hours into a run.
pub async fn ensure_writable_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;

    let probe_path = format!("{}/.__probe_write__", path.trim_end_matches('/'));
    fs::write(&probe_path, b"").await?;
    fs::remove_file(&probe_path).await?;
    info!(path, "Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        let nested = nested.to_str().unwrap();

        ensure_writable_dir(nested).await.unwrap();

        assert!(std::path::Path::new(nested).is_dir());
    }

    #[tokio::test]
    async fn test_probe_file_is_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();

        ensure_writable_dir(dir).await.unwrap();

        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}

//! Helpers for constructing manifest fixtures in tests.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

/// File name the CLI looks for by default.
pub const MANIFEST_NAME: &str = "buildtree.yml";

/// Prefix the provided manifest body with the standard version header.
#[must_use]
pub fn manifest_yaml(body: &str) -> String {
    format!("buildtree_version: \"1.0.0\"\n{body}")
}

/// Write `yaml` as `buildtree.yml` into a fresh temporary directory.
///
/// Returns the directory guard and its UTF-8 path.
///
/// # Errors
///
/// Fails when the directory cannot be created, is not valid UTF-8, or the
/// manifest cannot be written.
pub fn write_manifest(yaml: &str) -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("create temp dir")?;
    let canonical = dir.path().canonicalize().context("canonicalise temp dir")?;
    let root = Utf8PathBuf::from_path_buf(canonical)
        .map_err(|p| anyhow::anyhow!("temp dir {} is not UTF-8", p.display()))?;
    fs::write(root.join(MANIFEST_NAME), yaml).context("write manifest")?;
    Ok((dir, root))
}

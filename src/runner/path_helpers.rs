//! Path resolution helpers for the runner module.
//!
//! Centralises manifest and working-directory logic so the main runner module
//! stays focused on command dispatch.

use crate::cli::Cli;
use crate::ir::normalize_lexically;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::{Path, PathBuf};

use super::RunnerError;

fn to_utf8(path: &Path) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|path| RunnerError::NonUtf8Path { path })
}

/// The working directory commands run in: the process working directory
/// joined with `-C`, when given.
pub(super) fn working_dir(cli: &Cli) -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("reading the current directory")?;
    let mut dir = to_utf8(&cwd)?;
    if let Some(sub) = &cli.directory {
        dir = dir.join(to_utf8(sub)?);
    }
    Ok(normalize_lexically(&dir))
}

/// Determine the manifest path respecting the CLI's directory option.
///
/// # Errors
///
/// Returns [`RunnerError::NonUtf8Path`] when `--file` is not valid UTF-8.
pub(super) fn resolve_manifest_path(cli: &Cli, working_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let file = to_utf8(&cli.file)?;
    Ok(normalize_lexically(&working_dir.join(file)))
}

/// Directory relative manifest paths are resolved against.
pub(super) fn manifest_base_dir(manifest_path: &Utf8Path) -> Utf8PathBuf {
    manifest_path
        .parent()
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf)
}

/// Resolve `--relocate` against the working directory.
pub(super) fn resolve_relocation(
    relocate: Option<&PathBuf>,
    working_dir: &Utf8Path,
) -> Result<Option<Utf8PathBuf>> {
    let Some(path) = relocate else {
        return Ok(None);
    };
    let path = to_utf8(path)?;
    Ok(Some(normalize_lexically(&working_dir.join(path))))
}

pub(super) fn ensure_manifest_exists(manifest_path: &Utf8Path) -> Result<(), RunnerError> {
    if manifest_path.as_std_path().exists() {
        Ok(())
    } else {
        Err(RunnerError::ManifestNotFound {
            path: manifest_path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("buildtree").chain(args.iter().copied()))
    }

    #[rstest]
    #[case(&[], "/work/buildtree.yml")]
    #[case(&["-f", "conf/tree.yml"], "/work/conf/tree.yml")]
    #[case(&["-f", "/abs/tree.yml"], "/abs/tree.yml")]
    fn manifest_path_is_anchored_to_working_dir(#[case] args: &[&str], #[case] expected: &str) {
        let path = resolve_manifest_path(&cli(args), Utf8Path::new("/work")).expect("path");
        assert_eq!(path.as_str(), expected);
        assert_eq!(
            manifest_base_dir(&path).as_str(),
            Utf8Path::new(expected).parent().map_or(".", Utf8Path::as_str)
        );
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("out"), Some("/work/out"))]
    #[case(Some("../shared/build"), Some("/shared/build"))]
    #[case(Some("/tmp/out"), Some("/tmp/out"))]
    fn relocation_is_anchored_to_working_dir(
        #[case] relocate: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let relocate = relocate.map(PathBuf::from);
        let resolved =
            resolve_relocation(relocate.as_ref(), Utf8Path::new("/work")).expect("relocation");
        assert_eq!(resolved.as_deref().map(Utf8Path::as_str), expected);
    }

    #[rstest]
    fn missing_manifest_is_reported() {
        let err = ensure_manifest_exists(Utf8Path::new("/definitely/not/here.yml"))
            .expect_err("missing");
        assert!(matches!(err, RunnerError::ManifestNotFound { .. }));
    }
}

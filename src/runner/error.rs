//! Error types for the runner module.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors raised during command execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The manifest file does not exist at the expected path.
    #[error("manifest `{path}` not found")]
    #[diagnostic(
        code(buildtree::runner::manifest_not_found),
        help("pass the manifest with `--file` or run from the directory containing it")
    )]
    ManifestNotFound {
        /// The path that was attempted.
        path: Utf8PathBuf,
    },

    /// A path supplied on the command line is not valid UTF-8.
    #[error("path `{}` is not valid UTF-8", .path.display())]
    #[diagnostic(code(buildtree::runner::non_utf8_path))]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// The root build directory contains the root project itself.
    #[error("refusing to remove `{path}`: it contains the project directory `{project_dir}`")]
    #[diagnostic(
        code(buildtree::runner::unsafe_clean),
        help("relocate the root build directory outside the source tree")
    )]
    UnsafeClean {
        /// Build directory that would have been removed.
        path: Utf8PathBuf,
        /// Root project directory below it.
        project_dir: Utf8PathBuf,
    },

    /// Removing the build directory failed.
    #[error("failed to remove `{path}`")]
    #[diagnostic(code(buildtree::runner::clean))]
    Clean {
        /// Directory that could not be removed.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

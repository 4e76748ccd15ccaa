//! Manifest loading helpers.
//!
//! This module parses a project-tree manifest from YAML and checks that its
//! format version is one this crate understands. Structural validation of the
//! tree itself happens later, during the configuration pass.

use crate::ast::BuildtreeManifest;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use std::fs;
use thiserror::Error;

/// Default manifest file name looked up by the command line.
pub const DEFAULT_MANIFEST: &str = "buildtree.yml";

/// Major manifest format version accepted by this crate.
pub const SUPPORTED_MAJOR: u64 = 1;

/// Errors raised while loading a manifest.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}")]
    #[diagnostic(code(buildtree::manifest::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML or does not match the schema.
    #[error("failed to parse manifest {name}: {message}")]
    #[diagnostic(
        code(buildtree::manifest::parse),
        help("check the manifest against the documented schema; unknown keys are rejected")
    )]
    Parse {
        /// Display name of the manifest.
        name: String,
        /// Parser message.
        message: String,
    },

    /// The manifest declares a format version this crate cannot read.
    #[error("manifest {name} declares unsupported version {found}")]
    #[diagnostic(
        code(buildtree::manifest::version),
        help("set buildtree_version to a 1.x release")
    )]
    UnsupportedVersion {
        /// Display name of the manifest.
        name: String,
        /// Version found in the manifest.
        found: semver::Version,
    },
}

fn from_str_named(yaml: &str, name: &str) -> Result<BuildtreeManifest, ManifestError> {
    let manifest: BuildtreeManifest =
        serde_saphyr::from_str(yaml).map_err(|e| ManifestError::Parse {
            name: name.to_owned(),
            message: e.to_string(),
        })?;
    if manifest.buildtree_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            name: name.to_owned(),
            found: manifest.buildtree_version,
        });
    }
    tracing::debug!(
        manifest = name,
        subprojects = manifest.subprojects.len(),
        constraints = manifest.evaluation_order.len(),
        "parsed manifest",
    );
    Ok(manifest)
}

/// Parse a manifest from a YAML string.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] when the YAML is malformed or does not
/// match the schema, and [`ManifestError::UnsupportedVersion`] when the
/// declared format version is not supported.
pub fn from_str(yaml: &str) -> Result<BuildtreeManifest, ManifestError> {
    from_str_named(yaml, DEFAULT_MANIFEST)
}

/// Load a [`BuildtreeManifest`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<BuildtreeManifest, ManifestError> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref).map_err(|source| ManifestError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    from_str_named(&data, path_ref.as_str())
}

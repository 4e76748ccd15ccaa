//! Build output path resolution.
//!
//! Output paths are a two-level map: the root build directory is set first,
//! then every subproject's directory is `root/name`, computed independently
//! of every other subproject. [`OutputPathResolver`] owns the root path while
//! it is still being decided; [`ConfigContext`] is the frozen, shareable
//! result threaded down the project tree.

use std::collections::HashMap;
use std::sync::Arc;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::ast::Properties;

use super::error::UnresolvedRootError;

/// Derive the output directory of `subproject_name` below `root`.
///
/// The result depends only on its arguments.
#[must_use]
pub fn derive_subproject_path(root: &Utf8Path, subproject_name: &str) -> Utf8PathBuf {
    root.join(subproject_name)
}

/// Normalise `path` without touching the filesystem.
///
/// `.` components are dropped and `..` removes the preceding normal
/// component. Leading `..` components of a relative path are kept; `..`
/// directly below the filesystem root is dropped. An empty result is `.`.
///
/// ```
/// use buildtree::ir::normalize_lexically;
/// use camino::Utf8Path;
///
/// let p = normalize_lexically(Utf8Path::new("android/build/../../build"));
/// assert_eq!(p.as_str(), "build");
/// ```
#[must_use]
pub fn normalize_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Utf8PathBuf::from(".");
    }
    let mut out = Utf8PathBuf::new();
    for part in parts {
        out.push(part.as_str());
    }
    out
}

/// A subproject path together with the root generation it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPath {
    path: Utf8PathBuf,
    generation: u64,
}

impl DerivedPath {
    /// Borrow the derived directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Consume the wrapper returning the directory.
    #[must_use]
    pub fn into_path(self) -> Utf8PathBuf {
        self.path
    }

    /// Root generation this path was derived from.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holds the root build directory during a configuration pass and derives
/// subproject defaults from it.
///
/// Every call to [`relocate_root`](Self::relocate_root) starts a new
/// generation and drops cached defaults. Paths handed out earlier are stale
/// and [`is_current`](Self::is_current) reports them as such; callers must
/// derive again.
#[derive(Debug, Default)]
pub struct OutputPathResolver {
    root: Option<Utf8PathBuf>,
    generation: u64,
    cache: HashMap<String, Utf8PathBuf>,
}

impl OutputPathResolver {
    /// Create a resolver with no root path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current root build directory, if one has been set.
    #[must_use]
    pub fn root(&self) -> Option<&Utf8Path> {
        self.root.as_deref()
    }

    /// Number of relocations performed so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Set the root build directory to `new_path`.
    pub fn relocate_root(&mut self, new_path: impl Into<Utf8PathBuf>) {
        let new_path = new_path.into();
        tracing::debug!(
            from = self.root.as_deref().map(Utf8Path::as_str),
            to = %new_path,
            "relocating root build directory",
        );
        self.root = Some(new_path);
        self.generation += 1;
        self.cache.clear();
    }

    /// Relocate the root relative to its current location.
    ///
    /// Absolute `relocation` paths replace the root outright; relative ones
    /// are joined onto the current root and normalised lexically.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedRootError`] when `relocation` is relative and no
    /// root has been set.
    pub fn relocate_root_relative(
        &mut self,
        relocation: &Utf8Path,
    ) -> Result<Utf8PathBuf, UnresolvedRootError> {
        let target = if relocation.is_absolute() {
            normalize_lexically(relocation)
        } else {
            let current = self.root.as_deref().ok_or_else(|| UnresolvedRootError {
                requested_by: format!("relocation to {relocation}"),
            })?;
            normalize_lexically(&current.join(relocation))
        };
        self.relocate_root(target.clone());
        Ok(target)
    }

    /// Derive the default output directory of `subproject_name`.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedRootError`] when the root has not been set.
    pub fn derive_subproject_path(
        &mut self,
        subproject_name: &str,
    ) -> Result<DerivedPath, UnresolvedRootError> {
        let root = self.root.as_deref().ok_or_else(|| UnresolvedRootError {
            requested_by: subproject_name.to_owned(),
        })?;
        let path = self
            .cache
            .entry(subproject_name.to_owned())
            .or_insert_with(|| derive_subproject_path(root, subproject_name))
            .clone();
        Ok(DerivedPath {
            path,
            generation: self.generation,
        })
    }

    /// Whether `derived` was computed from the current root.
    #[must_use]
    pub const fn is_current(&self, derived: &DerivedPath) -> bool {
        derived.generation == self.generation
    }

    /// Snapshot the root into an immutable [`ConfigContext`] carrying
    /// `properties`.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedRootError`] when the root has not been set.
    pub fn context(&self, properties: &Properties) -> Result<ConfigContext, UnresolvedRootError> {
        let root = self.root.clone().ok_or_else(|| UnresolvedRootError {
            requested_by: "configuration context".to_owned(),
        })?;
        Ok(ConfigContext {
            root_build_dir: Arc::new(root),
            properties: Arc::new(properties.clone()),
        })
    }
}

/// Immutable configuration threaded from the root down to each subproject.
///
/// Cloning is cheap; the root path and property map are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigContext {
    root_build_dir: Arc<Utf8PathBuf>,
    properties: Arc<Properties>,
}

impl ConfigContext {
    /// The resolved root build directory.
    #[must_use]
    pub fn root_build_dir(&self) -> &Utf8Path {
        self.root_build_dir.as_path()
    }

    /// Properties visible at this level of the tree.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Default output directory for `subproject_name`.
    #[must_use]
    pub fn output_dir_for(&self, subproject_name: &str) -> Utf8PathBuf {
        derive_subproject_path(&self.root_build_dir, subproject_name)
    }

    /// Context for a descendant declaring `overrides`.
    ///
    /// Keys in `overrides` replace inherited values in place; new keys are
    /// appended.
    #[must_use]
    pub fn child(&self, overrides: &Properties) -> Self {
        if overrides.is_empty() {
            return self.clone();
        }
        let mut merged = (*self.properties).clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        Self {
            root_build_dir: Arc::clone(&self.root_build_dir),
            properties: Arc::new(merged),
        }
    }
}

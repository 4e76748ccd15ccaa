//! Buildtree manifest Abstract Syntax Tree structures.
//!
//! This module defines the data structures used to represent a parsed
//! project-tree manifest. They mirror the YAML schema and are deserialised
//! with `serde-saphyr`.
//!
//! ```rust
//! use buildtree::ast::BuildtreeManifest;
//!
//! let yaml = "buildtree_version: \"1.0.0\"\nroot:\n  name: android\nsubprojects:\n  - name: app\n";
//! let manifest: BuildtreeManifest = serde_saphyr::from_str(yaml).expect("parse");
//! assert_eq!(manifest.root.name, "android");
//! assert_eq!(manifest.subprojects.len(), 1);
//! ```

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Shared string properties inherited down the project tree.
pub type Properties = IndexMap<String, String>;

/// Dependent selector matching every subproject except the dependency.
pub const WILDCARD: &str = "*";

/// Top-level manifest structure.
///
/// ```yaml
/// buildtree_version: "1.0.0"
/// root:
///   name: android
///   relocate: ../../build
/// subprojects:
///   - name: app
/// evaluation_order:
///   - dependent: "*"
///     dependency: app
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildtreeManifest {
    /// Semantic version of the manifest format.
    pub buildtree_version: Version,

    /// The root project of the tree.
    pub root: RootProject,

    /// Properties shared with every project in the tree.
    #[serde(default)]
    pub properties: Properties,

    /// Subprojects discovered below the root, in declaration order.
    #[serde(default)]
    pub subprojects: Vec<Subproject>,

    /// Declared "evaluate after" relationships between subprojects.
    #[serde(default)]
    pub evaluation_order: Vec<OrderConstraint>,
}

/// The root project declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RootProject {
    /// Name of the root project.
    pub name: String,

    /// Project directory, relative to the manifest's directory.
    #[serde(default)]
    pub dir: Option<Utf8PathBuf>,

    /// Conventional build directory, relative to `dir`. Defaults to `build`.
    #[serde(default)]
    pub build_dir: Option<Utf8PathBuf>,

    /// New location of the root build directory. Relative paths are
    /// resolved against the conventional build directory.
    #[serde(default)]
    pub relocate: Option<Utf8PathBuf>,
}

/// A subproject declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Subproject {
    /// Name, unique across the tree.
    pub name: String,

    /// Parent project name. Omitted means the root.
    #[serde(default)]
    pub parent: Option<String>,

    /// Project directory relative to the parent's directory. Defaults to the
    /// subproject name.
    #[serde(default)]
    pub dir: Option<Utf8PathBuf>,

    /// Explicit build directory, relative to the project directory. Takes
    /// precedence over the directory derived from the root.
    #[serde(default)]
    pub build_dir: Option<Utf8PathBuf>,

    /// Properties overriding inherited ones for this subtree.
    #[serde(default)]
    pub properties: Properties,
}

/// `dependent` is evaluated no earlier than `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrderConstraint {
    /// Subproject whose evaluation waits, or [`WILDCARD`].
    pub dependent: String,
    /// Subproject evaluated first.
    pub dependency: String,
}

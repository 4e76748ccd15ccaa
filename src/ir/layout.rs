//! The result of a configuration pass.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::Properties;

use super::order::EvaluationOrderConstraint;

/// A project with its build settings resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProject {
    /// Project name.
    pub name: String,
    /// Parent name; `None` for the root.
    pub parent: Option<String>,
    /// Project directory.
    pub project_dir: Utf8PathBuf,
    /// Effective build output directory.
    pub build_dir: Utf8PathBuf,
    /// Properties after inheritance.
    pub properties: Properties,
}

/// Resolved output directories and evaluation order for a project tree.
///
/// Immutable once produced; share it with `Arc` if several readers need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildLayout {
    /// The root project.
    pub root: ResolvedProject,
    /// Subprojects keyed by name, in evaluation order.
    pub subprojects: IndexMap<String, ResolvedProject>,
    /// Subproject names, every dependency before its dependents.
    pub evaluation_order: Vec<String>,
    /// Ordering constraints the order satisfies.
    pub constraints: Vec<EvaluationOrderConstraint>,
}

impl BuildLayout {
    /// The root build directory every default is derived from.
    #[must_use]
    pub fn root_build_dir(&self) -> &Utf8Path {
        &self.root.build_dir
    }

    /// Build directory of the named project, root included.
    #[must_use]
    pub fn build_dir_of(&self, name: &str) -> Option<&Utf8Path> {
        self.project(name).map(|p| p.build_dir.as_path())
    }

    /// Look up a resolved project by name, root included.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&ResolvedProject> {
        if name == self.root.name {
            Some(&self.root)
        } else {
            self.subprojects.get(name)
        }
    }

    /// The root followed by every subproject in evaluation order.
    pub fn projects(&self) -> impl Iterator<Item = &ResolvedProject> {
        std::iter::once(&self.root).chain(self.subprojects.values())
    }
}

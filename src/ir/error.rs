//! Error types raised by the configuration pass.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Ordering constraints form a cycle.
///
/// The cycle starts and ends at its lexicographically smallest project.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("evaluation order contains a cycle: {}", .cycle.join(" -> "))]
#[diagnostic(
    code(buildtree::ir::cycle),
    help("remove one of the evaluation_order entries along this path")
)]
pub struct CycleError {
    /// Projects on the cycle; the first entry is repeated at the end.
    pub cycle: Vec<String>,
}

/// A subproject output directory was requested before the root build
/// directory was set.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("output directory for `{requested_by}` requested before the root build directory was set")]
#[diagnostic(
    code(buildtree::ir::unresolved_root),
    help("relocate the root build directory before deriving subproject paths")
)]
pub struct UnresolvedRootError {
    /// Name of the project, or operation, that asked for a path.
    pub requested_by: String,
}

/// Errors that abort a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    /// Two projects share a name.
    #[error("project `{name}` is declared more than once")]
    #[diagnostic(code(buildtree::ir::duplicate_project))]
    DuplicateProject {
        /// The repeated name.
        name: String,
    },

    /// A project name cannot be used as a single path component.
    #[error("invalid project name `{name}`: {reason}")]
    #[diagnostic(
        code(buildtree::ir::invalid_name),
        help("project names become directory names and must be a single path component")
    )]
    InvalidProjectName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A subproject names a parent that does not exist.
    #[error("project `{project}` declares unknown parent `{parent}`")]
    #[diagnostic(code(buildtree::ir::unknown_parent))]
    UnknownParent {
        /// The declaring project.
        project: String,
        /// The missing parent.
        parent: String,
    },

    /// An ordering constraint names a project that is not a subproject.
    #[error("evaluation order references unknown subproject `{name}`")]
    #[diagnostic(
        code(buildtree::ir::unknown_project),
        help("only subprojects take part in ordering; the root is always evaluated first")
    )]
    UnknownProject {
        /// The unknown name.
        name: String,
    },

    /// Parent declarations loop back on themselves.
    #[error("parent declarations form a cycle: {}", .cycle.join(" -> "))]
    #[diagnostic(code(buildtree::ir::parent_cycle))]
    ParentCycle {
        /// Projects on the cycle; the first entry is repeated at the end.
        cycle: Vec<String>,
    },

    /// Two projects resolve to the same output directory.
    #[error("output directory {path} is claimed by {}", .projects.join(", "))]
    #[diagnostic(
        code(buildtree::ir::duplicate_output),
        help("give one of these projects a distinct build_dir")
    )]
    DuplicateOutput {
        /// The shared directory.
        path: Utf8PathBuf,
        /// Projects claiming it, sorted.
        projects: Vec<String>,
    },

    /// Ordering constraints form a cycle.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cycle(#[from] CycleError),

    /// A path was derived before the root was set.
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnresolvedRoot(#[from] UnresolvedRootError),
}

//! Intermediate representation of a configured project tree.
//!
//! A configuration pass turns a [`crate::ast::BuildtreeManifest`] into a
//! [`BuildLayout`]: every project's resolved build output directory plus an
//! evaluation order consistent with the declared ordering constraints.
//!
//! # Examples
//!
//! ```
//! use buildtree::ir::{OutputPathResolver, derive_subproject_path};
//! use camino::Utf8Path;
//!
//! let mut resolver = OutputPathResolver::new();
//! resolver.relocate_root("/out");
//! let app = resolver.derive_subproject_path("app").expect("root is set");
//! assert_eq!(app.path(), Utf8Path::new("/out/app"));
//! assert_eq!(derive_subproject_path(Utf8Path::new("/out"), "lib").as_str(), "/out/lib");
//! ```

mod cycle;
mod error;
mod from_manifest;
mod layout;
mod order;
mod resolver;
mod tree;

pub use error::{ConfigError, CycleError, UnresolvedRootError};
pub use from_manifest::PassOptions;
pub use layout::{BuildLayout, ResolvedProject};
pub use order::{EvaluationGraph, EvaluationOrderConstraint};
pub use resolver::{
    ConfigContext, DerivedPath, OutputPathResolver, derive_subproject_path, normalize_lexically,
};
pub use tree::{ProjectNode, ProjectTree};

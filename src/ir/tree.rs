//! The project tree discovered from a manifest.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::ast::{BuildtreeManifest, Properties, Subproject, WILDCARD};

use super::error::ConfigError;
use super::resolver::normalize_lexically;

/// Conventional build directory name below a project directory.
pub const CONVENTIONAL_BUILD_DIR: &str = "build";

/// A root or subproject node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNode {
    /// Unique name.
    pub name: String,
    /// Parent name; `None` only for the root.
    pub parent: Option<String>,
    /// Normalised project directory.
    pub project_dir: Utf8PathBuf,
    /// Explicitly declared build directory, already joined onto
    /// `project_dir`.
    pub build_dir: Option<Utf8PathBuf>,
    /// Properties declared on this node.
    pub properties: Properties,
}

impl ProjectNode {
    /// `true` for the root node.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Every project of one configuration pass, parents before children.
///
/// The node set is fixed once built.
#[derive(Debug, Clone)]
pub struct ProjectTree {
    root: ProjectNode,
    subprojects: IndexMap<String, ProjectNode>,
}

impl ProjectTree {
    /// Create a tree holding only the root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProjectName`] for an unusable name.
    pub fn new(root_name: &str, root_dir: &Utf8Path) -> Result<Self, ConfigError> {
        validate_name(root_name)?;
        let root = ProjectNode {
            name: root_name.to_owned(),
            parent: None,
            project_dir: normalize_lexically(root_dir),
            build_dir: None,
            properties: Properties::new(),
        };
        Ok(Self {
            root,
            subprojects: IndexMap::new(),
        })
    }

    /// Build the tree declared by `manifest`, resolving directories against
    /// `base_dir`.
    ///
    /// Subprojects may be declared before their parents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid or duplicate names, unknown
    /// parents, and cyclic parent declarations.
    pub fn from_manifest(
        manifest: &BuildtreeManifest,
        base_dir: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        let root_spec = &manifest.root;
        let root_dir = root_spec
            .dir
            .as_ref()
            .map_or_else(|| base_dir.to_path_buf(), |dir| base_dir.join(dir));
        let mut tree = Self::new(&root_spec.name, &root_dir)?;
        tree.root.properties.clone_from(&manifest.properties);
        let build_dir = root_spec
            .build_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(CONVENTIONAL_BUILD_DIR));
        tree.root.build_dir = Some(normalize_lexically(&tree.root.project_dir.join(build_dir)));

        let mut specs: IndexMap<&str, &Subproject> = IndexMap::new();
        for spec in &manifest.subprojects {
            validate_name(&spec.name)?;
            if spec.name == root_spec.name || specs.insert(spec.name.as_str(), spec).is_some() {
                return Err(ConfigError::DuplicateProject {
                    name: spec.name.clone(),
                });
            }
        }

        let mut trail = Vec::new();
        for &name in specs.keys() {
            tree.insert_spec(name, &specs, &mut trail)?;
        }
        Ok(tree)
    }

    /// Insert `name` after its ancestors. `trail` holds the names whose
    /// insertion is in progress.
    fn insert_spec<'s>(
        &mut self,
        name: &'s str,
        specs: &IndexMap<&'s str, &'s Subproject>,
        trail: &mut Vec<&'s str>,
    ) -> Result<(), ConfigError> {
        if self.subprojects.contains_key(name) {
            return Ok(());
        }
        if let Some(pos) = trail.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = trail
                .iter()
                .skip(pos)
                .map(|n| (*n).to_owned())
                .collect();
            cycle.push(name.to_owned());
            return Err(ConfigError::ParentCycle { cycle });
        }
        let Some(spec) = specs.get(name).copied() else {
            return Ok(());
        };

        let parent_name = match spec.parent.as_deref() {
            None => self.root.name.clone(),
            Some(parent) if parent == self.root.name => parent.to_owned(),
            Some(parent) => {
                let Some((&declared, _)) = specs.get_key_value(parent) else {
                    return Err(ConfigError::UnknownParent {
                        project: name.to_owned(),
                        parent: parent.to_owned(),
                    });
                };
                trail.push(name);
                let inserted = self.insert_spec(declared, specs, trail);
                trail.pop();
                inserted?;
                parent.to_owned()
            }
        };

        let parent_dir = self
            .get(&parent_name)
            .map(|p| p.project_dir.clone())
            .ok_or_else(|| ConfigError::UnknownParent {
                project: name.to_owned(),
                parent: parent_name.clone(),
            })?;
        let project_dir = normalize_lexically(
            &spec
                .dir
                .as_ref()
                .map_or_else(|| parent_dir.join(name), |dir| parent_dir.join(dir)),
        );
        let build_dir = spec
            .build_dir
            .as_ref()
            .map(|dir| normalize_lexically(&project_dir.join(dir)));

        tracing::debug!(project = name, parent = %parent_name, dir = %project_dir, "discovered subproject");
        self.subprojects.insert(
            name.to_owned(),
            ProjectNode {
                name: name.to_owned(),
                parent: Some(parent_name),
                project_dir,
                build_dir,
                properties: spec.properties.clone(),
            },
        );
        Ok(())
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> &ProjectNode {
        &self.root
    }

    /// Look up a node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProjectNode> {
        if name == self.root.name {
            Some(&self.root)
        } else {
            self.subprojects.get(name)
        }
    }

    /// Look up a subproject by name; the root is not returned.
    #[must_use]
    pub fn subproject(&self, name: &str) -> Option<&ProjectNode> {
        self.subprojects.get(name)
    }

    /// Every node, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectNode> {
        std::iter::once(&self.root).chain(self.subprojects.values())
    }

    /// Every node except the root, parents before children.
    pub fn subprojects(&self) -> impl Iterator<Item = &ProjectNode> {
        self.subprojects.values()
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subprojects.len() + 1
    }

    /// Always `false`: a tree holds at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name == WILDCARD {
        Some("`*` is reserved for selecting every subproject")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.trim() != name {
        Some("name has surrounding whitespace")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(ConfigError::InvalidProjectName {
            name: name.to_owned(),
            reason: reason.to_owned(),
        })
    })
}

//! Manifest-to-layout conversion: the configuration pass.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::ast::{BuildtreeManifest, WILDCARD};

use super::{
    error::{ConfigError, UnresolvedRootError},
    layout::{BuildLayout, ResolvedProject},
    order::EvaluationGraph,
    resolver::{ConfigContext, OutputPathResolver},
    tree::{CONVENTIONAL_BUILD_DIR, ProjectNode, ProjectTree},
};

/// Inputs of a configuration pass that do not come from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOptions {
    /// Directory relative manifest paths are resolved against.
    pub base_dir: Utf8PathBuf,
    /// Relocation overriding the manifest's `root.relocate`.
    pub relocate: Option<Utf8PathBuf>,
}

impl PassOptions {
    /// Options resolving paths against `base_dir` with no override.
    #[must_use]
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            relocate: None,
        }
    }

    /// Override the manifest's root relocation.
    #[must_use]
    pub fn with_relocate(mut self, relocate: impl Into<Utf8PathBuf>) -> Self {
        self.relocate = Some(relocate.into());
        self
    }
}

impl BuildLayout {
    /// Run a configuration pass over `manifest`.
    ///
    /// Ordering constraints are validated before any output directory is
    /// derived, and the root is relocated before any subproject asks for its
    /// default. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the tree is malformed, the ordering
    /// constraints form a cycle, or two projects resolve to the same output
    /// directory. No partial layout is produced.
    pub fn from_manifest(
        manifest: &BuildtreeManifest,
        options: &PassOptions,
    ) -> Result<Self, ConfigError> {
        let tree = ProjectTree::from_manifest(manifest, &options.base_dir)?;
        let graph = Self::process_constraints(manifest, &tree)?;
        let evaluation_order = graph.evaluation_order()?;

        let mut resolver = OutputPathResolver::new();
        Self::relocate_root(&tree, manifest, options, &mut resolver)?;
        let contexts = Self::thread_contexts(&tree, &resolver)?;

        let root = resolve_project(tree.root(), &contexts, |_| {
            Ok(resolver.root().map(Utf8Path::to_path_buf))
        })?;
        let mut subprojects = IndexMap::with_capacity(evaluation_order.len());
        for name in &evaluation_order {
            let node = tree
                .subproject(name)
                .ok_or_else(|| ConfigError::UnknownProject { name: name.clone() })?;
            let project = resolve_project(node, &contexts, |node| {
                let derived = resolver.derive_subproject_path(&node.name)?;
                Ok(Some(derived.into_path()))
            })?;
            tracing::debug!(project = %name, build_dir = %project.build_dir, "resolved output directory");
            subprojects.insert(name.clone(), project);
        }

        let layout = Self {
            root,
            subprojects,
            evaluation_order,
            constraints: graph.constraints().collect(),
        };
        ensure_unique_outputs(&layout)?;
        tracing::info!(
            root = %layout.root_build_dir(),
            subprojects = layout.subprojects.len(),
            "configuration pass complete",
        );
        Ok(layout)
    }

    /// Build the evaluation graph. `"*"` as a dependent selects every
    /// subproject except the dependency itself.
    fn process_constraints(
        manifest: &BuildtreeManifest,
        tree: &ProjectTree,
    ) -> Result<EvaluationGraph, ConfigError> {
        let mut graph = EvaluationGraph::new(tree.subprojects().map(|n| n.name.as_str()));
        for constraint in &manifest.evaluation_order {
            if constraint.dependent == WILDCARD {
                if !graph.contains(&constraint.dependency) {
                    return Err(ConfigError::UnknownProject {
                        name: constraint.dependency.clone(),
                    });
                }
                for node in tree.subprojects() {
                    if node.name != constraint.dependency {
                        graph.apply_ordering_constraint(&node.name, &constraint.dependency)?;
                    }
                }
            } else {
                graph.apply_ordering_constraint(&constraint.dependent, &constraint.dependency)?;
            }
        }
        Ok(graph)
    }

    fn relocate_root(
        tree: &ProjectTree,
        manifest: &BuildtreeManifest,
        options: &PassOptions,
        resolver: &mut OutputPathResolver,
    ) -> Result<(), ConfigError> {
        let root = tree.root();
        let conventional = root
            .build_dir
            .clone()
            .unwrap_or_else(|| root.project_dir.join(CONVENTIONAL_BUILD_DIR));
        resolver.relocate_root(conventional);
        let relocation = options
            .relocate
            .as_deref()
            .or(manifest.root.relocate.as_deref());
        if let Some(relocation) = relocation {
            let relocated = resolver.relocate_root_relative(relocation)?;
            tracing::info!(root = %root.name, build_dir = %relocated, "relocated root build directory");
        }
        Ok(())
    }

    /// One context per project, each derived from its parent's.
    fn thread_contexts(
        tree: &ProjectTree,
        resolver: &OutputPathResolver,
    ) -> Result<HashMap<String, ConfigContext>, ConfigError> {
        let mut contexts = HashMap::with_capacity(tree.len());
        let root = tree.root();
        contexts.insert(root.name.clone(), resolver.context(&root.properties)?);
        for node in tree.subprojects() {
            let parent = node
                .parent
                .as_deref()
                .and_then(|p| contexts.get(p))
                .ok_or_else(|| ConfigError::UnknownParent {
                    project: node.name.clone(),
                    parent: node.parent.clone().unwrap_or_default(),
                })?;
            let context = parent.child(&node.properties);
            contexts.insert(node.name.clone(), context);
        }
        Ok(contexts)
    }
}

/// Resolve `node`, preferring its declared build directory over `default`.
fn resolve_project<F>(
    node: &ProjectNode,
    contexts: &HashMap<String, ConfigContext>,
    mut default: F,
) -> Result<ResolvedProject, ConfigError>
where
    F: FnMut(&ProjectNode) -> Result<Option<Utf8PathBuf>, ConfigError>,
{
    let build_dir = match (&node.build_dir, node.is_root()) {
        (Some(declared), false) => declared.clone(),
        _ => default(node)?.ok_or_else(|| UnresolvedRootError {
            requested_by: node.name.clone(),
        })?,
    };
    let properties = contexts
        .get(&node.name)
        .map(|ctx| ctx.properties().clone())
        .unwrap_or_default();
    Ok(ResolvedProject {
        name: node.name.clone(),
        parent: node.parent.clone(),
        project_dir: node.project_dir.clone(),
        build_dir,
        properties,
    })
}

fn ensure_unique_outputs(layout: &BuildLayout) -> Result<(), ConfigError> {
    let mut claimed: HashMap<&Utf8Path, &str> = HashMap::new();
    for project in layout.projects() {
        if let Some(previous) = claimed.insert(project.build_dir.as_path(), project.name.as_str()) {
            let mut projects = vec![previous.to_owned(), project.name.clone()];
            projects.sort();
            return Err(ConfigError::DuplicateOutput {
                path: project.build_dir.clone(),
                projects,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest;
    use rstest::rstest;

    fn layout(yaml: &str) -> Result<BuildLayout, ConfigError> {
        let manifest = manifest::from_str(yaml).expect("manifest");
        BuildLayout::from_manifest(&manifest, &PassOptions::new("/proj"))
    }

    #[rstest]
    fn root_without_relocation_keeps_conventional_dir() {
        let layout = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "subprojects:\n",
            "  - name: app\n",
        ))
        .expect("layout");
        assert_eq!(layout.root_build_dir().as_str(), "/proj/build");
        assert_eq!(
            layout.build_dir_of("app").map(Utf8Path::as_str),
            Some("/proj/build/app")
        );
    }

    #[rstest]
    fn nested_subprojects_are_namespaced_under_the_root() {
        let layout = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "subprojects:\n",
            "  - name: features\n",
            "  - name: camera\n",
            "    parent: features\n",
        ))
        .expect("layout");
        assert_eq!(
            layout.build_dir_of("camera").map(Utf8Path::as_str),
            Some("/proj/build/camera")
        );
        let camera = layout.project("camera").expect("camera");
        assert_eq!(camera.project_dir.as_str(), "/proj/features/camera");
    }

    #[rstest]
    fn declared_build_dir_wins_over_derived_default() {
        let layout = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "  relocate: /out\n",
            "subprojects:\n",
            "  - name: app\n",
            "    build_dir: custom\n",
            "  - name: lib\n",
        ))
        .expect("layout");
        assert_eq!(
            layout.build_dir_of("app").map(Utf8Path::as_str),
            Some("/proj/app/custom")
        );
        assert_eq!(layout.build_dir_of("lib").map(Utf8Path::as_str), Some("/out/lib"));
    }

    #[rstest]
    fn properties_inherit_down_the_tree() {
        let layout = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "properties:\n",
            "  camera: \"1.3.0\"\n",
            "  lifecycle: \"2.6.1\"\n",
            "subprojects:\n",
            "  - name: features\n",
            "    properties:\n",
            "      camera: \"1.4.0\"\n",
            "  - name: scanner\n",
            "    parent: features\n",
            "  - name: app\n",
        ))
        .expect("layout");
        let scanner = layout.project("scanner").expect("scanner");
        assert_eq!(scanner.properties.get("camera").map(String::as_str), Some("1.4.0"));
        assert_eq!(
            scanner.properties.get("lifecycle").map(String::as_str),
            Some("2.6.1")
        );
        let app = layout.project("app").expect("app");
        assert_eq!(app.properties.get("camera").map(String::as_str), Some("1.3.0"));
    }

    #[rstest]
    fn wildcard_dependent_skips_the_dependency() {
        let layout = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "subprojects:\n",
            "  - name: lib\n",
            "  - name: camera\n",
            "  - name: app\n",
            "evaluation_order:\n",
            "  - dependent: \"*\"\n",
            "    dependency: app\n",
        ))
        .expect("layout");
        assert_eq!(layout.evaluation_order, ["app", "lib", "camera"]);
        assert_eq!(layout.constraints.len(), 2);
        assert!(layout.constraints.iter().all(|c| c.dependency == "app"));
    }

    #[rstest]
    fn wildcard_with_unknown_dependency_fails() {
        let err = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "evaluation_order:\n",
            "  - dependent: \"*\"\n",
            "    dependency: app\n",
        ))
        .expect_err("unknown");
        assert_eq!(err, ConfigError::UnknownProject { name: "app".into() });
    }

    #[rstest]
    fn root_cannot_take_part_in_ordering() {
        let err = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "subprojects:\n",
            "  - name: app\n",
            "evaluation_order:\n",
            "  - dependent: app\n",
            "    dependency: android\n",
        ))
        .expect_err("root is not orderable");
        assert!(matches!(err, ConfigError::UnknownProject { .. }));
    }

    #[rstest]
    fn colliding_outputs_are_rejected() {
        let err = layout(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "subprojects:\n",
            "  - name: app\n",
            "  - name: lib\n",
            "    build_dir: ../build/app\n",
        ))
        .expect_err("collision");
        assert_eq!(
            err,
            ConfigError::DuplicateOutput {
                path: Utf8PathBuf::from("/proj/build/app"),
                projects: vec!["app".into(), "lib".into()],
            }
        );
    }

    #[rstest]
    fn cli_override_wins_over_manifest_relocation() {
        let manifest = manifest::from_str(concat!(
            "buildtree_version: \"1.0.0\"\n",
            "root:\n",
            "  name: android\n",
            "  relocate: ../../build\n",
            "subprojects:\n",
            "  - name: app\n",
        ))
        .expect("manifest");
        let options = PassOptions::new("/proj").with_relocate("/elsewhere");
        let layout = BuildLayout::from_manifest(&manifest, &options).expect("layout");
        assert_eq!(
            layout.build_dir_of("app").map(Utf8Path::as_str),
            Some("/elsewhere/app")
        );
    }
}

//! Evaluation ordering constraints between subprojects.
//!
//! Constraints are directed edges from a dependent to the dependency whose
//! configuration must be evaluated first. The edge set is kept acyclic: an
//! edge that would close a cycle is rejected and the graph left unchanged.

use indexmap::IndexSet;
use serde::Serialize;

use super::cycle::{self, Adjacency, CycleDetectionReport};
use super::error::{ConfigError, CycleError};

/// `dependent`'s evaluation must not complete before `dependency`'s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EvaluationOrderConstraint {
    /// The project that waits.
    pub dependent: String,
    /// The project evaluated first.
    pub dependency: String,
}

/// Acyclic set of [`EvaluationOrderConstraint`]s over registered projects.
///
/// ```
/// use buildtree::ir::EvaluationGraph;
///
/// let mut graph = EvaluationGraph::new(["a", "b", "c"]);
/// graph.apply_ordering_constraint("a", "b").expect("acyclic");
/// graph.apply_ordering_constraint("b", "c").expect("acyclic");
/// assert!(graph.apply_ordering_constraint("c", "a").is_err());
/// assert_eq!(graph.evaluation_order().expect("order"), ["c", "b", "a"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvaluationGraph {
    edges: Adjacency,
}

impl EvaluationGraph {
    /// Create a graph over `nodes` with no constraints.
    #[must_use]
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    /// Register a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, node: impl Into<String>) -> bool {
        let node = node.into();
        if self.edges.contains_key(&node) {
            return false;
        }
        self.edges.insert(node, IndexSet::new());
        true
    }

    /// Whether `node` is registered.
    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    /// Registered nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Register that `dependent` is evaluated no earlier than `dependency`.
    ///
    /// Re-applying an existing constraint is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProject`] when either node is not
    /// registered and [`ConfigError::Cycle`] when the constraint would close
    /// a cycle. The graph is unchanged on error.
    pub fn apply_ordering_constraint(
        &mut self,
        dependent: &str,
        dependency: &str,
    ) -> Result<(), ConfigError> {
        for name in [dependent, dependency] {
            if !self.contains(name) {
                return Err(ConfigError::UnknownProject {
                    name: name.to_owned(),
                });
            }
        }
        if dependent == dependency {
            return Err(CycleError {
                cycle: vec![dependent.to_owned(), dependency.to_owned()],
            }
            .into());
        }
        let Some(deps) = self.edges.get_mut(dependent) else {
            return Ok(());
        };
        if !deps.insert(dependency.to_owned()) {
            return Ok(());
        }

        if let Some(cycle) = cycle::find_cycle(&self.edges) {
            if let Some(deps) = self.edges.get_mut(dependent) {
                deps.shift_remove(dependency);
            }
            tracing::debug!(dependent, dependency, ?cycle, "rejected ordering constraint");
            return Err(CycleError { cycle }.into());
        }
        tracing::debug!(dependent, dependency, "applied ordering constraint");
        Ok(())
    }

    /// Direct dependencies of `node`, in the order they were applied.
    pub fn dependencies_of(&self, node: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(node)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Every constraint, grouped by dependent in registration order.
    pub fn constraints(&self) -> impl Iterator<Item = EvaluationOrderConstraint> + '_ {
        self.edges.iter().flat_map(|(dependent, deps)| {
            deps.iter().map(move |dependency| EvaluationOrderConstraint {
                dependent: dependent.clone(),
                dependency: dependency.clone(),
            })
        })
    }

    /// Check the whole graph for cycles.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] naming the first cycle found.
    pub fn validate(&self) -> Result<(), CycleError> {
        self.evaluation_order().map(drop)
    }

    /// All nodes ordered so that every dependency precedes its dependents.
    ///
    /// Registration order breaks ties, so the result is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the graph contains a cycle.
    pub fn evaluation_order(&self) -> Result<Vec<String>, CycleError> {
        let CycleDetectionReport { cycle, postorder } = cycle::analyse(&self.edges);
        match cycle {
            Some(cycle) => Err(CycleError { cycle }),
            None => Ok(postorder),
        }
    }
}

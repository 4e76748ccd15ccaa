//! Cycle detection and ordering for the evaluation graph.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

/// Adjacency list: each dependent maps to the dependencies it waits for.
/// Every dependency is itself a key.
pub(crate) type Adjacency = IndexMap<String, IndexSet<String>>;

/// Tracks the visitation state of a node during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

pub(crate) struct CycleDetectionReport {
    pub(crate) cycle: Option<Vec<String>>,
    /// Nodes in the order their traversal finished: dependencies first.
    pub(crate) postorder: Vec<String>,
}

pub(crate) fn analyse(graph: &Adjacency) -> CycleDetectionReport {
    let mut detector = CycleDetector::new(graph);
    let mut cycle = None;
    for node in graph.keys() {
        if detector.is_visited(node) {
            continue;
        }
        if let Some(found) = detector.visit(node) {
            cycle = Some(found);
            break;
        }
    }
    CycleDetectionReport {
        cycle,
        postorder: detector.postorder,
    }
}

pub(crate) fn find_cycle(graph: &Adjacency) -> Option<Vec<String>> {
    analyse(graph).cycle
}

struct CycleDetector<'a> {
    graph: &'a Adjacency,
    stack: Vec<&'a str>,
    states: HashMap<&'a str, VisitState>,
    postorder: Vec<String>,
}

impl<'a> CycleDetector<'a> {
    fn new(graph: &'a Adjacency) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            states: HashMap::new(),
            postorder: Vec::with_capacity(graph.len()),
        }
    }

    fn is_visited(&self, node: &str) -> bool {
        matches!(self.states.get(node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: &'a str) -> Option<Vec<String>> {
        match self.states.get(node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self
                    .stack
                    .iter()
                    .position(|n| *n == node)
                    .unwrap_or_else(|| {
                        debug_assert!(false, "visiting node must be on the stack");
                        0
                    });
                let mut cycle: Vec<String> =
                    self.stack.iter().skip(idx).map(|n| (*n).to_owned()).collect();
                cycle.push(node.to_owned());
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node, VisitState::Visiting);
            }
        }

        self.stack.push(node);

        let graph = self.graph;
        if let Some(deps) = graph.get(node) {
            for dep in deps {
                if let Some(cycle) = self.visit(dep) {
                    return Some(cycle);
                }
            }
        }

        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        self.postorder.push(node.to_owned());
        None
    }
}

fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        slot.clone_from(&first);
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> Adjacency {
        edges
            .iter()
            .map(|(node, deps)| {
                (
                    (*node).to_owned(),
                    deps.iter().map(|d| (*d).to_owned()).collect(),
                )
            })
            .collect()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn detects_self_edge_cycle() {
        let g = graph(&[("a", &["a"])]);
        assert_eq!(find_cycle(&g), Some(names(&["a", "a"])));
    }

    #[test]
    fn marks_nodes_visited_after_traversal() {
        let g = graph(&[("a", &["b"]), ("b", &[])]);
        let mut detector = CycleDetector::new(&g);
        assert!(detector.visit("a").is_none());
        assert!(detector.is_visited("a"));
        assert!(detector.is_visited("b"));
        assert!(
            detector.stack.is_empty(),
            "stack should be empty after complete traversal",
        );
    }

    #[test]
    fn postorder_lists_dependencies_first() {
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        let report = analyse(&g);
        assert!(report.cycle.is_none());
        assert_eq!(report.postorder, names(&["c", "b", "a"]));
    }

    #[test]
    fn shared_dependency_is_emitted_once() {
        let g = graph(&[("a", &["c"]), ("b", &["c"]), ("c", &[])]);
        let report = analyse(&g);
        assert_eq!(report.postorder, names(&["c", "a", "b"]));
    }

    #[test]
    fn identifies_two_node_cycle() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        assert_eq!(find_cycle(&g), Some(names(&["a", "b", "a"])));
    }

    #[test]
    fn canonicalize_rotates_smallest_node() {
        let cycle = names(&["c", "a", "b", "c"]);
        assert_eq!(canonicalize_cycle(cycle), names(&["a", "b", "c", "a"]));
    }

    #[test]
    fn canonicalize_handles_reverse_direction() {
        let cycle = names(&["c", "b", "a", "c"]);
        assert_eq!(canonicalize_cycle(cycle), names(&["a", "c", "b", "a"]));
    }
}

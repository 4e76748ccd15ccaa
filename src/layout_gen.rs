//! Renderers for a resolved [`BuildLayout`].
//!
//! Every renderer is deterministic so its output can be compared directly in
//! tests and diffed between runs.

use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::ir::{BuildLayout, EvaluationOrderConstraint, ResolvedProject};

/// Render one `name<TAB>build_dir` line per project, the root first and then
/// every subproject in evaluation order.
///
/// ```
/// use buildtree::{ir::{BuildLayout, PassOptions}, layout_gen, manifest};
///
/// let m = manifest::from_str(
///     "buildtree_version: \"1.0.0\"\nroot:\n  name: demo\nsubprojects:\n  - name: app\n",
/// ).expect("manifest");
/// let layout = BuildLayout::from_manifest(&m, &PassOptions::new("/p")).expect("layout");
/// assert_eq!(layout_gen::text(&layout), "demo\t/p/build\napp\t/p/build/app\n");
/// ```
#[must_use]
pub fn text(layout: &BuildLayout) -> String {
    layout
        .projects()
        .map(|p| format!("{}\n", ProjectLine(p)))
        .collect()
}

/// Render subproject names in evaluation order, one per line.
#[must_use]
pub fn order(layout: &BuildLayout) -> String {
    layout
        .evaluation_order
        .iter()
        .map(|name| format!("{name}\n"))
        .collect()
}

/// Render the layout as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialisation fails.
pub fn json(layout: &BuildLayout) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(layout)?;
    out.push('\n');
    Ok(out)
}

/// Render the ordering constraints as a Graphviz `digraph`.
///
/// Every subproject appears as a node; edges point from dependent to
/// dependency. Nodes and edges are sorted.
#[must_use]
pub fn dot(layout: &BuildLayout) -> String {
    let nodes = layout
        .subprojects
        .keys()
        .sorted()
        .map(|name| format!("  {};\n", quote(name)))
        .join("");
    let edges = layout
        .constraints
        .iter()
        .sorted_by(|a, b| {
            (&a.dependent, &a.dependency).cmp(&(&b.dependent, &b.dependency))
        })
        .map(|c| format!("  {}\n", DotEdge(c)))
        .join("");
    format!("digraph buildtree {{\n{nodes}{edges}}}\n")
}

struct ProjectLine<'a>(&'a ResolvedProject);

impl Display for ProjectLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.0.name, self.0.build_dir)
    }
}

struct DotEdge<'a>(&'a EvaluationOrderConstraint);

impl Display for DotEdge<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {};",
            quote(&self.0.dependent),
            quote(&self.0.dependency)
        )
    }
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

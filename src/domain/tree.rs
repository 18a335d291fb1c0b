//! Tree reduction
//!
//! Converts a validated [`CallGraph`] into a traversable parent/child
//! structure. A call graph is not a tree: a callee can be shared by many
//! callers, there can be several independent entry points, and recursion
//! (direct or mutual) creates cycles. The reduction merges callees by name,
//! hangs every parentless function under a synthetic root, and anchors
//! "standalone loops" (mutually recursive clusters no root can reach) so
//! that every node ends up reachable exactly once.
//!
//! Nodes live in an index-based arena (`NodeId` into a `Vec<Node>`), which
//! sidesteps the ownership cycle that parent and child back-references would
//! otherwise create, and makes the deep copy a plain structure clone.

use std::collections::{HashMap, HashSet};

use crate::common::{CallscapeError, Result};
use crate::domain::callgraph::CallGraph;

/// Name of the synthetic root. `<` and `>` are not identifier characters,
/// so it cannot collide with a real function.
pub const ROOT_NAME: &str = "<root>";

/// Arena index of a node. Valid only within the `Presenter` (or clone of it)
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One function identity within the reduced structure. `children` holds the
/// callees in first-call order; `parents` is the back-reference set used for
/// loop anchoring and link healing, never ownership.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }
}

/// The reduced, presentable form of one call graph.
///
/// Owns the graph snapshot it was built from (still needed to classify
/// "has a known definition"), the node arena, and a name lookup covering
/// every node ever created. Cheap queries and traversals are all that is
/// left after construction; the only mutations are [`Presenter::remove`]
/// and the filter that builds on it.
#[derive(Debug, Clone)]
pub struct Presenter {
    graph: CallGraph,
    nodes: Vec<Node>,
    lookup: HashMap<String, NodeId>,
    defined: HashSet<String>,
    root: NodeId,
}

impl Presenter {
    /// Validate `graph` and reduce it. Fails with `Validation` on bad input
    /// and `Structural` if the post-build invariant check trips.
    pub fn new(graph: CallGraph) -> Result<Self> {
        graph.validate()?;

        let mut nodes = vec![Node {
            name: ROOT_NAME.to_string(),
            children: Vec::new(),
            parents: Vec::new(),
        }];
        let mut lookup = HashMap::new();
        lookup.insert(ROOT_NAME.to_string(), NodeId(0));

        // Phase 1: allocate a slot per distinct name, in first-seen order.
        // Creation order is the deterministic tie-break used below.
        for func in &graph.nodes {
            intern(&mut nodes, &mut lookup, &func.id);
            for callee in &func.callees {
                intern(&mut nodes, &mut lookup, callee);
            }
        }

        // Phase 2: link edges, forward and back.
        for func in &graph.nodes {
            let fid = resolve(&lookup, &func.id)?;
            for callee in &func.callees {
                let cid = resolve(&lookup, callee)?;
                link(&mut nodes, fid, cid);
            }
        }

        // Phase 3: every function nobody calls goes under the root.
        let root = NodeId(0);
        for idx in 1..nodes.len() {
            if nodes[idx].parents.is_empty() {
                link(&mut nodes, root, NodeId(idx));
            }
        }

        // Phase 4: anything still unreachable sits on a cycle with no
        // outside caller. Anchor one member per cluster under the root,
        // picking the unattached node first by creation order, and hanging
        // its farthest ancestor so the loop displays as a descent instead
        // of an immediate back-edge.
        let reachable = reachable_from(&nodes, root);
        let mut missing: Vec<NodeId> = (1..nodes.len())
            .map(NodeId)
            .filter(|id| !reachable.contains(id))
            .collect();
        while let Some(&m) = missing.first() {
            let anchor = farthest_ancestor(&nodes, m);
            link(&mut nodes, root, anchor);
            let recovered = reachable_from(&nodes, anchor);
            missing.retain(|id| !recovered.contains(id));
        }

        let defined = graph.nodes.iter().map(|n| n.id.clone()).collect();
        let presenter = Presenter {
            graph,
            nodes,
            lookup,
            defined,
            root,
        };
        presenter.verify()?;
        Ok(presenter)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Look up a node by function name.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.lookup.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Number of function nodes tracked (the sentinel root not counted).
    pub fn len(&self) -> usize {
        self.lookup.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` has a known definition in the underlying graph.
    /// Names that were only ever called render as childless leaves.
    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// The graph snapshot this tree was reduced from.
    pub fn graph(&self) -> &CallGraph {
        &self.graph
    }

    /// Names of the root set: every independently reachable entry point,
    /// in input order (anchored loop entries last, in anchoring order).
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.nodes[self.root.0]
            .children
            .iter()
            .map(|&id| self.nodes[id.0].name())
    }

    /// Child names of `name`, in first-call order.
    pub fn children_of(&self, name: &str) -> Option<Vec<&str>> {
        let id = self.get(name)?;
        Some(
            self.nodes[id.0]
                .children
                .iter()
                .map(|&c| self.nodes[c.0].name())
                .collect(),
        )
    }

    /// Unlink `name` from every parent and child and drop it from the
    /// lookup. A pure local operation: no other node moves, so deletions
    /// commute. Returns false if the name is unknown (already removed).
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(id) = self.lookup.remove(name) else {
            return false;
        };
        let parents = std::mem::take(&mut self.nodes[id.0].parents);
        for p in parents {
            self.nodes[p.0].children.retain(|&c| c != id);
        }
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for c in children {
            self.nodes[c.0].parents.retain(|&p| p != id);
        }
        true
    }

    /// Non-destructive filter: an independent copy with every node that has
    /// no known definition removed. Undefined nodes are always leaves, so
    /// removal order does not matter and no defined node is orphaned.
    /// Filtering an already-filtered tree is a no-op.
    pub fn default_filter(&self) -> Presenter {
        let mut out = self.deep_copy();
        let undefined: Vec<String> = out
            .lookup
            .keys()
            .filter(|name| name.as_str() != ROOT_NAME && !out.defined.contains(*name))
            .cloned()
            .collect();
        for name in undefined {
            out.remove(&name);
        }
        out
    }

    /// Fully independent structural copy. Arena indices are the node
    /// identities, so a member-wise clone preserves shared children and
    /// cycles exactly; mutating the copy never touches the original.
    pub fn deep_copy(&self) -> Presenter {
        self.clone()
    }

    /// Deduplicated `(caller, callee)` pairs over everything reachable from
    /// the root set, sentinel edges excluded. Each node's out-edges appear
    /// in first-call order; each pair appears exactly once.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(self.root);
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            for &child in &node.children {
                if id != self.root {
                    out.push((node.name(), self.nodes[child.0].name()));
                }
            }
            for &child in node.children.iter().rev() {
                if seen.insert(child) {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Names reachable from the root set, in arena creation order,
    /// sentinel excluded.
    pub fn reachable_names(&self) -> Vec<&str> {
        let reachable = reachable_from(&self.nodes, self.root);
        (1..self.nodes.len())
            .map(NodeId)
            .filter(|id| reachable.contains(id))
            .map(|id| self.nodes[id.0].name())
            .collect()
    }

    /// Check the structural invariants: unique name registration, forward
    /// and back edges mirroring each other, and every reachable node
    /// registered in the lookup. Violation means a reduction bug.
    pub fn verify(&self) -> Result<()> {
        for (name, &id) in &self.lookup {
            let node = self
                .nodes
                .get(id.0)
                .ok_or_else(|| CallscapeError::Structural(format!("dangling id for {}", name)))?;
            if node.name() != name {
                return Err(CallscapeError::Structural(format!(
                    "{} registered under node named {}",
                    name,
                    node.name()
                )));
            }
            for &c in &node.children {
                if !self.nodes[c.0].parents.contains(&id) {
                    return Err(CallscapeError::Structural(format!(
                        "edge {} -> {} has no back-reference",
                        name,
                        self.nodes[c.0].name()
                    )));
                }
            }
            for &p in &node.parents {
                if !self.nodes[p.0].children.contains(&id) {
                    return Err(CallscapeError::Structural(format!(
                        "back-reference {} -> {} has no forward edge",
                        self.nodes[p.0].name(),
                        name
                    )));
                }
            }
        }
        for id in reachable_from(&self.nodes, self.root) {
            let name = self.nodes[id.0].name();
            if self.lookup.get(name) != Some(&id) {
                return Err(CallscapeError::Structural(format!(
                    "reachable node {} missing from lookup",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn intern(nodes: &mut Vec<Node>, lookup: &mut HashMap<String, NodeId>, name: &str) -> NodeId {
    if let Some(&id) = lookup.get(name) {
        return id;
    }
    let id = NodeId(nodes.len());
    nodes.push(Node {
        name: name.to_string(),
        children: Vec::new(),
        parents: Vec::new(),
    });
    lookup.insert(name.to_string(), id);
    id
}

fn resolve(lookup: &HashMap<String, NodeId>, name: &str) -> Result<NodeId> {
    lookup
        .get(name)
        .copied()
        .ok_or_else(|| CallscapeError::Structural(format!("{} was never allocated", name)))
}

fn link(nodes: &mut [Node], parent: NodeId, child: NodeId) {
    if !nodes[parent.0].children.contains(&child) {
        nodes[parent.0].children.push(child);
    }
    if !nodes[child.0].parents.contains(&parent) {
        nodes[child.0].parents.push(parent);
    }
}

/// Seen-set guarded depth-first walk in the parent -> child direction.
/// The guard is mandatory: call graphs contain cycles.
fn reachable_from(nodes: &[Node], start: NodeId) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    seen.insert(start);
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        for &child in &nodes[id.0].children {
            if seen.insert(child) {
                stack.push(child);
            }
        }
    }
    seen
}

/// Walk `start`'s ancestor chain (guarded against the cycles that put it in
/// `missing` in the first place) and return the ancestor farthest away by
/// hop count. Ties go to the node discovered first; parent lists are walked
/// in insertion order.
fn farthest_ancestor(nodes: &[Node], start: NodeId) -> NodeId {
    let mut seen = HashSet::new();
    seen.insert(start);
    let mut best = (0usize, start);
    let mut stack = vec![(start, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        if depth > best.0 {
            best = (depth, id);
        }
        for &p in nodes[id.0].parents.iter().rev() {
            if seen.insert(p) {
                stack.push((p, depth + 1));
            }
        }
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::callgraph::CallGraphNode;

    fn graph(entries: &[(&str, &[&str])]) -> CallGraph {
        CallGraph::new(
            entries
                .iter()
                .map(|(id, callees)| CallGraphNode {
                    id: id.to_string(),
                    callees: callees.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        )
    }

    fn reduce(entries: &[(&str, &[&str])]) -> Presenter {
        Presenter::new(graph(entries)).unwrap()
    }

    #[test]
    fn test_single_root_with_shared_callee() {
        let tree = reduce(&[
            ("main", &["helper", "util"]),
            ("helper", &["util"]),
            ("util", &[]),
        ]);
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec!["main"]);
        assert_eq!(tree.children_of("main").unwrap(), vec!["helper", "util"]);
        // Shared callee is one merged node, referenced from both callers
        let util = tree.get("util").unwrap();
        assert_eq!(tree.node(util).parents().len(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_undefined_callee_becomes_leaf_node() {
        let tree = reduce(&[("main", &["println"])]);
        let id = tree.get("println").unwrap();
        assert!(tree.node(id).children().is_empty());
        assert!(!tree.is_defined("println"));
        assert!(tree.is_defined("main"));
    }

    #[test]
    fn test_multiple_roots_in_input_order() {
        let tree = reduce(&[("b_entry", &["shared"]), ("a_entry", &["shared"]), ("shared", &[])]);
        assert_eq!(
            tree.roots().collect::<Vec<_>>(),
            vec!["b_entry", "a_entry"]
        );
    }

    #[test]
    fn test_self_recursion_is_not_a_root_but_gets_anchored() {
        let tree = reduce(&[("f", &["f"])]);
        // f's only caller is itself, so it is missing until anchored
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec!["f"]);
        assert_eq!(tree.children_of("f").unwrap(), vec!["f"]);
    }

    #[test]
    fn test_standalone_mutual_recursion_anchors_exactly_one() {
        let tree = reduce(&[("a", &["b"]), ("b", &["a"])]);
        let roots: Vec<&str> = tree.roots().collect();
        assert_eq!(roots.len(), 1);
        // First missing node is a; its farthest ancestor is b
        assert_eq!(roots, vec!["b"]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_three_cycle_anchored_at_farthest_ancestor() {
        let tree = reduce(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        // From a, ancestors are c (1 hop) then b (2 hops): anchor b
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(tree.reachable_names().len(), 3);
    }

    #[test]
    fn test_two_independent_loops_both_recovered() {
        let tree = reduce(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("x", &["y"]),
            ("y", &["x"]),
        ]);
        assert_eq!(tree.roots().count(), 2);
        assert_eq!(tree.reachable_names().len(), 4);
    }

    #[test]
    fn test_cycle_with_external_caller_needs_no_anchor() {
        let tree = reduce(&[("main", &["a"]), ("a", &["b"]), ("b", &["a"])]);
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec!["main"]);
        assert_eq!(tree.reachable_names().len(), 3);
    }

    #[test]
    fn test_reachability_completeness() {
        // Disconnected pieces, shared subtrees, a loop, external calls
        let tree = reduce(&[
            ("main", &["parse", "emit"]),
            ("parse", &["emit", "read_file"]),
            ("emit", &[]),
            ("spin", &["spin_helper"]),
            ("spin_helper", &["spin"]),
        ]);
        assert_eq!(tree.reachable_names().len(), tree.len());
    }

    #[test]
    fn test_bidirectional_consistency_holds_everywhere() {
        let tree = reduce(&[
            ("main", &["a", "b"]),
            ("a", &["b"]),
            ("b", &["a"]),
        ]);
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn test_edges_deduplicated_and_ordered() {
        let tree = reduce(&[
            ("main", &["helper", "util"]),
            ("helper", &["util"]),
            ("util", &[]),
        ]);
        let edges = tree.edges();
        assert_eq!(
            edges,
            vec![
                ("main", "helper"),
                ("main", "util"),
                ("helper", "util"),
            ]
        );
    }

    #[test]
    fn test_edges_terminate_on_cycles() {
        let tree = reduce(&[("f", &["f"])]);
        assert_eq!(tree.edges(), vec![("f", "f")]);
    }

    #[test]
    fn test_remove_heals_both_sides() {
        let mut tree = reduce(&[("main", &["helper"]), ("helper", &["leaf"]), ("leaf", &[])]);
        assert!(tree.remove("helper"));
        assert!(!tree.contains("helper"));
        assert_eq!(tree.children_of("main").unwrap(), Vec::<&str>::new());
        let leaf = tree.get("leaf").unwrap();
        assert!(tree.node(leaf).parents().is_empty());
        assert!(tree.verify().is_ok());
        // Second removal is a no-op
        assert!(!tree.remove("helper"));
    }

    #[test]
    fn test_default_filter_drops_only_undefined() {
        let tree = reduce(&[("main", &["helper", "println"]), ("helper", &["println"])]);
        let filtered = tree.default_filter();
        assert!(!filtered.contains("println"));
        assert!(filtered.contains("main"));
        assert!(filtered.contains("helper"));
        assert_eq!(filtered.children_of("main").unwrap(), vec!["helper"]);
        assert!(filtered.verify().is_ok());
        // Original untouched
        assert!(tree.contains("println"));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let tree = reduce(&[("main", &["helper", "println"]), ("helper", &[])]);
        let once = tree.default_filter();
        let twice = once.default_filter();
        assert_eq!(once.len(), twice.len());
        assert_eq!(once.edges(), twice.edges());
        assert_eq!(
            once.roots().collect::<Vec<_>>(),
            twice.roots().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let tree = reduce(&[("main", &["helper"]), ("helper", &[])]);
        let mut copy = tree.deep_copy();
        copy.remove("helper");
        assert!(tree.contains("helper"));
        assert_eq!(tree.children_of("main").unwrap(), vec!["helper"]);
        assert_eq!(copy.children_of("main").unwrap(), Vec::<&str>::new());
    }

    #[test]
    fn test_deep_copy_preserves_sharing() {
        let tree = reduce(&[("a", &["c"]), ("b", &["c"]), ("c", &[])]);
        let copy = tree.deep_copy();
        // Both parents in the copy reference the same single node for c
        let c = copy.get("c").unwrap();
        let a = copy.get("a").unwrap();
        let b = copy.get("b").unwrap();
        assert_eq!(copy.node(a).children(), &[c]);
        assert_eq!(copy.node(b).children(), &[c]);
        assert_eq!(copy.node(c).parents().len(), 2);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let bad = graph(&[("main", &["x", "x"])]);
        assert!(matches!(
            Presenter::new(bad),
            Err(CallscapeError::Validation(_))
        ));
    }

    #[test]
    fn test_top_level_pseudo_function_is_a_root() {
        let tree = reduce(&[
            ("__module__", &["main"]),
            ("main", &["helper", "util"]),
            ("helper", &["util"]),
            ("util", &[]),
        ]);
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec!["__module__"]);
        assert_eq!(tree.children_of("main").unwrap(), vec!["helper", "util"]);
    }
}

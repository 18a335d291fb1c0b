// Call graph structures for Callscape.
// Represents "function -> ordered callees" as handed over by a parser.

use std::collections::{HashMap, HashSet};

use crate::common::{CallscapeError, Result};

/// Pseudo-function name grouping calls made outside any function body
/// (module-level statements in languages that have them).
pub const TOP_LEVEL: &str = "__module__";

/// One function and the names it calls, in first-call order, duplicate-free.
/// A callee need not be defined anywhere in the graph (library/external call).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGraphNode {
    pub id: String,
    pub callees: Vec<String>,
}

/// The call graph itself. Node order is input order; downstream tie-breaks
/// (root ordering, loop anchoring) depend on it, so it is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    pub nodes: Vec<CallGraphNode>,
}

impl CallGraph {
    pub fn new(nodes: Vec<CallGraphNode>) -> Self {
        Self { nodes }
    }

    pub fn get(&self, id: &str) -> Option<&CallGraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether `id` has a known definition (appears as a function, not just
    /// as somebody's callee).
    pub fn defines(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check the input contract: non-empty names, no duplicate function
    /// entries, no duplicate callee within one function's sequence.
    pub fn validate(&self) -> Result<()> {
        let mut ids: HashSet<&str> = HashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(CallscapeError::Validation(
                    "function name must not be empty".to_string(),
                ));
            }
            if !ids.insert(node.id.as_str()) {
                return Err(CallscapeError::Validation(format!(
                    "duplicate function entry: {}",
                    node.id
                )));
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for callee in &node.callees {
                if callee.is_empty() {
                    return Err(CallscapeError::Validation(format!(
                        "function {} calls an empty name",
                        node.id
                    )));
                }
                if !seen.insert(callee.as_str()) {
                    return Err(CallscapeError::Validation(format!(
                        "function {} has duplicate callee: {}",
                        node.id, callee
                    )));
                }
            }
        }
        Ok(())
    }

    /// Append another graph's functions. Colliding ids are renamed with the
    /// `name.N` scheme; callee references keep the base name and therefore
    /// resolve to the first definition seen.
    pub fn merge(&mut self, other: CallGraph) {
        for mut node in other.nodes {
            if self.defines(&node.id) {
                node.id = uniquify(|n| self.defines(n), &node.id);
            }
            self.nodes.push(node);
        }
    }

    /// Guess a presentable entry point: the function starting the deepest
    /// call chain. Brute force over all simple chains, which is fine for
    /// per-file function counts. Ties go to the earlier input entry.
    pub fn deepest_entry(&self) -> Option<&str> {
        let mut best: Option<(usize, &str)> = None;
        for node in &self.nodes {
            let mut chain = vec![node.id.as_str()];
            let depth = self.deepest_chain(&mut chain);
            if best.map_or(true, |(d, _)| depth > d) {
                best = Some((depth, node.id.as_str()));
            }
        }
        best.map(|(_, id)| id)
    }

    fn deepest_chain<'a>(&'a self, chain: &mut Vec<&'a str>) -> usize {
        let Some(&func) = chain.last() else {
            return 0;
        };
        let Some(node) = self.get(func) else {
            return chain.len();
        };
        let mut deepest = chain.len();
        for call in &node.callees {
            if self.defines(call) && !chain.iter().any(|c| c == call) {
                chain.push(call);
                deepest = deepest.max(self.deepest_chain(chain));
                chain.pop();
            } else {
                // Chain ends here: an external call, or a cycle back into it
                deepest = deepest.max(chain.len() + 1);
            }
        }
        deepest
    }
}

/// If `name` is taken, append `.N` for the first free N. `.` is not a valid
/// identifier character in any supported source language, so this cannot
/// collide with a real function.
pub(crate) fn uniquify(taken: impl Fn(&str) -> bool, name: &str) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{}.{}", name, i);
        if !taken(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

/// Accumulates a [`CallGraph`] while a parser walks source code.
///
/// Usage mirrors a visitor: call [`GraphBuilder::begin_function`] when a
/// function definition is entered (it handles duplicate names), feed every
/// call site through [`GraphBuilder::record_call`] (ordered, duplicate-free),
/// and restore the previous scope with [`GraphBuilder::end_function`] when
/// the definition ends. Calls recorded outside any function land on the
/// top-level pseudo-function.
pub struct GraphBuilder {
    nodes: Vec<CallGraphNode>,
    index: HashMap<String, usize>,
    current: usize,
}

/// Scope handle returned by `begin_function`; hand it back to `end_function`.
#[must_use]
pub struct FunctionToken {
    prev: usize,
}

impl GraphBuilder {
    pub fn new(top_level: &str) -> Self {
        let mut index = HashMap::new();
        index.insert(top_level.to_string(), 0);
        Self {
            nodes: vec![CallGraphNode {
                id: top_level.to_string(),
                callees: Vec::new(),
            }],
            index,
            current: 0,
        }
    }

    pub fn begin_function(&mut self, name: &str) -> FunctionToken {
        let unique = uniquify(|n| self.index.contains_key(n), name);
        let idx = self.nodes.len();
        self.index.insert(unique.clone(), idx);
        self.nodes.push(CallGraphNode {
            id: unique,
            callees: Vec::new(),
        });
        let prev = self.current;
        self.current = idx;
        FunctionToken { prev }
    }

    pub fn end_function(&mut self, token: FunctionToken) {
        self.current = token.prev;
    }

    pub fn record_call(&mut self, name: &str) {
        let node = &mut self.nodes[self.current];
        if !node.callees.iter().any(|c| c == name) {
            node.callees.push(name.to_string());
        }
    }

    /// The top-level pseudo-function is dropped when it never saw a call
    /// (always the case for languages without module-level statements).
    pub fn finish(mut self) -> CallGraph {
        if self.nodes[0].callees.is_empty() {
            self.nodes.remove(0);
        }
        CallGraph::new(self.nodes)
    }
}

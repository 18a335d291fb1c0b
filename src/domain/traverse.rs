//! Depth-first rendering traversal.
//!
//! [`Walk`] is the lazy event stream renderers consume: `(name, depth,
//! terminal)` triples in depth-first order. Recursion is capped by the
//! exactly-one-duplicate-at-the-tail rule: a child whose name is already on
//! the current path is emitted once as a terminal leaf and never expanded,
//! which is what makes direct and mutual recursion terminate in output.

use crate::domain::tree::{NodeId, Presenter};

/// One step of a depth-first walk. `terminal` marks a repeated name along
/// the current path, shown once instead of being re-expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkEvent<'a> {
    pub name: &'a str,
    pub depth: usize,
    pub terminal: bool,
}

/// Lazy depth-first walk over a [`Presenter`]. Restartable: building a new
/// walk from the same node replays the same sequence.
pub struct Walk<'a> {
    tree: &'a Presenter,
    // (node, next-child cursor); the stack of nodes is the current path
    stack: Vec<(NodeId, usize)>,
    pending: Option<NodeId>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(tree: &'a Presenter, start: NodeId) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            pending: Some(start),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<WalkEvent<'a>> {
        let tree = self.tree;
        if let Some(start) = self.pending.take() {
            self.stack.push((start, 0));
            return Some(WalkEvent {
                name: tree.node(start).name(),
                depth: 0,
                terminal: false,
            });
        }
        loop {
            let &mut (id, ref mut cursor) = self.stack.last_mut()?;
            let children = tree.node(id).children();
            if *cursor >= children.len() {
                self.stack.pop();
                continue;
            }
            let child = children[*cursor];
            *cursor += 1;
            let depth = self.stack.len();
            let name = tree.node(child).name();
            if self.stack.iter().any(|&(on_path, _)| on_path == child) {
                return Some(WalkEvent {
                    name,
                    depth,
                    terminal: true,
                });
            }
            if !tree.node(child).children().is_empty() {
                self.stack.push((child, 0));
            }
            return Some(WalkEvent {
                name,
                depth,
                terminal: false,
            });
        }
    }
}

impl Presenter {
    /// Depth-first walk starting at `name`, or None for unknown names.
    pub fn walk(&self, name: &str) -> Option<Walk<'_>> {
        self.get(name).map(|id| Walk::new(self, id))
    }
}

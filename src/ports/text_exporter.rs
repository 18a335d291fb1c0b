//! Plain-text Tree Exporter
//!
//! Renders the walk events as an indented hierarchy. Defined functions get
//! a `name():` header line; leaves (external calls) and terminal duplicates
//! render as `name()`.

use std::path::Path;

use crate::common::Result;
use crate::domain::tree::Presenter;
use crate::ports::{RenderOptions, TreeExporter};

const INDENT: &str = "      ";

pub struct TextExporter;

impl TextExporter {
    /// Render the tree to a string. One block per rendered function,
    /// blocks separated by a blank line.
    pub fn to_text(tree: &Presenter, opts: &RenderOptions) -> String {
        let targets: Vec<String> = if opts.functions.is_empty() {
            tree.roots().map(str::to_string).collect()
        } else {
            opts.functions.clone()
        };

        let mut blocks = Vec::new();
        for func in &targets {
            let Some(walk) = tree.walk(func) else {
                eprintln!("WARN: unknown function: {}", func);
                continue;
            };
            let mut lines = Vec::new();
            // When a subtree root is ignored, swallow events strictly below
            // its depth until the walk climbs back out
            let mut muted_below: Option<usize> = None;
            for ev in walk {
                if let Some(depth) = muted_below {
                    if ev.depth > depth {
                        continue;
                    }
                    muted_below = None;
                }
                if opts.ignores.iter().any(|i| i == ev.name) {
                    muted_below = Some(ev.depth);
                    continue;
                }
                let indent = INDENT.repeat(ev.depth);
                if !ev.terminal && tree.is_defined(ev.name) {
                    lines.push(format!("{}{}():", indent, ev.name));
                } else {
                    lines.push(format!("{}{}()", indent, ev.name));
                }
            }
            if !lines.is_empty() {
                blocks.push(lines.join("\n"));
            }
        }
        blocks.join("\n\n")
    }
}

impl TreeExporter for TextExporter {
    fn export(&self, tree: &Presenter, opts: &RenderOptions, path: &Path) -> Result<()> {
        let mut content = Self::to_text(tree, opts);
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }
}

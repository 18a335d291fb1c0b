//! Graphviz DOT Exporter
//!
//! Emits the reachable call edges as a digraph. Defined functions are
//! filled boxes; names with no known definition (library/external calls)
//! are gray dashed boxes.

use std::path::Path;

use crate::common::Result;
use crate::domain::tree::Presenter;
use crate::ports::{RenderOptions, TreeExporter};

pub struct DotExporter;

impl DotExporter {
    pub fn to_dot(tree: &Presenter) -> String {
        let mut lines = Vec::new();

        lines.push("digraph calls {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push(String::new());

        for name in tree.reachable_names() {
            let label = Self::escape_label(name);
            if tree.is_defined(name) {
                lines.push(format!(
                    "    \"{}\" [label=\"{}\", shape=box, style=\"filled\", fillcolor=\"#89b4fa\"];",
                    label, label
                ));
            } else {
                lines.push(format!(
                    "    \"{}\" [label=\"{}\", shape=box, style=\"filled,dashed\", fillcolor=\"#6c7086\"];",
                    label, label
                ));
            }
        }

        lines.push(String::new());

        for (caller, callee) in tree.edges() {
            lines.push(format!(
                "    \"{}\" -> \"{}\";",
                Self::escape_label(caller),
                Self::escape_label(callee)
            ));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

impl TreeExporter for DotExporter {
    fn export(&self, tree: &Presenter, _opts: &RenderOptions, path: &Path) -> Result<()> {
        let mut content = Self::to_dot(tree);
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }
}

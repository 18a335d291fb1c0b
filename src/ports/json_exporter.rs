//! JSON Dump Exporter
//!
//! Machine-readable dump of the reduced tree: the root set plus the
//! deduplicated edge list. Useful for piping into other tools.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::domain::tree::Presenter;
use crate::ports::{RenderOptions, TreeExporter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDump {
    pub roots: Vec<String>,
    pub edges: Vec<(String, String)>,
}

impl TreeDump {
    pub fn from_presenter(tree: &Presenter) -> Self {
        Self {
            roots: tree.roots().map(str::to_string).collect(),
            edges: tree
                .edges()
                .into_iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }
}

pub struct JsonExporter;

impl TreeExporter for JsonExporter {
    fn export(&self, tree: &Presenter, _opts: &RenderOptions, path: &Path) -> Result<()> {
        let dump = TreeDump::from_presenter(tree);
        let mut content = serde_json::to_string_pretty(&dump)?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }
}

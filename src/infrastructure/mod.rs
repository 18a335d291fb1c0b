// Infrastructure implementations for Callscape: input adapters that turn
// files on disk into a CallGraph.

use std::fs;
use std::path::Path;

use crate::common::{CallscapeError, Result};
use crate::domain::callgraph::{CallGraph, CallGraphNode};
use crate::ports::{GraphSource, SourceFile};

pub mod syn_parser;

pub use syn_parser::RustGraphSource;

/// Loads call graphs written as JSON objects: `{"func": ["callee", ...]}`.
/// This is the language-agnostic interchange format; any parser that can
/// emit it plugs into the presenter. Key order is preserved.
pub struct JsonGraphSource;

impl GraphSource for JsonGraphSource {
    fn build_call_graph(&self, sources: &[SourceFile]) -> Result<CallGraph> {
        let mut graph = CallGraph::default();
        for src in sources {
            graph.merge(parse_json_graph(&src.content)?);
        }
        Ok(graph)
    }
}

fn parse_json_graph(text: &str) -> Result<CallGraph> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Object(map) = value else {
        return Err(CallscapeError::Validation(
            "call-graph JSON must be an object of name -> [callees]".to_string(),
        ));
    };
    let mut nodes = Vec::new();
    for (func, calls) in map {
        let serde_json::Value::Array(items) = calls else {
            return Err(CallscapeError::Validation(format!(
                "calls of function {} must be an array",
                func
            )));
        };
        let mut callees = Vec::new();
        for item in items {
            let serde_json::Value::String(callee) = item else {
                return Err(CallscapeError::Validation(format!(
                    "function {} has a non-string callee entry",
                    func
                )));
            };
            callees.push(callee);
        }
        nodes.push(CallGraphNode { id: func, callees });
    }
    Ok(CallGraph::new(nodes))
}

/// Read the given input files into memory.
pub fn read_sources(paths: &[impl AsRef<Path>]) -> Result<Vec<SourceFile>> {
    let mut out = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        out.push(SourceFile::new(path, content));
    }
    Ok(out)
}

/// Recursively collect `.rs` files under `dir`, skipping `target` and
/// `.git`. Deterministic: entries are visited in sorted order.
pub fn collect_rs_files(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut out = Vec::new();
    collect_rs_recursive(dir, &mut out)?;
    Ok(out)
}

fn collect_rs_recursive(dir: &Path, out: &mut Vec<SourceFile>) -> Result<()> {
    if dir.ends_with("target") || dir.ends_with(".git") {
        return Ok(());
    }
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_recursive(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let content = fs::read_to_string(&path)?;
            out.push(SourceFile::new(path, content));
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};

use crate::common::Result;
use crate::domain::callgraph::CallGraph;
use crate::domain::tree::Presenter;

pub mod dot_exporter;
pub mod json_exporter;
pub mod text_exporter;

pub use dot_exporter::DotExporter;
pub use json_exporter::JsonExporter;
pub use text_exporter::TextExporter;

/// One input file, already read into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Rendering knobs shared by the exporters.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Render only these functions; empty means the whole root set.
    pub functions: Vec<String>,
    /// Suppress these functions (and their subtrees) from the output.
    pub ignores: Vec<String>,
    /// Drop functions with no known definition before rendering.
    pub filter_undefined: bool,
    /// When no functions are given, start from the head of the deepest
    /// call chain instead of the whole root set.
    pub deepest: bool,
}

/// Produces a CallGraph from raw input files. Parser collaborators
/// implement this.
pub trait GraphSource {
    fn build_call_graph(&self, sources: &[SourceFile]) -> Result<CallGraph>;
}

/// Renders a reduced tree to a file.
pub trait TreeExporter {
    fn export(&self, tree: &Presenter, opts: &RenderOptions, path: &Path) -> Result<()>;
}

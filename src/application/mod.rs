use std::path::Path;

use crate::common::Result;
use crate::domain::tree::Presenter;
use crate::ports::{GraphSource, RenderOptions, SourceFile, TreeExporter};

/// The one pipeline: sources -> call graph -> reduced tree -> export.
pub struct AnalyzeUsecase<'a> {
    pub source: &'a dyn GraphSource,
    pub exporter: &'a dyn TreeExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn run(
        &self,
        sources: &[SourceFile],
        opts: &RenderOptions,
        export_path: &Path,
    ) -> Result<()> {
        let graph = self.source.build_call_graph(sources)?;

        let mut opts = opts.clone();
        if opts.deepest && opts.functions.is_empty() {
            if let Some(entry) = graph.deepest_entry() {
                opts.functions.push(entry.to_string());
            }
        }

        let tree = Presenter::new(graph)?;
        let tree = if opts.filter_undefined {
            tree.default_filter()
        } else {
            tree
        };
        self.exporter.export(&tree, &opts, export_path)
    }
}

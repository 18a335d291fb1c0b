//! Rust Source Adapter
//!
//! Extracts `function -> ordered callees` from Rust source with `syn`.
//! Purely syntactic: a call is the last path segment of a call expression
//! or a method name; receivers, generics, and dispatch are not resolved.

use rayon::prelude::*;
use syn::visit::Visit;

use crate::common::{CallscapeError, Result};
use crate::domain::callgraph::{CallGraph, GraphBuilder, TOP_LEVEL};
use crate::ports::{GraphSource, SourceFile};

pub struct RustGraphSource;

impl GraphSource for RustGraphSource {
    /// Parse every file in parallel, then merge the per-file graphs in
    /// input order so the result is deterministic.
    fn build_call_graph(&self, sources: &[SourceFile]) -> Result<CallGraph> {
        let per_file: Vec<CallGraph> = sources
            .par_iter()
            .map(parse_one)
            .collect::<Result<Vec<_>>>()?;

        let mut graph = CallGraph::default();
        for file_graph in per_file {
            graph.merge(file_graph);
        }
        Ok(graph)
    }
}

fn parse_one(src: &SourceFile) -> Result<CallGraph> {
    let ast = syn::parse_file(&src.content).map_err(|e| CallscapeError::Parse {
        file: src.path.clone(),
        message: e.to_string(),
    })?;
    let mut collector = CallCollector {
        builder: GraphBuilder::new(TOP_LEVEL),
    };
    collector.visit_file(&ast);
    Ok(collector.builder.finish())
}

struct CallCollector {
    builder: GraphBuilder,
}

impl<'ast> Visit<'ast> for CallCollector {
    fn visit_item_fn(&mut self, item: &'ast syn::ItemFn) {
        let token = self.builder.begin_function(&item.sig.ident.to_string());
        syn::visit::visit_item_fn(self, item);
        self.builder.end_function(token);
    }

    fn visit_impl_item_fn(&mut self, item: &'ast syn::ImplItemFn) {
        let token = self.builder.begin_function(&item.sig.ident.to_string());
        syn::visit::visit_impl_item_fn(self, item);
        self.builder.end_function(token);
    }

    fn visit_expr_call(&mut self, expr: &'ast syn::ExprCall) {
        // Only calls through a plain path have a usable name; calls through
        // computed values (closures in variables etc.) are skipped
        if let syn::Expr::Path(path) = &*expr.func {
            if let Some(segment) = path.path.segments.last() {
                self.builder.record_call(&segment.ident.to_string());
            }
        }
        syn::visit::visit_expr_call(self, expr);
    }

    fn visit_expr_method_call(&mut self, expr: &'ast syn::ExprMethodCall) {
        self.builder.record_call(&expr.method.to_string());
        syn::visit::visit_expr_method_call(self, expr);
    }
}

pub mod callgraph;
pub mod language;
pub mod traverse;
pub mod tree;

/// Input Format Module
///
/// Callscape accepts two kinds of input: Rust source to parse, or an
/// already-extracted call graph as JSON (what other-language parsers emit).

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    RustSource,
    CallGraphJson,
}

impl SourceKind {
    /// Infer the input kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<SourceKind> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(SourceKind::RustSource),
            "json" => Some(SourceKind::CallGraphJson),
            _ => None,
        }
    }

    /// Infer the input kind from a file path.
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::RustSource => "Rust source",
            SourceKind::CallGraphJson => "call-graph JSON",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceKind::from_extension("rs"), Some(SourceKind::RustSource));
        assert_eq!(SourceKind::from_extension("RS"), Some(SourceKind::RustSource));
        assert_eq!(
            SourceKind::from_extension("json"),
            Some(SourceKind::CallGraphJson)
        );
        assert_eq!(SourceKind::from_extension("py"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            SourceKind::from_path(Path::new("src/main.rs")),
            Some(SourceKind::RustSource)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("calls.json")),
            Some(SourceKind::CallGraphJson)
        );
        assert_eq!(SourceKind::from_path(Path::new("README.md")), None);
    }
}

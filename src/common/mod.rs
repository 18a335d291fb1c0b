use std::path::PathBuf;

/// Errors that can occur across Callscape.
///
/// The domain layer raises `Validation` (bad call-graph input) and
/// `Structural` (internal invariant broken during reduction) directly;
/// the binary converts to `anyhow::Error` at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum CallscapeError {
    /// The supplied call graph breaks the input contract (empty name,
    /// duplicate callee within one function, duplicate function id, or a
    /// JSON entry that is not a string).
    #[error("invalid call graph: {0}")]
    Validation(String),

    /// Two distinct nodes were registered under one name, or an edge lost
    /// its back-reference. Indicates a reduction bug, not bad user input.
    #[error("structural invariant violated: {0}")]
    Structural(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rust source failed to parse.
    #[error("parse error in {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CallscapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_message() {
        let err = CallscapeError::Validation("function f has duplicate callee g".into());
        assert!(err.to_string().contains("duplicate callee"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CallscapeError = io.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_parse_error_shows_file() {
        let err = CallscapeError::Parse {
            file: PathBuf::from("src/bad.rs"),
            message: "unexpected token".into(),
        };
        assert!(err.to_string().contains("src/bad.rs"));
    }
}

//! Errors specific to Gradle dependency declarations.
//!
//! These errors cover caller-supplied notations that cannot be parsed, edits
//! that would leave a declaration without a name, build script syntax errors,
//! and writes the underlying script document rejects.

use thiserror::Error;

/// Errors specific to Gradle dependency declarations.
///
/// Unrecognized notations found while *reading* a script are never errors;
/// extraction simply skips them. Only caller-driven edits with invalid input
/// surface here.
#[derive(Error, Debug)]
pub enum GradleError {
    /// Compact notation that does not resolve to a dependency name, or a
    /// field value that would split a compact notation differently
    #[error("Invalid dependency notation '{notation}'")]
    InvalidNotation { notation: String },

    /// Attempt to delete or empty the required `name` field
    #[error("Dependency name cannot be removed or set to an empty value")]
    MissingName,

    /// Build script syntax error
    #[error("Failed to parse build script at line {line}: {message}")]
    ScriptParse { line: usize, message: String },

    /// Malformed model configuration
    #[error("Invalid model configuration: {source}")]
    Config {
        #[source]
        source: serde_json::Error,
    },

    /// Write rejected by the script document
    #[error("Document error: {0}")]
    Document(#[from] deps_core::DepsError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gradle operations.
pub type Result<T> = std::result::Result<T, GradleError>;

impl GradleError {
    /// Create an invalid notation error.
    pub fn invalid_notation(notation: impl Into<String>) -> Self {
        Self::InvalidNotation {
            notation: notation.into(),
        }
    }

    /// Create a build script parse error.
    pub fn script_parse(line: usize, message: impl Into<String>) -> Self {
        Self::ScriptParse {
            line,
            message: message.into(),
        }
    }
}

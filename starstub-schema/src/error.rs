//! Error types for package loading and tag parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for package discovery and parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// IO error while reading the package directory or a source file.
    #[error("IO error reading '{}': {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The directory holds no Go sources.
    #[error("no Go source files found in '{}'", dir.display())]
    NoSources {
        /// Directory that was scanned.
        dir: PathBuf,
    },

    /// The Go grammar could not be loaded.
    #[error("failed to load Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// A source file failed to parse.
    #[error("syntax error in '{file}' at line {line}")]
    Syntax {
        /// File name.
        file: String,
        /// One-based line number.
        line: usize,
    },

    /// Source files declare different packages.
    #[error("file '{file}' declares package '{found}', expected '{expected}'")]
    PackageMismatch {
        /// File name.
        file: String,
        /// Package name seen first.
        expected: String,
        /// Package name in this file.
        found: String,
    },

    /// A `go.mod` file could not be understood.
    #[error("invalid go.mod '{}' at line {line}: {message}", path.display())]
    GoMod {
        /// Path of the `go.mod` file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Invalid source structure.
    #[error("invalid source structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for comment tag extraction.
#[derive(Debug, Error)]
pub enum TagError {
    /// Tag appears more than once with different values.
    #[error("parsing tags in {type_name}: conflicting values {values:?} for tag '{tag}'")]
    Conflicting {
        /// Type carrying the tag.
        type_name: String,
        /// Tag name.
        tag: String,
        /// Every value found, in comment order.
        values: Vec<String>,
    },

    /// Tag value is not a boolean.
    #[error("parsing tags in {type_name}: invalid boolean '{value}' for tag '{tag}'")]
    InvalidBool {
        /// Type carrying the tag.
        type_name: String,
        /// Tag name.
        tag: String,
        /// Offending value.
        value: String,
    },
}

impl ParseError {
    /// Creates an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}

//! Error types for stub generation.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for stub generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Package discovery or parsing error.
    #[error("loading package: {0}")]
    Parse(#[from] starstub_schema::ParseError),

    /// Malformed generation tag.
    #[error(transparent)]
    Tag(#[from] starstub_schema::TagError),

    /// A generation target has no `Spec` field.
    #[error("type has no spec: {type_name}")]
    MissingSpec {
        /// Target type name.
        type_name: String,
    },

    /// A field type has no stub rendering.
    #[error("generating type {type_name}: unrecognized type of member {field}: {field_type}")]
    UnsupportedShape {
        /// Type that owns the field.
        type_name: String,
        /// Field name.
        field: String,
        /// Field type as written in the type universe.
        field_type: String,
    },

    /// Two fields map to the same Python parameter name.
    #[error("generating type {type_name}: duplicate parameter name {param}")]
    DuplicateParameter {
        /// Type whose function would repeat the parameter.
        type_name: String,
        /// Repeated parameter name.
        param: String,
    },

    /// The destination could not be opened or written.
    #[error("writing '{}': {source}", path.display())]
    Output {
        /// Destination path, `-` for standard output.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    /// Creates a missing spec error.
    pub fn missing_spec(type_name: impl Into<String>) -> Self {
        Self::MissingSpec {
            type_name: type_name.into(),
        }
    }

    /// Creates an unsupported shape error.
    pub fn unsupported(
        type_name: impl Into<String>,
        field: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedShape {
            type_name: type_name.into(),
            field: field.into(),
            field_type: field_type.into(),
        }
    }

    /// Creates a duplicate parameter error.
    pub fn duplicate_param(type_name: impl Into<String>, param: impl Into<String>) -> Self {
        Self::DuplicateParameter {
            type_name: type_name.into(),
            param: param.into(),
        }
    }

    /// Creates an output error for the given path.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

//! Error types for the desc2proto-core library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! detailed error variants for the different ways a descriptor set can
//! defeat reconstruction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for desc2proto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all desc2proto operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to parse the binary descriptor set
    #[error("failed to parse descriptor set: {0}")]
    DescriptorParse(#[from] prost::DecodeError),

    /// A file entry declares a syntax other than proto2 or proto3
    #[error("file '{file}' declares unsupported proto syntax '{syntax}'")]
    UnsupportedSyntax {
        /// Name of the file entry carrying the declaration
        file: String,
        /// The unrecognized syntax string
        syntax: String,
    },

    /// A field carries a label value outside the three known kinds
    #[error("field '{field}' has unsupported label value {value}")]
    UnsupportedLabel {
        /// Name of the offending field
        field: String,
        /// The raw label value from the descriptor
        value: i32,
    },

    /// A field carries a type value outside the known wire types
    #[error("field '{field}' has unsupported type value {value}")]
    UnsupportedType {
        /// Name of the offending field
        field: String,
        /// The raw type value from the descriptor
        value: i32,
    },

    /// A file entry name would escape the destination directory
    #[error("path traversal detected: '{}' would escape the destination", path.display())]
    PathTraversal {
        /// The suspicious path
        path: PathBuf,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new unsupported syntax error
    pub fn unsupported_syntax(file: impl Into<String>, syntax: impl Into<String>) -> Self {
        Self::UnsupportedSyntax {
            file: file.into(),
            syntax: syntax.into(),
        }
    }

    /// Creates a new unsupported label error
    pub fn unsupported_label(field: impl Into<String>, value: i32) -> Self {
        Self::UnsupportedLabel {
            field: field.into(),
            value,
        }
    }

    /// Creates a new unsupported type error
    pub fn unsupported_type(field: impl Into<String>, value: i32) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            value,
        }
    }

    /// Creates a new path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

//! Error types for HOLOCRON core operations

use thiserror::Error;

/// Errors raised while replaying a patch against a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("Invalid JSON pointer: {path:?}")]
    InvalidPointer { path: String },

    #[error("Patch target does not exist: {path}")]
    MissingTarget { path: String },

    #[error("Array index {index} out of range at {path} (len {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Parent of {path} is not an object or array")]
    NotAContainer { path: String },

    #[error("Cannot remove the document root")]
    RemoveRoot,
}

/// Record model errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Expected a JSON object for a record, found {found}")]
    NotAnObject { found: &'static str },
}

// =============================================================================
// TESTS
// =============================================================================

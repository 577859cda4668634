//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by every charm crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Canonicalization errors name the offending key so authors can fix
//!   the document directly.
//! - Descriptor validation failures all share the `NotValid` kind; the
//!   message carries the violated constraint.

use thiserror::Error;

/// Top-level error type for charm metadata handling.
#[derive(Error, Debug)]
pub enum CharmError {
    /// Canonicalization of a generic tree failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A metadata structure violates one of its invariants.
    #[error("not valid: {0}")]
    NotValid(String),

    /// A decoded document could not be represented as a generic tree.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Error during schema-safe canonicalization of a generic tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// A reserved schema key was found in the tree.
    #[error("schema key {key:?} is not supported in action schemas")]
    ReservedKey {
        /// The reserved key, e.g. `$ref`.
        key: String,
    },

    /// A mapping was keyed with something other than a string.
    #[error("map keyed with non-string value {key}")]
    NonStringKey {
        /// Rendering of the offending key.
        key: String,
    },
}

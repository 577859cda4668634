//! # charm-core — Foundational Types for Charm Metadata
//!
//! This crate is the leaf of the workspace DAG. It defines the generic
//! value tree that every decoded metadata document is turned into, plus
//! the two walkers the higher crates rely on.
//!
//! ## Key Design Principles
//!
//! 1. **One tagged union for decoded input.** [`GenericValue`] models the
//!    output of a schema-free YAML/JSON decode. Every consumer matches on
//!    it exhaustively; there are no runtime type assertions.
//!
//! 2. **Two mapping variants.** A string-keyed mapping and an
//!    "keyed by anything" mapping are distinct variants. Turning the second
//!    into the first is an explicit, fallible coercion.
//!
//! 3. **Canonicalization is the only path into schema content.**
//!    [`canonicalize`] rejects non-string keys and the reserved keys
//!    `$ref` / `$schema` at any depth.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `charm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod path;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::{canonicalize, is_reserved_key, RESERVED_SCHEMA_KEYS};
pub use error::{CanonicalizationError, CharmError};
pub use path::lookup;
pub use value::{coerce_string_keys, GenericValue, StringMap};

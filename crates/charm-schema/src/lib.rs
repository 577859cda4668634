//! # charm-schema — Action Schemas & Validation
//!
//! Turns a charm's `actions.yaml` into one JSON Schema document per action
//! and validates invocation parameters against those documents.
//!
//! ## Modules
//!
//! - [`actions`] — builds an [`ActionsCollection`] from a decoded actions
//!   document. Building is all-or-nothing: the first bad action rejects
//!   the whole set.
//! - [`validate`] — the schema engine adapter over the `jsonschema`
//!   crate: compile (with meta-schema self-check) and instance check.
//! - [`config`] — draft selection for the engine.
//!
//! ## Crate Policy
//!
//! - Depends only on `charm-core` internally.
//! - Schema content always flows through `charm_core::canonicalize`;
//!   `$ref` and `$schema` never reach the engine from user input.
//! - The engine never performs network requests.

pub mod actions;
pub mod config;
pub mod validate;

pub use actions::{
    read_actions_yaml, ActionName, ActionSpec, ActionsCollection, ActionsError, SchemaDocument,
    DEFAULT_DESCRIPTION,
};
pub use config::{SchemaConfig, SchemaDraft};
pub use validate::{
    CompiledSchema, SchemaValidationError, SchemaValidator, ValidationReport, Violation,
};

//! # Schema Engine Adapter
//!
//! Narrow wrapper around the `jsonschema` crate. Two operations are
//! exposed: compiling a schema document (which also checks the document
//! against its draft's meta-schema) and checking an instance against a
//! compiled schema.
//!
//! ## Security Invariant
//!
//! Action schemas are self-contained. The engine is built with a retriever
//! that refuses every external URI, so compiling or checking never
//! performs a network request.

use std::fmt;

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::config::{SchemaConfig, SchemaDraft};

/// Retriever that refuses to resolve any external resource.
struct NoRemoteRetriever;

impl Retrieve for NoRemoteRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema resources are not supported: {}", uri.as_str()).into())
    }
}

/// Error raised by the schema engine itself.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The schema document could not be compiled (e.g., it does not
    /// conform to the draft's meta-schema).
    #[error("validator build error for {draft} schema: {reason}")]
    ValidatorBuildError {
        /// Draft the schema was compiled against.
        draft: SchemaDraft,
        /// Reason reported by the engine.
        reason: String,
    },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of checking one instance, with every violation in engine order.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns true if the instance satisfied the schema.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Rendered message of every violation, in order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// A schema document compiled by the engine.
pub struct CompiledSchema {
    validator: Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Check an instance, collecting every violation.
    pub fn check(&self, instance: &Value) -> ValidationReport {
        let violations = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        ValidationReport { violations }
    }
}

/// Schema engine configured for one draft.
///
/// ## Thread Safety
///
/// `SchemaValidator` and [`CompiledSchema`] are `Send + Sync` and hold no
/// mutable state.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: SchemaConfig,
}

impl SchemaValidator {
    /// Create an engine from configuration.
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    /// Returns the configured draft.
    pub fn draft(&self) -> SchemaDraft {
        self.config.draft
    }

    /// Compile a schema document.
    ///
    /// The document is checked against the configured draft's meta-schema
    /// as part of compilation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::ValidatorBuildError`] if the
    /// document is not a valid schema.
    pub fn compile(&self, schema: &Value) -> Result<CompiledSchema, SchemaValidationError> {
        let mut opts = jsonschema::options();
        opts.with_draft(self.config.draft.to_engine());
        opts.with_retriever(NoRemoteRetriever);

        let validator = opts.build(schema).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                draft: self.config.draft,
                reason: e.to_string(),
            }
        })?;
        Ok(CompiledSchema { validator })
    }

    /// Check that a document is itself a well-formed schema, independent
    /// of any instance.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaValidator::compile`].
    pub fn check_schema(&self, schema: &Value) -> Result<(), SchemaValidationError> {
        self.compile(schema).map(|_| ())
    }
}

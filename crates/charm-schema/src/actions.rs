//! # Action Schemas
//!
//! Builds the parameter schema of every action a charm declares in its
//! `actions.yaml`, and validates invocation parameters against it.
//!
//! ## Document Shape
//!
//! ```yaml
//! snapshot:
//!   description: Take a snapshot of the database.
//!   params:
//!     outfile:
//!       type: string
//!   required: [outfile]
//! ```
//!
//! Each action becomes a JSON Schema object document:
//!
//! - `description` — from the action, else `"No description"`.
//! - `type` — `"object"`.
//! - `title` — from the action, else the action name.
//! - `properties` — the canonicalized `params` mapping.
//! - `required` — copied as given.
//! - any other key — canonicalized and copied as a schema extension.
//!
//! The finished document must pass the engine's meta-schema check.
//!
//! ## Atomicity
//!
//! A collection is built into a scratch map and only returned once every
//! action has succeeded. Callers never see a partially valid set.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use charm_core::{
    canonicalize, is_reserved_key, CanonicalizationError, GenericValue, StringMap,
};

use crate::validate::{SchemaValidationError, SchemaValidator};

/// Description used when an action does not declare one.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// A JSON Schema document with string keys and no reserved keys.
pub type SchemaDocument = Map<String, Value>;

/// Error while building action schemas or validating parameters.
#[derive(Error, Debug)]
pub enum ActionsError {
    /// The action name does not match the naming grammar.
    #[error("bad action name {name:?}")]
    InvalidActionName {
        /// The rejected name.
        name: String,
    },

    /// The action's entry is not a mapping.
    #[error("action {action:?} must be a mapping, got {kind}")]
    InvalidActionSpec {
        /// Action name.
        action: String,
        /// Kind of value found instead.
        kind: &'static str,
    },

    /// A fixed schema key holds a value of the wrong shape.
    #[error("action {action:?}: value for schema key {key:?} must be {expected}")]
    InvalidFieldType {
        /// Action name.
        action: String,
        /// The offending key.
        key: String,
        /// Expected shape, e.g. "a string".
        expected: &'static str,
    },

    /// Part of the action could not be canonicalized.
    #[error("action {action:?}: {source}")]
    Canonicalization {
        /// Action name.
        action: String,
        /// Underlying rejection.
        source: CanonicalizationError,
    },

    /// `params` did not canonicalize to a mapping.
    #[error("action {action:?}: params failed to parse as a map (got {kind})")]
    InvalidParamsShape {
        /// Action name.
        action: String,
        /// Kind of value found instead.
        kind: &'static str,
    },

    /// The built document is not a valid schema.
    #[error("invalid params schema for action {action:?}: {reason}")]
    InvalidSchemaDocument {
        /// Action name.
        action: String,
        /// Reason reported by the engine.
        reason: String,
    },

    /// Parameters do not satisfy the action's schema.
    #[error("JSON validation failed: {}", .messages.join("; "))]
    ParameterValidationFailed {
        /// Every individual violation, in engine order.
        messages: Vec<String>,
    },

    /// Parameters cannot be represented as JSON.
    #[error("params cannot be represented as JSON: {reason}")]
    InvalidParams {
        /// Why the conversion failed.
        reason: String,
    },

    /// The engine could not compile a stored schema.
    #[error(transparent)]
    SchemaCompile(#[from] SchemaValidationError),

    /// The actions document could not be decoded.
    #[error("decode error: {reason}")]
    Decode {
        /// Why decoding failed.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Name of an action, validated at construction.
///
/// Grammar: `^[a-z](?:[a-z-]*[a-z])?$` — lowercase letters and hyphens,
/// beginning and ending with a letter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ActionName(String);

impl ActionName {
    /// Create an action name, validating the grammar.
    ///
    /// # Errors
    ///
    /// Returns [`ActionsError::InvalidActionName`] if the name does not
    /// match.
    pub fn new(value: impl Into<String>) -> Result<Self, ActionsError> {
        let name = value.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(ActionsError::InvalidActionName { name })
        }
    }

    /// Returns true if `name` matches the action-name grammar.
    pub fn is_valid(name: &str) -> bool {
        let bytes = name.as_bytes();
        match (bytes.first(), bytes.last()) {
            (Some(first), Some(last)) => {
                first.is_ascii_lowercase()
                    && last.is_ascii_lowercase()
                    && bytes.iter().all(|b| b.is_ascii_lowercase() || *b == b'-')
            }
            _ => false,
        }
    }

    /// Access the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl Borrow<str> for ActionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The definition of one action: its description and parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSpec {
    /// Human-readable description.
    pub description: String,
    /// Self-validated JSON Schema for the action's parameters.
    pub params: SchemaDocument,
}

impl ActionSpec {
    /// Validate invocation parameters with the default engine.
    ///
    /// # Errors
    ///
    /// See [`ActionSpec::validate_params_with`].
    pub fn validate_params(&self, params: &GenericValue) -> Result<(), ActionsError> {
        self.validate_params_with(&SchemaValidator::default(), params)
    }

    /// Validate invocation parameters against this action's schema.
    ///
    /// `Ok(())` means the parameters conform.
    ///
    /// # Errors
    ///
    /// - [`ActionsError::ParameterValidationFailed`] when the parameters do
    ///   not conform; every violation is kept in the message.
    /// - [`ActionsError::SchemaCompile`] when the stored schema cannot be
    ///   compiled. This is a hard failure, not a validation result.
    /// - [`ActionsError::InvalidParams`] when the parameters contain a
    ///   mapping keyed by a non-string.
    pub fn validate_params_with(
        &self,
        validator: &SchemaValidator,
        params: &GenericValue,
    ) -> Result<(), ActionsError> {
        let compiled = validator.compile(&Value::Object(self.params.clone()))?;
        let instance = params.to_json().map_err(|e| ActionsError::InvalidParams {
            reason: e.to_string(),
        })?;

        let report = compiled.check(&instance);
        if report.is_valid() {
            tracing::trace!("action parameters conform to schema");
            return Ok(());
        }

        for violation in report.violations() {
            tracing::debug!(
                instance_path = %violation.instance_path,
                schema_path = %violation.schema_path,
                "{}",
                violation.message
            );
        }
        tracing::debug!(
            violations = report.violations().len(),
            "action parameters rejected"
        );
        Err(ActionsError::ParameterValidationFailed {
            messages: report.messages(),
        })
    }
}

/// Every action a charm declares, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActionsCollection {
    specs: BTreeMap<ActionName, ActionSpec>,
}

impl ActionsCollection {
    /// Build the collection with the default engine.
    ///
    /// # Errors
    ///
    /// See [`ActionsCollection::build_with`].
    pub fn build(document: &StringMap) -> Result<Self, ActionsError> {
        Self::build_with(&SchemaValidator::default(), document)
    }

    /// Build and self-check the schema of every action in `document`.
    ///
    /// Actions are processed in name order and the first failure aborts
    /// the whole build.
    ///
    /// # Errors
    ///
    /// Any [`ActionsError`] describing the first offending action.
    pub fn build_with(
        validator: &SchemaValidator,
        document: &StringMap,
    ) -> Result<Self, ActionsError> {
        let mut scratch = BTreeMap::new();

        for (raw_name, entry) in document {
            let name = ActionName::new(raw_name.as_str())?;
            let spec = build_action(validator, &name, entry)?;
            tracing::debug!(action = %name, "built action schema");
            scratch.insert(name, spec);
        }

        tracing::debug!(actions = scratch.len(), "actions collection built");
        Ok(Self { specs: scratch })
    }

    /// Build from a whole decoded `actions.yaml` document.
    ///
    /// A null document declares no actions.
    ///
    /// # Errors
    ///
    /// Returns [`ActionsError::Decode`] if the document is not a mapping
    /// keyed by strings, otherwise as [`ActionsCollection::build_with`].
    pub fn from_value(
        validator: &SchemaValidator,
        document: &GenericValue,
    ) -> Result<Self, ActionsError> {
        if document.is_null() {
            return Ok(Self::default());
        }
        let entries = document
            .to_string_map()
            .ok_or_else(|| ActionsError::Decode {
                reason: format!("actions document must be a mapping, got {}", document.kind()),
            })?
            .map_err(|e| ActionsError::Decode {
                reason: e.to_string(),
            })?;
        Self::build_with(validator, &entries)
    }

    /// Look up an action by name.
    pub fn get(&self, name: &str) -> Option<&ActionSpec> {
        self.specs.get(name)
    }

    /// Action names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &ActionName> {
        self.specs.keys()
    }

    /// Iterate over actions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&ActionName, &ActionSpec)> {
        self.specs.iter()
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if no actions are declared.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Decode an `actions.yaml` stream and build its collection.
///
/// # Errors
///
/// Returns [`ActionsError::Io`] if the stream cannot be read,
/// [`ActionsError::Decode`] if it is not valid YAML, otherwise as
/// [`ActionsCollection::from_value`].
pub fn read_actions_yaml(
    validator: &SchemaValidator,
    mut reader: impl Read,
) -> Result<ActionsCollection, ActionsError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let document = GenericValue::from_yaml_str(&text).map_err(|e| ActionsError::Decode {
        reason: e.to_string(),
    })?;
    ActionsCollection::from_value(validator, &document)
}

fn build_action(
    validator: &SchemaValidator,
    name: &ActionName,
    entry: &GenericValue,
) -> Result<ActionSpec, ActionsError> {
    let action = name.as_str();
    let fields = if entry.is_null() {
        StringMap::new()
    } else {
        entry
            .to_string_map()
            .ok_or_else(|| ActionsError::InvalidActionSpec {
                action: action.to_string(),
                kind: entry.kind(),
            })?
            .map_err(|source| ActionsError::Canonicalization {
                action: action.to_string(),
                source,
            })?
    };

    let mut description = DEFAULT_DESCRIPTION.to_string();
    let mut schema = SchemaDocument::new();
    schema.insert("description".into(), Value::from(DEFAULT_DESCRIPTION));
    schema.insert("type".into(), Value::from("object"));
    schema.insert("title".into(), Value::from(action));
    schema.insert("properties".into(), Value::Object(Map::new()));

    for (key, value) in &fields {
        if is_reserved_key(key) {
            return Err(canonicalization_error(
                action,
                CanonicalizationError::ReservedKey { key: key.clone() },
            ));
        }
        match key.as_str() {
            "description" => {
                let text = require_str(action, key, value)?;
                schema.insert(key.clone(), Value::from(text));
                description = text.to_string();
            }
            "title" => {
                let text = require_str(action, key, value)?;
                schema.insert(key.clone(), Value::from(text));
            }
            "required" => {
                if value.as_sequence().is_none() {
                    return Err(field_type_error(action, key, "a list"));
                }
                let list = value
                    .to_json()
                    .map_err(|source| canonicalization_error(action, source))?;
                schema.insert(key.clone(), list);
            }
            "params" => {
                let properties = canonical_json(action, value)?;
                if !properties.is_object() {
                    return Err(ActionsError::InvalidParamsShape {
                        action: action.to_string(),
                        kind: value.kind(),
                    });
                }
                schema.insert("properties".into(), properties);
            }
            _ => {
                let extension = canonical_json(action, value)?;
                schema.insert(key.clone(), extension);
            }
        }
    }

    validator
        .check_schema(&Value::Object(schema.clone()))
        .map_err(|e| ActionsError::InvalidSchemaDocument {
            action: action.to_string(),
            reason: e.to_string(),
        })?;

    Ok(ActionSpec {
        description,
        params: schema,
    })
}

fn require_str<'a>(
    action: &str,
    key: &str,
    value: &'a GenericValue,
) -> Result<&'a str, ActionsError> {
    value
        .as_str()
        .ok_or_else(|| field_type_error(action, key, "a string"))
}

fn field_type_error(action: &str, key: &str, expected: &'static str) -> ActionsError {
    ActionsError::InvalidFieldType {
        action: action.to_string(),
        key: key.to_string(),
        expected,
    }
}

fn canonicalization_error(action: &str, source: CanonicalizationError) -> ActionsError {
    ActionsError::Canonicalization {
        action: action.to_string(),
        source,
    }
}

fn canonical_json(action: &str, value: &GenericValue) -> Result<Value, ActionsError> {
    canonicalize(value)
        .and_then(|clean| clean.to_json())
        .map_err(|source| canonicalization_error(action, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> StringMap {
        match GenericValue::from(value) {
            GenericValue::Mapping(map) => map,
            other => panic!("expected mapping, got {other:?}"),
        }
    }

    fn snapshot_actions() -> ActionsCollection {
        ActionsCollection::build(&document(json!({
            "snapshot": {
                "description": "take snapshot",
                "params": {"outfile": {"type": "string"}}
            }
        })))
        .unwrap()
    }

    #[test]
    fn test_action_name_grammar() {
        for ok in ["snapshot", "a", "do-backup", "a-b-c", "ab"] {
            assert!(ActionName::is_valid(ok), "{ok} should be valid");
        }
        for bad in ["Snapshot", "-snap", "snap-", "", "snap_shot", "snap1", "-", "a b"] {
            assert!(!ActionName::is_valid(bad), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn test_action_name_deserialize_validates() {
        let ok: ActionName = serde_json::from_str(r#""snapshot""#).unwrap();
        assert_eq!(ok.as_str(), "snapshot");
        assert!(serde_json::from_str::<ActionName>(r#""Snapshot""#).is_err());
    }

    #[test]
    fn test_builds_snapshot_schema() {
        let actions = snapshot_actions();
        let spec = actions.get("snapshot").unwrap();
        assert_eq!(spec.description, "take snapshot");
        assert_eq!(
            Value::Object(spec.params.clone()),
            json!({
                "description": "take snapshot",
                "type": "object",
                "title": "snapshot",
                "properties": {"outfile": {"type": "string"}}
            })
        );
    }

    #[test]
    fn test_defaults_without_fields() {
        let actions = ActionsCollection::build(&document(json!({"snapshot": {}}))).unwrap();
        let spec = actions.get("snapshot").unwrap();
        assert_eq!(spec.description, DEFAULT_DESCRIPTION);
        assert_eq!(
            Value::Object(spec.params.clone()),
            json!({
                "description": "No description",
                "type": "object",
                "title": "snapshot",
                "properties": {}
            })
        );
    }

    #[test]
    fn test_null_action_entry_uses_defaults() {
        let actions = ActionsCollection::build(&document(json!({"snapshot": null}))).unwrap();
        assert_eq!(actions.get("snapshot").unwrap().description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_title_required_and_extensions_are_copied() {
        let actions = ActionsCollection::build(&document(json!({
            "snapshot": {
                "title": "Snapshot the DB",
                "required": ["outfile"],
                "additionalProperties": false,
                "params": {"outfile": {"type": "string"}}
            }
        })))
        .unwrap();
        let params = &actions.get("snapshot").unwrap().params;
        assert_eq!(params["title"], json!("Snapshot the DB"));
        assert_eq!(params["required"], json!(["outfile"]));
        assert_eq!(params["additionalProperties"], json!(false));
    }

    #[test]
    fn test_bad_action_name_rejected() {
        let err = ActionsCollection::build(&document(json!({"Snapshot": {}}))).unwrap_err();
        assert!(matches!(err, ActionsError::InvalidActionName { ref name } if name == "Snapshot"));
    }

    #[test]
    fn test_description_must_be_string() {
        let err = ActionsCollection::build(&document(json!({
            "snapshot": {"description": ["not", "a", "string"]}
        })))
        .unwrap_err();
        match err {
            ActionsError::InvalidFieldType { action, key, .. } => {
                assert_eq!(action, "snapshot");
                assert_eq!(key, "description");
            }
            other => panic!("expected InvalidFieldType, got {other}"),
        }
    }

    #[test]
    fn test_title_must_be_string() {
        let err =
            ActionsCollection::build(&document(json!({"snapshot": {"title": 3}}))).unwrap_err();
        assert!(matches!(err, ActionsError::InvalidFieldType { ref key, .. } if key == "title"));
    }

    #[test]
    fn test_required_must_be_list() {
        let err = ActionsCollection::build(&document(json!({"snapshot": {"required": "outfile"}})))
            .unwrap_err();
        assert!(matches!(err, ActionsError::InvalidFieldType { ref key, .. } if key == "required"));
        assert!(err.to_string().contains("must be a list"));
    }

    #[test]
    fn test_params_must_be_mapping() {
        let err = ActionsCollection::build(&document(json!({"snapshot": {"params": ["outfile"]}})))
            .unwrap_err();
        assert!(matches!(err, ActionsError::InvalidParamsShape { .. }));
    }

    #[test]
    fn test_reserved_key_in_params_rejected() {
        let err = ActionsCollection::build(&document(json!({
            "snapshot": {"params": {"outfile": {"$ref": "#/definitions/file"}}}
        })))
        .unwrap_err();
        match err {
            ActionsError::Canonicalization { action, source } => {
                assert_eq!(action, "snapshot");
                assert_eq!(source, CanonicalizationError::ReservedKey { key: "$ref".into() });
            }
            other => panic!("expected Canonicalization, got {other}"),
        }
    }

    #[test]
    fn test_reserved_key_at_action_level_rejected() {
        for (key, value) in [
            ("$ref", json!("#/definitions/x")),
            ("$schema", json!("http://json-schema.org/draft-04/schema#")),
        ] {
            let mut entry = json!({
                "definitions": {"x": {"type": "object"}},
                "params": {"outfile": {"type": "string"}}
            });
            entry[key] = value;
            let err = ActionsCollection::build(&document(json!({ "snapshot": entry })))
                .unwrap_err();
            match err {
                ActionsError::Canonicalization { action, source } => {
                    assert_eq!(action, "snapshot");
                    assert_eq!(source, CanonicalizationError::ReservedKey { key: key.into() });
                }
                other => panic!("expected Canonicalization, got {other}"),
            }
        }
    }

    #[test]
    fn test_reserved_key_in_extension_rejected() {
        let err = ActionsCollection::build(&document(json!({
            "snapshot": {"definitions": {"file": {"$schema": "x"}}}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("$schema"));
    }

    #[test]
    fn test_invalid_schema_document_rejected() {
        let err = ActionsCollection::build(&document(json!({
            "snapshot": {"params": {"outfile": {"type": "no-such-type"}}}
        })))
        .unwrap_err();
        match err {
            ActionsError::InvalidSchemaDocument { action, .. } => assert_eq!(action, "snapshot"),
            other => panic!("expected InvalidSchemaDocument, got {other}"),
        }
    }

    #[test]
    fn test_non_mapping_action_rejected() {
        let err = ActionsCollection::build(&document(json!({"snapshot": "text"}))).unwrap_err();
        assert!(matches!(err, ActionsError::InvalidActionSpec { kind: "string", .. }));
    }

    #[test]
    fn test_build_is_all_or_nothing() {
        let result = ActionsCollection::build(&document(json!({
            "alpha": {"description": "fine"},
            "beta": {"description": 5},
            "gamma": {"description": "also fine"}
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_first_failure_in_name_order_reported() {
        let err = ActionsCollection::build(&document(json!({
            "zeta": {"title": 1},
            "alpha": {"description": 1}
        })))
        .unwrap_err();
        assert!(
            matches!(err, ActionsError::InvalidFieldType { ref action, .. } if action == "alpha")
        );
    }

    #[test]
    fn test_validate_params_accepts_conforming() {
        let actions = snapshot_actions();
        let spec = actions.get("snapshot").unwrap();
        spec.validate_params(&GenericValue::from(json!({"outfile": "x.tgz"})))
            .unwrap();
    }

    #[test]
    fn test_validate_params_reports_type_mismatch() {
        let actions = snapshot_actions();
        let spec = actions.get("snapshot").unwrap();
        let err = spec
            .validate_params(&GenericValue::from(json!({"outfile": 5})))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("JSON validation failed: "), "{text}");
        assert!(text.contains("outfile"), "{text}");
        assert!(text.contains("string"), "{text}");
    }

    #[test]
    fn test_validate_params_joins_every_violation() {
        let actions = ActionsCollection::build(&document(json!({
            "snapshot": {
                "params": {
                    "outfile": {"type": "string"},
                    "count": {"type": "integer"}
                }
            }
        })))
        .unwrap();
        let err = actions
            .get("snapshot")
            .unwrap()
            .validate_params(&GenericValue::from(json!({"outfile": 5, "count": "x"})))
            .unwrap_err();
        match &err {
            ActionsError::ParameterValidationFailed { messages } => {
                assert_eq!(messages.len(), 2);
                assert!(err.to_string().contains("; "));
            }
            other => panic!("expected ParameterValidationFailed, got {other}"),
        }
    }

    #[test]
    fn test_validate_params_respects_required() {
        let actions = ActionsCollection::build(&document(json!({
            "snapshot": {
                "params": {"outfile": {"type": "string"}},
                "required": ["outfile"]
            }
        })))
        .unwrap();
        let err = actions
            .get("snapshot")
            .unwrap()
            .validate_params(&GenericValue::from(json!({})))
            .unwrap_err();
        assert!(err.to_string().contains("outfile"));
    }

    #[test]
    fn test_validate_params_with_broken_schema_is_hard_failure() {
        let mut params = SchemaDocument::new();
        params.insert("type".into(), json!(12));
        let spec = ActionSpec {
            description: DEFAULT_DESCRIPTION.to_string(),
            params,
        };
        let err = spec.validate_params(&GenericValue::Null).unwrap_err();
        assert!(matches!(err, ActionsError::SchemaCompile(_)));
    }

    #[test]
    fn test_validate_params_rejects_non_string_keys() {
        let actions = snapshot_actions();
        let params = GenericValue::from_yaml_str("1: x\n").unwrap();
        let err = actions
            .get("snapshot")
            .unwrap()
            .validate_params(&params)
            .unwrap_err();
        assert!(matches!(err, ActionsError::InvalidParams { .. }));
    }

    #[test]
    fn test_collection_accessors() {
        let actions = ActionsCollection::build(&document(json!({
            "b-action": {},
            "a-action": {}
        })))
        .unwrap();
        assert_eq!(actions.len(), 2);
        assert!(!actions.is_empty());
        let names: Vec<&str> = actions.names().map(ActionName::as_str).collect();
        assert_eq!(names, ["a-action", "b-action"]);
        assert!(actions.get("c-action").is_none());
    }

    #[test]
    fn test_collection_serializes_by_name() {
        let value = serde_json::to_value(snapshot_actions()).unwrap();
        assert_eq!(value["snapshot"]["description"], json!("take snapshot"));
        assert_eq!(value["snapshot"]["params"]["title"], json!("snapshot"));
    }
}

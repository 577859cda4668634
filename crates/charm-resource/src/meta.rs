//! # Resource Metadata
//!
//! Decodes one resource entry of a charm's metadata into a
//! [`ResourceDescriptor`].
//!
//! The `path` of a resource is relative to a directory reserved for that
//! resource. Given an application `spam`, a resource `eggs` and a filename
//! `eggs.tgz`, the file lands at
//! `/var/lib/juju/agent/spam-0/resources/eggs/eggs.tgz`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use charm_core::{CharmError, GenericValue, StringMap};

use crate::resource_type::ResourceType;

/// Information about a resource, as declared in a charm's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Identifies the resource.
    pub name: String,
    /// The kind of resource.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Where the resource is stored, relative to its reserved directory.
    /// Read from the `filename` field.
    pub path: String,
    /// Optional user-facing notes.
    pub comment: String,
}

impl ResourceDescriptor {
    /// Parse a descriptor from a decoded metadata fragment.
    ///
    /// With no data, or data that is not a string-keyable mapping, only the
    /// name is set. Fields that are missing or not strings stay empty; an
    /// unreadable `type` becomes [`ResourceType::Unknown`].
    pub fn parse(name: impl Into<String>, data: Option<&GenericValue>) -> Self {
        let mut meta = Self {
            name: name.into(),
            ..Self::default()
        };

        let Some(data) = data else {
            return meta;
        };
        let fields = match data.to_string_map() {
            Some(Ok(fields)) => fields,
            Some(Err(e)) => {
                tracing::debug!(
                    resource = %meta.name,
                    error = %e,
                    "resource data has unusable keys"
                );
                return meta;
            }
            None => {
                if !data.is_null() {
                    tracing::debug!(
                        resource = %meta.name,
                        kind = data.kind(),
                        "resource data is not a mapping"
                    );
                }
                return meta;
            }
        };

        if let Some(raw) = string_field(&fields, "type") {
            meta.resource_type = raw.parse().unwrap_or_default();
        }
        if let Some(filename) = string_field(&fields, "filename") {
            meta.path = filename.to_string();
        }
        if let Some(comment) = string_field(&fields, "comment") {
            meta.comment = comment.to_string();
        }

        meta
    }

    /// Check the descriptor's invariants.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// name, type, path, then the bare-filename rule for file resources.
    /// No I/O is performed.
    ///
    /// # Errors
    ///
    /// Returns [`CharmError::NotValid`] describing the violated constraint.
    pub fn validate(&self) -> Result<(), CharmError> {
        if self.name.is_empty() {
            return Err(CharmError::NotValid("resource missing name".to_string()));
        }

        if self.resource_type == ResourceType::Unknown {
            return Err(CharmError::NotValid("resource missing type".to_string()));
        }
        self.resource_type.validate().map_err(|e| {
            CharmError::NotValid(format!("invalid resource type {}: {e}", self.resource_type))
        })?;

        if self.path.is_empty() {
            return Err(CharmError::NotValid("resource missing filename".to_string()));
        }
        if self.resource_type == ResourceType::File && self.path.contains('/') {
            return Err(CharmError::NotValid(format!(
                "filename cannot contain \"/\" (got {:?})",
                self.path
            )));
        }

        Ok(())
    }
}

fn string_field<'a>(fields: &'a StringMap, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(GenericValue::as_str)
}

/// Parse the `resources` section of a charm's metadata.
///
/// A null section means the charm declares no resources. Descriptors are
/// parsed but not validated; see [`validate_resources`].
///
/// # Errors
///
/// Returns [`CharmError::NotValid`] if the section is neither null nor a
/// mapping, or [`CharmError::Canonicalization`] if it is keyed by
/// something other than strings.
pub fn parse_resources(
    section: &GenericValue,
) -> Result<BTreeMap<String, ResourceDescriptor>, CharmError> {
    if section.is_null() {
        return Ok(BTreeMap::new());
    }
    let entries = section.to_string_map().ok_or_else(|| {
        CharmError::NotValid(format!("resources must be a mapping, got {}", section.kind()))
    })??;

    Ok(entries
        .iter()
        .map(|(name, data)| {
            let data = (!data.is_null()).then_some(data);
            (name.clone(), ResourceDescriptor::parse(name.as_str(), data))
        })
        .collect())
}

/// Validate every descriptor independently.
///
/// Results are returned in name order, one per resource.
pub fn validate_resources(
    resources: &BTreeMap<String, ResourceDescriptor>,
) -> Vec<(&str, Result<(), CharmError>)> {
    resources
        .iter()
        .map(|(name, meta)| (name.as_str(), meta.validate()))
        .collect()
}

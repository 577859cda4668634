//! # Generic Value Tree
//!
//! The untyped tree a schema-free YAML or JSON decode produces. Charm
//! metadata is authored by hand, so nothing about its shape can be assumed
//! until a consumer has matched on it.
//!
//! ## Mapping Variants
//!
//! JSON objects are always keyed by strings and decode to
//! [`GenericValue::Mapping`]. YAML mappings may be keyed by numbers,
//! booleans or even nested collections, so they decode to
//! [`GenericValue::AnyMapping`] and must be coerced with
//! [`coerce_string_keys`] before use as schema content.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::error::{CanonicalizationError, CharmError};

/// A mapping keyed by strings. Sorted keys give every walker over it a
/// fixed iteration order.
pub type StringMap = BTreeMap<String, GenericValue>;

/// A node from a decoded configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericValue {
    /// Explicit null, or an empty YAML scalar.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer or finite floating point scalar.
    Number(Number),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<GenericValue>),
    /// Mapping whose keys are known to be strings.
    Mapping(StringMap),
    /// Mapping keyed by arbitrary values, in document order.
    AnyMapping(Vec<(GenericValue, GenericValue)>),
}

impl GenericValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) | Self::AnyMapping(_) => "mapping",
        }
    }

    /// Returns the string content if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[GenericValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true for [`GenericValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for either mapping variant.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_) | Self::AnyMapping(_))
    }

    /// View this value as a string-keyed mapping.
    ///
    /// Returns `None` for non-mappings. For [`GenericValue::AnyMapping`] the
    /// keys are coerced shallowly; values are cloned as they are.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::NonStringKey`] if any key of an
    /// any-keyed mapping is not a string.
    pub fn to_string_map(&self) -> Option<Result<StringMap, CanonicalizationError>> {
        match self {
            Self::Mapping(map) => Some(Ok(map.clone())),
            Self::AnyMapping(pairs) => Some(coerce_string_keys(pairs)),
            _ => None,
        }
    }

    /// Render this value the way it should appear in a key-related
    /// error message.
    pub fn render_key(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => format!("{s:?}"),
            Self::Sequence(_) => "<sequence>".to_string(),
            Self::Mapping(_) | Self::AnyMapping(_) => "<mapping>".to_string(),
        }
    }

    /// Convert a decoded YAML value into a generic tree.
    ///
    /// YAML tags are dropped and the tagged value kept. Mappings always
    /// become [`GenericValue::AnyMapping`], whatever their keys.
    ///
    /// # Errors
    ///
    /// Returns [`CharmError::Decode`] for floats JSON cannot represent
    /// (NaN and the infinities).
    pub fn from_yaml(yaml: &serde_yaml::Value) -> Result<Self, CharmError> {
        match yaml {
            serde_yaml::Value::Null => Ok(Self::Null),
            serde_yaml::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Number(Number::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::Number(Number::from(u)))
                } else if let Some(f) = n.as_f64() {
                    Number::from_f64(f)
                        .map(Self::Number)
                        .ok_or_else(|| CharmError::Decode(format!("cannot represent float {f}")))
                } else {
                    Err(CharmError::Decode(format!("unsupported YAML number: {n}")))
                }
            }
            serde_yaml::Value::String(s) => Ok(Self::String(s.clone())),
            serde_yaml::Value::Sequence(seq) => {
                let items: Result<Vec<_>, _> = seq.iter().map(Self::from_yaml).collect();
                Ok(Self::Sequence(items?))
            }
            serde_yaml::Value::Mapping(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (k, v) in map {
                    pairs.push((Self::from_yaml(k)?, Self::from_yaml(v)?));
                }
                Ok(Self::AnyMapping(pairs))
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    /// Decode YAML text into a generic tree.
    ///
    /// # Errors
    ///
    /// Returns [`CharmError::Decode`] if the text is not valid YAML or
    /// holds an unrepresentable number.
    pub fn from_yaml_str(text: &str) -> Result<Self, CharmError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| CharmError::Decode(format!("invalid YAML: {e}")))?;
        Self::from_yaml(&yaml)
    }

    /// Convert into a JSON value.
    ///
    /// Any-keyed mappings have their keys coerced to strings. Reserved
    /// schema keys are *not* rejected here; use
    /// [`crate::canonicalize`] for schema content.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::NonStringKey`] if a mapping at any
    /// depth has a non-string key.
    pub fn to_json(&self) -> Result<Value, CanonicalizationError> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Number(n) => Ok(Value::Number(n.clone())),
            Self::String(s) => Ok(Value::String(s.clone())),
            Self::Sequence(items) => {
                let items: Result<Vec<_>, _> = items.iter().map(Self::to_json).collect();
                Ok(Value::Array(items?))
            }
            Self::Mapping(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                Ok(Value::Object(out))
            }
            Self::AnyMapping(pairs) => {
                let mut out = serde_json::Map::new();
                for (k, v) in pairs {
                    let key = k.as_str().ok_or_else(|| CanonicalizationError::NonStringKey {
                        key: k.render_key(),
                    })?;
                    out.insert(key.to_string(), v.to_json()?);
                }
                Ok(Value::Object(out))
            }
        }
    }
}

impl From<Value> for GenericValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for GenericValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for GenericValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<StringMap> for GenericValue {
    fn from(map: StringMap) -> Self {
        Self::Mapping(map)
    }
}

/// Coerce the keys of an any-keyed mapping to strings.
///
/// Only keys are touched; values are cloned unchanged. A later duplicate
/// key replaces an earlier one.
///
/// # Errors
///
/// Returns [`CanonicalizationError::NonStringKey`] for the first key that
/// is not a string.
pub fn coerce_string_keys(
    pairs: &[(GenericValue, GenericValue)],
) -> Result<StringMap, CanonicalizationError> {
    let mut map = StringMap::new();
    for (k, v) in pairs {
        match k {
            GenericValue::String(key) => {
                map.insert(key.clone(), v.clone());
            }
            other => {
                return Err(CanonicalizationError::NonStringKey {
                    key: other.render_key(),
                })
            }
        }
    }
    Ok(map)
}

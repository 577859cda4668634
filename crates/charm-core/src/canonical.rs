//! # Canonicalization — Schema-Safe Generic Trees
//!
//! Rewrites an arbitrary decoded tree into the restricted shape that may
//! be embedded in an action schema document.
//!
//! ## Rules
//!
//! 1. **String-keyed mappings** — every key is checked against
//!    [`RESERVED_SCHEMA_KEYS`]; values are canonicalized recursively.
//! 2. **Any-keyed mappings** — keys are coerced to strings first, then the
//!    mapping is handled as in rule 1. Reserved keys that only appear after
//!    coercion are still caught.
//! 3. **Sequences** — elements are canonicalized in order; the first
//!    failing element aborts the whole walk.
//! 4. **Scalars and null** — pass through unchanged.
//!
//! The input is borrowed and never mutated; a fresh tree is returned.
//!
//! ## Security Invariant
//!
//! `$ref` and `$schema` are refused anywhere in the tree. Action schemas
//! are self-contained: no remote references, no draft switching.

use crate::error::CanonicalizationError;
use crate::value::{coerce_string_keys, GenericValue, StringMap};

/// Keys that may never appear in a canonical tree.
pub const RESERVED_SCHEMA_KEYS: &[&str] = &["$ref", "$schema"];

/// Returns true if `key` is one of [`RESERVED_SCHEMA_KEYS`].
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_SCHEMA_KEYS.contains(&key)
}

/// Canonicalize a generic tree.
///
/// Every mapping in the result is a [`GenericValue::Mapping`].
///
/// # Errors
///
/// Returns [`CanonicalizationError::ReservedKey`] if a reserved key occurs
/// at any depth, or [`CanonicalizationError::NonStringKey`] if any mapping
/// is keyed with a non-string value.
pub fn canonicalize(value: &GenericValue) -> Result<GenericValue, CanonicalizationError> {
    match value {
        GenericValue::Null
        | GenericValue::Bool(_)
        | GenericValue::Number(_)
        | GenericValue::String(_) => Ok(value.clone()),
        GenericValue::Mapping(map) => canonicalize_map(map).map(GenericValue::Mapping),
        GenericValue::AnyMapping(pairs) => {
            let coerced = coerce_string_keys(pairs)?;
            canonicalize_map(&coerced).map(GenericValue::Mapping)
        }
        GenericValue::Sequence(items) => {
            let items: Result<Vec<_>, _> = items.iter().map(canonicalize).collect();
            Ok(GenericValue::Sequence(items?))
        }
    }
}

fn canonicalize_map(map: &StringMap) -> Result<StringMap, CanonicalizationError> {
    let mut out = StringMap::new();
    for (key, value) in map {
        if is_reserved_key(key) {
            return Err(CanonicalizationError::ReservedKey { key: key.clone() });
        }
        out.insert(key.clone(), canonicalize(value)?);
    }
    Ok(out)
}

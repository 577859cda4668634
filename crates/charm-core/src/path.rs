//! # Nested-Path Lookup
//!
//! Follows an ordered list of keys down through nested mappings.
//! `lookup(&["a", "b"], {a: {b: {c: d}}})` yields `{c: d}`.
//!
//! Absence and shape mismatch both collapse to `None`; this walker never
//! errors. An any-keyed mapping is only descended into if every one of its
//! keys is a string.

use std::borrow::Cow;

use crate::value::{GenericValue, StringMap};

/// Look up the value at `path` inside `tree`.
///
/// The final segment may name a value of any shape. Every earlier segment
/// must name a mapping. An empty path finds nothing.
pub fn lookup<'a>(path: &[&str], tree: &'a StringMap) -> Option<Cow<'a, GenericValue>> {
    let (key, rest) = path.split_first()?;
    let answer = tree.get(*key)?;

    if rest.is_empty() {
        return Some(Cow::Borrowed(answer));
    }

    match answer {
        GenericValue::Mapping(map) => lookup(rest, map),
        GenericValue::AnyMapping(_) => {
            let coerced = answer.to_string_map()?.ok()?;
            let found = lookup(rest, &coerced)?.into_owned();
            Some(Cow::Owned(found))
        }
        GenericValue::Null
        | GenericValue::Bool(_)
        | GenericValue::Number(_)
        | GenericValue::String(_)
        | GenericValue::Sequence(_) => None,
    }
}

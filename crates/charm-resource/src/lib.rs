//! # charm-resource — Resource Descriptors
//!
//! A charm declares the files it needs as named resources in its
//! metadata. This crate turns each entry of that section into a
//! [`ResourceDescriptor`] and checks it.
//!
//! Parsing is lenient: missing or mistyped fields are left at their zero
//! value. Validation is strict and reports the first violated constraint
//! as [`charm_core::CharmError::NotValid`]. Each descriptor is validated on
//! its own; one bad resource never hides the result of another.

pub mod meta;
pub mod resource_type;

pub use meta::{parse_resources, validate_resources, ResourceDescriptor};
pub use resource_type::ResourceType;

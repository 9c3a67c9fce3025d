//! Schema model for SCIM resources.
//!
//! Defines the types every property-tree consumer depends on:
//! - [`Attribute`]: one resource field's type, multiplicity and policies
//! - [`AttributeType`], [`Mutability`], [`Returned`], [`Uniqueness`]: protocol enums
//! - [`Metadata`] / [`MetadataOverlay`]: out-of-band annotations such as identity flags
//! - [`ScimError`]: the error surface shared with the property engine

mod attribute;
mod error;
mod metadata;

pub use attribute::{
    eq_ignore_case, Attribute, AttributeType, Mutability, OptionalAttribute, OptionalAttributeMut,
    Returned, Uniqueness,
};
pub use error::{value_kind, ScimError, ScimResult};
pub use metadata::{Metadata, MetadataEntry, MetadataOverlay};

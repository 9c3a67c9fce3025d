//! Schema-driven property trees for SCIM resources.
//!
//! A [`Property`] tree is instantiated from an [`Attribute`](scim_schema::Attribute)
//! tree and then mutated through `add`/`replace`/`delete` with loosely typed
//! [`serde_json::Value`] input:
//! - [`LeafProperty`]: one scalar ([`Scalar`]) of a declared kind
//! - [`ComplexProperty`]: fixed, name-indexed children in schema order
//! - [`MultiProperty`]: a deduplicated sequence of single-valued elements
//!
//! Every node keeps a 64-bit structural hash that backs
//! [`Property::matches`]. Complex hashes honor identity sub-attributes and
//! multi-valued hashes ignore element order, so collections deduplicate by
//! logical identity. Trees are single-owner and not meant to be shared
//! across threads while being mutated.

mod complex;
mod container;
mod hash;
mod leaf;
mod multi;
mod property;
mod scalar;

pub use complex::ComplexProperty;
pub use container::{ChildKey, Container};
pub use hash::StructuralHasher;
pub use leaf::LeafProperty;
pub use multi::MultiProperty;
pub use property::Property;
pub use scalar::Scalar;

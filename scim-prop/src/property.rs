//! The property tree node and its factory.

use crate::complex::ComplexProperty;
use crate::container::{ChildKey, Container};
use crate::leaf::{LeafProperty, Operator};
use crate::multi::MultiProperty;
use scim_schema::{Attribute, AttributeType, ScimResult};
use serde_json::Value;
use std::sync::Arc;

/// A value node bound to one attribute.
///
/// The variant is chosen from the attribute's shape by [`Property::new`]:
/// multi-valued attributes become [`Property::Multi`], single-valued complex
/// attributes [`Property::Complex`], everything else [`Property::Leaf`].
#[derive(Debug, Clone)]
pub enum Property {
    Leaf(LeafProperty),
    Complex(ComplexProperty),
    Multi(MultiProperty),
}

impl Property {
    /// Creates an unassigned property tree matching `attr`.
    #[must_use]
    pub fn new(attr: Arc<Attribute>) -> Self {
        if attr.multi_valued {
            return Self::Multi(MultiProperty::new(attr));
        }
        match attr.attr_type() {
            AttributeType::Complex => Self::Complex(ComplexProperty::new(attr)),
            AttributeType::String
            | AttributeType::Integer
            | AttributeType::Decimal
            | AttributeType::Boolean
            | AttributeType::DateTime
            | AttributeType::Reference
            | AttributeType::Binary => Self::Leaf(LeafProperty::new(attr)),
        }
    }

    /// Creates a property and adds `value` to it.
    pub fn with_value(attr: Arc<Attribute>, value: Value) -> ScimResult<Self> {
        let mut prop = Self::new(attr);
        prop.add(value)?;
        Ok(prop)
    }

    #[must_use]
    pub fn attribute(&self) -> &Arc<Attribute> {
        match self {
            Self::Leaf(p) => p.attribute(),
            Self::Complex(p) => p.attribute(),
            Self::Multi(p) => p.attribute(),
        }
    }

    /// Rebuilds the plain JSON value of this subtree. This walks every
    /// descendant, so keep it off hot paths.
    #[must_use]
    pub fn raw(&self) -> Value {
        match self {
            Self::Leaf(p) => p.raw(),
            Self::Complex(p) => p.raw(),
            Self::Multi(p) => p.raw(),
        }
    }

    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        match self {
            Self::Leaf(p) => p.is_unassigned(),
            Self::Complex(p) => p.is_unassigned(),
            Self::Multi(p) => p.is_unassigned(),
        }
    }

    /// Filter `pr` semantics: the property holds a meaningful value.
    #[must_use]
    pub fn present(&self) -> bool {
        match self {
            Self::Leaf(p) => p.present(),
            Self::Complex(p) => p.present(),
            Self::Multi(p) => p.present(),
        }
    }

    /// True if this node or a descendant was mutated since creation.
    #[must_use]
    pub fn touched(&self) -> bool {
        match self {
            Self::Leaf(p) => p.touched(),
            Self::Complex(p) => p.touched(),
            Self::Multi(p) => p.touched(),
        }
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        match self {
            Self::Leaf(p) => p.hash(),
            Self::Complex(p) => p.hash(),
            Self::Multi(p) => p.hash(),
        }
    }

    /// Structural equality, used for deduplication and no-op detection.
    /// Properties of different kinds never match.
    #[must_use]
    pub fn matches(&self, other: &Property) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a.matches(b),
            (Self::Complex(a), Self::Complex(b)) => a.matches(b),
            (Self::Multi(a), Self::Multi(b)) => a.matches(b),
            _ => false,
        }
    }

    pub fn add(&mut self, value: Value) -> ScimResult<()> {
        match self {
            Self::Leaf(p) => p.add(value),
            Self::Complex(p) => p.add(value),
            Self::Multi(p) => p.add(value),
        }
    }

    pub fn replace(&mut self, value: Value) -> ScimResult<()> {
        match self {
            Self::Leaf(p) => p.replace(value),
            Self::Complex(p) => p.replace(value),
            Self::Multi(p) => p.replace(value),
        }
    }

    pub fn delete(&mut self) -> ScimResult<()> {
        match self {
            Self::Leaf(p) => p.delete(),
            Self::Complex(p) => p.delete(),
            Self::Multi(p) => p.delete(),
        }
    }

    // ── Relational operators ─────────────────────────────────────────
    //
    // Complex properties reject every operator. Multi-valued properties
    // match if any element does.

    pub fn equals_to(&self, value: &Value) -> ScimResult<bool> {
        match self {
            Self::Leaf(p) => p.equals_to(value),
            Self::Complex(p) => Err(p.incompatible(Operator::Eq)),
            Self::Multi(p) => p.any(Operator::Eq, |e| e.equals_to(value)),
        }
    }

    pub fn starts_with(&self, prefix: &str) -> ScimResult<bool> {
        match self {
            Self::Leaf(p) => p.starts_with(prefix),
            Self::Complex(p) => Err(p.incompatible(Operator::Sw)),
            Self::Multi(p) => p.any(Operator::Sw, |e| e.starts_with(prefix)),
        }
    }

    pub fn ends_with(&self, suffix: &str) -> ScimResult<bool> {
        match self {
            Self::Leaf(p) => p.ends_with(suffix),
            Self::Complex(p) => Err(p.incompatible(Operator::Ew)),
            Self::Multi(p) => p.any(Operator::Ew, |e| e.ends_with(suffix)),
        }
    }

    pub fn contains(&self, fragment: &str) -> ScimResult<bool> {
        match self {
            Self::Leaf(p) => p.contains(fragment),
            Self::Complex(p) => Err(p.incompatible(Operator::Co)),
            Self::Multi(p) => p.any(Operator::Co, |e| e.contains(fragment)),
        }
    }

    pub fn greater_than(&self, value: &Value) -> ScimResult<bool> {
        match self {
            Self::Leaf(p) => p.greater_than(value),
            Self::Complex(p) => Err(p.incompatible(Operator::Gt)),
            Self::Multi(p) => p.any(Operator::Gt, |e| e.greater_than(value)),
        }
    }

    pub fn less_than(&self, value: &Value) -> ScimResult<bool> {
        match self {
            Self::Leaf(p) => p.less_than(value),
            Self::Complex(p) => Err(p.incompatible(Operator::Lt)),
            Self::Multi(p) => p.any(Operator::Lt, |e| e.less_than(value)),
        }
    }

    // ── Variant access ───────────────────────────────────────────────

    /// The container surface, for complex and multi-valued properties.
    #[must_use]
    pub fn as_container(&self) -> Option<&dyn Container> {
        match self {
            Self::Leaf(_) => None,
            Self::Complex(p) => Some(p),
            Self::Multi(p) => Some(p),
        }
    }

    #[must_use]
    pub fn as_container_mut(&mut self) -> Option<&mut dyn Container> {
        match self {
            Self::Leaf(_) => None,
            Self::Complex(p) => Some(p),
            Self::Multi(p) => Some(p),
        }
    }

    /// Looks up a child by name (complex) or position (multi-valued).
    #[must_use]
    pub fn child<'k>(&self, key: impl Into<ChildKey<'k>>) -> Option<&Property> {
        self.as_container()?.child_at_index(key.into())
    }

    pub fn child_mut<'k>(&mut self, key: impl Into<ChildKey<'k>>) -> Option<&mut Property> {
        self.as_container_mut()?.child_at_index_mut(key.into())
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafProperty> {
        match self {
            Self::Leaf(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_complex(&self) -> Option<&ComplexProperty> {
        match self {
            Self::Complex(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_multi(&self) -> Option<&MultiProperty> {
        match self {
            Self::Multi(p) => Some(p),
            _ => None,
        }
    }
}

impl From<LeafProperty> for Property {
    fn from(prop: LeafProperty) -> Self {
        Self::Leaf(prop)
    }
}

impl From<ComplexProperty> for Property {
    fn from(prop: ComplexProperty) -> Self {
        Self::Complex(prop)
    }
}

impl From<MultiProperty> for Property {
    fn from(prop: MultiProperty) -> Self {
        Self::Multi(prop)
    }
}

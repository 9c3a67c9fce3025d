//! Multi-valued properties: a deduplicated sequence of elements.

use crate::container::{ChildKey, Container};
use crate::hash::{CachedHash, StructuralHasher};
use crate::leaf::{Operator, supports};
use crate::property::Property;
use scim_schema::{Attribute, ScimError, ScimResult, value_kind};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// An array-shaped property. Every element is built from the single-valued
/// form of the attribute and compared structurally, never by identity.
#[derive(Debug, Clone)]
pub struct MultiProperty {
    attr: Arc<Attribute>,
    element_attr: Arc<Attribute>,
    elements: Vec<Property>,
    /// Set when elements were appended or removed. Changes inside an element
    /// are tracked by the element itself.
    touched: bool,
    hash: CachedHash,
}

impl MultiProperty {
    /// Creates an empty multi-valued property.
    ///
    /// # Panics
    ///
    /// Panics if `attr` is not multi-valued.
    #[must_use]
    pub fn new(attr: Arc<Attribute>) -> Self {
        assert!(
            attr.multi_valued,
            "invalid attribute for multi-valued property: {}",
            attr.path()
        );
        let element_attr = attr.to_single_valued();
        let prop = Self {
            attr,
            element_attr,
            elements: Vec::new(),
            touched: false,
            hash: CachedHash::default(),
        };
        prop.refresh_hash();
        prop
    }

    #[must_use]
    pub fn attribute(&self) -> &Arc<Attribute> {
        &self.attr
    }

    /// The single-valued attribute every element is built from.
    #[must_use]
    pub fn element_attribute(&self) -> &Arc<Attribute> {
        &self.element_attr
    }

    /// Rebuilds a plain array from assigned elements.
    #[must_use]
    pub fn raw(&self) -> Value {
        Value::Array(
            self.elements
                .iter()
                .filter(|e| !e.is_unassigned())
                .map(Property::raw)
                .collect(),
        )
    }

    /// True when there are no elements. An unassigned placeholder from
    /// [`Container::new_child`] still counts as an element.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn present(&self) -> bool {
        self.elements.iter().any(Property::present)
    }

    #[must_use]
    pub fn touched(&self) -> bool {
        self.touched || self.elements.iter().any(Property::touched)
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash.get_or_compute(|| self.compute_hash())
    }

    #[must_use]
    pub fn matches(&self, other: &MultiProperty) -> bool {
        self.attr.equals(&other.attr) && self.hash() == other.hash()
    }

    /// Appends one element, or one per item when `value` is an array.
    ///
    /// The batch is validated before anything is appended. Null items and
    /// items that leave an element unassigned are skipped; items matching an
    /// existing element or an earlier item are discarded.
    pub fn add(&mut self, value: Value) -> ScimResult<()> {
        let items = match value {
            Value::Null => return Ok(()),
            Value::Array(items) => items,
            single => vec![single],
        };

        let mut fresh: Vec<Property> = Vec::with_capacity(items.len());
        for item in items {
            if item.is_null() {
                continue;
            }
            let element = Property::with_value(Arc::clone(&self.element_attr), item)?;
            if element.is_unassigned() {
                continue;
            }
            if self.elements.iter().chain(&fresh).any(|e| e.matches(&element)) {
                trace!(path = %self.attr.path(), "discarding duplicate element");
                continue;
            }
            fresh.push(element);
        }

        if !fresh.is_empty() {
            self.elements.append(&mut fresh);
            self.touched = true;
        }
        self.refresh_hash();
        Ok(())
    }

    /// Clears all elements and adds `value`. Any failure is reported against
    /// this attribute and leaves the property empty. `Null` is ignored.
    pub fn replace(&mut self, value: Value) -> ScimResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let found = value_kind(&value);
        let result = self.delete().and_then(|()| self.add(value));
        result.map_err(|err| {
            debug!(path = %self.attr.path(), error = %err, "replace failed, property emptied");
            ScimError::InvalidValue {
                found,
                path: self.attr.path().to_owned(),
            }
        })
    }

    pub fn delete(&mut self) -> ScimResult<()> {
        if !self.elements.is_empty() {
            self.elements.clear();
            self.touched = true;
        }
        self.refresh_hash();
        Ok(())
    }

    /// True if any element satisfies `test`. Fails without visiting elements
    /// when the element kind does not support `op`.
    pub(crate) fn any(
        &self,
        op: Operator,
        mut test: impl FnMut(&Property) -> ScimResult<bool>,
    ) -> ScimResult<bool> {
        if !supports(self.element_attr.attr_type(), op) {
            return Err(ScimError::incompatible_op(op.as_str(), self.attr.path()));
        }
        for element in &self.elements {
            if test(element)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn refresh_hash(&self) {
        self.hash.set(self.compute_hash());
    }

    /// FNV-1a over the sorted digests of assigned elements, so insertion
    /// order does not matter.
    fn compute_hash(&self) -> u64 {
        let mut digests: Vec<u64> = self
            .elements
            .iter()
            .filter(|e| !e.is_unassigned())
            .map(Property::hash)
            .collect();
        digests.sort_unstable();

        let mut hasher = StructuralHasher::new();
        for digest in digests {
            hasher.write_digest(digest);
        }
        hasher.finish()
    }
}

impl Container for MultiProperty {
    fn count_children(&self) -> usize {
        self.elements.len()
    }

    fn for_each_child(
        &self,
        visit: &mut dyn FnMut(usize, &Property) -> ScimResult<()>,
    ) -> ScimResult<()> {
        for (i, element) in self.elements.iter().enumerate() {
            visit(i, element)?;
        }
        Ok(())
    }

    fn child_at_index(&self, key: ChildKey<'_>) -> Option<&Property> {
        let ChildKey::Position(i) = key else {
            return None;
        };
        self.elements.get(i)
    }

    fn child_at_index_mut(&mut self, key: ChildKey<'_>) -> Option<&mut Property> {
        let ChildKey::Position(i) = key else {
            return None;
        };
        self.hash.invalidate();
        self.elements.get_mut(i)
    }

    fn new_child(&mut self) -> Option<usize> {
        self.elements.push(Property::new(Arc::clone(&self.element_attr)));
        self.hash.invalidate();
        Some(self.elements.len() - 1)
    }

    fn compact(&mut self) {
        self.elements.retain(|e| !e.is_unassigned());
        self.hash.invalidate();
    }
}

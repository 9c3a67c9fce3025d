//! Complex properties: one child per sub-attribute, in schema order.

use crate::container::{ChildKey, Container};
use crate::hash::{CachedHash, StructuralHasher};
use crate::leaf::Operator;
use crate::property::Property;
use scim_schema::{Attribute, ScimError, ScimResult, value_kind};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// An object-shaped property with a fixed, schema-defined set of children.
#[derive(Debug, Clone)]
pub struct ComplexProperty {
    attr: Arc<Attribute>,
    /// Children in sub-attribute declaration order.
    children: Vec<Property>,
    /// Lowercased sub-attribute name to index in `children`.
    name_index: HashMap<String, usize>,
    hash: CachedHash,
}

impl ComplexProperty {
    /// Creates a complex property whose children are all unassigned.
    ///
    /// # Panics
    ///
    /// Panics if `attr` is not a single-valued complex attribute.
    #[must_use]
    pub fn new(attr: Arc<Attribute>) -> Self {
        assert!(
            attr.single_valued() && attr.is_complex(),
            "invalid attribute for complex property: {}",
            attr.path()
        );

        let mut children = Vec::with_capacity(attr.count_sub_attributes());
        let mut name_index = HashMap::with_capacity(attr.count_sub_attributes());
        for sub in &attr.sub_attributes {
            name_index.insert(sub.name.to_lowercase(), children.len());
            children.push(Property::new(Arc::clone(sub)));
        }

        let prop = Self {
            attr,
            children,
            name_index,
            hash: CachedHash::default(),
        };
        prop.refresh_hash();
        prop
    }

    #[must_use]
    pub fn attribute(&self) -> &Arc<Attribute> {
        &self.attr
    }

    /// Rebuilds a plain object from assigned children. Walks the whole
    /// subtree; avoid on hot paths.
    #[must_use]
    pub fn raw(&self) -> Value {
        let fields: Map<String, Value> = self
            .children
            .iter()
            .filter(|child| !child.is_unassigned())
            .map(|child| (child.attribute().name.clone(), child.raw()))
            .collect();
        Value::Object(fields)
    }

    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.children.iter().all(Property::is_unassigned)
    }

    #[must_use]
    pub fn present(&self) -> bool {
        self.children.iter().any(Property::present)
    }

    #[must_use]
    pub fn touched(&self) -> bool {
        self.children.iter().any(Property::touched)
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash.get_or_compute(|| self.compute_hash())
    }

    /// Structural equality: same schema node, same shape, same digest.
    #[must_use]
    pub fn matches(&self, other: &ComplexProperty) -> bool {
        self.attr.equals(&other.attr)
            && self.children.len() == other.children.len()
            && self.hash() == other.hash()
    }

    /// Merges an object into the children. Keys resolve case-insensitively
    /// and unknown keys are ignored. `Null` is ignored.
    pub fn add(&mut self, value: Value) -> ScimResult<()> {
        let fields = match value {
            Value::Null => return Ok(()),
            Value::Object(fields) => fields,
            other => {
                debug!(path = %self.attr.path(), found = value_kind(&other), "rejected complex value");
                return Err(ScimError::invalid_value(&other, self.attr.path()));
            }
        };

        self.hash.invalidate();
        for (key, field) in fields {
            let Some(&i) = self.name_index.get(&key.to_lowercase()) else {
                trace!(path = %self.attr.path(), key = %key, "ignoring unknown sub-attribute");
                continue;
            };
            self.children[i].add(field)?;
        }
        self.refresh_hash();
        Ok(())
    }

    /// Clears every child and adds `value`. Any failure is reported against
    /// this attribute and leaves the property emptied. `Null` is ignored.
    pub fn replace(&mut self, value: Value) -> ScimResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let found = value_kind(&value);
        let result = self.delete().and_then(|()| self.add(value));
        result.map_err(|err| {
            debug!(path = %self.attr.path(), error = %err, "replace failed, property emptied");
            self.clear();
            ScimError::InvalidValue {
                found,
                path: self.attr.path().to_owned(),
            }
        })
    }

    pub fn delete(&mut self) -> ScimResult<()> {
        self.hash.invalidate();
        for child in &mut self.children {
            child.delete()?;
        }
        self.refresh_hash();
        Ok(())
    }

    pub(crate) fn incompatible(&self, op: Operator) -> ScimError {
        ScimError::incompatible_op(op.as_str(), self.attr.path())
    }

    /// Best-effort emptying after a failed replace.
    fn clear(&mut self) {
        for child in &mut self.children {
            if child.delete().is_err() {
                trace!(path = %child.attribute().path(), "child could not be cleared");
            }
        }
        self.refresh_hash();
    }

    fn refresh_hash(&self) {
        self.hash.set(self.compute_hash());
    }

    /// FNV-1a over (name, digest) pairs of the children in schema order.
    ///
    /// When any sub-attribute is an identity key only identity children
    /// contribute. Unassigned children contribute their name only.
    fn compute_hash(&self) -> u64 {
        let has_identity = self.attr.has_identity_sub_attributes();
        let mut hasher = StructuralHasher::new();
        for child in &self.children {
            let child_attr = child.attribute();
            if has_identity && !child_attr.is_identity() {
                continue;
            }
            hasher.write_name(&child_attr.name);
            if !child.is_unassigned() {
                hasher.write_digest(child.hash());
            }
        }
        hasher.finish()
    }
}

impl Container for ComplexProperty {
    fn count_children(&self) -> usize {
        self.children.len()
    }

    fn for_each_child(
        &self,
        visit: &mut dyn FnMut(usize, &Property) -> ScimResult<()>,
    ) -> ScimResult<()> {
        for (i, child) in self.children.iter().enumerate() {
            visit(i, child)?;
        }
        Ok(())
    }

    fn child_at_index(&self, key: ChildKey<'_>) -> Option<&Property> {
        let ChildKey::Name(name) = key else {
            return None;
        };
        let i = *self.name_index.get(&name.to_lowercase())?;
        self.children.get(i)
    }

    fn child_at_index_mut(&mut self, key: ChildKey<'_>) -> Option<&mut Property> {
        let ChildKey::Name(name) = key else {
            return None;
        };
        let i = *self.name_index.get(&name.to_lowercase())?;
        self.hash.invalidate();
        self.children.get_mut(i)
    }

    fn new_child(&mut self) -> Option<usize> {
        None
    }

    fn compact(&mut self) {}
}

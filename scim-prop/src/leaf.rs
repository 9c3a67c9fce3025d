//! Leaf properties: a single scalar value bound to one attribute.

use crate::scalar::Scalar;
use scim_schema::{Attribute, AttributeType, ScimError, ScimResult, value_kind};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Filter relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Eq,
    Sw,
    Ew,
    Co,
    Gt,
    Lt,
}

impl Operator {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Sw => "sw",
            Self::Ew => "ew",
            Self::Co => "co",
            Self::Gt => "gt",
            Self::Lt => "lt",
        }
    }
}

/// Whether values of `kind` can be compared with `op`.
pub(crate) fn supports(kind: AttributeType, op: Operator) -> bool {
    match kind {
        AttributeType::String => true,
        AttributeType::Integer | AttributeType::Decimal | AttributeType::DateTime => {
            matches!(op, Operator::Eq | Operator::Gt | Operator::Lt)
        }
        AttributeType::Boolean | AttributeType::Binary => op == Operator::Eq,
        AttributeType::Reference => {
            matches!(op, Operator::Eq | Operator::Sw | Operator::Ew | Operator::Co)
        }
        AttributeType::Complex => false,
    }
}

/// A property holding at most one scalar value.
#[derive(Debug, Clone)]
pub struct LeafProperty {
    attr: Arc<Attribute>,
    value: Option<Scalar>,
    touched: bool,
    hash: u64,
}

impl LeafProperty {
    /// Creates an unassigned leaf.
    ///
    /// # Panics
    ///
    /// Panics if `attr` is multi-valued or complex.
    #[must_use]
    pub fn new(attr: Arc<Attribute>) -> Self {
        assert!(
            attr.single_valued() && !attr.is_complex(),
            "invalid attribute for leaf property: {}",
            attr.path()
        );
        Self {
            attr,
            value: None,
            touched: false,
            hash: 0,
        }
    }

    #[must_use]
    pub fn attribute(&self) -> &Arc<Attribute> {
        &self.attr
    }

    #[must_use]
    pub fn value(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn raw(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, Scalar::to_value)
    }

    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.value.is_none()
    }

    /// Assigned, and non-empty for textual kinds.
    #[must_use]
    pub fn present(&self) -> bool {
        match &self.value {
            Some(Scalar::String(s) | Scalar::Reference(s)) => !s.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    #[must_use]
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Digest of the current value; 0 while unassigned.
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn matches(&self, other: &LeafProperty) -> bool {
        self.attr.equals(&other.attr) && self.hash == other.hash
    }

    /// Stores `value`, overwriting any previous one. `Null` is ignored.
    pub fn add(&mut self, value: Value) -> ScimResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let scalar = self.parse(&value)?;
        self.assign(scalar);
        Ok(())
    }

    /// Delete followed by add. The value is validated first, so a rejected
    /// value leaves the current one in place.
    pub fn replace(&mut self, value: Value) -> ScimResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let scalar = self.parse(&value)?;
        self.delete()?;
        self.assign(scalar);
        Ok(())
    }

    pub fn delete(&mut self) -> ScimResult<()> {
        if self.value.take().is_some() {
            self.touched = true;
        }
        self.hash = 0;
        Ok(())
    }

    // ── Relational operators ─────────────────────────────────────────

    pub fn equals_to(&self, value: &Value) -> ScimResult<bool> {
        self.check(Operator::Eq)?;
        let operand = self.parse(value)?;
        let Some(current) = &self.value else {
            return Ok(false);
        };
        Ok(match (current, &operand) {
            (Scalar::String(a), Scalar::String(b)) => self.fold(a) == self.fold(b),
            (a, b) => a == b,
        })
    }

    pub fn starts_with(&self, prefix: &str) -> ScimResult<bool> {
        self.text_match(Operator::Sw, prefix, |s, p| s.starts_with(p))
    }

    pub fn ends_with(&self, suffix: &str) -> ScimResult<bool> {
        self.text_match(Operator::Ew, suffix, |s, p| s.ends_with(p))
    }

    pub fn contains(&self, fragment: &str) -> ScimResult<bool> {
        self.text_match(Operator::Co, fragment, |s, p| s.contains(p))
    }

    pub fn greater_than(&self, value: &Value) -> ScimResult<bool> {
        Ok(self.order(Operator::Gt, value)? == Some(Ordering::Greater))
    }

    pub fn less_than(&self, value: &Value) -> ScimResult<bool> {
        Ok(self.order(Operator::Lt, value)? == Some(Ordering::Less))
    }

    fn text_match(
        &self,
        op: Operator,
        needle: &str,
        test: impl Fn(&str, &str) -> bool,
    ) -> ScimResult<bool> {
        self.check(op)?;
        Ok(match &self.value {
            Some(Scalar::String(s)) => test(&*self.fold(s), &*self.fold(needle)),
            Some(Scalar::Reference(s)) => test(s, needle),
            _ => false,
        })
    }

    fn order(&self, op: Operator, value: &Value) -> ScimResult<Option<Ordering>> {
        self.check(op)?;
        let operand = self.parse(value)?;
        let Some(current) = &self.value else {
            return Ok(None);
        };
        Ok(match (current, &operand) {
            (Scalar::String(a), Scalar::String(b)) => Some(self.fold(a).cmp(&self.fold(b))),
            (Scalar::Integer(a), Scalar::Integer(b)) => Some(a.cmp(b)),
            (Scalar::Decimal(a), Scalar::Decimal(b)) => a
                .as_f64()
                .zip(b.as_f64())
                .and_then(|(a, b)| a.partial_cmp(&b)),
            (Scalar::DateTime(a), Scalar::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        })
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn check(&self, op: Operator) -> ScimResult<()> {
        if supports(self.attr.attr_type(), op) {
            Ok(())
        } else {
            Err(ScimError::incompatible_op(op.as_str(), self.attr.path()))
        }
    }

    fn parse(&self, value: &Value) -> ScimResult<Scalar> {
        Scalar::parse(self.attr.attr_type(), value).ok_or_else(|| {
            debug!(
                path = %self.attr.path(),
                expected = %self.attr.attr_type(),
                found = value_kind(value),
                "rejected leaf value"
            );
            ScimError::invalid_value(value, self.attr.path())
        })
    }

    fn fold<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if self.attr.case_exact {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.to_lowercase())
        }
    }

    fn assign(&mut self, scalar: Scalar) {
        self.hash = scalar.digest(self.attr.case_exact);
        self.value = Some(scalar);
        self.touched = true;
    }
}

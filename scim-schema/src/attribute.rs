//! SCIM attribute definitions.
//!
//! An [`Attribute`] describes one resource field: its name, value kind,
//! multiplicity, sub-attributes and the protocol policies (mutability,
//! returned, uniqueness) attached to it. Attribute trees are loaded once and
//! then shared read-only behind [`Arc`]; derived views such as
//! [`Attribute::to_single_valued`] share children with their source, while
//! [`Attribute::copy`] produces a fully independent tree.

use crate::error::ScimResult;
use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The value kind of an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    #[default]
    String,
    Integer,
    Decimal,
    Boolean,
    DateTime,
    Reference,
    Binary,
    Complex,
}

impl AttributeType {
    /// The protocol name of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::DateTime => "dateTime",
            Self::Reference => "reference",
            Self::Binary => "binary",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether and when a client may write an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    ReadOnly,
    #[default]
    ReadWrite,
    Immutable,
    WriteOnly,
}

/// When an attribute is included in responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Returned {
    Always,
    Never,
    #[default]
    Default,
    Request,
}

/// Scope within which attribute values must be unique.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uniqueness {
    #[default]
    None,
    Server,
    Global,
}

/// Schema metadata for one field of a SCIM resource.
///
/// `type`, `mutability`, `returned` and `uniqueness` may be absent from a
/// definition; their accessors always report the protocol default, and
/// [`Attribute::set_defaults`] writes those defaults back.
///
/// `Clone` is shallow with respect to sub-attributes and metadata (the
/// `Arc`s are shared). Use [`Attribute::copy`] for an independent tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    attr_type: Option<AttributeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<Arc<Attribute>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_values: Vec<String>,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub case_exact: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mutability: Option<Mutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    returned: Option<Returned>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uniqueness: Option<Uniqueness>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_types: Vec<String>,
    /// Out-of-band annotations; never part of the serialized schema.
    #[serde(skip)]
    pub metadata: Option<Arc<Metadata>>,
    /// Dotted schema path, assigned by [`Attribute::finalize`].
    #[serde(skip)]
    path: Option<String>,
}

impl Attribute {
    /// Creates a single-valued attribute of the given type.
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type: Some(attr_type),
            ..Self::default()
        }
    }

    /// Creates a single-valued complex attribute with the given children.
    pub fn complex(name: impl Into<String>, sub_attributes: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            sub_attributes: sub_attributes.into_iter().map(Arc::new).collect(),
            ..Self::new(name, AttributeType::Complex)
        }
    }

    /// Parses an attribute definition (SCIM schema JSON) and finalizes it.
    pub fn from_json(text: &str) -> ScimResult<Self> {
        let mut attr: Self = serde_json::from_str(text)?;
        attr.finalize();
        Ok(attr)
    }

    /// Sets the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets whether the attribute holds a collection of values.
    pub fn with_multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    /// Sets whether a value must be supplied.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets whether string values compare case-sensitively.
    pub fn with_case_exact(mut self, case_exact: bool) -> Self {
        self.case_exact = case_exact;
        self
    }

    /// Sets the mutability policy.
    pub fn with_mutability(mut self, mutability: Mutability) -> Self {
        self.mutability = Some(mutability);
        self
    }

    /// Sets when the attribute is returned in responses.
    pub fn with_returned(mut self, returned: Returned) -> Self {
        self.returned = Some(returned);
        self
    }

    /// Sets the uniqueness policy.
    pub fn with_uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = Some(uniqueness);
        self
    }

    /// Sets the suggested values for the attribute.
    pub fn with_canonical_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.canonical_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the resource types a reference may point to.
    pub fn with_reference_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches out-of-band metadata such as an identity flag.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Finalizes in builder style. See [`Attribute::finalize`].
    #[must_use]
    pub fn finalized(mut self) -> Self {
        self.finalize();
        self
    }

    // ── Resolved accessors ───────────────────────────────────────────

    #[must_use]
    pub fn attr_type(&self) -> AttributeType {
        self.attr_type.unwrap_or_default()
    }

    #[must_use]
    pub fn mutability(&self) -> Mutability {
        self.mutability.unwrap_or_default()
    }

    #[must_use]
    pub fn returned(&self) -> Returned {
        self.returned.unwrap_or_default()
    }

    #[must_use]
    pub fn uniqueness(&self) -> Uniqueness {
        self.uniqueness.unwrap_or_default()
    }

    /// The dotted schema path of this attribute, or its bare name when the
    /// tree was never finalized.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.attr_type() == AttributeType::Complex
    }

    #[must_use]
    pub fn single_valued(&self) -> bool {
        !self.multi_valued
    }

    /// True if the out-of-band metadata marks this attribute as an identity
    /// key for its complex parent.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.identity)
    }

    /// True if any direct sub-attribute is an identity key.
    #[must_use]
    pub fn has_identity_sub_attributes(&self) -> bool {
        self.sub_attributes.iter().any(|sub| sub.is_identity())
    }

    #[must_use]
    pub fn count_sub_attributes(&self) -> usize {
        self.sub_attributes.len()
    }

    /// Finds a direct sub-attribute by case-insensitive name.
    #[must_use]
    pub fn sub_attribute(&self, name: &str) -> Option<&Arc<Attribute>> {
        self.sub_attributes.iter().find(|sub| sub.goes_by(name))
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Returns true if this attribute can be addressed by `name`. Attribute
    /// names compare case-insensitively.
    #[must_use]
    pub fn goes_by(&self, name: &str) -> bool {
        eq_ignore_case(&self.name, name)
    }

    /// Fills unresolved type and policy fields with their protocol defaults.
    /// Idempotent; does not descend into sub-attributes.
    pub fn set_defaults(&mut self) {
        self.attr_type.get_or_insert_with(AttributeType::default);
        self.mutability.get_or_insert_with(Mutability::default);
        self.returned.get_or_insert_with(Returned::default);
        self.uniqueness.get_or_insert_with(Uniqueness::default);
    }

    /// Resolves defaults and assigns dotted paths across the whole tree.
    ///
    /// Shared sub-attributes are cloned on write, so finalizing never
    /// changes a tree that another attribute still references.
    pub fn finalize(&mut self) {
        self.finalize_under(None);
    }

    fn finalize_under(&mut self, parent: Option<&str>) {
        let path = match parent {
            Some(parent) => format!("{parent}.{}", self.name),
            None => self.name.clone(),
        };
        self.set_defaults();
        for sub in &mut self.sub_attributes {
            Arc::make_mut(sub).finalize_under(Some(&path));
        }
        self.path = Some(path);
    }

    /// Returns this attribute with `multi_valued` cleared.
    ///
    /// The derivative shares sub-attributes and metadata with `self`. When
    /// `self` is already single-valued the same `Arc` is returned.
    #[must_use]
    pub fn to_single_valued(self: &Arc<Self>) -> Arc<Self> {
        if !self.multi_valued {
            return Arc::clone(self);
        }
        let mut derived = Self::clone(self);
        derived.multi_valued = false;
        Arc::new(derived)
    }

    /// Returns this attribute with `required` cleared.
    ///
    /// The derivative shares sub-attributes and metadata with `self`. When
    /// `self` is already optional the same `Arc` is returned.
    #[must_use]
    pub fn to_optional(self: &Arc<Self>) -> Arc<Self> {
        if !self.required {
            return Arc::clone(self);
        }
        let mut derived = Self::clone(self);
        derived.required = false;
        Arc::new(derived)
    }

    /// Deep copy: sub-attributes and metadata are cloned into new
    /// allocations, so the result can be mutated without affecting `self`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            attr_type: self.attr_type,
            sub_attributes: self
                .sub_attributes
                .iter()
                .map(|sub| Arc::new(sub.copy()))
                .collect(),
            canonical_values: self.canonical_values.clone(),
            multi_valued: self.multi_valued,
            required: self.required,
            case_exact: self.case_exact,
            mutability: self.mutability,
            returned: self.returned,
            uniqueness: self.uniqueness,
            reference_types: self.reference_types.clone(),
            metadata: self.metadata.as_ref().map(|m| Arc::new(m.copy())),
            path: self.path.clone(),
        }
    }

    /// Schema equality: the same node, or nodes at the same path with the
    /// same type, multiplicity and number of sub-attributes.
    #[must_use]
    pub fn equals(&self, other: &Attribute) -> bool {
        std::ptr::eq(self, other)
            || (eq_ignore_case(self.path(), other.path())
                && self.attr_type() == other.attr_type()
                && self.multi_valued == other.multi_valued
                && self.sub_attributes.len() == other.sub_attributes.len())
    }
}

/// Attribute operations on a possibly absent attribute.
///
/// Absent attributes never address any name and copy or derive to absent.
pub trait OptionalAttribute {
    fn goes_by(&self, name: &str) -> bool;
    fn copy(&self) -> Option<Attribute>;
    fn to_single_valued(&self) -> Option<Arc<Attribute>>;
    fn to_optional(&self) -> Option<Arc<Attribute>>;
}

impl OptionalAttribute for Option<&Arc<Attribute>> {
    fn goes_by(&self, name: &str) -> bool {
        self.is_some_and(|attr| attr.goes_by(name))
    }

    fn copy(&self) -> Option<Attribute> {
        self.map(|attr| attr.copy())
    }

    fn to_single_valued(&self) -> Option<Arc<Attribute>> {
        self.map(Attribute::to_single_valued)
    }

    fn to_optional(&self) -> Option<Arc<Attribute>> {
        self.map(Attribute::to_optional)
    }
}

/// In-place operations on a possibly absent attribute. Absent attributes
/// are left as they are.
pub trait OptionalAttributeMut {
    fn set_defaults(&mut self);
}

impl OptionalAttributeMut for Option<&mut Attribute> {
    fn set_defaults(&mut self) {
        if let Some(attr) = self {
            attr.set_defaults();
        }
    }
}

/// Unicode case-insensitive string comparison without allocating.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

//! Out-of-band attribute annotations.
//!
//! Identity flags and storage aliases are not part of a SCIM schema
//! document. They are kept in separate overlay files keyed by attribute path
//! and attached to a loaded schema tree with [`MetadataOverlay::apply`].

use crate::attribute::{eq_ignore_case, Attribute};
use crate::error::ScimResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Annotations attached to one attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    /// Marks a sub-attribute as the comparison key of its complex parent.
    pub identity: bool,
    /// Column or field name used by storage backends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_alias: Option<String>,
    /// Free-form annotations for collaborators.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Value>,
}

impl Metadata {
    /// Metadata flagging an identity sub-attribute.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            identity: true,
            ..Self::default()
        }
    }

    /// Independent copy of these annotations.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

/// One overlay entry: the attribute path it targets and its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub path: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

/// A set of metadata entries loaded from an overlay document.
///
/// The document is a JSON array:
///
/// ```json
/// [
///   { "path": "members.value", "identity": true },
///   { "path": "userName", "dbAlias": "user_name" }
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataOverlay {
    entries: Vec<MetadataEntry>,
}

impl MetadataOverlay {
    #[must_use]
    pub fn new(entries: Vec<MetadataEntry>) -> Self {
        Self { entries }
    }

    /// Parses an overlay document.
    pub fn from_json(text: &str) -> ScimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    /// Finds the metadata registered for `path` (case-insensitive).
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Metadata> {
        self.entries
            .iter()
            .find(|entry| eq_ignore_case(&entry.path, path))
            .map(|entry| &entry.metadata)
    }

    /// Attaches matching entries to `attr` and its descendants, replacing any
    /// metadata already there. The tree should be finalized first so paths
    /// are assigned. Returns the number of attributes annotated.
    pub fn apply(&self, attr: &mut Attribute) -> usize {
        let mut matched = vec![false; self.entries.len()];
        let count = self.apply_to(attr, &mut matched);

        for (entry, hit) in self.entries.iter().zip(&matched) {
            if !hit {
                warn!(path = %entry.path, "metadata entry matches no attribute");
            }
        }
        debug!(root = %attr.path(), annotated = count, "applied metadata overlay");
        count
    }

    fn apply_to(&self, attr: &mut Attribute, matched: &mut [bool]) -> usize {
        let mut count = 0;
        if let Some(i) = self
            .entries
            .iter()
            .position(|entry| eq_ignore_case(&entry.path, attr.path()))
        {
            attr.metadata = Some(Arc::new(self.entries[i].metadata.copy()));
            matched[i] = true;
            count += 1;
        }
        for sub in &mut attr.sub_attributes {
            if self.targets(sub) {
                count += self.apply_to(Arc::make_mut(sub), matched);
            }
        }
        count
    }

    /// True if any entry targets `attr` or one of its descendants. Subtrees
    /// nothing targets are left shared.
    fn targets(&self, attr: &Attribute) -> bool {
        self.entries
            .iter()
            .any(|entry| eq_ignore_case(&entry.path, attr.path()))
            || attr.sub_attributes.iter().any(|sub| self.targets(sub))
    }
}

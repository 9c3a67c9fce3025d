//! The capability shared by properties that hold child properties.

use crate::property::Property;
use scim_schema::ScimResult;

/// Address of a child within a container.
///
/// Complex properties are addressed by sub-attribute name, multi-valued
/// properties by element position. A key of the other form finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKey<'a> {
    Name(&'a str),
    Position(usize),
}

impl<'a> From<&'a str> for ChildKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for ChildKey<'_> {
    fn from(position: usize) -> Self {
        Self::Position(position)
    }
}

/// Child access for complex and multi-valued properties.
pub trait Container {
    fn count_children(&self) -> usize;

    /// Visits children in order. An error from `visit` stops the iteration
    /// and is returned unchanged.
    fn for_each_child(
        &self,
        visit: &mut dyn FnMut(usize, &Property) -> ScimResult<()>,
    ) -> ScimResult<()>;

    fn child_at_index(&self, key: ChildKey<'_>) -> Option<&Property>;

    /// Mutable access to a child. The container's cached hash is dropped
    /// and recomputed on the next read.
    fn child_at_index_mut(&mut self, key: ChildKey<'_>) -> Option<&mut Property>;

    /// Appends an unassigned child and returns its index, or `None` when the
    /// container has a fixed shape.
    fn new_child(&mut self) -> Option<usize>;

    /// Drops unassigned children where the shape allows it.
    fn compact(&mut self);
}

//! Port traits a document-tree backend implements for the locator.
//!
//! The locator is written against these two traits only. Backends wrap
//! whatever they talk to (an in-memory arena, a browser automation bridge,
//! a parsed snapshot) and keep all transport detail behind this seam.

use crate::errors::DomResult;
use crate::model::StructuralQuery;

/// A document handle: the unit the locator searches within.
///
/// Handles are cheap to clone. A handle may be scoped to a subtree (for
/// container-rooted searches); every lookup below then answers relative to
/// that scope. Frame content is exposed as further `Document` values so a
/// resolved frame can be descended into without a second protocol.
pub trait Document: Clone + std::fmt::Debug {
    type Node: DomNode;

    /// Identity lookup. `Ok(None)` when no element carries the id.
    ///
    /// Backends mirroring legacy engines may answer with a node whose id
    /// does not actually equal the argument (name-keyed aliasing); callers
    /// that care must confirm the id themselves.
    fn element_by_id(&self, id: &str) -> DomResult<Option<Self::Node>>;

    /// All elements whose `name` attribute equals `name`, in document order.
    fn elements_by_name(&self, name: &str) -> DomResult<Vec<Self::Node>>;

    /// All elements with the given tag name, in document order. The
    /// wildcard tag `*` yields every element.
    fn elements_by_tag(&self, tag: &str) -> DomResult<Vec<Self::Node>>;

    /// Evaluate a structural query and return matches in document order.
    fn evaluate(&self, query: &StructuralQuery) -> DomResult<Vec<Self::Node>>;

    /// The document's form elements, in document order.
    fn forms(&self) -> DomResult<Vec<Self::Node>>;

    /// Live frame collection: one nested document per frame-bearing
    /// element, in document order. Position `i` corresponds to the `i`-th
    /// frame-tagged element of the same enumeration.
    fn frames(&self) -> DomResult<Vec<Self>>;

    /// Every element in scope, in document order.
    fn all_elements(&self) -> DomResult<Vec<Self::Node>>;
}

/// A single element node surfaced by a [`Document`].
pub trait DomNode: Clone + std::fmt::Debug {
    /// Tag name as the backend reports it; callers normalise case.
    fn tag_name(&self) -> DomResult<String>;

    /// Read an attribute-or-property by name.
    ///
    /// `Ok(Some(""))` means the element supports the name but it is empty
    /// or unset; `Ok(None)` means the element has no such addressable
    /// property at all. The locator turns the latter into a hard error, so
    /// backends must not conflate the two.
    fn attribute(&self, name: &str) -> DomResult<Option<String>>;

    /// The element's declared `type`, with engine defaults applied (an
    /// input with no explicit type reports `text`). `None` for elements
    /// that have no type notion.
    fn declared_type(&self) -> DomResult<Option<String>>;

    /// All descendant elements in document order, excluding `self`.
    fn descendant_elements(&self) -> DomResult<Vec<Self>>;

    /// Node identity, independent of handle identity.
    fn is_same(&self, other: &Self) -> bool;
}

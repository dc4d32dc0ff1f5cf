//! Element resolution over a document-tree port.
//!
//! Callers describe an element with a handful of criteria (`id`, `name`,
//! `text`, a class token, a pattern, an ordinal, a raw query) and the
//! locator turns that description into a concrete node of a live document
//! tree, or decides that nothing matches. The tree itself stays behind the
//! `dom-port` traits, so the same engine drives an in-memory arena in
//! tests and a real automation backend in production.
//!
//! Resolution order:
//! - a literal id criterion tries the tree's identity index first, with
//!   full confirmation of what comes back
//! - a raw query or pinned node short-circuits the scan entirely
//! - everything else walks the kind's candidate pools lazily and picks
//!   the 0-based ordinal among acceptable elements
//!
//! "Nothing matched" is `Ok(None)`; hard errors are reserved for
//! unanswerable criteria, ambiguous raw queries, and mandatory tree
//! lookups that fail.

pub mod errors;
pub mod kinds;
mod matcher;
pub mod registry;
pub mod resolver;
pub mod specifier;
mod strategies;

pub use dom_port::{Document, DomError, DomNode, StructuralQuery};

pub use errors::LocatorError;
pub use kinds::{ElementKind, IterationPolicy};
pub use registry::{kind, KINDS};
pub use resolver::{Binding, Candidate, Locator, Matches};
pub use specifier::{Criteria, SpecifierSet, SpecifierValue, TagRestriction};

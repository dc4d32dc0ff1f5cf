//! Document-tree port for element resolution.
//!
//! This crate defines the narrow surface a document backend exposes to the
//! locator engine, plus a self-contained in-memory backend used as the
//! reference implementation and test double.
//!
//! - [`Document`] / [`DomNode`]: the port traits
//! - [`StructuralQuery`]: the two query dialects handed to backends
//! - [`MemDocument`] / [`MemNode`]: the arena-backed reference backend
//! - [`DomError`]: the backend failure taxonomy

pub mod api;
pub mod errors;
pub mod memory;
pub mod model;
mod query;

pub use api::{Document, DomNode};
pub use errors::{DomError, DomResult};
pub use memory::{MemDocument, MemNode};
pub use model::StructuralQuery;

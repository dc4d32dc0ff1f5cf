//! Error types for element resolution.

use dom_port::{Document, DomError};
use thiserror::Error;

use crate::specifier::{SpecifierValue, TagRestriction};

/// Failures surfaced by a [`crate::resolver::Locator`].
///
/// "Nothing matched" is not an error; searches that exhaust their
/// candidates resolve to `Ok(None)`.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// A criterion names an attribute the searched elements cannot answer.
    #[error("{key} is an unknown way of finding a <{tags}> element ({value})")]
    UnsupportedCriterion {
        key: String,
        value: String,
        tags: String,
    },

    /// A raw query was combined with criteria beyond a tag restriction.
    #[error("ambiguous specifiers: {0}")]
    AmbiguousSpecifier(String),

    /// The tree failed a lookup the search cannot do without.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl LocatorError {
    pub(crate) fn unsupported<D: Document>(
        key: &str,
        value: &SpecifierValue<D>,
        tags: &TagRestriction,
    ) -> Self {
        Self::UnsupportedCriterion {
            key: key.to_string(),
            value: value.to_string(),
            tags: tags.to_string(),
        }
    }
}

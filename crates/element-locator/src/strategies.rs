//! Resolution strategies that run before the ordinal scan.

use dom_port::{Document, DomNode};
use tracing::{debug, warn};

use crate::errors::LocatorError;
use crate::matcher::{matches_specifiers, type_matches};
use crate::specifier::SpecifierSet;

/// Identity fast path.
///
/// Only a literal id criterion qualifies. The answered node must confirm
/// its actual id, pass tag acceptance, and satisfy the remaining criteria;
/// on any disagreement or tree failure the caller falls through to the
/// scan. An unsupported-criterion probe is the one hard failure that
/// escapes even here.
pub(crate) fn fast_path_by_id<D: Document>(
    document: &D,
    set: &SpecifierSet<D>,
) -> Result<Option<D::Node>, LocatorError> {
    let Some(id) = set.literal("id") else {
        return Ok(None);
    };
    let node = match document.element_by_id(id) {
        Ok(Some(node)) => node,
        Ok(None) => return Ok(None),
        Err(error) => {
            warn!(%error, id, "id lookup failed, falling through to scan");
            return Ok(None);
        }
    };
    match node.attribute("id") {
        Ok(Some(actual)) if actual == id => {}
        Ok(_) => {
            debug!(id, "id lookup answered a different element, falling through");
            return Ok(None);
        }
        Err(error) => {
            warn!(%error, id, "id confirmation failed, falling through to scan");
            return Ok(None);
        }
    }
    if !type_matches(set.tags(), &node) {
        return Ok(None);
    }
    match matches_specifiers(set, &node) {
        Ok(true) => {
            debug!(id, "resolved via id fast path");
            Ok(Some(node))
        }
        Ok(false) => Ok(None),
        Err(LocatorError::Dom(error)) => {
            warn!(%error, id, "criteria confirmation failed, falling through to scan");
            Ok(None)
        }
        Err(hard) => Err(hard),
    }
}

/// Raw-query candidates, in document order.
///
/// A pinned node short-circuits completely unfiltered. Query results keep
/// only tag-acceptable nodes; the ordinary criteria are considered already
/// encoded in the query itself. Query failures are mandatory and surface.
pub(crate) fn query_candidates<D: Document>(
    document: &D,
    set: &SpecifierSet<D>,
) -> Result<Vec<D::Node>, LocatorError> {
    if let Some(node) = set.node() {
        return Ok(vec![node.clone()]);
    }
    let Some(query) = set.query() else {
        return Ok(Vec::new());
    };
    debug!(%query, "evaluating raw query");
    let nodes = document.evaluate(query)?;
    Ok(nodes
        .into_iter()
        .filter(|node| type_matches(set.tags(), node))
        .collect())
}

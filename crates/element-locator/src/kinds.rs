//! Element kinds and their candidate enumeration policies.
//!
//! A kind bundles a name, the tag vocabulary it accepts, and the policy
//! that decides where scan candidates come from. The scan itself is a lazy
//! stream: tag pools are fetched one batch at a time, so an early ordinal
//! hit never enumerates the rest of the document.

use dom_port::{Document, DomNode};
use serde::Serialize;
use tracing::warn;

use crate::errors::LocatorError;
use crate::specifier::{SpecifierSet, TagRestriction};

/// How scan candidates are produced for a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationPolicy {
    /// One pool per tag of the restriction, in order.
    Tagged,
    /// Like [`IterationPolicy::Tagged`], but each element is paired
    /// positionally with the document's live frame collection.
    Frame,
    /// The document's form collection, once.
    Form,
    /// A single pool: the name index when a literal name criterion
    /// exists, otherwise every element in scope.
    Input,
}

/// A named element kind.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ElementKind {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub policy: IterationPolicy,
}

impl ElementKind {
    /// The kind's default tag restriction.
    pub fn restriction(&self) -> TagRestriction {
        TagRestriction::new(self.tags.iter().copied())
    }
}

/// One raw enumeration entry: a node and, for frames, its paired content
/// document.
pub(crate) struct TagHit<D: Document> {
    pub node: D::Node,
    pub content: Option<D>,
}

fn plain<D: Document>(nodes: Vec<D::Node>) -> Vec<TagHit<D>> {
    nodes
        .into_iter()
        .map(|node| TagHit {
            node,
            content: None,
        })
        .collect()
}

/// Pair each element of `tag` with the same-position entry of the live
/// frame collection. The pairing restarts from position zero for every
/// tag, and is only as stable as the document itself.
fn frame_pool<D: Document>(document: &D, tag: &str) -> Result<Vec<TagHit<D>>, LocatorError> {
    let nodes = document.elements_by_tag(tag)?;
    let mut contents = document.frames()?.into_iter();
    Ok(nodes
        .into_iter()
        .map(|node| TagHit {
            node,
            content: contents.next(),
        })
        .collect())
}

/// Candidate pool for input-like kinds.
///
/// A failed name lookup degrades to the full element scan instead of
/// failing the search; an empty name index is an answer, not a failure.
fn input_pool<D: Document>(
    document: &D,
    set: &SpecifierSet<D>,
) -> Result<Vec<TagHit<D>>, LocatorError> {
    if let Some(name) = set.literal("name") {
        match document.elements_by_name(name) {
            Ok(nodes) => return Ok(plain(nodes)),
            Err(error) => {
                warn!(%error, name, "name lookup failed, scanning all elements instead");
            }
        }
    }
    Ok(plain(document.all_elements()?))
}

/// Lazy walk of a kind's candidate pools.
pub(crate) struct ScanStream<'a, D: Document> {
    document: &'a D,
    set: &'a SpecifierSet<D>,
    policy: IterationPolicy,
    tags: Vec<String>,
    cursor: usize,
    batch: std::vec::IntoIter<TagHit<D>>,
    done: bool,
}

impl<'a, D: Document> ScanStream<'a, D> {
    pub(crate) fn new(document: &'a D, set: &'a SpecifierSet<D>, policy: IterationPolicy) -> Self {
        Self {
            document,
            set,
            policy,
            tags: set.tags().names().to_vec(),
            cursor: 0,
            batch: Vec::new().into_iter(),
            done: false,
        }
    }

    fn next_batch(&mut self) -> Result<Option<Vec<TagHit<D>>>, LocatorError> {
        match self.policy {
            IterationPolicy::Tagged => match self.tags.get(self.cursor) {
                Some(tag) => {
                    self.cursor += 1;
                    Ok(Some(plain(self.document.elements_by_tag(tag)?)))
                }
                None => Ok(None),
            },
            IterationPolicy::Frame => match self.tags.get(self.cursor) {
                Some(tag) => {
                    self.cursor += 1;
                    Ok(Some(frame_pool(self.document, tag)?))
                }
                None => Ok(None),
            },
            IterationPolicy::Form => {
                if self.cursor > 0 {
                    return Ok(None);
                }
                self.cursor = 1;
                Ok(Some(plain(self.document.forms()?)))
            }
            IterationPolicy::Input => {
                if self.cursor > 0 {
                    return Ok(None);
                }
                self.cursor = 1;
                Ok(Some(input_pool(self.document, self.set)?))
            }
        }
    }
}

impl<'a, D: Document> Iterator for ScanStream<'a, D> {
    type Item = Result<TagHit<D>, LocatorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(hit) = self.batch.next() {
                return Some(Ok(hit));
            }
            match self.next_batch() {
                Ok(Some(batch)) => self.batch = batch.into_iter(),
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Recover the paired content document for a query-produced frame node by
/// walking the positional enumeration and matching on node identity.
pub(crate) fn pair_frame_content<D: Document>(
    document: &D,
    set: &SpecifierSet<D>,
    node: &D::Node,
) -> Result<Option<D>, LocatorError> {
    for hit in ScanStream::new(document, set, IterationPolicy::Frame) {
        let hit = hit?;
        if hit.node.is_same(node) {
            return Ok(hit.content);
        }
    }
    Ok(None)
}

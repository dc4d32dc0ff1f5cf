//! The locator: strategy dispatch, ordinal selection, materialization.
//!
//! A [`Locator`] binds one document, one element kind, and one normalized
//! specifier set. Resolution runs the strategies in a fixed order: the id
//! fast path, then the raw-query shortcut for excluding specifier sets,
//! then the lazy ordinal scan. Frames skip the shortcuts so every frame
//! result carries its paired content document.

use std::rc::Rc;

use dom_port::{Document, StructuralQuery};
use tracing::debug;

use crate::errors::LocatorError;
use crate::kinds::{pair_frame_content, ElementKind, IterationPolicy, ScanStream};
use crate::matcher::{matches_specifiers, type_matches};
use crate::specifier::{Criteria, SpecifierSet, SpecifierValue};
use crate::strategies::{fast_path_by_id, query_candidates};

/// Where a candidate stands relative to the tree.
#[derive(Clone, Debug)]
pub enum Binding<D: Document> {
    /// No node yet; only the specifiers exist.
    Unresolved,
    /// Bound to a concrete node.
    Resolved(D::Node),
}

/// A candidate element: the normalized specifiers that select it, its
/// binding state, and (for frames) the content document it owns.
#[derive(Clone, Debug)]
pub struct Candidate<D: Document> {
    specifiers: Rc<SpecifierSet<D>>,
    binding: Binding<D>,
    content: Option<D>,
}

impl<D: Document> Candidate<D> {
    /// A deferred candidate: carries specifiers, no node.
    pub fn unresolved(specifiers: Rc<SpecifierSet<D>>) -> Self {
        Self {
            specifiers,
            binding: Binding::Unresolved,
            content: None,
        }
    }

    fn resolved(specifiers: Rc<SpecifierSet<D>>, node: D::Node, content: Option<D>) -> Self {
        Self {
            specifiers,
            binding: Binding::Resolved(node),
            content,
        }
    }

    pub fn specifiers(&self) -> &SpecifierSet<D> {
        &self.specifiers
    }

    pub fn binding(&self) -> &Binding<D> {
        &self.binding
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.binding, Binding::Resolved(_))
    }

    /// The bound node, if resolved.
    pub fn node(&self) -> Option<&D::Node> {
        match &self.binding {
            Binding::Resolved(node) => Some(node),
            Binding::Unresolved => None,
        }
    }

    pub fn into_node(self) -> Option<D::Node> {
        match self.binding {
            Binding::Resolved(node) => Some(node),
            Binding::Unresolved => None,
        }
    }

    /// The paired content document, present on resolved frame candidates.
    pub fn content_document(&self) -> Option<&D> {
        self.content.as_ref()
    }

    /// Criteria that select this candidate again.
    ///
    /// A resolved candidate pins its exact node, so a fresh search
    /// short-circuits to it. An unresolved candidate reproduces its
    /// specifiers instead.
    pub fn recheck_criteria(&self) -> Criteria<D> {
        if let Binding::Resolved(node) = &self.binding {
            return Criteria::new().with_node(node.clone());
        }
        let mut criteria = Criteria::new();
        criteria.insert(
            "tag_name",
            SpecifierValue::Tags(self.specifiers.tags().names().to_vec()),
        );
        match self.specifiers.query() {
            // Standalone-query validation guarantees a query set carries
            // the default ordinal and nothing else; re-normalizing the
            // query alone reproduces it.
            Some(StructuralQuery::Css(expression)) => {
                criteria.insert("css", SpecifierValue::Literal(expression.clone()));
            }
            Some(StructuralQuery::XPath(expression)) => {
                criteria.insert("xpath", SpecifierValue::Literal(expression.clone()));
            }
            None => {
                criteria.insert("index", SpecifierValue::Number(self.specifiers.index()));
                if let Some(node) = self.specifiers.node() {
                    criteria.insert("node", SpecifierValue::Node(node.clone()));
                }
                for (key, value) in self.specifiers.criteria() {
                    criteria.insert(key, value.clone());
                }
            }
        }
        criteria
    }
}

/// A single search: one document, one kind, one specifier set.
#[derive(Debug)]
pub struct Locator<'a, D: Document> {
    document: &'a D,
    kind: &'static ElementKind,
    specifiers: Rc<SpecifierSet<D>>,
}

impl<'a, D: Document> Locator<'a, D> {
    /// Normalize `criteria` against `kind` and bind the search to
    /// `document`. Standalone-query validation happens here, before any
    /// tree access.
    pub fn new(
        document: &'a D,
        kind: &'static ElementKind,
        criteria: Criteria<D>,
    ) -> Result<Self, LocatorError> {
        let specifiers = SpecifierSet::normalize(kind.restriction(), criteria)?;
        debug!(kind = kind.name, ?specifiers, "locator bound");
        Ok(Self {
            document,
            kind,
            specifiers: Rc::new(specifiers),
        })
    }

    pub fn kind(&self) -> &'static ElementKind {
        self.kind
    }

    pub fn specifiers(&self) -> &SpecifierSet<D> {
        &self.specifiers
    }

    /// A deferred candidate carrying this search's specifiers.
    pub fn candidate(&self) -> Candidate<D> {
        Candidate::unresolved(Rc::clone(&self.specifiers))
    }

    /// Resolve the search to its first acceptable element, or `Ok(None)`
    /// when nothing in the tree satisfies it.
    ///
    /// Non-frame kinds try the id fast path, then the raw-query shortcut
    /// (which ignores the ordinal), then the ordinal scan. Frame kinds
    /// always select by ordinal over the full match stream, so the result
    /// keeps its paired content document.
    pub fn locate(&self) -> Result<Option<Candidate<D>>, LocatorError> {
        if self.kind.policy != IterationPolicy::Frame {
            if let Some(node) = fast_path_by_id(self.document, &self.specifiers)? {
                return Ok(Some(Candidate::resolved(
                    Rc::clone(&self.specifiers),
                    node,
                    None,
                )));
            }
            if self.specifiers.is_excluding() {
                return self.matches().next().transpose();
            }
        }
        let wanted = self.specifiers.index();
        if wanted < 0 {
            return Ok(None);
        }
        let mut seen = 0i64;
        for candidate in self.matches() {
            let candidate = candidate?;
            if seen == wanted {
                return Ok(Some(candidate));
            }
            seen += 1;
        }
        Ok(None)
    }

    /// Every acceptable element in document order, lazily.
    ///
    /// Excluding specifier sets yield all query results; the ordinal is
    /// not applied here.
    pub fn matches(&self) -> Matches<'_, D> {
        Matches {
            locator: self,
            state: State::Fresh,
        }
    }

    fn excluding_candidates(&self) -> Result<Vec<Candidate<D>>, LocatorError> {
        let nodes = query_candidates(self.document, &self.specifiers)?;
        let mut candidates = Vec::with_capacity(nodes.len());
        for node in nodes {
            let content = if self.kind.policy == IterationPolicy::Frame {
                pair_frame_content(self.document, &self.specifiers, &node)?
            } else {
                None
            };
            candidates.push(Candidate::resolved(
                Rc::clone(&self.specifiers),
                node,
                content,
            ));
        }
        Ok(candidates)
    }
}

enum State<'a, D: Document> {
    Fresh,
    Excluding(std::vec::IntoIter<Candidate<D>>),
    Scanning(ScanStream<'a, D>),
    Done,
}

/// Iterator over acceptable candidates. Errors fuse the iterator.
pub struct Matches<'a, D: Document> {
    locator: &'a Locator<'a, D>,
    state: State<'a, D>,
}

impl<'a, D: Document> Iterator for Matches<'a, D> {
    type Item = Result<Candidate<D>, LocatorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Fresh => {
                    if self.locator.specifiers.is_excluding() {
                        match self.locator.excluding_candidates() {
                            Ok(candidates) => {
                                self.state = State::Excluding(candidates.into_iter());
                            }
                            Err(error) => {
                                self.state = State::Done;
                                return Some(Err(error));
                            }
                        }
                    } else {
                        self.state = State::Scanning(ScanStream::new(
                            self.locator.document,
                            self.locator.specifiers(),
                            self.locator.kind.policy,
                        ));
                    }
                }
                State::Excluding(candidates) => match candidates.next() {
                    Some(candidate) => return Some(Ok(candidate)),
                    None => {
                        self.state = State::Done;
                        return None;
                    }
                },
                State::Scanning(stream) => match stream.next() {
                    None => {
                        self.state = State::Done;
                        return None;
                    }
                    Some(Err(error)) => {
                        self.state = State::Done;
                        return Some(Err(error));
                    }
                    Some(Ok(hit)) => {
                        let specifiers = self.locator.specifiers();
                        if !type_matches(specifiers.tags(), &hit.node) {
                            continue;
                        }
                        match matches_specifiers(specifiers, &hit.node) {
                            Ok(true) => {
                                return Some(Ok(Candidate::resolved(
                                    Rc::clone(&self.locator.specifiers),
                                    hit.node,
                                    hit.content,
                                )))
                            }
                            Ok(false) => continue,
                            Err(error) => {
                                self.state = State::Done;
                                return Some(Err(error));
                            }
                        }
                    }
                },
                State::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use dom_port::{DomNode, MemDocument};
    use serde_json::json;

    fn doc() -> MemDocument {
        MemDocument::from_json(&json!([
            {"tag": "a", "attrs": {"href": "/one", "class": "nav"}, "text": "One"},
            {"tag": "a", "attrs": {"href": "/two", "class": "nav"}, "text": "Two"},
            {"tag": "a", "attrs": {"href": "/three"}, "text": "Three"}
        ]))
        .unwrap()
    }

    fn anchors() -> &'static ElementKind {
        registry::kind("a").unwrap()
    }

    #[test]
    fn locate_picks_the_indexed_match() {
        let doc = doc();
        let locator = Locator::new(
            &doc,
            anchors(),
            Criteria::new().with("class", "nav").with("index", 1),
        )
        .unwrap();
        let candidate = locator.locate().unwrap().unwrap();
        assert_eq!(
            candidate.node().unwrap().attribute("text").unwrap().unwrap(),
            "Two"
        );
    }

    #[test]
    fn matches_streams_all_hits_in_document_order() {
        let doc = doc();
        let locator = Locator::new(&doc, anchors(), Criteria::new()).unwrap();
        let texts: Vec<String> = locator
            .matches()
            .map(|candidate| {
                candidate
                    .unwrap()
                    .node()
                    .unwrap()
                    .attribute("text")
                    .unwrap()
                    .unwrap()
            })
            .collect();
        assert_eq!(texts, ["One", "Two", "Three"]);
    }

    #[test]
    fn exhausted_searches_resolve_to_none() {
        let doc = doc();
        let locator =
            Locator::new(&doc, anchors(), Criteria::new().with("text", "Four")).unwrap();
        assert!(locator.locate().unwrap().is_none());

        let negative =
            Locator::new(&doc, anchors(), Criteria::new().with("index", -1)).unwrap();
        assert!(negative.locate().unwrap().is_none());
    }

    #[test]
    fn candidates_report_their_binding_state() {
        let doc = doc();
        let locator = Locator::new(&doc, anchors(), Criteria::new()).unwrap();
        let deferred = locator.candidate();
        assert!(!deferred.is_resolved());
        assert!(deferred.node().is_none());

        let resolved = locator.locate().unwrap().unwrap();
        assert!(resolved.is_resolved());
        assert!(matches!(resolved.binding(), Binding::Resolved(_)));
        assert!(resolved.content_document().is_none());
    }

    #[test]
    fn recheck_criteria_pin_resolved_candidates() {
        let doc = doc();
        let locator = Locator::new(&doc, anchors(), Criteria::new().with("index", 2)).unwrap();
        let first = locator.locate().unwrap().unwrap();

        let again = Locator::new(&doc, anchors(), first.recheck_criteria()).unwrap();
        let second = again.locate().unwrap().unwrap();
        assert!(second.node().unwrap().is_same(first.node().unwrap()));
    }

    #[test]
    fn recheck_criteria_keep_the_node_pin() {
        let doc = doc();
        let target = doc.elements_by_tag("a").unwrap().remove(2);
        let locator = Locator::new(
            &doc,
            anchors(),
            // The extra criterion matches nothing; only the pin can
            // resolve this search.
            Criteria::new().with_node(target.clone()).with("text", "Nowhere"),
        )
        .unwrap();

        let again = Locator::new(&doc, anchors(), locator.candidate().recheck_criteria()).unwrap();
        assert_eq!(again.specifiers(), locator.specifiers());
        assert!(again.specifiers().is_excluding());
        let candidate = again.locate().unwrap().unwrap();
        assert!(candidate.node().unwrap().is_same(&target));
    }

    #[test]
    fn recheck_criteria_reproduce_queries() {
        let doc = doc();
        let locator =
            Locator::new(&doc, anchors(), Criteria::new().with("css", "a.nav")).unwrap();
        let again = Locator::new(&doc, anchors(), locator.candidate().recheck_criteria()).unwrap();
        assert_eq!(again.specifiers(), locator.specifiers());
        assert_eq!(again.specifiers().index(), 0);
    }

    #[test]
    fn recheck_criteria_reproduce_unresolved_specifiers() {
        let doc = doc();
        let locator = Locator::new(
            &doc,
            anchors(),
            Criteria::new().with("class", "nav").with("index", 1),
        )
        .unwrap();
        let deferred = locator.candidate();
        let again = Locator::new(&doc, anchors(), deferred.recheck_criteria()).unwrap();
        assert_eq!(again.specifiers(), locator.specifiers());
        let candidate = again.locate().unwrap().unwrap();
        assert_eq!(
            candidate.node().unwrap().attribute("text").unwrap().unwrap(),
            "Two"
        );
    }
}

//! In-memory reference backend.
//!
//! A small arena-backed document tree sufficient to exercise the locator:
//! element nodes with attributes, text content, nested frame documents, an
//! id index for fast identity lookup, and injectable faults for testing
//! failure paths. Handles are cheap clones sharing one arena; a handle may
//! be scoped to an element so lookups only see that subtree.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use serde_json::Value;

use crate::api::{Document, DomNode};
use crate::errors::{DomError, DomResult};
use crate::model::StructuralQuery;
use crate::query;

type NodeId = usize;

/// Properties every element answers, even when unset in the markup.
const GLOBAL_PROPERTIES: &[&str] = &["class", "dir", "id", "lang", "style", "text", "title"];

/// Per-tag properties beyond the global set, mirroring how engine object
/// models expose interface members as addressable even when absent from
/// the markup. Anything not listed here and not literally present in the
/// markup reads as unsupported.
const TAG_PROPERTIES: &[(&str, &[&str])] = &[
    ("a", &["href", "name", "rel", "target"]),
    ("area", &["alt", "href"]),
    ("button", &["name", "type", "value"]),
    ("form", &["action", "method", "name", "target"]),
    ("frame", &["name", "src"]),
    ("iframe", &["name", "src"]),
    ("img", &["alt", "name", "src"]),
    ("input", &["alt", "name", "src", "type", "value"]),
    ("map", &["name"]),
    ("meta", &["content", "name"]),
    ("option", &["label", "value"]),
    ("select", &["name", "type", "value"]),
    ("textarea", &["name", "type", "value"]),
];

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: BTreeMap<String, String>,
    frame_content: Option<MemDocument>,
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Default)]
struct Faults {
    operations: HashSet<String>,
    attributes: HashSet<(NodeId, String)>,
}

#[derive(Debug)]
pub(crate) struct Arena {
    nodes: Vec<NodeData>,
    ids: HashMap<String, NodeId>,
    faults: Faults,
}

impl Arena {
    fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
            ids: HashMap::new(),
            faults: Faults::default(),
        }
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub(crate) fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attrs.get(name)).map(String::as_str)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Element children of `id`, in order, skipping text nodes.
    pub(crate) fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|&child| self.tag(child).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pre-order walk of the element nodes strictly below `scope`.
    pub(crate) fn elements_under(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(scope)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                if matches!(node.kind, NodeKind::Element(_)) {
                    out.push(id);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether `node` lies strictly inside the subtree rooted at `scope`.
    pub(crate) fn is_under(&self, node: NodeId, scope: NodeId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(id) = cursor {
            if id == scope {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    fn text_of(&self, id: NodeId) -> String {
        let mut raw = String::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                if let NodeKind::Text(text) = &node.kind {
                    raw.push_str(text);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        collapse_whitespace(&raw)
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tag_supports(tag: &str, property: &str) -> bool {
    if GLOBAL_PROPERTIES.contains(&property) {
        return true;
    }
    TAG_PROPERTIES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, props)| props.contains(&property))
        .unwrap_or(false)
}

fn is_frame_tag(tag: &str) -> bool {
    tag == "frame" || tag == "iframe"
}

/// An in-memory document handle, possibly scoped to a subtree.
#[derive(Debug, Clone)]
pub struct MemDocument {
    arena: Rc<RefCell<Arena>>,
    scope: NodeId,
}

/// An element handle into a [`MemDocument`] arena.
#[derive(Debug, Clone)]
pub struct MemNode {
    arena: Rc<RefCell<Arena>>,
    id: NodeId,
}

impl Default for MemDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            arena: Rc::new(RefCell::new(Arena::new())),
            scope: 0,
        }
    }

    /// Build a document from a JSON fixture.
    ///
    /// The fixture is either a list of children or a single element object:
    /// `{"tag": "div", "attrs": {"id": "x"}, "text": "hi", "children": [..],
    /// "frame": {..}}`. Strings in `children` become text nodes; a `frame`
    /// value becomes the nested document of a frame-bearing element.
    pub fn from_json(fixture: &Value) -> DomResult<Self> {
        let doc = Self::new();
        match fixture {
            Value::Array(children) => {
                for child in children {
                    doc.append_json(None, child)?;
                }
            }
            Value::Object(map) if map.contains_key("tag") => {
                doc.append_json(None, fixture)?;
            }
            Value::Object(map) => {
                for child in map
                    .get("children")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    doc.append_json(None, child)?;
                }
            }
            other => {
                return Err(DomError::backend(format!(
                    "fixture root must be an object or a list, got {other}"
                )))
            }
        }
        Ok(doc)
    }

    fn append_json(&self, parent: Option<&MemNode>, value: &Value) -> DomResult<MemNode> {
        let map = match value {
            Value::Object(map) => map,
            Value::String(text) => {
                let parent = parent.ok_or_else(|| {
                    DomError::backend("text content is not allowed at the document root")
                })?;
                self.append_text(parent, text);
                return Ok(parent.clone());
            }
            other => {
                return Err(DomError::backend(format!(
                    "fixture node must be an object or a string, got {other}"
                )))
            }
        };
        let tag = map
            .get("tag")
            .and_then(Value::as_str)
            .ok_or_else(|| DomError::backend("fixture element is missing a `tag` string"))?;
        let mut attrs: Vec<(String, String)> = Vec::new();
        if let Some(Value::Object(raw)) = map.get("attrs") {
            for (name, value) in raw {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(DomError::backend(format!(
                            "attribute `{name}` must be scalar, got {other}"
                        )))
                    }
                };
                attrs.push((name.clone(), value));
            }
        }
        let borrowed: Vec<(&str, &str)> =
            attrs.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
        let node = self.append_element(parent, tag, &borrowed);
        if let Some(text) = map.get("text").and_then(Value::as_str) {
            self.append_text(&node, text);
        }
        for child in map
            .get("children")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            self.append_json(Some(&node), child)?;
        }
        if let Some(frame) = map.get("frame") {
            self.attach_frame_content(&node, Self::from_json(frame)?)?;
        }
        Ok(node)
    }

    /// Append an element under `parent` (the document root when `None`).
    /// Frame-bearing tags get an empty nested document immediately so the
    /// frame collection always pairs one document per frame element.
    pub fn append_element(
        &self,
        parent: Option<&MemNode>,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> MemNode {
        let parent_id = parent.map(|p| p.id).unwrap_or(self.scope);
        let tag = tag.to_ascii_lowercase();
        let frame_content = is_frame_tag(&tag).then(MemDocument::new);
        let mut arena = self.arena.borrow_mut();
        let id = arena.nodes.len();
        let attrs: BTreeMap<String, String> = attrs
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), (*value).to_string()))
            .collect();
        if let Some(id_attr) = attrs.get("id") {
            arena.ids.entry(id_attr.clone()).or_insert(id);
        }
        arena.nodes.push(NodeData {
            parent: Some(parent_id),
            children: Vec::new(),
            kind: NodeKind::Element(ElementData {
                tag,
                attrs,
                frame_content,
            }),
        });
        if let Some(parent) = arena.nodes.get_mut(parent_id) {
            parent.children.push(id);
        }
        drop(arena);
        self.node(id)
    }

    /// Append a text node under `parent`.
    pub fn append_text(&self, parent: &MemNode, text: &str) {
        let mut arena = self.arena.borrow_mut();
        let id = arena.nodes.len();
        arena.nodes.push(NodeData {
            parent: Some(parent.id),
            children: Vec::new(),
            kind: NodeKind::Text(text.to_string()),
        });
        if let Some(parent) = arena.nodes.get_mut(parent.id) {
            parent.children.push(id);
        }
    }

    /// Replace the nested document of a frame-bearing element.
    pub fn attach_frame_content(&self, frame: &MemNode, content: MemDocument) -> DomResult<()> {
        let mut arena = self.arena.borrow_mut();
        match arena.nodes.get_mut(frame.id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) if is_frame_tag(&data.tag) => {
                data.frame_content = Some(content);
                Ok(())
            }
            _ => Err(DomError::backend(
                "frame content can only be attached to frame or iframe elements",
            )),
        }
    }

    /// Make the named document-level operation fail until further notice.
    pub fn poison_operation(&self, operation: &str) {
        self.arena
            .borrow_mut()
            .faults
            .operations
            .insert(operation.to_string());
    }

    /// Make reads of one attribute on one element fail.
    pub fn poison_attribute(&self, node: &MemNode, name: &str) {
        self.arena
            .borrow_mut()
            .faults
            .attributes
            .insert((node.id, name.to_ascii_lowercase()));
    }

    fn check_fault(&self, operation: &str) -> DomResult<()> {
        if self.arena.borrow().faults.operations.contains(operation) {
            return Err(DomError::backend(format!("injected fault: {operation}")));
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> MemNode {
        MemNode {
            arena: Rc::clone(&self.arena),
            id,
        }
    }

    fn collect<F>(&self, keep: F) -> Vec<MemNode>
    where
        F: Fn(&Arena, NodeId) -> bool,
    {
        let ids = {
            let arena = self.arena.borrow();
            arena
                .elements_under(self.scope)
                .into_iter()
                .filter(|&id| keep(&arena, id))
                .collect::<Vec<_>>()
        };
        ids.into_iter().map(|id| self.node(id)).collect()
    }
}

impl MemNode {
    /// A document handle scoped to this element's subtree.
    pub fn scope(&self) -> MemDocument {
        MemDocument {
            arena: Rc::clone(&self.arena),
            scope: self.id,
        }
    }
}

impl Document for MemDocument {
    type Node = MemNode;

    fn element_by_id(&self, id: &str) -> DomResult<Option<MemNode>> {
        self.check_fault("element_by_id")?;
        let found = {
            let arena = self.arena.borrow();
            match arena
                .ids
                .get(id)
                .copied()
                .filter(|&node| arena.is_under(node, self.scope))
            {
                Some(node) => Some(node),
                // Legacy engines also answer id lookups with name-keyed
                // matches; callers confirm the id themselves.
                None => arena
                    .elements_under(self.scope)
                    .into_iter()
                    .find(|&node| arena.attr(node, "name") == Some(id)),
            }
        };
        Ok(found.map(|id| self.node(id)))
    }

    fn elements_by_name(&self, name: &str) -> DomResult<Vec<MemNode>> {
        self.check_fault("elements_by_name")?;
        Ok(self.collect(|arena, id| arena.attr(id, "name") == Some(name)))
    }

    fn elements_by_tag(&self, tag: &str) -> DomResult<Vec<MemNode>> {
        self.check_fault("elements_by_tag")?;
        let wanted = tag.to_ascii_lowercase();
        Ok(self.collect(|arena, id| wanted == "*" || arena.tag(id) == Some(wanted.as_str())))
    }

    fn evaluate(&self, query: &StructuralQuery) -> DomResult<Vec<MemNode>> {
        self.check_fault("evaluate")?;
        tracing::debug!(dialect = query.dialect(), expression = query.expression(), "evaluate");
        let ids = {
            let arena = self.arena.borrow();
            match query {
                StructuralQuery::Css(expression) => {
                    query::evaluate_css(&arena, self.scope, expression)?
                }
                StructuralQuery::XPath(expression) => {
                    query::evaluate_xpath(&arena, self.scope, expression)?
                }
            }
        };
        Ok(ids.into_iter().map(|id| self.node(id)).collect())
    }

    fn forms(&self) -> DomResult<Vec<MemNode>> {
        self.check_fault("forms")?;
        Ok(self.collect(|arena, id| arena.tag(id) == Some("form")))
    }

    fn frames(&self) -> DomResult<Vec<MemDocument>> {
        self.check_fault("frames")?;
        let arena = self.arena.borrow();
        Ok(arena
            .elements_under(self.scope)
            .into_iter()
            .filter_map(|id| arena.element(id))
            .filter(|element| is_frame_tag(&element.tag))
            .filter_map(|element| element.frame_content.clone())
            .collect())
    }

    fn all_elements(&self) -> DomResult<Vec<MemNode>> {
        self.check_fault("all_elements")?;
        Ok(self.collect(|_, _| true))
    }
}

impl DomNode for MemNode {
    fn tag_name(&self) -> DomResult<String> {
        let arena = self.arena.borrow();
        arena
            .tag(self.id)
            .map(str::to_string)
            .ok_or_else(|| DomError::detached("handle does not refer to an element"))
    }

    fn attribute(&self, name: &str) -> DomResult<Option<String>> {
        let key = name.to_ascii_lowercase();
        let arena = self.arena.borrow();
        if arena.faults.attributes.contains(&(self.id, key.clone())) {
            return Err(DomError::backend(format!("injected fault: attribute {key}")));
        }
        let element = arena
            .element(self.id)
            .ok_or_else(|| DomError::detached("handle does not refer to an element"))?;
        if key == "text" {
            return Ok(Some(arena.text_of(self.id)));
        }
        if let Some(value) = element.attrs.get(&key) {
            return Ok(Some(value.clone()));
        }
        // An option's value falls back to its text, as in the live object
        // model.
        if key == "value" && element.tag == "option" {
            return Ok(Some(arena.text_of(self.id)));
        }
        if tag_supports(&element.tag, &key) {
            return Ok(Some(String::new()));
        }
        Ok(None)
    }

    fn declared_type(&self) -> DomResult<Option<String>> {
        let arena = self.arena.borrow();
        if arena.faults.attributes.contains(&(self.id, "type".to_string())) {
            return Err(DomError::backend("injected fault: attribute type"));
        }
        let element = arena
            .element(self.id)
            .ok_or_else(|| DomError::detached("handle does not refer to an element"))?;
        if let Some(explicit) = element.attrs.get("type") {
            return Ok(Some(explicit.clone()));
        }
        Ok(match element.tag.as_str() {
            "input" => Some("text".to_string()),
            "button" => Some("submit".to_string()),
            "textarea" => Some("textarea".to_string()),
            "select" => Some(
                if element.attrs.contains_key("multiple") {
                    "select-multiple"
                } else {
                    "select-one"
                }
                .to_string(),
            ),
            _ => None,
        })
    }

    fn descendant_elements(&self) -> DomResult<Vec<MemNode>> {
        let ids = self.arena.borrow().elements_under(self.id);
        Ok(ids
            .into_iter()
            .map(|id| MemNode {
                arena: Rc::clone(&self.arena),
                id,
            })
            .collect())
    }

    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena) && self.id == other.id
    }
}

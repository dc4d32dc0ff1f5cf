//! Specifier normalization and validation.
//!
//! Callers describe the element they want as a small map of criteria.
//! Before any strategy runs, the map is normalized into a [`SpecifierSet`]:
//! alias keys collapse to canonical ones, the ordinal is split out with a
//! default of zero, tag-name criteria replace the kind's vocabulary, raw
//! queries and node handles move to their own slots, and standalone-query
//! validation happens. Everything downstream works on the normalized form
//! only.

use std::collections::BTreeMap;
use std::fmt;

use dom_port::{Document, DomNode, StructuralQuery};
use regex::Regex;

use crate::errors::LocatorError;

/// Lenient integer coercion: optional sign and leading digits, zero for
/// anything else.
pub(crate) fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return 0;
    }
    trimmed[..end].parse().unwrap_or(0)
}

/// The value side of one criterion.
#[derive(Clone, Debug)]
pub enum SpecifierValue<D: Document> {
    /// Matches by exact string equality.
    Literal(String),
    /// Matches when the pattern is found anywhere in the attribute.
    Pattern(Regex),
    /// Matches when the attribute's leading integer equals the number.
    Number(i64),
    /// A raw node handle; consumed during normalization, never matched.
    Node(D::Node),
    /// A tag-name list; consumed during normalization, never matched.
    Tags(Vec<String>),
}

impl<D: Document> SpecifierValue<D> {
    pub fn pattern(regex: Regex) -> Self {
        Self::Pattern(regex)
    }

    pub fn node(node: D::Node) -> Self {
        Self::Node(node)
    }

    /// Whether `candidate` satisfies this value.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Literal(expected) => expected == candidate,
            Self::Pattern(regex) => regex.is_match(candidate),
            Self::Number(expected) => *expected == leading_integer(candidate),
            // Extracted during normalization; nothing to match against.
            Self::Node(_) | Self::Tags(_) => false,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    fn into_text(self) -> String {
        self.to_string()
    }
}

impl<D: Document> fmt::Display for SpecifierValue<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(value),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            Self::Number(value) => write!(f, "{value}"),
            Self::Node(_) => f.write_str("<node handle>"),
            Self::Tags(tags) => f.write_str(&tags.join(", ")),
        }
    }
}

impl<D: Document> PartialEq for SpecifierValue<D> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a.is_same(b),
            (Self::Tags(a), Self::Tags(b)) => a == b,
            _ => false,
        }
    }
}

impl<D: Document> From<&str> for SpecifierValue<D> {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl<D: Document> From<String> for SpecifierValue<D> {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl<D: Document> From<i64> for SpecifierValue<D> {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl<D: Document> From<Regex> for SpecifierValue<D> {
    fn from(value: Regex) -> Self {
        Self::Pattern(value)
    }
}

impl<D: Document> From<Vec<String>> for SpecifierValue<D> {
    fn from(value: Vec<String>) -> Self {
        Self::Tags(value)
    }
}

impl<D: Document> From<Vec<&str>> for SpecifierValue<D> {
    fn from(value: Vec<&str>) -> Self {
        Self::Tags(value.into_iter().map(str::to_string).collect())
    }
}

/// The set of tag names a search accepts, or the wildcard.
///
/// Restrictions are lowercased on construction; any set containing `*`
/// collapses to the bare wildcard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRestriction(Vec<String>);

impl TagRestriction {
    pub fn any() -> Self {
        Self(vec!["*".to_string()])
    }

    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags
            .into_iter()
            .map(|tag| tag.into().to_ascii_lowercase())
            .collect();
        if tags.is_empty() || tags.iter().any(|tag| tag == "*") {
            return Self::any();
        }
        Self(tags)
    }

    pub fn is_any(&self) -> bool {
        self.0.first().map(|tag| tag == "*").unwrap_or(false)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for TagRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Raw criteria as supplied by callers, in insertion order.
///
/// Later entries for the same key win, as in the map literals this models.
#[derive(Clone, Debug)]
pub struct Criteria<D: Document> {
    entries: Vec<(String, SpecifierValue<D>)>,
}

impl<D: Document> Default for Criteria<D> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<D: Document> Criteria<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<SpecifierValue<D>>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Pin the search to one raw node handle.
    pub fn with_node(mut self, node: D::Node) -> Self {
        self.insert("node", SpecifierValue::Node(node));
        self
    }

    pub fn insert(&mut self, key: &str, value: SpecifierValue<D>) {
        self.entries.push((key.to_string(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

/// A normalized specifier set: what the strategies actually consume.
#[derive(Clone, Debug)]
pub struct SpecifierSet<D: Document> {
    index: i64,
    tags: TagRestriction,
    query: Option<StructuralQuery>,
    node: Option<D::Node>,
    criteria: BTreeMap<String, SpecifierValue<D>>,
}

impl<D: Document> SpecifierSet<D> {
    /// Normalize `raw` against a kind's tag vocabulary.
    ///
    /// Standalone-query validation runs first, on the raw keys, before any
    /// tree access: a `css` or `xpath` criterion tolerates only a
    /// `tag_name` alongside it.
    pub fn normalize(
        default_tags: TagRestriction,
        raw: Criteria<D>,
    ) -> Result<Self, LocatorError> {
        for query_key in ["css", "xpath"] {
            if !raw.keys().any(|key| key == query_key) {
                continue;
            }
            let extras: Vec<&str> = raw
                .keys()
                .filter(|key| *key != query_key && *key != "tag_name")
                .collect();
            if !extras.is_empty() {
                return Err(LocatorError::AmbiguousSpecifier(format!(
                    "{query_key} must be the only specifier apart from a tag restriction, got: {}",
                    extras.join(", ")
                )));
            }
        }

        let mut index = 0i64;
        let mut tags = None;
        let mut query = None;
        let mut node = None;
        let mut criteria = BTreeMap::new();
        for (key, value) in raw.entries {
            match key.as_str() {
                "index" => {
                    index = match value {
                        SpecifierValue::Number(n) => n,
                        SpecifierValue::Literal(text) => leading_integer(&text),
                        _ => 0,
                    }
                }
                "tag_name" => {
                    tags = Some(match value {
                        SpecifierValue::Tags(list) => TagRestriction::new(list),
                        other => TagRestriction::new([other.into_text()]),
                    })
                }
                "css" => query = Some(StructuralQuery::css(value.into_text())),
                "xpath" => query = Some(StructuralQuery::xpath(value.into_text())),
                "node" => match value {
                    SpecifierValue::Node(handle) => node = Some(handle),
                    other => {
                        criteria.insert(key, other);
                    }
                },
                "url" => {
                    criteria.insert("href".to_string(), value);
                }
                "class" => {
                    criteria.insert("class_name".to_string(), value);
                }
                "caption" => {
                    criteria.insert("text".to_string(), value);
                }
                "method" => {
                    criteria.insert("form_method".to_string(), value);
                }
                "value" => {
                    let value = match value {
                        SpecifierValue::Pattern(regex) => SpecifierValue::Pattern(regex),
                        other => SpecifierValue::Literal(other.into_text()),
                    };
                    criteria.insert(key, value);
                }
                _ => {
                    criteria.insert(key, value);
                }
            }
        }
        Ok(Self {
            index,
            tags: tags.unwrap_or(default_tags),
            query,
            node,
            criteria,
        })
    }

    /// The 0-based ordinal, defaulted to zero during normalization.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn tags(&self) -> &TagRestriction {
        &self.tags
    }

    pub fn query(&self) -> Option<&StructuralQuery> {
        self.query.as_ref()
    }

    pub fn node(&self) -> Option<&D::Node> {
        self.node.as_ref()
    }

    /// Whether this set bypasses criterion matching entirely (a raw query
    /// or a pinned node).
    pub fn is_excluding(&self) -> bool {
        self.query.is_some() || self.node.is_some()
    }

    /// The ordinary criteria, in stable key order.
    pub fn criteria(&self) -> impl Iterator<Item = (&str, &SpecifierValue<D>)> {
        self.criteria
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn criterion(&self, key: &str) -> Option<&SpecifierValue<D>> {
        self.criteria.get(key)
    }

    /// The criterion's literal string value, if it has one.
    pub fn literal(&self, key: &str) -> Option<&str> {
        self.criterion(key).and_then(SpecifierValue::as_literal)
    }
}

impl<D: Document> PartialEq for SpecifierSet<D> {
    fn eq(&self, other: &Self) -> bool {
        let nodes_agree = match (&self.node, &other.node) {
            (None, None) => true,
            (Some(a), Some(b)) => a.is_same(b),
            _ => false,
        };
        nodes_agree
            && self.index == other.index
            && self.tags == other.tags
            && self.query == other.query
            && self.criteria == other.criteria
    }
}

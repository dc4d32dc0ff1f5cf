//! Structural query evaluation for the in-memory backend.
//!
//! Both dialects are deliberately small. Selectors support tag, `#id`,
//! `.class`, `[attr]`, `[attr=value]`, compounds, descendant and child
//! combinators, and comma groups. Paths support `/` and `//` axes, `*`,
//! `[@attr]`, `[@attr='value']` and 1-based `[n]` position predicates.
//! Anything else reports [`DomError::QueryUnsupported`] instead of
//! guessing.

use std::collections::HashSet;

use crate::errors::{DomError, DomResult};
use crate::memory::Arena;

type NodeId = usize;

fn unsupported(dialect: &str, expression: &str, reason: &str) -> DomError {
    DomError::QueryUnsupported(format!("{dialect} `{expression}`: {reason}"))
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '-' || c == '_') {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    /// Reads up to the closing quote; the opening quote is already consumed.
    fn quoted(&mut self, quote: char) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Some(value);
            }
            self.pos += 1;
        }
        None
    }

    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Selector dialect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

#[derive(Debug)]
struct Step {
    combinator: Combinator,
    compound: Compound,
}

fn parse_selector_list(expression: &str) -> DomResult<Vec<Vec<Step>>> {
    let mut scanner = Scanner::new(expression);
    let mut groups = Vec::new();
    loop {
        let chain = parse_chain(&mut scanner, expression)?;
        if chain.is_empty() {
            return Err(unsupported("css", expression, "empty selector"));
        }
        groups.push(chain);
        scanner.skip_whitespace();
        match scanner.bump() {
            Some(',') => continue,
            None => break,
            Some(c) => return Err(unsupported("css", expression, &format!("unexpected `{c}`"))),
        }
    }
    Ok(groups)
}

fn parse_chain(scanner: &mut Scanner, expression: &str) -> DomResult<Vec<Step>> {
    let mut steps = Vec::new();
    loop {
        scanner.skip_whitespace();
        let combinator = if scanner.eat('>') {
            scanner.skip_whitespace();
            Combinator::Child
        } else {
            Combinator::Descendant
        };
        match scanner.peek() {
            None | Some(',') if combinator == Combinator::Descendant => break,
            None | Some(',') => {
                return Err(unsupported("css", expression, "dangling `>`"));
            }
            _ => {}
        }
        steps.push(Step {
            combinator,
            compound: parse_compound(scanner, expression)?,
        });
    }
    Ok(steps)
}

fn parse_compound(scanner: &mut Scanner, expression: &str) -> DomResult<Compound> {
    let mut compound = Compound::default();
    let mut any = false;
    if scanner.eat('*') {
        any = true;
    } else if let Some(tag) = scanner.ident() {
        compound.tag = Some(tag.to_ascii_lowercase());
        any = true;
    }
    loop {
        match scanner.peek() {
            Some('#') => {
                scanner.bump();
                let id = scanner
                    .ident()
                    .ok_or_else(|| unsupported("css", expression, "`#` without a name"))?;
                compound.id = Some(id);
            }
            Some('.') => {
                scanner.bump();
                let class = scanner
                    .ident()
                    .ok_or_else(|| unsupported("css", expression, "`.` without a name"))?;
                compound.classes.push(class);
            }
            Some('[') => {
                scanner.bump();
                scanner.skip_whitespace();
                let name = scanner
                    .ident()
                    .ok_or_else(|| unsupported("css", expression, "`[` without a name"))?
                    .to_ascii_lowercase();
                scanner.skip_whitespace();
                let value = if scanner.eat('=') {
                    scanner.skip_whitespace();
                    let value = match scanner.peek() {
                        Some(quote @ ('\'' | '"')) => {
                            scanner.bump();
                            scanner.quoted(quote).ok_or_else(|| {
                                unsupported("css", expression, "unterminated string")
                            })?
                        }
                        _ => scanner
                            .ident()
                            .ok_or_else(|| unsupported("css", expression, "missing value"))?,
                    };
                    Some(value)
                } else {
                    None
                };
                scanner.skip_whitespace();
                if !scanner.eat(']') {
                    return Err(unsupported("css", expression, "missing `]`"));
                }
                compound.attrs.push((name, value));
            }
            _ => break,
        }
        any = true;
    }
    if !any {
        let found = scanner.peek().map(String::from).unwrap_or_default();
        return Err(unsupported(
            "css",
            expression,
            &format!("unsupported construct `{found}`"),
        ));
    }
    Ok(compound)
}

fn compound_matches(arena: &Arena, id: NodeId, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag {
        if arena.tag(id) != Some(tag.as_str()) {
            return false;
        }
    }
    if let Some(wanted) = &compound.id {
        if arena.attr(id, "id") != Some(wanted.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let tokens: Vec<&str> = match arena.attr(id, "class") {
            Some(class) => class.split_whitespace().collect(),
            None => return false,
        };
        if !compound.classes.iter().all(|c| tokens.contains(&c.as_str())) {
            return false;
        }
    }
    compound
        .attrs
        .iter()
        .all(|(name, expected)| match (arena.attr(id, name), expected) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
}

fn chain_matches(arena: &Arena, scope: NodeId, steps: &[Step], id: NodeId) -> bool {
    let Some((last, rest)) = steps.split_last() else {
        return false;
    };
    if !compound_matches(arena, id, &last.compound) {
        return false;
    }
    match (last.combinator, rest.is_empty()) {
        (Combinator::Descendant, true) => true,
        (Combinator::Child, true) => arena.parent(id) == Some(scope),
        (Combinator::Child, false) => match arena.parent(id) {
            Some(parent) if arena.is_under(parent, scope) => {
                chain_matches(arena, scope, rest, parent)
            }
            _ => false,
        },
        (Combinator::Descendant, false) => {
            let mut cursor = arena.parent(id);
            while let Some(ancestor) = cursor {
                if !arena.is_under(ancestor, scope) {
                    break;
                }
                if chain_matches(arena, scope, rest, ancestor) {
                    return true;
                }
                cursor = arena.parent(ancestor);
            }
            false
        }
    }
}

pub(crate) fn evaluate_css(
    arena: &Arena,
    scope: NodeId,
    expression: &str,
) -> DomResult<Vec<NodeId>> {
    let groups = parse_selector_list(expression)?;
    Ok(arena
        .elements_under(scope)
        .into_iter()
        .filter(|&id| groups.iter().any(|steps| chain_matches(arena, scope, steps, id)))
        .collect())
}

// ---------------------------------------------------------------------------
// Path dialect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug)]
enum Predicate {
    AttrEq(String, String),
    AttrPresent(String),
    Position(usize),
}

#[derive(Debug)]
struct PathStep {
    axis: Axis,
    tag: Option<String>,
    predicates: Vec<Predicate>,
}

fn parse_path(expression: &str) -> DomResult<Vec<PathStep>> {
    let mut scanner = Scanner::new(expression);
    scanner.skip_whitespace();
    if !scanner.eat('/') {
        return Err(unsupported("xpath", expression, "path must start with `/`"));
    }
    let mut steps = Vec::new();
    loop {
        let axis = if scanner.eat('/') {
            Axis::Descendant
        } else {
            Axis::Child
        };
        let tag = if scanner.eat('*') {
            None
        } else {
            let name = scanner
                .ident()
                .ok_or_else(|| unsupported("xpath", expression, "missing step name"))?;
            Some(name.to_ascii_lowercase())
        };
        let mut predicates = Vec::new();
        while scanner.eat('[') {
            predicates.push(parse_predicate(&mut scanner, expression)?);
        }
        steps.push(PathStep {
            axis,
            tag,
            predicates,
        });
        scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }
        if !scanner.eat('/') {
            let found = scanner.peek().map(String::from).unwrap_or_default();
            return Err(unsupported(
                "xpath",
                expression,
                &format!("unsupported construct `{found}`"),
            ));
        }
    }
    Ok(steps)
}

fn parse_predicate(scanner: &mut Scanner, expression: &str) -> DomResult<Predicate> {
    scanner.skip_whitespace();
    let predicate = if scanner.eat('@') {
        let name = scanner
            .ident()
            .ok_or_else(|| unsupported("xpath", expression, "`@` without a name"))?
            .to_ascii_lowercase();
        scanner.skip_whitespace();
        if scanner.eat('=') {
            scanner.skip_whitespace();
            let quote = match scanner.bump() {
                Some(q @ ('\'' | '"')) => q,
                _ => return Err(unsupported("xpath", expression, "expected quoted value")),
            };
            let value = scanner
                .quoted(quote)
                .ok_or_else(|| unsupported("xpath", expression, "unterminated string"))?;
            Predicate::AttrEq(name, value)
        } else {
            Predicate::AttrPresent(name)
        }
    } else if let Some(position) = scanner.number() {
        if position == 0 {
            return Err(unsupported("xpath", expression, "positions are 1-based"));
        }
        Predicate::Position(position)
    } else {
        return Err(unsupported("xpath", expression, "unsupported predicate"));
    };
    scanner.skip_whitespace();
    if !scanner.eat(']') {
        return Err(unsupported("xpath", expression, "missing `]`"));
    }
    Ok(predicate)
}

fn step_filter(arena: &Arena, step: &PathStep, pool: Vec<NodeId>) -> Vec<NodeId> {
    let mut matched: Vec<NodeId> = pool
        .into_iter()
        .filter(|&id| match &step.tag {
            Some(tag) => arena.tag(id) == Some(tag.as_str()),
            None => true,
        })
        .filter(|&id| {
            step.predicates.iter().all(|predicate| match predicate {
                Predicate::AttrEq(name, value) => arena.attr(id, name) == Some(value.as_str()),
                Predicate::AttrPresent(name) => arena.attr(id, name).is_some(),
                Predicate::Position(_) => true,
            })
        })
        .collect();
    for predicate in &step.predicates {
        if let Predicate::Position(position) = predicate {
            matched = matched
                .get(*position - 1)
                .map(|&id| vec![id])
                .unwrap_or_default();
        }
    }
    matched
}

pub(crate) fn evaluate_xpath(
    arena: &Arena,
    scope: NodeId,
    expression: &str,
) -> DomResult<Vec<NodeId>> {
    let steps = parse_path(expression)?;
    let mut contexts: Vec<NodeId> = vec![scope];
    for step in &steps {
        let mut next = Vec::new();
        let mut seen = HashSet::new();
        for &context in &contexts {
            let pool = match step.axis {
                Axis::Child => arena.element_children(context),
                Axis::Descendant => arena.elements_under(context),
            };
            for id in step_filter(arena, step, pool) {
                if seen.insert(id) {
                    next.push(id);
                }
            }
        }
        contexts = next;
    }
    // Overlapping descendant contexts can interleave; settle on document
    // order, which is what callers are promised.
    let order: std::collections::HashMap<NodeId, usize> = arena
        .elements_under(scope)
        .into_iter()
        .enumerate()
        .map(|(position, id)| (id, position))
        .collect();
    contexts.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
    Ok(contexts)
}

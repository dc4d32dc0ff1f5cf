//! Criterion matching against candidate nodes.

use dom_port::{Document, DomNode};

use crate::errors::LocatorError;
use crate::specifier::{SpecifierSet, TagRestriction};

/// The port property a criterion key reads.
///
/// Most keys are their own property; the two renames exist because the
/// canonical criterion names differ from what trees call the attribute.
fn property_for(key: &str) -> &str {
    match key {
        "class_name" => "class",
        "form_method" => "method",
        other => other,
    }
}

/// Conjunctive match of every ordinary criterion against `node`.
///
/// Excluding specifier sets match trivially: the raw query or pinned node
/// already encodes the conditions. A criterion whose attribute the element
/// cannot answer at all is a hard error naming the key, the value, and the
/// tag vocabulary; a supported-but-different attribute is just a
/// non-match.
pub(crate) fn matches_specifiers<D: Document>(
    set: &SpecifierSet<D>,
    node: &D::Node,
) -> Result<bool, LocatorError> {
    if set.is_excluding() {
        return Ok(true);
    }
    for (key, value) in set.criteria() {
        let actual = match node.attribute(property_for(key))? {
            Some(actual) => actual,
            None => return Err(LocatorError::unsupported(key, value, set.tags())),
        };
        let hit = if key == "class_name" {
            // Class criteria match any single whitespace-separated token.
            actual.split_whitespace().any(|token| value.matches(token))
        } else {
            value.matches(&actual)
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Tag acceptance for one candidate: wildcard, tag-name membership, or
/// declared-type membership. Probe failures reject the candidate rather
/// than failing the search.
pub(crate) fn type_matches<N: DomNode>(tags: &TagRestriction, node: &N) -> bool {
    if tags.is_any() {
        return true;
    }
    let tag = match node.tag_name() {
        Ok(tag) => tag.to_ascii_lowercase(),
        Err(_) => return false,
    };
    if tags.contains(&tag) {
        return true;
    }
    match node.declared_type() {
        Ok(Some(declared)) => tags.contains(&declared.to_ascii_lowercase()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specifier::{Criteria, SpecifierSet};
    use dom_port::MemDocument;
    use regex::Regex;
    use serde_json::json;

    fn doc() -> MemDocument {
        MemDocument::from_json(&json!([
            {"tag": "a", "attrs": {"href": "/home", "class": "nav active"}, "text": "Home"},
            {"tag": "input", "attrs": {"type": "submit", "name": "go", "value": "Search"}}
        ]))
        .unwrap()
    }

    fn normalized(criteria: Criteria<MemDocument>) -> SpecifierSet<MemDocument> {
        SpecifierSet::normalize(TagRestriction::any(), criteria).unwrap()
    }

    #[test]
    fn class_criteria_match_single_tokens() {
        let doc = doc();
        let anchor = &doc.elements_by_tag("a").unwrap()[0];

        let by_token = normalized(Criteria::new().with("class", "active"));
        assert!(matches_specifiers(&by_token, anchor).unwrap());

        // No token equals the whole attribute value.
        let whole = normalized(Criteria::new().with("class", "nav active"));
        assert!(!matches_specifiers(&whole, anchor).unwrap());

        let by_pattern = normalized(Criteria::new().with("class", Regex::new("^act").unwrap()));
        assert!(matches_specifiers(&by_pattern, anchor).unwrap());
    }

    #[test]
    fn all_criteria_must_agree() {
        let doc = doc();
        let anchor = &doc.elements_by_tag("a").unwrap()[0];
        let agreeing = normalized(
            Criteria::new()
                .with("text", "Home")
                .with("href", Regex::new("home").unwrap()),
        );
        assert!(matches_specifiers(&agreeing, anchor).unwrap());

        let disagreeing = normalized(
            Criteria::new().with("text", "Home").with("href", "/away"),
        );
        assert!(!matches_specifiers(&disagreeing, anchor).unwrap());
    }

    #[test]
    fn unsupported_attributes_are_hard_errors() {
        let doc = doc();
        let anchor = &doc.elements_by_tag("a").unwrap()[0];
        let set: SpecifierSet<MemDocument> = SpecifierSet::normalize(
            TagRestriction::new(["a"]),
            Criteria::new().with("onclick_madness", "boom"),
        )
        .unwrap();
        let err = matches_specifiers(&set, anchor).unwrap_err();
        match &err {
            LocatorError::UnsupportedCriterion { key, value, tags } => {
                assert_eq!(key, "onclick_madness");
                assert_eq!(value, "boom");
                assert_eq!(tags, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("onclick_madness"));
    }

    #[test]
    fn supported_but_empty_attributes_are_plain_non_matches() {
        let doc = doc();
        let anchor = &doc.elements_by_tag("a").unwrap()[0];
        let set = normalized(Criteria::new().with("name", "unset"));
        assert!(!matches_specifiers(&set, anchor).unwrap());
    }

    #[test]
    fn excluding_sets_match_trivially() {
        let doc = doc();
        let anchor = &doc.elements_by_tag("a").unwrap()[0];
        let set = normalized(Criteria::new().with("css", "a.missing"));
        assert!(matches_specifiers(&set, anchor).unwrap());
    }

    #[test]
    fn tree_failures_propagate_from_matching() {
        let doc = doc();
        let anchor = doc.elements_by_tag("a").unwrap().remove(0);
        doc.poison_attribute(&anchor, "href");
        let set = normalized(Criteria::new().with("href", "/home"));
        assert!(matches!(
            matches_specifiers(&set, &anchor).unwrap_err(),
            LocatorError::Dom(_)
        ));
    }

    #[test]
    fn type_acceptance_by_wildcard_tag_and_declared_type() {
        let doc = doc();
        let input = &doc.elements_by_tag("input").unwrap()[0];

        assert!(type_matches(&TagRestriction::any(), input));
        assert!(type_matches(&TagRestriction::new(["input"]), input));
        // Not the tag, but the declared type is in the vocabulary.
        assert!(type_matches(
            &TagRestriction::new(["button", "submit", "image", "reset"]),
            input
        ));
        assert!(!type_matches(&TagRestriction::new(["checkbox"]), input));
    }

    #[test]
    fn failed_type_probe_rejects_instead_of_erroring() {
        let doc = doc();
        let input = doc.elements_by_tag("input").unwrap().remove(0);
        doc.poison_attribute(&input, "type");
        assert!(!type_matches(&TagRestriction::new(["submit"]), &input));
        // Tag-name membership does not need the type probe.
        assert!(type_matches(&TagRestriction::new(["input"]), &input));
    }
}

//! Input-family and form resolution: type vocabularies, the name index,
//! and the form collection.

use dom_port::{Document, DomNode, MemDocument};
use element_locator::{kind, Criteria, Locator};
use serde_json::json;

fn page() -> MemDocument {
    MemDocument::from_json(&json!([
        {"tag": "form", "attrs": {"name": "search", "method": "get", "action": "/find"}, "children": [
            {"tag": "input", "attrs": {"name": "q"}},
            {"tag": "input", "attrs": {"name": "lang", "type": "hidden", "value": "en"}},
            {"tag": "input", "attrs": {"name": "go", "type": "submit", "value": "Search"}}
        ]},
        {"tag": "form", "attrs": {"name": "login", "method": "post"}, "children": [
            {"tag": "input", "attrs": {"name": "user", "type": "text"}},
            {"tag": "input", "attrs": {"name": "pass", "type": "password"}},
            {"tag": "button", "attrs": {"name": "enter"}, "text": "Sign in"}
        ]}
    ]))
    .unwrap()
}

fn name_of(candidate: &element_locator::Candidate<MemDocument>) -> String {
    candidate
        .node()
        .unwrap()
        .attribute("name")
        .unwrap()
        .unwrap()
}

#[test]
fn buttons_match_any_of_their_type_vocabulary() {
    let doc = page();
    // An <input type=submit> and a <button> both count as buttons.
    let submit = Locator::new(
        &doc,
        kind("button").unwrap(),
        Criteria::new().with("value", "Search"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(name_of(&submit), "go");

    let real_button = Locator::new(
        &doc,
        kind("button").unwrap(),
        Criteria::new().with("name", "enter"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(
        real_button.node().unwrap().tag_name().unwrap(),
        "button"
    );
}

#[test]
fn text_fields_cover_untyped_inputs_and_passwords() {
    let doc = page();
    // No explicit type means the engine default, which is a text field.
    let untyped = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", "q"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(name_of(&untyped), "q");

    let password = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", "pass"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(
        password.node().unwrap().declared_type().unwrap().unwrap(),
        "password"
    );

    // A submit input is not a text field even under the same name scan.
    let not_text = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", "go"),
    )
    .unwrap();
    assert!(not_text.locate().unwrap().is_none());
}

#[test]
fn hidden_fields_resolve_by_their_type() {
    let doc = page();
    let hidden = Locator::new(&doc, kind("hidden").unwrap(), Criteria::new())
        .unwrap()
        .locate()
        .unwrap()
        .unwrap();
    assert_eq!(name_of(&hidden), "lang");
}

#[test]
fn a_broken_name_index_degrades_to_the_same_answer() {
    let doc = page();
    let locator = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", "user"),
    )
    .unwrap();
    let indexed = locator.locate().unwrap().unwrap();

    doc.poison_operation("elements_by_name");
    let locator = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", "user"),
    )
    .unwrap();
    let scanned = locator.locate().unwrap().unwrap();
    assert!(indexed.node().unwrap().is_same(scanned.node().unwrap()));
}

#[test]
fn an_empty_name_index_is_an_answer_not_a_failure() {
    let doc = page();
    let locator = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", "missing"),
    )
    .unwrap();
    assert!(locator.locate().unwrap().is_none());
}

#[test]
fn pattern_names_skip_the_index_and_scan() {
    let doc = page();
    let locator = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("name", regex::Regex::new("^pa").unwrap()),
    )
    .unwrap();
    assert_eq!(name_of(&locator.locate().unwrap().unwrap()), "pass");
}

#[test]
fn input_ordinals_run_over_the_single_pool() {
    let doc = page();
    let second = Locator::new(
        &doc,
        kind("text_field").unwrap(),
        Criteria::new().with("index", 1),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    // Document order over all text fields: q, then user.
    assert_eq!(name_of(&second), "user");
}

#[test]
fn forms_resolve_from_the_form_collection() {
    let doc = page();
    let login = Locator::new(
        &doc,
        kind("form").unwrap(),
        Criteria::new().with("name", "login"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(
        login.node().unwrap().attribute("action").unwrap(),
        Some(String::new())
    );

    let by_index = Locator::new(
        &doc,
        kind("form").unwrap(),
        Criteria::new().with("index", 1),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(name_of(&by_index), "login");
}

#[test]
fn the_method_criterion_reads_the_form_method() {
    let doc = page();
    let post_form = Locator::new(
        &doc,
        kind("form").unwrap(),
        Criteria::new().with("method", "post"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(name_of(&post_form), "login");
}

#[test]
fn select_list_is_an_alias_with_option_value_fallback() {
    let doc = MemDocument::from_json(&json!(
        {"tag": "select", "attrs": {"name": "lang"}, "children": [
            {"tag": "option", "text": "Danish"},
            {"tag": "option", "attrs": {"value": "no"}, "text": "Norwegian"}
        ]}
    ))
    .unwrap();
    let select = Locator::new(
        &doc,
        kind("select_list").unwrap(),
        Criteria::new().with("name", "lang"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(select.node().unwrap().tag_name().unwrap(), "select");

    let option = Locator::new(
        &doc,
        kind("option").unwrap(),
        Criteria::new().with("value", "Danish"),
    )
    .unwrap()
    .locate()
    .unwrap()
    .unwrap();
    assert_eq!(
        option.node().unwrap().attribute("text").unwrap().unwrap(),
        "Danish"
    );
}

#[test]
fn scoped_containers_bound_the_input_scan() {
    let doc = page();
    let forms = doc.forms().unwrap();
    let login_scope = forms[1].scope();
    // Ordinal 0 inside the login form is its own first text field, not
    // the page's.
    let first = Locator::new(&login_scope, kind("text_field").unwrap(), Criteria::new())
        .unwrap()
        .locate()
        .unwrap()
        .unwrap();
    assert_eq!(name_of(&first), "user");
}

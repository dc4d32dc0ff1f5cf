//! The built-in element-kind vocabulary.
//!
//! One entry per supported kind. Most kinds are plain tag scans; the
//! input-like kinds carry type vocabularies (a `button` is any of four
//! input types), and forms and frames use their own collections.

use crate::kinds::{ElementKind, IterationPolicy};

const fn tagged(name: &'static str, tags: &'static [&'static str]) -> ElementKind {
    ElementKind {
        name,
        tags,
        policy: IterationPolicy::Tagged,
    }
}

const fn input(name: &'static str, tags: &'static [&'static str]) -> ElementKind {
    ElementKind {
        name,
        tags,
        policy: IterationPolicy::Input,
    }
}

/// Every kind the engine knows, by vocabulary name.
pub const KINDS: &[ElementKind] = &[
    tagged("element", &["*"]),
    tagged("a", &["a"]),
    tagged("abbr", &["abbr"]),
    tagged("address", &["address"]),
    tagged("area", &["area"]),
    tagged("article", &["article"]),
    tagged("aside", &["aside"]),
    tagged("audio", &["audio"]),
    tagged("b", &["b"]),
    tagged("base", &["base"]),
    tagged("bdi", &["bdi"]),
    tagged("bdo", &["bdo"]),
    tagged("blockquote", &["blockquote"]),
    tagged("body", &["body"]),
    tagged("br", &["br"]),
    input("button", &["button", "submit", "image", "reset"]),
    tagged("canvas", &["canvas"]),
    tagged("caption", &["caption"]),
    input("checkbox", &["checkbox"]),
    tagged("cite", &["cite"]),
    tagged("code", &["code"]),
    tagged("col", &["col"]),
    tagged("colgroup", &["colgroup"]),
    tagged("command", &["command"]),
    tagged("data", &["data"]),
    tagged("datalist", &["datalist"]),
    tagged("dd", &["dd"]),
    tagged("del", &["del"]),
    tagged("details", &["details"]),
    tagged("dfn", &["dfn"]),
    tagged("div", &["div"]),
    tagged("dl", &["dl"]),
    tagged("dt", &["dt"]),
    tagged("em", &["em"]),
    tagged("embed", &["embed"]),
    tagged("fieldset", &["fieldset"]),
    tagged("figcaption", &["figcaption"]),
    tagged("figure", &["figure"]),
    input("file_field", &["file"]),
    tagged("font", &["font"]),
    tagged("footer", &["footer"]),
    ElementKind {
        name: "form",
        tags: &["form"],
        policy: IterationPolicy::Form,
    },
    ElementKind {
        name: "frame",
        tags: &["frame", "iframe"],
        policy: IterationPolicy::Frame,
    },
    tagged("frameset", &["frameset"]),
    tagged("h1", &["h1"]),
    tagged("h2", &["h2"]),
    tagged("h3", &["h3"]),
    tagged("h4", &["h4"]),
    tagged("h5", &["h5"]),
    tagged("h6", &["h6"]),
    tagged("head", &["head"]),
    tagged("header", &["header"]),
    tagged("hgroup", &["hgroup"]),
    input("hidden", &["hidden"]),
    tagged("hr", &["hr"]),
    tagged("i", &["i"]),
    tagged("img", &["img"]),
    input("input", &["input"]),
    tagged("ins", &["ins"]),
    tagged("kbd", &["kbd"]),
    tagged("keygen", &["keygen"]),
    tagged("label", &["label"]),
    tagged("legend", &["legend"]),
    tagged("li", &["li"]),
    tagged("map", &["map"]),
    tagged("mark", &["mark"]),
    tagged("menu", &["menu"]),
    tagged("meta", &["meta"]),
    tagged("meter", &["meter"]),
    tagged("nav", &["nav"]),
    tagged("noscript", &["noscript"]),
    tagged("object", &["object"]),
    tagged("ol", &["ol"]),
    tagged("optgroup", &["optgroup"]),
    tagged("option", &["option"]),
    tagged("output", &["output"]),
    tagged("p", &["p"]),
    tagged("param", &["param"]),
    tagged("pre", &["pre"]),
    tagged("progress", &["progress"]),
    tagged("q", &["q"]),
    input("radio", &["radio"]),
    tagged("rp", &["rp"]),
    tagged("rt", &["rt"]),
    tagged("ruby", &["ruby"]),
    tagged("s", &["s"]),
    tagged("samp", &["samp"]),
    tagged("script", &["script"]),
    tagged("section", &["section"]),
    input("select", &["select"]),
    tagged("small", &["small"]),
    tagged("source", &["source"]),
    tagged("span", &["span"]),
    tagged("strong", &["strong"]),
    tagged("style", &["style"]),
    tagged("sub", &["sub"]),
    tagged("summary", &["summary"]),
    tagged("sup", &["sup"]),
    tagged("table", &["table"]),
    tagged("tbody", &["tbody"]),
    tagged("td", &["th", "td"]),
    input(
        "text_field",
        &[
            "text", "password", "textarea", "number", "email", "url", "search", "tel",
        ],
    ),
    input("textarea", &["textarea"]),
    tagged("tfoot", &["tfoot"]),
    tagged("th", &["th"]),
    tagged("thead", &["thead"]),
    tagged("time", &["time"]),
    tagged("title", &["title"]),
    tagged("tr", &["tr"]),
    tagged("track", &["track"]),
    tagged("u", &["u"]),
    tagged("ul", &["ul"]),
    tagged("var", &["var"]),
    tagged("video", &["video"]),
    tagged("wbr", &["wbr"]),
];

/// Alternate names accepted by [`kind`].
const ALIASES: &[(&str, &str)] = &[
    ("cell", "td"),
    ("check_box", "checkbox"),
    ("field_set", "fieldset"),
    ("iframe", "frame"),
    ("image", "img"),
    ("link", "a"),
    ("row", "tr"),
    ("select_list", "select"),
];

/// Look up a kind by name or alias.
pub fn kind(name: &str) -> Option<&'static ElementKind> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name);
    KINDS.iter().find(|kind| kind.name == canonical)
}

//! Convert an HTML page to plain text for summarization.
//!
//! Walks the DOM with the `scraper` crate, keeps visible prose, and drops
//! scripts, styles, navigation boxes, citation markers and edit links. Block
//! elements end up on their own lines. Like all `scraper` code this is
//! synchronous.

use scraper::{ElementRef, Html, Node, Selector};

/// Containers tried in order for the main content; the first match wins.
const CONTENT_ROOTS: &[&str] = &["#mw-content-text", "main", "article", "body"];

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "form", "button", "svg", "iframe", "template",
];

const SKIPPED_CLASSES: &[&str] = &[
    "reference",
    "mw-editsection",
    "navbox",
    "reflist",
    "references",
    "toc",
    "mw-jump-link",
    "noprint",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "tr", "table",
    "blockquote", "br", "dd", "dt", "figcaption",
];

/// Extract readable text from `html`.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = CONTENT_ROOTS.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document.select(&selector).next()
    });

    let mut out = String::new();
    match root {
        Some(root) => walk(root, &mut out),
        None => walk(document.root_element(), &mut out),
    }

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if SKIPPED_TAGS.contains(&el.name())
                    || el.classes().any(|c| SKIPPED_CLASSES.contains(&c))
                    || el.id() == Some("toc")
                {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    walk(child_el, out);
                }
                if block {
                    out.push('\n');
                } else {
                    // Keep adjacent inline cells and spans from gluing together.
                    if matches!(el.name(), "td" | "th") {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

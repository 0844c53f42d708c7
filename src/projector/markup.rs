//! Markup stripping for rich-text attributes and search highlights.
//!
//! Parses the value as an HTML fragment with `scraper` and keeps only the text nodes.
//! Block-level elements and `<br>` become line breaks; whitespace inside a line is
//! collapsed and runs of blank lines shrink to one. Decoded entities can spell out
//! markup again (`&lt;br&gt;`), so stripping repeats until the text is stable.

use scraper::{ElementRef, Html, Node};

const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "li",
    "ul",
    "ol",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "tr",
    "table",
    "section",
    "article",
    "header",
    "footer",
];

// Each escaping level needs one pass
const MAX_PASSES: usize = 16;

/// Strip all tags from `input`, keeping text content and line breaks
///
/// The result is a fixed point: stripping it again changes nothing.
pub fn strip_markup(input: &str) -> String {
    let mut text = strip_once(input);
    for _ in 0..MAX_PASSES {
        let next = strip_once(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text
}

fn strip_once(input: &str) -> String {
    // Plain text needs no parse
    if !input.contains('<') && !input.contains('&') {
        return normalize_whitespace(input);
    }

    let fragment = Html::parse_fragment(input);
    let mut text = String::with_capacity(input.len());
    collect_text(fragment.root_element(), &mut text);
    normalize_whitespace(&text)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if matches!(name, "script" | "style") {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    push_break(out);
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    push_break(out);
                }
            }
            _ => {}
        }
    }
}

// Adjacent blocks share one break
fn push_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Collapse intra-line whitespace, trim lines, keep at most one blank line in a row
pub fn normalize_whitespace(input: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = false;

    for line in input.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_run = true;
            continue;
        }
        if blank_run && !lines.is_empty() {
            lines.push(String::new());
        }
        blank_run = false;
        lines.push(collapsed);
    }

    lines.join("\n")
}

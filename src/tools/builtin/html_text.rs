//! HTML to plain text conversion
//!
//! Parses the document with `scraper` (html5ever) and walks the tree,
//! dropping comments, scripts and page chrome (navigation, headers, footers,
//! sidebars, forms). Tables are kept as ` | `-separated rows.

use scraper::{ElementRef, Html, Node};

/// Elements whose whole subtree is boilerplate
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
    "form", "button", "select", "iframe", "svg",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "figcaption", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "tbody", "tfoot", "thead", "tr", "ul",
];

/// Convert an HTML document or fragment to readable text
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut out = String::new();
    render_element(document.root_element(), &mut out);

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name);
    match name {
        "td" | "th" => {
            if !at_line_start(out) {
                out.truncate(out.trim_end_matches(' ').len());
                out.push_str(" | ");
            }
        }
        _ if block => out.push('\n'),
        _ => {}
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out);
                }
            }
            _ => {}
        }
    }

    if block {
        out.push('\n');
    }
}

fn at_line_start(out: &str) -> bool {
    let trimmed = out.trim_end_matches(' ');
    trimmed.is_empty() || trimmed.ends_with('\n')
}

/// Append text with collapsed whitespace
fn push_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

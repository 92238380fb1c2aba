//! A Markdown to HTML converter for
//! [CommonMark](https://spec.commonmark.org/).
//!
//! Parsing runs in two strictly ordered passes: a line-oriented block
//! parser builds a tree of block elements, then rendering walks the tree
//! and re-scans each leaf's raw text for inline constructs (code spans,
//! emphasis, links, images, autolinks, raw HTML, entities, hard breaks).
//! Link reference definitions collected while paragraphs close are
//! resolved during the inline pass.  Conversion is total: any input maps
//! to an HTML string, and unmatched constructs render as literal text.
//!
//! ```
//! use marq::markdown_to_html;
//!
//! assert_eq!(
//!     markdown_to_html("Hello, **world**."),
//!     "<p>Hello, <strong>world</strong>.</p>",
//! );
//! ```

mod character;
mod html;
mod htmltag;
mod line;
mod nodes;
mod parser;
mod scanners;
mod strings;


use parser::RefMap;

/// Convert a document with the default [`Parser`].
pub fn markdown_to_html(markdown: &str) -> String {
    Parser::new().html_of(markdown)
}

/// A Markdown parser holding the per-document link reference table.
///
/// The table is rebuilt on every [`html_of`](Parser::html_of) call;
/// [`define_link`](Parser::define_link) and the lookup helpers exist so
/// reference resolution can be exercised directly.
#[derive(Default)]
pub struct Parser {
    links: RefMap,
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    /// Parse `markdown` (lines separated by `\n`; the final line need not
    /// be newline-terminated) and return its HTML rendering.  Top-level
    /// blocks are joined with `\n`.
    pub fn html_of(&mut self, markdown: &str) -> String {
        self.links.clear();
        let (arena, root) = parser::parse_document(markdown, &mut self.links);
        html::format_document(&arena, root, &self.links)
    }

    /// Register a link reference definition.  Labels are matched case-
    /// and whitespace-insensitively; the first definition of a label wins.
    pub fn define_link(&mut self, label: &str, destination: &str, title: &str) {
        self.links
            .define(label, destination.to_string(), title.to_string());
    }

    /// Resolve `label` as a reference link, rendering `text` (or the label
    /// itself) as the link text.  `None` when the label is undefined.
    pub fn link_text(&self, label: &str, text: Option<&str>) -> Option<String> {
        parser::inlines::link_text(&self.links, label, text)
    }

    /// Resolve `label` as a reference image, rendering `description` (or
    /// the label itself) as the alt text.  `None` when the label is
    /// undefined.
    pub fn image_text(&self, label: &str, description: Option<&str>) -> Option<String> {
        parser::inlines::image_text(&self.links, label, description)
    }
}

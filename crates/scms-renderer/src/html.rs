//! HTML emission of rendered trees.
//!
//! Trees become nested lists:
//!
//! ```html
//! <ul><li class="…"><a href="…">Label<sup>[2]</sup></a><ul>…</ul></li></ul>
//! ```
//!
//! The `<sup>` ordinal only appears for indexed renders. CSS classes come
//! from the [`AppContext`] resolvers.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use scms_model::{BookRef, PageRef};
use scms_tree::{NodeLink, RenderedTree, TreeNode};

use crate::AppContext;

/// Characters escaped in whole URIs: everything but unreserved and reserved
/// characters.
const URI_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'%');

/// Characters escaped in URI components: everything but unreserved
/// characters.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds hrefs for tree links.
///
/// Cross-page links are `<context path><book prefix><page path>[#id]`;
/// anchors are `#page-<ordinal>[-<id>]`.
#[derive(Clone, Debug, Default)]
pub struct LinkBuilder {
    context_path: String,
    prefixes: HashMap<BookRef, String>,
}

impl LinkBuilder {
    /// Links served below `context_path` (empty for the root).
    #[must_use]
    pub fn new(context_path: impl Into<String>) -> Self {
        Self {
            context_path: context_path.into(),
            prefixes: HashMap::new(),
        }
    }

    /// Set the URL prefix of a book.
    #[must_use]
    pub fn with_book_prefix(mut self, book: BookRef, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(book, prefix.into());
        self
    }

    /// Href for `link`.
    #[must_use]
    pub fn href(&self, link: &NodeLink) -> String {
        match link {
            NodeLink::Anchor { .. } => {
                let anchor = link.anchor().unwrap_or_default();
                format!("#{}", encode_component(&anchor))
            }
            NodeLink::Page { page_ref, fragment } => {
                let mut url = self.page_url(page_ref);
                if let Some(id) = fragment {
                    url.push('#');
                    url.push_str(&encode_component(id));
                }
                url
            }
        }
    }

    /// URL of a page.
    #[must_use]
    pub fn page_url(&self, page_ref: &PageRef) -> String {
        let prefix = self
            .prefixes
            .get(page_ref.book())
            .map_or("", String::as_str);
        let mut url = String::new();
        url.push_str(&encode_uri(&self.context_path));
        url.push_str(&encode_uri(prefix));
        url.push_str(&encode_uri(page_ref.path()));
        url
    }
}

fn encode_uri(s: &str) -> String {
    utf8_percent_encode(s, URI_ENCODE_SET).to_string()
}

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT_ENCODE_SET).to_string()
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Write `tree` as nested HTML lists.
///
/// Writes nothing when the tree is not meant to produce markup.
pub fn write_tree(app: &AppContext, links: &LinkBuilder, tree: &RenderedTree, out: &mut String) {
    if !tree.emit_markup() {
        return;
    }
    out.push_str("<ul>");
    write_node(app, links, tree.root(), out);
    out.push_str("</ul>");
}

/// Render `tree` to an HTML string.
#[must_use]
pub fn render_tree_html(app: &AppContext, links: &LinkBuilder, tree: &RenderedTree) -> String {
    let mut out = String::new();
    write_tree(app, links, tree, &mut out);
    out
}

fn write_node(app: &AppContext, links: &LinkBuilder, node: &TreeNode, out: &mut String) {
    out.push_str("<li");
    if let Some(class) = app.list_item_css_class(node.node()) {
        push_attr(out, "class", &class);
    }
    out.push_str("><a");
    if let Some(class) = app.link_css_class(node.node()) {
        push_attr(out, "class", &class);
    }
    push_attr(out, "href", &links.href(node.link()));
    out.push('>');
    out.push_str(&escape_html(node.label()));
    if let Some(ordinal) = node.link().ordinal_label() {
        out.push_str("<sup>");
        out.push_str(&ordinal);
        out.push_str("</sup>");
    }
    out.push_str("</a>");

    if !node.children().is_empty() {
        out.push_str("<ul>");
        for child in node.children() {
            write_node(app, links, child, out);
        }
        out.push_str("</ul>");
    }
    out.push_str("</li>");
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

//! YAML page documents.

use serde::Deserialize;

use scms_model::{BookRef, ElementBuilder, ElementKind, ModelError, PageBuilder, PageRef};

/// A page as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PageDocument {
    pub title: Option<String>,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub elements: Vec<ElementDocument>,
    pub body: Option<String>,
}

/// An element as written on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ElementDocument {
    pub kind: ElementKind,
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub elements: Vec<ElementDocument>,
}

/// Parse a page document.
///
/// Empty content is a page with no fields set.
pub(crate) fn parse_document(content: &str) -> Result<PageDocument, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(PageDocument::default());
    }
    serde_yaml::from_str(content)
}

impl PageDocument {
    /// Describe the full page at `page_ref`.
    ///
    /// References without a book prefix point into the page's own book.
    /// A missing title falls back to the last path segment.
    pub fn into_builder(self, page_ref: PageRef) -> Result<PageBuilder, ModelError> {
        let book = page_ref.book().clone();
        let title = self
            .title
            .unwrap_or_else(|| page_ref.name().to_owned());

        let mut builder = PageBuilder::new(page_ref).title(title);
        for parent in &self.parents {
            builder = builder.parent(resolve(&book, parent)?);
        }
        for child in &self.children {
            builder = builder.child(resolve(&book, child)?);
        }
        for element in self.elements {
            builder = builder.element(element.into_builder());
        }
        if let Some(body) = self.body {
            builder = builder.body(body);
        }
        Ok(builder)
    }
}

impl ElementDocument {
    fn into_builder(self) -> ElementBuilder {
        let mut builder = ElementBuilder::new(self.kind, self.label).hidden(self.hidden);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        for child in self.elements {
            builder = builder.child(child.into_builder());
        }
        builder
    }
}

fn resolve(book: &BookRef, value: &str) -> Result<PageRef, ModelError> {
    PageRef::parse_relative(book, value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page_ref(s: &str) -> PageRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_full_document() {
        let yaml = r"
title: Guide
parents: [/]
children:
  - /guide/setup
  - wiki:/faq
elements:
  - kind: section
    label: Install
    id: install
    elements:
      - kind: diagram
        label: Flow
        hidden: true
body: |
  Hello
";
        let page = parse_document(yaml)
            .unwrap()
            .into_builder(page_ref("docs:/guide"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(page.title(), "Guide");
        assert_eq!(page.parent_refs()[0].page_ref(), &page_ref("docs:/"));
        let children: Vec<String> = page
            .child_refs()
            .iter()
            .map(|c| c.page_ref().to_string())
            .collect();
        assert_eq!(children, vec!["docs:/guide/setup", "wiki:/faq"]);
        assert_eq!(page.elements().len(), 2);
        assert_eq!(page.child_elements().len(), 1);
        assert_eq!(page.child_elements()[0].id(), Some("install"));
        assert!(page.child_elements()[0].child_elements()[0].is_hidden());
        assert_eq!(page.body(), Some("Hello\n"));
    }

    #[test]
    fn test_empty_document_uses_path_as_title() {
        let page = parse_document("")
            .unwrap()
            .into_builder(page_ref("docs:/setup-notes"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(page.title(), "setup-notes");
        assert!(page.child_refs().is_empty());
        assert_eq!(page.body(), None);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = "elements:\n  - kind: video\n    label: Demo\n";

        assert!(parse_document(yaml).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_document("titel: Typo\n").is_err());
    }

    #[test]
    fn test_invalid_reference() {
        let document = parse_document("children: [guide]\n").unwrap();

        assert!(document.into_builder(page_ref("docs:/")).is_err());
    }
}

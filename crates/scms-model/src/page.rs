//! Captured pages.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{ChildRef, Element, ElementBuilder, ModelError, PageRef, ParentRef};

/// A captured page.
///
/// Holds the page identity, its navigation references and its elements.
/// Which parts are populated depends on the fidelity the page was captured
/// at: an existence-only capture has no references or elements, and only a
/// full capture carries a body.
///
/// Pages are immutable once built. Callers share them as `Arc<Page>`; two
/// captures of the same [`PageRef`] are distinct nodes unless the second one
/// was served from a cache.
#[derive(Debug)]
pub struct Page {
    page_ref: PageRef,
    title: String,
    parent_refs: Vec<ParentRef>,
    child_refs: Vec<ChildRef>,
    child_elements: Vec<Arc<Element>>,
    elements: Vec<Arc<Element>>,
    body: Option<String>,
}

impl Page {
    /// Page identity.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        &self.page_ref
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Navigation parents, in declared order.
    #[must_use]
    pub fn parent_refs(&self) -> &[ParentRef] {
        &self.parent_refs
    }

    /// Navigation children, in declared order.
    #[must_use]
    pub fn child_refs(&self) -> &[ChildRef] {
        &self.child_refs
    }

    /// Top-level elements, in document order.
    #[must_use]
    pub fn child_elements(&self) -> &[Arc<Element>] {
        &self.child_elements
    }

    /// Every element on the page, flattened in pre-order.
    #[must_use]
    pub fn elements(&self) -> &[Arc<Element>] {
        &self.elements
    }

    /// Find an element by id.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<&Arc<Element>> {
        self.elements.iter().find(|e| e.id() == Some(id))
    }

    /// Rendered body, present only on full captures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Builder for [`Page`].
///
/// Page sources describe a page with a builder and then trim it to the
/// requested fidelity with [`without_body`](Self::without_body) and
/// [`without_structure`](Self::without_structure) before calling
/// [`build`](Self::build).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageBuilder {
    page_ref: PageRef,
    title: Option<String>,
    parents: Vec<PageRef>,
    children: Vec<PageRef>,
    elements: Vec<ElementBuilder>,
    body: Option<String>,
}

impl PageBuilder {
    /// Start a page.
    #[must_use]
    pub fn new(page_ref: PageRef) -> Self {
        Self {
            page_ref,
            title: None,
            parents: Vec::new(),
            children: Vec::new(),
            elements: Vec::new(),
            body: None,
        }
    }

    /// Page being built.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        &self.page_ref
    }

    /// Set the title. Defaults to the last path segment.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a navigation parent.
    #[must_use]
    pub fn parent(mut self, parent: PageRef) -> Self {
        self.parents.push(parent);
        self
    }

    /// Append a navigation child.
    #[must_use]
    pub fn child(mut self, child: PageRef) -> Self {
        self.children.push(child);
        self
    }

    /// Append a top-level element.
    #[must_use]
    pub fn element(mut self, element: ElementBuilder) -> Self {
        self.elements.push(element);
        self
    }

    /// Set the rendered body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Drop the body, keeping references and elements.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }

    /// Drop references and elements, keeping identity and title.
    #[must_use]
    pub fn without_structure(mut self) -> Self {
        self.parents.clear();
        self.children.clear();
        self.elements.clear();
        self
    }

    /// Build the page.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if element ids repeat or a parent or child is
    /// listed twice.
    pub fn build(self) -> Result<Page, ModelError> {
        let parent_refs = dedup_refs(&self.page_ref, self.parents, |page_ref, parent| {
            ModelError::DuplicateParent { page_ref, parent }
        })?
        .into_iter()
        .map(ParentRef::new)
        .collect();
        let child_refs = dedup_refs(&self.page_ref, self.children, |page_ref, child| {
            ModelError::DuplicateChild { page_ref, child }
        })?
        .into_iter()
        .map(ChildRef::new)
        .collect();

        let mut ids = HashSet::new();
        let mut elements = Vec::new();
        let child_elements = self
            .elements
            .into_iter()
            .map(|e| e.build(&self.page_ref, &mut ids, &mut elements))
            .collect::<Result<Vec<_>, _>>()?;

        let title = self
            .title
            .unwrap_or_else(|| self.page_ref.name().to_owned());

        Ok(Page {
            page_ref: self.page_ref,
            title,
            parent_refs,
            child_refs,
            child_elements,
            elements,
            body: self.body,
        })
    }
}

fn dedup_refs(
    page_ref: &PageRef,
    refs: Vec<PageRef>,
    duplicate: impl Fn(PageRef, PageRef) -> ModelError,
) -> Result<Vec<PageRef>, ModelError> {
    let mut seen = HashSet::with_capacity(refs.len());
    for r in &refs {
        if !seen.insert(r) {
            return Err(duplicate(page_ref.clone(), r.clone()));
        }
    }
    Ok(refs)
}

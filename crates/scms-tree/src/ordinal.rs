//! Page ordinals for same-document anchors.

use std::collections::HashMap;

use scms_model::PageRef;

/// Assigns stable ordinals to pages within one render pass.
///
/// When a tree is rendered into a document that already contains the listed
/// pages (a printable book, a single-page export), links become anchors into
/// that document and pages are identified by ordinal.
pub trait OrdinalResolver {
    /// Ordinal of `page_ref`, assigning the next free one on first sight.
    ///
    /// Must return the same ordinal for the same page for the lifetime of
    /// the resolver.
    fn ordinal(&mut self, page_ref: &PageRef) -> usize;
}

/// Ordinals in first-visit order, starting at zero.
#[derive(Debug, Default)]
pub struct PageIndex {
    ordinals: HashMap<PageRef, usize>,
    order: Vec<PageRef>,
}

impl PageIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal already assigned to `page_ref`.
    #[must_use]
    pub fn get(&self, page_ref: &PageRef) -> Option<usize> {
        self.ordinals.get(page_ref).copied()
    }

    /// Pages in ordinal order.
    #[must_use]
    pub fn pages(&self) -> &[PageRef] {
        &self.order
    }

    /// Number of indexed pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no page has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl OrdinalResolver for PageIndex {
    fn ordinal(&mut self, page_ref: &PageRef) -> usize {
        if let Some(ordinal) = self.ordinals.get(page_ref) {
            return *ordinal;
        }
        let ordinal = self.order.len();
        self.ordinals.insert(page_ref.clone(), ordinal);
        self.order.push(page_ref.clone());
        ordinal
    }
}

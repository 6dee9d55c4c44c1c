//! Element filters.
//!
//! A filter decides which elements count as matches for a tree. Pages match
//! through their elements; a filter can also match pages directly via
//! [`ElementFilter::matches_page`], which is how plain navigation trees
//! include every page.

use scms_model::{Element, ElementKind, Page};

/// Failure reported by a filter.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Match predicate over elements.
pub trait ElementFilter: Send + Sync {
    /// Whether `element` matches.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the predicate cannot be evaluated; the
    /// traversal using this filter is aborted.
    fn matches(&self, element: &Element) -> Result<bool, FilterError>;

    /// Whether `page` matches on its own, regardless of its elements.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the predicate cannot be evaluated.
    fn matches_page(&self, page: &Page) -> Result<bool, FilterError> {
        let _ = page;
        Ok(false)
    }
}

/// Matches visible elements of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindFilter {
    kind: ElementKind,
}

impl KindFilter {
    /// Match elements of `kind`.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self { kind }
    }

    /// Kind being matched.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }
}

impl ElementFilter for KindFilter {
    fn matches(&self, element: &Element) -> Result<bool, FilterError> {
        Ok(!element.is_hidden() && element.kind() == self.kind)
    }
}

/// Matches every page and no element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllPages;

impl ElementFilter for AllPages {
    fn matches(&self, _element: &Element) -> Result<bool, FilterError> {
        Ok(false)
    }

    fn matches_page(&self, _page: &Page) -> Result<bool, FilterError> {
        Ok(true)
    }
}

/// Filter backed by a closure.
pub struct FnFilter<F>(F);

/// Wrap a closure as an [`ElementFilter`].
pub fn from_fn<F>(f: F) -> FnFilter<F>
where
    F: Fn(&Element) -> Result<bool, FilterError> + Send + Sync,
{
    FnFilter(f)
}

impl<F> ElementFilter for FnFilter<F>
where
    F: Fn(&Element) -> Result<bool, FilterError> + Send + Sync,
{
    fn matches(&self, element: &Element) -> Result<bool, FilterError> {
        (self.0)(element)
    }
}

impl<F> std::fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFilter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use scms_model::{ElementBuilder, PageBuilder};

    use super::*;

    fn page() -> Page {
        PageBuilder::new("docs:/a".parse().unwrap())
            .element(ElementBuilder::new(ElementKind::Diagram, "Visible"))
            .element(ElementBuilder::new(ElementKind::Diagram, "Hidden").hidden(true))
            .element(ElementBuilder::new(ElementKind::Heading, "Title"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_kind_filter_skips_hidden_and_other_kinds() {
        let page = page();
        let filter = KindFilter::new(ElementKind::Diagram);

        let results: Vec<_> = page
            .elements()
            .iter()
            .map(|e| filter.matches(e).unwrap())
            .collect();

        assert_eq!(results, vec![true, false, false]);
        assert!(!filter.matches_page(&page).unwrap());
    }

    #[test]
    fn test_all_pages_matches_pages_only() {
        let page = page();

        assert!(AllPages.matches_page(&page).unwrap());
        assert!(!AllPages.matches(&page.elements()[0]).unwrap());
    }

    #[test]
    fn test_fn_filter() {
        let page = page();
        let filter = from_fn(|e: &Element| Ok(e.label().starts_with('T')));

        assert!(filter.matches(&page.elements()[2]).unwrap());
        assert!(!filter.matches(&page.elements()[0]).unwrap());
    }

    #[test]
    fn test_fn_filter_error() {
        let page = page();
        let filter = from_fn(|_: &Element| Err("broken".into()));

        let err = filter.matches(&page.elements()[0]).unwrap_err();

        assert_eq!(err.to_string(), "broken");
    }
}

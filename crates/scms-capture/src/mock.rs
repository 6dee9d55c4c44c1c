//! Mock page source for testing.
//!
//! Provides [`MockPageSource`] for unit testing without a real backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};
use std::thread;
use std::time::Duration;

use scms_model::{Page, PageBuilder, PageRef};

use crate::{CaptureLevel, PageSource, SourceError, SourceErrorKind};

/// Mock page source for testing.
///
/// Holds full page descriptions in memory and records every
/// [`materialize`](PageSource::materialize) call, so tests can assert how
/// often the backend was actually hit.
///
/// # Example
///
/// ```ignore
/// use scms_capture::{CaptureLevel, MockPageSource, PageSource};
/// use scms_model::PageBuilder;
///
/// let source = MockPageSource::new()
///     .with_page(PageBuilder::new("docs:/".parse()?).title("Home"));
///
/// let page = source.materialize(&"docs:/".parse()?, CaptureLevel::Meta)?;
/// assert_eq!(source.calls(&"docs:/".parse()?, CaptureLevel::Meta), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockPageSource {
    pages: RwLock<HashMap<PageRef, PageBuilder>>,
    failing: RwLock<HashSet<PageRef>>,
    calls: Mutex<Vec<(PageRef, CaptureLevel)>>,
    delay: Option<Duration>,
}

impl MockPageSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. Replaces an earlier page with the same reference.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page: PageBuilder) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(page.page_ref().clone(), page);
        self
    }

    /// Make every materialization of `page_ref` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, page_ref: PageRef) -> Self {
        self.failing.write().unwrap().insert(page_ref);
        self
    }

    /// Sleep for `delay` inside every materialization.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Start failing `page_ref`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail(&self, page_ref: PageRef) {
        self.failing.write().unwrap().insert(page_ref);
    }

    /// Stop failing `page_ref`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn heal(&self, page_ref: &PageRef) {
        self.failing.write().unwrap().remove(page_ref);
    }

    /// Number of materializations of `page_ref` at exactly `level`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self, page_ref: &PageRef, level: CaptureLevel) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, l)| r == page_ref && *l == level)
            .count()
    }

    /// Number of materializations of `page_ref` at any level.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls_for(&self, page_ref: &PageRef) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == page_ref)
            .count()
    }

    /// Total number of materializations.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PageSource for MockPageSource {
    fn materialize(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push((page_ref.clone(), level));

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        if self.failing.read().unwrap().contains(page_ref) {
            return Err(SourceError::new(SourceErrorKind::Unavailable)
                .with_page(page_ref.clone())
                .with_backend("Mock"));
        }

        let builder = self
            .pages
            .read()
            .unwrap()
            .get(page_ref)
            .cloned()
            .ok_or_else(|| SourceError::not_found(page_ref.clone()).with_backend("Mock"))?;

        level
            .shape(builder)
            .build()
            .map_err(|e| SourceError::parse(page_ref.clone(), e).with_backend("Mock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_ref(s: &str) -> PageRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_materialize_shapes_to_level() {
        let source = MockPageSource::new().with_page(
            PageBuilder::new(page_ref("docs:/a"))
                .child(page_ref("docs:/a/b"))
                .body("text"),
        );

        let meta = source
            .materialize(&page_ref("docs:/a"), CaptureLevel::Meta)
            .unwrap();
        let exists = source
            .materialize(&page_ref("docs:/a"), CaptureLevel::PageExists)
            .unwrap();

        assert_eq!(meta.child_refs().len(), 1);
        assert!(meta.body().is_none());
        assert!(exists.child_refs().is_empty());
    }

    #[test]
    fn test_missing_page_is_not_found() {
        let source = MockPageSource::new();

        let err = source
            .materialize(&page_ref("docs:/missing"), CaptureLevel::Meta)
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_failure_injection_and_heal() {
        let source = MockPageSource::new()
            .with_page(PageBuilder::new(page_ref("docs:/a")))
            .with_failure(page_ref("docs:/a"));

        let err = source
            .materialize(&page_ref("docs:/a"), CaptureLevel::Meta)
            .unwrap_err();
        assert_eq!(err.kind, SourceErrorKind::Unavailable);

        source.heal(&page_ref("docs:/a"));
        assert!(source.materialize(&page_ref("docs:/a"), CaptureLevel::Meta).is_ok());
    }

    #[test]
    fn test_calls_recorded_per_level() {
        let source = MockPageSource::new().with_page(PageBuilder::new(page_ref("docs:/a")));

        let _ = source.materialize(&page_ref("docs:/a"), CaptureLevel::Meta);
        let _ = source.materialize(&page_ref("docs:/a"), CaptureLevel::Body);
        let _ = source.materialize(&page_ref("docs:/b"), CaptureLevel::Meta);

        assert_eq!(source.calls(&page_ref("docs:/a"), CaptureLevel::Meta), 1);
        assert_eq!(source.calls_for(&page_ref("docs:/a")), 2);
        assert_eq!(source.total_calls(), 3);
    }
}

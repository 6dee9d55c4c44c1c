//! Request-scoped capture cache.
//!
//! [`CaptureCache`] memoizes page captures by [`PageRef`] for the lifetime of
//! one request. An entry remembers the level it was captured at and serves
//! any request at that level or below. Concurrent captures of one page are
//! serialized: while a capture is in flight, other callers for the same page
//! wait for it to settle and then re-check the cache.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use rayon::prelude::*;
use scms_model::{Page, PageRef};

use crate::{CaptureLevel, PageSource, SourceError};

/// A page could not be captured.
#[derive(Debug, thiserror::Error)]
#[error("Failed to capture {page_ref} at level {level}: {source}")]
pub struct CaptureError {
    /// Page that failed.
    pub page_ref: PageRef,
    /// Requested level.
    pub level: CaptureLevel,
    /// Backend failure.
    #[source]
    pub source: SourceError,
}

impl CaptureError {
    /// Whether the page does not exist in the source.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.is_not_found()
    }
}

/// Counters describing how the cache was used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Requests served from the cache.
    pub hits: usize,
    /// Calls made to the page source.
    pub captures: usize,
    /// Source calls that failed.
    pub failures: usize,
}

struct CacheEntry {
    level: CaptureLevel,
    page: Arc<Page>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PageRef, CacheEntry>,
    in_flight: HashSet<PageRef>,
}

/// Per-request page capture cache.
///
/// Create one cache per request and drop it when the request ends. The cache
/// is `Send + Sync`; [`capture_multiple`](Self::capture_multiple) fans out
/// over the rayon pool and all workers share the same entries.
///
/// # Guarantees
///
/// - A page captured at level L is returned as the same `Arc<Page>` for every
///   later request at a level ≤ L.
/// - An entry is only ever replaced by a capture at a strictly higher level.
/// - Failed captures are never stored; the next request tries again.
/// - At most one capture per page is in flight at a time.
pub struct CaptureCache {
    source: Arc<dyn PageSource>,
    state: Mutex<CacheState>,
    settled: Condvar,
    hits: AtomicUsize,
    captures: AtomicUsize,
    failures: AtomicUsize,
}

impl CaptureCache {
    /// Create an empty cache in front of `source`.
    #[must_use]
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::default()),
            settled: Condvar::new(),
            hits: AtomicUsize::new(0),
            captures: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Capture a page at `level` or better.
    ///
    /// Returns the cached page when one at a sufficient level exists.
    /// Otherwise materializes the page, stores it if the capture succeeds and
    /// returns it. If another thread is capturing the same page, waits for it
    /// first; a failure of that capture is not shared, the waiter tries on its
    /// own.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] if the page source fails.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn capture(
        &self,
        page_ref: &PageRef,
        level: CaptureLevel,
    ) -> Result<Arc<Page>, CaptureError> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(entry) = state.entries.get(page_ref)
                && entry.level.satisfies(level)
            {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    page = %page_ref,
                    requested = %level,
                    cached = %entry.level,
                    "Capture cache hit"
                );
                return Ok(Arc::clone(&entry.page));
            }
            if !state.in_flight.contains(page_ref) {
                break;
            }
            state = self.settled.wait(state).unwrap();
        }
        state.in_flight.insert(page_ref.clone());
        drop(state);

        let in_flight = InFlight {
            cache: self,
            page_ref,
        };

        tracing::debug!(page = %page_ref, %level, "Capture cache miss");
        self.captures.fetch_add(1, Ordering::Relaxed);
        let page = match self.source.materialize(page_ref, level) {
            Ok(page) => Arc::new(page),
            Err(source) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(page = %page_ref, %level, error = %source, "Capture failed");
                return Err(CaptureError {
                    page_ref: page_ref.clone(),
                    level,
                    source,
                });
            }
        };

        // The entry is still marked in flight, so nothing else has written it
        // since the miss above and any existing entry is below `level`.
        self.state.lock().unwrap().entries.insert(
            page_ref.clone(),
            CacheEntry {
                level,
                page: Arc::clone(&page),
            },
        );
        drop(in_flight);

        Ok(page)
    }

    /// Capture several pages concurrently.
    ///
    /// Duplicate references are captured once; the batch lists each distinct
    /// reference at the position of its first occurrence. A failure of one
    /// page does not affect the others.
    #[must_use]
    pub fn capture_multiple(&self, page_refs: &[PageRef], level: CaptureLevel) -> CaptureBatch {
        let mut seen = HashSet::with_capacity(page_refs.len());
        let unique: Vec<&PageRef> = page_refs.iter().filter(|r| seen.insert(*r)).collect();

        let entries = unique
            .par_iter()
            .map(|page_ref| ((*page_ref).clone(), self.capture(page_ref, level)))
            .collect();

        CaptureBatch { entries }
    }

    /// Level the page is currently cached at.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn cached_level(&self, page_ref: &PageRef) -> Option<CaptureLevel> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(page_ref)
            .map(|entry| entry.level)
    }

    /// Number of cached pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usage counters so far.
    #[must_use]
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            hits: self.hits.load(Ordering::Relaxed),
            captures: self.captures.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for CaptureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// In-flight marker for one page.
///
/// Clears the marker and wakes waiters when dropped, including on unwind out
/// of a panicking page source.
struct InFlight<'a> {
    cache: &'a CaptureCache,
    page_ref: &'a PageRef,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self
            .cache
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.in_flight.remove(self.page_ref);
        drop(state);
        self.cache.settled.notify_all();
    }
}

/// Results of [`CaptureCache::capture_multiple`], in input order.
#[derive(Debug)]
pub struct CaptureBatch {
    entries: Vec<(PageRef, Result<Arc<Page>, CaptureError>)>,
}

impl CaptureBatch {
    /// All results, in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&PageRef, &Result<Arc<Page>, CaptureError>)> {
        self.entries.iter().map(|(page_ref, result)| (page_ref, result))
    }

    /// Successfully captured pages, in input order.
    pub fn pages(&self) -> impl Iterator<Item = &Arc<Page>> {
        self.entries.iter().filter_map(|(_, result)| result.as_ref().ok())
    }

    /// Failures, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &CaptureError> {
        self.entries.iter().filter_map(|(_, result)| result.as_ref().err())
    }

    /// Result for one reference.
    #[must_use]
    pub fn get(&self, page_ref: &PageRef) -> Option<&Result<Arc<Page>, CaptureError>> {
        self.entries
            .iter()
            .find(|(r, _)| r == page_ref)
            .map(|(_, result)| result)
    }

    /// Whether every page was captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, result)| result.is_ok())
    }

    /// Number of distinct references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All pages, or the first failure in input order.
    ///
    /// # Errors
    ///
    /// Returns the first [`CaptureError`] of the batch.
    pub fn into_pages(self) -> Result<Vec<Arc<Page>>, CaptureError> {
        self.entries.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use scms_model::PageBuilder;

    use super::*;
    use crate::MockPageSource;

    static_assertions::assert_impl_all!(CaptureCache: Send, Sync);

    fn page_ref(s: &str) -> PageRef {
        s.parse().unwrap()
    }

    fn source_with(refs: &[&str]) -> MockPageSource {
        refs.iter().fold(MockPageSource::new(), |source, r| {
            source.with_page(PageBuilder::new(page_ref(r)).body(format!("body of {r}")))
        })
    }

    #[test]
    fn test_repeated_capture_returns_same_page() {
        let source = Arc::new(source_with(&["docs:/a"]));
        let cache = CaptureCache::new(source.clone());

        let first = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();
        let second = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.total_calls(), 1);
        assert_eq!(
            cache.stats(),
            CaptureStats {
                hits: 1,
                captures: 1,
                failures: 0
            }
        );
    }

    #[test]
    fn test_higher_level_serves_lower_request() {
        let source = Arc::new(source_with(&["docs:/a"]));
        let cache = CaptureCache::new(source.clone());

        let body = cache.capture(&page_ref("docs:/a"), CaptureLevel::Body).unwrap();
        let meta = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();
        let exists = cache
            .capture(&page_ref("docs:/a"), CaptureLevel::PageExists)
            .unwrap();

        assert!(Arc::ptr_eq(&body, &meta));
        assert!(Arc::ptr_eq(&body, &exists));
        assert_eq!(source.total_calls(), 1);
        assert_eq!(cache.cached_level(&page_ref("docs:/a")), Some(CaptureLevel::Body));
    }

    #[test]
    fn test_lower_level_is_upgraded() {
        let source = Arc::new(source_with(&["docs:/a"]));
        let cache = CaptureCache::new(source.clone());

        let meta = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();
        let body = cache.capture(&page_ref("docs:/a"), CaptureLevel::Body).unwrap();
        let meta_again = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();

        assert!(!Arc::ptr_eq(&meta, &body));
        assert!(meta.body().is_none());
        assert!(body.body().is_some());
        assert!(Arc::ptr_eq(&body, &meta_again));
        assert_eq!(source.calls(&page_ref("docs:/a"), CaptureLevel::Meta), 1);
        assert_eq!(source.calls(&page_ref("docs:/a"), CaptureLevel::Body), 1);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let source = Arc::new(source_with(&["docs:/a"]).with_failure(page_ref("docs:/a")));
        let cache = CaptureCache::new(source.clone());

        let err = cache
            .capture(&page_ref("docs:/a"), CaptureLevel::Meta)
            .unwrap_err();
        assert_eq!(err.page_ref, page_ref("docs:/a"));
        assert_eq!(err.level, CaptureLevel::Meta);
        assert!(cache.is_empty());

        source.heal(&page_ref("docs:/a"));
        let page = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta);

        assert!(page.is_ok());
        assert_eq!(source.total_calls(), 2);
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn test_failed_upgrade_keeps_lower_entry() {
        let source = Arc::new(source_with(&["docs:/a"]));
        let cache = CaptureCache::new(source.clone());
        let meta = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();

        source.fail(page_ref("docs:/a"));
        let upgrade = cache.capture(&page_ref("docs:/a"), CaptureLevel::Body);
        let meta_again = cache.capture(&page_ref("docs:/a"), CaptureLevel::Meta).unwrap();

        assert!(upgrade.is_err());
        assert!(Arc::ptr_eq(&meta, &meta_again));
        assert_eq!(cache.cached_level(&page_ref("docs:/a")), Some(CaptureLevel::Meta));
    }

    #[test]
    fn test_not_found_error() {
        let cache = CaptureCache::new(Arc::new(MockPageSource::new()));

        let err = cache
            .capture(&page_ref("docs:/missing"), CaptureLevel::Meta)
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Failed to capture docs:/missing at level meta: [Mock] Not found (page: docs:/missing)"
        );
    }

    #[test]
    fn test_concurrent_captures_materialize_once() {
        let source = Arc::new(source_with(&["docs:/a"]).with_delay(Duration::from_millis(20)));
        let cache = Arc::new(CaptureCache::new(source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .capture(&page_ref("docs:/a"), CaptureLevel::Meta)
                        .unwrap()
                })
            })
            .collect();

        let pages: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(source.total_calls(), 1);
        assert!(pages.iter().all(|p| Arc::ptr_eq(p, &pages[0])));
    }

    #[test]
    fn test_concurrent_mixed_levels_end_at_highest() {
        let source = Arc::new(source_with(&["docs:/a"]).with_delay(Duration::from_millis(5)));
        let cache = Arc::new(CaptureCache::new(source.clone()));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let level = if i % 2 == 0 {
                    CaptureLevel::Meta
                } else {
                    CaptureLevel::Body
                };
                thread::spawn(move || {
                    let page = cache.capture(&page_ref("docs:/a"), level).unwrap();
                    if level == CaptureLevel::Body {
                        assert!(page.body().is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(source.total_calls() <= 2);
        assert_eq!(source.calls(&page_ref("docs:/a"), CaptureLevel::Body), 1);
        assert_eq!(cache.cached_level(&page_ref("docs:/a")), Some(CaptureLevel::Body));
    }

    #[test]
    fn test_capture_multiple_preserves_order_and_isolates_failures() {
        let source = Arc::new(
            source_with(&["docs:/a", "docs:/b", "docs:/c"]).with_failure(page_ref("docs:/b")),
        );
        let cache = CaptureCache::new(source);
        let refs = vec![page_ref("docs:/c"), page_ref("docs:/b"), page_ref("docs:/a")];

        let batch = cache.capture_multiple(&refs, CaptureLevel::Meta);

        let order: Vec<_> = batch.iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(order, vec!["docs:/c", "docs:/b", "docs:/a"]);
        let captured: Vec<_> = batch.pages().map(|p| p.page_ref().to_string()).collect();
        assert_eq!(captured, vec!["docs:/c", "docs:/a"]);
        assert_eq!(batch.failures().count(), 1);
        assert!(batch.get(&page_ref("docs:/b")).unwrap().is_err());
        assert!(!batch.is_complete());
        assert!(batch.into_pages().is_err());
    }

    #[test]
    fn test_capture_multiple_deduplicates() {
        let source = Arc::new(source_with(&["docs:/a", "docs:/b"]));
        let cache = CaptureCache::new(source.clone());
        let refs = vec![page_ref("docs:/a"), page_ref("docs:/b"), page_ref("docs:/a")];

        let batch = cache.capture_multiple(&refs, CaptureLevel::Meta);

        assert_eq!(batch.len(), 2);
        assert!(batch.is_complete());
        assert_eq!(source.calls_for(&page_ref("docs:/a")), 1);
    }

    #[test]
    fn test_capture_multiple_shares_entries_with_capture() {
        let source = Arc::new(source_with(&["docs:/a", "docs:/b"]));
        let cache = CaptureCache::new(source.clone());
        let single = cache.capture(&page_ref("docs:/a"), CaptureLevel::Body).unwrap();

        let pages = cache
            .capture_multiple(&[page_ref("docs:/a"), page_ref("docs:/b")], CaptureLevel::Meta)
            .into_pages()
            .unwrap();

        assert!(Arc::ptr_eq(&pages[0], &single));
        assert_eq!(source.total_calls(), 2);
    }
}

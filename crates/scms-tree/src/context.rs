//! Request context threaded through traversal.

use scms_capture::{CaptureCache, CaptureLevel};
use scms_model::BookAccess;

/// Everything a traversal needs from the current request.
///
/// Borrowed from the request; one context may serve several tree renders
/// within the same request, sharing the capture cache.
#[derive(Clone, Copy)]
pub struct TreeContext<'a> {
    cache: &'a CaptureCache,
    books: &'a dyn BookAccess,
    capture_level: CaptureLevel,
}

impl<'a> TreeContext<'a> {
    /// Context for a request rendering at [`CaptureLevel::Body`].
    #[must_use]
    pub fn new(cache: &'a CaptureCache, books: &'a dyn BookAccess) -> Self {
        Self {
            cache,
            books,
            capture_level: CaptureLevel::Body,
        }
    }

    /// Set the fidelity the current request is rendered at.
    #[must_use]
    pub fn with_capture_level(mut self, capture_level: CaptureLevel) -> Self {
        self.capture_level = capture_level;
        self
    }

    /// Request capture cache.
    #[must_use]
    pub fn cache(&self) -> &'a CaptureCache {
        self.cache
    }

    /// Book accessibility for the current request.
    #[must_use]
    pub fn books(&self) -> &'a dyn BookAccess {
        self.books
    }

    /// Fidelity the current request is rendered at.
    #[must_use]
    pub fn capture_level(&self) -> CaptureLevel {
        self.capture_level
    }
}

impl std::fmt::Debug for TreeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeContext")
            .field("cache", self.cache)
            .field("capture_level", &self.capture_level)
            .finish_non_exhaustive()
    }
}

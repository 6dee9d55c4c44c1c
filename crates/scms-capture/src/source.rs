//! Page source trait and error types.
//!
//! A [`PageSource`] materializes pages on demand. Sources are the only place
//! where pages come from; the capture cache sits in front of them and decides
//! when a source actually needs to be called.

use std::path::PathBuf;

use scms_model::{Page, PageRef};

use crate::CaptureLevel;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Page does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Page description is malformed.
    Parse,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Source error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Page being materialized (if applicable).
    pub page_ref: Option<PageRef>,
    /// Backing file (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            page_ref: None,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach page context.
    #[must_use]
    pub fn with_page(mut self, page_ref: PageRef) -> Self {
        self.page_ref = Some(page_ref);
        self
    }

    /// Attach file context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error for a page.
    #[must_use]
    pub fn not_found(page_ref: PageRef) -> Self {
        Self::new(SourceErrorKind::NotFound).with_page(page_ref)
    }

    /// Create a parse error for a page.
    #[must_use]
    pub fn parse(page_ref: PageRef, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(SourceErrorKind::Parse)
            .with_page(page_ref)
            .with_source(err)
    }

    /// Create a source error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => SourceErrorKind::Timeout,
            _ => SourceErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Whether the page simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == SourceErrorKind::NotFound
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (page: book:/path, path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Not found",
            SourceErrorKind::PermissionDenied => "Permission denied",
            SourceErrorKind::Parse => "Malformed page",
            SourceErrorKind::Unavailable => "Unavailable",
            SourceErrorKind::Timeout => "Timeout",
            SourceErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        match (&self.page_ref, &self.path) {
            (Some(page_ref), Some(path)) => {
                write!(f, " (page: {page_ref}, path: {})", path.display())?;
            }
            (Some(page_ref), None) => write!(f, " (page: {page_ref})")?,
            (None, Some(path)) => write!(f, " (path: {})", path.display())?,
            (None, None) => {}
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Materializes pages on demand.
///
/// Implementations must return a page whose fidelity is at least `level`.
/// Returning more than requested is allowed; [`CaptureLevel::shape`] trims a
/// full page description down to exactly one level.
///
/// Sources are called from several threads at once and must be `Send + Sync`.
pub trait PageSource: Send + Sync {
    /// Materialize a page at the given fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the page doesn't exist or can't be read.
    fn materialize(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page, SourceError>;
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn page_ref(s: &str) -> PageRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_with_backend_and_page() {
        let err = SourceError::not_found(page_ref("docs:/guide")).with_backend("Fs");

        assert_eq!(err.to_string(), "[Fs] Not found (page: docs:/guide)");
    }

    #[test]
    fn test_display_with_source_and_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SourceError::io(io, Some(PathBuf::from("/srv/docs/guide.yaml")));

        assert_eq!(
            err.to_string(),
            "Permission denied: denied (path: /srv/docs/guide.yaml)"
        );
    }

    #[test]
    fn test_io_timeout() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let err = SourceError::io(io, None);

        assert_eq!(err.kind, SourceErrorKind::Timeout);
    }

    #[test]
    fn test_io_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = SourceError::io(io, None);

        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_source_chain() {
        let io = std::io::Error::other("boom");
        let err = SourceError::new(SourceErrorKind::Other).with_source(io);

        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("boom"));
    }
}

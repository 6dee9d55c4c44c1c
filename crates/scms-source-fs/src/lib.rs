//! Filesystem page source for scms.
//!
//! This crate provides [`FsPageSource`], a [`PageSource`] reading one YAML
//! document per page:
//!
//! ```text
//! <root>/<book>/index.yaml        docs:/
//! <root>/<book>/guide.yaml        docs:/guide
//! <root>/<book>/api/index.yaml    docs:/api (when api.yaml is absent)
//! ```
//!
//! A document may set `title`, `parents`, `children`, `elements` and `body`.
//! References are written as `/path` within the same book or `book:/path`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scms_capture::{CaptureCache, CaptureLevel};
//! use scms_source_fs::FsPageSource;
//!
//! let cache = CaptureCache::new(Arc::new(FsPageSource::new("pages")));
//! let page = cache.capture(&"docs:/guide".parse()?, CaptureLevel::Meta)?;
//! ```

mod document;

use std::fs;
use std::path::{Path, PathBuf};

use scms_capture::{CaptureLevel, PageSource, SourceError};
use scms_model::{BookRef, Page, PageRef};

use document::parse_document;

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Document file extension.
const EXTENSION: &str = "yaml";

/// Page source backed by a directory of YAML documents.
#[derive(Clone, Debug)]
pub struct FsPageSource {
    root: PathBuf,
}

impl FsPageSource {
    /// Create a source reading books below `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the books.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Books present on disk, sorted by name.
    ///
    /// Directories whose names are not valid book names are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the root directory cannot be read.
    pub fn books(&self) -> Result<Vec<BookRef>, SourceError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| SourceError::io(e, Some(self.root.clone())).with_backend(BACKEND))?;

        let mut books = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| SourceError::io(e, Some(self.root.clone())).with_backend(BACKEND))?;
            if !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match BookRef::new(name) {
                Ok(book) => books.push(book),
                Err(e) => tracing::warn!(error = %e, "Skipping directory"),
            }
        }
        books.sort();
        Ok(books)
    }

    /// File holding the document of `page_ref`, if any.
    fn document_path(&self, page_ref: &PageRef) -> Option<PathBuf> {
        let book_dir = self.root.join(page_ref.book().name());
        let relative = page_ref.path().trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "." || segment == "..") {
            return None;
        }

        if relative.is_empty() {
            let index = book_dir.join("index").with_extension(EXTENSION);
            return index.is_file().then_some(index);
        }

        let file = book_dir.join(format!("{relative}.{EXTENSION}"));
        if file.is_file() {
            return Some(file);
        }
        let index = book_dir.join(relative).join("index").with_extension(EXTENSION);
        index.is_file().then_some(index)
    }
}

impl PageSource for FsPageSource {
    fn materialize(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page, SourceError> {
        let path = self
            .document_path(page_ref)
            .ok_or_else(|| SourceError::not_found(page_ref.clone()).with_backend(BACKEND))?;
        tracing::debug!(page = %page_ref, path = %path.display(), %level, "Reading page");

        let content = fs::read_to_string(&path).map_err(|e| {
            SourceError::io(e, Some(path.clone()))
                .with_page(page_ref.clone())
                .with_backend(BACKEND)
        })?;

        let document =
            parse_document(&content).map_err(|e| parse_error(page_ref, &path, e))?;
        let builder = document
            .into_builder(page_ref.clone())
            .map_err(|e| parse_error(page_ref, &path, e))?;
        level
            .shape(builder)
            .build()
            .map_err(|e| parse_error(page_ref, &path, e))
    }
}

fn parse_error(
    page_ref: &PageRef,
    path: &Path,
    err: impl std::error::Error + Send + Sync + 'static,
) -> SourceError {
    SourceError::parse(page_ref.clone(), err)
        .with_path(path)
        .with_backend(BACKEND)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use scms_capture::{CaptureCache, SourceErrorKind};

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_page_source_is_send_sync() {
        assert_send_sync::<FsPageSource>();
    }

    fn page_ref(s: &str) -> PageRef {
        s.parse().unwrap()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn create_site() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(
            root,
            "docs/index.yaml",
            "title: Docs\nchildren: [/guide, /api]\n",
        );
        write(
            root,
            "docs/guide.yaml",
            concat!(
                "title: Guide\n",
                "parents: [/]\n",
                "elements:\n",
                "  - kind: diagram\n",
                "    id: flow\n",
                "    label: Flow\n",
                "body: Read me\n",
            ),
        );
        write(root, "docs/api/index.yaml", "title: API\n");
        write(root, "wiki/index.yaml", "title: Wiki\n");
        temp_dir
    }

    #[test]
    fn test_book_root_reads_index() {
        let temp_dir = create_site();
        let source = FsPageSource::new(temp_dir.path());

        let page = source
            .materialize(&page_ref("docs:/"), CaptureLevel::Meta)
            .unwrap();

        assert_eq!(page.title(), "Docs");
        assert_eq!(page.child_refs().len(), 2);
    }

    #[test]
    fn test_directory_index_fallback() {
        let temp_dir = create_site();
        let source = FsPageSource::new(temp_dir.path());

        let page = source
            .materialize(&page_ref("docs:/api"), CaptureLevel::Meta)
            .unwrap();

        assert_eq!(page.title(), "API");
    }

    #[test]
    fn test_levels_trim_document() {
        let temp_dir = create_site();
        let source = FsPageSource::new(temp_dir.path());
        let guide = page_ref("docs:/guide");

        let exists = source.materialize(&guide, CaptureLevel::PageExists).unwrap();
        let meta = source.materialize(&guide, CaptureLevel::Meta).unwrap();
        let body = source.materialize(&guide, CaptureLevel::Body).unwrap();

        assert_eq!(exists.title(), "Guide");
        assert!(exists.parent_refs().is_empty());
        assert!(exists.elements().is_empty());
        assert_eq!(meta.parent_refs().len(), 1);
        assert_eq!(meta.elements().len(), 1);
        assert_eq!(meta.body(), None);
        assert_eq!(body.body(), Some("Read me"));
    }

    #[test]
    fn test_missing_page_not_found() {
        let temp_dir = create_site();
        let source = FsPageSource::new(temp_dir.path());

        let err = source
            .materialize(&page_ref("docs:/missing"), CaptureLevel::Meta)
            .unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
        assert_eq!(err.page_ref, Some(page_ref("docs:/missing")));
    }

    #[test]
    fn test_parent_segments_not_resolved() {
        let temp_dir = create_site();
        let source = FsPageSource::new(temp_dir.path().join("docs"));

        let err = source
            .materialize(&page_ref("api:/../wiki/index"), CaptureLevel::Meta)
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let temp_dir = create_site();
        write(temp_dir.path(), "docs/broken.yaml", "title: [unclosed\n");
        let source = FsPageSource::new(temp_dir.path());

        let err = source
            .materialize(&page_ref("docs:/broken"), CaptureLevel::Meta)
            .unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::Parse);
        assert!(
            err.path
                .as_deref()
                .is_some_and(|p| p.ends_with("docs/broken.yaml"))
        );
    }

    #[test]
    fn test_books_sorted() {
        let temp_dir = create_site();
        fs::write(temp_dir.path().join("README.txt"), "not a book").unwrap();
        let source = FsPageSource::new(temp_dir.path());

        let books = source.books().unwrap();

        let names: Vec<&str> = books.iter().map(BookRef::name).collect();
        assert_eq!(names, vec!["docs", "wiki"]);
    }

    #[test]
    fn test_books_missing_root() {
        let source = FsPageSource::new("/nonexistent/scms-pages");

        let err = source.books().unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
    }

    #[test]
    fn test_capture_through_cache() {
        let temp_dir = create_site();
        let cache = CaptureCache::new(Arc::new(FsPageSource::new(temp_dir.path())));

        let meta = cache
            .capture(&page_ref("docs:/guide"), CaptureLevel::Meta)
            .unwrap();
        let again = cache
            .capture(&page_ref("docs:/guide"), CaptureLevel::PageExists)
            .unwrap();

        assert!(Arc::ptr_eq(&meta, &again));
        assert_eq!(meta.elements()[0].id(), Some("flow"));
    }
}

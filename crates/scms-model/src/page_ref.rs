//! Page identity and directional references between pages.
//!
//! # Path Convention
//!
//! Page paths are absolute within their book:
//! - `"/"` - book home page
//! - `"/guide"` - top-level page
//! - `"/guide/setup"` - nested page
//!
//! The textual form of a [`PageRef`] is `book:/path`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BookRef, ModelError};

/// Identifies a page by book and path.
///
/// Immutable value type with equality by value. Used as the capture cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageRef {
    book: BookRef,
    path: String,
}

impl PageRef {
    /// Create a page reference.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPath`] if the path is not absolute, contains
    /// empty segments, a trailing slash, or a fragment.
    pub fn new(book: BookRef, path: impl Into<String>) -> Result<Self, ModelError> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self { book, path })
    }

    /// Parse `book:/path`, or `/path` relative to `base`.
    ///
    /// Used for references written inside a page, where a bare path points to
    /// a page in the same book.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if either component is invalid.
    pub fn parse_relative(base: &BookRef, value: &str) -> Result<Self, ModelError> {
        if value.starts_with('/') {
            Self::new(base.clone(), value)
        } else {
            value.parse()
        }
    }

    /// Book containing the page.
    #[must_use]
    pub fn book(&self) -> &BookRef {
        &self.book
    }

    /// Absolute path within the book.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, or the book name for the book home page.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.path.rsplit('/').next() {
            Some(segment) if !segment.is_empty() => segment,
            _ => self.book.name(),
        }
    }
}

fn validate_path(path: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidPath {
        path: path.to_owned(),
        reason,
    };
    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if path == "/" {
        return Ok(());
    }
    if path.ends_with('/') {
        return Err(invalid("must not end with '/'"));
    }
    if path.contains("//") {
        return Err(invalid("must not contain empty segments"));
    }
    if path.contains('#') {
        return Err(invalid("must not contain a fragment"));
    }
    Ok(())
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.book, self.path)
    }
}

impl FromStr for PageRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (book, path) = s
            .split_once(':')
            .ok_or_else(|| ModelError::InvalidPageRef(s.to_owned()))?;
        Self::new(BookRef::new(book)?, path)
    }
}

impl TryFrom<String> for PageRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PageRef> for String {
    fn from(value: PageRef) -> Self {
        value.to_string()
    }
}

/// Reference from a page to one of its navigation children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildRef(PageRef);

impl ChildRef {
    /// Create a child reference.
    #[must_use]
    pub fn new(page_ref: PageRef) -> Self {
        Self(page_ref)
    }

    /// Referenced child page.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        &self.0
    }
}

/// Reference from a page to one of its navigation parents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentRef(PageRef);

impl ParentRef {
    /// Create a parent reference.
    #[must_use]
    pub fn new(page_ref: PageRef) -> Self {
        Self(page_ref)
    }

    /// Referenced parent page.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        &self.0
    }
}

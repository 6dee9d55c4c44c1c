//! Books and the accessibility predicate.
//!
//! A book groups pages under a common namespace. Whether a book can be
//! traversed in the current request is decided outside of scms and supplied
//! through [`BookAccess`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Identifier of a book.
///
/// Book names are non-empty and may not contain `:` (the separator used in
/// `book:/path` page references) or whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookRef(String);

impl BookRef {
    /// Create a book reference.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidBook`] if the name is empty or contains
    /// `:` or whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.is_empty() || name.contains(':') || name.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidBook(name));
        }
        Ok(Self(name))
    }

    /// Book name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BookRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BookRef> for String {
    fn from(value: BookRef) -> Self {
        value.0
    }
}

/// A configured book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    /// Book identity.
    pub book_ref: BookRef,
    /// URL prefix pages of this book are served under (e.g. `/docs`).
    pub prefix: String,
    /// Whether pages of this book may be captured and traversed.
    pub accessible: bool,
}

/// Error returned when book accessibility cannot be determined.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The book is not known to the access provider.
    #[error("Book not found: {0}")]
    UnknownBook(BookRef),
    /// The provider failed while checking access.
    #[error("Failed to check access to book {book}: {message}")]
    Check {
        /// Book being checked.
        book: BookRef,
        /// Provider-specific failure description.
        message: String,
    },
}

/// Externally supplied accessibility predicate.
///
/// Implementations must be side-effect free; the traversal engine may call
/// [`is_accessible`](Self::is_accessible) any number of times for the same
/// book within one request.
pub trait BookAccess: Send + Sync {
    /// Check whether pages of `book` may be captured and traversed.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] if accessibility cannot be determined.
    fn is_accessible(&self, book: &BookRef) -> Result<bool, AccessError>;
}

/// [`BookAccess`] that allows every book.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllBooksAccessible;

impl BookAccess for AllBooksAccessible {
    fn is_accessible(&self, _book: &BookRef) -> Result<bool, AccessError> {
        Ok(true)
    }
}

/// A set of accessible books. Books outside the set are inaccessible.
impl BookAccess for HashSet<BookRef> {
    fn is_accessible(&self, book: &BookRef) -> Result<bool, AccessError> {
        Ok(self.contains(book))
    }
}

impl<F> BookAccess for F
where
    F: Fn(&BookRef) -> bool + Send + Sync,
{
    fn is_accessible(&self, book: &BookRef) -> Result<bool, AccessError> {
        Ok(self(book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_ref_valid() {
        let book = BookRef::new("docs").unwrap();

        assert_eq!(book.name(), "docs");
        assert_eq!(book.to_string(), "docs");
    }

    #[test]
    fn test_book_ref_rejects_empty() {
        assert!(matches!(BookRef::new(""), Err(ModelError::InvalidBook(_))));
    }

    #[test]
    fn test_book_ref_rejects_separator_and_whitespace() {
        assert!(BookRef::new("a:b").is_err());
        assert!(BookRef::new("my book").is_err());
    }

    #[test]
    fn test_book_ref_deserialize_validates() {
        let ok: Result<BookRef, _> = serde_json::from_str("\"docs\"");
        let bad: Result<BookRef, _> = serde_json::from_str("\"\"");

        assert_eq!(ok.unwrap().name(), "docs");
        assert!(bad.is_err());
    }

    #[test]
    fn test_all_books_accessible() {
        let book = BookRef::new("private").unwrap();

        assert!(AllBooksAccessible.is_accessible(&book).unwrap());
    }

    #[test]
    fn test_hash_set_access() {
        let public = BookRef::new("public").unwrap();
        let private = BookRef::new("private").unwrap();
        let allowed: HashSet<BookRef> = [public.clone()].into_iter().collect();

        assert!(allowed.is_accessible(&public).unwrap());
        assert!(!allowed.is_accessible(&private).unwrap());
    }

    #[test]
    fn test_closure_access() {
        let access = |book: &BookRef| book.name() != "hidden";

        assert!(access.is_accessible(&BookRef::new("docs").unwrap()).unwrap());
        assert!(!access.is_accessible(&BookRef::new("hidden").unwrap()).unwrap());
    }
}

//! Registry of configured books.

use std::collections::HashMap;

use scms_model::{AccessError, Book, BookAccess, BookRef};

use crate::ConfigError;

/// Configured books, in declaration order.
///
/// Answers accessibility for the traversal engine; books that are not
/// registered are reported as [`AccessError::UnknownBook`].
#[derive(Clone, Debug, Default)]
pub struct BookRegistry {
    books: Vec<Book>,
    index: HashMap<BookRef, usize>,
}

impl BookRegistry {
    /// Create a registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a book appears twice.
    pub fn new(books: impl IntoIterator<Item = Book>) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for book in books {
            registry.insert(book)?;
        }
        Ok(registry)
    }

    /// Add a book.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the book is already registered.
    pub fn insert(&mut self, book: Book) -> Result<(), ConfigError> {
        if self.index.contains_key(&book.book_ref) {
            return Err(ConfigError::Validation(format!(
                "book {} is configured more than once",
                book.book_ref
            )));
        }
        self.index.insert(book.book_ref.clone(), self.books.len());
        self.books.push(book);
        Ok(())
    }

    /// Look up a book.
    #[must_use]
    pub fn get(&self, book: &BookRef) -> Option<&Book> {
        self.index.get(book).map(|&i| &self.books[i])
    }

    /// Books in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    /// Number of books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether no book is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl BookAccess for BookRegistry {
    fn is_accessible(&self, book: &BookRef) -> Result<bool, AccessError> {
        self.get(book)
            .map(|b| b.accessible)
            .ok_or_else(|| AccessError::UnknownBook(book.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(name: &str) -> Book {
        Book {
            book_ref: BookRef::new(name).unwrap(),
            prefix: format!("/{name}"),
            accessible: true,
        }
    }

    #[test]
    fn test_declaration_order() {
        let registry = BookRegistry::new([book("wiki"), book("docs")]).unwrap();

        let names: Vec<&str> = registry.iter().map(|b| b.book_ref.name()).collect();

        assert_eq!(names, vec!["wiki", "docs"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut registry = BookRegistry::new([book("docs")]).unwrap();

        let result = registry.insert(book("docs"));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_registry_knows_no_book() {
        let registry = BookRegistry::default();

        assert!(registry.is_empty());
        assert!(registry.is_accessible(&BookRef::new("docs").unwrap()).is_err());
    }
}

//! Model construction errors.

use crate::{BookRef, PageRef};

/// Error returned when a model value cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Book name is empty or contains a reserved character.
    #[error("Invalid book name: {0:?}")]
    InvalidBook(String),
    /// Page path does not follow the `/segment/segment` convention.
    #[error("Invalid page path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Page reference string is not of the form `book:/path`.
    #[error("Invalid page reference {0:?}: expected book:/path")]
    InvalidPageRef(String),
    /// Two elements on the same page share an id.
    #[error("Duplicate element id {id:?} on page {page_ref}")]
    DuplicateElementId {
        /// Page being built.
        page_ref: PageRef,
        /// The repeated id.
        id: String,
    },
    /// A child page is listed more than once.
    #[error("Duplicate child {child} on page {page_ref}")]
    DuplicateChild {
        /// Page being built.
        page_ref: PageRef,
        /// The repeated child.
        child: PageRef,
    },
    /// A parent page is listed more than once.
    #[error("Duplicate parent {parent} on page {page_ref}")]
    DuplicateParent {
        /// Page being built.
        page_ref: PageRef,
        /// The repeated parent.
        parent: PageRef,
    },
}

impl ModelError {
    /// Book involved in the error, if any.
    #[must_use]
    pub fn book(&self) -> Option<&BookRef> {
        match self {
            Self::DuplicateElementId { page_ref, .. }
            | Self::DuplicateChild { page_ref, .. }
            | Self::DuplicateParent { page_ref, .. } => Some(page_ref.book()),
            Self::InvalidBook(_) | Self::InvalidPath { .. } | Self::InvalidPageRef(_) => None,
        }
    }
}

//! Page graph model for scms.
//!
//! This crate provides the immutable data types that every other scms crate
//! operates on:
//!
//! - [`PageRef`]: Value identity of a page (book + path), used as cache key
//! - [`Page`]: A captured page with elements and navigation references
//! - [`Element`]: A typed content unit owned by exactly one page
//! - [`Node`]: Either a page or an element, compared by reference identity
//! - [`BookAccess`]: Externally supplied "is this book accessible" predicate
//!
//! Pages are assembled with [`PageBuilder`] and never mutated afterwards.
//!
//! # Example
//!
//! ```
//! use scms_model::{ElementBuilder, ElementKind, PageBuilder, PageRef};
//!
//! # fn main() -> Result<(), scms_model::ModelError> {
//! let page_ref: PageRef = "docs:/guide".parse()?;
//! let page = PageBuilder::new(page_ref)
//!     .title("Guide")
//!     .child("docs:/guide/setup".parse()?)
//!     .element(ElementBuilder::new(ElementKind::Diagram, "Overview").id("overview"))
//!     .build()?;
//!
//! assert_eq!(page.elements().len(), 1);
//! assert_eq!(page.child_refs()[0].page_ref().path(), "/guide/setup");
//! # Ok(())
//! # }
//! ```

mod book;
mod element;
mod error;
mod node;
mod page;
mod page_ref;

pub use book::{AccessError, AllBooksAccessible, Book, BookAccess, BookRef};
pub use element::{Element, ElementBuilder, ElementKind};
pub use error::ModelError;
pub use node::{Node, NodeKey, NodeTag};
pub use page::{Page, PageBuilder};
pub use page_ref::{ChildRef, PageRef, ParentRef};

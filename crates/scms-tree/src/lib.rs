//! Page graph traversal and tree rendering for scms.
//!
//! Trees are rendered in two passes over the page graph:
//!
//! 1. [`find_matches`] walks depth-first from a root node and computes the
//!    [`MatchSet`] of nodes whose subtree contains a filter match. Child
//!    pages are captured at metadata level through the request's
//!    [`CaptureCache`](scms_capture::CaptureCache) and skipped when their
//!    book is not accessible. Cycles are pruned and reported.
//! 2. [`render_tree`] walks again from the same root, keeping members only,
//!    and produces a [`RenderedTree`] of [`TreeNode`]s with links. With an
//!    [`OrdinalResolver`], links become same-document anchors.
//!
//! [`element_filter_tree`] and [`navigation_tree`] combine both passes;
//! [`numbered_index`] turns a rendered tree into an outline.
//!
//! # Example
//!
//! ```ignore
//! use scms_tree::{KindFilter, TreeContext, element_filter_tree};
//! use scms_model::{AllBooksAccessible, ElementKind, Node};
//!
//! let ctx = TreeContext::new(&cache, &AllBooksAccessible);
//! let root = Node::Page(cache.capture(&page_ref, CaptureLevel::Meta)?);
//! let tree = element_filter_tree(&ctx, &KindFilter::new(ElementKind::Diagram), &root, false, None)?;
//! ```

mod context;
mod error;
mod filter;
mod index;
mod matches;
mod ordinal;
mod render;
mod renderers;

pub use context::TreeContext;
pub use error::TreeError;
pub use filter::{AllPages, ElementFilter, FilterError, FnFilter, KindFilter, from_fn};
pub use index::{IndexEntry, numbered_index};
pub use matches::{CycleEdge, MatchOutcome, MatchSet, find_matches};
pub use ordinal::{OrdinalResolver, PageIndex};
pub use render::{NodeLink, RenderedTree, TreeNode, render_tree};
pub use renderers::{element_filter_tree, navigation_tree};

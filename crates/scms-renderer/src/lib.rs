//! HTML markup layer for scms page trees.
//!
//! This crate turns [`RenderedTree`](scms_tree::RenderedTree)s into nested
//! HTML lists and holds the per-application registry of views, themes and
//! page assets:
//!
//! - [`AppContext`]: Registered views, themes, scripts and CSS class resolvers
//! - [`LinkBuilder`]: Page URLs and same-document anchors
//! - [`write_tree`]: Tree markup with classes resolved per [`NodeTag`](scms_model::NodeTag)
//! - [`applicable_parents`]: Parent pages offered for navigation under a view
//!
//! # Example
//!
//! ```ignore
//! use scms_renderer::{AppContext, LinkBuilder, render_tree_html};
//!
//! let app = AppContext::builder().build();
//! let links = LinkBuilder::new("/site");
//! let html = render_tree_html(&app, &links, &tree);
//! ```

mod context;
mod error;
mod html;
mod parents;
mod view;

pub use context::{AppContext, AppContextBuilder, CssClassResolver};
pub use error::{RegistryError, ResolveError};
pub use html::{LinkBuilder, escape_html, render_tree_html, write_tree};
pub use parents::applicable_parents;
pub use view::{DEFAULT_THEME_NAME, DEFAULT_VIEW_NAME, StaticView, Theme, View, ViewGroup};

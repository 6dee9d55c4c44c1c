//! Views and themes.

use std::cmp::Ordering;

use scms_model::Page;

/// Name of the view used when a request names none.
pub const DEFAULT_VIEW_NAME: &str = "content";

/// Name of the theme used when no other theme is registered.
pub const DEFAULT_THEME_NAME: &str = "base";

/// Coarse grouping of views, listed in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewGroup {
    /// Views whose content does not depend on the page tree.
    Fixed,
    /// Views whose content varies with the page and its descendants.
    Variable,
}

/// A way of presenting a page.
pub trait View: Send + Sync {
    /// Unique name, used in the `view` request parameter.
    fn name(&self) -> &str;

    /// Display name.
    fn display(&self) -> &str;

    /// Group for ordering in view listings.
    fn group(&self) -> ViewGroup;

    /// Whether the view makes sense for `page`.
    fn is_applicable(&self, page: &Page) -> bool {
        let _ = page;
        true
    }
}

/// Orders views by group, then display name, then name.
pub(crate) fn compare_views(a: &dyn View, b: &dyn View) -> Ordering {
    a.group()
        .cmp(&b.group())
        .then_with(|| a.display().cmp(b.display()))
        .then_with(|| a.name().cmp(b.name()))
}

/// A view defined by its name, display name and group alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticView {
    name: String,
    display: String,
    group: ViewGroup,
    requires_children: bool,
}

impl StaticView {
    /// Create a view applicable to every page.
    #[must_use]
    pub fn new(name: impl Into<String>, display: impl Into<String>, group: ViewGroup) -> Self {
        Self {
            name: name.into(),
            display: display.into(),
            group,
            requires_children: false,
        }
    }

    /// Restrict the view to pages with child pages.
    #[must_use]
    pub fn requires_children(mut self) -> Self {
        self.requires_children = true;
        self
    }
}

impl View for StaticView {
    fn name(&self) -> &str {
        &self.name
    }

    fn display(&self) -> &str {
        &self.display
    }

    fn group(&self) -> ViewGroup {
        self.group
    }

    fn is_applicable(&self, page: &Page) -> bool {
        !self.requires_children || !page.child_refs().is_empty()
    }
}

/// A page theme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    name: String,
    display: String,
}

impl Theme {
    /// Create a theme.
    #[must_use]
    pub fn new(name: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display: display.into(),
        }
    }

    /// Unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Whether this is the fallback theme.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_THEME_NAME
    }
}

//! Application context.
//!
//! [`AppContext`] holds every registry the markup layer reads at request
//! time: views, themes, CSS links, scripts, head includes and the CSS class
//! resolvers for links and list items. It is assembled once at startup with
//! [`AppContextBuilder`] and immutable afterwards, so requests share it
//! without locking.

use std::collections::HashMap;
use std::sync::Arc;

use scms_model::{Node, NodeTag};

use crate::error::{RegistryError, ResolveError};
use crate::view::{DEFAULT_VIEW_NAME, Theme, View, compare_views};

/// Resolves a CSS class for a node.
///
/// Returning `None` lets resolvers registered for more general node tags
/// decide.
pub trait CssClassResolver: Send + Sync {
    /// CSS class for `node`, if this resolver has one.
    fn css_class(&self, node: &Node) -> Option<String>;
}

impl<F> CssClassResolver for F
where
    F: Fn(&Node) -> Option<String> + Send + Sync,
{
    fn css_class(&self, node: &Node) -> Option<String> {
        self(node)
    }
}

struct FixedClass(String);

impl CssClassResolver for FixedClass {
    fn css_class(&self, _node: &Node) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Immutable registries shared by all requests.
pub struct AppContext {
    views: Vec<Arc<dyn View>>,
    view_index: HashMap<String, usize>,
    sorted_views: Vec<usize>,
    themes: Vec<Theme>,
    css_links: Vec<String>,
    scripts: Vec<(String, String)>,
    head_includes: Vec<String>,
    link_css: HashMap<NodeTag, Box<dyn CssClassResolver>>,
    list_item_css: HashMap<NodeTag, Box<dyn CssClassResolver>>,
}

impl AppContext {
    /// Start building a context.
    #[must_use]
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// Views in registration order.
    pub fn views_by_name(&self) -> impl Iterator<Item = &Arc<dyn View>> {
        self.views.iter()
    }

    /// Views ordered by group, then display name.
    pub fn views(&self) -> impl Iterator<Item = &Arc<dyn View>> {
        self.sorted_views.iter().map(|&i| &self.views[i])
    }

    /// View by name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&Arc<dyn View>> {
        self.view_index.get(name).map(|&i| &self.views[i])
    }

    /// Themes in registration order.
    #[must_use]
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// CSS links in registration order.
    #[must_use]
    pub fn css_links(&self) -> &[String] {
        &self.css_links
    }

    /// Scripts as `(name, src)` in registration order.
    #[must_use]
    pub fn scripts(&self) -> &[(String, String)] {
        &self.scripts
    }

    /// Head includes in registration order.
    #[must_use]
    pub fn head_includes(&self) -> &[String] {
        &self.head_includes
    }

    /// Select the view for a request.
    ///
    /// `requested` is the value of the request's `view` parameter. Unknown
    /// names fall back to the default view.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the default view is named explicitly or
    /// is not registered.
    pub fn resolve_view(&self, requested: Option<&str>) -> Result<&Arc<dyn View>, ResolveError> {
        if let Some(name) = requested {
            if name == DEFAULT_VIEW_NAME {
                return Err(ResolveError::DefaultViewNamed(name.to_owned()));
            }
            if let Some(view) = self.view(name) {
                return Ok(view);
            }
            tracing::debug!(view = name, "Unknown view, using default");
        }
        self.view(DEFAULT_VIEW_NAME)
            .ok_or_else(|| ResolveError::DefaultViewMissing(DEFAULT_VIEW_NAME.to_owned()))
    }

    /// Select the theme for a request.
    ///
    /// Picks the first registered non-default theme, else the default theme.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoThemes`] if no theme is registered.
    pub fn resolve_theme(&self) -> Result<&Theme, ResolveError> {
        self.themes
            .iter()
            .find(|theme| !theme.is_default())
            .or_else(|| self.themes.iter().find(|theme| theme.is_default()))
            .ok_or(ResolveError::NoThemes)
    }

    /// CSS class for links to `node`.
    #[must_use]
    pub fn link_css_class(&self, node: &Node) -> Option<String> {
        resolve_class(&self.link_css, node)
    }

    /// CSS class for list items showing `node`.
    #[must_use]
    pub fn list_item_css_class(&self, node: &Node) -> Option<String> {
        resolve_class(&self.list_item_css, node)
    }
}

/// First class offered by a resolver for the node's tag or one of its
/// ancestors, most specific first.
fn resolve_class(
    resolvers: &HashMap<NodeTag, Box<dyn CssClassResolver>>,
    node: &Node,
) -> Option<String> {
    node.tag()
        .lineage()
        .filter_map(|tag| resolvers.get(&tag))
        .find_map(|resolver| resolver.css_class(node))
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("views", &self.views.iter().map(|v| v.name()).collect::<Vec<_>>())
            .field("themes", &self.themes)
            .field("css_links", &self.css_links)
            .field("scripts", &self.scripts)
            .field("head_includes", &self.head_includes)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppContext`].
///
/// Registration methods reject duplicates; nothing can be registered once
/// the context is built.
#[derive(Default)]
pub struct AppContextBuilder {
    views: Vec<Arc<dyn View>>,
    view_index: HashMap<String, usize>,
    themes: Vec<Theme>,
    css_links: Vec<String>,
    scripts: Vec<(String, String)>,
    head_includes: Vec<String>,
    link_css: HashMap<NodeTag, Box<dyn CssClassResolver>>,
    list_item_css: HashMap<NodeTag, Box<dyn CssClassResolver>>,
}

impl std::fmt::Debug for AppContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContextBuilder")
            .field("views", &self.views.iter().map(|v| v.name()).collect::<Vec<_>>())
            .field("themes", &self.themes)
            .field("css_links", &self.css_links)
            .field("scripts", &self.scripts)
            .field("head_includes", &self.head_includes)
            .finish_non_exhaustive()
    }
}

impl AppContextBuilder {
    /// Register a view.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateView`] if the name is taken.
    pub fn add_view(&mut self, view: impl View + 'static) -> Result<&mut Self, RegistryError> {
        let name = view.name().to_owned();
        if self.view_index.contains_key(&name) {
            return Err(RegistryError::DuplicateView(name));
        }
        self.view_index.insert(name, self.views.len());
        self.views.push(Arc::new(view));
        Ok(self)
    }

    /// Register a theme.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTheme`] if the name is taken.
    pub fn add_theme(&mut self, theme: Theme) -> Result<&mut Self, RegistryError> {
        if self.themes.iter().any(|t| t.name() == theme.name()) {
            return Err(RegistryError::DuplicateTheme(theme.name().to_owned()));
        }
        self.themes.push(theme);
        Ok(self)
    }

    /// Register a stylesheet link.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCssLink`] if already registered.
    pub fn add_css_link(&mut self, href: impl Into<String>) -> Result<&mut Self, RegistryError> {
        let href = href.into();
        if self.css_links.contains(&href) {
            return Err(RegistryError::DuplicateCssLink(href));
        }
        self.css_links.push(href);
        Ok(self)
    }

    /// Register a script.
    ///
    /// A name may be registered again with the same src. A src may not be
    /// registered under two names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on a conflicting name or src.
    pub fn add_script(
        &mut self,
        name: impl Into<String>,
        src: impl Into<String>,
    ) -> Result<&mut Self, RegistryError> {
        let (name, src) = (name.into(), src.into());
        if let Some((_, existing)) = self.scripts.iter().find(|(n, _)| *n == name) {
            if *existing != src {
                return Err(RegistryError::ScriptSrcMismatch {
                    name,
                    src,
                    existing: existing.clone(),
                });
            }
            return Ok(self);
        }
        if let Some((existing_name, _)) = self.scripts.iter().find(|(_, s)| *s == src) {
            return Err(RegistryError::DuplicateScriptSrc {
                src,
                existing_name: existing_name.clone(),
            });
        }
        self.scripts.push((name, src));
        Ok(self)
    }

    /// Register a head include.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateHeadInclude`] if already registered.
    pub fn add_head_include(
        &mut self,
        include: impl Into<String>,
    ) -> Result<&mut Self, RegistryError> {
        let include = include.into();
        if self.head_includes.contains(&include) {
            return Err(RegistryError::DuplicateHeadInclude(include));
        }
        self.head_includes.push(include);
        Ok(self)
    }

    /// Register a link CSS class resolver for a node tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateLinkCssClass`] if the tag has one.
    pub fn add_link_css_class_resolver(
        &mut self,
        tag: NodeTag,
        resolver: impl CssClassResolver + 'static,
    ) -> Result<&mut Self, RegistryError> {
        if self.link_css.contains_key(&tag) {
            return Err(RegistryError::DuplicateLinkCssClass(tag));
        }
        self.link_css.insert(tag, Box::new(resolver));
        Ok(self)
    }

    /// Register a fixed link CSS class for a node tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateLinkCssClass`] if the tag has one.
    pub fn add_link_css_class(
        &mut self,
        tag: NodeTag,
        class: impl Into<String>,
    ) -> Result<&mut Self, RegistryError> {
        self.add_link_css_class_resolver(tag, FixedClass(class.into()))
    }

    /// Register a list item CSS class resolver for a node tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateListItemCssClass`] if the tag has
    /// one.
    pub fn add_list_item_css_class_resolver(
        &mut self,
        tag: NodeTag,
        resolver: impl CssClassResolver + 'static,
    ) -> Result<&mut Self, RegistryError> {
        if self.list_item_css.contains_key(&tag) {
            return Err(RegistryError::DuplicateListItemCssClass(tag));
        }
        self.list_item_css.insert(tag, Box::new(resolver));
        Ok(self)
    }

    /// Register a fixed list item CSS class for a node tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateListItemCssClass`] if the tag has
    /// one.
    pub fn add_list_item_css_class(
        &mut self,
        tag: NodeTag,
        class: impl Into<String>,
    ) -> Result<&mut Self, RegistryError> {
        self.add_list_item_css_class_resolver(tag, FixedClass(class.into()))
    }

    /// Freeze the registries.
    #[must_use]
    pub fn build(self) -> AppContext {
        let mut sorted_views: Vec<usize> = (0..self.views.len()).collect();
        sorted_views.sort_by(|&a, &b| compare_views(&*self.views[a], &*self.views[b]));

        if self.themes.is_empty() {
            tracing::warn!("No themes registered");
        }

        AppContext {
            views: self.views,
            view_index: self.view_index,
            sorted_views,
            themes: self.themes,
            css_links: self.css_links,
            scripts: self.scripts,
            head_includes: self.head_includes,
            link_css: self.link_css,
            list_item_css: self.list_item_css,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scms_model::{ElementBuilder, ElementKind, PageBuilder};

    use super::*;
    use crate::view::{StaticView, ViewGroup};

    static_assertions::assert_impl_all!(AppContext: Send, Sync);

    fn content_view() -> StaticView {
        StaticView::new("content", "Content", ViewGroup::Fixed)
    }

    fn diagram_node() -> Node {
        let page = PageBuilder::new("docs:/a".parse().unwrap())
            .element(ElementBuilder::new(ElementKind::Diagram, "D").id("d"))
            .build()
            .unwrap();
        Node::Element(Arc::clone(&page.child_elements()[0]))
    }

    fn page_node() -> Node {
        Node::Page(Arc::new(
            PageBuilder::new("docs:/a".parse().unwrap()).build().unwrap(),
        ))
    }

    #[test]
    fn test_duplicate_view_rejected() {
        let mut builder = AppContext::builder();
        builder.add_view(content_view()).unwrap();

        let err = builder.add_view(content_view()).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateView(name) if name == "content"));
    }

    #[test]
    fn test_views_sorted_by_group_then_display() {
        let mut builder = AppContext::builder();
        builder
            .add_view(StaticView::new("tree", "Tree", ViewGroup::Variable))
            .unwrap()
            .add_view(content_view())
            .unwrap()
            .add_view(StaticView::new("all", "All Pages", ViewGroup::Fixed))
            .unwrap();
        let app = builder.build();

        let sorted: Vec<_> = app.views().map(|v| v.name().to_owned()).collect();
        let by_name: Vec<_> = app.views_by_name().map(|v| v.name().to_owned()).collect();

        assert_eq!(sorted, vec!["all", "content", "tree"]);
        assert_eq!(by_name, vec!["tree", "content", "all"]);
    }

    #[test]
    fn test_resolve_view() {
        let mut builder = AppContext::builder();
        builder
            .add_view(content_view())
            .unwrap()
            .add_view(StaticView::new("tree", "Tree", ViewGroup::Variable))
            .unwrap();
        let app = builder.build();

        assert_eq!(app.resolve_view(None).unwrap().name(), "content");
        assert_eq!(app.resolve_view(Some("tree")).unwrap().name(), "tree");
        assert_eq!(app.resolve_view(Some("unknown")).unwrap().name(), "content");
        assert!(matches!(
            app.resolve_view(Some("content")),
            Err(ResolveError::DefaultViewNamed(_))
        ));
    }

    #[test]
    fn test_resolve_view_without_default() {
        let app = AppContext::builder().build();

        assert!(matches!(
            app.resolve_view(None),
            Err(ResolveError::DefaultViewMissing(_))
        ));
    }

    #[test]
    fn test_resolve_theme_prefers_first_non_default() {
        let mut builder = AppContext::builder();
        builder
            .add_theme(Theme::new("base", "Base"))
            .unwrap()
            .add_theme(Theme::new("dark", "Dark"))
            .unwrap()
            .add_theme(Theme::new("light", "Light"))
            .unwrap();
        let app = builder.build();

        assert_eq!(app.resolve_theme().unwrap().name(), "dark");
    }

    #[test]
    fn test_resolve_theme_falls_back_to_default() {
        let mut builder = AppContext::builder();
        builder.add_theme(Theme::new("base", "Base")).unwrap();
        let app = builder.build();

        assert_eq!(app.resolve_theme().unwrap().name(), "base");
        assert!(matches!(
            AppContext::builder().build().resolve_theme(),
            Err(ResolveError::NoThemes)
        ));
    }

    #[test]
    fn test_duplicate_theme_rejected() {
        let mut builder = AppContext::builder();
        builder.add_theme(Theme::new("base", "Base")).unwrap();

        assert!(builder.add_theme(Theme::new("base", "Other")).is_err());
    }

    #[test]
    fn test_script_registration_rules() {
        let mut builder = AppContext::builder();
        builder.add_script("jquery", "/js/jquery.js").unwrap();

        builder.add_script("jquery", "/js/jquery.js").unwrap();
        let mismatch = builder.add_script("jquery", "/js/jquery-3.js").unwrap_err();
        let shared = builder.add_script("jq", "/js/jquery.js").unwrap_err();

        assert!(matches!(mismatch, RegistryError::ScriptSrcMismatch { .. }));
        assert!(matches!(shared, RegistryError::DuplicateScriptSrc { .. }));
        assert_eq!(
            builder.build().scripts(),
            &[("jquery".to_owned(), "/js/jquery.js".to_owned())]
        );
    }

    #[test]
    fn test_css_links_and_head_includes_unique_in_order() {
        let mut builder = AppContext::builder();
        builder
            .add_css_link("/b.css")
            .unwrap()
            .add_css_link("/a.css")
            .unwrap()
            .add_head_include("/head.html")
            .unwrap();

        assert!(builder.add_css_link("/a.css").is_err());
        assert!(builder.add_head_include("/head.html").is_err());
        let app = builder.build();
        assert_eq!(app.css_links(), &["/b.css", "/a.css"]);
        assert_eq!(app.head_includes(), &["/head.html"]);
    }

    #[test]
    fn test_css_class_falls_back_through_lineage() {
        let mut builder = AppContext::builder();
        builder
            .add_list_item_css_class(NodeTag::Element, "element-item")
            .unwrap()
            .add_list_item_css_class(NodeTag::Node, "node-item")
            .unwrap()
            .add_link_css_class(NodeTag::Diagram, "diagram-link")
            .unwrap();
        let app = builder.build();

        assert_eq!(
            app.list_item_css_class(&diagram_node()).as_deref(),
            Some("element-item")
        );
        assert_eq!(
            app.list_item_css_class(&page_node()).as_deref(),
            Some("node-item")
        );
        assert_eq!(
            app.link_css_class(&diagram_node()).as_deref(),
            Some("diagram-link")
        );
        assert_eq!(app.link_css_class(&page_node()), None);
    }

    #[test]
    fn test_resolver_returning_none_defers_to_ancestor() {
        let mut builder = AppContext::builder();
        builder
            .add_list_item_css_class_resolver(NodeTag::Diagram, |node: &Node| {
                (node.id() == Some("special")).then(|| "special".to_owned())
            })
            .unwrap()
            .add_list_item_css_class(NodeTag::Element, "element-item")
            .unwrap();
        let app = builder.build();

        assert_eq!(
            app.list_item_css_class(&diagram_node()).as_deref(),
            Some("element-item")
        );
    }

    #[test]
    fn test_duplicate_css_class_rejected() {
        let mut builder = AppContext::builder();
        builder.add_link_css_class(NodeTag::Page, "a").unwrap();

        let err = builder.add_link_css_class(NodeTag::Page, "b").unwrap_err();

        assert_eq!(err.to_string(), "Link CSS class already registered: page");
    }
}

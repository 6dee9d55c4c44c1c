//! CLI command implementations.

pub(crate) mod index;
pub(crate) mod nav;
pub(crate) mod parents;
pub(crate) mod render;
pub(crate) mod tree;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use scms_capture::{CaptureCache, CaptureLevel};
use scms_config::{BookRegistry, CliSettings, Config};
use scms_model::{Book, BookAccess, NodeTag, Page, PageRef};
use scms_renderer::{
    AppContext, DEFAULT_THEME_NAME, DEFAULT_VIEW_NAME, LinkBuilder, RegistryError, StaticView,
    Theme, ViewGroup,
};
use scms_source_fs::FsPageSource;
use scms_tree::TreeContext;

use crate::error::CliError;

pub(crate) use index::IndexArgs;
pub(crate) use nav::NavArgs;
pub(crate) use parents::ParentsArgs;
pub(crate) use tree::TreeArgs;

/// Arguments shared by all commands.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover scms.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Page source directory (overrides config).
    #[arg(short, long, global = true)]
    pub source_dir: Option<PathBuf>,

    /// URL context path (overrides config).
    #[arg(long, global = true)]
    pub context_path: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Everything one request needs: configuration, books, capture cache and
/// markup registries.
pub(crate) struct Session {
    config: Config,
    books: BookRegistry,
    cache: CaptureCache,
    links: LinkBuilder,
    app: AppContext,
}

impl Session {
    /// Load configuration and open the page source.
    pub(crate) fn open(global: &GlobalArgs, include_elements: bool) -> Result<Self, CliError> {
        let settings = CliSettings {
            source_dir: global.source_dir.clone(),
            context_path: global.context_path.clone(),
            include_elements: include_elements.then_some(true),
        };
        let config = Config::load(global.config.as_deref(), Some(&settings))?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, CliError> {
        let source = FsPageSource::new(config.content_resolved.source_dir.clone());
        let books = book_registry(&config, &source)?;

        let mut links = LinkBuilder::new(config.render.context_path.clone());
        for book in books.iter() {
            links = links.with_book_prefix(book.book_ref.clone(), book.prefix.clone());
        }

        Ok(Self {
            cache: CaptureCache::new(Arc::new(source)),
            app: app_context()?,
            links,
            books,
            config,
        })
    }

    /// Traversal context at `level`.
    pub(crate) fn context(&self, level: CaptureLevel) -> TreeContext<'_> {
        TreeContext::new(&self.cache, &self.books).with_capture_level(level)
    }

    /// Capture a page through the request cache.
    ///
    /// Pages in inaccessible books are refused without being captured.
    pub(crate) fn capture(
        &self,
        page_ref: &PageRef,
        level: CaptureLevel,
    ) -> Result<Arc<Page>, CliError> {
        if !self.books.is_accessible(page_ref.book())? {
            return Err(CliError::Inaccessible(page_ref.clone()));
        }
        Ok(self.cache.capture(page_ref, level)?)
    }

    pub(crate) fn cache(&self) -> &CaptureCache {
        &self.cache
    }

    pub(crate) fn books(&self) -> &BookRegistry {
        &self.books
    }

    pub(crate) fn links(&self) -> &LinkBuilder {
        &self.links
    }

    pub(crate) fn app(&self) -> &AppContext {
        &self.app
    }

    /// Whether trees list elements below their pages.
    pub(crate) fn include_elements(&self) -> bool {
        self.config.render.include_elements
    }
}

/// Configured books, or every book on disk when none are configured.
fn book_registry(config: &Config, source: &FsPageSource) -> Result<BookRegistry, CliError> {
    let registry = config.book_registry()?;
    if !registry.is_empty() {
        return Ok(registry);
    }

    let books = source.books()?;
    tracing::info!(count = books.len(), "No books configured, using books on disk");
    Ok(BookRegistry::new(books.into_iter().map(|book_ref| Book {
        prefix: format!("/{book_ref}"),
        book_ref,
        accessible: true,
    }))?)
}

/// Built-in views, theme and tree CSS classes.
fn app_context() -> Result<AppContext, RegistryError> {
    let mut builder = AppContext::builder();
    builder
        .add_view(StaticView::new(DEFAULT_VIEW_NAME, "Content", ViewGroup::Fixed))?
        .add_view(StaticView::new("tree", "Page Tree", ViewGroup::Variable).requires_children())?
        .add_theme(Theme::new(DEFAULT_THEME_NAME, "Base"))?
        .add_list_item_css_class(NodeTag::Page, "tree-page")?
        .add_list_item_css_class(NodeTag::Element, "tree-element")?
        .add_link_css_class(NodeTag::Node, "tree-link")?;
    Ok(builder.build())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_uses_configured_books() {
        let site = testing::site();
        let session = testing::session(site.path());

        assert_eq!(session.books().len(), 2);
        assert_eq!(
            session.links().page_url(&"docs:/guide".parse().unwrap()),
            "/site/docs/guide"
        );
    }

    #[test]
    fn test_session_discovers_books_on_disk() {
        let site = testing::site();
        std::fs::write(site.path().join("scms.toml"), "").unwrap();

        let session = testing::session(site.path());

        let names: Vec<&str> = session
            .books()
            .iter()
            .map(|b| b.book_ref.name())
            .collect();
        assert_eq!(names, vec!["docs", "secret"]);
        assert!(session.books().iter().all(|b| b.accessible));
    }

    #[test]
    fn test_capture_refuses_inaccessible_book() {
        let site = testing::site();
        let session = testing::session(site.path());

        let err = session
            .capture(&"secret:/".parse().unwrap(), CaptureLevel::Meta)
            .unwrap_err();

        assert!(matches!(err, CliError::Inaccessible(_)));
        assert_eq!(session.cache().len(), 0);
    }

    #[test]
    fn test_capture_unknown_book_fails() {
        let site = testing::site();
        let session = testing::session(site.path());

        let err = session
            .capture(&"wiki:/".parse().unwrap(), CaptureLevel::Meta)
            .unwrap_err();

        assert!(matches!(err, CliError::Access(_)));
    }

    #[test]
    fn test_app_context_views() {
        let app = app_context().unwrap();

        let names: Vec<&str> = app.views().map(|v| v.name()).collect();

        assert_eq!(names, vec![DEFAULT_VIEW_NAME, "tree"]);
        assert_eq!(app.resolve_theme().unwrap().name(), DEFAULT_THEME_NAME);
    }
}

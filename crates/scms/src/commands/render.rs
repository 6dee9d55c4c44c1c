//! Shared tree rendering for the `tree` and `nav` commands.

use clap::{Args, ValueEnum};
use scms_capture::CaptureLevel;
use scms_model::{ElementKind, Node, PageRef};
use scms_renderer::render_tree_html;
use scms_tree::{
    KindFilter, OrdinalResolver, PageIndex, RenderedTree, TreeContext, TreeError,
    element_filter_tree, navigation_tree,
};

use super::{GlobalArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Output format of a rendered tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Nested HTML lists.
    #[default]
    Html,
    /// The tree, its page links and pruned cycles as JSON.
    Json,
}

/// Which tree to render.
#[derive(Clone, Copy, Debug)]
pub(crate) enum TreeSpec {
    /// Pages containing elements of a kind.
    Elements(ElementKind),
    /// Every page.
    Navigation,
}

impl TreeSpec {
    pub(crate) fn render(
        self,
        ctx: &TreeContext<'_>,
        root: &Node,
        include_elements: bool,
        ordinals: Option<&mut dyn OrdinalResolver>,
    ) -> Result<Option<RenderedTree>, TreeError> {
        match self {
            Self::Elements(kind) => {
                element_filter_tree(ctx, &KindFilter::new(kind), root, include_elements, ordinals)
            }
            Self::Navigation => navigation_tree(ctx, root, include_elements, ordinals),
        }
    }
}

/// Arguments for rendering a tree.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Root page (`book:/path`).
    page: PageRef,

    /// List matching elements below their pages (overrides config).
    #[arg(long)]
    include_elements: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,

    /// Capture level of the request (page_exists, meta or body).
    #[arg(long, default_value_t = CaptureLevel::Body)]
    level: CaptureLevel,

    /// Link entries as numbered anchors into a single document.
    #[arg(long)]
    indexed: bool,
}

impl RenderArgs {
    /// Render the tree described by `spec` and print it.
    pub(crate) fn run(
        &self,
        global: &GlobalArgs,
        spec: TreeSpec,
        output: &Output,
    ) -> Result<(), CliError> {
        let session = Session::open(global, self.include_elements)?;

        let Some(tree) = self.render(&session, spec)? else {
            output.info(&format!("Nothing to render below {}", self.page));
            return Ok(());
        };
        for cycle in tree.cycles() {
            output.warning(&format!("Cycle pruned: {} -> {}", cycle.from, cycle.to));
        }
        if self.format == Format::Html && !tree.emit_markup() {
            output.info(&format!(
                "Markup is rendered at level body only; listing page links at level {}",
                self.level
            ));
        }

        output.result(&self.format(&session, &tree)?);
        Ok(())
    }

    fn render(&self, session: &Session, spec: TreeSpec) -> Result<Option<RenderedTree>, CliError> {
        let root = Node::Page(session.capture(&self.page, CaptureLevel::Meta)?);
        let ctx = session.context(self.level);
        let include_elements = session.include_elements();

        let mut index = PageIndex::new();
        let ordinals: Option<&mut dyn OrdinalResolver> = if self.indexed {
            Some(&mut index)
        } else {
            None
        };
        Ok(spec.render(&ctx, &root, include_elements, ordinals)?)
    }

    fn format(&self, session: &Session, tree: &RenderedTree) -> Result<String, CliError> {
        match self.format {
            Format::Json => Ok(serde_json::to_string_pretty(tree)?),
            Format::Html if tree.emit_markup() => {
                Ok(render_tree_html(session.app(), session.links(), tree))
            }
            Format::Html => Ok(tree
                .page_links()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

//! Render pass: from a match set to a nested tree.
//!
//! [`render_tree`] walks the graph a second time from the same root and keeps
//! only children that are members of the [`MatchSet`], in the order the graph
//! declares them: child elements first (when elements are included), then
//! child pages. Everything below a non-member is pruned with it.
//!
//! Child pages are resolved from the pages the match pass descended, so the
//! render pass neither captures nor checks accessibility again.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use scms_model::{Node, PageRef};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::{CycleEdge, MatchSet, OrdinalResolver, TreeContext, TreeError};

/// Where a tree entry points to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeLink {
    /// Anchor into the current document, for indexed renders.
    Anchor {
        /// Ordinal of the target page.
        ordinal: usize,
        /// Element id within the page.
        fragment: Option<String>,
    },
    /// Another page, optionally an element on it.
    Page {
        /// Target page.
        page_ref: PageRef,
        /// Element id within the page.
        fragment: Option<String>,
    },
}

impl NodeLink {
    /// Anchor name, without the leading `#`.
    ///
    /// `page-<ordinal>` for pages and `page-<ordinal>-<id>` for elements.
    #[must_use]
    pub fn anchor(&self) -> Option<String> {
        match self {
            Self::Anchor {
                ordinal,
                fragment: Some(id),
            } => Some(format!("page-{ordinal}-{id}")),
            Self::Anchor {
                ordinal,
                fragment: None,
            } => Some(format!("page-{ordinal}")),
            Self::Page { .. } => None,
        }
    }

    /// Display suffix for indexed renders, e.g. `[3]` for ordinal 2.
    #[must_use]
    pub fn ordinal_label(&self) -> Option<String> {
        match self {
            Self::Anchor { ordinal, .. } => Some(format!("[{}]", ordinal + 1)),
            Self::Page { .. } => None,
        }
    }
}

/// One entry of a rendered tree.
#[derive(Clone, Debug)]
pub struct TreeNode {
    node: Node,
    link: NodeLink,
    children: Vec<TreeNode>,
}

impl TreeNode {
    /// Page or element shown by this entry.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Link target.
    #[must_use]
    pub fn link(&self) -> &NodeLink {
        &self.link
    }

    /// Nested entries, in graph order.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.node.label()
    }

    /// Entries of this subtree in pre-order, this entry first.
    pub fn walk(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TreeNode", 6)?;
        state.serialize_field("tag", self.node.tag().as_str())?;
        state.serialize_field("label", self.label())?;
        state.serialize_field("page", self.node.page_ref())?;
        state.serialize_field("id", &self.node.id())?;
        state.serialize_field("link", &self.link)?;
        state.serialize_field("children", &self.children)?;
        state.end()
    }
}

/// Output of a render pass.
#[derive(Clone, Debug, Serialize)]
pub struct RenderedTree {
    root: TreeNode,
    page_links: Vec<PageRef>,
    cycles: Vec<CycleEdge>,
    emit_markup: bool,
}

impl RenderedTree {
    /// Root entry.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Pages shown in the tree or owning a shown element, in first-render
    /// order without duplicates.
    ///
    /// These are the page links of the page the tree is rendered into.
    #[must_use]
    pub fn page_links(&self) -> &[PageRef] {
        &self.page_links
    }

    /// Cycle edges pruned while computing the match set.
    #[must_use]
    pub fn cycles(&self) -> &[CycleEdge] {
        &self.cycles
    }

    /// Whether the request renders markup for this tree.
    ///
    /// False for metadata-only requests, which still need the page links.
    #[must_use]
    pub fn emit_markup(&self) -> bool {
        self.emit_markup
    }

    pub(crate) fn with_cycles(mut self, cycles: Vec<CycleEdge>) -> Self {
        self.cycles = cycles;
        self
    }
}

/// Render the members of `matches` below `root` as a tree.
///
/// Returns `None` when `root` itself is not a member. With `ordinals`, every
/// link becomes an anchor into the current document and pages are numbered
/// in first-visit order.
///
/// # Errors
///
/// Returns [`TreeError::InconsistentOrdinal`] if `ordinals` gives one page
/// two different ordinals.
pub fn render_tree(
    ctx: &TreeContext<'_>,
    root: &Node,
    matches: &MatchSet,
    include_elements: bool,
    ordinals: Option<&mut dyn OrdinalResolver>,
) -> Result<Option<RenderedTree>, TreeError> {
    if !matches.contains(root) {
        return Ok(None);
    }

    let mut walk = RenderWalk {
        matches,
        include_elements,
        ordinals,
        assigned: HashMap::new(),
        path: HashSet::new(),
        page_links: Vec::new(),
        linked: HashSet::new(),
    };
    let root = walk.render(root)?;

    Ok(Some(RenderedTree {
        root,
        page_links: walk.page_links,
        cycles: Vec::new(),
        emit_markup: ctx.capture_level() >= scms_capture::CaptureLevel::Body,
    }))
}

struct RenderWalk<'a, 'o> {
    matches: &'a MatchSet,
    include_elements: bool,
    ordinals: Option<&'o mut dyn OrdinalResolver>,
    assigned: HashMap<PageRef, usize>,
    path: HashSet<PageRef>,
    page_links: Vec<PageRef>,
    linked: HashSet<PageRef>,
}

impl RenderWalk<'_, '_> {
    fn render(&mut self, node: &Node) -> Result<TreeNode, TreeError> {
        let link = self.link_for(node)?;
        if self.linked.insert(node.page_ref().clone()) {
            self.page_links.push(node.page_ref().clone());
        }
        let mut children = Vec::new();

        if self.include_elements {
            for element in node.child_elements() {
                let child = Node::Element(Arc::clone(element));
                if self.matches.contains(&child) {
                    children.push(self.render(&child)?);
                }
            }
        }

        if let Node::Page(page) = node {
            let page_ref = page.page_ref();
            self.path.insert(page_ref.clone());
            for child in page.child_refs() {
                let child_ref = child.page_ref();
                if self.path.contains(child_ref) {
                    continue;
                }
                if let Some(child_page) = self.matches.page(child_ref) {
                    children.push(self.render(&Node::Page(Arc::clone(child_page)))?);
                }
            }
            self.path.remove(page_ref);
        }

        Ok(TreeNode {
            node: node.clone(),
            link,
            children,
        })
    }

    fn link_for(&mut self, node: &Node) -> Result<NodeLink, TreeError> {
        let fragment = node.id().map(str::to_owned);
        let link = match self.ordinal(node.page_ref())? {
            Some(ordinal) => NodeLink::Anchor { ordinal, fragment },
            None => NodeLink::Page {
                page_ref: node.page_ref().clone(),
                fragment,
            },
        };
        Ok(link)
    }

    fn ordinal(&mut self, page_ref: &PageRef) -> Result<Option<usize>, TreeError> {
        let Some(resolver) = self.ordinals.as_deref_mut() else {
            return Ok(None);
        };
        let ordinal = resolver.ordinal(page_ref);

        match self.assigned.entry(page_ref.clone()) {
            Entry::Occupied(entry) if *entry.get() != ordinal => {
                Err(TreeError::InconsistentOrdinal {
                    page_ref: page_ref.clone(),
                    first: *entry.get(),
                    second: ordinal,
                })
            }
            Entry::Occupied(_) => Ok(Some(ordinal)),
            Entry::Vacant(entry) => {
                entry.insert(ordinal);
                Ok(Some(ordinal))
            }
        }
    }
}

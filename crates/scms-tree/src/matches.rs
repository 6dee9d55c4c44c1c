//! Match propagation over the page graph.
//!
//! [`find_matches`] walks the graph depth-first from a root node and
//! computes the [`MatchSet`]: every node whose own content matches the filter
//! or whose reachable subtree contains a match. Child pages are reached
//! through their [`ChildRef`](scms_model::ChildRef)s, captured at
//! [`CaptureLevel::Meta`] through the request cache, and skipped when their
//! book is not accessible.
//!
//! A page reached through several parents is descended once per parent. A
//! page that is already on the current path closes a cycle: the edge is
//! reported as a [`CycleEdge`] and not followed. A root in an inaccessible
//! book yields an empty outcome.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use scms_capture::CaptureLevel;
use scms_model::{Element, Node, NodeKey, Page, PageRef};
use serde::Serialize;

use crate::{ElementFilter, TreeContext, TreeError};

/// Nodes of one traversal whose subtree contains a match.
///
/// Membership is by node identity. Iteration yields nodes in the order they
/// were added, which is post-order of the traversal.
///
/// Member pages are also recorded by reference: [`MatchSet::page`] returns
/// the instance the traversal descended first, so a later render does not
/// depend on what the cache holds by then.
#[derive(Clone, Debug, Default)]
pub struct MatchSet {
    keys: HashSet<NodeKey>,
    nodes: Vec<Node>,
    pages: HashMap<PageRef, Arc<Page>>,
}

impl MatchSet {
    /// Add a node. Returns `false` if it was already a member.
    pub fn insert(&mut self, node: Node) -> bool {
        if !self.keys.insert(node.key()) {
            return false;
        }
        if let Node::Page(page) = &node {
            self.pages
                .entry(page.page_ref().clone())
                .or_insert_with(|| Arc::clone(page));
        }
        self.nodes.push(node);
        true
    }

    /// Whether the node is a member.
    #[must_use]
    pub fn contains(&self, node: &Node) -> bool {
        self.keys.contains(&node.key())
    }

    /// Member page captured for `page_ref`, if any.
    #[must_use]
    pub fn page(&self, page_ref: &PageRef) -> Option<&Arc<Page>> {
        self.pages.get(page_ref)
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A child reference that would close a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CycleEdge {
    /// Page listing the child.
    pub from: PageRef,
    /// Child already on the current path.
    pub to: PageRef,
}

/// Result of [`find_matches`].
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// Matching nodes.
    pub matches: MatchSet,
    /// Cycle edges that were pruned, in discovery order.
    pub cycles: Vec<CycleEdge>,
}

/// Compute the match set below `root`.
///
/// A node matches when the filter matches it (pages via
/// [`ElementFilter::matches_page`]), when one of its direct child elements
/// matches, or when anything below it matches. With `include_elements`,
/// elements are descended and become members themselves; without it only
/// pages become members, and a page matches when any of its elements does.
///
/// # Errors
///
/// Returns [`TreeError`] on the first filter, accessibility or capture
/// failure.
pub fn find_matches(
    ctx: &TreeContext<'_>,
    root: &Node,
    filter: &dyn ElementFilter,
    include_elements: bool,
) -> Result<MatchOutcome, TreeError> {
    if !is_accessible(ctx, root.page_ref())? {
        tracing::debug!(root = %root.page_ref(), "Root in inaccessible book, nothing matches");
        return Ok(MatchOutcome::default());
    }

    let mut walk = MatchWalk {
        ctx,
        filter,
        include_elements,
        path: HashSet::new(),
        outcome: MatchOutcome::default(),
    };
    walk.visit(root)?;

    tracing::debug!(
        root = %root.page_ref(),
        matches = walk.outcome.matches.len(),
        cycles = walk.outcome.cycles.len(),
        "Computed match set"
    );
    Ok(walk.outcome)
}

struct MatchWalk<'a, 'c> {
    ctx: &'a TreeContext<'c>,
    filter: &'a dyn ElementFilter,
    include_elements: bool,
    path: HashSet<PageRef>,
    outcome: MatchOutcome,
}

impl MatchWalk<'_, '_> {
    fn visit(&mut self, node: &Node) -> Result<bool, TreeError> {
        match node {
            Node::Page(page) => self.visit_page(page),
            Node::Element(element) => self.visit_element(element),
        }
    }

    fn visit_element(&mut self, element: &Arc<Element>) -> Result<bool, TreeError> {
        let mut matched =
            self.element_matches(element)? || self.any_matches(element.child_elements())?;

        if self.include_elements {
            for child in element.child_elements() {
                matched |= self.visit_element(child)?;
            }
        }

        if matched {
            self.outcome.matches.insert(Node::Element(Arc::clone(element)));
        }
        Ok(matched)
    }

    fn visit_page(&mut self, page: &Arc<Page>) -> Result<bool, TreeError> {
        let page_ref = page.page_ref();
        self.path.insert(page_ref.clone());

        let own = self
            .filter
            .matches_page(page)
            .map_err(|source| TreeError::Filter {
                page_ref: page_ref.clone(),
                source,
            })?;
        let mut matched = own || self.any_matches(page.child_elements())?;

        if self.include_elements {
            for element in page.child_elements() {
                matched |= self.visit_element(element)?;
            }
        } else if !matched {
            matched = self.any_matches(page.elements())?;
        }

        for child in page.child_refs() {
            let child_ref = child.page_ref();
            if self.path.contains(child_ref) {
                tracing::warn!(from = %page_ref, to = %child_ref, "Cycle in page graph, edge pruned");
                self.outcome.cycles.push(CycleEdge {
                    from: page_ref.clone(),
                    to: child_ref.clone(),
                });
                continue;
            }
            if let Some(child_page) = child_page(self.ctx, &self.path, page_ref, child_ref)? {
                matched |= self.visit_page(&child_page)?;
            }
        }

        self.path.remove(page_ref);
        if matched {
            self.outcome.matches.insert(Node::Page(Arc::clone(page)));
        }
        Ok(matched)
    }

    fn element_matches(&self, element: &Element) -> Result<bool, TreeError> {
        self.filter
            .matches(element)
            .map_err(|source| TreeError::Filter {
                page_ref: element.page_ref().clone(),
                source,
            })
    }

    fn any_matches(&self, elements: &[Arc<Element>]) -> Result<bool, TreeError> {
        for element in elements {
            if self.element_matches(element)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn is_accessible(ctx: &TreeContext<'_>, page_ref: &PageRef) -> Result<bool, TreeError> {
    ctx.books()
        .is_accessible(page_ref.book())
        .map_err(|source| TreeError::Access {
            page_ref: page_ref.clone(),
            source,
        })
}

/// Capture the child page `to` of `from` for descending.
///
/// Returns `None` when the child is on `path` or its book is not accessible.
fn child_page(
    ctx: &TreeContext<'_>,
    path: &HashSet<PageRef>,
    from: &PageRef,
    to: &PageRef,
) -> Result<Option<Arc<Page>>, TreeError> {
    if path.contains(to) {
        return Ok(None);
    }

    if !is_accessible(ctx, to)? {
        tracing::debug!(from = %from, to = %to, book = %to.book(), "Skipping inaccessible book");
        return Ok(None);
    }

    let page = ctx.cache().capture(to, CaptureLevel::Meta)?;
    Ok(Some(page))
}

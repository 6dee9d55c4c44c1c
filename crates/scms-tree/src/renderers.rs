//! Tree renderers.
//!
//! Each renderer runs both passes (match set, then render) for one root with
//! its own filter. Requests below [`CaptureLevel::Meta`] skip tree rendering
//! entirely.

use scms_capture::CaptureLevel;
use scms_model::Node;

use crate::{
    AllPages, ElementFilter, OrdinalResolver, RenderedTree, TreeContext, TreeError, find_matches,
    render_tree,
};

/// Tree of pages (and optionally elements) below `root` that contain
/// elements matching `filter`.
///
/// Returns `None` for requests below [`CaptureLevel::Meta`] and when nothing
/// below `root` matches.
///
/// # Errors
///
/// Returns [`TreeError`] on the first filter, accessibility, capture or
/// ordinal failure.
pub fn element_filter_tree(
    ctx: &TreeContext<'_>,
    filter: &dyn ElementFilter,
    root: &Node,
    include_elements: bool,
    ordinals: Option<&mut dyn OrdinalResolver>,
) -> Result<Option<RenderedTree>, TreeError> {
    if ctx.capture_level() < CaptureLevel::Meta {
        return Ok(None);
    }

    let outcome = find_matches(ctx, root, filter, include_elements)?;
    let tree = render_tree(ctx, root, &outcome.matches, include_elements, ordinals)?;
    Ok(tree.map(|tree| tree.with_cycles(outcome.cycles)))
}

/// Navigation tree of every accessible page below `root`.
///
/// # Errors
///
/// Returns [`TreeError`] on the first accessibility, capture or ordinal
/// failure.
pub fn navigation_tree(
    ctx: &TreeContext<'_>,
    root: &Node,
    include_elements: bool,
    ordinals: Option<&mut dyn OrdinalResolver>,
) -> Result<Option<RenderedTree>, TreeError> {
    element_filter_tree(ctx, &AllPages, root, include_elements, ordinals)
}

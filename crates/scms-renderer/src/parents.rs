//! Parent pages offered for navigation under a view.

use std::sync::Arc;

use scms_capture::{CaptureCache, CaptureLevel};
use scms_model::{AccessError, BookAccess, Page, PageRef};
use scms_tree::TreeError;

use crate::View;

/// Parents of `page` that are reachable and applicable to `view`.
///
/// Parents in unknown or inaccessible books are skipped. The remaining
/// parents are captured at metadata level in one batch and kept in declared
/// order when `view` applies to them.
///
/// # Errors
///
/// Returns [`TreeError::Access`] if accessibility of a parent's book cannot
/// be determined, or [`TreeError::Capture`] if a parent fails to capture.
pub fn applicable_parents(
    cache: &CaptureCache,
    books: &dyn BookAccess,
    view: &dyn View,
    page: &Page,
) -> Result<Vec<Arc<Page>>, TreeError> {
    let mut refs: Vec<PageRef> = Vec::with_capacity(page.parent_refs().len());
    for parent in page.parent_refs() {
        let page_ref = parent.page_ref();
        match books.is_accessible(page_ref.book()) {
            Ok(true) => refs.push(page_ref.clone()),
            Ok(false) => {
                tracing::debug!(parent = %page_ref, "Skipping parent in inaccessible book");
            }
            Err(AccessError::UnknownBook(book)) => {
                tracing::debug!(parent = %page_ref, %book, "Skipping parent in unknown book");
            }
            Err(source) => {
                return Err(TreeError::Access {
                    page_ref: page_ref.clone(),
                    source,
                });
            }
        }
    }

    let parents = cache
        .capture_multiple(&refs, CaptureLevel::Meta)
        .into_pages()?;
    Ok(parents
        .into_iter()
        .filter(|parent| view.is_applicable(parent))
        .collect())
}

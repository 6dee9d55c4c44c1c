//! Tree error types.

use scms_capture::CaptureError;
use scms_model::{AccessError, PageRef};

use crate::FilterError;

/// Error type for traversal and tree rendering.
///
/// Every variant names the first page that made the traversal fail. Any of
/// them aborts the whole tree; detected cycles are not errors.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A page could not be captured.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The element filter failed.
    #[error("Element filter failed on {page_ref}: {source}")]
    Filter {
        /// Page owning the element being tested.
        page_ref: PageRef,
        /// Filter failure.
        #[source]
        source: FilterError,
    },

    /// Book accessibility could not be determined.
    #[error("Cannot check access for {page_ref}: {source}")]
    Access {
        /// Child page whose book was checked.
        page_ref: PageRef,
        /// Accessibility failure.
        #[source]
        source: AccessError,
    },

    /// The ordinal resolver returned two ordinals for one page.
    #[error("Inconsistent ordinal for {page_ref}: {first} then {second}")]
    InconsistentOrdinal {
        /// Page with two ordinals.
        page_ref: PageRef,
        /// Ordinal seen first.
        first: usize,
        /// Ordinal seen later.
        second: usize,
    },
}

impl TreeError {
    /// Page that caused the failure.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        match self {
            Self::Capture(err) => &err.page_ref,
            Self::Filter { page_ref, .. }
            | Self::Access { page_ref, .. }
            | Self::InconsistentOrdinal { page_ref, .. } => page_ref,
        }
    }
}

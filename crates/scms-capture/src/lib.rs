//! Page capture for scms.
//!
//! Capturing a page means materializing it from an external [`PageSource`]
//! to a given [`CaptureLevel`]. Within one request every capture goes
//! through a [`CaptureCache`], which guarantees:
//!
//! - **Reuse**: a page captured at level L is returned unchanged for any
//!   later request at a level ≤ L
//! - **Monotonicity**: a cached page is only ever replaced by a capture at a
//!   higher level
//! - **At most once**: concurrent captures of the same page serialize; the
//!   first caller materializes, the others wait for its result
//!
//! # Architecture
//!
//! The crate provides:
//! - [`CaptureLevel`] ordering `PageExists < Meta < Body`
//! - [`PageSource`] trait and [`SourceError`] for backends
//! - [`CaptureCache`] with [`capture`](CaptureCache::capture) and
//!   [`capture_multiple`](CaptureCache::capture_multiple)
//! - [`MockPageSource`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scms_capture::{CaptureCache, CaptureLevel, MockPageSource};
//! use scms_model::PageBuilder;
//!
//! let source = MockPageSource::new().with_page(PageBuilder::new("docs:/".parse()?));
//! let cache = CaptureCache::new(Arc::new(source));
//!
//! let page = cache.capture(&"docs:/".parse()?, CaptureLevel::Meta)?;
//! let again = cache.capture(&"docs:/".parse()?, CaptureLevel::Meta)?;
//! assert!(Arc::ptr_eq(&page, &again));
//! ```

mod cache;
mod level;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod source;

pub use cache::{CaptureBatch, CaptureCache, CaptureError, CaptureStats};
pub use level::CaptureLevel;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPageSource;
pub use source::{PageSource, SourceError, SourceErrorKind};

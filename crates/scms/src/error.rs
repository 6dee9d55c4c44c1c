//! CLI error types.

use scms_capture::{CaptureError, SourceError};
use scms_config::ConfigError;
use scms_model::{AccessError, PageRef};
use scms_renderer::{RegistryError, ResolveError};
use scms_tree::TreeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Capture(#[from] CaptureError),

    #[error("{0}")]
    Access(#[from] AccessError),

    #[error("Page {0} belongs to an inaccessible book")]
    Inaccessible(PageRef),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

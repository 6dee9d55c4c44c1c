//! Renderer error types.

use scms_model::NodeTag;

/// Error registering a component in the application context.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A view with this name exists.
    #[error("View already registered: {0}")]
    DuplicateView(String),

    /// A theme with this name exists.
    #[error("Theme already registered: {0}")]
    DuplicateTheme(String),

    /// The CSS link is already registered.
    #[error("CSS link already registered: {0}")]
    DuplicateCssLink(String),

    /// The head include is already registered.
    #[error("Head include already registered: {0}")]
    DuplicateHeadInclude(String),

    /// A script was re-registered with another src.
    #[error("Script already registered with a different src: name={name} src={src} existing={existing}")]
    ScriptSrcMismatch {
        /// Script name.
        name: String,
        /// Newly given src.
        src: String,
        /// Previously registered src.
        existing: String,
    },

    /// Two script names share one src.
    #[error("Script src already registered under {existing_name}: {src}")]
    DuplicateScriptSrc {
        /// Shared src.
        src: String,
        /// Name that registered the src first.
        existing_name: String,
    },

    /// A link CSS class resolver exists for this tag.
    #[error("Link CSS class already registered: {}", .0.as_str())]
    DuplicateLinkCssClass(NodeTag),

    /// A list item CSS class resolver exists for this tag.
    #[error("List item CSS class already registered: {}", .0.as_str())]
    DuplicateListItemCssClass(NodeTag),
}

/// Error selecting a view or theme for a request.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The default view was requested by name.
    #[error("view parameter may not be sent for the default view: {0}")]
    DefaultViewNamed(String),

    /// No default view is registered.
    #[error("Default view not found: {0}")]
    DefaultViewMissing(String),

    /// No theme is registered.
    #[error("No themes registered")]
    NoThemes,
}

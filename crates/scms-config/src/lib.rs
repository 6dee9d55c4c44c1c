//! Configuration management for scms.
//!
//! Parses `scms.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content.source_dir`
//! - `render.context_path`
//! - `books.prefix`

mod books;
mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use scms_model::{Book, BookRef};
use serde::Deserialize;

pub use books::BookRegistry;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override page source directory.
    pub source_dir: Option<PathBuf>,
    /// Override URL context path.
    pub context_path: Option<String>,
    /// Override whether trees include elements.
    pub include_elements: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "scms.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Configured books.
    pub books: Vec<BookConfig>,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory holding one subdirectory of page documents per book.
    pub source_dir: PathBuf,
}

/// Rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Path the site is served under, empty for the root.
    pub context_path: String,
    /// Whether trees list matching elements below their pages.
    pub include_elements: bool,
}

/// A `[[books]]` entry.
#[derive(Debug, Deserialize)]
pub struct BookConfig {
    /// Book name.
    pub name: BookRef,
    /// URL prefix, `/<name>` when omitted.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Whether pages of the book may be traversed.
    #[serde(default = "default_accessible")]
    pub accessible: bool,
}

impl BookConfig {
    /// URL prefix of the book.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| format!("/{}", self.name))
    }
}

fn default_accessible() -> bool {
    true
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.source_dir`").
        field: String,
        /// Error message (e.g., "${`PAGES_DIR`} not set").
        message: String,
    },
}

/// Require an optional URL path to be empty or start with `/`, without a
/// trailing slash.
fn require_url_path(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Ok(());
    }
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must be empty or start with /"
        )));
    }
    if value.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must not end with /"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `scms.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            tracing::debug!(path = %discovered.display(), "Discovered config file");
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Book registry built from the `[[books]]` entries.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a book is configured twice.
    pub fn book_registry(&self) -> Result<BookRegistry, ConfigError> {
        BookRegistry::new(self.books.iter().map(|book| Book {
            book_ref: book.name.clone(),
            prefix: book.prefix(),
            accessible: book.accessible,
        }))
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(context_path) = &settings.context_path {
            self.render.context_path.clone_from(context_path);
        }
        if let Some(include_elements) = settings.include_elements {
            self.render.include_elements = include_elements;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            render: RenderConfig::default(),
            books: Vec::new(),
            content_resolved: ContentConfig {
                source_dir: base.join("pages"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_url_path(&self.render.context_path, "render.context_path")?;
        self.validate_books()
    }

    /// Validate book entries.
    fn validate_books(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::with_capacity(self.books.len());
        for book in &self.books {
            if !seen.insert(&book.name) {
                return Err(ConfigError::Validation(format!(
                    "book {} is configured more than once",
                    book.name
                )));
            }
            if let Some(prefix) = &book.prefix {
                require_url_path(prefix, &format!("books.{}.prefix", book.name))?;
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref source_dir) = self.content.source_dir {
            self.content.source_dir = Some(expand::expand_env(source_dir, "content.source_dir")?);
        }

        self.render.context_path =
            expand::expand_env(&self.render.context_path, "render.context_path")?;

        for book in &mut self.books {
            if let Some(ref prefix) = book.prefix {
                book.prefix = Some(expand::expand_env(prefix, "books.prefix")?);
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            source_dir: config_dir.join(self.content.source_dir.as_deref().unwrap_or("pages")),
        };
    }
}

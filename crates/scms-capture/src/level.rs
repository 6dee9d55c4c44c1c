//! Capture fidelity levels.

use std::fmt;
use std::str::FromStr;

use scms_model::PageBuilder;
use serde::{Deserialize, Serialize};

/// How much of a page must be materialized.
///
/// Levels are totally ordered from least to most complete. A page captured
/// at some level also satisfies every lower level.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptureLevel {
    /// Identity and reachability only.
    PageExists,
    /// Parent/child references and elements, without rendered content.
    Meta,
    /// Fully rendered content.
    Body,
}

impl CaptureLevel {
    /// All levels, least complete first.
    pub const ALL: [Self; 3] = [Self::PageExists, Self::Meta, Self::Body];

    /// Whether a capture at this level can serve a request for `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    /// Name as used in configuration and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageExists => "page_exists",
            Self::Meta => "meta",
            Self::Body => "body",
        }
    }

    /// Trim a page description down to what this level includes.
    ///
    /// Page sources describe the full page and call this before building, so
    /// that lower-level captures never leak content of higher levels.
    #[must_use]
    pub fn shape(self, builder: PageBuilder) -> PageBuilder {
        match self {
            Self::PageExists => builder.without_body().without_structure(),
            Self::Meta => builder.without_body(),
            Self::Body => builder,
        }
    }
}

impl fmt::Display for CaptureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown capture level: {s}"))
    }
}

//! `scms index` command implementation.

use clap::Args;
use scms_capture::CaptureLevel;
use scms_model::{ElementKind, Node, PageRef};
use scms_tree::{PageIndex, numbered_index};

use super::render::TreeSpec;
use super::{GlobalArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    /// Root page (`book:/path`).
    page: PageRef,

    /// List pages containing elements of this kind instead of all pages.
    #[arg(long)]
    kind: Option<ElementKind>,

    /// List matching elements below their pages (overrides config).
    #[arg(long)]
    include_elements: bool,
}

impl IndexArgs {
    /// Execute the index command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let session = Session::open(global, self.include_elements)?;
        let lines = self.lines(&session)?;
        if lines.is_empty() {
            output.info(&format!("Nothing to list below {}", self.page));
        } else {
            output.result(&lines.join("\n"));
        }
        Ok(())
    }

    /// Outline lines, indented by depth.
    fn lines(&self, session: &Session) -> Result<Vec<String>, CliError> {
        let spec = self.kind.map_or(TreeSpec::Navigation, TreeSpec::Elements);
        let root = Node::Page(session.capture(&self.page, CaptureLevel::Meta)?);
        let ctx = session.context(CaptureLevel::Meta);
        let mut index = PageIndex::new();

        let Some(tree) = spec.render(&ctx, &root, session.include_elements(), Some(&mut index))?
        else {
            return Ok(Vec::new());
        };

        Ok(numbered_index(&tree)
            .into_iter()
            .map(|entry| {
                format!(
                    "{}{} {}  {}",
                    "  ".repeat(entry.depth - 1),
                    entry.number,
                    entry.label,
                    session.links().href(&entry.link)
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::testing;

    #[test]
    fn test_navigation_outline() {
        let site = testing::site();
        let session = testing::session(site.path());
        let args = IndexArgs {
            page: "docs:/".parse().unwrap(),
            kind: None,
            include_elements: false,
        };

        let lines = args.lines(&session).unwrap();

        assert_eq!(lines, vec!["1 Guide  #page-1", "2 API  #page-2"]);
    }

    #[test]
    fn test_element_outline_with_elements() {
        let site = testing::site();
        let mut session = testing::session(site.path());
        session.config.render.include_elements = true;
        let args = IndexArgs {
            page: "docs:/".parse().unwrap(),
            kind: Some(ElementKind::Diagram),
            include_elements: true,
        };

        let lines = args.lines(&session).unwrap();

        assert_eq!(lines, vec!["1 Guide  #page-1", "  1.1 Flow  #page-1-flow"]);
    }

    #[test]
    fn test_no_matches() {
        let site = testing::site();
        let session = testing::session(site.path());
        let args = IndexArgs {
            page: "docs:/api".parse().unwrap(),
            kind: Some(ElementKind::Image),
            include_elements: false,
        };

        assert!(args.lines(&session).unwrap().is_empty());
    }
}

//! `scms parents` command implementation.

use clap::Args;
use scms_capture::CaptureLevel;
use scms_model::PageRef;
use scms_renderer::applicable_parents;

use super::{GlobalArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the parents command.
#[derive(Args)]
pub(crate) struct ParentsArgs {
    /// Page whose parents to list (`book:/path`).
    page: PageRef,

    /// View the parents must support (default: the content view).
    #[arg(long)]
    view: Option<String>,
}

impl ParentsArgs {
    /// Execute the parents command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let session = Session::open(global, false)?;
        let lines = self.lines(&session)?;
        if lines.is_empty() {
            output.info(&format!("No applicable parents for {}", self.page));
        } else {
            output.result(&lines.join("\n"));
        }
        Ok(())
    }

    /// One `title  url` line per applicable parent.
    fn lines(&self, session: &Session) -> Result<Vec<String>, CliError> {
        let view = session.app().resolve_view(self.view.as_deref())?;
        let page = session.capture(&self.page, CaptureLevel::Meta)?;
        let parents = applicable_parents(session.cache(), session.books(), &**view, &page)?;

        Ok(parents
            .iter()
            .map(|parent| {
                format!(
                    "{}  {}",
                    parent.title(),
                    session.links().page_url(parent.page_ref())
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

    fn args(page: &str, view: Option<&str>) -> ParentsArgs {
        ParentsArgs {
            page: page.parse().unwrap(),
            view: view.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn test_default_view() {
        let site = testing::site();
        let session = testing::session(site.path());

        let lines = args("docs:/guide", None).lines(&session).unwrap();

        assert_eq!(lines, vec!["Docs  /site/docs/"]);
    }

    #[test]
    fn test_tree_view_needs_children() {
        let site = testing::site();
        let session = testing::session(site.path());

        let lines = args("docs:/api", Some("tree")).lines(&session).unwrap();

        assert_eq!(lines, vec!["Docs  /site/docs/"]);
    }

    #[test]
    fn test_naming_default_view_fails() {
        let site = testing::site();
        let session = testing::session(site.path());

        let err = args("docs:/guide", Some("content"))
            .lines(&session)
            .unwrap_err();

        assert!(matches!(err, CliError::Resolve(_)));
    }
}

//! `scms tree` command implementation.

use clap::Args;
use scms_model::ElementKind;

use super::GlobalArgs;
use super::render::{RenderArgs, TreeSpec};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    /// Element kind to look for (heading, section, link, diagram, file, image, note).
    #[arg(long)]
    kind: ElementKind,

    #[command(flatten)]
    render: RenderArgs,
}

impl TreeArgs {
    /// Execute the tree command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        self.render
            .run(global, TreeSpec::Elements(self.kind), output)
    }
}

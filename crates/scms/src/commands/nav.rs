//! `scms nav` command implementation.

use clap::Args;

use super::GlobalArgs;
use super::render::{RenderArgs, TreeSpec};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the nav command.
#[derive(Args)]
pub(crate) struct NavArgs {
    #[command(flatten)]
    render: RenderArgs,
}

impl NavArgs {
    /// Execute the nav command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        self.render.run(global, TreeSpec::Navigation, output)
    }
}

//! `markpress new` command implementation.

use std::path::Path;

use clap::Args;
use mp_publisher::{PublishOptions, Publisher, draft_stub};
use mp_wordpress::BlogApi;

use super::Context;
use crate::error::CliError;

/// Output name meaning standard output.
const STDOUT: &str = "-";

/// Arguments for the new command.
#[derive(Args, Debug)]
pub(crate) struct NewArgs {
    /// Document to create, `-` for stdout.
    file: String,

    /// Overwrite an existing file.
    #[arg(short, long)]
    force: bool,
}

impl NewArgs {
    /// Create an empty remote draft and write a document stub bound to it.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let to_stdout = self.file == STDOUT;
        if !to_stdout && !self.force && Path::new(&self.file).exists() {
            return Err(CliError::Validation(format!(
                "file already exists: {} (use --force to overwrite)",
                self.file
            )));
        }

        let site = ctx.site()?;
        let client = Context::client(&site)?;
        let options = PublishOptions {
            dry_run: ctx.global.dry_run,
            ..PublishOptions::default()
        };
        let publisher = Publisher::new(&client, &site.render, options);

        let Some(id) = publisher.create_draft()? else {
            ctx.output
                .highlight(&format!("[DRY RUN] new draft would be saved in {}.", self.file));
            return Ok(());
        };

        let stub = draft_stub(&id);
        if to_stdout {
            ctx.output.write(&stub)?;
        } else {
            std::fs::write(&self.file, stub)?;
        }

        ctx.output
            .success(&format!("new post uuid={id} saved in {}", self.file));
        let post = client.get_post(&id)?;
        if !post.link.is_empty() {
            ctx.output.info(&post.link);
        }
        Ok(())
    }
}

//! `markpress post`, `create` and `update` command implementation.

use std::path::PathBuf;

use clap::Args;
use mp_document::{PostStatus, PostType};
use mp_publisher::{
    CategorySpec, PublishMode, PublishOptions, PublishOutcome, PublishResult, Publisher,
};

use super::{Context, RenderArgs};
use crate::error::CliError;

/// Arguments for the publishing commands.
#[derive(Args, Debug)]
pub(crate) struct PublishArgs {
    /// Document to publish.
    file: PathBuf,

    /// Upload the document even if it is unchanged.
    #[arg(short, long)]
    force: bool,

    /// Upload media files even if they are unchanged.
    #[arg(long)]
    force_media: bool,

    /// Do not upload media files.
    #[arg(long)]
    no_media: bool,

    /// Directory media references are relative to (default: document directory).
    #[arg(short, long, value_name = "DIR")]
    media_dir: Option<PathBuf>,

    /// Remote post id, overriding the cache file.
    #[arg(long, value_name = "ID")]
    post_id: Option<String>,

    /// Post title, overriding the document.
    #[arg(short, long)]
    title: Option<String>,

    /// Post status (draft, private, publish).
    #[arg(long, conflicts_with_all = ["publish", "unpublish"])]
    status: Option<PostStatus>,

    /// Set post status to publish.
    #[arg(short, long, conflicts_with = "unpublish")]
    publish: bool,

    /// Set post status to draft.
    #[arg(short, long)]
    unpublish: bool,

    /// Publish as a page instead of a post.
    #[arg(long)]
    pages: bool,

    /// Assign categories after publishing: `a,b` (replace), `+a,b` (add) or `-a,b` (remove).
    #[arg(short, long, value_name = "SPEC", allow_hyphen_values = true)]
    categories: Option<String>,

    /// Comma-separated metadata parameters the document must define.
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    mandatory_parameters: Vec<String>,

    #[command(flatten)]
    render: RenderArgs,
}

impl PublishArgs {
    /// Execute a publishing command.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be converted or the blog
    /// rejects it.
    pub(crate) fn execute(self, ctx: &Context, mode: PublishMode) -> Result<(), CliError> {
        let output = &ctx.output;
        let site = ctx.site()?;
        let client = Context::client(&site)?;
        let options = self.options(ctx);
        let publisher = Publisher::new(&client, &site.render, options);

        output.info(&format!("Publishing {}...", self.file.display()));
        let result = publisher.publish(&self.file, mode)?;
        self.print_result(ctx, &result);

        if let Some(spec) = &self.categories {
            if result.id.is_none() {
                output.warning("Categories not assigned: post has no id yet.");
                return Ok(());
            }
            let spec = CategorySpec::parse(spec)
                .ok_or_else(|| CliError::Validation("empty category list".to_owned()))?;
            let assigned = publisher.assign_categories(&self.file, &spec)?;
            output.info(&format!("Categories: {}", assigned.categories.join(", ")));
        }
        Ok(())
    }

    fn options(&self, ctx: &Context) -> PublishOptions {
        let status = if self.publish {
            Some(PostStatus::Publish)
        } else if self.unpublish {
            Some(PostStatus::Draft)
        } else {
            self.status
        };
        PublishOptions {
            force: self.force,
            force_media: self.force_media,
            no_media: self.no_media,
            media_dir: self.media_dir.clone(),
            dry_run: ctx.global.dry_run,
            post_id: self.post_id.clone(),
            title: self.title.clone(),
            status,
            post_type: self.pages.then_some(PostType::Page),
            doctype: self.render.doctype,
            attributes: self.render.attributes.clone(),
            mandatory: self.mandatory_parameters.clone(),
        }
    }

    fn print_result(&self, ctx: &Context, result: &PublishResult) {
        let output = &ctx.output;
        if result.media_uploaded > 0 {
            output.info(&format!("Media uploaded: {}", result.media_uploaded));
        }
        match result.outcome {
            PublishOutcome::Skipped => {
                output.info(&format!("Skipping unmodified: {}", self.file.display()));
            }
            outcome if ctx.global.dry_run => {
                output.highlight(&format!(
                    "[DRY RUN] {} {} {} '{}' would be {}.",
                    result.id.as_deref().unwrap_or("new"),
                    result.status,
                    result.post_type,
                    result.title,
                    outcome.as_str()
                ));
            }
            outcome => {
                output.success(&format!(
                    "{} uuid={} {}: {}",
                    result.post_type,
                    result.id.as_deref().unwrap_or_default(),
                    outcome.as_str(),
                    self.file.display()
                ));
                if let Some(url) = &result.url {
                    output.info(url);
                }
            }
        }
    }
}

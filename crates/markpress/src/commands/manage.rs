//! `markpress delete`, `info`, `list` and `categories` command implementations.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::Args;
use mp_cache::{PublishRecord, RecordStore};
use mp_document::{DocType, PostStatus, PostType};
use mp_publisher::{CategorySpec, PublishOptions, Publisher};
use mp_wordpress::Post;

use super::Context;
use crate::error::CliError;
use crate::output::Output;

/// Arguments naming one published document.
#[derive(Args, Debug)]
pub(crate) struct DocArgs {
    /// Document file.
    file: PathBuf,

    /// Remote post id, overriding the cache file.
    #[arg(long, value_name = "ID")]
    post_id: Option<String>,
}

impl DocArgs {
    /// Delete the remote post and the cache file.
    pub(crate) fn delete(self, ctx: &Context) -> Result<(), CliError> {
        let site = ctx.site()?;
        let client = Context::client(&site)?;
        let publisher = Publisher::new(&client, &site.render, self.options(ctx));

        let id = publisher.delete(&self.file)?;
        if ctx.global.dry_run {
            ctx.output
                .highlight(&format!("[DRY RUN] post {id} would be deleted."));
        } else {
            ctx.output.success(&format!("Deleted post {id}."));
        }
        Ok(())
    }

    /// Print the cached publish record.
    pub(crate) fn info(self, ctx: &Context) -> Result<(), CliError> {
        let record = RecordStore::for_document(&self.file, true).load_existing()?;
        print_record(&ctx.output, &record);
        Ok(())
    }

    pub(crate) fn file(&self) -> &Path {
        &self.file
    }

    pub(crate) fn options(&self, ctx: &Context) -> PublishOptions {
        PublishOptions {
            dry_run: ctx.global.dry_run,
            post_id: self.post_id.clone(),
            ..PublishOptions::default()
        }
    }
}

/// Arguments for the list command.
#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// List pages instead of posts.
    #[arg(long)]
    pages: bool,
}

impl ListArgs {
    /// Print recent posts from the blog.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let site = ctx.site()?;
        let client = Context::client(&site)?;
        let publisher = Publisher::new(&client, &site.render, PublishOptions::default());

        let post_type = if self.pages {
            PostType::Page
        } else {
            PostType::Post
        };
        for post in publisher.list(post_type)? {
            print_post(&ctx.output, &post);
        }
        Ok(())
    }
}

/// Arguments for the categories command.
#[derive(Args, Debug)]
pub(crate) struct CategoriesArgs {
    /// Document whose categories to change.
    #[arg(requires = "spec")]
    file: Option<PathBuf>,

    /// `a,b` (replace), `+a,b` (add) or `-a,b` (remove).
    #[arg(requires = "file", allow_hyphen_values = true)]
    spec: Option<String>,

    /// Remote post id, overriding the cache file.
    #[arg(long, value_name = "ID")]
    post_id: Option<String>,
}

impl CategoriesArgs {
    /// List blog categories, or assign categories to a document.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let site = ctx.site()?;
        let client = Context::client(&site)?;
        let options = PublishOptions {
            dry_run: ctx.global.dry_run,
            post_id: self.post_id.clone(),
            ..PublishOptions::default()
        };
        let publisher = Publisher::new(&client, &site.render, options);

        let (Some(file), Some(spec)) = (&self.file, &self.spec) else {
            for term in publisher.categories()? {
                ctx.output.print(&format!("{} ({})", term.name, term.id));
            }
            return Ok(());
        };

        let spec = CategorySpec::parse(spec)
            .ok_or_else(|| CliError::Validation("empty category list".to_owned()))?;
        let result = publisher.assign_categories(file, &spec)?;
        for name in &result.created {
            ctx.output.info(&format!("Created category: {name}"));
        }
        ctx.output.success(&format!(
            "Post {} categories: {}",
            result.id,
            result.categories.join(", ")
        ));
        Ok(())
    }
}

fn print_record(output: &Output, record: &PublishRecord) {
    let field = |value: Option<&str>| value.unwrap_or("").to_owned();
    output.print(&format!("title:      {}", field(record.title.as_deref())));
    output.print(&format!("id:         {}", field(record.id.as_deref())));
    output.print(&format!("url:        {}", field(record.url.as_deref())));
    if record.post_type != Some(PostType::Page) {
        output.print(&format!("categories: {}", record.categories.join(",")));
    }
    output.print(&format!(
        "status:     {}",
        record.status.map(PostStatus::as_str).unwrap_or_default()
    ));
    output.print(&format!(
        "type:       {}",
        record.post_type.map(PostType::as_str).unwrap_or_default()
    ));
    output.print(&format!(
        "doctype:    {}",
        record.doctype.map(DocType::as_str).unwrap_or_default()
    ));
    output.print(&format!("created:    {}", format_time(record.created_at)));
    output.print(&format!("updated:    {}", format_time(record.updated_at)));
    for media in record.media.values() {
        if let Some(url) = &media.url {
            output.print(&format!("media:      {url}"));
        }
    }
}

fn print_post(output: &Output, post: &Post) {
    output.print(&format!("title:      {}", post.title));
    output.print(&format!("id:         {}", post.id));
    output.print(&format!("url:        {}", post.link));
    output.print(&format!("type:       {}", post.post_type));
    if post.post_type != PostType::Page.as_str() {
        output.print(&format!("categories: {}", post.categories.join(",")));
    }
    output.print(&format!("created:    {}", format_time(post.created_at)));
    output.print("");
}

/// Local time for an epoch timestamp.
fn format_time(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&Local).format("%c").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: CategoriesArgs,
    }

    #[test]
    fn test_categories_args() {
        let cli = TestCli::try_parse_from(["categories", "post.md", "-News"]).unwrap();
        assert_eq!(cli.args.spec.as_deref(), Some("-News"));

        let cli = TestCli::try_parse_from(["categories"]).unwrap();
        assert!(cli.args.file.is_none());

        assert!(TestCli::try_parse_from(["categories", "post.md"]).is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "");
        assert!(!format_time(Some(0)).is_empty());
    }
}

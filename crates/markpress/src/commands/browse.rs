//! `markpress open` and `preview` command implementation.

use std::process::Command;

use mp_publisher::Publisher;

use super::{Context, DocArgs};
use crate::error::CliError;

/// Open the published post (or its preview) in the default browser.
pub(crate) fn execute(args: &DocArgs, ctx: &Context, preview: bool) -> Result<(), CliError> {
    let site = ctx.site()?;
    let client = Context::client(&site)?;
    let publisher = Publisher::new(&client, &site.render, args.options(ctx));

    let id = publisher.post_id(args.file())?;
    let url = post_url(&site.url, &id, preview);
    ctx.output.print(&url);
    if ctx.global.dry_run {
        return Ok(());
    }
    launch(&url)
}

/// Front-end URL of a post by id.
fn post_url(site_url: &str, id: &str, preview: bool) -> String {
    let base = site_url.trim().trim_end_matches('/');
    let base = if base.contains("://") {
        base.to_owned()
    } else {
        format!("http://{base}")
    };
    let mut url = format!("{base}/?p={id}");
    if preview {
        url.push_str("&preview=true");
    }
    url
}

fn launch(url: &str) -> Result<(), CliError> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("rundll32");
        command.arg("url.dll,FileProtocolHandler");
        command
    };
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = Command::new("xdg-open");

    let status = command.arg(url).status()?;
    if !status.success() {
        return Err(CliError::Validation(format!(
            "failed to open browser: {status}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_post_url() {
        assert_eq!(
            post_url("https://blog.example.com/", "42", false),
            "https://blog.example.com/?p=42"
        );
        assert_eq!(
            post_url("blog.example.com", "42", true),
            "http://blog.example.com/?p=42&preview=true"
        );
    }
}

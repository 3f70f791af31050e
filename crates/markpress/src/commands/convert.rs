//! `markpress dump` and `compile` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mp_config::RenderConfig;
use mp_document::Document;
use mp_renderer::{Renderer, standalone_page};

use super::{Context, RenderArgs};
use crate::error::CliError;

/// Output name meaning standard output.
const STDOUT: &str = "-";

/// Arguments for the dump command.
#[derive(Args, Debug)]
pub(crate) struct DumpArgs {
    /// Document to convert.
    file: PathBuf,

    #[command(flatten)]
    render: RenderArgs,
}

impl DumpArgs {
    /// Print the converted HTML body.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let (_, render) = ctx.render_config()?;
        let (_, html) = convert(&self.file, &render, &self.render)?;
        ctx.output.write(&html)?;
        Ok(())
    }
}

/// Arguments for the compile command.
#[derive(Args, Debug)]
pub(crate) struct CompileArgs {
    /// Document to convert.
    file: PathBuf,

    /// Output file, `-` for stdout (default: document name with `.html`).
    output: Option<String>,

    #[command(flatten)]
    render: RenderArgs,
}

impl CompileArgs {
    /// Write a standalone HTML page for local preview.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let (config, render) = ctx.render_config()?;
        let (doc, html) = convert(&self.file, &render, &self.render)?;
        let page = standalone_page(&html, doc.title.as_deref(), &config.templates());

        let target = self.target();
        if target == Path::new(STDOUT) {
            ctx.output.write(&page)?;
        } else {
            std::fs::write(&target, page)?;
            ctx.output
                .success(&format!("Compiled {} -> {}", self.file.display(), target.display()));
        }
        Ok(())
    }

    fn target(&self) -> PathBuf {
        self.output
            .as_ref()
            .map_or_else(|| self.file.with_extension("html"), PathBuf::from)
    }
}

fn convert(
    file: &Path,
    render: &RenderConfig,
    args: &RenderArgs,
) -> Result<(Document, String), CliError> {
    let mut doc = Document::load(file)?;
    if args.doctype.is_some() {
        doc.doctype = args.doctype;
    }
    let html = Renderer::new(render)
        .with_attributes(args.attributes.clone())
        .render(&doc)?;
    Ok((doc, html))
}

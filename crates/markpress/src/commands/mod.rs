//! CLI command implementations.

pub(crate) mod browse;
pub(crate) mod convert;
pub(crate) mod manage;
pub(crate) mod new;
pub(crate) mod publish;

use std::path::PathBuf;

use clap::{ArgAction, Args};
use mp_config::{Config, RenderConfig, SiteConfig};
use mp_document::DocType;
use mp_wordpress::WordPressClient;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use convert::{CompileArgs, DumpArgs};
pub(crate) use manage::{CategoriesArgs, DocArgs, ListArgs};
pub(crate) use new::NewArgs;
pub(crate) use publish::PublishArgs;

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct GlobalArgs {
    /// Site section of the configuration file.
    #[arg(short, long, global = true, env = "MARKPRESS")]
    pub(crate) site: Option<String>,

    /// Path to configuration file (default: ~/.config/markpress/config.toml).
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Proxy URL, overriding the configured one.
    #[arg(long, global = true)]
    pub(crate) proxy: Option<String>,

    /// Show what would happen without changing the blog or cache files.
    #[arg(short = 'n', long, global = true)]
    pub(crate) dry_run: bool,

    /// Log progress (-v) or debug details (-vv).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

/// Conversion options shared by publishing and conversion commands.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RenderArgs {
    /// AsciiDoc document type (article, book, manpage).
    #[arg(short, long)]
    pub(crate) doctype: Option<DocType>,

    /// Extra asciidoctor attribute (NAME[=VALUE]); may be repeated.
    #[arg(short = 'a', long = "attribute", value_name = "ATTRIBUTE")]
    pub(crate) attributes: Vec<String>,
}

/// Shared state of one invocation.
pub(crate) struct Context {
    pub(crate) global: GlobalArgs,
    pub(crate) output: Output,
}

impl Context {
    pub(crate) fn new(global: GlobalArgs) -> Self {
        Self {
            global,
            output: Output::new(),
        }
    }

    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        Ok(Config::load(self.global.config.as_deref())?)
    }

    /// Selected site with command-line overrides applied.
    pub(crate) fn site(&self) -> Result<SiteConfig, CliError> {
        let config = self.load_config()?;
        let mut site = config.select(self.global.site.as_deref())?;
        if let Some(proxy) = &self.global.proxy {
            site.proxy = Some(proxy.clone());
        }
        tracing::debug!(site = %site.name, url = %site.url, "selected site");
        Ok(site)
    }

    /// Client for the selected site.
    pub(crate) fn client(site: &SiteConfig) -> Result<WordPressClient, CliError> {
        Ok(WordPressClient::from_site(site)?)
    }

    /// Render options of the selected site; works without a config file.
    pub(crate) fn render_config(&self) -> Result<(Config, RenderConfig), CliError> {
        let config = self.load_config()?;
        let render = config.render_config(self.global.site.as_deref());
        Ok((config, render))
    }
}

//! markpress CLI - publish documents to WordPress.
//!
//! Provides commands for:
//! - `post`, `create`, `update`: Convert a document and publish it
//! - `new`: Create an empty remote draft and a document stub
//! - `delete`, `info`, `open`, `preview`: Manage a published document
//! - `list`, `categories`: Inspect the blog
//! - `dump`, `compile`: Convert locally without publishing

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use mp_publisher::PublishMode;
use tracing_subscriber::EnvFilter;

use commands::{
    CategoriesArgs, CompileArgs, Context, DocArgs, DumpArgs, GlobalArgs, ListArgs, NewArgs,
    PublishArgs, browse,
};

/// markpress - publish Markdown and AsciiDoc documents to WordPress.
#[derive(Parser)]
#[command(name = "markpress", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a remote draft and write a document stub bound to it.
    New(NewArgs),
    /// Publish a document, creating or updating the post as needed.
    Post(PublishArgs),
    /// Publish a document that has not been posted before.
    Create(PublishArgs),
    /// Update a previously posted document.
    Update(PublishArgs),
    /// Delete the remote post and the cache file.
    Delete(DocArgs),
    /// Show cached publish information of a document.
    Info(DocArgs),
    /// Open the published post in the browser.
    Open(DocArgs),
    /// Open the post preview in the browser.
    Preview(DocArgs),
    /// List recent posts.
    List(ListArgs),
    /// List blog categories or assign categories to a document.
    Categories(CategoriesArgs),
    /// Print the converted HTML body.
    Dump(DumpArgs),
    /// Write a standalone HTML page.
    Compile(CompileArgs),
}

fn main() {
    let cli = Cli::parse();

    // -v enables INFO, -vv DEBUG, otherwise RUST_LOG or WARN
    let filter = match cli.global.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::new(cli.global);
    let result = match cli.command {
        Commands::New(args) => args.execute(&ctx),
        Commands::Post(args) => args.execute(&ctx, PublishMode::Post),
        Commands::Create(args) => args.execute(&ctx, PublishMode::Create),
        Commands::Update(args) => args.execute(&ctx, PublishMode::Update),
        Commands::Delete(args) => args.delete(&ctx),
        Commands::Info(args) => args.info(&ctx),
        Commands::Open(args) => browse::execute(&args, &ctx, false),
        Commands::Preview(args) => browse::execute(&args, &ctx, true),
        Commands::List(args) => args.execute(&ctx),
        Commands::Categories(args) => args.execute(&ctx),
        Commands::Dump(args) => args.execute(&ctx),
        Commands::Compile(args) => args.execute(&ctx),
    };

    if let Err(err) = result {
        ctx.output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

//! Wenku8 CLI - browse the wenku8 light novel site from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wenku8::config::Config;
use wenku8::console::Console;
use wenku8::pages::image_urls;
use wenku8::{Lang, NovelSortMethod, SearchMethod, Wenku8Client};

/// Client for the wenku8 light novel site.
#[derive(Parser, Debug)]
#[command(name = "wenku8")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page language: zh-cn (GBK) or zh-tw (Big5). Defaults to the config file.
    #[arg(long, global = true)]
    lang: Option<Lang>,

    /// Print records as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a novel's details.
    Info { aid: u32 },

    /// List a novel's volumes and chapters.
    Index { aid: u32 },

    /// Print one chapter's text.
    Chapter { aid: u32, cid: u32 },

    /// Search novels by title, or by author with --author.
    Search {
        keyword: String,

        #[arg(long)]
        author: bool,

        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Show a toplist, e.g. allvisit, lastupdate, anime.
    List {
        sort: NovelSortMethod,

        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Show the bookshelf; category 0 lists all.
    Bookshelf {
        #[arg(long, default_value_t = 0)]
        bid: u32,
    },

    /// Download a novel's cover image.
    Cover {
        aid: u32,

        #[arg(long, short)]
        output: PathBuf,
    },
}

impl Command {
    fn needs_login(&self) -> bool {
        !matches!(self, Command::Cover { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wenku8=info")),
        )
        .init();

    let args = Args::parse();
    let console = Console::new();

    let config = Config::load().context("Failed to load configuration")?;
    if args.command.needs_login() && !config.account.is_configured() {
        let config_path = Config::config_path()?;
        console.warning(&format!(
            "Account not configured. Please edit: {}",
            config_path.display()
        ));
        console.info("Set your wenku8 username and password in the config file and run again.");
        return Ok(());
    }
    config.validate().context("Invalid configuration")?;

    let client = Wenku8Client::new(&config).context("Failed to create HTTP client")?;
    if args.command.needs_login() {
        client
            .login(
                &config.account.username,
                &config.account.password,
                config.account.validity,
            )
            .await
            .context("Login failed")?;
    }

    let lang = args.lang.unwrap_or(config.site.lang);
    if let Err(e) = run(&client, &console, args.command, lang, args.json).await {
        console.error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    client: &Wenku8Client,
    console: &Console,
    command: Command,
    lang: Lang,
    json: bool,
) -> Result<()> {
    match command {
        Command::Info { aid } => {
            let info = client.get_novel_info(aid, lang).await?;
            emit(json, &info, || console.format_novel_info(&info))
        }
        Command::Index { aid } => {
            let index = client.get_novel_index(aid, lang).await?;
            emit(json, &index, || console.format_novel_index(&index))
        }
        Command::Chapter { aid, cid } => {
            let content = client.get_novel_content(aid, cid, lang).await?;
            let images = image_urls(&content);
            if !images.is_empty() {
                console.info(&format!("{} illustration(s) in this chapter", images.len()));
            }
            emit(json, &content, || content.clone())
        }
        Command::Search {
            keyword,
            author,
            page,
        } => {
            let method = if author {
                SearchMethod::Author
            } else {
                SearchMethod::Name
            };
            let result = client.search_novel(&keyword, method, page, lang).await?;
            emit(json, &result, || console.format_search_result(&result))
        }
        Command::List { sort, page } => {
            let result = client.get_novel_list(sort, page, lang).await?;
            emit(json, &result, || console.format_search_result(&result))
        }
        Command::Bookshelf { bid } => {
            let items = client.get_bookshelf(bid, lang).await?;
            emit(json, &items, || console.format_bookshelf(&items))
        }
        Command::Cover { aid, output } => {
            let bytes = client.get_novel_cover(aid).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            console.success(&format!(
                "Saved cover of {aid} to {} ({} bytes)",
                output.display(),
                bytes.len()
            ));
            Ok(())
        }
    }
}

/// Prints a record either as JSON or through its console rendering.
fn emit<T: Serialize>(json: bool, record: &T, render: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{}", render());
    }
    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;

use libgen_fiction::config::CONFIG;
use libgen_fiction::{LibgenStore, SearchCriteria, SearchOptions};

#[derive(Parser, Debug)]
#[command(name = "libgen-fiction", about = "Search Libgen Fiction and resolve download links")]
struct Cli {
    /// Print debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the fiction catalog
    Search {
        query: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long, value_enum, default_value_t = Criteria::Any)]
        criteria: Criteria,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        format: Option<String>,
        /// Listing page to fetch, starting at 1
        #[arg(long)]
        page: Option<u32>,
        /// Show results the way the store plugin lists them
        #[arg(long)]
        store: bool,
    },
    /// Resolve the direct download link for an md5
    Download { md5: String },
    /// Print the catalog page for an md5, or the site root
    Open { md5: Option<String> },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Criteria {
    Any,
    Title,
    Authors,
    Series,
}

impl From<Criteria> for SearchCriteria {
    fn from(c: Criteria) -> Self {
        match c {
            Criteria::Any => SearchCriteria::Any,
            Criteria::Title => SearchCriteria::Title,
            Criteria::Authors => SearchCriteria::Authors,
            Criteria::Series => SearchCriteria::Series,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Also collects records from the `log` macros used by the library.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let store = LibgenStore::from_config().context("failed to build client")?;

    match cli.command {
        Command::Search {
            query,
            limit,
            timeout,
            criteria,
            language,
            format,
            page,
            store: as_listings,
        } => {
            let timeout = timeout.map(Duration::from_secs).unwrap_or(CONFIG.timeout);
            if as_listings {
                let max_results = limit.unwrap_or(CONFIG.max_results);
                let listings = store
                    .search(&query, max_results, timeout)
                    .await
                    .with_context(|| format!("search for {query:?} failed"))?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&listings)?);
                } else {
                    for l in &listings {
                        println!("{}  {}  [{}]  {}", l.detail_item, l.title, l.formats, l.author);
                    }
                }
                return Ok(());
            }

            let mut options = SearchOptions::default()
                .limit(limit.unwrap_or(CONFIG.max_results))
                .timeout(timeout)
                .criteria(criteria.into());
            options.language = language;
            options.format = format;
            options.page = page;

            let response = store
                .client()
                .search(&query, &options)
                .await
                .with_context(|| format!("search for {query:?} failed"))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.is_empty() {
                println!("No results.");
            } else {
                for r in &response.results {
                    println!("{}  {} / {} ({})", r.md5, r.title, r.authors, r.language);
                    for m in &r.mirrors {
                        println!("    {} {}{}  {}", m.format, m.size, m.unit, m.url);
                    }
                }
                if let Some(p) = &response.pagination {
                    println!("{} of {} total", response.len(), p.total_results);
                }
            }
        }
        Command::Download { md5 } => {
            let url = store
                .client()
                .download_url(&md5)
                .await
                .with_context(|| format!("could not resolve download for {md5}"))?;
            if cli.json {
                println!("{}", serde_json::json!({ "md5": md5, "url": url }));
            } else {
                println!("{url}");
            }
        }
        Command::Open { md5 } => {
            println!("{}", store.open_url(md5.as_deref())?);
        }
    }
    Ok(())
}

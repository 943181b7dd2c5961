//! Command-line front end: scrape an Amazon link into listing JSON, or extract
//! metadata from a saved product page.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use product_parser::{
    extract_asin, extract_product_metadata_with, ExtractOptions, FetchConfig, FetchError,
    ProductFetcher, ProductOverrides,
};

#[derive(Parser, Debug)]
#[command(name = "product_parser")]
#[command(about = "Extract Amazon product metadata for affiliate pages")]
struct Args {
    /// Amazon product link, short link or bare ASIN
    input: String,

    /// Extract from a saved HTML file instead of fetching
    #[arg(long)]
    html: Option<PathBuf>,

    /// Title to use when none can be scraped
    #[arg(long)]
    title: Option<String>,

    /// Image URL to use when none can be scraped
    #[arg(long)]
    image: Option<String>,

    /// Description to use when none can be scraped
    #[arg(long)]
    description: Option<String>,

    /// Partner key appended to the product link as `tag=dropcharge-<key>`
    #[arg(long, env = "PRODUCT_PARSER_AFFILIATE_KEY")]
    affiliate_key: Option<String>,

    /// Fall back to the first <h1> for the title
    #[arg(long)]
    heading_fallback: bool,

    /// Marketplace host the product page is fetched from
    #[arg(long, env = "PRODUCT_PARSER_MARKETPLACE", default_value = "www.amazon.de")]
    marketplace: String,

    /// Product page timeout in seconds
    #[arg(long, env = "PRODUCT_PARSER_TIMEOUT_SECS", default_value_t = 12)]
    timeout_secs: u64,

    /// Short link resolution timeout in seconds
    #[arg(long, env = "PRODUCT_PARSER_RESOLVE_TIMEOUT_SECS", default_value_t = 10)]
    resolve_timeout_secs: u64,

    /// User-Agent header sent to Amazon
    #[arg(long, env = "PRODUCT_PARSER_USER_AGENT")]
    user_agent: Option<String>,

    /// Origin to fetch `/dp/<ASIN>` from instead of the marketplace
    #[arg(long, env = "PRODUCT_PARSER_FETCH_BASE", hide = true)]
    fetch_base: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

async fn run(args: &Args) -> Result<String> {
    let options = ExtractOptions {
        heading_fallback: args.heading_fallback,
    };

    if let Some(path) = &args.html {
        let asin = extract_asin(&args.input)
            .ok_or_else(|| FetchError::InvalidInput(args.input.clone()))?;
        let html =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let metadata = extract_product_metadata_with(&html, &asin, &options);
        return to_json(&metadata, args.pretty);
    }

    let mut config = FetchConfig::default()
        .marketplace(args.marketplace.clone())
        .page_timeout(Duration::from_secs(args.timeout_secs))
        .resolve_timeout(Duration::from_secs(args.resolve_timeout_secs));
    if let Some(user_agent) = &args.user_agent {
        config = config.user_agent(user_agent.clone());
    }
    if let Some(base) = &args.fetch_base {
        config = config.fetch_base(base.clone());
    }
    let fetcher = ProductFetcher::new(config)?;

    let overrides = ProductOverrides {
        title: args.title.clone(),
        image: args.image.clone(),
        description: args.description.clone(),
    };

    let mut listing = fetcher.scrape(&args.input, &overrides, &options).await?;
    if let Some(key) = &args.affiliate_key {
        listing = listing.with_affiliate_key(key);
    }
    to_json(&listing, args.pretty)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            match e.downcast_ref::<FetchError>() {
                Some(FetchError::InvalidInput(_)) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

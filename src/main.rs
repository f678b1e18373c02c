//! # product_graph
//!
//! Scrapes product listings from Bukalapak and Tokopedia product pages and
//! writes them out as an RDF graph.
//!
//! ## Usage
//!
//! ```sh
//! product_graph --source bukalapak
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential pass:
//! 1. **Input**: Load `links.json` (site tag to URL list). Failure here is fatal.
//! 2. **Scraping**: For each selected site, normalize, fetch, parse and extract
//!    every URL in order. Failed URLs are logged and skipped.
//! 3. **Graph**: Each product is folded into one [`graph::ProductGraph`].
//! 4. **Output**: Serialize the graph once as RDF/XML to `output.xml`,
//!    `output_2.xml`, ... without overwriting earlier runs.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod fetch;
mod graph;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod url_utils;
mod utils;

use cli::Cli;
use fetch::HttpFetcher;
use graph::ProductGraph;
use models::LinkSources;
use outputs::rdf_xml;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.debug.is_some() { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("product_graph starting up");
    debug!(?args, "Parsed CLI arguments");

    let links = match LinkSources::load(&args.links).await {
        Ok(links) => links,
        Err(e) => {
            error!(error = %e, "Cannot read links file; aborting before any fetch");
            return Err(e.into());
        }
    };

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
    debug!(timeout = ?fetcher.timeout(), "HTTP client ready");

    let mut graph = ProductGraph::new();
    let reports = pipeline::run_sources(&fetcher, &mut graph, &links, args.source, args.debug).await;

    for report in &reports {
        for failure in &report.failures {
            debug!(
                site = %report.site,
                position = failure.position,
                url = %failure.url,
                error = %failure.error,
                "Skipped URL"
            );
        }
    }

    let scraped: usize = reports.iter().map(|r| r.scraped).sum();
    let skipped: usize = reports.iter().map(|r| r.failures.len()).sum();
    info!(
        sites = reports.len(),
        scraped,
        skipped,
        triples = graph.len(),
        spec_properties = graph.vocabulary().minted_count(),
        "Scraping complete"
    );

    let path = match rdf_xml::write_graph(&graph, &args.output_dir).await {
        Ok(path) => path,
        Err(e) => {
            error!(error = %e, "Failed to write RDF output");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        path = %path.display(),
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}

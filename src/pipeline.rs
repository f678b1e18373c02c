//! Field extraction dispatcher.
//!
//! Resolves a site tag to its extractor and walks that site's URLs in order:
//! normalize, fetch, parse, extract, then fold the result into the graph.
//! A URL that fails at any step is logged with its 1-based position and
//! skipped. Nothing a single URL does can end the run.
//!
//! URLs are processed strictly one after another; each page is folded into
//! the graph before the next request starts.

use crate::error::{ConfigurationError, UrlError};
use crate::fetch::PageFetcher;
use crate::graph::ProductGraph;
use crate::models::{LinkSources, ProductFields, Site};
use crate::scrapers::{SiteExtractor, extractor_for};
use crate::url_utils::{normalize_for_fetch, record_for_provenance};
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};

/// A URL that was skipped, and why.
#[derive(Debug)]
pub struct UrlFailure {
    /// 1-based position in the site's URL list.
    pub position: usize,
    pub url: String,
    pub error: UrlError,
}

/// Outcome of dispatching one site's URL list.
#[derive(Debug)]
pub struct RunReport {
    pub site: Site,
    pub attempted: usize,
    pub scraped: usize,
    pub failures: Vec<UrlFailure>,
}

/// Scrape every URL for `site_tag` into `graph`.
///
/// An unsupported tag returns [`ConfigurationError`] before any fetch.
/// When `debug_dump` is set, each parsed page is written to the debug log
/// before extraction.
#[instrument(level = "info", skip(fetcher, graph, urls), fields(urls = urls.len()))]
pub async fn run<F: PageFetcher>(
    fetcher: &F,
    graph: &mut ProductGraph,
    site_tag: &str,
    urls: &[String],
    debug_dump: bool,
) -> Result<RunReport, ConfigurationError> {
    let site: Site = site_tag.parse()?;
    let extractor = extractor_for(site);
    let total = urls.len();
    let mut report = RunReport {
        site,
        attempted: total,
        scraped: 0,
        failures: Vec::new(),
    };

    for (i, raw_url) in urls.iter().enumerate() {
        let position = i + 1;
        match scrape_one(fetcher, extractor, raw_url, debug_dump).await {
            Ok((fields, source_url)) => {
                graph.add_product(&fields, site, &source_url);
                report.scraped += 1;
                info!(
                    position,
                    total,
                    %site,
                    name = %fields.name,
                    "Scraped product {position}/{total} from {site}: {}",
                    fields.name
                );
            }
            Err(e) => {
                warn!(
                    position,
                    total,
                    url = %raw_url,
                    error = %e,
                    "Skipping URL {position}/{total}; failed to scrape product details"
                );
                report.failures.push(UrlFailure {
                    position,
                    url: raw_url.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        %site,
        attempted = report.attempted,
        scraped = report.scraped,
        skipped = report.failures.len(),
        "Finished site"
    );
    Ok(report)
}

/// Dispatch the sites selected on the command line.
///
/// With `source` set only that site runs, and only if the links file lists
/// it. Otherwise every entry runs in file order. `debug_site` enables the
/// page dump for that one site.
pub async fn run_sources<F: PageFetcher>(
    fetcher: &F,
    graph: &mut ProductGraph,
    links: &LinkSources,
    source: Option<Site>,
    debug_site: Option<Site>,
) -> Vec<RunReport> {
    let selected: Vec<(&str, &[String])> = match source {
        Some(site) => match links.urls_for(site.tag()) {
            Some(urls) => vec![(site.tag(), urls)],
            None => {
                let e = ConfigurationError::SourceNotInLinks(site.tag().to_string());
                error!(error = %e, "Nothing to scrape");
                Vec::new()
            }
        },
        None => links.iter().collect(),
    };

    let mut reports = Vec::new();
    for (tag, urls) in selected {
        let debug_dump = debug_dump_enabled(debug_site, tag);
        match run(fetcher, graph, tag, urls, debug_dump).await {
            Ok(report) => reports.push(report),
            Err(e) => error!(site = %tag, error = %e, "Skipping site"),
        }
    }
    reports
}

/// Whether the page dump is on for `tag`, given the `--debug` site.
fn debug_dump_enabled(debug_site: Option<Site>, tag: &str) -> bool {
    debug_site.is_some_and(|s| s.tag() == tag)
}

/// Fetch and extract a single URL, returning the fields and the recorded
/// source URL.
async fn scrape_one<F: PageFetcher, E: SiteExtractor>(
    fetcher: &F,
    extractor: &E,
    raw_url: &str,
    debug_dump: bool,
) -> Result<(ProductFields, String), UrlError> {
    let fetch_url = normalize_for_fetch(raw_url)?;
    debug!(site = %extractor.site(), url = %fetch_url, "Scraping URL");

    let body = fetcher.fetch(&fetch_url).await?;
    let document = Html::parse_document(&body);
    if debug_dump {
        debug!("\n{}", document.html());
    }

    let fields = extractor.extract(&document)?;
    Ok((fields, record_for_provenance(&fetch_url)))
}

//! Command-line interface definitions for product_graph.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Paths can also be provided via environment variables.

use crate::fetch::DEFAULT_TIMEOUT;
use crate::models::Site;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the product graph scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape every site listed in ./links.json
/// product_graph
///
/// # Only Tokopedia, dumping each parsed page to the debug log
/// product_graph --source tokopedia --debug tokopedia
///
/// # Different input and output locations
/// product_graph -l data/links.json -o out/
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Only scrape this site (default: every site in the links file)
    #[arg(short, long, value_enum)]
    pub source: Option<Site>,

    /// Dump each parsed page to the debug log for this site
    #[arg(short, long, value_enum)]
    pub debug: Option<Site>,

    /// JSON file mapping site tags to product URLs
    #[arg(short, long, env = "LINKS_FILE", default_value = "links.json")]
    pub links: PathBuf,

    /// Directory the RDF/XML output is written to
    #[arg(short, long, env = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["product_graph"]);

        assert_eq!(cli.source, None);
        assert_eq!(cli.debug, None);
        assert_eq!(cli.timeout_secs, 10);
        assert_eq!(Duration::from_secs(cli.timeout_secs), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_cli_site_flags() {
        let cli = Cli::parse_from([
            "product_graph",
            "--source",
            "tokopedia",
            "--debug",
            "bukalapak",
        ]);

        assert_eq!(cli.source, Some(Site::Tokopedia));
        assert_eq!(cli.debug, Some(Site::Bukalapak));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "product_graph",
            "-s",
            "bukalapak",
            "-l",
            "/tmp/links.json",
            "-o",
            "/tmp/out",
        ]);

        assert_eq!(cli.source, Some(Site::Bukalapak));
        assert_eq!(cli.links, PathBuf::from("/tmp/links.json"));
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_cli_rejects_unknown_site() {
        assert!(Cli::try_parse_from(["product_graph", "--source", "shopee"]).is_err());
    }
}

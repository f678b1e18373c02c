//! Data models shared across the scrape pipeline.
//!
//! - [`Site`]: the supported marketplace templates, keyed by site tag
//! - [`ProductFields`]: the fields extracted from one product page
//! - [`LinkSources`]: the `links.json` input, site tag to URL list

use crate::error::{ConfigurationError, LinksError};
use clap::ValueEnum;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument};

/// A marketplace whose product page template we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Site {
    Bukalapak,
    Tokopedia,
}

impl Site {
    /// The lowercase tag used in `links.json` and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            Site::Bukalapak => "bukalapak",
            Site::Tokopedia => "tokopedia",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Site {
    type Err = ConfigurationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "bukalapak" => Ok(Site::Bukalapak),
            "tokopedia" => Ok(Site::Tokopedia),
            other => Err(ConfigurationError::UnsupportedSite(other.to_string())),
        }
    }
}

/// Fields scraped from a single product page.
///
/// `image_url` is empty when the page has no primary image. `specs` is empty
/// for sites that do not publish a specification table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductFields {
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub specs: BTreeMap<String, String>,
}

/// The `links.json` input: site tags mapped to product URLs.
///
/// Entries keep the order they appear in the file so sites are scraped in
/// the order the user listed them. Tags are kept as raw strings; an unknown
/// tag only fails when that site is dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSources {
    entries: Vec<(String, Vec<String>)>,
}

impl LinkSources {
    /// Read and parse a links file. Any failure here is fatal to the run.
    #[instrument(level = "info", skip_all)]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LinksError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LinksError::Io {
                path: display.clone(),
                source,
            })?;
        let sources: LinkSources =
            serde_json::from_str(&raw).map_err(|source| LinksError::Json {
                path: display,
                source,
            })?;
        info!(
            sites = sources.entries.len(),
            urls = sources.entries.iter().map(|(_, urls)| urls.len()).sum::<usize>(),
            "Loaded links file"
        );
        Ok(sources)
    }

    /// URLs listed for one site tag, if the tag is present.
    pub fn urls_for(&self, tag: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, urls)| urls.as_slice())
    }

    /// All `(tag, urls)` entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(tag, urls)| (tag.as_str(), urls.as_slice()))
    }
}

impl<'de> Deserialize<'de> for LinkSources {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LinkSourcesVisitor;

        impl<'de> Visitor<'de> for LinkSourcesVisitor {
            type Value = LinkSources;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping site tags to arrays of URLs")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((tag, urls)) = map.next_entry::<String, Vec<String>>()? {
                    // JSON objects keep the last duplicate key
                    match entries.iter_mut().find(|(t, _)| *t == tag) {
                        Some(existing) => existing.1 = urls,
                        None => entries.push((tag, urls)),
                    }
                }
                Ok(LinkSources { entries })
            }
        }

        deserializer.deserialize_map(LinkSourcesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_site_from_tag() {
        assert_eq!("bukalapak".parse::<Site>().unwrap(), Site::Bukalapak);
        assert_eq!("tokopedia".parse::<Site>().unwrap(), Site::Tokopedia);
        assert_eq!(
            "shopee".parse::<Site>().unwrap_err(),
            ConfigurationError::UnsupportedSite("shopee".to_string())
        );
    }

    #[test]
    fn test_site_tag_round_trips_through_display() {
        for site in [Site::Bukalapak, Site::Tokopedia] {
            assert_eq!(site.to_string().parse::<Site>().unwrap(), site);
        }
    }

    #[test]
    fn test_link_sources_preserve_file_order() {
        let json = r#"{
            "tokopedia": ["https://www.tokopedia.com/a"],
            "bukalapak": ["https://www.bukalapak.com/p/1", "https://www.bukalapak.com/p/2"]
        }"#;
        let sources: LinkSources = serde_json::from_str(json).unwrap();
        let tags: Vec<&str> = sources.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!["tokopedia", "bukalapak"]);
        assert_eq!(sources.urls_for("bukalapak").unwrap().len(), 2);
        assert!(sources.urls_for("shopee").is_none());
    }

    #[test]
    fn test_link_sources_keep_unknown_tags() {
        let json = r#"{"shopee": ["https://shopee.co.id/x"]}"#;
        let sources: LinkSources = serde_json::from_str(json).unwrap();
        assert_eq!(sources.urls_for("shopee").unwrap(), ["https://shopee.co.id/x"]);
    }

    #[test]
    fn test_link_sources_reject_non_string_urls() {
        let json = r#"{"bukalapak": [1, 2]}"#;
        assert!(serde_json::from_str::<LinkSources>(json).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LinkSources::load(dir.path().join("links.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, LinksError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"bukalapak\": [").unwrap();
        let err = LinkSources::load(file.path()).await.unwrap_err();
        assert!(matches!(err, LinksError::Json { .. }));
    }

    #[tokio::test]
    async fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bukalapak": ["http://x/p1"]}}"#).unwrap();
        let sources = LinkSources::load(file.path()).await.unwrap();
        assert_eq!(sources.urls_for("bukalapak").unwrap(), ["http://x/p1"]);
    }
}

//! Marketplace product page extractors.
//!
//! Each supported site is described by a [`SiteTemplate`]: a small table of
//! which selector feeds which field, what to capture from the match, and
//! whether the field is required. All templates share the same extraction
//! code, so adding a site means adding a table, not new branching.
//!
//! # Supported Sources
//!
//! | Site | Module | Specs table |
//! |------|--------|-------------|
//! | Bukalapak | [`bukalapak`] | yes, from `<tr>` rows |
//! | Tokopedia | [`tokopedia`] | no, always empty |
//!
//! # Failure Policy
//!
//! A required field that matches nothing aborts extraction for that page
//! with [`ExtractionFailure::MissingRequiredField`]. Optional fields fall
//! back to an empty string or an empty map and are never reported.

pub mod bukalapak;
pub mod tokopedia;

use crate::error::ExtractionFailure;
use crate::models::{ProductFields, Site};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Extraction capability shared by every site.
pub trait SiteExtractor {
    /// The site this extractor reads.
    fn site(&self) -> Site;

    /// Pull all product fields out of a parsed product page.
    fn extract(&self, document: &Html) -> Result<ProductFields, ExtractionFailure>;
}

/// What to take from the element a [`FieldRule`] selects.
#[derive(Debug, Clone, Copy)]
pub enum Capture {
    /// Trimmed text content.
    Text,
    /// Value of the named attribute, untrimmed.
    Attr(&'static str),
}

/// One row of a site's selector table.
#[derive(Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub selector: Selector,
    pub capture: Capture,
    pub required: bool,
}

impl FieldRule {
    pub fn new(field: &'static str, selector: &str, capture: Capture, required: bool) -> Self {
        Self {
            field,
            selector: compile(selector),
            capture,
            required,
        }
    }

    /// Apply the rule to a document.
    ///
    /// `Ok(None)` means an optional field was absent.
    pub fn apply(&self, document: &Html) -> Result<Option<String>, ExtractionFailure> {
        let value = document
            .select(&self.selector)
            .next()
            .map(|element| capture(element, self.capture));

        match value {
            Some(v) => Ok(Some(v)),
            None if self.required => Err(ExtractionFailure::MissingRequiredField(self.field)),
            None => Ok(None),
        }
    }
}

/// Selectors for a key/value specification table.
///
/// Every element matching `row` is scanned; a row contributes an entry only
/// when both `key` and `value` match inside it.
#[derive(Debug)]
pub struct SpecTable {
    pub row: Selector,
    pub key: Selector,
    pub value: Selector,
}

impl SpecTable {
    pub fn new(row: &str, key: &str, value: &str) -> Self {
        Self {
            row: compile(row),
            key: compile(key),
            value: compile(value),
        }
    }

    pub fn collect(&self, document: &Html) -> BTreeMap<String, String> {
        let mut specs = BTreeMap::new();
        for row in document.select(&self.row) {
            let key = row.select(&self.key).next();
            let value = row.select(&self.value).next();
            if let (Some(key), Some(value)) = (key, value) {
                specs.insert(element_text(key), element_text(value));
            }
        }
        specs
    }
}

/// A site's full selector table.
#[derive(Debug)]
pub struct SiteTemplate {
    pub site: Site,
    pub name: FieldRule,
    pub price: FieldRule,
    pub image: FieldRule,
    pub specs: Option<SpecTable>,
}

impl SiteTemplate {
    pub fn extract_name(&self, document: &Html) -> Result<String, ExtractionFailure> {
        Ok(self.name.apply(document)?.unwrap_or_default())
    }

    pub fn extract_price(&self, document: &Html) -> Result<String, ExtractionFailure> {
        Ok(self.price.apply(document)?.unwrap_or_default())
    }

    pub fn extract_image(&self, document: &Html) -> Result<String, ExtractionFailure> {
        Ok(self.image.apply(document)?.unwrap_or_default())
    }

    pub fn extract_specs(&self, document: &Html) -> BTreeMap<String, String> {
        self.specs
            .as_ref()
            .map(|table| table.collect(document))
            .unwrap_or_default()
    }
}

impl SiteExtractor for SiteTemplate {
    fn site(&self) -> Site {
        self.site
    }

    fn extract(&self, document: &Html) -> Result<ProductFields, ExtractionFailure> {
        Ok(ProductFields {
            name: self.extract_name(document)?,
            price: self.extract_price(document)?,
            image_url: self.extract_image(document)?,
            specs: self.extract_specs(document),
        })
    }
}

/// Look up the extractor for a site.
pub fn extractor_for(site: Site) -> &'static SiteTemplate {
    match site {
        Site::Bukalapak => &*bukalapak::TEMPLATE,
        Site::Tokopedia => &*tokopedia::TEMPLATE,
    }
}

fn capture(element: ElementRef<'_>, capture: Capture) -> String {
    match capture {
        Capture::Text => element_text(element),
        Capture::Attr(name) => element.value().attr(name).unwrap_or_default().to_string(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// Selectors in site tables are compile-time constants.
fn compile(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector:?}: {e}"))
}

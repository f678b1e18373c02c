//! String helpers for turning scraped text into graph identifiers.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Capitalize the first character of a string.
///
/// Used for the `listedOn` literal (e.g., "bukalapak" -> "Bukalapak").
///
/// # Examples
///
/// ```ignore
/// assert_eq!(upcase("tokopedia"), "Tokopedia");
/// assert_eq!(upcase(""), "");
/// ```
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Replace every run of whitespace with a single underscore.
///
/// Used as-is for spec keys minted into properties.
pub fn underscore_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, "_").into_owned()
}

/// Local name for a product subject: whitespace runs become `_` and double
/// quotes are dropped.
///
/// Not injective. "Phone X" and "Phone  X" both map to `Phone_X`, and the
/// two products then share one node in the graph.
pub fn sanitize_identifier(name: &str) -> String {
    underscore_whitespace(name).replace('"', "")
}

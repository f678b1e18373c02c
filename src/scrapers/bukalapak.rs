//! Bukalapak product page template.
//!
//! Product pages live under `https://www.bukalapak.com/p/...`. The price sits
//! inside the main product price block, the primary image is the first
//! picture in the image slider, and specifications are published as a plain
//! `<th>`/`<td>` table.

use super::{Capture, FieldRule, SiteTemplate, SpecTable};
use crate::models::Site;
use once_cell::sync::Lazy;

pub static TEMPLATE: Lazy<SiteTemplate> = Lazy::new(|| SiteTemplate {
    site: Site::Bukalapak,
    name: FieldRule::new("name", "h1", Capture::Text, true),
    price: FieldRule::new(
        "price",
        "div.c-main-product__price div.c-product-price span",
        Capture::Text,
        true,
    ),
    image: FieldRule::new(
        "image",
        r#"div[data-testid="slider-items"] > picture > img"#,
        Capture::Attr("src"),
        false,
    ),
    specs: Some(SpecTable::new("tr", "th", "td:last-child")),
});

//! Tokopedia product page template.
//!
//! Tokopedia does not expose a structured specification table, so specs are
//! always empty.

use super::{Capture, FieldRule, SiteTemplate};
use crate::models::Site;
use once_cell::sync::Lazy;

pub static TEMPLATE: Lazy<SiteTemplate> = Lazy::new(|| SiteTemplate {
    site: Site::Tokopedia,
    name: FieldRule::new("name", "h1", Capture::Text, true),
    price: FieldRule::new("price", "div.price", Capture::Text, true),
    image: FieldRule::new(
        "image",
        r#"img[data-testid="PDPMainImage"]"#,
        Capture::Attr("src"),
        false,
    ),
    specs: None,
});

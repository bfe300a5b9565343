//! Pure extraction of product details from a parsed page.

use scraper::{ElementRef, Html};
use url::Url;

use super::rules::CompiledRules;
use super::{IMAGE_NOT_FOUND, ProductDetails, UNKNOWN_PRODUCT};

pub(crate) fn parse_product_page(
    html: &str,
    base_url: &Url,
    page_url: &Url,
    rules: &CompiledRules,
) -> ProductDetails {
    let document = Html::parse_document(html);

    let name = document
        .select(&rules.name)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());

    let reference = document
        .select(&rules.reference)
        .next()
        .and_then(|el| parse_reference(&element_text(el), &rules.reference_label));

    // First match wins: zoom attribute on the product image, then Open-Graph.
    let image_url = zoom_image_url(&document, rules, base_url)
        .or_else(|| og_image_url(&document, rules, page_url));

    let error = image_url.is_none().then(|| IMAGE_NOT_FOUND.to_string());

    ProductDetails {
        name: Some(name),
        reference,
        image_url,
        error,
    }
}

/// Extracts a reference code from the text of the reference element.
///
/// The leading `label` (ASCII case-insensitive) is dropped along with any
/// whitespace or `:`/`.`/`#` separators after it, then the first
/// whitespace-delimited token is kept.
///
/// ```
/// use catalog_scraper_core::extract::parse_reference;
///
/// assert_eq!(parse_reference("Ref: ABC123 extra", "Ref").as_deref(), Some("ABC123"));
/// assert_eq!(parse_reference("Ref", "Ref"), None);
/// ```
#[must_use]
pub fn parse_reference(raw: &str, label: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_label = match trimmed.get(..label.len()) {
        Some(prefix) if !label.is_empty() && prefix.eq_ignore_ascii_case(label) => {
            &trimmed[label.len()..]
        }
        _ => trimmed,
    };
    without_label
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '.' | '#'))
        .split_whitespace()
        .next()
        .map(str::to_string)
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn zoom_image_url(document: &Html, rules: &CompiledRules, base_url: &Url) -> Option<Url> {
    let raw = document
        .select(&rules.zoom_image)
        .next()?
        .value()
        .attr(&rules.zoom_image_attr)?
        .trim();
    if raw.is_empty() {
        return None;
    }
    // Page markup uses "./img/..." style locations relative to the site root.
    let relative = raw.trim_start_matches(['.', '/']);
    base_url.join(relative).ok()
}

fn og_image_url(document: &Html, rules: &CompiledRules, page_url: &Url) -> Option<Url> {
    let content = document
        .select(&rules.og_image)
        .next()?
        .value()
        .attr(&rules.og_image_attr)?
        .trim();
    if content.is_empty() {
        return None;
    }
    page_url.join(content).ok()
}

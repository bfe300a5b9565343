//! File naming for downloaded product images.
//!
//! Names are derived only from the product reference, the product name, and
//! the image URL, so the same product always maps to the same file. That
//! mapping is what makes re-runs skip images already on disk.

use url::Url;

/// Placeholder used in file names when a product has no reference code.
pub const MISSING_REFERENCE: &str = "noref";

/// Builds `{reference}_{sanitized_name}{extension}` for an image.
///
/// ```
/// use catalog_scraper_core::download::build_image_filename;
/// use url::Url;
///
/// let url = Url::parse("https://shop.test/img/widget.jpg?v=3").unwrap();
/// assert_eq!(build_image_filename(&url, "Widget Pro", Some("W-1")), "W-1_Widget_Pro.jpg");
/// ```
#[must_use]
pub fn build_image_filename(image_url: &Url, product_name: &str, reference: Option<&str>) -> String {
    let reference = reference.map_or_else(|| MISSING_REFERENCE.to_string(), sanitize_reference);
    let name = sanitize_product_name(product_name);
    let extension = extension_from_image_url(image_url);
    format!("{reference}_{name}{extension}")
}

/// Keeps alphanumerics, spaces, and hyphens, trims trailing whitespace, and
/// turns the remaining spaces into underscores.
#[must_use]
pub fn sanitize_product_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-'))
        .collect();
    kept.trim_end().replace(' ', "_")
}

/// Returns the extension (with its dot) of the URL's last path segment, or
/// an empty string. Query and fragment are ignored; leading dots of the
/// segment do not start an extension.
#[must_use]
pub fn extension_from_image_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let stem_start = segment.len() - segment.trim_start_matches('.').len();
    segment[stem_start..]
        .rfind('.')
        .map(|dot| segment[stem_start + dot..].to_string())
        .unwrap_or_default()
}

/// Reference codes come from page text; path separators and reserved
/// characters become underscores so the code cannot escape the target dir.
fn sanitize_reference(reference: &str) -> String {
    reference
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

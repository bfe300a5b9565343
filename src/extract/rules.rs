//! Page-structure contract for product pages.
//!
//! All selectors and attribute names the extractor depends on live here, so
//! a site redesign is a change to [`ExtractionRules`] alone.

use scraper::Selector;

use super::ExtractError;

/// Selectors and attributes describing where product data sits in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    /// Element whose text is the product name.
    pub name_selector: String,
    /// Element whose text carries the product reference code.
    pub reference_selector: String,
    /// Label preceding the code in the reference element.
    pub reference_label: String,
    /// Product image element carrying the full-size image location.
    pub zoom_image_selector: String,
    /// Attribute of the zoom image element holding the location.
    pub zoom_image_attr: String,
    /// Open-Graph image meta tag.
    pub og_image_selector: String,
    /// Attribute of the Open-Graph tag holding the image URL.
    pub og_image_attr: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            name_selector: "h1".to_string(),
            reference_selector: "div.reference".to_string(),
            reference_label: "Ref".to_string(),
            zoom_image_selector: "img.img_slide_produit".to_string(),
            zoom_image_attr: "data-zoom".to_string(),
            og_image_selector: r#"meta[property="og:image"]"#.to_string(),
            og_image_attr: "content".to_string(),
        }
    }
}

/// [`ExtractionRules`] with selectors parsed once up front.
#[derive(Debug)]
pub(crate) struct CompiledRules {
    pub(crate) name: Selector,
    pub(crate) reference: Selector,
    pub(crate) reference_label: String,
    pub(crate) zoom_image: Selector,
    pub(crate) zoom_image_attr: String,
    pub(crate) og_image: Selector,
    pub(crate) og_image_attr: String,
}

impl CompiledRules {
    pub(crate) fn compile(rules: &ExtractionRules) -> Result<Self, ExtractError> {
        Ok(Self {
            name: compile_selector(&rules.name_selector)?,
            reference: compile_selector(&rules.reference_selector)?,
            reference_label: rules.reference_label.clone(),
            zoom_image: compile_selector(&rules.zoom_image_selector)?,
            zoom_image_attr: rules.zoom_image_attr.clone(),
            og_image: compile_selector(&rules.og_image_selector)?,
            og_image_attr: rules.og_image_attr.clone(),
        })
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

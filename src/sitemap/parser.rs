//! Streaming `<loc>` extraction from sitemap XML.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::SitemapError;

/// Collects every `<loc>` entry containing `marker`, in document order.
///
/// Namespaced tags (`<sm:loc>`) are accepted. Entry text is trimmed and
/// entities are unescaped before matching.
///
/// # Errors
///
/// Returns [`SitemapError::Xml`] when the document is not well-formed.
pub fn parse_sitemap_locs(xml: &[u8], marker: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if is_loc(e.name().as_ref()) => {
                in_loc = true;
                current.clear();
            }
            Ok(Event::Text(e)) if in_loc => {
                let text = e.unescape().map_err(|source| SitemapError::Xml { source })?;
                current.push_str(&text);
            }
            Ok(Event::CData(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) if is_loc(e.name().as_ref()) => {
                in_loc = false;
                let loc = current.trim();
                if loc.contains(marker) {
                    locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => return Err(SitemapError::Xml { source }),
            Ok(_) => {}
        }
        buf.clear();
    }

    Ok(locs)
}

fn is_loc(name: &[u8]) -> bool {
    name == b"loc" || name.ends_with(b":loc")
}

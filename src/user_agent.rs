//! User-Agent identity sent with every catalog request.
//!
//! The catalog site rejects default HTTP client identities on product pages,
//! so the scraper presents a desktop browser identity for sitemap, page, and
//! image traffic alike.

/// Browser User-Agent used for all catalog requests unless overridden in config.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Returns the default User-Agent for catalog requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

//! URL helpers for canonical and pagination links

use crate::config::{PermalinkStyle, SiteConfig};

/// Whether a URL is missing its scheme and host.
pub fn is_relative(url: &str) -> bool {
    !url.starts_with("http") && !url.starts_with("//")
}

pub fn trailingslash(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

/// Scheme and host of the home URL, optionally extended with a path.
/// Relative canonicals are rewritten through this before emission.
pub fn base_url(home_url: &str, path: Option<&str>) -> String {
    let rest = home_url.split("://").nth(1).unwrap_or(home_url);
    let scheme = if home_url.contains("://") {
        home_url.split("://").next().unwrap_or("http")
    } else {
        "http"
    };
    let host = rest.split('/').next().unwrap_or(rest);
    let mut base = format!("{scheme}://{host}/");
    if let Some(path) = path {
        base.push_str(path.trim_start_matches('/'));
    }
    base
}

pub fn add_query_arg(url: &str, name: &str, value: &str) -> String {
    let joiner = if url.contains('?') { '&' } else { '?' };
    format!("{url}{joiner}{name}={}", urlencoding::encode(value))
}

/// Extend a base URL with a page number for page 2 and beyond.
///
/// Path-style permalinks append the pagination base segment and the page
/// number; query-style permalinks append a query parameter instead. Page
/// numbers below 2 return the base URL unchanged.
pub fn canonical_paged(
    config: &SiteConfig,
    url: &str,
    page: u32,
    add_pagination_base: bool,
    query_name: &str,
) -> String {
    if url.is_empty() || page < 2 {
        return url.to_string();
    }

    match config.permalinks.style {
        PermalinkStyle::Path => {
            let mut out = trailingslash(url);
            if add_pagination_base {
                out = trailingslash(&format!("{out}{}", config.permalinks.pagination_base));
            }
            trailingslash(&format!("{out}{page}"))
        }
        PermalinkStyle::Query => {
            add_query_arg(&trailingslash(url), query_name, &page.to_string())
        }
    }
}

/// URL of the search results page for a phrase.
pub fn search_link(config: &SiteConfig, query: &str) -> String {
    match config.permalinks.style {
        PermalinkStyle::Path => {
            format!("{}search/{}/", config.home(), urlencoding::encode(query))
        }
        PermalinkStyle::Query => add_query_arg(&config.home(), "s", query),
    }
}

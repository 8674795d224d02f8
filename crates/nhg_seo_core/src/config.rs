use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Default description for commerce products whose template renders empty.
/// Kept from the original deployment; override per site.
pub const DEFAULT_PRODUCT_DESCRIPTION: &str = "Finn alt du trenger av treningst\u{f8}y, \
kosttilskudd, lavkarbo, smartmat og treningsutstyr. Stort utvalg av alt innen trening. \
Rask levering til hele Norge.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermalinkStyle {
    /// Pretty path permalinks; pagination appends a path segment.
    Path,
    /// Plain permalinks; pagination appends a query parameter.
    Query,
}

#[derive(Debug, Clone)]
pub struct SiteMeta {
    pub name: String,
    pub home_url: String,
    pub locale: String,
    pub separator: String,
}

#[derive(Debug, Clone)]
pub struct IndexingConfig {
    /// Site-wide "allow search engines" toggle. `false` forces noindex.
    pub public: bool,
}

#[derive(Debug, Clone)]
pub struct PermalinkConfig {
    pub style: PermalinkStyle,
    /// Path segment inserted before archive page numbers (`/page/2/`).
    pub pagination_base: String,
    /// Query parameter carrying the page number for query-style permalinks.
    pub pagination_query: String,
}

/// Ids of the special pages the host has designated.
#[derive(Debug, Clone, Default)]
pub struct SpecialPages {
    pub front_page_id: Option<u64>,
    pub posts_page_id: Option<u64>,
    pub shop_page_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CommerceConfig {
    pub currency: String,
    pub price_decimals: usize,
    pub prices_include_tax: bool,
    pub weight_unit: String,
    pub dimension_unit: String,
    pub ratings_enabled: bool,
    /// Plural label for the product type, used by archive templates.
    pub product_type_plural: String,
    pub product_description_fallback: String,
}

#[derive(Debug, Clone, Default)]
pub struct SocialConfig {
    pub facebook_url: String,
    pub facebook_app_id: String,
    pub facebook_admin_id: String,
    pub twitter_username: String,
    pub google_site_verification: String,
    pub default_og_image: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub indexing: IndexingConfig,
    pub permalinks: PermalinkConfig,
    pub pages: SpecialPages,
    pub commerce: CommerceConfig,
    pub social: SocialConfig,
}

impl SiteConfig {
    /// Home URL with a trailing slash.
    pub fn home(&self) -> String {
        crate::url::trailingslash(&self.site.home_url)
    }
}

#[derive(Debug, Deserialize)]
struct SiteConfigRaw {
    site: SiteMetaRaw,
    indexing: Option<IndexingRaw>,
    permalinks: Option<PermalinkRaw>,
    pages: Option<SpecialPagesRaw>,
    commerce: Option<CommerceRaw>,
    social: Option<SocialRaw>,
}

#[derive(Debug, Deserialize)]
struct SiteMetaRaw {
    name: Option<String>,
    home_url: Option<String>,
    locale: Option<String>,
    separator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexingRaw {
    public: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PermalinkRaw {
    style: Option<PermalinkStyle>,
    pagination_base: Option<String>,
    pagination_query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpecialPagesRaw {
    front_page: Option<u64>,
    posts_page: Option<u64>,
    shop_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CommerceRaw {
    currency: Option<String>,
    price_decimals: Option<usize>,
    prices_include_tax: Option<bool>,
    weight_unit: Option<String>,
    dimension_unit: Option<String>,
    ratings_enabled: Option<bool>,
    product_type_plural: Option<String>,
    product_description_fallback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SocialRaw {
    facebook_url: Option<String>,
    facebook_app_id: Option<String>,
    facebook_admin_id: Option<String>,
    twitter_username: Option<String>,
    google_site_verification: Option<String>,
    default_og_image: Option<String>,
}

pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_site_config(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse_site_config(raw: &str) -> Result<SiteConfig> {
    let parsed: SiteConfigRaw =
        serde_yaml::from_str(raw).context("failed to parse YAML config")?;

    let site = SiteMeta {
        name: required_string(parsed.site.name, "site.name")?,
        home_url: required_string(parsed.site.home_url, "site.home_url")?,
        locale: parsed
            .site
            .locale
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "en_US".to_string()),
        separator: parsed.site.separator.unwrap_or_else(|| "-".to_string()),
    };

    let indexing = IndexingConfig {
        public: parsed.indexing.and_then(|raw| raw.public).unwrap_or(true),
    };

    let permalinks = match parsed.permalinks {
        Some(raw) => PermalinkConfig {
            style: raw.style.unwrap_or(PermalinkStyle::Path),
            pagination_base: raw.pagination_base.unwrap_or_else(|| "page".to_string()),
            pagination_query: raw.pagination_query.unwrap_or_else(|| "page".to_string()),
        },
        None => PermalinkConfig {
            style: PermalinkStyle::Path,
            pagination_base: "page".to_string(),
            pagination_query: "page".to_string(),
        },
    };

    let pages = match parsed.pages {
        Some(raw) => SpecialPages {
            front_page_id: raw.front_page,
            posts_page_id: raw.posts_page,
            shop_page_id: raw.shop_page,
        },
        None => SpecialPages::default(),
    };

    let commerce = match parsed.commerce {
        Some(raw) => CommerceConfig {
            currency: raw.currency.unwrap_or_else(|| "USD".to_string()),
            price_decimals: raw.price_decimals.unwrap_or(2),
            prices_include_tax: raw.prices_include_tax.unwrap_or(false),
            weight_unit: raw.weight_unit.unwrap_or_else(|| "kg".to_string()),
            dimension_unit: raw.dimension_unit.unwrap_or_else(|| "cm".to_string()),
            ratings_enabled: raw.ratings_enabled.unwrap_or(true),
            product_type_plural: raw
                .product_type_plural
                .unwrap_or_else(|| "Products".to_string()),
            product_description_fallback: raw
                .product_description_fallback
                .unwrap_or_else(|| DEFAULT_PRODUCT_DESCRIPTION.to_string()),
        },
        None => default_commerce(),
    };

    let social = match parsed.social {
        Some(raw) => SocialConfig {
            facebook_url: raw.facebook_url.unwrap_or_default(),
            facebook_app_id: raw.facebook_app_id.unwrap_or_default(),
            facebook_admin_id: raw.facebook_admin_id.unwrap_or_default(),
            twitter_username: raw.twitter_username.unwrap_or_default(),
            google_site_verification: raw.google_site_verification.unwrap_or_default(),
            default_og_image: raw.default_og_image.unwrap_or_default(),
        },
        None => SocialConfig::default(),
    };

    Ok(SiteConfig {
        site,
        indexing,
        permalinks,
        pages,
        commerce,
        social,
    })
}

fn default_commerce() -> CommerceConfig {
    CommerceConfig {
        currency: "USD".to_string(),
        price_decimals: 2,
        prices_include_tax: false,
        weight_unit: "kg".to_string(),
        dimension_unit: "cm".to_string(),
        ratings_enabled: true,
        product_type_plural: "Products".to_string(),
        product_description_fallback: DEFAULT_PRODUCT_DESCRIPTION.to_string(),
    }
}

fn required_string(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("missing required field: {field}"),
    }
}

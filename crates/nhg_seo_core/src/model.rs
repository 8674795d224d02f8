//! Content, commerce and request models

use chrono::{DateTime, NaiveDate, Utc};

/// Marker counted in post bodies to split them into pages.
pub const PAGE_BREAK: &str = "<!--nextpage-->";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Publish,
    Private,
    Draft,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: u64,
    pub post_type: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub status: PostStatus,
    pub password: Option<String>,
    pub permalink: String,
}

impl Post {
    pub fn is_private(&self) -> bool {
        self.status == PostStatus::Private
    }

    pub fn is_password_protected(&self) -> bool {
        self.password.as_deref().is_some_and(|value| !value.is_empty())
    }

    /// Number of body pages, derived from page-break markers.
    pub fn page_count(&self) -> u32 {
        self.content.matches(PAGE_BREAK).count() as u32 + 1
    }
}

#[derive(Debug, Clone)]
pub struct Term {
    pub id: u64,
    pub taxonomy: String,
    pub name: String,
    pub description: String,
    pub parent: u64,
}

impl Term {
    pub fn is_top_level(&self) -> bool {
        self.parent == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Dimensions {
    pub height: f64,
    pub width: f64,
    pub length: f64,
}

#[derive(Debug, Clone)]
pub enum ProductKind {
    Simple,
    Variable {
        min_price: f64,
        max_price: f64,
        variation_count: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub permalink: String,
    pub sku: Option<String>,
    /// Stored global trade identifier, classified by digit length on emission.
    pub gtin: Option<String>,
    pub kind: ProductKind,
    pub price: Option<f64>,
    pub on_sale: bool,
    pub sale_end: Option<NaiveDate>,
    pub in_stock: bool,
    pub average_rating: f64,
    pub rating_count: u32,
    pub review_count: u32,
    pub image_id: Option<u64>,
    pub gallery_ids: Vec<u64>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
}

/// An approved top-level product review.
#[derive(Debug, Clone)]
pub struct Review {
    pub author: String,
    pub body: String,
    pub rating: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: Option<String>,
    pub mime: Option<String>,
}

/// Commerce views that never index, regardless of the resolved context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommerceView {
    Cart,
    Checkout,
    Account,
}

/// Immutable snapshot of the inbound request, built once by the host and
/// threaded through every resolver call.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Full URL of the current request, used where no better link exists.
    pub url: String,
    /// `Some` marks a search results request, even with an empty phrase.
    pub search_query: Option<String>,
    /// Resolved single-entity id, including the static front page.
    pub singular_id: Option<u64>,
    /// Queried taxonomy term for archive requests.
    pub term_id: Option<u64>,
    pub is_front_page: bool,
    pub is_posts_page: bool,
    /// Request targets the designated commerce catalog root.
    pub is_shop: bool,
    /// In-body page number of a paginated single entity (`page` query var).
    pub page: u32,
    /// Archive page number (`paged` query var).
    pub paged: u32,
    /// Total pages of the current archive/search query.
    pub max_pages: u32,
    /// A query-string indicator that forces noindex (comment reply links).
    pub noindex_param: bool,
    pub commerce_view: Option<CommerceView>,
}

impl PageRequest {
    pub fn is_singular(&self) -> bool {
        self.singular_id.is_some()
    }

    /// Non-first page of a paginated archive view.
    pub fn is_paged(&self) -> bool {
        self.paged > 1
    }
}

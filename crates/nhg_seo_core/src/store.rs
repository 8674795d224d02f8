//! Read-only accessor interfaces over the host's content, commerce and
//! metadata stores, plus in-memory implementations for tests and embedding.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{ImageMeta, Post, Product, Review, Term};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no permalink for term {0}")]
    TermLink(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityKind {
    Post,
    Term,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MetaField {
    Title,
    Description,
    Robots,
    PrimaryTerm,
}

impl MetaField {
    /// Storage key of the field in the host's key/value meta table.
    pub fn key(&self) -> &'static str {
        match self {
            MetaField::Title => "_nhg_seo_title",
            MetaField::Description => "_nhg_seo_description",
            MetaField::Robots => "_nhg_seo_robots",
            MetaField::PrimaryTerm => "_nhg_seo_primary_term",
        }
    }
}

pub trait ContentStore {
    fn post(&self, id: u64) -> Option<Post>;
    fn term(&self, id: u64) -> Option<Term>;
    /// Permalink of a term archive. Lookup failures surface as errors and
    /// degrade to an empty canonical at the caller.
    fn term_link(&self, term: &Term) -> Result<String, StoreError>;
    /// Ancestors of a term, root first.
    fn term_ancestors(&self, term_id: u64) -> Vec<Term>;
    fn image(&self, id: u64) -> Option<ImageMeta>;
    fn image_by_url(&self, url: &str) -> Option<ImageMeta>;
    /// Featured image id attached to a post, if any.
    fn featured_image(&self, post_id: u64) -> Option<u64>;
    /// Thumbnail image id attached to a term, if any.
    fn term_image(&self, term_id: u64) -> Option<u64>;
}

pub trait CommerceStore {
    /// Product backing a post id, when the post is a product.
    fn product(&self, post_id: u64) -> Option<Product>;
    fn brands(&self, product_id: u64) -> Vec<Term>;
    fn categories(&self, product_id: u64) -> Vec<Term>;
    /// Most recent approved top-level reviews, newest first.
    fn reviews(&self, product_id: u64, limit: usize) -> Vec<Review>;
}

/// Per-entity stored metadata overrides. The core only reads; writes
/// belong to the admin editing surface.
pub trait MetaStore {
    fn get(&self, kind: EntityKind, id: u64, field: MetaField) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct MemoryContent {
    pub posts: BTreeMap<u64, Post>,
    pub terms: BTreeMap<u64, Term>,
    pub term_links: BTreeMap<u64, String>,
    pub images: BTreeMap<u64, ImageMeta>,
    pub featured_images: BTreeMap<u64, u64>,
    pub term_images: BTreeMap<u64, u64>,
}

impl ContentStore for MemoryContent {
    fn post(&self, id: u64) -> Option<Post> {
        self.posts.get(&id).cloned()
    }

    fn term(&self, id: u64) -> Option<Term> {
        self.terms.get(&id).cloned()
    }

    fn term_link(&self, term: &Term) -> Result<String, StoreError> {
        self.term_links
            .get(&term.id)
            .cloned()
            .ok_or(StoreError::TermLink(term.id))
    }

    fn term_ancestors(&self, term_id: u64) -> Vec<Term> {
        let mut chain = Vec::new();
        let mut current = self.terms.get(&term_id).map(|term| term.parent);
        while let Some(parent_id) = current {
            if parent_id == 0 {
                break;
            }
            match self.terms.get(&parent_id) {
                Some(parent) => {
                    current = Some(parent.parent);
                    chain.push(parent.clone());
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    fn image(&self, id: u64) -> Option<ImageMeta> {
        self.images.get(&id).cloned()
    }

    fn image_by_url(&self, url: &str) -> Option<ImageMeta> {
        self.images.values().find(|image| image.url == url).cloned()
    }

    fn featured_image(&self, post_id: u64) -> Option<u64> {
        self.featured_images.get(&post_id).copied()
    }

    fn term_image(&self, term_id: u64) -> Option<u64> {
        self.term_images.get(&term_id).copied()
    }
}

#[derive(Debug, Default)]
pub struct MemoryCommerce {
    pub products: BTreeMap<u64, Product>,
    pub brands: BTreeMap<u64, Vec<Term>>,
    pub categories: BTreeMap<u64, Vec<Term>>,
    pub reviews: BTreeMap<u64, Vec<Review>>,
}

impl CommerceStore for MemoryCommerce {
    fn product(&self, post_id: u64) -> Option<Product> {
        self.products.get(&post_id).cloned()
    }

    fn brands(&self, product_id: u64) -> Vec<Term> {
        self.brands.get(&product_id).cloned().unwrap_or_default()
    }

    fn categories(&self, product_id: u64) -> Vec<Term> {
        self.categories.get(&product_id).cloned().unwrap_or_default()
    }

    fn reviews(&self, product_id: u64, limit: usize) -> Vec<Review> {
        let mut reviews = self.reviews.get(&product_id).cloned().unwrap_or_default();
        reviews.sort_by(|a, b| b.date.cmp(&a.date));
        reviews.truncate(limit);
        reviews
    }
}

#[derive(Debug, Default)]
pub struct MemoryMeta {
    entries: BTreeMap<(EntityKind, u64, MetaField), String>,
}

impl MemoryMeta {
    pub fn set(&mut self, kind: EntityKind, id: u64, field: MetaField, value: &str) {
        self.entries.insert((kind, id, field), value.to_string());
    }

    pub fn delete(&mut self, kind: EntityKind, id: u64, field: MetaField) {
        self.entries.remove(&(kind, id, field));
    }
}

impl MetaStore for MemoryMeta {
    fn get(&self, kind: EntityKind, id: u64, field: MetaField) -> Option<String> {
        self.entries.get(&(kind, id, field)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: u64, name: &str, parent: u64) -> Term {
        Term {
            id,
            taxonomy: "product_cat".to_string(),
            name: name.to_string(),
            description: String::new(),
            parent,
        }
    }

    #[test]
    fn ancestors_are_returned_root_first() {
        let mut content = MemoryContent::default();
        content.terms.insert(1, term(1, "Clothing", 0));
        content.terms.insert(2, term(2, "Shirts", 1));
        content.terms.insert(3, term(3, "T-Shirts", 2));
        let ancestors = content.term_ancestors(3);
        let names: Vec<_> = ancestors.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Clothing", "Shirts"]);
    }

    #[test]
    fn missing_term_link_is_an_error() {
        let content = MemoryContent::default();
        let orphan = term(9, "Orphan", 0);
        assert!(content.term_link(&orphan).is_err());
    }

    #[test]
    fn meta_set_get_delete_round_trip() {
        let mut meta = MemoryMeta::default();
        meta.set(EntityKind::Post, 5, MetaField::Title, "Custom");
        assert_eq!(
            meta.get(EntityKind::Post, 5, MetaField::Title).as_deref(),
            Some("Custom")
        );
        meta.delete(EntityKind::Post, 5, MetaField::Title);
        assert_eq!(meta.get(EntityKind::Post, 5, MetaField::Title), None);
    }

    #[test]
    fn reviews_are_newest_first_and_limited() {
        use chrono::TimeZone;
        let mut commerce = MemoryCommerce::default();
        let review = |day, author: &str| Review {
            author: author.to_string(),
            body: "Nice".to_string(),
            rating: Some(5.0),
            date: chrono::Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        };
        commerce.reviews.insert(
            1,
            vec![review(1, "a"), review(3, "c"), review(2, "b")],
        );
        let top = commerce.reviews(1, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].author, "c");
        assert_eq!(top[1].author, "b");
    }
}

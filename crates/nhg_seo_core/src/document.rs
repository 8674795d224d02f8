//! Document resolution.
//!
//! Classifies the inbound request into exactly one content context and
//! exposes the metadata bundle (title, description, robots, canonical)
//! behind per-field request-scoped memoization.

use std::cell::OnceCell;

use tracing::debug;

use crate::config::SiteConfig;
use crate::model::{PageRequest, Post, Term};
use crate::replacer;
use crate::robots::Robots;
use crate::sanitize::{collapse_whitespace_runs, convert_smilies, decode_entities, strip_tags};
use crate::store::{CommerceStore, ContentStore, EntityKind, MetaField, MetaStore};
use crate::strategy::{self, ObjectType, TemplateField};
use crate::url;
use crate::variables::VarContext;

pub const NOT_FOUND_TITLE: &str = "Page not found";

/// Everything resolution needs, constructed once per request and passed
/// through the call chain. Never a process-wide value.
pub struct ResolveContext<'a> {
    pub config: &'a SiteConfig,
    pub request: &'a PageRequest,
    pub content: &'a dyn ContentStore,
    pub commerce: &'a dyn CommerceStore,
    pub meta: &'a dyn MetaStore,
}

/// A single content entity view. The static front page counts as one; it
/// may carry the taxonomy term the request originally targeted, used only
/// as a description fallback.
pub struct Singular {
    pub post: Option<Post>,
    pub origin_term: Option<Term>,
}

/// The commerce catalog root. Reuses the singular canonical and robots
/// shape through its bound page entity, but draws title and description
/// from the `archive/product` strategy entry.
pub struct Shop {
    pub inner: Singular,
}

/// A category/tag/custom-taxonomy archive view.
pub struct Taxonomy {
    pub term: Option<Term>,
}

pub enum DocumentKind {
    Singular(Singular),
    Shop(Shop),
    Taxonomy(Taxonomy),
    Search,
    NotFound,
}

impl DocumentKind {
    fn name(&self) -> &'static str {
        match self {
            DocumentKind::Singular(_) => "singular",
            DocumentKind::Shop(_) => "shop",
            DocumentKind::Taxonomy(_) => "taxonomy",
            DocumentKind::Search => "search",
            DocumentKind::NotFound => "not_found",
        }
    }
}

/// Canonical parts as computed by a variant, before document-level
/// post-processing.
#[derive(Debug, Clone, Default)]
struct VariantCanonical {
    canonical: String,
    unpaged: Option<String>,
    /// Manually configured canonical; wins outright when non-empty.
    manual: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CanonicalSet {
    canonical: String,
    unpaged: String,
    no_override: String,
}

pub struct Document<'a> {
    ctx: ResolveContext<'a>,
    kind: DocumentKind,
    title: OnceCell<String>,
    description: OnceCell<String>,
    robots: OnceCell<Robots>,
    canonical: OnceCell<CanonicalSet>,
}

impl<'a> Document<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        let kind = classify(&ctx);
        debug!(context = kind.name(), "resolved document context");
        Self {
            ctx,
            kind,
            title: OnceCell::new(),
            description: OnceCell::new(),
            robots: OnceCell::new(),
            canonical: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    pub fn context(&self) -> &ResolveContext<'a> {
        &self.ctx
    }

    /// The entity a singular-shaped view is bound to (including Shop).
    pub fn bound_post(&self) -> Option<&Post> {
        match &self.kind {
            DocumentKind::Singular(doc) => doc.post.as_ref(),
            DocumentKind::Shop(doc) => doc.inner.post.as_ref(),
            _ => None,
        }
    }

    pub fn taxonomy_term(&self) -> Option<&Term> {
        match &self.kind {
            DocumentKind::Taxonomy(doc) => doc.term.as_ref(),
            _ => None,
        }
    }

    /// Whether the request views a single commerce product.
    pub fn is_product(&self) -> bool {
        self.ctx.request.is_singular()
            && self
                .bound_post()
                .is_some_and(|post| post.post_type == "product")
    }

    /// Title after sanitization: whitespace runs collapsed, markup
    /// stripped, entities decoded, emoticons converted.
    pub fn title(&self) -> &str {
        self.title.get_or_init(|| {
            let raw = self.raw_title();
            if raw.is_empty() {
                return raw;
            }
            let collapsed = collapse_whitespace_runs(&raw);
            convert_smilies(&decode_entities(&strip_tags(&collapsed)))
        })
    }

    /// Description after sanitization: trimmed, markup stripped.
    pub fn description(&self) -> &str {
        self.description.get_or_init(|| {
            let raw = self.raw_description();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return String::new();
            }
            strip_tags(trimmed)
        })
    }

    /// Validated robots mapping with the site-wide overrides applied.
    pub fn robots(&self) -> &Robots {
        self.robots.get_or_init(|| {
            // Cart/checkout/account views never index; skip the variant
            // computation entirely.
            if self.ctx.request.commerce_view.is_some() {
                return Robots::noindex_follow();
            }

            let mut robots = self.raw_robots().validate();
            if !self.ctx.config.indexing.public || self.ctx.request.noindex_param {
                robots.set("index", "noindex");
            }
            robots
        })
    }

    pub fn canonical(&self) -> &str {
        &self.canonical_set().canonical
    }

    /// Canonical without pagination, for prev/next link generation.
    pub fn canonical_unpaged(&self) -> &str {
        &self.canonical_set().unpaged
    }

    /// Canonical ignoring any manual override.
    pub fn canonical_no_override(&self) -> &str {
        &self.canonical_set().no_override
    }

    fn canonical_set(&self) -> &CanonicalSet {
        self.canonical.get_or_init(|| self.generate_canonical())
    }

    fn generate_canonical(&self) -> CanonicalSet {
        let parts = self.raw_canonical();
        let mut canonical = parts.canonical;
        let mut unpaged = parts.unpaged.unwrap_or_default();

        if self.ctx.request.is_front_page {
            canonical = self.ctx.config.home();
        }

        // Only non-singular views paginate at the document level.
        if !self.ctx.request.is_singular() {
            unpaged = canonical.clone();
            canonical = url::canonical_paged(
                self.ctx.config,
                &canonical,
                self.ctx.request.paged,
                true,
                &self.ctx.config.permalinks.pagination_query,
            );
        }

        let no_override = canonical.clone();

        // Canonical links are absolute; relative is not an option.
        if !canonical.is_empty() && url::is_relative(&canonical) {
            canonical = url::base_url(&self.ctx.config.site.home_url, Some(&canonical));
        }
        if !parts.manual.is_empty() {
            canonical = parts.manual;
        }

        CanonicalSet {
            canonical,
            unpaged,
            no_override,
        }
    }

    fn raw_title(&self) -> String {
        match &self.kind {
            DocumentKind::Singular(doc) => doc.title(&self.ctx),
            DocumentKind::Shop(doc) => doc.title(&self.ctx),
            DocumentKind::Taxonomy(doc) => doc.title(&self.ctx),
            DocumentKind::Search => search_title(&self.ctx),
            DocumentKind::NotFound => NOT_FOUND_TITLE.to_string(),
        }
    }

    fn raw_description(&self) -> String {
        match &self.kind {
            DocumentKind::Singular(doc) => doc.description(&self.ctx),
            DocumentKind::Shop(doc) => doc.description(&self.ctx),
            DocumentKind::Taxonomy(doc) => doc.description(&self.ctx),
            DocumentKind::Search | DocumentKind::NotFound => String::new(),
        }
    }

    fn raw_robots(&self) -> Robots {
        match &self.kind {
            DocumentKind::Singular(doc) => doc.robots(&self.ctx),
            DocumentKind::Shop(doc) => doc.robots(&self.ctx),
            DocumentKind::Taxonomy(doc) => doc.robots(&self.ctx),
            DocumentKind::Search => Robots::new(),
            DocumentKind::NotFound => {
                let mut robots = Robots::new();
                robots.set("index", "noindex");
                robots
            }
        }
    }

    fn raw_canonical(&self) -> VariantCanonical {
        match &self.kind {
            DocumentKind::Singular(doc) => doc.canonical(&self.ctx),
            DocumentKind::Shop(doc) => doc.inner.canonical(&self.ctx),
            DocumentKind::Taxonomy(doc) => doc.canonical(&self.ctx),
            DocumentKind::Search => search_canonical(&self.ctx),
            DocumentKind::NotFound => VariantCanonical::default(),
        }
    }
}

/// Classify a request, first match wins: search, shop, singular (the
/// static front page counts), taxonomy archive, then the 404 fallback.
fn classify(ctx: &ResolveContext<'_>) -> DocumentKind {
    let request = ctx.request;

    if request.search_query.is_some() {
        return DocumentKind::Search;
    }

    if request.is_shop {
        let post = ctx
            .config
            .pages
            .shop_page_id
            .and_then(|id| ctx.content.post(id));
        return DocumentKind::Shop(Shop {
            inner: Singular {
                post,
                origin_term: None,
            },
        });
    }

    if let Some(id) = simple_page_id(ctx) {
        let post = ctx.content.post(id);
        let origin_term = request.term_id.and_then(|term_id| ctx.content.term(term_id));
        return DocumentKind::Singular(Singular { post, origin_term });
    }

    if let Some(term_id) = request.term_id {
        return DocumentKind::Taxonomy(Taxonomy {
            term: ctx.content.term(term_id),
        });
    }

    DocumentKind::NotFound
}

/// Id of the single entity a request targets, if any: the static front
/// page, a directly resolved entity, or the designated posts page.
fn simple_page_id(ctx: &ResolveContext<'_>) -> Option<u64> {
    let request = ctx.request;
    if request.is_front_page {
        if let Some(id) = ctx.config.pages.front_page_id {
            return Some(id);
        }
    }
    if let Some(id) = request.singular_id {
        return Some(id);
    }
    if request.is_posts_page {
        return ctx.config.pages.posts_page_id;
    }
    None
}

/// Stored override for a field, treating empty values as absent.
fn meta_override(
    ctx: &ResolveContext<'_>,
    kind: EntityKind,
    id: u64,
    field: MetaField,
) -> Option<String> {
    ctx.meta
        .get(kind, id, field)
        .filter(|value| !value.is_empty())
}

/// Stored title override with the separator and site name re-appended;
/// the persisted value omits the suffix.
fn meta_title_template(ctx: &ResolveContext<'_>, kind: EntityKind, id: u64) -> Option<String> {
    meta_override(ctx, kind, id, MetaField::Title).map(|title| format!("{title} {{sep}} {{sitename}}"))
}

impl Singular {
    fn var_context<'a>(&'a self, ctx: &'a ResolveContext<'a>, post: &'a Post) -> VarContext<'a> {
        VarContext {
            singular: true,
            ..VarContext::new(ctx.config, ctx.request).with_post(post)
        }
    }

    fn title(&self, ctx: &ResolveContext<'_>) -> String {
        let Some(post) = &self.post else {
            return NOT_FOUND_TITLE.to_string();
        };
        let var_ctx = self.var_context(ctx, post);
        if let Some(stored) = meta_title_template(ctx, EntityKind::Post, post.id) {
            return replacer::replace(&stored, &var_ctx);
        }
        replacer::replace(
            strategy::template(ObjectType::Post, Some(post.post_type.as_str()), TemplateField::Title),
            &var_ctx,
        )
    }

    fn description(&self, ctx: &ResolveContext<'_>) -> String {
        let Some(post) = &self.post else {
            return String::new();
        };
        let var_ctx = self.var_context(ctx, post);
        if let Some(stored) = meta_override(ctx, EntityKind::Post, post.id, MetaField::Description) {
            return replacer::replace(&stored, &var_ctx);
        }

        let rendered = replacer::replace(
            strategy::template(
                ObjectType::Post,
                Some(post.post_type.as_str()),
                TemplateField::Description,
            ),
            &var_ctx,
        );
        if !rendered.is_empty() {
            return rendered;
        }

        if let Some(term) = &self.origin_term {
            if !term.description.is_empty() {
                return term.description.clone();
            }
        }

        if post.post_type == "product" {
            return ctx.config.commerce.product_description_fallback.clone();
        }

        String::new()
    }

    fn robots(&self, ctx: &ResolveContext<'_>) -> Robots {
        let Some(post) = &self.post else {
            return Robots::new();
        };
        let mut robots = strategy::robots(ObjectType::Post, Some(post.post_type.as_str()));
        apply_noindex_conditions(ctx, post, &mut robots);
        robots
    }

    fn canonical(&self, ctx: &ResolveContext<'_>) -> VariantCanonical {
        let Some(post) = &self.post else {
            return VariantCanonical::default();
        };
        let mut canonical = post.permalink.clone();

        // Paginated entity bodies extend the canonical, but only within
        // the actual page count.
        let current = ctx.request.page;
        if current > 1 {
            let pages = post.page_count();
            if current <= pages {
                canonical = url::canonical_paged(
                    ctx.config,
                    &canonical,
                    current,
                    true,
                    &ctx.config.permalinks.pagination_query,
                );
            }
        }

        VariantCanonical {
            unpaged: Some(canonical.clone()),
            canonical,
            manual: String::new(),
        }
    }
}

impl Shop {
    fn var_context<'a>(&'a self, ctx: &'a ResolveContext<'a>, post: &'a Post) -> VarContext<'a> {
        VarContext {
            pt_plural: Some(ctx.config.commerce.product_type_plural.as_str()),
            ..VarContext::new(ctx.config, ctx.request).with_post(post)
        }
    }

    fn title(&self, ctx: &ResolveContext<'_>) -> String {
        let Some(post) = &self.inner.post else {
            return NOT_FOUND_TITLE.to_string();
        };
        replacer::replace(
            strategy::template(ObjectType::Archive, Some("product"), TemplateField::Title),
            &self.var_context(ctx, post),
        )
    }

    fn description(&self, ctx: &ResolveContext<'_>) -> String {
        let Some(post) = &self.inner.post else {
            return String::new();
        };
        replacer::replace(
            strategy::template(
                ObjectType::Archive,
                Some("product"),
                TemplateField::Description,
            ),
            &self.var_context(ctx, post),
        )
    }

    fn robots(&self, ctx: &ResolveContext<'_>) -> Robots {
        let Some(post) = &self.inner.post else {
            return Robots::new();
        };
        let mut robots = strategy::robots(ObjectType::Archive, Some("product"));
        apply_noindex_conditions(ctx, post, &mut robots);
        robots
    }
}

impl Taxonomy {
    fn title(&self, ctx: &ResolveContext<'_>) -> String {
        let Some(term) = &self.term else {
            return NOT_FOUND_TITLE.to_string();
        };
        let var_ctx = VarContext::new(ctx.config, ctx.request).with_term(term);
        if let Some(stored) = meta_title_template(ctx, EntityKind::Term, term.id) {
            return replacer::replace(&stored, &var_ctx);
        }
        replacer::replace(
            strategy::template(ObjectType::Term, Some(term.taxonomy.as_str()), TemplateField::Title),
            &var_ctx,
        )
    }

    fn description(&self, ctx: &ResolveContext<'_>) -> String {
        let Some(term) = &self.term else {
            return String::new();
        };
        let var_ctx = VarContext::new(ctx.config, ctx.request).with_term(term);
        if let Some(stored) = meta_override(ctx, EntityKind::Term, term.id, MetaField::Description)
        {
            return replacer::replace(&stored, &var_ctx);
        }
        replacer::replace(
            strategy::template(
                ObjectType::Term,
                Some(term.taxonomy.as_str()),
                TemplateField::Description,
            ),
            &var_ctx,
        )
    }

    fn robots(&self, _ctx: &ResolveContext<'_>) -> Robots {
        let Some(term) = &self.term else {
            return Robots::new();
        };
        strategy::robots(ObjectType::Term, Some(term.taxonomy.as_str()))
    }

    fn canonical(&self, ctx: &ResolveContext<'_>) -> VariantCanonical {
        let Some(term) = &self.term else {
            return VariantCanonical::default();
        };
        let canonical = match ctx.content.term_link(term) {
            Ok(link) => link,
            Err(err) => {
                debug!(term = term.id, %err, "term link resolution failed");
                String::new()
            }
        };
        VariantCanonical {
            canonical,
            unpaged: None,
            manual: String::new(),
        }
    }
}

fn search_title(ctx: &ResolveContext<'_>) -> String {
    replacer::replace(
        strategy::template(ObjectType::Search, None, TemplateField::Title),
        &VarContext::new(ctx.config, ctx.request),
    )
}

fn search_canonical(ctx: &ResolveContext<'_>) -> VariantCanonical {
    let query = ctx.request.search_query.as_deref().unwrap_or("");
    let canonical = if !query.is_empty() && !is_bare_pagination_token(query) {
        url::search_link(ctx.config, query)
    } else {
        String::new()
    };
    VariantCanonical {
        canonical,
        unpaged: None,
        manual: String::new(),
    }
}

/// A search phrase that is only a pagination path (`page/2`) produces no
/// canonical.
fn is_bare_pagination_token(query: &str) -> bool {
    query
        .strip_prefix("page/")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
}

/// Private, password-protected and paginated views never index. Shop and
/// Singular share this exactly.
fn apply_noindex_conditions(ctx: &ResolveContext<'_>, post: &Post, robots: &mut Robots) {
    let noindex =
        post.is_private() || post.is_password_protected() || ctx.request.is_paged();
    if noindex {
        robots.set("index", "noindex");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_site_config;
    use crate::model::{PostStatus, Product, ProductKind};
    use crate::store::{MemoryCommerce, MemoryContent, MemoryMeta};
    use chrono::TimeZone;

    fn config() -> SiteConfig {
        parse_site_config(
            "site:\n  name: Site Name\n  home_url: https://example.com\npages:\n  shop_page: 7\n",
        )
        .expect("parse config")
    }

    fn post(id: u64, post_type: &str, title: &str) -> Post {
        Post {
            id,
            post_type: post_type.to_string(),
            title: title.to_string(),
            excerpt: "An excerpt".to_string(),
            content: "Body".to_string(),
            date: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            status: PostStatus::Publish,
            password: None,
            permalink: format!("https://example.com/p{id}/"),
        }
    }

    fn term(id: u64, name: &str) -> Term {
        Term {
            id,
            taxonomy: "category".to_string(),
            name: name.to_string(),
            description: "Term description".to_string(),
            parent: 0,
        }
    }

    struct Fixture {
        config: SiteConfig,
        content: MemoryContent,
        commerce: MemoryCommerce,
        meta: MemoryMeta,
    }

    impl Fixture {
        fn new() -> Self {
            let mut content = MemoryContent::default();
            content.posts.insert(1, post(1, "post", "Hello World"));
            content.posts.insert(7, post(7, "page", "Shop"));
            content.terms.insert(10, term(10, "News"));
            content
                .term_links
                .insert(10, "https://example.com/category/news/".to_string());
            Self {
                config: config(),
                content,
                commerce: MemoryCommerce::default(),
                meta: MemoryMeta::default(),
            }
        }

        fn document<'a>(&'a self, request: &'a PageRequest) -> Document<'a> {
            Document::new(ResolveContext {
                config: &self.config,
                request,
                content: &self.content,
                commerce: &self.commerce,
                meta: &self.meta,
            })
        }
    }

    #[test]
    fn search_wins_over_everything() {
        let fixture = Fixture::new();
        let request = PageRequest {
            search_query: Some("shoes".to_string()),
            singular_id: Some(1),
            is_shop: true,
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert!(matches!(doc.kind(), DocumentKind::Search));
        assert_eq!(doc.title(), "Searched for shoes - Site Name");
    }

    #[test]
    fn singular_renders_strategy_template() {
        let fixture = Fixture::new();
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.title(), "Hello World - Site Name");
        assert_eq!(doc.description(), "An excerpt");
        assert_eq!(doc.canonical(), "https://example.com/p1/");
    }

    #[test]
    fn meta_title_override_wins_and_keeps_suffix() {
        let mut fixture = Fixture::new();
        fixture
            .meta
            .set(EntityKind::Post, 1, MetaField::Title, "Custom Title");
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.title(), "Custom Title - Site Name");
    }

    #[test]
    fn empty_meta_override_is_ignored() {
        let mut fixture = Fixture::new();
        fixture.meta.set(EntityKind::Post, 1, MetaField::Title, "");
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.title(), "Hello World - Site Name");
    }

    #[test]
    fn not_found_contract() {
        let mut fixture = Fixture::new();
        // Stored overrides are irrelevant without a resolved entity.
        fixture
            .meta
            .set(EntityKind::Post, 99, MetaField::Title, "Ignored");
        let request = PageRequest::default();
        let doc = fixture.document(&request);
        assert!(matches!(doc.kind(), DocumentKind::NotFound));
        assert_eq!(doc.title(), NOT_FOUND_TITLE);
        assert_eq!(doc.description(), "");
        assert_eq!(doc.robots().get("index"), Some("noindex"));
        assert_eq!(doc.canonical(), "");
    }

    #[test]
    fn relative_canonicals_become_absolute() {
        let mut fixture = Fixture::new();
        fixture.content.posts.get_mut(&1).expect("post").permalink = "/foo/".to_string();
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.canonical(), "https://example.com/foo/");
    }

    #[test]
    fn taxonomy_canonical_degrades_to_empty_on_lookup_failure() {
        let mut fixture = Fixture::new();
        fixture.content.term_links.clear();
        let request = PageRequest {
            term_id: Some(10),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert!(matches!(doc.kind(), DocumentKind::Taxonomy(_)));
        assert_eq!(doc.canonical(), "");
        assert_eq!(doc.title(), "News - Site Name");
        assert_eq!(doc.description(), "Term description");
    }

    #[test]
    fn shop_uses_archive_product_strategy() {
        let fixture = Fixture::new();
        let request = PageRequest {
            is_shop: true,
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert!(matches!(doc.kind(), DocumentKind::Shop(_)));
        assert_eq!(doc.title(), "Products Archive - Site Name");
    }

    #[test]
    fn shop_archive_pagination_forces_noindex() {
        let fixture = Fixture::new();
        let request = PageRequest {
            is_shop: true,
            paged: 2,
            max_pages: 5,
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.robots().get("index"), Some("noindex"));
        assert_eq!(doc.title(), "Products Archive - Page 2 of 5 - Site Name");
    }

    #[test]
    fn private_posts_force_noindex() {
        let mut fixture = Fixture::new();
        fixture.content.posts.get_mut(&1).expect("post").status = PostStatus::Private;
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.robots().to_content(), "noindex, follow");
    }

    #[test]
    fn commerce_views_short_circuit_robots() {
        let fixture = Fixture::new();
        let request = PageRequest {
            singular_id: Some(1),
            commerce_view: Some(crate::model::CommerceView::Cart),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.robots().to_content(), "noindex, follow");
    }

    #[test]
    fn discourage_indexing_setting_forces_noindex() {
        let mut fixture = Fixture::new();
        fixture.config.indexing.public = false;
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.robots().get("index"), Some("noindex"));
    }

    #[test]
    fn singular_body_pagination_extends_canonical_within_bounds() {
        let mut fixture = Fixture::new();
        fixture.content.posts.get_mut(&1).expect("post").content =
            "one<!--nextpage-->two".to_string();
        let request = PageRequest {
            singular_id: Some(1),
            page: 2,
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.canonical(), "https://example.com/p1/page/2/");

        let request = PageRequest {
            singular_id: Some(1),
            page: 3,
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.canonical(), "https://example.com/p1/");
    }

    #[test]
    fn archive_pagination_keeps_unpaged_variant() {
        let fixture = Fixture::new();
        let request = PageRequest {
            term_id: Some(10),
            paged: 3,
            max_pages: 5,
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.canonical(), "https://example.com/category/news/page/3/");
        assert_eq!(doc.canonical_unpaged(), "https://example.com/category/news/");
    }

    #[test]
    fn search_canonical_skips_bare_pagination_queries() {
        let fixture = Fixture::new();
        let request = PageRequest {
            search_query: Some("page/2".to_string()),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.canonical(), "");

        let request = PageRequest {
            search_query: Some("red shoes".to_string()),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.canonical(), "https://example.com/search/red%20shoes/");
    }

    #[test]
    fn front_page_canonical_is_home() {
        let mut fixture = Fixture::new();
        fixture.config.pages.front_page_id = Some(1);
        let request = PageRequest {
            is_front_page: true,
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert!(matches!(doc.kind(), DocumentKind::Singular(_)));
        assert_eq!(doc.canonical(), "https://example.com/");
    }

    #[test]
    fn product_description_falls_back_to_configured_copy() {
        let mut fixture = Fixture::new();
        let mut product_post = post(3, "product", "Running Shoes");
        product_post.excerpt = String::new();
        fixture.content.posts.insert(3, product_post);
        fixture.commerce.products.insert(
            3,
            Product {
                id: 3,
                name: "Running Shoes".to_string(),
                permalink: "https://example.com/p3/".to_string(),
                sku: None,
                gtin: None,
                kind: ProductKind::Simple,
                price: Some(10.0),
                on_sale: false,
                sale_end: None,
                in_stock: true,
                average_rating: 0.0,
                rating_count: 0,
                review_count: 0,
                image_id: None,
                gallery_ids: Vec::new(),
                weight: None,
                dimensions: None,
            },
        );
        let request = PageRequest {
            singular_id: Some(3),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(
            doc.description(),
            fixture.config.commerce.product_description_fallback
        );
    }

    #[test]
    fn title_sanitization_strips_markup_and_decodes() {
        let mut fixture = Fixture::new();
        fixture.content.posts.get_mut(&1).expect("post").title =
            "Fish &amp; <em>Chips</em>   Special".to_string();
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = fixture.document(&request);
        assert_eq!(doc.title(), "Fish & Chips Special - Site Name");
    }
}

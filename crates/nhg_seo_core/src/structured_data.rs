//! JSON-LD structured data: the graph collector, the breadcrumb
//! contributor, and the product node assembler.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::document::{Document, DocumentKind};
use crate::model::{Product, ProductKind, Term};
use crate::store::{EntityKind, MetaField};

const SCHEMA_CONTEXT: &str = "https://schema.org/";

const WEIGHT_UNIT_CODES: &[(&str, &str)] = &[
    ("lbs", "LBR"),
    ("kg", "KGM"),
    ("g", "GRM"),
    ("oz", "ONZ"),
];
const DEFAULT_WEIGHT_UNIT_CODE: &str = "LBR";

const DIMENSION_UNIT_CODES: &[(&str, &str)] = &[
    ("in", "INH"),
    ("m", "MTR"),
    ("cm", "CMT"),
    ("mm", "MMT"),
    ("yd", "YRD"),
];

/// Accumulates typed nodes and emits them as one `@graph` script block.
#[derive(Debug, Default)]
pub struct RichSnippet {
    data: Vec<Value>,
}

impl RichSnippet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts only nodes that declare an `@type`.
    pub fn set_data(&mut self, node: Value) -> bool {
        if node.get("@type").is_none() {
            return false;
        }
        self.data.push(node);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `<script type="application/ld+json">` block, empty when no
    /// contributor produced a node.
    pub fn render(&self) -> String {
        if self.data.is_empty() {
            return String::new();
        }
        let graph = json!({
            "@context": SCHEMA_CONTEXT,
            "@graph": self.data,
        });
        format!(
            "<script type=\"application/ld+json\">{}</script>\n",
            serde_json::to_string(&graph).unwrap_or_default()
        )
    }
}

/// Run every structured-data contributor for the document and render the
/// merged payload.
pub fn render(doc: &Document<'_>) -> String {
    let mut manager = RichSnippet::new();
    if let Some(node) = breadcrumb_node(doc) {
        manager.set_data(node);
    }
    if let Some(node) = product_node(doc) {
        manager.set_data(node);
    }
    manager.render()
}

pub(crate) fn format_price(price: f64, decimals: usize) -> String {
    format!("{price:.decimals$}")
}

fn format_rating(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Offers are assumed valid until the end of next year, unless an active
/// sale ends earlier.
fn price_valid_until(today: NaiveDate, sale_end: Option<NaiveDate>) -> String {
    let default = NaiveDate::from_ymd_opt(today.year() + 1, 12, 31)
        .unwrap_or(today);
    match sale_end {
        Some(end) if end < default => end.format("%Y-%m-%d").to_string(),
        _ => default.format("%Y-%m-%d").to_string(),
    }
}

/// Classify a trade identifier by digit length.
fn gtin_key(identifier: &str) -> &'static str {
    match identifier.len() {
        8 => "gtin8",
        12 => "gtin12",
        13 => "gtin13",
        14 => "gtin14",
        _ => "gtin",
    }
}

fn unit_code(table: &[(&str, &str)], unit: &str, default: &'static str) -> String {
    table
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| default.to_string())
}

fn quantitative_value(value: f64, code: &str) -> Value {
    json!({
        "@type": "QuantitativeValue",
        "unitCode": code,
        "value": format_quantity(value),
    })
}

/// Build the Product node, or nothing when the product carries neither
/// offers nor rating data worth publishing.
pub fn product_node(doc: &Document<'_>) -> Option<Value> {
    if !doc.is_product() {
        return None;
    }
    let ctx = doc.context();
    let post = doc.bound_post()?;
    let product = ctx.commerce.product(post.id)?;

    let mut node = Map::new();
    node.insert("@type".to_string(), json!("Product"));
    // The fragment keeps this @id distinct from the breadcrumb node's.
    node.insert("@id".to_string(), json!(format!("{}#product", product.permalink)));
    node.insert("name".to_string(), json!(product.name));
    node.insert("url".to_string(), json!(product.permalink));
    node.insert("description".to_string(), json!(doc.description()));
    if let Some(path) = category_path(doc, &product) {
        node.insert("category".to_string(), json!(path));
    }
    node.insert("releaseDate".to_string(), json!(post.date.to_rfc3339()));
    let sku = product
        .sku
        .clone()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| product.id.to_string());
    node.insert("sku".to_string(), json!(sku));

    if let Some(identifier) = product.gtin.as_deref().filter(|value| !value.is_empty()) {
        node.insert(gtin_key(identifier).to_string(), json!(identifier));
    }

    let brands = ctx.commerce.brands(product.id);
    if let Some(brand) = brands.first() {
        node.insert(
            "brand".to_string(),
            json!({ "@type": "Thing", "name": brand.name }),
        );
    }

    if let Some(offer) = offer_node(doc, &product) {
        node.insert("offers".to_string(), json!([offer]));
    }

    set_ratings(doc, &product, &mut node);

    if let Some(weight) = product.weight {
        let code = unit_code(
            WEIGHT_UNIT_CODES,
            &ctx.config.commerce.weight_unit,
            DEFAULT_WEIGHT_UNIT_CODE,
        );
        node.insert("weight".to_string(), quantitative_value(weight, &code));
    }

    if let Some(dimensions) = product.dimensions {
        let code = unit_code(DIMENSION_UNIT_CODES, &ctx.config.commerce.dimension_unit, "");
        node.insert("height".to_string(), quantitative_value(dimensions.height, &code));
        node.insert("width".to_string(), quantitative_value(dimensions.width, &code));
        node.insert("depth".to_string(), quantitative_value(dimensions.length, &code));
    }

    set_images(doc, &product, &mut node);

    // A product with no offer, rating or review is not worth publishing.
    if !node.contains_key("offers")
        && !node.contains_key("aggregateRating")
        && !node.contains_key("review")
    {
        debug!(product = product.id, "product node suppressed, nothing to publish");
        return None;
    }

    Some(Value::Object(node))
}

/// The category of the product: the primary term when one is stored and
/// still attached, otherwise the first category. Nested categories render
/// their ancestor path root to leaf.
fn category_path(doc: &Document<'_>, product: &Product) -> Option<String> {
    let ctx = doc.context();
    let categories = ctx.commerce.categories(product.id);
    let primary = ctx
        .meta
        .get(EntityKind::Post, product.id, MetaField::PrimaryTerm)
        .and_then(|value| value.parse::<u64>().ok());

    let category = primary
        .and_then(|id| categories.iter().find(|term| term.id == id))
        .or_else(|| categories.first())?;

    if category.is_top_level() {
        return Some(category.name.clone());
    }

    let mut names: Vec<String> = ctx
        .content
        .term_ancestors(category.id)
        .into_iter()
        .map(|term| term.name)
        .collect();
    names.push(category.name.clone());
    Some(names.join(" > "))
}

fn offer_node(doc: &Document<'_>, product: &Product) -> Option<Value> {
    let ctx = doc.context();
    let price = product.price?;
    let decimals = ctx.config.commerce.price_decimals;
    let currency = &ctx.config.commerce.currency;
    let vat_included = if ctx.config.commerce.prices_include_tax {
        "true"
    } else {
        "false"
    };
    let today = Utc::now().date_naive();

    let mut offer = match &product.kind {
        ProductKind::Variable {
            min_price,
            max_price,
            variation_count,
        } => {
            let lowest = format_price(*min_price, decimals);
            let highest = format_price(*max_price, decimals);
            if lowest == highest {
                json!({
                    "@type": "Offer",
                    "price": lowest,
                    "priceValidUntil": price_valid_until(today, None),
                    "priceSpecification": {
                        "price": lowest,
                        "priceCurrency": currency,
                        "valueAddedTaxIncluded": vat_included,
                    },
                })
            } else {
                json!({
                    "@type": "AggregateOffer",
                    "lowPrice": lowest,
                    "highPrice": highest,
                    "offerCount": variation_count,
                })
            }
        }
        ProductKind::Simple => {
            let sale_end = if product.on_sale { product.sale_end } else { None };
            let amount = format_price(price, decimals);
            json!({
                "@type": "Offer",
                "price": amount,
                "priceValidUntil": price_valid_until(today, sale_end),
                "priceSpecification": {
                    "price": amount,
                    "priceCurrency": currency,
                    "valueAddedTaxIncluded": vat_included,
                },
            })
        }
    };

    let availability = if product.in_stock {
        "http://schema.org/InStock"
    } else {
        "http://schema.org/OutOfStock"
    };
    if let Some(map) = offer.as_object_mut() {
        map.insert("priceCurrency".to_string(), json!(currency));
        map.insert("availability".to_string(), json!(availability));
        map.insert("url".to_string(), json!(product.permalink));
        map.insert("itemCondition".to_string(), json!("NewCondition"));
        map.insert(
            "seller".to_string(),
            json!({
                "@type": "Organization",
                "name": ctx.config.site.name,
                "url": ctx.config.site.home_url,
            }),
        );
    }

    Some(offer)
}

fn set_ratings(doc: &Document<'_>, product: &Product, node: &mut Map<String, Value>) {
    let ctx = doc.context();
    if !ctx.config.commerce.ratings_enabled || product.rating_count < 1 {
        return;
    }

    node.insert(
        "aggregateRating".to_string(),
        json!({
            "@type": "AggregateRating",
            "ratingValue": format_rating(product.average_rating),
            "bestRating": "5",
            "ratingCount": product.rating_count,
            "reviewCount": product.review_count,
        }),
    );

    let reviews = ctx.commerce.reviews(product.id, 5);
    if reviews.is_empty() {
        return;
    }

    let review_nodes: Vec<Value> = reviews
        .iter()
        .map(|review| {
            json!({
                "@type": "Review",
                "reviewRating": {
                    "@type": "Rating",
                    "bestRating": "5",
                    "ratingValue": review.rating.map(format_rating).unwrap_or_default(),
                    "worstRating": "1",
                },
                "author": { "@type": "Person", "name": review.author },
                "reviewBody": review.body,
                "datePublished": review.date.to_rfc3339(),
            })
        })
        .collect();
    node.insert("review".to_string(), json!(review_nodes));
}

fn set_images(doc: &Document<'_>, product: &Product, node: &mut Map<String, Value>) {
    let ctx = doc.context();
    let Some(image_id) = product.image_id else {
        return;
    };

    let mut images = Vec::new();
    let mut push = |id: u64| {
        if let Some(image) = ctx.content.image(id) {
            images.push(json!({
                "@type": "ImageObject",
                "url": image.url,
                "height": image.height,
                "width": image.width,
            }));
        }
    };
    push(image_id);
    for gallery_id in &product.gallery_ids {
        push(*gallery_id);
    }

    if !images.is_empty() {
        node.insert("image".to_string(), json!(images));
    }
}

/// Breadcrumb trail for the current view, Home first.
pub fn breadcrumb_node(doc: &Document<'_>) -> Option<Value> {
    let ctx = doc.context();
    let mut crumbs: Vec<(String, String)> = vec![("Home".to_string(), ctx.config.home())];

    match doc.kind() {
        DocumentKind::Singular(_) => {
            let post = doc.bound_post()?;
            if doc.is_product() {
                if let Some(product) = ctx.commerce.product(post.id) {
                    push_category_trail(doc, &product, &mut crumbs);
                }
            }
            if !ctx.request.is_front_page {
                crumbs.push((post.title.clone(), String::new()));
            }
        }
        DocumentKind::Shop(_) => {
            let name = doc
                .bound_post()
                .map(|post| post.title.clone())
                .unwrap_or_else(|| "Shop".to_string());
            crumbs.push((name, String::new()));
        }
        DocumentKind::Taxonomy(taxonomy) => {
            let term = taxonomy.term.as_ref()?;
            for ancestor in ctx.content.term_ancestors(term.id) {
                let link = ctx.content.term_link(&ancestor).unwrap_or_default();
                crumbs.push((ancestor.name, link));
            }
            crumbs.push((term.name.clone(), String::new()));
        }
        DocumentKind::Search => {
            let query = ctx.request.search_query.clone().unwrap_or_default();
            crumbs.push((format!("Search results for \"{query}\""), String::new()));
        }
        DocumentKind::NotFound => {
            crumbs.push(("Error 404".to_string(), String::new()));
        }
    }

    let items: Vec<Value> = crumbs
        .iter()
        .enumerate()
        .map(|(index, (name, link))| {
            let id = if link.is_empty() {
                ctx.request.url.clone()
            } else {
                link.clone()
            };
            json!({
                "@type": "ListItem",
                "position": index + 1,
                "item": { "name": name, "@id": id },
            })
        })
        .collect();

    let mut node = Map::new();
    node.insert("@type".to_string(), json!("BreadcrumbList"));
    node.insert("itemListElement".to_string(), json!(items));
    Some(Value::Object(node))
}

fn push_category_trail(
    doc: &Document<'_>,
    product: &Product,
    crumbs: &mut Vec<(String, String)>,
) {
    let ctx = doc.context();
    let categories = ctx.commerce.categories(product.id);
    let primary = ctx
        .meta
        .get(EntityKind::Post, product.id, MetaField::PrimaryTerm)
        .and_then(|value| value.parse::<u64>().ok());
    let Some(category) = primary
        .and_then(|id| categories.iter().find(|term| term.id == id))
        .or_else(|| categories.first())
    else {
        return;
    };

    let mut trail: Vec<Term> = ctx.content.term_ancestors(category.id);
    trail.push(category.clone());
    for term in trail {
        let link = ctx.content.term_link(&term).unwrap_or_default();
        crumbs.push((term.name, link));
    }
}

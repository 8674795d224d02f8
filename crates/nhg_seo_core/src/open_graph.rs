//! Open Graph and Twitter Card meta tag emission.

use crate::document::Document;
use crate::og_image::OgImages;
use crate::structured_data::format_price;

/// Social network dialects: Facebook tags use the `property` attribute,
/// everything else uses `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Network {
    Facebook,
    Twitter,
}

impl Network {
    fn attribute(self) -> &'static str {
        match self {
            Network::Facebook => "property",
            Network::Twitter => "name",
        }
    }
}

fn tag(out: &mut String, network: Network, property: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<meta {}=\"{}\" content=\"{}\">\n",
        network.attribute(),
        html_escape::encode_double_quoted_attribute(property),
        html_escape::encode_double_quoted_attribute(content),
    ));
}

/// Open Graph object type of the current view.
pub fn og_type(doc: &Document<'_>) -> &'static str {
    let request = doc.context().request;
    if request.is_front_page || request.is_posts_page {
        return "website";
    }
    // Archives and the like carry "object"; "article" does not apply.
    if !request.is_singular() {
        return "object";
    }
    if doc.is_product() { "product" } else { "article" }
}

/// Locale in the form Facebook expects; anything unusable falls back to
/// `en_US`.
fn facebook_locale(locale: &str) -> String {
    let mut parts = locale.split('_');
    let language = parts.next().unwrap_or("");
    let region = parts.next().unwrap_or("");
    let well_formed = parts.next().is_none()
        && language.len() == 2
        && region.len() == 2
        && language.chars().all(|ch| ch.is_ascii_lowercase())
        && region.chars().all(|ch| ch.is_ascii_uppercase());
    if well_formed {
        locale.to_string()
    } else {
        "en_US".to_string()
    }
}

pub fn render_facebook(doc: &Document<'_>, images: &OgImages, out: &mut String) {
    let ctx = doc.context();
    let kind = og_type(doc);

    tag(out, Network::Facebook, "og:locale", &facebook_locale(&ctx.config.site.locale));
    tag(out, Network::Facebook, "og:type", kind);
    tag(out, Network::Facebook, "og:title", doc.title().trim());
    tag(out, Network::Facebook, "og:description", doc.description().trim());
    tag(out, Network::Facebook, "og:url", doc.canonical());
    tag(out, Network::Facebook, "og:site_name", &ctx.config.site.name);

    if kind == "article" && !ctx.config.social.facebook_url.is_empty() {
        tag(out, Network::Facebook, "article:publisher", &ctx.config.social.facebook_url);
    }

    if !ctx.config.social.facebook_app_id.is_empty() {
        tag(out, Network::Facebook, "fb:app_id", &ctx.config.social.facebook_app_id);
    } else if !ctx.config.social.facebook_admin_id.is_empty() {
        tag(out, Network::Facebook, "fb:admins", &ctx.config.social.facebook_admin_id);
    }

    for (index, image) in images.images().iter().enumerate() {
        tag(out, Network::Facebook, "og:image", &image.url);
        if image.url.starts_with("https://") {
            tag(out, Network::Facebook, "og:image:secure_url", &image.url);
        }
        if index == 0 {
            if image.width > 0 {
                tag(out, Network::Facebook, "og:image:width", &image.width.to_string());
            }
            if image.height > 0 {
                tag(out, Network::Facebook, "og:image:height", &image.height.to_string());
            }
            if let Some(alt) = image.alt.as_deref() {
                tag(out, Network::Facebook, "og:image:alt", alt);
            }
            if let Some(mime) = image.mime.as_deref() {
                tag(out, Network::Facebook, "og:image:type", mime);
            }
        }
    }

    if doc.is_product() {
        render_product_tags(doc, out);
    }
}

fn render_product_tags(doc: &Document<'_>, out: &mut String) {
    let ctx = doc.context();
    let Some(post) = doc.bound_post() else {
        return;
    };
    let Some(product) = ctx.commerce.product(post.id) else {
        return;
    };

    let brands = ctx.commerce.brands(product.id);
    if let Some(brand) = brands.first() {
        tag(out, Network::Facebook, "product:brand", &brand.name);
    }

    if let Some(price) = product.price {
        tag(
            out,
            Network::Facebook,
            "product:price:amount",
            &format_price(price, ctx.config.commerce.price_decimals),
        );
        tag(
            out,
            Network::Facebook,
            "product:price:currency",
            &ctx.config.commerce.currency,
        );
    }

    if product.in_stock {
        tag(out, Network::Facebook, "product:availability", "instock");
    }
}

pub fn render_twitter(doc: &Document<'_>, images: &OgImages, out: &mut String) {
    let ctx = doc.context();

    tag(out, Network::Twitter, "twitter:card", "summary_large_image");
    tag(out, Network::Twitter, "twitter:title", doc.title());
    tag(out, Network::Twitter, "twitter:description", doc.description());

    if !ctx.config.social.twitter_username.is_empty() {
        tag(
            out,
            Network::Twitter,
            "twitter:site",
            &format!("@{}", ctx.config.social.twitter_username),
        );
    }

    if let Some(image) = images.first() {
        tag(out, Network::Twitter, "twitter:image", &image.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SiteConfig, parse_site_config};
    use crate::document::{Document, ResolveContext};
    use crate::model::{PageRequest, Post, PostStatus};
    use crate::og_image;
    use crate::store::{MemoryCommerce, MemoryContent, MemoryMeta};
    use chrono::TimeZone;

    fn config() -> SiteConfig {
        parse_site_config(
            "site:\n  name: Site Name\n  home_url: https://example.com\n  locale: nb_NO\n\
social:\n  twitter_username: siteshop\n  facebook_url: https://facebook.com/siteshop\n",
        )
        .expect("parse config")
    }

    fn post(id: u64) -> Post {
        Post {
            id,
            post_type: "post".to_string(),
            title: "Hello".to_string(),
            excerpt: "Summary".to_string(),
            content: "Body".to_string(),
            date: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            status: PostStatus::Publish,
            password: None,
            permalink: format!("https://example.com/p{id}/"),
        }
    }

    #[test]
    fn facebook_locale_rejects_malformed_values() {
        assert_eq!(facebook_locale("nb_NO"), "nb_NO");
        assert_eq!(facebook_locale("norsk"), "en_US");
        assert_eq!(facebook_locale("NB_no"), "en_US");
    }

    #[test]
    fn article_tags_for_singular_posts() {
        let config = config();
        let mut content = MemoryContent::default();
        content.posts.insert(1, post(1));
        let commerce = MemoryCommerce::default();
        let meta = MemoryMeta::default();
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = Document::new(ResolveContext {
            config: &config,
            request: &request,
            content: &content,
            commerce: &commerce,
            meta: &meta,
        });
        let images = og_image::collect(&doc);
        let mut out = String::new();
        render_facebook(&doc, &images, &mut out);
        assert!(out.contains("<meta property=\"og:locale\" content=\"nb_NO\">"));
        assert!(out.contains("<meta property=\"og:type\" content=\"article\">"));
        assert!(out.contains("<meta property=\"og:title\" content=\"Hello - Site Name\">"));
        assert!(out.contains(
            "<meta property=\"article:publisher\" content=\"https://facebook.com/siteshop\">"
        ));
        assert!(out.contains("<meta property=\"og:url\" content=\"https://example.com/p1/\">"));
    }

    #[test]
    fn archives_are_objects_and_front_is_website() {
        let config = config();
        let content = MemoryContent::default();
        let commerce = MemoryCommerce::default();
        let meta = MemoryMeta::default();

        let request = PageRequest::default();
        let doc = Document::new(ResolveContext {
            config: &config,
            request: &request,
            content: &content,
            commerce: &commerce,
            meta: &meta,
        });
        assert_eq!(og_type(&doc), "object");

        let request = PageRequest {
            is_front_page: true,
            ..PageRequest::default()
        };
        let doc = Document::new(ResolveContext {
            config: &config,
            request: &request,
            content: &content,
            commerce: &commerce,
            meta: &meta,
        });
        assert_eq!(og_type(&doc), "website");
    }

    #[test]
    fn twitter_card_includes_site_handle() {
        let config = config();
        let mut content = MemoryContent::default();
        content.posts.insert(1, post(1));
        let commerce = MemoryCommerce::default();
        let meta = MemoryMeta::default();
        let request = PageRequest {
            singular_id: Some(1),
            ..PageRequest::default()
        };
        let doc = Document::new(ResolveContext {
            config: &config,
            request: &request,
            content: &content,
            commerce: &commerce,
            meta: &meta,
        });
        let images = og_image::collect(&doc);
        let mut out = String::new();
        render_twitter(&doc, &images, &mut out);
        assert!(out.contains("<meta name=\"twitter:card\" content=\"summary_large_image\">"));
        assert!(out.contains("<meta name=\"twitter:site\" content=\"@siteshop\">"));
    }
}

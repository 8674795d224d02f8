//! Open Graph image selection.
//!
//! Collects candidate images for the current view: featured image,
//! in-content images, product category thumbnails, product gallery, and
//! the site-wide default as a last resort. De-duplicated by URL.

use std::sync::OnceLock;

use regex::Regex;

use crate::document::{Document, ResolveContext};
use crate::model::ImageMeta;

const MIN_DIMENSION: u32 = 200;
const MAX_DIMENSION: u32 = 2000;

fn img_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<img [^>]+>").expect("img pattern is valid"))
}

fn img_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"src=["']([^"']*)["']"#).expect("src pattern is valid"))
}

#[derive(Debug, Default)]
pub struct OgImages {
    images: Vec<ImageMeta>,
}

impl OgImages {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn images(&self) -> &[ImageMeta] {
        &self.images
    }

    pub fn first(&self) -> Option<&ImageMeta> {
        self.images.first()
    }

    fn add(&mut self, mut image: ImageMeta) {
        if image.url.is_empty() {
            return;
        }
        // Query strings never belong in an image URL.
        if let Some(cut) = image.url.find('?') {
            image.url.truncate(cut);
        }
        if self.images.iter().any(|existing| existing.url == image.url) {
            return;
        }
        self.images.push(image);
    }

    fn add_by_id(&mut self, ctx: &ResolveContext<'_>, id: u64) {
        if let Some(image) = ctx.content.image(id) {
            if has_usable_dimensions(&image) {
                self.add(image);
            }
        }
    }

    /// Gallery additions skip the dimension gate; the primary image has
    /// already been chosen by then.
    fn add_additional_by_id(&mut self, ctx: &ResolveContext<'_>, id: u64) {
        if let Some(image) = ctx.content.image(id) {
            self.add(image);
        }
    }
}

fn has_usable_dimensions(image: &ImageMeta) -> bool {
    (MIN_DIMENSION..=MAX_DIMENSION).contains(&image.width)
        && (MIN_DIMENSION..=MAX_DIMENSION).contains(&image.height)
}

/// Collect the Open Graph images for the resolved document.
pub fn collect(doc: &Document<'_>) -> OgImages {
    let ctx = doc.context();
    let mut images = OgImages::default();

    // Password-protected content exposes no imagery.
    if doc
        .bound_post()
        .is_some_and(|post| post.is_password_protected())
    {
        return images;
    }

    if ctx.request.is_front_page || ctx.request.is_posts_page {
        if let Some(post) = doc.bound_post() {
            set_featured_image(&mut images, ctx, post.id);
        }
    } else if ctx.request.is_singular() {
        if let Some(post) = doc.bound_post() {
            set_featured_image(&mut images, ctx, post.id);
            if !images.has_images() {
                set_content_images(&mut images, ctx, &post.content);
            }
        }
    }

    set_commerce_images(&mut images, doc);

    if !images.has_images() && !ctx.config.social.default_og_image.is_empty() {
        let url = ctx.config.social.default_og_image.clone();
        match ctx.content.image_by_url(&url) {
            Some(image) => images.add(image),
            None => images.add(ImageMeta {
                url,
                width: 0,
                height: 0,
                alt: None,
                mime: None,
            }),
        }
    }

    images
}

fn set_featured_image(images: &mut OgImages, ctx: &ResolveContext<'_>, post_id: u64) {
    if let Some(image_id) = ctx.content.featured_image(post_id) {
        images.add_by_id(ctx, image_id);
    }
}

/// First resolvable image referenced in the post body.
fn set_content_images(images: &mut OgImages, ctx: &ResolveContext<'_>, content: &str) {
    if !content.contains("<img") {
        return;
    }

    let mut seen = Vec::new();
    for tag in img_tag_re().find_iter(content) {
        let Some(capture) = img_src_re().captures(tag.as_str()) else {
            continue;
        };
        let src = capture[1].to_string();
        if src.is_empty() || seen.contains(&src) {
            continue;
        }
        seen.push(src.clone());

        match ctx.content.image_by_url(&src) {
            Some(image) => {
                if has_usable_dimensions(&image) {
                    images.add(image);
                }
            }
            None => images.add(ImageMeta {
                url: src,
                width: 0,
                height: 0,
                alt: None,
                mime: None,
            }),
        }

        if images.has_images() {
            return;
        }
    }
}

fn set_commerce_images(images: &mut OgImages, doc: &Document<'_>) {
    let ctx = doc.context();

    // Product category archives use the term thumbnail.
    if let Some(term) = doc.taxonomy_term() {
        if term.taxonomy == "product_cat" {
            if let Some(image_id) = ctx.content.term_image(term.id) {
                images.add_by_id(ctx, image_id);
            }
        }
    }

    if doc.is_product() {
        if let Some(post) = doc.bound_post() {
            if let Some(product) = ctx.commerce.product(post.id) {
                for image_id in &product.gallery_ids {
                    images.add_additional_by_id(ctx, *image_id);
                }
            }
        }
    }
}

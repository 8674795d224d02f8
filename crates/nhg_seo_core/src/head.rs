//! Head assembly.
//!
//! Emits every metadata section at its fixed slot in the head sequence,
//! wrapped in a stable comment block for diagnosability.

use tracing::debug;

use crate::document::Document;
use crate::og_image;
use crate::open_graph;
use crate::sanitize::truncate;
use crate::structured_data;
use crate::url;

const WRAPPER_OPEN: &str = "\n<!-- NHG SEO plugin -->\n";
const WRAPPER_CLOSE: &str = "<!-- /NHG SEO plugin -->\n\n";

const DESCRIPTION_LENGTH: usize = 160;

/// Render the full injected head block for a resolved document.
pub fn render_head(doc: &Document<'_>) -> String {
    let mut out = String::new();
    out.push_str(WRAPPER_OPEN);

    render_title(doc, &mut out);
    render_description(doc, &mut out);

    let noindex = render_robots(doc, &mut out);

    // A noindex page gets neither a canonical nor adjacent rel links.
    if noindex {
        debug!("noindex resolved, suppressing canonical and rel links");
    } else {
        render_canonical(doc, &mut out);
        render_adjacent_links(doc, &mut out);
    }

    let images = og_image::collect(doc);
    open_graph::render_facebook(doc, &images, &mut out);
    open_graph::render_twitter(doc, &images, &mut out);

    render_webmaster_tools(doc, &mut out);
    out.push_str(&structured_data::render(doc));

    out.push_str(WRAPPER_CLOSE);
    out
}

fn render_title(doc: &Document<'_>, out: &mut String) {
    let title = doc.title();
    if title.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<title>{}</title>\n",
        html_escape::encode_text(title)
    ));
}

fn render_description(doc: &Document<'_>, out: &mut String) {
    let description = doc.description();
    if description.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<meta name=\"description\" content=\"{}\"/>\n",
        html_escape::encode_double_quoted_attribute(&truncate(description, DESCRIPTION_LENGTH))
    ));
}

/// Emit the robots tag; reports whether the page resolved to noindex.
fn render_robots(doc: &Document<'_>, out: &mut String) -> bool {
    let robots = doc.robots();
    let content = robots.to_content();
    if !content.is_empty() {
        out.push_str(&format!(
            "<meta name=\"robots\" content=\"{}\"/>\n",
            html_escape::encode_double_quoted_attribute(&content)
        ));
    }
    robots.get("index") == Some("noindex")
}

fn render_canonical(doc: &Document<'_>, out: &mut String) {
    let canonical = doc.canonical();
    if canonical.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<link rel=\"canonical\" href=\"{}\" />\n",
        html_escape::encode_double_quoted_attribute(canonical)
    ));
}

/// The rel prev/next links on paginated singular bodies and archives.
fn render_adjacent_links(doc: &Document<'_>, out: &mut String) {
    let request = doc.context().request;
    if request.is_posts_page {
        return;
    }

    if request.is_singular() {
        render_adjacent_links_single(doc, out);
        return;
    }
    render_adjacent_links_archive(doc, out);
}

fn render_adjacent_links_single(doc: &Document<'_>, out: &mut String) {
    let Some(post) = doc.bound_post() else {
        return;
    };
    let pages = post.page_count();
    if pages == 1 {
        return;
    }

    let page = doc.context().request.page.max(1);
    let permalink = &post.permalink;

    if page > 1 {
        adjacent_link(doc, out, "prev", permalink, page - 1, "page");
    }
    if page < pages {
        adjacent_link(doc, out, "next", permalink, page + 1, "page");
    }
}

fn render_adjacent_links_archive(doc: &Document<'_>, out: &mut String) {
    let base = doc.canonical_unpaged().to_string();
    if base.is_empty() {
        return;
    }

    let request = doc.context().request;
    let paged = request.paged.max(1);

    if paged == 2 {
        adjacent_link(doc, out, "prev", &base, paged - 1, "paged");
    }

    // Deeper pages link back through the front page base when on it.
    let base = if request.is_front_page {
        doc.context().config.home()
    } else {
        base
    };

    if paged > 2 {
        adjacent_link(doc, out, "prev", &base, paged - 1, "paged");
    }
    if paged < request.max_pages {
        adjacent_link(doc, out, "next", &base, paged + 1, "paged");
    }
}

fn adjacent_link(
    doc: &Document<'_>,
    out: &mut String,
    rel: &str,
    base: &str,
    page: u32,
    query_name: &str,
) {
    let href = url::canonical_paged(doc.context().config, base, page, true, query_name);
    out.push_str(&format!(
        "<link rel=\"{rel}\" href=\"{}\" />\n",
        html_escape::encode_double_quoted_attribute(&href)
    ));
}

fn render_webmaster_tools(doc: &Document<'_>, out: &mut String) {
    let token = doc.context().config.social.google_site_verification.trim();
    if token.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<meta name=\"google-site-verification\" content=\"{}\" />\n",
        html_escape::encode_double_quoted_attribute(token)
    ));
}

//! Closed registry of template variables.
//!
//! Each placeholder name maps to a resolver function computed from the
//! active content context. Unknown names have no resolver and therefore
//! never substitute; known names that resolve to nothing substitute as
//! the empty string.

use crate::config::SiteConfig;
use crate::model::{PageRequest, Post, Term};
use crate::sanitize::{strip_shortcodes, strip_tags};

/// The entity the current template draws its variables from.
#[derive(Debug, Clone, Copy, Default)]
pub enum Subject<'a> {
    Post(&'a Post),
    Term(&'a Term),
    #[default]
    None,
}

/// Everything a resolver may draw on, threaded explicitly per request.
#[derive(Clone, Copy)]
pub struct VarContext<'a> {
    pub config: &'a SiteConfig,
    pub request: &'a PageRequest,
    pub subject: Subject<'a>,
    /// Whether page numbers come from the in-body `page` variable rather
    /// than the archive `paged` variable.
    pub singular: bool,
    /// Plural post-type label for archive templates.
    pub pt_plural: Option<&'a str>,
}

impl<'a> VarContext<'a> {
    pub fn new(config: &'a SiteConfig, request: &'a PageRequest) -> Self {
        Self {
            config,
            request,
            subject: Subject::None,
            singular: false,
            pt_plural: None,
        }
    }

    pub fn with_post(mut self, post: &'a Post) -> Self {
        self.subject = Subject::Post(post);
        self
    }

    pub fn with_term(mut self, term: &'a Term) -> Self {
        self.subject = Subject::Term(term);
        self
    }

    fn post(&self) -> Option<&'a Post> {
        match self.subject {
            Subject::Post(post) => Some(post),
            _ => None,
        }
    }

    fn term(&self) -> Option<&'a Term> {
        match self.subject {
            Subject::Term(term) => Some(term),
            _ => None,
        }
    }
}

pub type Resolver = fn(&VarContext<'_>) -> Option<String>;

const REGISTRY: &[(&str, Resolver)] = &[
    ("sep", var_sep),
    ("sitename", var_sitename),
    ("page", var_page),
    ("searchphrase", var_searchphrase),
    ("term", var_term),
    ("term_description", var_term_description),
    ("title", var_title),
    ("excerpt", var_excerpt),
    ("pt_plural", var_pt_plural),
];

/// Resolver registered for a placeholder name, if any.
pub fn lookup(name: &str) -> Option<Resolver> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, resolver)| *resolver)
}

fn var_sep(ctx: &VarContext<'_>) -> Option<String> {
    Some(ctx.config.site.separator.clone())
}

fn var_sitename(ctx: &VarContext<'_>) -> Option<String> {
    Some(strip_tags(&ctx.config.site.name))
}

/// `{sep} Page X of Y`, only when both the page number and the page count
/// exceed one.
fn var_page(ctx: &VarContext<'_>) -> Option<String> {
    let max = determine_max_pages(ctx);
    let page = determine_page_number(ctx);
    if max > 1 && page > 1 {
        let sep = &ctx.config.site.separator;
        return Some(format!("{sep} Page {page} of {max}"));
    }
    None
}

fn determine_page_number(ctx: &VarContext<'_>) -> u32 {
    let number = if ctx.singular {
        ctx.request.page
    } else {
        ctx.request.paged
    };
    number.max(1)
}

fn determine_max_pages(ctx: &VarContext<'_>) -> u32 {
    if ctx.singular {
        if let Some(post) = ctx.post() {
            return post.page_count();
        }
    }
    ctx.request.max_pages.max(1)
}

fn var_searchphrase(ctx: &VarContext<'_>) -> Option<String> {
    ctx.request.search_query.clone()
}

fn var_term(ctx: &VarContext<'_>) -> Option<String> {
    let term = ctx.term()?;
    if term.taxonomy.is_empty() || term.name.is_empty() {
        return None;
    }
    Some(term.name.clone())
}

fn var_term_description(ctx: &VarContext<'_>) -> Option<String> {
    let term = ctx.term()?;
    if term.description.is_empty() {
        return None;
    }
    Some(term.description.clone())
}

fn var_title(ctx: &VarContext<'_>) -> Option<String> {
    let post = ctx.post()?;
    if post.title.is_empty() {
        return None;
    }
    Some(post.title.clone())
}

/// The stored excerpt, shortcode-stripped. Always substitutes for posts so
/// a missing excerpt leaves no placeholder behind.
fn var_excerpt(ctx: &VarContext<'_>) -> Option<String> {
    let post = ctx.post()?;
    if post.excerpt.is_empty() {
        return Some(String::new());
    }
    Some(strip_shortcodes(&post.excerpt))
}

fn var_pt_plural(ctx: &VarContext<'_>) -> Option<String> {
    ctx.pt_plural.map(str::to_string)
}

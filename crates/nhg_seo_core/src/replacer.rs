//! Template substitution engine.
//!
//! Finds `{name}` placeholders, resolves each distinct one once through
//! the variable registry, substitutes all literal occurrences, then
//! collapses separator runs left behind by empty-resolving neighbours.

use std::sync::OnceLock;

use regex::Regex;

use crate::variables::{self, VarContext};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("placeholder pattern is valid"))
}

/// Render a template against a context.
pub fn replace(template: &str, ctx: &VarContext<'_>) -> String {
    if !template.contains('{') {
        return template.to_string();
    }

    let mut replacements: Vec<(String, String)> = Vec::new();
    for capture in placeholder_re().captures_iter(template) {
        let token = &capture[0];
        let name = &capture[1];
        if replacements.iter().any(|(seen, _)| seen == token) {
            continue;
        }
        if let Some(resolver) = variables::lookup(name) {
            let value = resolver(ctx).unwrap_or_default();
            replacements.push((token.to_string(), value));
        }
    }

    let mut out = template.to_string();
    for (token, value) in &replacements {
        out = out.replace(token.as_str(), value);
    }

    if let Some((_, sep)) = replacements.iter().find(|(token, _)| token == "{sep}") {
        if !sep.is_empty() {
            out = collapse_separator_runs(&out, sep);
        }
    }

    out
}

/// Collapse any run of the separator, optionally interleaved with
/// whitespace, into a single separator.
fn collapse_separator_runs(text: &str, sep: &str) -> String {
    let quoted = regex::escape(sep);
    let pattern = format!("{quoted}(?:\\s*{quoted})*");
    let re = Regex::new(&pattern).expect("separator pattern is valid");
    re.replace_all(text, sep).into_owned()
}

//! Text sanitization applied to resolved metadata before emission

use std::sync::OnceLock;

use regex::Regex;

const SMILIES: &[(&str, &str)] = &[
    (":)", "\u{1F642}"),
    (":-)", "\u{1F642}"),
    (":(", "\u{1F641}"),
    (":-(", "\u{1F641}"),
    (";)", "\u{1F609}"),
    (";-)", "\u{1F609}"),
    (":D", "\u{1F600}"),
    (":P", "\u{1F61B}"),
    ("<3", "\u{2764}\u{FE0F}"),
];

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>")
            .expect("script/style pattern is valid")
    })
}

fn caption_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\s*\[caption[^\]]*\].*?\[/caption\]\s*")
            .expect("caption pattern is valid")
    })
}

fn shortcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[/?.*?\]").expect("shortcode pattern is valid"))
}

fn trailing_entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&[^;\s]{0,6}$").expect("entity pattern is valid"))
}

/// Remove markup, drop script/style blocks whole, and collapse the
/// remaining whitespace to single spaces.
pub fn strip_tags(input: &str) -> String {
    let without_blocks = script_style_re().replace_all(input, "");
    let mut out = String::with_capacity(without_blocks.len());
    let mut in_tag = false;
    for ch in without_blocks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    collapse_whitespace(&out)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Collapse runs of two or more whitespace characters to a single space.
/// A lone whitespace character is kept as-is.
pub fn collapse_whitespace_runs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending: Option<char> = None;
    let mut run = 0usize;
    for ch in input.chars() {
        if ch.is_whitespace() {
            run += 1;
            if run == 1 {
                pending = Some(ch);
            }
        } else {
            match run {
                0 => {}
                1 => out.push(pending.take().unwrap_or(' ')),
                _ => out.push(' '),
            }
            run = 0;
            out.push(ch);
        }
    }
    match run {
        0 => {}
        1 => out.push(pending.take().unwrap_or(' ')),
        _ => out.push(' '),
    }
    out
}

pub fn decode_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

/// Convert emoticon shortcodes to their visual form. Matches whole
/// whitespace-delimited tokens only.
pub fn convert_smilies(input: &str) -> String {
    input
        .split(' ')
        .map(|token| {
            SMILIES
                .iter()
                .find(|(pattern, _)| *pattern == token)
                .map(|(_, emoji)| *emoji)
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip all shortcodes, active or orphan, including caption blocks with
/// their captioned content.
pub fn strip_shortcodes(content: &str) -> String {
    if !content.contains('[') {
        return content.to_string();
    }
    let without_captions = caption_re().replace_all(content, "");
    shortcode_re().replace_all(&without_captions, "").into_owned()
}

/// Truncate text to a character budget, trimming a partial trailing entity
/// and cutting back to the last word boundary.
pub fn truncate(input: &str, length: usize) -> String {
    let text = strip_tags(input);
    let excerpt: String = text.chars().take(length).collect();
    if excerpt == text {
        return excerpt;
    }

    let excerpt = trailing_entity_re().replace(&excerpt, "").into_owned();
    match excerpt.trim_end().rfind(' ') {
        Some(cut) => excerpt[..cut].to_string(),
        None => excerpt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_removes_markup_and_scripts() {
        let input = "<p>Hello <strong>world</strong></p><script>alert(1)</script>";
        assert_eq!(strip_tags(input), "Hello world");
    }

    #[test]
    fn strip_tags_collapses_newlines() {
        assert_eq!(strip_tags("a\n\nb\tc"), "a b c");
    }

    #[test]
    fn whitespace_runs_collapse_to_single_space() {
        assert_eq!(collapse_whitespace_runs("My   spaced\t\ttitle"), "My spaced title");
    }

    #[test]
    fn entities_decode() {
        assert_eq!(decode_entities("Fish &amp; Chips"), "Fish & Chips");
    }

    #[test]
    fn smilies_convert_only_as_whole_tokens() {
        assert_eq!(convert_smilies("Great deal :)"), "Great deal \u{1F642}");
        assert_eq!(convert_smilies("price:)x"), "price:)x");
    }

    #[test]
    fn shortcodes_are_stripped() {
        assert_eq!(
            strip_shortcodes("A [gallery ids=\"1\"] B [/orphan] C"),
            "A  B  C"
        );
    }

    #[test]
    fn caption_blocks_are_removed_with_their_content() {
        assert_eq!(
            strip_shortcodes("Before [caption width=\"1\"]a pic[/caption] after"),
            "Beforeafter"
        );
    }

    #[test]
    fn truncate_cuts_at_word_boundary() {
        let text = "A description that is going to be cut somewhere in the middle";
        let cut = truncate(text, 30);
        assert!(cut.len() <= 30);
        assert!(!cut.ends_with(' '));
        assert!(text.starts_with(&cut));
    }

    #[test]
    fn truncate_keeps_short_text_whole() {
        assert_eq!(truncate("short", 160), "short");
    }

    #[test]
    fn truncate_drops_partial_entity() {
        let text = "word &amp word word word word";
        let cut = truncate(text, 10);
        assert!(!cut.contains('&'));
    }
}

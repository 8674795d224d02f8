//! Static strategy table: per content type, the title/description
//! templates and the default robots policy.

use crate::robots::Robots;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Post,
    Term,
    Archive,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Title,
    Description,
}

#[derive(Debug, Clone, Copy)]
pub struct StrategyEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub robots: &'static [(&'static str, &'static str)],
}

const POST_ENTRY: StrategyEntry = StrategyEntry {
    title: "{title} {page} {sep} {sitename}",
    description: "{excerpt}",
    robots: &[],
};

const TERM_ENTRY: StrategyEntry = StrategyEntry {
    title: "{term} {page} {sep} {sitename}",
    description: "{term_description}",
    robots: &[],
};

const ARCHIVE_ENTRY: StrategyEntry = StrategyEntry {
    title: "{pt_plural} Archive {page} {sep} {sitename}",
    description: "{pt_plural} Archive {page} {sep} {sitename}",
    robots: &[],
};

const SEARCH_ENTRY: StrategyEntry = StrategyEntry {
    title: "Searched for {searchphrase} {page} {sep} {sitename}",
    description: "",
    robots: &[],
};

/// Subtype tables. Every type carries a `default` entry; `Search` has no
/// subtype dimension and maps straight to its entry.
fn subtype_entries(object_type: ObjectType) -> &'static [(&'static str, StrategyEntry)] {
    match object_type {
        ObjectType::Post => &[("post", POST_ENTRY), ("default", POST_ENTRY)],
        ObjectType::Term => &[("default", TERM_ENTRY)],
        ObjectType::Archive => &[("default", ARCHIVE_ENTRY)],
        ObjectType::Search => &[("default", SEARCH_ENTRY)],
    }
}

/// Look up the entry for a `(type, subtype)` pair, falling back to the
/// type's `default` subtype. `None` addresses types with no subtype
/// dimension.
pub fn entry(object_type: ObjectType, subtype: Option<&str>) -> StrategyEntry {
    let entries = subtype_entries(object_type);
    if let Some(subtype) = subtype {
        if let Some((_, entry)) = entries.iter().find(|(name, _)| *name == subtype) {
            return *entry;
        }
    }
    entries
        .iter()
        .find(|(name, _)| *name == "default")
        .map(|(_, entry)| *entry)
        .unwrap_or(StrategyEntry {
            title: "",
            description: "",
            robots: &[],
        })
}

/// Raw template string for a field; empty when nothing is configured.
pub fn template(object_type: ObjectType, subtype: Option<&str>, field: TemplateField) -> &'static str {
    let entry = entry(object_type, subtype);
    match field {
        TemplateField::Title => entry.title,
        TemplateField::Description => entry.description,
    }
}

/// Default robots policy for a `(type, subtype)` pair; empty when nothing
/// is configured.
pub fn robots(object_type: ObjectType, subtype: Option<&str>) -> Robots {
    entry(object_type, subtype).robots.iter().copied().collect()
}

//! Ordered robots directive mapping

/// Directive keys that survive validation.
pub const ALLOWED_KEYS: &[&str] = &["index", "follow", "noarchive", "noimageindex", "nosnippet"];

/// An insertion-ordered robots mapping. Keys are unique; setting an
/// existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Robots {
    entries: Vec<(String, String)>,
}

impl Robots {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `{index: noindex, follow: follow}` mapping forced onto
    /// cart/checkout/account views.
    pub fn noindex_follow() -> Self {
        let mut robots = Self::new();
        robots.set("index", "noindex");
        robots.set("follow", "follow");
        robots
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Content of the robots meta tag: directive values joined by `, `.
    pub fn to_content(&self) -> String {
        self.entries
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Intersect against the allow-list and guarantee `index` and `follow`.
    ///
    /// An empty mapping validates to the open default. Otherwise unknown
    /// keys are dropped, `index` and `follow` are defaulted back in if
    /// missing, and the result is ordered index, follow, then the
    /// surviving optional keys in insertion order.
    pub fn validate(&self) -> Robots {
        if self.entries.is_empty() {
            let mut robots = Robots::new();
            robots.set("index", "index");
            robots.set("follow", "follow");
            return robots;
        }

        let mut robots = Robots::new();
        robots.set("index", self.get("index").unwrap_or("index"));
        robots.set("follow", self.get("follow").unwrap_or("follow"));
        for (key, value) in &self.entries {
            if key == "index" || key == "follow" {
                continue;
            }
            if ALLOWED_KEYS.contains(&key.as_str()) {
                robots.set(key, value);
            }
        }
        robots
    }
}

impl FromIterator<(&'static str, &'static str)> for Robots {
    fn from_iter<I: IntoIterator<Item = (&'static str, &'static str)>>(iter: I) -> Self {
        let mut robots = Robots::new();
        for (key, value) in iter {
            robots.set(key, value);
        }
        robots
    }
}

//! Frontmatter defaults resolution
//!
//! Mirrors the usual static-site rule: among the `[[defaults]]` entries that
//! apply to a document and define the key, the one with the longest scope
//! path wins; on a tie an entry restricted to a collection type wins over an
//! untyped one, and later entries win over earlier equivalent ones.

use crate::site_config::{DefaultsEntry, DefaultsScope};

/// Looks up a front matter default for a document
pub trait DefaultsResolver {
    /// Value of `key` for the document at `path` in collection `collection`
    ///
    /// # Parameters
    /// * `path` - Site-relative document path (e.g., `_news/press.html`)
    /// * `collection` - Collection label used as the scope type
    /// * `key` - Front matter key (e.g., `layout`)
    fn find(&self, path: &str, collection: &str, key: &str) -> Option<toml::Value>;
}

/// Defaults declared in site.toml
#[derive(Debug, Clone, Default)]
pub struct FrontmatterDefaults {
    entries: Vec<DefaultsEntry>,
}

impl FrontmatterDefaults {
    /// Wrap the configured entries
    pub fn new(entries: Vec<DefaultsEntry>) -> Self {
        Self { entries }
    }
}

impl DefaultsResolver for FrontmatterDefaults {
    fn find(&self, path: &str, collection: &str, key: &str) -> Option<toml::Value> {
        let mut winner: Option<&DefaultsEntry> = None;

        for entry in &self.entries {
            if !entry.values.contains_key(key) || !applies(&entry.scope, path, collection) {
                continue;
            }
            if winner.is_none_or(|old| has_precedence(&old.scope, &entry.scope)) {
                winner = Some(entry);
            }
        }

        winner.and_then(|entry| entry.values.get(key).cloned())
    }
}

fn scope_path(scope: &DefaultsScope) -> &str {
    scope.path.trim_start_matches('/')
}

fn applies(scope: &DefaultsScope, path: &str, collection: &str) -> bool {
    let type_matches = scope
        .collection
        .as_deref()
        .is_none_or(|wanted| wanted == collection);
    let prefix = scope_path(scope);
    type_matches && (prefix.is_empty() || path.trim_start_matches('/').starts_with(prefix))
}

fn has_precedence(old: &DefaultsScope, new: &DefaultsScope) -> bool {
    let (old_len, new_len) = (scope_path(old).len(), scope_path(new).len());
    if new_len != old_len {
        new_len > old_len
    } else if new.collection.is_some() {
        true
    } else {
        old.collection.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, collection: Option<&str>, layout: &str) -> DefaultsEntry {
        let mut values = toml::Table::new();
        values.insert("layout".into(), toml::Value::String(layout.into()));
        DefaultsEntry {
            scope: DefaultsScope {
                path: path.into(),
                collection: collection.map(Into::into),
            },
            values,
        }
    }

    fn layout(defaults: &FrontmatterDefaults, path: &str, collection: &str) -> Option<String> {
        defaults
            .find(path, collection, "layout")
            .and_then(|v| v.as_str().map(String::from))
    }

    #[test]
    fn test_type_scoped_default() {
        let defaults = FrontmatterDefaults::new(vec![
            entry("", None, "page"),
            entry("", Some("sections"), "section"),
        ]);

        assert_eq!(layout(&defaults, "_sections/news.html", "sections").as_deref(), Some("section"));
        assert_eq!(layout(&defaults, "_orphans/about.html", "orphans").as_deref(), Some("page"));
    }

    #[test]
    fn test_longer_path_wins() {
        let defaults = FrontmatterDefaults::new(vec![
            entry("_news", None, "news"),
            entry("", Some("sections"), "section"),
        ]);

        assert_eq!(layout(&defaults, "_news/press.html", "sections").as_deref(), Some("news"));
        assert_eq!(layout(&defaults, "_about/team.html", "sections").as_deref(), Some("section"));
    }

    #[test]
    fn test_later_equivalent_entry_wins() {
        let defaults = FrontmatterDefaults::new(vec![
            entry("", Some("sections"), "first"),
            entry("", Some("sections"), "second"),
        ]);
        assert_eq!(layout(&defaults, "_x/y.html", "sections").as_deref(), Some("second"));
    }

    #[test]
    fn test_no_match() {
        let defaults = FrontmatterDefaults::new(vec![entry("", Some("orphans"), "page")]);
        assert_eq!(layout(&defaults, "_news/press.html", "sections"), None);
        assert_eq!(defaults.find("_news/press.html", "orphans", "sidebar"), None);
    }
}

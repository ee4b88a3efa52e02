//! Site object model: a registry of named collections owning documents
//!
//! Documents live in an arena owned by [`Site`]; collections hold ordered
//! [`DocumentId`] lists. A document belongs to exactly one collection at a
//! time and can be moved between collections with [`Site::move_document`].

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_yaml_ng::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::site_config::SiteConfig;

/// Label of the collection holding root-level section index pages
pub const SECTIONS: &str = "sections";
/// Label of the collection holding pages without a section
pub const ORPHANS: &str = "orphans";
/// Label of the collection holding press releases
pub const PRESS_RELEASES: &str = "press-releases";
/// Label of the collection holding custom page templates
pub const TEMPLATES: &str = "templates";

/// Collections every site declares before generation starts
pub const ROOT_COLLECTIONS: [&str; 4] = [SECTIONS, ORPHANS, PRESS_RELEASES, TEMPLATES];

/// Handle to a collection registered in a [`Site`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(usize);

/// Handle to a document stored in a [`Site`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(usize);

/// Errors raised by the collection registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiteError {
    /// A collection that should have been pre-declared is missing
    #[error("collection `{0}` is not registered")]
    UnknownCollection(String),
}

/// One step of a navigation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Title of the linked document
    pub title: String,
    /// URL of the linked document
    pub url: String,
}

/// A named, ordered container of documents with a URL template
#[derive(Debug, Clone)]
pub struct Collection {
    /// Registry key, also the source directory name (`_<label>`)
    pub label: String,
    /// URL template for member documents (e.g., `/news/:slug/`)
    pub permalink: String,
    /// Whether member documents are rendered
    pub output: bool,
    /// Breadcrumbs inherited by member documents
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Member documents, in insertion order
    pub docs: Vec<DocumentId>,
    /// Document that represents this collection as a page, if any
    pub index: Option<DocumentId>,
}

impl Collection {
    /// Create an empty collection
    pub fn new(label: impl Into<String>, permalink: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            permalink: permalink.into(),
            output: true,
            breadcrumbs: Vec::new(),
            docs: Vec::new(),
            index: None,
        }
    }

    /// Source directory of the collection, relative to the site root
    pub fn directory(&self) -> String {
        format!("_{}", self.label)
    }

    /// Site-relative path of a file inside this collection
    pub fn document_path(&self, relative: &str) -> String {
        format!("{}/{}", self.directory(), relative)
    }

    /// URL a document at `relative` (inside the collection directory) gets
    ///
    /// # Parameters
    /// * `relative` - Path inside the collection directory (e.g., `press.html`)
    ///
    /// # Returns
    /// * `String` - The permalink with `:collection`, `:path`, `:name`,
    ///   `:slug`, `:title` and `:output_ext` filled in
    pub fn url_for(&self, relative: &str) -> String {
        let (stem, ext) = split_extension(relative);
        let path = stem
            .strip_suffix("/index")
            .or_else(|| (stem == "index").then_some(""))
            .unwrap_or(stem);
        let name = stem.rsplit('/').next().unwrap_or(stem);

        let url = self
            .permalink
            .replace(":collection", &self.label)
            .replace(":output_ext", ext)
            .replace(":path", path)
            .replace(":name", name)
            .replace(":slug", name)
            .replace(":title", name);

        sanitize_url(&url)
    }
}

/// A renderable page belonging to a collection
#[derive(Debug, Clone)]
pub struct Document {
    /// Source path relative to the site root (e.g., `_news/press.html`)
    pub relative_path: String,
    /// Owning collection
    pub collection: CollectionId,
    /// Output URL; unique within the owning collection
    pub url: String,
    /// Display title
    pub title: Option<String>,
    /// URL-safe slug
    pub slug: Option<String>,
    /// Publication date
    pub date: Option<DateTime<FixedOffset>>,
    /// Layout used to render the document
    pub layout: Option<String>,
    /// Old URLs that should redirect here
    pub redirect_from: Option<Vec<String>>,
    /// Navigation path from the outermost section down to this document
    pub breadcrumbs: Vec<Breadcrumb>,
    /// The exported record this document was generated from
    pub source: Option<Value>,
    /// Collection whose documents this page lists (section index pages)
    pub children: Option<CollectionId>,
}

impl Document {
    /// Create a document with no front matter yet
    pub fn new(relative_path: String, collection: CollectionId, url: String) -> Self {
        Self {
            relative_path,
            collection,
            url,
            title: None,
            slug: None,
            date: None,
            layout: None,
            redirect_from: None,
            breadcrumbs: Vec::new(),
            source: None,
            children: None,
        }
    }
}

/// Registry of collections and the documents they own
#[derive(Debug, Default)]
pub struct Site {
    collections: Vec<Collection>,
    labels: HashMap<String, CollectionId>,
    documents: Vec<Document>,
}

impl Site {
    /// Create an empty site with no collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a site with the four root collections declared in `config`
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut site = Self::new();
        for label in ROOT_COLLECTIONS {
            let settings = config.collection(label);
            let mut collection = Collection::new(label, settings.permalink);
            collection.output = settings.output;
            site.register(collection);
        }
        site
    }

    /// Add a collection under its label
    ///
    /// A label that is already taken moves to the new collection, except for
    /// the root collections, which keep theirs. The shadowed collection stays
    /// reachable through its [`CollectionId`].
    pub fn register(&mut self, collection: Collection) -> CollectionId {
        let id = CollectionId(self.collections.len());
        match self.labels.get(&collection.label) {
            Some(_) if ROOT_COLLECTIONS.contains(&collection.label.as_str()) => {
                log::warn!(
                    "Collection `{}` clashes with a root collection; it is only reachable through its parent page",
                    collection.label
                );
            }
            Some(_) => {
                log::warn!(
                    "Collection label `{}` registered twice; lookups now return the later one",
                    collection.label
                );
                self.labels.insert(collection.label.clone(), id);
            }
            None => {
                self.labels.insert(collection.label.clone(), id);
            }
        }
        self.collections.push(collection);
        id
    }

    /// Find a collection by label
    pub fn lookup(&self, label: &str) -> Option<CollectionId> {
        self.labels.get(label).copied()
    }

    /// Find a collection that must exist
    pub fn require(&self, label: &str) -> Result<CollectionId, SiteError> {
        self.lookup(label)
            .ok_or_else(|| SiteError::UnknownCollection(label.to_string()))
    }

    /// Borrow a collection
    pub fn collection(&self, id: CollectionId) -> &Collection {
        &self.collections[id.0]
    }

    /// Mutably borrow a collection
    pub fn collection_mut(&mut self, id: CollectionId) -> &mut Collection {
        &mut self.collections[id.0]
    }

    /// All collections in registration order
    pub fn collections(&self) -> impl Iterator<Item = (CollectionId, &Collection)> {
        self.collections
            .iter()
            .enumerate()
            .map(|(i, c)| (CollectionId(i), c))
    }

    /// Borrow a document
    pub fn document(&self, id: DocumentId) -> &Document {
        &self.documents[id.0]
    }

    /// Mutably borrow a document
    pub fn document_mut(&mut self, id: DocumentId) -> &mut Document {
        &mut self.documents[id.0]
    }

    /// Documents of a collection, in order
    pub fn documents_in(&self, id: CollectionId) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.collection(id)
            .docs
            .iter()
            .map(move |&doc| (doc, self.document(doc)))
    }

    /// Store `document` and append it to its collection
    pub fn insert_document(&mut self, document: Document) -> DocumentId {
        let id = DocumentId(self.documents.len());
        let owner = document.collection;
        self.documents.push(document);
        self.collections[owner.0].docs.push(id);
        id
    }

    /// Move a document to another collection, appending it there
    pub fn move_document(&mut self, doc: DocumentId, to: CollectionId) {
        let from = self.documents[doc.0].collection;
        self.collections[from.0].docs.retain(|&d| d != doc);
        self.documents[doc.0].collection = to;
        self.collections[to.0].docs.push(doc);
    }

    /// First document in `collection` whose URL is `url`
    pub fn find_by_url(&self, collection: CollectionId, url: &str) -> Option<DocumentId> {
        self.documents_in(collection)
            .find(|(_, doc)| doc.url == url)
            .map(|(id, _)| id)
    }

    /// Total number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

fn split_extension(relative: &str) -> (&str, &str) {
    let file_start = relative.rfind('/').map_or(0, |i| i + 1);
    match relative[file_start..].rfind('.') {
        Some(dot) if dot > 0 => relative.split_at(file_start + dot),
        _ => (relative, ""),
    }
}

/// Collapse repeated slashes and force a leading slash
fn sanitize_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 1);
    out.push('/');
    for c in url.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_slug_permalink() {
        let news = Collection::new("news", "/news/:slug/");
        assert_eq!(news.url_for("press.html"), "/news/press/");
    }

    #[test]
    fn test_url_for_path_permalink() {
        let templates = Collection::new("templates", "/templates/:path/");
        assert_eq!(templates.url_for("news/press.html"), "/templates/news/press/");
        assert_eq!(templates.url_for("about/index.html"), "/templates/about/");
        assert_eq!(templates.url_for("index.html"), "/templates/");
    }

    #[test]
    fn test_url_for_collection_and_ext() {
        let releases = Collection::new("press-releases", "/:collection/:name:output_ext");
        assert_eq!(releases.url_for("launch.html"), "/press-releases/launch.html");
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_url("news//press/"), "/news/press/");
        assert_eq!(sanitize_url("/"), "/");
    }

    #[test]
    fn test_register_duplicate_label_last_wins() {
        let mut site = Site::new();
        let first = site.register(Collection::new("news", "/news/:slug/"));
        let second = site.register(Collection::new("news", "/other/:slug/"));

        assert_ne!(first, second);
        assert_eq!(site.lookup("news"), Some(second));
        assert_eq!(site.collection(first).permalink, "/news/:slug/");
        assert_eq!(site.collections().count(), 2);
    }

    #[test]
    fn test_register_keeps_root_labels() {
        let mut site = Site::from_config(&SiteConfig::default());
        let orphans = site.require(ORPHANS).unwrap();
        let section = site.register(Collection::new(ORPHANS, "/orphans/:slug/"));

        assert_ne!(orphans, section);
        assert_eq!(site.lookup(ORPHANS), Some(orphans));
        assert_eq!(site.collection(section).permalink, "/orphans/:slug/");
    }

    #[test]
    fn test_move_document() {
        let mut site = Site::new();
        let a = site.register(Collection::new("a", "/a/:slug/"));
        let b = site.register(Collection::new("b", "/b/:slug/"));

        let doc = site.insert_document(Document::new("_a/x.html".into(), a, "/a/x/".into()));
        site.move_document(doc, b);

        assert!(site.collection(a).docs.is_empty());
        assert_eq!(site.collection(b).docs, vec![doc]);
        assert_eq!(site.document(doc).collection, b);
        assert_eq!(site.find_by_url(b, "/a/x/"), Some(doc));
        assert_eq!(site.find_by_url(a, "/a/x/"), None);
    }
}

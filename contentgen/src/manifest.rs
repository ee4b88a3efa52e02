//! Site manifest: the generated collections and documents as YAML
//!
//! The manifest is what the rendering step consumes. Collections appear in
//! registration order (root collections first, then sections as they were
//! created) and documents in collection order.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_yaml_ng::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::defaults::DefaultsResolver;
use crate::redirects::{collect_redirects, Redirect};
use crate::site::{Breadcrumb, Collection, Document, Site, TEMPLATES};

/// Errors that can occur while writing the manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error writing {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),
}

/// Everything the renderer needs
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// All collections with their documents
    pub collections: Vec<CollectionEntry>,
    /// Redirects from old URLs
    pub redirects: Vec<Redirect>,
}

/// A collection in the manifest
#[derive(Debug, Serialize)]
pub struct CollectionEntry {
    /// Registry label
    pub label: String,
    /// URL template of member documents
    pub permalink: String,
    /// Whether member documents are rendered
    pub output: bool,
    /// Breadcrumbs inherited by member documents
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    /// URL of the page representing this collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Member documents, in order
    pub documents: Vec<DocumentEntry>,
}

/// A document in the manifest
#[derive(Debug, Serialize)]
pub struct DocumentEntry {
    /// Source path relative to the site root
    pub path: String,
    /// Output URL
    pub url: String,
    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// URL-safe slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Publication date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<FixedOffset>>,
    /// Layout used to render the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Old URLs that redirect here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_from: Option<Vec<String>>,
    /// Navigation path down to this document
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Label of the collection this page lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    /// The exported record, for templates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contentful: Option<Value>,
}

impl Manifest {
    /// Snapshot `site`, filling in missing layouts from `defaults`
    ///
    /// Documents without a layout get the default for their own collection;
    /// templates keep whatever their file declares.
    pub fn build(site: &Site, defaults: &dyn DefaultsResolver) -> Self {
        let templates_dir = site
            .lookup(TEMPLATES)
            .map(|id| format!("{}/", site.collection(id).directory()));

        let collections = site
            .collections()
            .map(|(id, collection)| CollectionEntry {
                label: collection.label.clone(),
                permalink: collection.permalink.clone(),
                output: collection.output,
                breadcrumbs: collection.breadcrumbs.clone(),
                index: collection.index.map(|doc| site.document(doc).url.clone()),
                documents: site
                    .documents_in(id)
                    .map(|(_, doc)| {
                        let is_template = templates_dir
                            .as_deref()
                            .is_some_and(|dir| doc.relative_path.starts_with(dir));
                        document_entry(site, collection, doc, is_template, defaults)
                    })
                    .collect(),
            })
            .collect();

        Self {
            collections,
            redirects: collect_redirects(site),
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Write the manifest to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ManifestError::IoError(parent.to_path_buf(), e))?;
        }
        std::fs::write(path, self.to_yaml()?)
            .map_err(|e| ManifestError::IoError(path.to_path_buf(), e))
    }

    /// Total number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.collections.iter().map(|c| c.documents.len()).sum()
    }
}

fn document_entry(
    site: &Site,
    collection: &Collection,
    doc: &Document,
    is_template: bool,
    defaults: &dyn DefaultsResolver,
) -> DocumentEntry {
    let layout = match &doc.layout {
        Some(layout) => Some(layout.clone()),
        None if !is_template => defaults
            .find(&doc.relative_path, &collection.label, "layout")
            .and_then(|value| value.as_str().map(String::from)),
        None => None,
    };

    DocumentEntry {
        path: doc.relative_path.clone(),
        url: doc.url.clone(),
        title: doc.title.clone(),
        slug: doc.slug.clone(),
        date: doc.date,
        layout,
        redirect_from: doc.redirect_from.clone(),
        breadcrumbs: doc.breadcrumbs.clone(),
        docs: doc.children.map(|id| site.collection(id).label.clone()),
        contentful: doc.source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::FrontmatterDefaults;
    use crate::site::{Collection, Document};
    use crate::site_config::{DefaultsEntry, DefaultsScope};

    fn page_defaults() -> FrontmatterDefaults {
        let mut values = toml::Table::new();
        values.insert("layout".into(), toml::Value::String("page".into()));
        FrontmatterDefaults::new(vec![DefaultsEntry {
            scope: DefaultsScope {
                path: String::new(),
                collection: Some("orphans".into()),
            },
            values,
        }])
    }

    #[test]
    fn test_build_fills_layouts() {
        let mut site = Site::new();
        let orphans = site.register(Collection::new("orphans", "/:slug/"));
        let templates = site.register(Collection::new("templates", "/templates/:path/"));

        let mut about = Document::new("_orphans/about.html".into(), orphans, "/about/".into());
        about.title = Some("About".into());
        site.insert_document(about);

        let custom = Document::new("_templates/team.html".into(), templates, "/templates/team/".into());
        let custom = site.insert_document(custom);
        site.move_document(custom, orphans);

        let manifest = Manifest::build(&site, &page_defaults());
        assert_eq!(manifest.document_count(), 2);

        let docs = &manifest.collections[0].documents;
        assert_eq!(docs[0].layout.as_deref(), Some("page"));
        assert_eq!(docs[1].layout, None);
        assert!(manifest.collections[1].documents.is_empty());
    }

    #[test]
    fn test_yaml_shape() {
        let mut site = Site::new();
        let sections = site.register(Collection::new("sections", "/:slug/"));
        let mut news = Collection::new("news", "/news/:slug/");
        news.breadcrumbs = vec![Breadcrumb {
            title: "News".into(),
            url: "/news/".into(),
        }];
        let news = site.register(news);

        let mut index = Document::new("_sections/news.html".into(), sections, "/news/".into());
        index.children = Some(news);
        let index = site.insert_document(index);
        site.collection_mut(news).index = Some(index);

        let yaml = Manifest::build(&site, &FrontmatterDefaults::default())
            .to_yaml()
            .unwrap();

        assert!(yaml.contains("label: news"));
        assert!(yaml.contains("docs: news"));
        assert!(yaml.contains("index: /news/"));
        assert!(yaml.contains("redirects: []"));
        assert!(!yaml.contains("contentful"));
    }

    #[test]
    fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("manifest.yaml");
        let manifest = Manifest {
            collections: Vec::new(),
            redirects: Vec::new(),
        };
        manifest.write(&path).unwrap();
        assert!(path.exists());
    }
}

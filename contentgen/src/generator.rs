//! Section tree materialization
//!
//! Turns the flat record lists of a [`ContentExport`] into collections and
//! documents on a [`Site`]:
//!
//! 1. every section becomes a collection whose permalink nests inside its
//!    parent's (`/news/:slug/` -> `/news/press/:slug/`), plus an index
//!    document placed in the parent collection (or `sections` at the root);
//! 2. every page becomes a document in its section, or in `orphans`;
//! 3. every press release becomes a document in `press-releases`.
//!
//! Sections are created lazily and memoized by id, so the order of the
//! section list does not matter. A [`Generator`] holds that memo table and
//! lives for exactly one run.

use std::collections::HashMap;
use thiserror::Error;

use crate::defaults::DefaultsResolver;
use crate::export::ContentExport;
use crate::record::{AttributeRecord, RecordKind, RecordLink};
use crate::site::{
    Breadcrumb, Collection, CollectionId, Document, DocumentId, Site, SiteError, ORPHANS,
    PRESS_RELEASES, SECTIONS, TEMPLATES,
};
use crate::slug::{slugify, SlugMode};

/// Errors that abort a generation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error(transparent)]
    SiteError(#[from] SiteError),

    #[error("{kind} {id} has slug `{slug}`, which leaves nothing after slugifying")]
    EmptySlug {
        /// Content type of the record
        kind: RecordKind,
        /// Record id
        id: String,
        /// The slug as exported
        slug: String,
    },

    #[error("{kind} {from} references unknown section {target}")]
    UnknownSection {
        /// Content type of the referring record
        kind: RecordKind,
        /// Id of the referring record
        from: String,
        /// Id that could not be resolved
        target: String,
    },

    #[error("section parent chain loops: {}", .0.join(" -> "))]
    CyclicSection(Vec<String>),
}

/// Counts reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Sections materialized
    pub sections: usize,
    /// Page records processed
    pub pages: usize,
    /// Press release records processed
    pub press_releases: usize,
    /// Documents taken over from the templates collection
    pub templates_used: usize,
    /// Records that landed on an existing document's URL
    pub merged: usize,
}

/// Materialize `export` into `site`
///
/// Sections first, then pages, then press releases. The first error aborts
/// the run; `site` is left partially populated and should be discarded.
pub fn generate(
    site: &mut Site,
    export: &ContentExport,
    defaults: &dyn DefaultsResolver,
    slug_mode: SlugMode,
) -> Result<GenerationReport, GenerateError> {
    let orphans = site.require(ORPHANS)?;
    let press_releases = site.require(PRESS_RELEASES)?;
    let mut generator = Generator::new(site, defaults, slug_mode, export);

    for record in &export.sections {
        generator.find_or_generate_section(record)?;
    }

    for record in &export.pages {
        let target = match &record.section {
            Some(link) => generator.sections.get(&link.id).copied().unwrap_or_else(|| {
                log::warn!(
                    "page {} references unknown section {}; placing it in {}",
                    record.id,
                    link.id,
                    ORPHANS
                );
                orphans
            }),
            None => orphans,
        };
        generator.generate_page(target, record, RecordKind::Page)?;
        generator.report.pages += 1;
    }

    for record in &export.press_releases {
        let mut record = record.clone();
        record.normalize_date_to_utc();
        generator.generate_page(press_releases, &record, RecordKind::PressRelease)?;
        generator.report.press_releases += 1;
    }

    generator.report.sections = generator.sections.len();
    Ok(generator.report)
}

/// One generation run's state
pub struct Generator<'a> {
    site: &'a mut Site,
    defaults: &'a dyn DefaultsResolver,
    slug_mode: SlugMode,
    section_records: HashMap<String, AttributeRecord>,
    sections: HashMap<String, CollectionId>,
    resolving: Vec<String>,
    report: GenerationReport,
}

impl<'a> Generator<'a> {
    /// Start a run with an empty section table
    pub fn new(
        site: &'a mut Site,
        defaults: &'a dyn DefaultsResolver,
        slug_mode: SlugMode,
        export: &ContentExport,
    ) -> Self {
        Self {
            site,
            defaults,
            slug_mode,
            section_records: export.section_index(),
            sections: HashMap::new(),
            resolving: Vec::new(),
            report: GenerationReport::default(),
        }
    }

    /// Return the collection for a section record, creating it and any
    /// missing ancestors on first use
    pub fn find_or_generate_section(
        &mut self,
        record: &AttributeRecord,
    ) -> Result<CollectionId, GenerateError> {
        if let Some(&id) = self.sections.get(&record.id) {
            return Ok(id);
        }

        if self.resolving.contains(&record.id) {
            let mut chain = self.resolving.clone();
            chain.push(record.id.clone());
            return Err(GenerateError::CyclicSection(chain));
        }

        self.resolving.push(record.id.clone());
        let result = self.generate_section(record);
        self.resolving.pop();

        let id = result?;
        self.sections.insert(record.id.clone(), id);
        Ok(id)
    }

    fn generate_section(&mut self, record: &AttributeRecord) -> Result<CollectionId, GenerateError> {
        let label = self.slug(record, RecordKind::Section)?;
        let section = self
            .site
            .register(Collection::new(&label, format!("/{}/:slug/", label)));
        log::debug!("Created section collection `{}` for {}", label, record.id);

        let parent = match &record.parent_section {
            Some(link) => {
                let parent = self.resolve_parent(record, link)?;
                let permalink = self
                    .site
                    .collection(parent)
                    .permalink
                    .replacen(":slug", &format!("{}/:slug", label), 1);
                self.site.collection_mut(section).permalink = permalink;
                parent
            }
            None => self.site.require(SECTIONS)?,
        };

        let page = self.generate_page(parent, record, RecordKind::Section)?;
        self.site.document_mut(page).children = Some(section);
        self.site.collection_mut(section).index = Some(page);

        let templates_dir = self.site.collection(self.site.require(TEMPLATES)?).directory();
        let path = self.site.document(page).relative_path.clone();
        if !path.starts_with(&format!("{}/", templates_dir)) {
            let layout = self
                .defaults
                .find(&path, SECTIONS, "layout")
                .and_then(|value| value.as_str().map(String::from));
            self.site.document_mut(page).layout = layout;
        }

        let breadcrumbs = self.site.document(page).breadcrumbs.clone();
        self.site.collection_mut(section).breadcrumbs = breadcrumbs;

        Ok(section)
    }

    /// Resolve a `parentSection` link, preferring the full entry from the
    /// section list over whatever the export embedded
    fn resolve_parent(
        &mut self,
        from: &AttributeRecord,
        link: &RecordLink,
    ) -> Result<CollectionId, GenerateError> {
        if let Some(&id) = self.sections.get(&link.id) {
            return Ok(id);
        }

        let target = match (self.section_records.get(&link.id), &link.embedded) {
            (Some(record), _) => record.clone(),
            (None, Some(embedded)) => (**embedded).clone(),
            (None, None) => {
                return Err(GenerateError::UnknownSection {
                    kind: RecordKind::Section,
                    from: from.id.clone(),
                    target: link.id.clone(),
                })
            }
        };
        self.find_or_generate_section(&target)
    }

    /// Create or update the document for `record` inside `target`
    ///
    /// A document already at the same URL in `target` is updated in place;
    /// this is how a page extends its section's index page. Otherwise a
    /// template with the same URL is moved in, or a fresh document created.
    pub fn generate_page(
        &mut self,
        target: CollectionId,
        record: &AttributeRecord,
        kind: RecordKind,
    ) -> Result<DocumentId, GenerateError> {
        let slug = self.slug(record, kind)?;
        let file_name = format!("{}.html", slug);
        let collection = self.site.collection(target);
        let path = collection.document_path(&file_name);
        let url = collection.url_for(&file_name);

        let doc = match self.site.find_by_url(target, &url) {
            Some(existing) => {
                if self.site.document(existing).children.is_some() {
                    log::debug!("{} {} extends section page {}", kind, record.id, url);
                } else {
                    log::warn!("{} {} shares URL {} with an earlier document; merging", kind, record.id, url);
                }
                self.report.merged += 1;
                existing
            }
            None => match self.match_custom_template(&url)? {
                Some(template) => {
                    log::debug!("Using custom template {} for {}", self.site.document(template).relative_path, url);
                    self.site.move_document(template, target);
                    self.site.document_mut(template).url = url;
                    self.report.templates_used += 1;
                    template
                }
                None => self.site.insert_document(Document::new(path, target, url)),
            },
        };

        let mut breadcrumbs = self.site.collection(target).breadcrumbs.clone();
        let document = self.site.document_mut(doc);
        document.title = Some(record.title.clone());
        document.slug = Some(slug);
        if let Some(date) = record.date {
            document.date = Some(date);
        }
        document.source = Some(record.raw.clone());
        if let Some(redirects) = &record.redirect_from {
            document.redirect_from = Some(redirects.clone());
        }

        breadcrumbs.push(Breadcrumb {
            title: record.title.clone(),
            url: document.url.clone(),
        });
        document.breadcrumbs = breadcrumbs;

        Ok(doc)
    }

    /// A templates-collection document whose URL, minus the `/templates`
    /// prefix, equals `url`
    fn match_custom_template(&self, url: &str) -> Result<Option<DocumentId>, GenerateError> {
        let templates = self.site.require(TEMPLATES)?;
        let prefix = format!("/{}", TEMPLATES);
        Ok(self
            .site
            .documents_in(templates)
            .find(|(_, doc)| doc.url.strip_prefix(&prefix).unwrap_or(&doc.url) == url)
            .map(|(id, _)| id))
    }

    fn slug(&self, record: &AttributeRecord, kind: RecordKind) -> Result<String, GenerateError> {
        let slug = slugify(&record.slug, self.slug_mode);
        if slug.is_empty() {
            return Err(GenerateError::EmptySlug {
                kind,
                id: record.id.clone(),
                slug: record.slug.clone(),
            });
        }
        Ok(slug)
    }
}

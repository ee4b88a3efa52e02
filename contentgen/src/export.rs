//! CMS export loading
//!
//! An export file holds one content space as a mapping of content type to an
//! ordered list of entries:
//!
//! ```yaml
//! section: [ ... ]
//! page: [ ... ]
//! pressRelease: [ ... ]
//! ```

use serde_yaml_ng::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{AttributeRecord, RecordError, RecordKind};

/// Errors raised while reading an export file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("YAML error in {path}: {source}", path = .0.display(), source = .1)]
    YamlError(PathBuf, #[source] serde_yaml_ng::Error),

    #[error("`{0}` must be a list of entries")]
    NotAList(&'static str),

    #[error("Invalid record: {0}")]
    RecordError(#[from] RecordError),
}

/// Problems found by [`ContentExport::check_references`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("section {from} references unknown parent section {target}")]
    UnknownParent {
        /// Id of the referring section
        from: String,
        /// Id that could not be found
        target: String,
    },

    #[error("page {from} references unknown section {target}; it goes to orphans")]
    OrphanedPage {
        /// Id of the referring page
        from: String,
        /// Id that could not be found
        target: String,
    },

    #[error("section parent chain loops: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

impl ReferenceError {
    /// Whether generation fails on this problem
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReferenceError::OrphanedPage { .. })
    }
}

/// All records of one content space, in export order
#[derive(Debug, Clone, Default)]
pub struct ContentExport {
    /// Section entries
    pub sections: Vec<AttributeRecord>,
    /// Page entries
    pub pages: Vec<AttributeRecord>,
    /// Press release entries
    pub press_releases: Vec<AttributeRecord>,
}

impl ContentExport {
    /// Read and validate an export file
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExportError::IoError(path.to_path_buf(), e))?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| ExportError::YamlError(path.to_path_buf(), e))?;
        Self::from_value(value)
    }

    /// Validate an already parsed export document
    pub fn from_value(value: Value) -> Result<Self, ExportError> {
        Ok(Self {
            sections: records(&value, RecordKind::Section)?,
            pages: records(&value, RecordKind::Page)?,
            press_releases: records(&value, RecordKind::PressRelease)?,
        })
    }

    /// Section records keyed by id
    pub fn section_index(&self) -> HashMap<String, AttributeRecord> {
        self.sections
            .iter()
            .map(|record| (record.id.clone(), record.clone()))
            .collect()
    }

    /// Check every section reference resolves and no parent chain loops
    ///
    /// Generation fails on the first fatal problem anyway; this collects all
    /// of them for the `validate` command. Pages pointing at an unknown
    /// section are reported too but are not fatal (see
    /// [`ReferenceError::is_fatal`]).
    pub fn check_references(&self) -> Vec<ReferenceError> {
        let index = self.section_index();
        let embedded_parents: HashSet<&str> = self
            .sections
            .iter()
            .filter_map(|r| r.parent_section.as_ref())
            .filter(|link| link.embedded.is_some())
            .map(|link| link.id.as_str())
            .collect();
        let mut errors = Vec::new();

        for record in &self.sections {
            if let Some(link) = &record.parent_section {
                if link.embedded.is_none() && !index.contains_key(&link.id) {
                    errors.push(ReferenceError::UnknownParent {
                        from: record.id.clone(),
                        target: link.id.clone(),
                    });
                }
            }
        }

        // Pages only land in sections the section list declares
        for record in &self.pages {
            if let Some(link) = &record.section {
                if !index.contains_key(&link.id) && !embedded_parents.contains(link.id.as_str()) {
                    errors.push(ReferenceError::OrphanedPage {
                        from: record.id.clone(),
                        target: link.id.clone(),
                    });
                }
            }
        }

        let mut reported = HashSet::new();
        for record in &self.sections {
            if let Some(cycle) = parent_cycle(record, &index) {
                // Each loop is reached once per member; report it once
                let mut key = cycle.clone();
                key.sort();
                key.dedup();
                if reported.insert(key) {
                    errors.push(ReferenceError::Cycle(cycle));
                }
            }
        }

        errors
    }
}

fn records(value: &Value, kind: RecordKind) -> Result<Vec<AttributeRecord>, ExportError> {
    let key = kind.export_key();
    match value.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                AttributeRecord::from_value(item.clone(), kind, i).map_err(ExportError::from)
            })
            .collect(),
        Some(_) => Err(ExportError::NotAList(key)),
    }
}

/// Follow `parentSection` links from `start`; return the id path if it loops
fn parent_cycle(
    start: &AttributeRecord,
    index: &HashMap<String, AttributeRecord>,
) -> Option<Vec<String>> {
    let mut path = vec![start.id.clone()];
    let mut current = start.clone();

    while let Some(link) = current.parent_section.clone() {
        if path.contains(&link.id) {
            path.push(link.id);
            return Some(path);
        }
        path.push(link.id.clone());
        current = match link.embedded {
            Some(record) => *record,
            None => index.get(&link.id)?.clone(),
        };
    }
    None
}

//! Typed attribute records read from the CMS export
//!
//! The export is loosely typed YAML. Records are validated here, once, so the
//! generator can rely on `id`, `slug` and `title` being present.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_yaml_ng::{Mapping, Value};
use std::fmt;
use thiserror::Error;

use crate::date;

/// Content type a record was exported under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Entry from the `section` list
    Section,
    /// Entry from the `page` list
    Page,
    /// Entry from the `pressRelease` list
    PressRelease,
}

impl RecordKind {
    /// Key of this content type in the export
    pub fn export_key(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Page => "page",
            Self::PressRelease => "pressRelease",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section => write!(f, "section"),
            Self::Page => write!(f, "page"),
            Self::PressRelease => write!(f, "press release"),
        }
    }
}

/// Errors raised while validating an exported record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The entry is not a YAML mapping
    #[error("{kind} {locator} is not a mapping")]
    NotAMapping {
        /// Content type of the entry
        kind: RecordKind,
        /// Where the entry sits in the export
        locator: String,
    },

    /// A required field is absent or empty
    #[error("{kind} {locator} is missing required field `{field}`")]
    MissingField {
        /// Content type of the entry
        kind: RecordKind,
        /// Record id, or position when the id itself is missing
        locator: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// The `date` field could not be parsed
    #[error("{kind} {locator} has an unrecognized date `{value}`")]
    InvalidDate {
        /// Content type of the entry
        kind: RecordKind,
        /// Record id
        locator: String,
        /// The raw date text
        value: String,
    },

    /// `redirectFrom` is neither a string nor a list of strings
    #[error("{kind} {locator} has a `redirectFrom` that is not a string or list of strings")]
    InvalidRedirect {
        /// Content type of the entry
        kind: RecordKind,
        /// Record id
        locator: String,
    },
}

/// Reference from one record to a section record
///
/// The export either embeds the full target (with `slug`, `title`, ...) or
/// leaves a bare `sys.id` link that must be looked up in the section list.
#[derive(Debug, Clone)]
pub struct RecordLink {
    /// Id of the referenced section
    pub id: String,
    /// The referenced record, when the export embedded it
    pub embedded: Option<Box<AttributeRecord>>,
}

/// One validated entry of the export
#[derive(Debug, Clone)]
pub struct AttributeRecord {
    /// Unique identifier (`sys.id`)
    pub id: String,
    /// Unslugified slug as authored in the CMS
    pub slug: String,
    /// Display title
    pub title: String,
    /// Publication date, if any
    pub date: Option<DateTime<FixedOffset>>,
    /// Old URLs that should redirect to this record's page
    pub redirect_from: Option<Vec<String>>,
    /// Parent section (sections only)
    pub parent_section: Option<RecordLink>,
    /// Owning section (pages only)
    pub section: Option<RecordLink>,
    /// The full mapping as exported, for downstream templates
    pub raw: Value,
}

impl AttributeRecord {
    /// Validate a raw export entry
    ///
    /// # Parameters
    /// * `value` - The YAML entry
    /// * `kind` - Which list the entry came from
    /// * `position` - Index within that list (used in error messages)
    pub fn from_value(value: Value, kind: RecordKind, position: usize) -> Result<Self, RecordError> {
        Self::parse(value, kind, &format!("#{}", position))
    }

    fn parse(value: Value, kind: RecordKind, position: &str) -> Result<Self, RecordError> {
        let map = value.as_mapping().ok_or_else(|| RecordError::NotAMapping {
            kind,
            locator: position.to_string(),
        })?;

        let id = sys_id(map).ok_or_else(|| RecordError::MissingField {
            kind,
            locator: position.to_string(),
            field: "sys.id",
        })?;

        let required = |field: &'static str| {
            map.get(field)
                .and_then(scalar_string)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| RecordError::MissingField {
                    kind,
                    locator: id.clone(),
                    field,
                })
        };
        let slug = required("slug")?;
        let title = required("title")?;

        let date = match map.get("date").filter(|v| !v.is_null()) {
            Some(raw) => {
                let text = scalar_string(raw).unwrap_or_default();
                let parsed = date::parse(&text).ok_or_else(|| RecordError::InvalidDate {
                    kind,
                    locator: id.clone(),
                    value: text.clone(),
                })?;
                Some(parsed)
            }
            None => None,
        };

        let redirect_from = match map.get("redirectFrom").filter(|v| !v.is_null()) {
            Some(raw) => Some(redirect_list(raw).ok_or_else(|| RecordError::InvalidRedirect {
                kind,
                locator: id.clone(),
            })?),
            None => None,
        };

        let parent_section = map
            .get("parentSection")
            .filter(|v| !v.is_null())
            .map(|v| parse_link(v, &format!("parentSection of {}", id)))
            .transpose()?;

        let section = map
            .get("section")
            .filter(|v| !v.is_null())
            .map(|v| parse_link(v, &format!("section of {}", id)))
            .transpose()?;

        Ok(Self {
            id,
            slug,
            title,
            date,
            redirect_from,
            parent_section,
            section,
            raw: value,
        })
    }

    /// Replace the date with the same instant tagged UTC
    ///
    /// The raw mapping is updated too so templates see the normalized value.
    pub fn normalize_date_to_utc(&mut self) {
        let Some(original) = self.date else {
            return;
        };
        let normalized = date::to_utc(original);
        self.date = Some(normalized);

        if let Some(map) = self.raw.as_mapping_mut() {
            map.insert(
                Value::from("date"),
                Value::from(normalized.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
    }
}

/// Parse a `parentSection`/`section` reference
fn parse_link(value: &Value, locator: &str) -> Result<RecordLink, RecordError> {
    let map = value.as_mapping().ok_or_else(|| RecordError::NotAMapping {
        kind: RecordKind::Section,
        locator: locator.to_string(),
    })?;

    let id = sys_id(map).ok_or_else(|| RecordError::MissingField {
        kind: RecordKind::Section,
        locator: locator.to_string(),
        field: "sys.id",
    })?;

    // A bare link only carries `sys`; anything with a slug is an embedded entry
    let embedded = if map.contains_key("slug") {
        Some(Box::new(AttributeRecord::parse(
            value.clone(),
            RecordKind::Section,
            locator,
        )?))
    } else {
        None
    };

    Ok(RecordLink { id, embedded })
}

fn sys_id(map: &Mapping) -> Option<String> {
    map.get("sys")
        .and_then(|sys| sys.get("id"))
        .and_then(scalar_string)
        .filter(|id| !id.is_empty())
}

/// Read a scalar as text; CMS slugs such as `2019` come through as numbers
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

fn redirect_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => items.iter().map(scalar_string).collect(),
        other => scalar_string(other).map(|s| vec![s]),
    }
}

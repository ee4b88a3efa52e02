//! Site configuration from site.toml

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::site::{ORPHANS, PRESS_RELEASES, SECTIONS, TEMPLATES};
use crate::slug::SlugMode;

/// Main site configuration from site.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Content space to read from the export directory
    #[serde(default = "default_space")]
    pub space: String,

    /// Directory holding the CMS export, relative to the site root
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Slug mode used for section labels and page slugs
    #[serde(default)]
    pub slugify: SlugMode,

    /// Overrides for the root collections, keyed by label
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionSettings>,

    /// Frontmatter defaults, in declaration order
    #[serde(default)]
    pub defaults: Vec<DefaultsEntry>,
}

/// Settings of one root collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSettings {
    /// URL template for member documents
    pub permalink: String,

    /// Whether member documents are rendered
    #[serde(default = "default_output")]
    pub output: bool,
}

/// One `[[defaults]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsEntry {
    /// Which documents the values apply to
    #[serde(default)]
    pub scope: DefaultsScope,

    /// Front matter keys and their default values
    pub values: toml::Table,
}

/// Scope of a defaults entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsScope {
    /// Site-relative path prefix; empty matches everything
    #[serde(default)]
    pub path: String,

    /// Collection label the entry is restricted to
    #[serde(rename = "type")]
    pub collection: Option<String>,
}

fn default_space() -> String {
    "acc".to_string()
}

fn default_data_dir() -> String {
    "_data/contentful/spaces".to_string()
}

fn default_output() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            space: default_space(),
            data_dir: default_data_dir(),
            slugify: SlugMode::default(),
            collections: BTreeMap::new(),
            defaults: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a site.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the site.toml configuration file
    ///
    /// # Returns
    /// * `Ok(SiteConfig)` - Successfully loaded configuration
    /// * `Err(SiteConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SiteConfigError> {
        let content = fs::read_to_string(&path).map_err(SiteConfigError::IoError)?;

        let config: SiteConfig = toml::from_str(&content).map_err(SiteConfigError::ParseError)?;

        Ok(config)
    }

    /// Load site.toml from `root`, falling back to defaults when absent
    pub fn load_or_default(root: &Path) -> Result<Self, SiteConfigError> {
        let path = root.join("site.toml");
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No site.toml in {}, using defaults", root.display());
            Ok(Self::default())
        }
    }

    /// Path of the export file for the configured space
    pub fn export_path(&self, root: &Path) -> std::path::PathBuf {
        root.join(&self.data_dir).join(format!("{}.yaml", self.space))
    }

    /// Settings for a root collection, with built-in defaults
    pub fn collection(&self, label: &str) -> CollectionSettings {
        if let Some(settings) = self.collections.get(label) {
            return settings.clone();
        }

        let (permalink, output) = match label {
            SECTIONS | ORPHANS => ("/:slug/", true),
            PRESS_RELEASES => ("/press-releases/:slug/", true),
            TEMPLATES => ("/templates/:path/", false),
            _ => ("/:collection/:path/", true),
        };
        CollectionSettings {
            permalink: permalink.to_string(),
            output,
        }
    }
}

/// Errors that can occur when loading site configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum SiteConfigError {
    /// IO error when reading file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),
}

impl std::fmt::Display for SiteConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteConfigError::IoError(e) => write!(f, "IO error: {}", e),
            SiteConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for SiteConfigError {}

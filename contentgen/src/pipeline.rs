//! Three-stage generation pipeline
//!
//! This module orchestrates the three stages of a site build:
//! 1. **Loading**: Read site.toml and the CMS export for the configured space
//! 2. **Materialization**: Register root collections, collect templates and
//!    build the section/page tree
//! 3. **Export**: Snapshot the site into a manifest for the renderer

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::defaults::FrontmatterDefaults;
use crate::export::ContentExport;
use crate::generator::{self, GenerateError, GenerationReport};
use crate::manifest::Manifest;
use crate::site::Site;
use crate::site_config::{SiteConfig, SiteConfigError};
use crate::walker::{self, WalkerError};

/// Loaded inputs of a build
#[derive(Debug)]
pub struct Sources {
    /// Site root directory
    pub root: PathBuf,
    /// Parsed site.toml (or defaults)
    pub config: SiteConfig,
    /// Path the export was read from
    pub export_path: PathBuf,
    /// Validated export records
    pub export: ContentExport,
}

/// A fully materialized site
#[derive(Debug)]
pub struct Materialized {
    /// Collections and documents
    pub site: Site,
    /// Frontmatter defaults used while building
    pub defaults: FrontmatterDefaults,
    /// Number of custom templates found
    pub templates: usize,
    /// Generation counts
    pub report: GenerationReport,
}

/// Stage 1: Load configuration and the export
///
/// # Parameters
/// * `root` - Site root containing site.toml and the export directory
/// * `export_override` - Export file to read instead of the configured one
///
/// # Returns
/// * `Ok(Sources)` - Configuration and validated records
/// * `Err(PipelineError)` - Error reading configuration or export
pub fn load_sources(root: &Path, export_override: Option<&Path>) -> Result<Sources, PipelineError> {
    let config = SiteConfig::load_or_default(root)
        .map_err(|e| PipelineError::ConfigError(root.join("site.toml"), Box::new(e)))?;

    let export_path = export_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.export_path(root));
    log::info!("Reading export {}", export_path.display());

    let export = ContentExport::load(&export_path)?;

    Ok(Sources {
        root: root.to_path_buf(),
        config,
        export_path,
        export,
    })
}

/// Stage 2: Build the collection tree
///
/// # Parameters
/// * `sources` - Output of [`load_sources`]
///
/// # Returns
/// * `Ok(Materialized)` - Populated site
/// * `Err(PipelineError)` - Error collecting templates or generating
pub fn materialize(sources: &Sources) -> Result<Materialized, PipelineError> {
    let mut site = Site::from_config(&sources.config);

    let templates = walker::load_templates(&mut site, &sources.root)?;
    log::info!("Collected {} custom templates", templates);

    let defaults = FrontmatterDefaults::new(sources.config.defaults.clone());
    let report = generator::generate(
        &mut site,
        &sources.export,
        &defaults,
        sources.config.slugify,
    )?;

    Ok(Materialized {
        site,
        defaults,
        templates,
        report,
    })
}

/// Stage 3: Snapshot the site for the renderer
pub fn export_manifest(materialized: &Materialized) -> Manifest {
    Manifest::build(&materialized.site, &materialized.defaults)
}

/// Errors raised by the pipeline stages
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Config error loading {path}: {source}", path = .0.display(), source = .1)]
    ConfigError(PathBuf, #[source] Box<SiteConfigError>),

    #[error("Export error: {0}")]
    ExportError(#[from] crate::export::ExportError),

    #[error("Template error: {0}")]
    TemplateError(#[from] WalkerError),

    #[error("Generation error: {0}")]
    GenerateError(#[from] GenerateError),
}

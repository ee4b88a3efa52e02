//! Directory walker for discovering custom page templates
//!
//! Every file under the templates collection directory (`_templates/`)
//! becomes a document in the `templates` collection. The generator later
//! moves a template into whichever collection produces a page at the same
//! URL.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::site::{Document, Site, SiteError, TEMPLATES};

/// Errors that can occur while collecting templates
#[derive(Debug)]
pub enum WalkerError {
    /// IO error
    Io(std::io::Error),
    /// Path that is not valid UTF-8
    InvalidPath(PathBuf),
    /// The templates collection is not registered
    Site(SiteError),
}

impl From<std::io::Error> for WalkerError {
    fn from(err: std::io::Error) -> Self {
        WalkerError::Io(err)
    }
}

impl From<SiteError> for WalkerError {
    fn from(err: SiteError) -> Self {
        WalkerError::Site(err)
    }
}

impl std::fmt::Display for WalkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkerError::Io(e) => write!(f, "IO error: {}", e),
            WalkerError::InvalidPath(path) => {
                write!(f, "Template path is not valid UTF-8: {}", path.display())
            }
            WalkerError::Site(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WalkerError {}

/// Add every file under `<root>/_templates` to the templates collection
///
/// # Parameters
/// * `site` - Site whose `templates` collection receives the documents
/// * `root` - Site root directory
///
/// # Returns
/// * `Ok(usize)` - Number of templates found (0 when the directory is absent)
/// * `Err(WalkerError)` - Error reading the directory
pub fn load_templates(site: &mut Site, root: &Path) -> Result<usize, WalkerError> {
    let templates = site.require(TEMPLATES)?;
    let directory = site.collection(templates).directory();
    let templates_root = root.join(&directory);

    if !templates_root.is_dir() {
        log::debug!("No templates directory at {}", templates_root.display());
        return Ok(0);
    }

    let mut count = 0;
    for entry in WalkDir::new(&templates_root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();

        if !path.is_file() || is_hidden(path) {
            continue;
        }

        let relative = relative_url_path(path, &templates_root)?;
        let collection = site.collection(templates);
        let document = Document::new(
            collection.document_path(&relative),
            templates,
            collection.url_for(&relative),
        );
        log::debug!("Found template {} -> {}", document.relative_path, document.url);
        site.insert_document(document);
        count += 1;
    }

    Ok(count)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Path of `path` below `base`, with `/` separators
fn relative_url_path(path: &Path, base: &Path) -> Result<String, WalkerError> {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();

    parts
        .map(|parts| parts.join("/"))
        .ok_or_else(|| WalkerError::InvalidPath(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site_config::SiteConfig;
    use std::fs;

    #[test]
    fn test_relative_url_path() {
        let base = Path::new("/site/_templates");
        let path = base.join("news").join("press.html");
        assert_eq!(relative_url_path(&path, base).unwrap(), "news/press.html");
    }

    #[test]
    fn test_load_templates() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("_templates");
        fs::create_dir_all(templates_dir.join("news")).unwrap();
        fs::write(templates_dir.join("news.html"), "news").unwrap();
        fs::write(templates_dir.join("news").join("press.html"), "press").unwrap();
        fs::write(templates_dir.join(".DS_Store"), "").unwrap();

        let mut site = Site::from_config(&SiteConfig::default());
        let count = load_templates(&mut site, dir.path()).unwrap();
        assert_eq!(count, 2);

        let templates = site.lookup(TEMPLATES).unwrap();
        let urls: Vec<_> = site.documents_in(templates).map(|(_, d)| d.url.clone()).collect();
        // Depth first: a directory's contents come before its sibling files
        assert_eq!(urls, vec!["/templates/news/press/", "/templates/news/"]);

        let news = site.document(site.collection(templates).docs[1]);
        assert_eq!(news.relative_path, "_templates/news.html");
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut site = Site::from_config(&SiteConfig::default());
        assert_eq!(load_templates(&mut site, dir.path()).unwrap(), 0);
    }
}

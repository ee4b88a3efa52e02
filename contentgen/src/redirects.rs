//! Redirect entries handed to the redirect page generator

use itertools::Itertools;
use serde::Serialize;

use crate::site::Site;

/// An old URL that should send visitors to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Old path, always starting with `/`
    pub from: String,
    /// URL of the target document
    pub to: String,
}

/// Collect redirects from every rendered document, in collection order
pub fn collect_redirects(site: &Site) -> Vec<Redirect> {
    let redirects: Vec<Redirect> = site
        .collections()
        .filter(|(_, collection)| collection.output)
        .flat_map(|(id, _)| site.documents_in(id))
        .flat_map(|(_, doc)| {
            doc.redirect_from
                .iter()
                .flatten()
                .filter_map(|from| normalize(from))
                .map(move |from| Redirect {
                    from,
                    to: doc.url.clone(),
                })
        })
        .collect();

    for from in redirects.iter().map(|r| &r.from).duplicates() {
        log::warn!("Redirect source {} is claimed by more than one document", from);
    }

    redirects
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{}", trimmed))
    }
}

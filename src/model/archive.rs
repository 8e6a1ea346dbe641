//! Parsed archive state.

use std::path::{Path, PathBuf};

use super::resource::{Resource, ResourceSource, ResourceSummary};
use crate::error::Result;
use crate::export;

/// Everything recovered from one MHTML file.
///
/// Resource order is discovery order: MIME walk order, then inline scripts
/// in document order, then external scripts in match order. Indices into
/// [`Archive::resources`] are how callers select what to extract.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    html: Option<String>,
    resources: Vec<Resource>,
}

impl Archive {
    pub(crate) fn new(path: PathBuf, html: Option<String>, resources: Vec<Resource>) -> Self {
        Self {
            path,
            html,
            resources,
        }
    }

    /// Path of the archive this state was parsed from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoded HTML body, if the archive has a `text/html` part.
    pub fn html_content(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of resources with the given origin.
    pub fn count_by_source(&self, source: ResourceSource) -> usize {
        self.resources.iter().filter(|r| r.source == source).count()
    }

    /// Display rows for every resource, in index order.
    pub fn summaries(&self) -> Vec<ResourceSummary<'_>> {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| ResourceSummary::new(i, r))
            .collect()
    }

    /// Write the selected resources (all when `selected` is `None`) to `output_dir`.
    ///
    /// See [`export::resource::extract_resources`].
    pub fn extract_resources(
        &self,
        output_dir: &Path,
        selected: Option<&[usize]>,
    ) -> Result<Vec<PathBuf>> {
        export::resource::extract_resources(&self.resources, output_dir, selected)
    }
}

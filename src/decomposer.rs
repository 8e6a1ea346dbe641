//! The MHTML decomposer: envelope walk, script discovery, and extraction for one archive.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DecomposeError, Result};
use crate::fetch::{self, ScriptFetcher};
use crate::model::archive::Archive;
use crate::model::resource::{Resource, ResourceSource};
use crate::parser::{mime, script};

/// Optional collaborators compiled into this build.
///
/// Resolve this once before building a [`Decomposer`]: asking for
/// `fetch_external` when `fetch` is `false` makes construction fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Inline `<script>` extraction (`html` feature).
    pub html_parsing: bool,
    /// Downloading `<script src>` URLs (`fetch` feature).
    pub fetch: bool,
}

impl Capabilities {
    pub const fn current() -> Self {
        Self {
            html_parsing: cfg!(feature = "html"),
            fetch: cfg!(feature = "fetch"),
        }
    }
}

/// Construction options for a [`Decomposer`].
#[derive(Debug, Clone)]
pub struct DecomposeOptions {
    /// Download scripts referenced by absolute `http(s)` URLs.
    pub fetch_external: bool,
    /// Per-request timeout for those downloads.
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            fetch_external: false,
            fetch_timeout: fetch::DEFAULT_TIMEOUT,
            user_agent: fetch::default_user_agent(),
        }
    }
}

impl DecomposeOptions {
    /// Drop `fetch_external` if this build cannot honor it.
    ///
    /// Returns `true` when the option had to be turned off.
    pub fn negotiate(&mut self, caps: Capabilities) -> bool {
        let downgraded = self.fetch_external && !caps.fetch;
        if downgraded {
            self.fetch_external = false;
        }
        downgraded
    }
}

/// Decomposes one MHTML archive.
///
/// [`Decomposer::parse`] walks the MIME envelope, then scans the HTML body
/// for inline scripts and, when enabled, downloads external ones. The parsed
/// [`Archive`] is kept for [`Decomposer::extract_resources`].
pub struct Decomposer {
    path: PathBuf,
    fetcher: Option<Box<dyn ScriptFetcher>>,
    archive: Option<Archive>,
}

impl Decomposer {
    /// Create a decomposer using the built-in HTTP client for external scripts.
    ///
    /// Fails with [`DecomposeError::FetchUnsupported`] if `fetch_external` is
    /// set but this build has no HTTP client.
    pub fn new(path: impl Into<PathBuf>, options: DecomposeOptions) -> Result<Self> {
        let fetcher = if options.fetch_external {
            Some(default_fetcher(&options)?)
        } else {
            None
        };
        Ok(Self {
            path: path.into(),
            fetcher,
            archive: None,
        })
    }

    /// Create a decomposer with a caller-supplied fetcher.
    ///
    /// The fetcher is only kept (and ever called) when `options.fetch_external` is set.
    pub fn with_fetcher(
        path: impl Into<PathBuf>,
        options: &DecomposeOptions,
        fetcher: Box<dyn ScriptFetcher>,
    ) -> Self {
        Self {
            path: path.into(),
            fetcher: options.fetch_external.then_some(fetcher),
            archive: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether external scripts will be downloaded during [`Decomposer::parse`].
    pub fn fetch_external(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Parse the archive and keep the result.
    ///
    /// Any previously parsed state is discarded first, so a failed parse
    /// leaves nothing behind.
    pub fn parse(&mut self) -> Result<&Archive> {
        self.archive = None;

        let envelope = mime::read_envelope(&self.path)?;
        let mut resources = envelope.resources;

        match envelope.html.as_deref() {
            Some(html) => {
                resources.extend(script::inline_scripts(html));
                if let Some(fetcher) = self.fetcher.as_deref() {
                    resources.extend(script::external_scripts(html, fetcher));
                }
            }
            None => tracing::debug!(path = %self.path.display(), "No text/html part"),
        }

        let archive = Archive::new(self.path.clone(), envelope.html, resources);
        tracing::info!(
            path = %self.path.display(),
            embedded = archive.count_by_source(ResourceSource::Embedded),
            inline = archive.count_by_source(ResourceSource::Inline),
            external = archive.count_by_source(ResourceSource::External),
            "Parsed archive"
        );
        Ok(self.archive.insert(archive))
    }

    /// The parsed archive, if [`Decomposer::parse`] has succeeded.
    pub fn archive(&self) -> Option<&Archive> {
        self.archive.as_ref()
    }

    /// Take the parsed archive, consuming the decomposer.
    pub fn into_archive(self) -> Option<Archive> {
        self.archive
    }

    /// Decoded HTML body of the parsed archive.
    pub fn html_content(&self) -> Option<&str> {
        self.archive.as_ref().and_then(Archive::html_content)
    }

    /// Resources of the parsed archive; empty before a successful parse.
    pub fn resources(&self) -> &[Resource] {
        self.archive.as_ref().map(Archive::resources).unwrap_or(&[])
    }

    /// Write the selected resources of the parsed archive to `output_dir`.
    ///
    /// Fails with [`DecomposeError::NotParsed`] before a successful parse.
    pub fn extract_resources(
        &self,
        output_dir: &Path,
        selected: Option<&[usize]>,
    ) -> Result<Vec<PathBuf>> {
        self.archive
            .as_ref()
            .ok_or(DecomposeError::NotParsed)?
            .extract_resources(output_dir, selected)
    }
}

#[cfg(feature = "fetch")]
fn default_fetcher(options: &DecomposeOptions) -> Result<Box<dyn ScriptFetcher>> {
    let fetcher = fetch::HttpFetcher::new(options.fetch_timeout, &options.user_agent)
        .map_err(|e| DecomposeError::FetchSetup(e.to_string()))?;
    Ok(Box::new(fetcher))
}

#[cfg(not(feature = "fetch"))]
fn default_fetcher(_options: &DecomposeOptions) -> Result<Box<dyn ScriptFetcher>> {
    Err(DecomposeError::FetchUnsupported)
}

//! Centralized error types for mhtsplit.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors produced by the decomposer.
///
/// Per-part and per-URL problems are not represented here: they are
/// [`PartError`] / [`crate::fetch::FetchError`] values that get logged and
/// dropped without aborting the enclosing call.
#[derive(Error, Debug)]
pub enum DecomposeError {
    /// The input archive does not exist.
    #[error("MHTML file not found: {0}")]
    NotFound(PathBuf),

    /// The input could not be read or interpreted as a MIME message.
    #[error("Failed to parse MHTML file '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Creating the output directory or writing a resource failed.
    #[error("Extraction failed for '{path}': {source}")]
    Extraction {
        path: PathBuf,
        source: std::io::Error,
    },

    /// External fetching was requested but this build has no HTTP client.
    #[error("External script fetching is not supported by this build")]
    FetchUnsupported,

    /// The HTTP client for external scripts could not be created.
    #[error("Failed to set up HTTP client: {0}")]
    FetchSetup(String),

    /// Extraction was requested before the archive was parsed.
    #[error("No archive has been parsed yet")]
    NotParsed,
}

/// Convenience alias for `Result<T, DecomposeError>`.
pub type Result<T> = std::result::Result<T, DecomposeError>;

impl DecomposeError {
    /// Create a `Parse` variant from a path and any displayable cause.
    pub fn parse(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an `Extraction` variant from a path and an `io::Error`.
    pub fn extraction(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Extraction {
            path: path.into(),
            source,
        }
    }
}

/// A single MIME part that could not be turned into a resource.
#[derive(Error, Debug)]
pub enum PartError {
    /// The transfer encoding of the part could not be decoded.
    #[error("part {index} ({content_type}) has an undecodable transfer encoding")]
    Encoding { index: usize, content_type: String },

    /// Encapsulated messages nest deeper than the walker follows.
    #[error("part {index} nests encapsulated messages deeper than {max_depth} levels")]
    TooDeep { index: usize, max_depth: usize },
}

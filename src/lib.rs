//! `mhtsplit` — split MHTML web archives into their constituent resources.
//!
//! This crate walks the MIME envelope of an `.mhtml`/`.mht` file, finds the
//! scripts referenced by its HTML page, and writes the resources you select
//! to disk without overwriting existing files.

pub mod config;
pub mod decomposer;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod parser;

pub use decomposer::{Capabilities, DecomposeOptions, Decomposer};
pub use error::{DecomposeError, Result};
pub use model::archive::Archive;
pub use model::resource::{Resource, ResourceSource};

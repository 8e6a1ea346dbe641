//! Core data model: resources and the parsed archive that owns them.

pub mod archive;
pub mod resource;

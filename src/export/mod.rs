//! Materialization of archive resources as individual files.

pub mod resource;

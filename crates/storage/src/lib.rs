//! Storage adapters for roadmap catalogs and learner state.
//!
//! This crate provides a trait-based storage interface with a JSON file
//! implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::{JsonStorage, read_catalog_file};

// src/config/mod.rs

//! Configuration loading and validation for tailship.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a ready-to-use [`ConfigFile`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{
    ConfigFile, ConfigSection, ExcludeSection, FileEntry, LogFileSpec, RawConfigFile,
    TransformSection,
};
pub use validate::MINIMUM_REFRESH_INTERVAL;

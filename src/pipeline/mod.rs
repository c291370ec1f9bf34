// src/pipeline/mod.rs

//! Per-line processing between the tailer and the collector.
//!
//! - [`matcher`] holds the compiled exclusion sets used both for file paths
//!   and for line content.
//! - [`transform`] derives the group/category labels from a file path and
//!   rewrites each line into its forwarded form.

pub mod matcher;
pub mod transform;

pub use matcher::{ExclusionSet, matches_any};
pub use transform::{PathLabels, TransformRules, effective_tag};

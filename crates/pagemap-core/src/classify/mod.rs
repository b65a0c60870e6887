//! # Classify Module
//!
//! Sorts the immediate entries of a directory into labeled groups.
//!
//! ## Module layout
//!
//! - `filter`: entry metadata, the [`EntryFilter`] trait and the built-in filters
//! - `classifier`: the single-level classification pass, flat or bucketed
//!
//! ## Example
//!
//! ```rust,no_run
//! use pagemap_core::classify::{classify, EntryFilter, FilterSet, PatternFilter};
//!
//! # fn main() -> pagemap_core::Result<()> {
//! let entries = PatternFilter::entry_sources()?;
//! let pages = PatternFilter::page_templates()?;
//! let filters = FilterSet::many([&entries as &dyn EntryFilter, &pages]);
//!
//! let result = classify("src/home", &filters)?;
//! let buckets = result.as_buckets().expect("multi-filter pass");
//! println!("{:?}", buckets.get("IsEntrySource"));
//! # Ok(())
//! # }
//! ```

mod classifier;
mod filter;

pub use classifier::{
    classify, classify_buckets, classify_flat, Classification, FilterSet, LabeledBuckets,
};
pub use filter::{
    EntryFilter, EntryKind, EntryMetadata, FnFilter, IsDirectory, PatternFilter,
    DEFAULT_PAGE_PATTERNS, DEFAULT_SCRIPT_PATTERNS, DEFAULT_STYLE_PATTERNS, DIRECTORY_LABEL,
    ENTRY_SOURCE_LABEL, PAGE_TEMPLATE_LABEL,
};

pub mod assemble;
pub mod classify;
pub mod config;
pub mod error;
pub mod manifest;

pub use assemble::{assemble, DirectoryPlan};
pub use classify::{
    classify, classify_buckets, classify_flat, Classification, EntryFilter, EntryKind,
    EntryMetadata, FilterSet, FnFilter, IsDirectory, LabeledBuckets, PatternFilter,
};
pub use config::Config;
pub use error::{PageMapError, Result};
pub use manifest::{BundleManifest, EntrySet, LoaderRule, OutputSettings, PageDirective};

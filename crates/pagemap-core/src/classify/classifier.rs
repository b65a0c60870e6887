//! Directory Classifier
//!
//! One non-recursive pass over a directory, sorting its immediate entries
//! through one or several [`EntryFilter`]s.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::{PageMapError, Result};

use super::filter::{EntryFilter, EntryMetadata};

/// Filters applied during a classification pass
pub enum FilterSet<'a> {
    /// One filter, producing a flat list
    Single(&'a dyn EntryFilter),
    /// Several filters in declaration order, producing labeled buckets
    Many(Vec<&'a dyn EntryFilter>),
}

impl<'a> FilterSet<'a> {
    pub fn single(filter: &'a dyn EntryFilter) -> Self {
        Self::Single(filter)
    }

    pub fn many(filters: impl IntoIterator<Item = &'a dyn EntryFilter>) -> Self {
        Self::Many(filters.into_iter().collect())
    }
}

/// Entry names grouped per filter label, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledBuckets {
    buckets: Vec<(String, Vec<String>)>,
}

impl LabeledBuckets {
    fn with_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            buckets: labels
                .into_iter()
                .map(|l| (l.to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Names collected under `label`
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.buckets
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, names)| names.as_slice())
    }

    /// Take the bucket for `label`, empty when the label is unknown
    pub fn take(&mut self, label: &str) -> Vec<String> {
        self.buckets
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, names)| std::mem::take(names))
            .unwrap_or_default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets
            .iter()
            .map(|(l, names)| (l.as_str(), names.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn push(&mut self, index: usize, name: &str) {
        self.buckets[index].1.push(name.to_string());
    }
}

impl Serialize for LabeledBuckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (label, names) in &self.buckets {
            map.serialize_entry(label, names)?;
        }
        map.end()
    }
}

/// Result of a classification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Flat(Vec<String>),
    Buckets(LabeledBuckets),
}

impl Classification {
    pub fn as_flat(&self) -> Option<&[String]> {
        match self {
            Self::Flat(names) => Some(names),
            Self::Buckets(_) => None,
        }
    }

    pub fn as_buckets(&self) -> Option<&LabeledBuckets> {
        match self {
            Self::Buckets(buckets) => Some(buckets),
            Self::Flat(_) => None,
        }
    }

    pub fn into_flat(self) -> Option<Vec<String>> {
        match self {
            Self::Flat(names) => Some(names),
            Self::Buckets(_) => None,
        }
    }

    pub fn into_buckets(self) -> Option<LabeledBuckets> {
        match self {
            Self::Buckets(buckets) => Some(buckets),
            Self::Flat(_) => None,
        }
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Flat(names) => names.serialize(serializer),
            Self::Buckets(buckets) => buckets.serialize(serializer),
        }
    }
}

fn validate_base(base_path: &Path) -> Result<()> {
    if base_path.as_os_str().is_empty() {
        return Err(PageMapError::missing("base_path"));
    }
    Ok(())
}

/// Every filter needs a distinct, non-empty label
fn validate_labels(filters: &[&dyn EntryFilter]) -> Result<()> {
    if filters.is_empty() {
        return Err(PageMapError::missing("filters"));
    }

    let mut seen = HashSet::new();
    for (index, filter) in filters.iter().enumerate() {
        let label = filter.label();
        if label.is_empty() {
            return Err(PageMapError::InvalidPredicate {
                descriptor: format!("filter #{index} has no label"),
            });
        }
        if !seen.insert(label) {
            return Err(PageMapError::InvalidPredicate {
                descriptor: format!("filter #{index} reuses label '{label}'"),
            });
        }
    }

    Ok(())
}

/// One listed entry: the raw name for filesystem access, the display name
/// for filters and results
struct ListedEntry {
    os_name: OsString,
    name: String,
}

/// List the immediate entries of `base_path` in directory order
fn list_entries(base_path: &Path) -> Result<Vec<ListedEntry>> {
    let list_err = |source| PageMapError::ListUnavailable {
        path: base_path.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(base_path).map_err(list_err)? {
        let os_name = entry.map_err(list_err)?.file_name();
        let name = os_name.to_string_lossy().into_owned();
        entries.push(ListedEntry { os_name, name });
    }
    Ok(entries)
}

/// Single-filter pass: names accepted by `filter`, in directory order
pub fn classify_flat(base_path: &Path, filter: &dyn EntryFilter) -> Result<Vec<String>> {
    validate_base(base_path)?;

    let mut matched = Vec::new();
    for entry in list_entries(base_path)? {
        let metadata = EntryMetadata::stat(&base_path.join(&entry.os_name))?;
        if filter.matches(&metadata, &entry.name)? {
            matched.push(entry.name);
        }
    }
    Ok(matched)
}

/// Multi-filter pass: one bucket per label, in declaration order
///
/// Each entry is tested against every filter, so it may land in several
/// buckets or none. Labels are checked before the directory is read.
pub fn classify_buckets(
    base_path: &Path,
    filters: &[&dyn EntryFilter],
) -> Result<LabeledBuckets> {
    validate_base(base_path)?;
    validate_labels(filters)?;

    let mut buckets = LabeledBuckets::with_labels(filters.iter().map(|f| f.label()));
    for entry in list_entries(base_path)? {
        let metadata = EntryMetadata::stat(&base_path.join(&entry.os_name))?;
        for (index, filter) in filters.iter().enumerate() {
            if filter.matches(&metadata, &entry.name)? {
                debug!(entry = %entry.name, filter = filter.label(), "matched");
                buckets.push(index, &entry.name);
            }
        }
    }
    Ok(buckets)
}

/// Classify the immediate entries of `base_path`
///
/// A [`FilterSet::Single`] yields [`Classification::Flat`], a
/// [`FilterSet::Many`] yields [`Classification::Buckets`].
///
/// Subdirectories are not descended into. Names that are not valid UTF-8
/// are reported lossily.
pub fn classify(base_path: impl AsRef<Path>, filters: &FilterSet<'_>) -> Result<Classification> {
    let base_path = base_path.as_ref();
    match filters {
        FilterSet::Single(filter) => classify_flat(base_path, *filter).map(Classification::Flat),
        FilterSet::Many(filters) => {
            classify_buckets(base_path, filters).map(Classification::Buckets)
        }
    }
}

//! Entry filters
//!
//! Labeled predicates evaluated against one directory entry. The label is
//! the filter's identity and becomes the bucket key in multi-filter mode.

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};

use crate::error::{PageMapError, Result};

/// Label of the script/stylesheet filter
pub const ENTRY_SOURCE_LABEL: &str = "IsEntrySource";
/// Label of the markup filter
pub const PAGE_TEMPLATE_LABEL: &str = "IsPageTemplate";
/// Label of the directory filter
pub const DIRECTORY_LABEL: &str = "IsDirectory";

/// Script sources recognised as entry points
pub const DEFAULT_SCRIPT_PATTERNS: &[&str] = &[r"\.js$"];
/// Stylesheets recognised as entry points
pub const DEFAULT_STYLE_PATTERNS: &[&str] = &[r"\.s?css$"];
/// Markup files turned into generated pages
pub const DEFAULT_PAGE_PATTERNS: &[&str] = &[r"\.html$"];

/// Kind of a directory entry after following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Stat information for one directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    pub kind: EntryKind,
    pub len: u64,
}

impl EntryMetadata {
    pub fn new(kind: EntryKind, len: u64) -> Self {
        Self { kind, len }
    }

    /// Stat `path`, following symlinks
    pub fn stat(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|source| PageMapError::StatUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from(&meta))
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

impl From<&fs::Metadata> for EntryMetadata {
    fn from(meta: &fs::Metadata) -> Self {
        let kind = if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Self::new(kind, meta.len())
    }
}

/// A labeled predicate over `(metadata, file name)`
pub trait EntryFilter {
    /// Identity of the filter, used as the bucket key
    fn label(&self) -> &str;

    /// Whether the entry belongs to this filter
    fn matches(&self, metadata: &EntryMetadata, file: &str) -> Result<bool>;
}

fn require_file(file: &str) -> Result<()> {
    if file.is_empty() {
        return Err(PageMapError::missing("file"));
    }
    Ok(())
}

/// Regular files whose name matches any of a set of patterns
#[derive(Debug, Clone)]
pub struct PatternFilter {
    label: String,
    patterns: Vec<Regex>,
}

impl PatternFilter {
    /// Compile `patterns` case-insensitively under `label`
    ///
    /// An empty pattern list is rejected; it would accept nothing.
    pub fn new<S: AsRef<str>>(label: impl Into<String>, patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(PageMapError::missing("patterns"));
        }

        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| PageMapError::InvalidPattern {
                        pattern: p.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            label: label.into(),
            patterns,
        })
    }

    /// Script and stylesheet sources with the default patterns
    pub fn entry_sources() -> Result<Self> {
        let patterns: Vec<&str> = DEFAULT_SCRIPT_PATTERNS
            .iter()
            .chain(DEFAULT_STYLE_PATTERNS)
            .copied()
            .collect();
        Self::new(ENTRY_SOURCE_LABEL, &patterns)
    }

    /// Markup templates with the default patterns
    pub fn page_templates() -> Result<Self> {
        Self::new(PAGE_TEMPLATE_LABEL, DEFAULT_PAGE_PATTERNS)
    }

    /// Source text of the compiled patterns
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(|r| r.as_str()).collect()
    }

    /// Name-only check, without consulting metadata
    pub fn matches_name(&self, file: &str) -> bool {
        self.patterns.iter().any(|r| r.is_match(file))
    }
}

impl EntryFilter for PatternFilter {
    fn label(&self) -> &str {
        &self.label
    }

    fn matches(&self, metadata: &EntryMetadata, file: &str) -> Result<bool> {
        require_file(file)?;
        Ok(metadata.is_file() && self.matches_name(file))
    }
}

/// Entries that are directories
#[derive(Debug, Clone, Copy, Default)]
pub struct IsDirectory;

impl EntryFilter for IsDirectory {
    fn label(&self) -> &str {
        DIRECTORY_LABEL
    }

    fn matches(&self, metadata: &EntryMetadata, file: &str) -> Result<bool> {
        require_file(file)?;
        Ok(metadata.is_dir())
    }
}

/// Ad hoc filter wrapping a closure
pub struct FnFilter<F> {
    label: String,
    f: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&EntryMetadata, &str) -> bool,
{
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            f,
        }
    }
}

impl<F> EntryFilter for FnFilter<F>
where
    F: Fn(&EntryMetadata, &str) -> bool,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn matches(&self, metadata: &EntryMetadata, file: &str) -> Result<bool> {
        require_file(file)?;
        Ok((self.f)(metadata, file))
    }
}

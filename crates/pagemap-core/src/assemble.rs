//! Configuration Assembler
//!
//! Runs one classification pass per page directory under the source root and
//! folds the per-directory plans into a [`BundleManifest`].

use std::path::Path;

use tracing::{debug, info};

use crate::classify::{classify_buckets, classify_flat, EntryFilter, IsDirectory, PatternFilter};
use crate::config::Config;
use crate::error::{PageMapError, Result};
use crate::manifest::{BundleManifest, EntrySet, LoaderRule, OutputSettings, PageDirective};

/// Entry modules and pages found in one page directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPlan {
    pub name: String,
    pub entries: Vec<String>,
    pub pages: Vec<PageDirective>,
}

impl DirectoryPlan {
    /// Classify `<project_dir>/<root>/<name>` and derive its plan
    ///
    /// `root` is the normalized, project-relative source root used to spell
    /// paths in the manifest.
    pub fn scan(
        project_dir: &Path,
        root: &str,
        name: &str,
        entry_filter: &PatternFilter,
        page_filter: &PatternFilter,
        page_prefix: &str,
    ) -> Result<Self> {
        let dir = join_segments(&[root, name]);
        info!(dir = %dir, "checking dir");

        let filters = [entry_filter as &dyn EntryFilter, page_filter];
        let mut buckets = classify_buckets(&project_dir.join(&dir), &filters)?;

        let entry_files = buckets.take(entry_filter.label());
        let page_files = buckets.take(page_filter.label());
        debug!(dir = %dir, entries = ?entry_files, pages = ?page_files, "classified");

        let entries = entry_files
            .iter()
            .map(|file| module_path(&join_segments(&[&dir, file])))
            .collect();
        let pages = page_files
            .iter()
            .map(|file| PageDirective {
                filename: format!("{page_prefix}{file}"),
                template: join_segments(&[&dir, file]),
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            entries,
            pages,
        })
    }
}

/// Running result of the fold over directory plans
#[derive(Debug, Clone, Default)]
struct Assembly {
    entry: EntrySet,
    pages: Vec<PageDirective>,
}

impl Assembly {
    fn append(mut self, plan: DirectoryPlan) -> Self {
        self.entry.insert(plan.name, plan.entries);
        self.pages.extend(plan.pages);
        self
    }
}

/// Build the bundle manifest for the source tree under `project_dir`
pub fn assemble(project_dir: &Path, config: &Config) -> Result<BundleManifest> {
    let root = normalize_root(&config.source.root);
    let root_dir = if root.is_empty() {
        project_dir.to_path_buf()
    } else {
        project_dir.join(&root)
    };

    let entry_filter = config.source.entry_filter()?;
    let page_filter = config.source.page_filter()?;

    let loaders = loader_rules(config)?;
    let page_dirs = classify_flat(&root_dir, &IsDirectory)?;

    let assembly = page_dirs
        .iter()
        .map(|name| {
            DirectoryPlan::scan(
                project_dir,
                &root,
                name,
                &entry_filter,
                &page_filter,
                &config.output.page_prefix,
            )
        })
        .try_fold(Assembly::default(), |acc, plan| plan.map(|p| acc.append(p)))?;

    info!(
        entries = assembly.entry.len(),
        pages = assembly.pages.len(),
        "assembled manifest"
    );

    Ok(BundleManifest {
        entry: assembly.entry,
        pages: assembly.pages,
        style_extraction: config.output.style_extraction.clone(),
        output: OutputSettings {
            path: config.output.path.clone(),
            filename: config.output.filename.clone(),
            public_path: config.output.public_path.clone(),
        },
        loaders,
    })
}

/// Flags carried by every loader test; file names are matched case-insensitively
const LOADER_FLAGS: &str = "i";

fn loader_rules(config: &Config) -> Result<Vec<LoaderRule>> {
    let exclude = &config.loaders.script_exclude;
    Ok(vec![
        LoaderRule {
            test: join_patterns("source.script_patterns", &config.source.script_patterns)?,
            flags: Some(LOADER_FLAGS.to_string()),
            exclude: (!exclude.is_empty()).then(|| exclude.clone()),
            loader: Some(config.loaders.script_loader.clone()),
            extract: None,
        },
        LoaderRule {
            test: join_patterns("source.style_patterns", &config.source.style_patterns)?,
            flags: Some(LOADER_FLAGS.to_string()),
            exclude: None,
            loader: None,
            extract: Some(config.loaders.style_extract.clone()),
        },
    ])
}

/// Single alternation over the patterns configured under `key`
fn join_patterns(key: &str, patterns: &[String]) -> Result<String> {
    match patterns {
        [] => Err(PageMapError::missing(key)),
        [single] => Ok(single.clone()),
        _ => Ok(patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|")),
    }
}

/// Strip `./` prefixes and trailing separators; `.` becomes empty
fn normalize_root(root: &str) -> String {
    let mut root = root.trim().replace('\\', "/");
    while let Some(rest) = root.strip_prefix("./") {
        root = rest.to_string();
    }
    let trimmed = root.trim_end_matches('/');
    if trimmed == "." {
        return String::new();
    }
    if trimmed.is_empty() && root.starts_with('/') {
        return "/".to_string();
    }
    trimmed.to_string()
}

fn join_segments(segments: &[&str]) -> String {
    let mut joined = String::new();
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(segment);
    }
    joined
}

/// Module request for a project-relative path
fn module_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("./{path}")
    }
}

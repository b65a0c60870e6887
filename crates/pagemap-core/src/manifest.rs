//! Bundle manifest types
//!
//! Everything the bundler consumes, serialized as one JSON document.

use std::fs;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::Result;

/// Named entry points, keyed by page directory in scan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: Vec<(String, Vec<String>)>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the modules of `name`
    pub fn insert(&mut self, name: impl Into<String>, modules: Vec<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = modules,
            None => self.entries.push((name, modules)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, modules)| modules.as_slice())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, modules)| (n.as_str(), modules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for EntrySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, modules) in &self.entries {
            map.serialize_entry(name, modules)?;
        }
        map.end()
    }
}

/// One generated HTML page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDirective {
    /// Output file name, relative to the output path
    pub filename: String,
    /// Source template path
    pub template: String,
}

/// How the bundler treats one kind of source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderRule {
    pub test: String,
    /// Regex flags for `test`, e.g. `i` for case-insensitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
    /// Loaders whose output is extracted into a separate stylesheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub path: String,
    pub filename: String,
    pub public_path: String,
}

/// Complete bundler configuration for one source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub entry: EntrySet,
    pub pages: Vec<PageDirective>,
    pub style_extraction: String,
    pub output: OutputSettings,
    pub loaders: Vec<LoaderRule>,
}

impl BundleManifest {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Write the manifest to `path`, creating parent directories
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut json = self.to_json(pretty)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> BundleManifest {
        let mut entry = EntrySet::new();
        entry.insert("zeta", vec!["./src/zeta/main.js".to_string()]);
        entry.insert("alpha", Vec::new());

        BundleManifest {
            entry,
            pages: vec![PageDirective {
                filename: "../index.html".to_string(),
                template: "src/zeta/index.html".to_string(),
            }],
            style_extraction: "[name].[hash].scss".to_string(),
            output: OutputSettings {
                path: "dist/assets".to_string(),
                filename: "[name].[hash].js".to_string(),
                public_path: "assets/".to_string(),
            },
            loaders: vec![LoaderRule {
                test: r"\.js$".to_string(),
                flags: None,
                exclude: None,
                loader: Some("babel".to_string()),
                extract: None,
            }],
        }
    }

    #[test]
    fn test_entry_set_keeps_insertion_order() {
        let manifest = sample();
        assert_eq!(manifest.entry.names(), vec!["zeta", "alpha"]);

        let json = manifest.to_json(false).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_entry_set_insert_replaces() {
        let mut entry = EntrySet::new();
        entry.insert("home", vec!["a".to_string()]);
        entry.insert("home", vec!["b".to_string()]);
        assert_eq!(entry.len(), 1);
        assert_eq!(entry.get("home").unwrap(), ["b"]);
    }

    #[test]
    fn test_camel_case_keys_and_skipped_options() {
        let json: serde_json::Value =
            serde_json::from_str(&sample().to_json(true).unwrap()).unwrap();

        assert_eq!(json["styleExtraction"], "[name].[hash].scss");
        assert_eq!(json["output"]["publicPath"], "assets/");
        assert!(json["loaders"][0].get("exclude").is_none());
        assert!(json["loaders"][0].get("flags").is_none());
        assert_eq!(json["loaders"][0]["loader"], "babel");
    }

    #[test]
    fn test_write_to_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build/pagemap.json");
        sample().write_to(&path, false).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'));
        assert!(written.contains("\"entry\""));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::{
    PatternFilter, DEFAULT_PAGE_PATTERNS, DEFAULT_SCRIPT_PATTERNS, DEFAULT_STYLE_PATTERNS,
    ENTRY_SOURCE_LABEL, PAGE_TEMPLATE_LABEL,
};
use crate::error::{PageMapError, Result};

const CONFIG_FILE: &str = "pagemap.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# pagemap configuration file
# Location: <project>/pagemap.toml

[source]
# Root whose immediate subdirectories are page directories
root = "./src/"

# Case-insensitive patterns for entry sources and page templates
script_patterns = ['\.js$']
style_patterns = ['\.s?css$']
page_patterns = ['\.html$']

[output]
# Bundler output directory, file name pattern and public path
path = "dist/assets"
filename = "[name].[hash].js"
public_path = "assets/"

# Naming pattern for extracted stylesheets
style_extraction = "[name].[hash].scss"

# Prefix of generated page file names, relative to the output path
page_prefix = "../"

[loaders]
script_loader = "babel?presets[]=es2015"
script_exclude = "(node_modules|bower_components)"
style_extract = ["css", "sass"]
"#;

/// Project configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub loaders: LoaderConfig,
}

/// Where page directories live and how their files are recognised
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_root")]
    pub root: String,

    #[serde(default = "default_script_patterns")]
    pub script_patterns: Vec<String>,

    #[serde(default = "default_style_patterns")]
    pub style_patterns: Vec<String>,

    #[serde(default = "default_page_patterns")]
    pub page_patterns: Vec<String>,
}

/// Bundler output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,

    #[serde(default = "default_output_filename")]
    pub filename: String,

    #[serde(default = "default_public_path")]
    pub public_path: String,

    #[serde(default = "default_style_extraction")]
    pub style_extraction: String,

    #[serde(default = "default_page_prefix")]
    pub page_prefix: String,
}

/// Loader rules handed to the bundler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    #[serde(default = "default_script_loader")]
    pub script_loader: String,

    #[serde(default = "default_script_exclude")]
    pub script_exclude: String,

    #[serde(default = "default_style_extract")]
    pub style_extract: Vec<String>,
}

fn to_strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|s| s.to_string()).collect()
}

fn default_root() -> String {
    "./src/".to_string()
}

fn default_script_patterns() -> Vec<String> {
    to_strings(DEFAULT_SCRIPT_PATTERNS)
}

fn default_style_patterns() -> Vec<String> {
    to_strings(DEFAULT_STYLE_PATTERNS)
}

fn default_page_patterns() -> Vec<String> {
    to_strings(DEFAULT_PAGE_PATTERNS)
}

fn default_output_path() -> String {
    "dist/assets".to_string()
}

fn default_output_filename() -> String {
    "[name].[hash].js".to_string()
}

fn default_public_path() -> String {
    "assets/".to_string()
}

fn default_style_extraction() -> String {
    "[name].[hash].scss".to_string()
}

fn default_page_prefix() -> String {
    "../".to_string()
}

fn default_script_loader() -> String {
    "babel?presets[]=es2015".to_string()
}

fn default_script_exclude() -> String {
    "(node_modules|bower_components)".to_string()
}

fn default_style_extract() -> Vec<String> {
    to_strings(&["css", "sass"])
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            script_patterns: default_script_patterns(),
            style_patterns: default_style_patterns(),
            page_patterns: default_page_patterns(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_output_filename(),
            public_path: default_public_path(),
            style_extraction: default_style_extraction(),
            page_prefix: default_page_prefix(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            script_loader: default_script_loader(),
            script_exclude: default_script_exclude(),
            style_extract: default_style_extract(),
        }
    }
}

impl SourceConfig {
    /// Filter for script and stylesheet entry sources
    pub fn entry_filter(&self) -> Result<PatternFilter> {
        let patterns: Vec<&String> = self
            .script_patterns
            .iter()
            .chain(&self.style_patterns)
            .collect();
        PatternFilter::new(ENTRY_SOURCE_LABEL, &patterns)
    }

    /// Filter for page templates
    pub fn page_filter(&self) -> Result<PatternFilter> {
        PatternFilter::new(PAGE_TEMPLATE_LABEL, &self.page_patterns)
    }
}

impl Config {
    /// Load config from project directory
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| PageMapError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to project directory
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let path = project_dir.join(CONFIG_FILE);
        fs::create_dir_all(project_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| PageMapError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(project_dir: &Path) -> Result<PathBuf> {
        let path = project_dir.join(CONFIG_FILE);
        fs::create_dir_all(project_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "source.root" => self.source.root = value.to_string(),
            "source.script_patterns" => self.source.script_patterns = parse_string_list(value)?,
            "source.style_patterns" => self.source.style_patterns = parse_string_list(value)?,
            "source.page_patterns" => self.source.page_patterns = parse_string_list(value)?,
            "output.path" => self.output.path = value.to_string(),
            "output.filename" => self.output.filename = value.to_string(),
            "output.public_path" => self.output.public_path = value.to_string(),
            "output.style_extraction" => self.output.style_extraction = value.to_string(),
            "output.page_prefix" => self.output.page_prefix = value.to_string(),
            "loaders.script_loader" => self.loaders.script_loader = value.to_string(),
            "loaders.script_exclude" => self.loaders.script_exclude = value.to_string(),
            "loaders.style_extract" => self.loaders.style_extract = parse_string_list(value)?,
            _ => {
                return Err(PageMapError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("source.root".to_string(), self.source.root.clone()),
            (
                "source.script_patterns".to_string(),
                format!("{:?}", self.source.script_patterns),
            ),
            (
                "source.style_patterns".to_string(),
                format!("{:?}", self.source.style_patterns),
            ),
            (
                "source.page_patterns".to_string(),
                format!("{:?}", self.source.page_patterns),
            ),
            ("output.path".to_string(), self.output.path.clone()),
            ("output.filename".to_string(), self.output.filename.clone()),
            (
                "output.public_path".to_string(),
                self.output.public_path.clone(),
            ),
            (
                "output.style_extraction".to_string(),
                self.output.style_extraction.clone(),
            ),
            (
                "output.page_prefix".to_string(),
                self.output.page_prefix.clone(),
            ),
            (
                "loaders.script_loader".to_string(),
                self.loaders.script_loader.clone(),
            ),
            (
                "loaders.script_exclude".to_string(),
                self.loaders.script_exclude.clone(),
            ),
            (
                "loaders.style_extract".to_string(),
                format!("{:?}", self.loaders.style_extract),
            ),
        ]
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Result<Vec<String>> {
    let trimmed = value.trim();

    // JSON array format: ["a", "b"]
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let inner = &trimmed[1..trimmed.len() - 1];
        if inner.trim().is_empty() {
            return Ok(Vec::new());
        }

        if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
            return Ok(items);
        }
        return Ok(split_items(inner));
    }

    Ok(split_items(trimmed))
}

fn split_items(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_string_list_comma() {
        let result = parse_string_list("css,sass").unwrap();
        assert_eq!(result, vec!["css", "sass"]);
    }

    #[test]
    fn test_parse_string_list_json() {
        let result = parse_string_list(r#"["\\.jsx?$", "\\.mjs$"]"#).unwrap();
        assert_eq!(result, vec![r"\.jsx?$", r"\.mjs$"]);
    }

    #[test]
    fn test_parse_string_list_single_quoted() {
        let result = parse_string_list(r"['\.js$', '\.ts$']").unwrap();
        assert_eq!(result, vec![r"\.js$", r"\.ts$"]);
    }

    #[test]
    fn test_parse_string_list_empty() {
        let result = parse_string_list("[]").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("output.public_path", "static/").unwrap();
        assert_eq!(config.output.public_path, "static/");
        assert_eq!(config.get("output.public_path").unwrap(), "static/");

        config.set("loaders.style_extract", "css,less").unwrap();
        assert_eq!(config.loaders.style_extract, vec!["css", "less"]);
    }

    #[test]
    fn test_config_unknown_key() {
        let mut config = Config::default();
        assert!(config.get("output.nope").is_none());
        let err = config.set("output.nope", "x").unwrap_err();
        assert!(matches!(err, PageMapError::ConfigKeyNotFound { .. }));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.source.root, "./src/");
        assert_eq!(config.output.style_extraction, "[name].[hash].scss");
    }

    #[test]
    fn test_init_template_parses_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = Config::init(temp.path()).unwrap();
        assert_eq!(path, Config::path(temp.path()));

        let config = Config::load(temp.path()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.list(), defaults.list());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[source]\nroot = \"pages\"\n",
        )
        .unwrap();

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.source.root, "pages");
        assert_eq!(config.source.page_patterns, vec![r"\.html$"]);
        assert_eq!(config.output.path, "dist/assets");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set("source.root", "web").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = Config::load(temp.path()).unwrap();
        assert_eq!(loaded.source.root, "web");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[source\nroot = 1").unwrap();

        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, PageMapError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[source]\nentry_patterns = ['\\.ts$']\n",
        )
        .unwrap();

        let err = Config::load(temp.path()).unwrap_err();
        match err {
            PageMapError::ConfigParse { message, .. } => {
                assert!(message.contains("entry_patterns"), "{message}")
            }
            other => panic!("expected ConfigParse, got {other:?}"),
        }

        fs::write(temp.path().join(CONFIG_FILE), "[bundler]\nmode = \"dev\"\n").unwrap();
        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, PageMapError::ConfigParse { .. }));
    }

    #[test]
    fn test_source_filters_use_configured_patterns() {
        let mut config = Config::default();
        config.set("source.script_patterns", r"\.ts$").unwrap();

        let filter = config.source.entry_filter().unwrap();
        assert_eq!(filter.patterns(), vec![r"\.ts$", r"\.s?css$"]);
        assert!(filter.matches_name("main.ts"));
        assert!(!filter.matches_name("main.js"));
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pagemap")]
#[command(about = "Generate bundler entry points and HTML page directives from a source tree")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project directory (default: current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Built-in filters selectable from the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterKind {
    /// Script and stylesheet entry sources
    Entry,
    /// HTML page templates
    Page,
    /// Subdirectories
    Dir,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the bundle manifest for the source tree
    Manifest {
        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Classify the immediate entries of one directory
    Classify {
        /// Directory to scan
        dir: PathBuf,

        /// Filters to apply; one gives a flat list, several give labeled buckets
        #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = [FilterKind::Entry, FilterKind::Page])]
        filter: Vec<FilterKind>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., source.root)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., output.public_path)
        key: String,

        /// Value to set (e.g., "static/" or "[css, sass]")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Create pagemap.toml with defaults
    Init,
}

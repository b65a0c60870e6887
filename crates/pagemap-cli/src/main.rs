use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagemap_core::classify::{classify, EntryFilter, FilterSet, IsDirectory};
use pagemap_core::config::Config;
use pagemap_core::{assemble, Classification, PageMapError, Result};

mod args;
use args::{Cli, Commands, ConfigAction, FilterKind, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let project_dir = resolve_project_dir(cli.project_dir);
    tracing::debug!(project_dir = %project_dir.display(), "resolved project dir");

    let result = match cli.command {
        Some(Commands::Manifest { out, compact }) => {
            handle_manifest(&project_dir, out.as_deref(), compact, cli.quiet)
        }
        Some(Commands::Classify { dir, filter, json }) => {
            handle_classify(&project_dir, &dir, &filter, json)
        }
        Some(Commands::Config { action }) => handle_config(action, &project_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "pagemap_core=error,pagemap=error"
    } else if verbose {
        "pagemap_core=debug,pagemap=debug"
    } else {
        "pagemap_core=warn,pagemap=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "pagemap", &mut io::stdout());
}

fn resolve_project_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir;
    }

    if let Ok(dir) = std::env::var("PAGEMAP_PROJECT_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(".")
}

fn handle_manifest(project_dir: &Path, out: Option<&Path>, compact: bool, quiet: bool) -> Result<()> {
    let config = Config::load(project_dir)?;
    let manifest = assemble(project_dir, &config)?;

    match out {
        Some(path) => {
            manifest.write_to(path, !compact)?;
            if !quiet {
                eprintln!(
                    "{} {} ({} entries, {} pages)",
                    "Wrote:".green(),
                    path.display(),
                    manifest.entry.len(),
                    manifest.pages.len()
                );
            }
        }
        None => println!("{}", manifest.to_json(!compact)?),
    }

    Ok(())
}

fn handle_classify(project_dir: &Path, dir: &Path, kinds: &[FilterKind], json: bool) -> Result<()> {
    let result = classify_dir(project_dir, dir, kinds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        Classification::Flat(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        Classification::Buckets(buckets) => {
            for (label, names) in buckets.iter() {
                println!("{} ({})", label.cyan(), names.len());
                for name in names {
                    println!("  {}", name);
                }
            }
        }
    }

    Ok(())
}

/// One classification pass over `dir`; a single kind gives a flat list,
/// several give labeled buckets
fn classify_dir(project_dir: &Path, dir: &Path, kinds: &[FilterKind]) -> Result<Classification> {
    let config = Config::load(project_dir)?;
    let entry_filter = config.source.entry_filter()?;
    let page_filter = config.source.page_filter()?;

    let filters: Vec<&dyn EntryFilter> = kinds
        .iter()
        .map(|kind| match kind {
            FilterKind::Entry => &entry_filter as &dyn EntryFilter,
            FilterKind::Page => &page_filter,
            FilterKind::Dir => &IsDirectory,
        })
        .collect();

    let filter_set = if filters.len() == 1 {
        FilterSet::single(filters[0])
    } else {
        FilterSet::Many(filters)
    };

    let base = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project_dir.join(dir)
    };
    classify(&base, &filter_set)
}

fn handle_config(action: ConfigAction, project_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(project_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(PageMapError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(project_dir)?;
            config.set(&key, &value)?;
            config.save(project_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(project_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(project_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(project_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("src/home");
        fs::create_dir_all(home.join("parts")).unwrap();
        fs::write(home.join("main.js"), "x").unwrap();
        fs::write(home.join("index.html"), "x").unwrap();
        temp
    }

    #[test]
    fn test_single_kind_gives_flat_list() {
        let temp = project();
        let result = classify_dir(temp.path(), Path::new("src/home"), &[FilterKind::Page]).unwrap();
        assert_eq!(result, Classification::Flat(vec!["index.html".to_string()]));

        let result = classify_dir(temp.path(), Path::new("src/home"), &[FilterKind::Dir]).unwrap();
        assert_eq!(result.into_flat().unwrap(), vec!["parts"]);
    }

    #[test]
    fn test_several_kinds_give_buckets() {
        let temp = project();
        let kinds = [FilterKind::Entry, FilterKind::Page];
        let buckets = classify_dir(temp.path(), Path::new("src/home"), &kinds)
            .unwrap()
            .into_buckets()
            .unwrap();

        assert_eq!(buckets.labels(), vec!["IsEntrySource", "IsPageTemplate"]);
        assert_eq!(buckets.get("IsEntrySource").unwrap(), ["main.js"]);
        assert_eq!(buckets.get("IsPageTemplate").unwrap(), ["index.html"]);
    }

    #[test]
    fn test_repeated_kind_is_invalid_predicate() {
        let temp = project();
        let kinds = [FilterKind::Entry, FilterKind::Entry];
        let err = classify_dir(temp.path(), Path::new("src/home"), &kinds).unwrap_err();
        assert!(matches!(err, PageMapError::InvalidPredicate { .. }));
    }

    #[test]
    fn test_absolute_dir_ignores_project_dir() {
        let temp = project();
        let dir = temp.path().join("src/home");
        let result = classify_dir(Path::new("/nonexistent"), &dir, &[FilterKind::Entry]).unwrap();
        assert_eq!(result.into_flat().unwrap(), vec!["main.js"]);
    }
}

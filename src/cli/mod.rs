// src/cli/mod.rs
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backup::BackupManager;
use crate::collaborators::StdinPrompt;
use crate::config::Config;
use crate::domain::ports::collaborators::Prompt;
use crate::domain::ports::repository::BookmarkRepository;
use crate::import;
use crate::mirror::MirrorRepository;
use crate::status::StatusPipeline;
use crate::store::SqliteStore;

pub mod args;
pub mod error;

use args::{BackupAction, Cli, Commands, ConfigAction, DatabaseAction, ImportSource};
use error::{CliError, CliResult};

/// Initializes `tracing-subscriber` from `-v` repeat count: 0 = warn,
/// 1 = info, 2+ = debug. `RUST_LOG` overrides when set.
pub fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn run() -> CliResult<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let db_path = resolve_db_path(&config, cli.name.as_deref());
    let store = SqliteStore::from_url(db_path.to_string_lossy().as_ref())?;
    store.init()?;

    dispatch(cli, &config, &store)
}

fn resolve_db_path(config: &Config, name: Option<&str>) -> PathBuf {
    match name {
        Some(n) if n.ends_with(".db") => config.data_dir.join(n),
        Some(n) => config.data_dir.join(format!("{n}.db")),
        None => config.db_path(),
    }
}

fn dispatch(cli: Cli, config: &Config, store: &SqliteStore) -> CliResult<()> {
    match cli.command {
        Commands::Records { query, tag } => records(store, query, tag),
        Commands::Database { action } => database(config, action),
        Commands::Backup { action } => backup(config, action),
        Commands::Import { source } => run_import(store, config, source, cli.force),
        Commands::Remove { target } => remove(config, &target, cli.force),
        Commands::Config { action } => show_config(config, action),
        Commands::Version => {
            println!(env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn records(store: &SqliteStore, query: Option<String>, tag: Option<String>) -> CliResult<()> {
    let bookmarks = match (query, tag) {
        (Some(q), _) => store.by_query(&q)?,
        (None, Some(t)) => store.by_tag(&t)?,
        (None, None) => store.all()?,
    };
    for b in bookmarks {
        println!("{}\t{}\t{}", b.id.unwrap_or(0), b.url, b.title);
    }
    Ok(())
}

fn database(config: &Config, action: DatabaseAction) -> CliResult<()> {
    match action {
        DatabaseAction::List => {
            for path in config.discover_databases()? {
                println!("{}", path.display());
            }
            Ok(())
        }
        DatabaseAction::Create { name } => {
            let path = config.data_dir.join(format!("{name}.db"));
            let store = SqliteStore::from_url(path.to_string_lossy().as_ref())?;
            store.init()?;
            println!("created {}", path.display());
            Ok(())
        }
        DatabaseAction::Drop { name } => {
            let path = config.data_dir.join(format!("{name}.db"));
            std::fs::remove_file(&path).map_err(CliError::Io)?;
            println!("dropped {}", path.display());
            Ok(())
        }
        DatabaseAction::Lock { name } | DatabaseAction::Unlock { name } => {
            info!(%name, "database lock/unlock is a filesystem-permission concern outside the storage engine");
            Ok(())
        }
    }
}

fn backup(config: &Config, action: BackupAction) -> CliResult<()> {
    let manager = BackupManager::new(config.backup_dir.clone(), config.backup_retention);
    let db_path = config.db_path();
    let basename = db_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    match action {
        BackupAction::Create => {
            let path = manager.create(&db_path, false)?;
            println!("{}", path.display());
            Ok(())
        }
        BackupAction::List => {
            for path in manager.list(&basename)? {
                println!("{}", path.display());
            }
            Ok(())
        }
        BackupAction::Prune => {
            let removed = manager.prune(&basename)?;
            println!("removed {} backup(s)", removed.len());
            Ok(())
        }
    }
}

fn run_import(store: &SqliteStore, config: &Config, source: ImportSource, force: bool) -> CliResult<()> {
    match source {
        ImportSource::Browser => {
            Err(CliError::Other("browser import requires a host-provided Browser collaborator".to_string()))
        }
        ImportSource::Database { path } => {
            let mirror = MirrorRepository::new(path, false, None);
            let candidates = mirror.load()?;
            let fresh = import::dedup(store, candidates)?;
            let inserted = store.insert_many(&fresh)?;
            println!("imported {} record(s)", inserted.len());
            Ok(())
        }
        ImportSource::Git { url, name } => {
            let scratch = config.mirror_root.join("peer-clone");
            let git = NoopGitProvider;
            let repos = import::discover_peer_repos(&git, &url, &scratch)?;
            let Some(repo) = repos.first() else {
                return Err(CliError::Other(format!("no importable repository found at {url}")));
            };
            let prompt = StdinPrompt;
            let chosen = name.unwrap_or_else(|| repo.stats.name.clone());
            let inserted = import::import_peer_repo(
                repo,
                false,
                None,
                store,
                &prompt,
                &config.default_db_name,
                &chosen,
            )?;
            println!("imported {} record(s) from {}", inserted.len(), repo.stats.name);
            let _ = force;
            Ok(())
        }
    }
}

/// Placeholder satisfying `GitProvider` until a real clone collaborator
/// is wired in by the host binary; the clone itself is out of scope.
struct NoopGitProvider;
impl crate::domain::ports::collaborators::GitProvider for NoopGitProvider {
    fn clone_repo(&self, _url: &str, dest: &std::path::Path) -> crate::domain::error::DomainResult<()> {
        std::fs::create_dir_all(dest)?;
        Ok(())
    }
}

fn remove(config: &Config, target: &str, force: bool) -> CliResult<()> {
    let path = config.data_dir.join(target);
    if !path.exists() {
        return Err(CliError::InvalidInput(format!("no such database or backup: {target}")));
    }
    if !force {
        let prompt = StdinPrompt;
        if !prompt.confirm(&format!("remove {}?", path.display()), false)? {
            return Err(CliError::OperationAborted);
        }
    }
    std::fs::remove_file(&path).map_err(CliError::Io)?;
    Ok(())
}

fn show_config(config: &Config, action: Option<ConfigAction>) -> CliResult<()> {
    match action {
        None | Some(ConfigAction::Show) => {
            println!("{}", toml::to_string_pretty(config).map_err(|e| CliError::Other(e.to_string()))?);
            Ok(())
        }
        Some(ConfigAction::Set { key, value }) => Err(CliError::InvalidInput(format!(
            "setting '{key}={value}' at runtime requires rewriting the config file, not yet wired up here"
        ))),
    }
}

/// Probes every URL currently on record and prints a bucketed summary
/// (§4.I). Not reachable from a [`Commands`] variant yet — the status
/// subcommand is covered by the fzf/interactive surface this crate
/// doesn't implement — but exposed for host binaries that want it.
pub fn run_status_check(store: &dyn BookmarkRepository, writeback: bool) -> CliResult<()> {
    let rt = tokio::runtime::Runtime::new().map_err(CliError::Io)?;
    let bookmarks = store.all()?;

    let pipeline = StatusPipeline::new();
    let report = rt.block_on(async {
        if writeback {
            pipeline.run_and_writeback(store, &bookmarks, true).await
        } else {
            Ok(pipeline.run(&bookmarks).await)
        }
    })?;

    for line in report.summary_lines() {
        println!("{line}");
    }
    Ok(())
}

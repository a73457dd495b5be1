//! `holocron`: import Star Wars API snapshots and query the archive.
//!
//! Reads `holocron.toml` (or the path given with `--config`), applies
//! `HOLOCRON_*` environment overrides, opens the configured archive, and
//! runs one subcommand against it.
//!
//! # Usage
//!
//! ```
//! holocron import snapshot.json
//! holocron films
//! holocron summary https://swapi.dev/api/films/1/
//! holocron related https://swapi.dev/api/films/1/ starships
//! holocron --memory import snapshot.json --strict
//! ```
//!
//! # Environment
//!
//! Nested keys use a double underscore, e.g.
//! `HOLOCRON_STORAGE__PATH=~/.local/share/holocron.db` or
//! `HOLOCRON_LOG_LEVEL=debug`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use holocron_core::{
  config::{LogLevel, StorageMode, StoreConfig},
  relationship::RelationshipKind,
  response::Snapshot,
  store::{ArchiveStore, ImportOptions},
};
use holocron_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "holocron", version, about = "Star Wars archive importer and browser")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "holocron.toml")]
  config: PathBuf,

  /// Use this database file instead of the configured storage.
  #[arg(long, value_name = "FILE", conflicts_with = "memory")]
  db: Option<PathBuf>,

  /// Use a fresh in-memory archive that is discarded on exit.
  #[arg(long)]
  memory: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Replace the archive's content with a snapshot JSON document.
  Import {
    path:   PathBuf,
    /// Reject snapshots that reference entities they do not contain.
    #[arg(long)]
    strict: bool,
  },
  /// List films by release date.
  Films,
  /// Show one film.
  Film { url: String },
  /// Count a film's related characters, planets, species, starships, and
  /// vehicles.
  Summary { url: String },
  /// List a film's related entities of one kind.
  Related {
    url:  String,
    /// characters, planets, species, starships, or vehicles.
    kind: String,
  },
  /// List the species, starships, and vehicles of a character.
  Character { url: String },
  /// Row counts for every table.
  Stats,
}

// ─── Configuration ───────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
  let settings = config::Config::builder()
    .set_default("storage.mode", "file")?
    .set_default("storage.path", "holocron.db")?
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(
      config::Environment::with_prefix("HOLOCRON")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let mut store_cfg: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise StoreConfig")?;

  if let Some(path) = &cli.db {
    store_cfg.storage = StorageMode::File { path: path.clone() };
  } else if cli.memory {
    store_cfg.storage = StorageMode::unique_in_memory();
  }

  if let StorageMode::File { path } = &mut store_cfg.storage {
    *path = expand_tilde(path);
  }

  Ok(store_cfg)
}

fn level_filter(level: LogLevel) -> LevelFilter {
  match level {
    LogLevel::Error => LevelFilter::ERROR,
    LogLevel::Warn => LevelFilter::WARN,
    LogLevel::Info => LevelFilter::INFO,
    LogLevel::Debug => LevelFilter::DEBUG,
    LogLevel::Trace => LevelFilter::TRACE,
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let store_cfg = load_config(&cli)?;

  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level_filter(store_cfg.log_level).into())
        .from_env_lossy(),
    )
    .init();

  let store = SqliteStore::new();
  store
    .configure(&store_cfg)
    .await
    .with_context(|| format!("failed to open archive {:?}", store_cfg.storage))?;

  let outcome = run(&store, cli.command).await;
  store.shutdown().await.context("failed to shut down archive")?;
  outcome
}

async fn run<S: ArchiveStore>(store: &S, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Import { path, strict } => {
      let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
      let snapshot = Snapshot::from_json(&raw)
        .with_context(|| format!("failed to decode snapshot {}", path.display()))?;
      let report = store
        .import_snapshot_with(&snapshot, ImportOptions { strict })
        .await
        .context("import failed")?;
      print_json(&report)?;
    }
    Command::Films => {
      let films = store
        .films_ordered_by_release_date()
        .await
        .context("failed to list films")?;
      for film in films {
        let released = film
          .release_date
          .map(|d| d.to_string())
          .unwrap_or_else(|| "unreleased".into());
        println!("{released}  {:>2}  {}  {}", film.episode_id, film.title, film.url);
      }
    }
    Command::Film { url } => {
      let film = store
        .film(&url)
        .await
        .context("failed to load film")?
        .with_context(|| format!("no film at {url}"))?;
      print_json(&film)?;
    }
    Command::Summary { url } => {
      let summary = store
        .relationship_summary(&url)
        .await
        .context("failed to summarise film")?;
      print_json(&summary)?;
    }
    Command::Related { url, kind } => {
      let kind = RelationshipKind::parse(&kind)?;
      let entities = store
        .relationship_entities(&url, kind)
        .await
        .with_context(|| format!("failed to list {kind} of {url}"))?;
      for entity in entities {
        println!("{}  {}", entity.name(), entity.url());
      }
    }
    Command::Character { url } => {
      let related = store
        .character_relationships(&url)
        .await
        .context("failed to load character relationships")?;
      print_json(&related)?;
    }
    Command::Stats => {
      let counts = store.counts().await.context("failed to count rows")?;
      print_json(&counts)?;
    }
  }
  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

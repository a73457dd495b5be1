//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Where an archive keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StorageMode {
  /// A persistent database file.
  File { path: PathBuf },
  /// An ephemeral database that lives as long as a connection to it is
  /// open. Stores configured with the same `name` share one database.
  InMemory { name: String },
}

impl StorageMode {
  /// An in-memory database under a fresh, unique name.
  pub fn unique_in_memory() -> Self {
    Self::InMemory { name: format!("holocron-{}", Uuid::new_v4().simple()) }
  }
}

/// Log verbosity, mapped onto a `tracing` level filter by the binary.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
  Error,
  Warn,
  #[default]
  Info,
  Debug,
  Trace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
  pub storage:   StorageMode,
  #[serde(default)]
  pub log_level: LogLevel,
}

impl StoreConfig {
  pub fn file(path: impl Into<PathBuf>) -> Self {
    Self {
      storage:   StorageMode::File { path: path.into() },
      log_level: LogLevel::default(),
    }
  }

  pub fn named_in_memory(name: impl Into<String>) -> Self {
    Self {
      storage:   StorageMode::InMemory { name: name.into() },
      log_level: LogLevel::default(),
    }
  }

  /// An isolated in-memory configuration; every call yields a distinct
  /// database.
  pub fn in_memory() -> Self {
    Self {
      storage:   StorageMode::unique_in_memory(),
      log_level: LogLevel::default(),
    }
  }
}

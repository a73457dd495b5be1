//! Error type for `holocron-store-sqlite`.

use holocron_core::entity::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store is already configured")]
  AlreadyConfigured,

  #[error("store is not configured")]
  NotConfigured,

  #[error("store has been shut down")]
  ShutDown,

  /// The underlying connection could not be opened.
  #[error("store unavailable at {target}: {source}")]
  Unavailable {
    target: String,
    #[source]
    source: tokio_rusqlite::Error,
  },

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A strict import met a reference to an entity missing from the
  /// snapshot.
  #[error("{from} references {kind} {to}, which is not in the snapshot")]
  DanglingReference {
    from: String,
    to:   String,
    kind: EntityKind,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

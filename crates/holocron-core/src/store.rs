//! The backend-agnostic [`ArchiveStore`] trait.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  change::{ChangeBatch, ChangeStream},
  config::StoreConfig,
  entity::Film,
  relationship::{
    ArchiveCounts, CharacterRelationships, RelationshipEntity, RelationshipKind,
    RelationshipSummary,
  },
  response::Snapshot,
};

// ─── Import parameters ───────────────────────────────────────────────────────

/// How an import treats references to entities absent from the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
  /// Fail the import on the first dangling reference instead of dropping
  /// it. Nothing is written when the check fails.
  pub strict: bool,
}

impl ImportOptions {
  pub fn strict() -> Self { Self { strict: true } }
}

/// What a committed import wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
  /// The batch published to change subscribers.
  pub batch:              ChangeBatch,
  pub entity_rows:        usize,
  pub join_rows:          usize,
  /// References skipped because their target was not in the snapshot.
  pub dropped_references: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Holocron archive backend.
///
/// An archive moves through `Unconfigured → Configured → ShutDown`.
/// Configuration succeeds once; imports and queries require the configured
/// state; nothing succeeds after shutdown.
///
/// Imports replace the entire content of the archive atomically. Queries
/// never observe a partially applied import.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ArchiveStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Open storage and create the schema. Fails if already configured.
  fn configure<'a>(
    &'a self,
    config: &'a StoreConfig,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Close the change feed and release storage. Terminal.
  fn shutdown(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Subscribe to change batches published by subsequent imports.
  fn changes(&self) -> ChangeStream;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Replace the archive's content with `snapshot`, all or nothing.
  fn import_snapshot_with<'a>(
    &'a self,
    snapshot: &'a Snapshot,
    options: ImportOptions,
  ) -> impl Future<Output = Result<ImportReport, Self::Error>> + Send + 'a;

  /// [`import_snapshot_with`](Self::import_snapshot_with) using tolerant
  /// defaults.
  fn import_snapshot<'a>(
    &'a self,
    snapshot: &'a Snapshot,
  ) -> impl Future<Output = Result<ImportReport, Self::Error>> + Send + 'a {
    self.import_snapshot_with(snapshot, ImportOptions::default())
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All films, ascending by release date; undated films sort last.
  fn films_ordered_by_release_date(
    &self,
  ) -> impl Future<Output = Result<Vec<Film>, Self::Error>> + Send + '_;

  /// A single film, or `None` if the URL is unknown.
  fn film<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Option<Film>, Self::Error>> + Send + 'a;

  /// Relationship counts for a film; all zero if the URL is unknown.
  fn relationship_summary<'a>(
    &'a self,
    film_url: &'a str,
  ) -> impl Future<Output = Result<RelationshipSummary, Self::Error>> + Send + 'a;

  /// The entities related to a film through `kind`, ordered by name.
  fn relationship_entities<'a>(
    &'a self,
    film_url: &'a str,
    kind: RelationshipKind,
  ) -> impl Future<Output = Result<Vec<RelationshipEntity>, Self::Error>> + Send + 'a;

  /// Species, starships, and vehicles joined to one character.
  fn character_relationships<'a>(
    &'a self,
    person_url: &'a str,
  ) -> impl Future<Output = Result<CharacterRelationships, Self::Error>> + Send + 'a;

  /// Row counts for every table.
  fn counts(&self) -> impl Future<Output = Result<ArchiveCounts, Self::Error>> + Send + '_;
}

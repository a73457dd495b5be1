//! [`SqliteStore`], the SQLite implementation of [`ArchiveStore`].

use std::sync::Arc;

use holocron_core::{
  change::{ChangeNotifier, ChangeStream},
  config::{StorageMode, StoreConfig},
  entity::Film,
  relationship::{
    ArchiveCounts, CharacterRelationships, RelationshipEntity, RelationshipKind,
    RelationshipSummary,
  },
  response::Snapshot,
  store::{ArchiveStore, ImportOptions, ImportReport},
};
use strum::IntoEnumIterator as _;
use tokio::sync::{Mutex, RwLock};

use crate::{
  Error, Result,
  encode::{RawFilm, RawSpecies, RawStarship, RawVehicle},
  import, query,
  schema::{self, JoinTable},
};

// ─── Lifecycle ───────────────────────────────────────────────────────────────

enum Lifecycle {
  Unconfigured,
  Configured(tokio_rusqlite::Connection),
  ShutDown,
}

impl Lifecycle {
  fn connection(&self) -> Result<&tokio_rusqlite::Connection> {
    match self {
      Self::Configured(conn) => Ok(conn),
      Self::Unconfigured => Err(Error::NotConfigured),
      Self::ShutDown => Err(Error::ShutDown),
    }
  }
}

struct Inner {
  /// Operations hold a read guard for their whole duration; configure and
  /// shutdown take the write guard, so shutdown waits for in-flight work.
  state:       RwLock<Lifecycle>,
  /// Serializes imports so their change batches publish in commit order.
  import_gate: Mutex<()>,
  notifier:    ChangeNotifier,
}

/// Named in-memory databases live in the `memdb` VFS. A leading `/` makes
/// the database visible to every connection in the process that uses the
/// same name, with ordinary file locking, so readers on one handle wait out
/// a commit on another instead of failing with a table lock.
pub(crate) fn in_memory_uri(name: &str) -> String { format!("file:/{name}?vfs=memdb") }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Holocron archive backed by SQLite.
///
/// A new store starts unconfigured; [`configure`](ArchiveStore::configure)
/// opens the database and creates the schema. Clones share the connection
/// and the change feed.
#[derive(Clone)]
pub struct SqliteStore {
  inner: Arc<Inner>,
}

impl Default for SqliteStore {
  fn default() -> Self { Self::new() }
}

impl SqliteStore {
  /// An unconfigured store.
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Inner {
        state:       RwLock::new(Lifecycle::Unconfigured),
        import_gate: Mutex::new(()),
        notifier:    ChangeNotifier::new(),
      }),
    }
  }

  /// Create and configure a store in one step.
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    let store = Self::new();
    store.configure(config).await?;
    Ok(store)
  }

  /// Open an isolated in-memory store.
  pub async fn open_in_memory() -> Result<Self> { Self::open(&StoreConfig::in_memory()).await }

  async fn open_connection(storage: &StorageMode) -> Result<tokio_rusqlite::Connection> {
    let (target, opened) = match storage {
      StorageMode::File { path } => {
        (path.display().to_string(), tokio_rusqlite::Connection::open(path).await)
      }
      StorageMode::InMemory { name } => {
        let uri = in_memory_uri(name);
        let opened = tokio_rusqlite::Connection::open(&uri).await;
        (uri, opened)
      }
    };
    opened.map_err(|source| Error::Unavailable { target, source })
  }

  /// Run `f` on the connection thread while holding the lifecycle read
  /// guard.
  async fn with_conn<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let state = self.inner.state.read().await;
    let conn = state.connection()?;
    Ok(conn.call(move |conn| Ok(f(conn)?)).await?)
  }
}

// ─── ArchiveStore impl ───────────────────────────────────────────────────────

impl ArchiveStore for SqliteStore {
  type Error = Error;

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn configure(&self, config: &StoreConfig) -> Result<()> {
    let mut state = self.inner.state.write().await;
    match *state {
      Lifecycle::Configured(_) => return Err(Error::AlreadyConfigured),
      Lifecycle::ShutDown => return Err(Error::ShutDown),
      Lifecycle::Unconfigured => {}
    }

    let conn = Self::open_connection(&config.storage).await?;
    conn
      .call(|conn| {
        schema::initialize(conn)?;
        Ok(())
      })
      .await?;

    *state = Lifecycle::Configured(conn);
    tracing::info!(storage = ?config.storage, "archive configured");
    Ok(())
  }

  async fn shutdown(&self) -> Result<()> {
    let mut state = self.inner.state.write().await;
    match std::mem::replace(&mut *state, Lifecycle::ShutDown) {
      Lifecycle::Configured(conn) => {
        self.inner.notifier.close();
        conn.close().await?;
        tracing::info!("archive shut down");
        Ok(())
      }
      Lifecycle::Unconfigured => {
        *state = Lifecycle::Unconfigured;
        Err(Error::NotConfigured)
      }
      Lifecycle::ShutDown => Err(Error::ShutDown),
    }
  }

  fn changes(&self) -> ChangeStream { self.inner.notifier.subscribe() }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn import_snapshot_with(
    &self,
    snapshot: &Snapshot,
    options: ImportOptions,
  ) -> Result<ImportReport> {
    let _gate = self.inner.import_gate.lock().await;
    let state = self.inner.state.read().await;
    let conn = state.connection()?;

    let plan = import::plan(snapshot, options)?;
    let batch = plan.batch.clone();
    let dropped = plan.dropped;

    let applied = conn
      .call(move |conn| Ok(import::apply(conn, &plan)?))
      .await?;

    tracing::debug!(
      deleted = applied.deleted,
      entity_rows = applied.entity_rows,
      join_rows = applied.join_rows,
      dropped_references = dropped,
      "import applied"
    );

    // Only reached after commit; a rolled-back import returned above.
    self.inner.notifier.publish(batch.clone());
    tracing::info!(entities = ?batch.entities, "snapshot imported");

    Ok(ImportReport {
      batch,
      entity_rows: applied.entity_rows,
      join_rows: applied.join_rows,
      dropped_references: dropped,
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn films_ordered_by_release_date(&self) -> Result<Vec<Film>> {
    let raws = self.with_conn(|conn| query::films_by_release_date(conn)).await?;
    raws.into_iter().map(RawFilm::into_film).collect()
  }

  async fn film(&self, url: &str) -> Result<Option<Film>> {
    let url = url.to_owned();
    let raw = self.with_conn(move |conn| query::film(conn, &url)).await?;
    raw.map(RawFilm::into_film).transpose()
  }

  async fn relationship_summary(&self, film_url: &str) -> Result<RelationshipSummary> {
    let url = film_url.to_owned();
    let counts = self
      .with_conn(move |conn| query::relationship_counts(conn, &url))
      .await?;

    let mut summary = RelationshipSummary::default();
    for (kind, count) in RelationshipKind::iter().zip(counts) {
      let count = usize::try_from(count).unwrap_or_default();
      match kind {
        RelationshipKind::Characters => summary.character_count = count,
        RelationshipKind::Planets => summary.planet_count = count,
        RelationshipKind::Species => summary.species_count = count,
        RelationshipKind::Starships => summary.starship_count = count,
        RelationshipKind::Vehicles => summary.vehicle_count = count,
      }
    }
    Ok(summary)
  }

  async fn relationship_entities(
    &self,
    film_url: &str,
    kind: RelationshipKind,
  ) -> Result<Vec<RelationshipEntity>> {
    let url = film_url.to_owned();
    let join = JoinTable::for_film(kind);

    match kind {
      RelationshipKind::Characters => self
        .with_conn(move |conn| query::related_people(conn, join, &url))
        .await?
        .into_iter()
        .map(|raw| raw.into_person().map(RelationshipEntity::Character))
        .collect(),
      RelationshipKind::Planets => self
        .with_conn(move |conn| query::related_planets(conn, join, &url))
        .await?
        .into_iter()
        .map(|raw| raw.into_planet().map(RelationshipEntity::Planet))
        .collect(),
      RelationshipKind::Species => self
        .with_conn(move |conn| query::related_species(conn, join, &url))
        .await?
        .into_iter()
        .map(|raw| raw.into_species().map(RelationshipEntity::Species))
        .collect(),
      RelationshipKind::Starships => self
        .with_conn(move |conn| query::related_starships(conn, join, &url))
        .await?
        .into_iter()
        .map(|raw| raw.into_starship().map(RelationshipEntity::Starship))
        .collect(),
      RelationshipKind::Vehicles => self
        .with_conn(move |conn| query::related_vehicles(conn, join, &url))
        .await?
        .into_iter()
        .map(|raw| raw.into_vehicle().map(RelationshipEntity::Vehicle))
        .collect(),
    }
  }

  async fn character_relationships(&self, person_url: &str) -> Result<CharacterRelationships> {
    let url = person_url.to_owned();

    // One read transaction so the three lists come from the same state,
    // even when another handle shares this database.
    let (species, starships, vehicles): (Vec<RawSpecies>, Vec<RawStarship>, Vec<RawVehicle>) =
      self
        .with_conn(move |conn| {
          let tx = conn.transaction()?;
          let species = query::related_species(&tx, JoinTable::PersonSpecies, &url)?;
          let starships = query::related_starships(&tx, JoinTable::PersonStarships, &url)?;
          let vehicles = query::related_vehicles(&tx, JoinTable::PersonVehicles, &url)?;
          tx.commit()?;
          Ok((species, starships, vehicles))
        })
        .await?;

    Ok(CharacterRelationships {
      species:   species.into_iter().map(RawSpecies::into_species).collect::<Result<_>>()?,
      starships: starships
        .into_iter()
        .map(RawStarship::into_starship)
        .collect::<Result<_>>()?,
      vehicles:  vehicles.into_iter().map(RawVehicle::into_vehicle).collect::<Result<_>>()?,
    })
  }

  async fn counts(&self) -> Result<ArchiveCounts> {
    let rows = self
      .with_conn(|conn| {
        let tx = conn.transaction()?;
        let counts = query::table_counts(&tx)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    let mut counts = ArchiveCounts::default();
    for (table, count) in rows {
      let count = usize::try_from(count).unwrap_or_default();
      let slot = match table {
        "films" => &mut counts.films,
        "planets" => &mut counts.planets,
        "people" => &mut counts.people,
        "species" => &mut counts.species,
        "starships" => &mut counts.starships,
        "vehicles" => &mut counts.vehicles,
        "film_characters" => &mut counts.film_characters,
        "film_planets" => &mut counts.film_planets,
        "film_species" => &mut counts.film_species,
        "film_starships" => &mut counts.film_starships,
        "film_vehicles" => &mut counts.film_vehicles,
        "person_species" => &mut counts.person_species,
        "person_starships" => &mut counts.person_starships,
        "person_vehicles" => &mut counts.person_vehicles,
        _ => continue,
      };
      *slot = count;
    }
    Ok(counts)
  }
}


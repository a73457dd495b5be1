//! Read-side SQL. Each function runs synchronously on the connection thread
//! and returns raw rows; decoding into records happens back on the caller's
//! task.

use holocron_core::relationship::RelationshipKind;
use rusqlite::{Connection, OptionalExtension as _};
use strum::IntoEnumIterator as _;

use crate::{
  encode::{RawFilm, RawPerson, RawPlanet, RawSpecies, RawStarship, RawVehicle},
  schema::{ENTITY_TABLES, JoinTable},
};

/// Undated films sort after every dated one.
pub fn films_by_release_date(conn: &Connection) -> rusqlite::Result<Vec<RawFilm>> {
  let mut stmt = conn.prepare(
    "SELECT f.* FROM films f
     ORDER BY f.release_date IS NULL, f.release_date, f.episode_id, f.url",
  )?;
  stmt
    .query_map([], RawFilm::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

pub fn film(conn: &Connection, url: &str) -> rusqlite::Result<Option<RawFilm>> {
  conn
    .query_row("SELECT f.* FROM films f WHERE f.url = ?1", [url], RawFilm::from_row)
    .optional()
}

/// Counts per film relationship, in [`RelationshipKind`] order.
pub fn relationship_counts(conn: &Connection, film_url: &str) -> rusqlite::Result<Vec<i64>> {
  let selects: Vec<String> = RelationshipKind::iter()
    .map(|kind| {
      let join = JoinTable::for_film(kind);
      let (left, _) = join.columns();
      format!("(SELECT COUNT(*) FROM {} WHERE {left} = ?1)", join.name())
    })
    .collect();
  let sql = format!("SELECT {}", selects.join(", "));
  conn.query_row(&sql, [film_url], |row| {
    (0..selects.len()).map(|i| row.get::<_, i64>(i)).collect()
  })
}

/// `SELECT e.* FROM <target> e JOIN <join> j ON ... WHERE j.<left> = ?1`.
fn related_sql(join: JoinTable, target_table: &str) -> String {
  let (left, right) = join.columns();
  format!(
    "SELECT e.* FROM {join_table} j
     JOIN {target_table} e ON e.url = j.{right}
     WHERE j.{left} = ?1
     ORDER BY e.name, e.url",
    join_table = join.name(),
  )
}

macro_rules! related_fn {
  ($name:ident, $raw:ty, $table:literal) => {
    pub fn $name(conn: &Connection, join: JoinTable, owner: &str) -> rusqlite::Result<Vec<$raw>> {
      let mut stmt = conn.prepare(&related_sql(join, $table))?;
      stmt
        .query_map([owner], <$raw>::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
    }
  };
}

related_fn!(related_people, RawPerson, "people");
related_fn!(related_planets, RawPlanet, "planets");
related_fn!(related_species, RawSpecies, "species");
related_fn!(related_starships, RawStarship, "starships");
related_fn!(related_vehicles, RawVehicle, "vehicles");

/// Entity table counts in creation order, then join table counts in
/// declaration order.
pub fn table_counts(conn: &Connection) -> rusqlite::Result<Vec<(&'static str, i64)>> {
  let tables = ENTITY_TABLES
    .iter()
    .map(|t| t.name)
    .chain(JoinTable::iter().map(JoinTable::name));
  let mut counts = Vec::new();
  for table in tables {
    let count: i64 =
      conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
    counts.push((table, count));
  }
  Ok(counts)
}

//! Snapshot import: a pure planning phase followed by one write transaction.
//!
//! Planning normalizes every response record, collapses duplicate URLs
//! (last record wins), resolves relationship references against the
//! snapshot's own URLs, and deduplicates join pairs. Strict mode rejects
//! the snapshot here, before any row is touched. Applying the plan clears
//! every table and re-inserts everything inside a single transaction.

use std::collections::{BTreeMap, HashMap, HashSet};

use holocron_core::{
  change::ChangeBatch,
  entity::{Entity, EntityKind, Film, Person, Planet, Species, Starship, Vehicle},
  response::{
    FilmResponse, PersonResponse, PlanetResponse, Snapshot, SpeciesResponse, StarshipResponse,
    VehicleResponse,
  },
  store::ImportOptions,
};
use rusqlite::{Connection, TransactionBehavior};
use strum::IntoEnumIterator as _;

use crate::{
  Error, Result,
  encode::{
    insert_film, insert_person, insert_planet, insert_species, insert_starship,
    insert_vehicle,
  },
  schema::{
    ENTITY_TABLES, FILMS, JoinTable, PEOPLE, PLANETS, SPECIES, STARSHIPS, VEHICLES,
  },
};

// ─── Plan ────────────────────────────────────────────────────────────────────

/// Deduplicated `(left, right)` pairs for one join table, in first-seen
/// order.
#[derive(Debug, Default)]
pub struct JoinRows {
  seen:  HashSet<(String, String)>,
  pairs: Vec<(String, String)>,
}

impl JoinRows {
  fn insert(&mut self, left: &str, right: &str) {
    let pair = (left.to_owned(), right.to_owned());
    if self.seen.insert(pair.clone()) {
      self.pairs.push(pair);
    }
  }

  fn pairs(&self) -> &[(String, String)] { &self.pairs }
}

/// Everything one import will write.
#[derive(Debug, Default)]
pub struct ImportPlan {
  pub films:     Vec<Film>,
  pub planets:   Vec<Planet>,
  pub species:   Vec<Species>,
  pub people:    Vec<Person>,
  pub starships: Vec<Starship>,
  pub vehicles:  Vec<Vehicle>,
  pub joins:     BTreeMap<JoinTable, JoinRows>,
  pub dropped:   usize,
  pub batch:     ChangeBatch,
}

impl ImportPlan {
  pub fn join_pairs(&self, table: JoinTable) -> &[(String, String)] {
    self.joins.get(&table).map(JoinRows::pairs).unwrap_or_default()
  }
}

/// Response records keyed by their own URL.
trait Located {
  fn location(&self) -> &str;
}

macro_rules! located {
  ($($ty:ty),* $(,)?) => {
    $(impl Located for $ty {
      fn location(&self) -> &str { &self.url }
    })*
  };
}

located!(
  FilmResponse,
  PersonResponse,
  PlanetResponse,
  SpeciesResponse,
  StarshipResponse,
  VehicleResponse,
);

/// Keep one record per URL; a later duplicate replaces the earlier one in
/// place, relationship lists included.
fn latest_by_url<R: Located>(records: &[R]) -> Vec<&R> {
  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut out: Vec<&R> = Vec::new();
  for record in records {
    match index.get(record.location()).copied() {
      Some(i) => out[i] = record,
      None => {
        index.insert(record.location(), out.len());
        out.push(record);
      }
    }
  }
  out
}

fn url_set<E: Entity>(records: &[E]) -> HashSet<String> {
  records.iter().map(|r| r.url().to_owned()).collect()
}

/// Resolves references against the URLs present in the snapshot.
struct Resolver {
  known:   HashMap<EntityKind, HashSet<String>>,
  strict:  bool,
  dropped: usize,
  joins:   BTreeMap<JoinTable, JoinRows>,
}

impl Resolver {
  fn resolves(&self, kind: EntityKind, url: &str) -> bool {
    self.known.get(&kind).is_some_and(|urls| urls.contains(url))
  }

  /// Record a dangling reference: an error in strict mode, a count
  /// otherwise.
  fn dangling(&mut self, from: &str, to: &str, kind: EntityKind) -> Result<()> {
    if self.strict {
      return Err(Error::DanglingReference {
        from: from.to_owned(),
        to: to.to_owned(),
        kind,
      });
    }
    self.dropped += 1;
    Ok(())
  }

  /// Add `(left, right)` to `table` if both ends resolve. `owner` is the
  /// record whose list carried the reference.
  fn link(&mut self, table: JoinTable, left: &str, right: &str, owner: &str) -> Result<()> {
    let (left_kind, right_kind) = table.endpoints();
    if !self.resolves(left_kind, left) {
      return self.dangling(owner, left, left_kind);
    }
    if !self.resolves(right_kind, right) {
      return self.dangling(owner, right, right_kind);
    }
    self.joins.entry(table).or_default().insert(left, right);
    Ok(())
  }

  /// Keep a homeworld only if the planet is in the snapshot.
  fn homeworld(&mut self, owner: &str, url: Option<String>) -> Result<Option<String>> {
    match url {
      Some(url) if self.resolves(EntityKind::Planet, &url) => Ok(Some(url)),
      Some(url) => {
        self.dangling(owner, &url, EntityKind::Planet)?;
        Ok(None)
      }
      None => Ok(None),
    }
  }
}

/// Build the write plan for `snapshot`.
pub fn plan(snapshot: &Snapshot, options: ImportOptions) -> Result<ImportPlan> {
  // Links come from the surviving records only, so a discarded duplicate
  // contributes nothing.
  let film_records = latest_by_url(&snapshot.films);
  let planet_records = latest_by_url(&snapshot.planets);
  let species_records = latest_by_url(&snapshot.species);
  let person_records = latest_by_url(&snapshot.people);
  let starship_records = latest_by_url(&snapshot.starships);
  let vehicle_records = latest_by_url(&snapshot.vehicles);

  let films: Vec<Film> = film_records.iter().map(|r| r.to_record()).collect();
  let planets: Vec<Planet> = planet_records.iter().map(|r| r.to_record()).collect();
  let mut species: Vec<Species> = species_records.iter().map(|r| r.to_record()).collect();
  let mut people: Vec<Person> = person_records.iter().map(|r| r.to_record()).collect();
  let starships: Vec<Starship> = starship_records.iter().map(|r| r.to_record()).collect();
  let vehicles: Vec<Vehicle> = vehicle_records.iter().map(|r| r.to_record()).collect();

  let mut resolver = Resolver {
    known:   HashMap::from([
      (EntityKind::Film, url_set(&films)),
      (EntityKind::Planet, url_set(&planets)),
      (EntityKind::Person, url_set(&people)),
      (EntityKind::Species, url_set(&species)),
      (EntityKind::Starship, url_set(&starships)),
      (EntityKind::Vehicle, url_set(&vehicles)),
    ]),
    strict:  options.strict,
    dropped: 0,
    joins:   BTreeMap::new(),
  };

  for record in &mut species {
    record.homeworld_url = resolver.homeworld(&record.url, record.homeworld_url.take())?;
  }
  for record in &mut people {
    record.homeworld_url = resolver.homeworld(&record.url, record.homeworld_url.take())?;
  }

  // Film-side lists.
  for film in &film_records {
    let f = film.url.as_str();
    for url in &film.characters {
      resolver.link(JoinTable::FilmCharacters, f, url, f)?;
    }
    for url in &film.planets {
      resolver.link(JoinTable::FilmPlanets, f, url, f)?;
    }
    for url in &film.species {
      resolver.link(JoinTable::FilmSpecies, f, url, f)?;
    }
    for url in &film.starships {
      resolver.link(JoinTable::FilmStarships, f, url, f)?;
    }
    for url in &film.vehicles {
      resolver.link(JoinTable::FilmVehicles, f, url, f)?;
    }
  }

  // Person-side lists, plus the person's own film back-references.
  for person in &person_records {
    let p = person.url.as_str();
    for url in &person.species {
      resolver.link(JoinTable::PersonSpecies, p, url, p)?;
    }
    for url in &person.starships {
      resolver.link(JoinTable::PersonStarships, p, url, p)?;
    }
    for url in &person.vehicles {
      resolver.link(JoinTable::PersonVehicles, p, url, p)?;
    }
    for url in &person.films {
      resolver.link(JoinTable::FilmCharacters, url, p, p)?;
    }
  }

  // Back-references carried by the remaining collections.
  for planet in &planet_records {
    let l = planet.url.as_str();
    for url in &planet.films {
      resolver.link(JoinTable::FilmPlanets, url, l, l)?;
    }
  }
  for record in &species_records {
    let s = record.url.as_str();
    for url in &record.films {
      resolver.link(JoinTable::FilmSpecies, url, s, s)?;
    }
    for url in &record.people {
      resolver.link(JoinTable::PersonSpecies, url, s, s)?;
    }
  }
  for ship in &starship_records {
    let s = ship.url.as_str();
    for url in &ship.films {
      resolver.link(JoinTable::FilmStarships, url, s, s)?;
    }
    for url in &ship.pilots {
      resolver.link(JoinTable::PersonStarships, url, s, s)?;
    }
  }
  for vehicle in &vehicle_records {
    let v = vehicle.url.as_str();
    for url in &vehicle.films {
      resolver.link(JoinTable::FilmVehicles, url, v, v)?;
    }
    for url in &vehicle.pilots {
      resolver.link(JoinTable::PersonVehicles, url, v, v)?;
    }
  }

  Ok(ImportPlan {
    films,
    planets,
    species,
    people,
    starships,
    vehicles,
    joins: resolver.joins,
    dropped: resolver.dropped,
    batch: ChangeBatch::new(snapshot.changed_kinds()),
  })
}

// ─── Apply ───────────────────────────────────────────────────────────────────

/// Rows written by [`apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
  pub deleted:     usize,
  pub entity_rows: usize,
  pub join_rows:   usize,
}

/// Replace the whole store content with `plan` in one transaction. Any
/// failure rolls the transaction back when it is dropped.
pub fn apply(conn: &mut Connection, plan: &ImportPlan) -> rusqlite::Result<Applied> {
  // Take the write lock up front so a handle sharing this database cannot
  // hold a read lock we would later need to upgrade past.
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let mut applied = Applied::default();

  // Children before parents: join tables, then entities in reverse
  // creation order so nothing is left pointing at a deleted planet.
  for join in JoinTable::iter() {
    applied.deleted += tx.execute(&format!("DELETE FROM {}", join.name()), [])?;
  }
  for table in ENTITY_TABLES.iter().rev() {
    applied.deleted += tx.execute(&format!("DELETE FROM {}", table.name), [])?;
  }

  {
    let mut stmt = tx.prepare(&FILMS.insert_sql())?;
    for film in &plan.films {
      applied.entity_rows += insert_film(&mut stmt, film)?;
    }
    let mut stmt = tx.prepare(&PLANETS.insert_sql())?;
    for planet in &plan.planets {
      applied.entity_rows += insert_planet(&mut stmt, planet)?;
    }
    let mut stmt = tx.prepare(&SPECIES.insert_sql())?;
    for species in &plan.species {
      applied.entity_rows += insert_species(&mut stmt, species)?;
    }
    let mut stmt = tx.prepare(&PEOPLE.insert_sql())?;
    for person in &plan.people {
      applied.entity_rows += insert_person(&mut stmt, person)?;
    }
    let mut stmt = tx.prepare(&STARSHIPS.insert_sql())?;
    for ship in &plan.starships {
      applied.entity_rows += insert_starship(&mut stmt, ship)?;
    }
    let mut stmt = tx.prepare(&VEHICLES.insert_sql())?;
    for vehicle in &plan.vehicles {
      applied.entity_rows += insert_vehicle(&mut stmt, vehicle)?;
    }

    for join in JoinTable::iter() {
      let pairs = plan.join_pairs(join);
      if pairs.is_empty() {
        continue;
      }
      let mut stmt = tx.prepare(&join.insert_sql())?;
      for (left, right) in pairs {
        applied.join_rows += stmt.execute([left, right])?;
      }
    }
  }

  tx.commit()?;
  Ok(applied)
}

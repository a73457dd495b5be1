//! Integration tests for `SqliteStore` against in-memory and file databases.

use chrono::NaiveDate;
use futures::StreamExt as _;
use holocron_core::{
  change::ChangeBatch,
  config::{StorageMode, StoreConfig},
  entity::EntityKind,
  measure::{BirthYear, Gender},
  relationship::{RelationshipEntity, RelationshipKind, RelationshipSummary},
  response::{
    FilmResponse, PersonResponse, PlanetResponse, Snapshot, SpeciesResponse, StarshipResponse,
    VehicleResponse,
  },
  store::{ArchiveStore, ImportOptions},
};

use crate::{Error, SqliteStore, store::in_memory_uri};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn unique_name() -> String {
  match StorageMode::unique_in_memory() {
    StorageMode::InMemory { name } => name,
    StorageMode::File { .. } => unreachable!("unique_in_memory is always in-memory"),
  }
}

fn urls(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn film(url: &str, title: &str, episode_id: i64, released: Option<(i32, u32, u32)>) -> FilmResponse {
  FilmResponse {
    url: url.into(),
    title: title.into(),
    episode_id,
    opening_crawl: "It is a period of civil war.".into(),
    director: "George Lucas".into(),
    producer: "Gary Kurtz, Rick McCallum".into(),
    release_date: released.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
    ..Default::default()
  }
}

fn person(url: &str, name: &str) -> PersonResponse {
  PersonResponse {
    url: url.into(),
    name: name.into(),
    height: "172".into(),
    mass: "77".into(),
    hair_color: "blond".into(),
    skin_color: "fair".into(),
    eye_color: "blue".into(),
    birth_year: "19BBY".into(),
    gender: "male".into(),
    ..Default::default()
  }
}

fn planet(url: &str, name: &str) -> PlanetResponse {
  PlanetResponse {
    url: url.into(),
    name: name.into(),
    rotation_period: "23".into(),
    orbital_period: "304".into(),
    diameter: "10465".into(),
    climate: "arid".into(),
    gravity: "1 standard".into(),
    terrain: "desert".into(),
    surface_water: "1".into(),
    population: "200000".into(),
    ..Default::default()
  }
}

fn species(url: &str, name: &str) -> SpeciesResponse {
  SpeciesResponse {
    url: url.into(),
    name: name.into(),
    classification: "mammal".into(),
    designation: "sentient".into(),
    average_height: "180".into(),
    average_lifespan: "120".into(),
    skin_colors: "caucasian, black, asian, hispanic".into(),
    hair_colors: "blonde, brown, black, red".into(),
    eye_colors: "brown, blue, green, hazel, grey, amber".into(),
    language: "Galactic Basic".into(),
    ..Default::default()
  }
}

fn starship(url: &str, name: &str) -> StarshipResponse {
  StarshipResponse {
    url: url.into(),
    name: name.into(),
    model: "YT-1300 light freighter".into(),
    manufacturer: "Corellian Engineering Corporation".into(),
    cost_in_credits: "100000".into(),
    length: "34.37".into(),
    max_atmosphering_speed: "1050".into(),
    crew: "4".into(),
    passengers: "6".into(),
    cargo_capacity: "100000".into(),
    consumables: "2 months".into(),
    hyperdrive_rating: "0.5".into(),
    mglt: "75".into(),
    starship_class: "Light freighter".into(),
    ..Default::default()
  }
}

fn vehicle(url: &str, name: &str) -> VehicleResponse {
  VehicleResponse {
    url: url.into(),
    name: name.into(),
    model: "T-47 airspeeder".into(),
    manufacturer: "Incom corporation".into(),
    cost_in_credits: "unknown".into(),
    length: "5.3".into(),
    max_atmosphering_speed: "650".into(),
    crew: "2".into(),
    passengers: "0".into(),
    cargo_capacity: "10".into(),
    consumables: "none".into(),
    vehicle_class: "airspeeder".into(),
    ..Default::default()
  }
}

/// One film, one character (listed twice), one planet.
fn minimal_snapshot() -> Snapshot {
  Snapshot {
    films: vec![FilmResponse {
      characters: urls(&["P1", "P1"]),
      planets: urls(&["L1"]),
      ..film("F1", "A New Hope", 4, Some((1977, 5, 25)))
    }],
    people: vec![person("P1", "Luke Skywalker")],
    planets: vec![planet("L1", "Tatooine")],
    ..Default::default()
  }
}

/// Every collection populated, relationships consistent in both directions.
fn full_snapshot() -> Snapshot {
  Snapshot {
    films: vec![
      FilmResponse {
        characters: urls(&["P1", "P2"]),
        planets: urls(&["L1", "L2"]),
        species: urls(&["S1"]),
        starships: urls(&["X1"]),
        vehicles: urls(&["V1"]),
        ..film("F1", "A New Hope", 4, Some((1977, 5, 25)))
      },
      FilmResponse {
        characters: urls(&["P1"]),
        planets: urls(&["L2"]),
        ..film("F2", "The Empire Strikes Back", 5, Some((1980, 5, 17)))
      },
    ],
    people: vec![
      PersonResponse {
        homeworld: Some("L1".into()),
        films: urls(&["F1", "F2"]),
        species: urls(&["S1"]),
        starships: urls(&["X1"]),
        vehicles: urls(&["V1"]),
        ..person("P1", "Luke Skywalker")
      },
      PersonResponse {
        homeworld: Some("L2".into()),
        films: urls(&["F1"]),
        ..person("P2", "Leia Organa")
      },
    ],
    planets: vec![planet("L1", "Tatooine"), planet("L2", "Alderaan")],
    species: vec![SpeciesResponse {
      homeworld: Some("L2".into()),
      people: urls(&["P1"]),
      films: urls(&["F1"]),
      ..species("S1", "Human")
    }],
    starships: vec![StarshipResponse {
      pilots: urls(&["P1"]),
      films: urls(&["F1"]),
      ..starship("X1", "Millennium Falcon")
    }],
    vehicles: vec![VehicleResponse {
      pilots: urls(&["P1"]),
      films: urls(&["F1"]),
      ..vehicle("V1", "Snowspeeder")
    }],
  }
}

fn entity_urls(entities: &[RelationshipEntity]) -> Vec<&str> {
  entities.iter().map(RelationshipEntity::url).collect()
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn operations_before_configure_fail() {
  let s = SqliteStore::new();

  let err = s.import_snapshot(&minimal_snapshot()).await.unwrap_err();
  assert!(matches!(err, Error::NotConfigured));

  let err = s.films_ordered_by_release_date().await.unwrap_err();
  assert!(matches!(err, Error::NotConfigured));

  let err = s.shutdown().await.unwrap_err();
  assert!(matches!(err, Error::NotConfigured));

  // A refused shutdown leaves the store configurable.
  s.configure(&StoreConfig::in_memory()).await.unwrap();
  assert!(s.films_ordered_by_release_date().await.unwrap().is_empty());
}

#[tokio::test]
async fn second_configure_is_rejected_and_first_stays_live() {
  let s = store().await;
  s.import_snapshot(&minimal_snapshot()).await.unwrap();

  let err = s.configure(&StoreConfig::in_memory()).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyConfigured));

  let films = s.films_ordered_by_release_date().await.unwrap();
  assert_eq!(films.len(), 1);
  assert_eq!(films[0].url, "F1");
}

#[tokio::test]
async fn shutdown_ends_streams_and_refuses_further_work() {
  let s = store().await;
  let mut changes = s.changes();

  s.shutdown().await.unwrap();
  assert_eq!(changes.next().await, None);

  let err = s.import_snapshot(&minimal_snapshot()).await.unwrap_err();
  assert!(matches!(err, Error::ShutDown));
  let err = s.relationship_summary("F1").await.unwrap_err();
  assert!(matches!(err, Error::ShutDown));
  let err = s.configure(&StoreConfig::in_memory()).await.unwrap_err();
  assert!(matches!(err, Error::ShutDown));
  let err = s.shutdown().await.unwrap_err();
  assert!(matches!(err, Error::ShutDown));

  // Subscribing after shutdown yields an already-finished stream.
  assert_eq!(s.changes().next().await, None);
}

#[tokio::test]
async fn clones_share_lifecycle() {
  let s = store().await;
  let clone = s.clone();
  clone.import_snapshot(&minimal_snapshot()).await.unwrap();
  assert!(s.film("F1").await.unwrap().is_some());

  s.shutdown().await.unwrap();
  let err = clone.counts().await.unwrap_err();
  assert!(matches!(err, Error::ShutDown));
}

#[tokio::test]
async fn named_in_memory_stores_share_data() {
  let name = unique_name();
  let a = SqliteStore::open(&StoreConfig::named_in_memory(name.clone()))
    .await
    .unwrap();
  let b = SqliteStore::open(&StoreConfig::named_in_memory(name))
    .await
    .unwrap();
  let other = store().await;

  a.import_snapshot(&minimal_snapshot()).await.unwrap();

  assert!(b.film("F1").await.unwrap().is_some());
  assert!(other.film("F1").await.unwrap().is_none());
}

/// One film whose cast is `size` people.
fn crowded_snapshot(size: usize) -> Snapshot {
  let cast: Vec<String> = (0..size).map(|i| format!("P{i}")).collect();
  Snapshot {
    films: vec![FilmResponse {
      characters: cast.clone(),
      ..film("F1", "A New Hope", 4, Some((1977, 5, 25)))
    }],
    people: cast.iter().map(|url| person(url, url)).collect(),
    ..Default::default()
  }
}

#[tokio::test]
async fn shared_handle_reads_stay_consistent_during_imports() {
  const CAST: usize = 3000;

  let name = unique_name();
  let writer = SqliteStore::open(&StoreConfig::named_in_memory(name.clone()))
    .await
    .unwrap();
  let reader = SqliteStore::open(&StoreConfig::named_in_memory(name))
    .await
    .unwrap();
  let snapshot = crowded_snapshot(CAST);

  let imports = async {
    for _ in 0..5 {
      writer.import_snapshot(&snapshot).await.unwrap();
    }
  };
  let reads = async {
    let mut seen = Vec::new();
    for _ in 0..300 {
      let summary = reader.relationship_summary("F1").await.unwrap();
      seen.push(summary.character_count);
      tokio::task::yield_now().await;
    }
    seen
  };
  let ((), seen) = tokio::join!(imports, reads);

  assert!(seen.iter().all(|&count| count == 0 || count == CAST), "{seen:?}");
  assert_eq!(
    reader.relationship_summary("F1").await.unwrap().character_count,
    CAST
  );
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let config = StoreConfig::file(dir.path().join("holocron.db"));

  let s = SqliteStore::open(&config).await.unwrap();
  s.import_snapshot(&full_snapshot()).await.unwrap();
  s.shutdown().await.unwrap();

  let reopened = SqliteStore::open(&config).await.unwrap();
  let counts = reopened.counts().await.unwrap();
  assert_eq!(counts.films, 2);
  assert_eq!(counts.people, 2);
  assert_eq!(
    reopened.relationship_summary("F1").await.unwrap().character_count,
    2
  );
}

#[tokio::test]
async fn unreachable_file_is_unavailable() {
  let dir = tempfile::tempdir().unwrap();
  let config = StoreConfig::file(dir.path().join("missing").join("holocron.db"));

  let err = SqliteStore::open(&config).await.err().unwrap();
  assert!(matches!(err, Error::Unavailable { .. }));
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_references_count_once() {
  let s = store().await;
  s.import_snapshot(&minimal_snapshot()).await.unwrap();

  let summary = s.relationship_summary("F1").await.unwrap();
  assert_eq!(summary, RelationshipSummary {
    character_count: 1,
    planet_count: 1,
    ..Default::default()
  });

  let characters = s
    .relationship_entities("F1", RelationshipKind::Characters)
    .await
    .unwrap();
  assert_eq!(entity_urls(&characters), vec!["P1"]);
  assert_eq!(characters[0].name(), "Luke Skywalker");
}

#[tokio::test]
async fn import_report_describes_the_write() {
  let s = store().await;
  let report = s.import_snapshot(&minimal_snapshot()).await.unwrap();

  assert_eq!(report.entity_rows, 3);
  assert_eq!(report.join_rows, 2);
  assert_eq!(report.dropped_references, 0);
  assert_eq!(
    report.batch,
    ChangeBatch::new(vec![EntityKind::Film, EntityKind::Planet, EntityKind::Person])
  );
}

#[tokio::test]
async fn both_directions_of_a_reference_fold_into_one_row() {
  let s = store().await;
  s.import_snapshot(&full_snapshot()).await.unwrap();

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.films, 2);
  assert_eq!(counts.planets, 2);
  assert_eq!(counts.people, 2);
  assert_eq!(counts.species, 1);
  assert_eq!(counts.starships, 1);
  assert_eq!(counts.vehicles, 1);
  // F1: P1, P2; F2: P1.
  assert_eq!(counts.film_characters, 3);
  assert_eq!(counts.film_planets, 3);
  assert_eq!(counts.film_species, 1);
  assert_eq!(counts.film_starships, 1);
  assert_eq!(counts.film_vehicles, 1);
  assert_eq!(counts.person_species, 1);
  assert_eq!(counts.person_starships, 1);
  assert_eq!(counts.person_vehicles, 1);
}

#[tokio::test]
async fn back_references_alone_create_links() {
  let s = store().await;
  let snapshot = Snapshot {
    films: vec![film("F1", "A New Hope", 4, None)],
    people: vec![PersonResponse {
      films: urls(&["F1"]),
      ..person("P1", "Luke Skywalker")
    }],
    starships: vec![StarshipResponse {
      films: urls(&["F1"]),
      pilots: urls(&["P1"]),
      ..starship("X1", "Millennium Falcon")
    }],
    ..Default::default()
  };
  s.import_snapshot(&snapshot).await.unwrap();

  let summary = s.relationship_summary("F1").await.unwrap();
  assert_eq!(summary.character_count, 1);
  assert_eq!(summary.starship_count, 1);

  let related = s.character_relationships("P1").await.unwrap();
  assert_eq!(related.starships.len(), 1);
  assert_eq!(related.starships[0].url, "X1");
}

#[tokio::test]
async fn import_replaces_previous_content() {
  let s = store().await;
  s.import_snapshot(&full_snapshot()).await.unwrap();

  let replacement = Snapshot {
    films: vec![FilmResponse {
      characters: urls(&["P9"]),
      ..film("F9", "The Phantom Menace", 1, Some((1999, 5, 19)))
    }],
    people: vec![person("P9", "Anakin Skywalker")],
    ..Default::default()
  };
  s.import_snapshot(&replacement).await.unwrap();

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.entity_rows(), 2);
  assert_eq!(counts.join_rows(), 1);

  let films = s.films_ordered_by_release_date().await.unwrap();
  assert_eq!(films.iter().map(|f| f.url.as_str()).collect::<Vec<_>>(), vec!["F9"]);
  assert!(s.film("F1").await.unwrap().is_none());
  assert_eq!(s.relationship_summary("F1").await.unwrap(), RelationshipSummary::default());
}

#[tokio::test]
async fn empty_snapshot_clears_the_archive() {
  let s = store().await;
  s.import_snapshot(&full_snapshot()).await.unwrap();

  let mut changes = s.changes();
  let report = s.import_snapshot(&Snapshot::default()).await.unwrap();
  assert!(report.batch.entities.is_empty());

  assert_eq!(s.counts().await.unwrap().entity_rows(), 0);
  assert_eq!(s.counts().await.unwrap().join_rows(), 0);
  assert_eq!(changes.next().await, Some(ChangeBatch::new(vec![])));
}

#[tokio::test]
async fn dangling_references_are_dropped() {
  let s = store().await;
  let snapshot = Snapshot {
    films: vec![FilmResponse {
      characters: urls(&["P1", "P404"]),
      vehicles: urls(&["V404"]),
      ..film("F1", "A New Hope", 4, None)
    }],
    people: vec![PersonResponse {
      homeworld: Some("L404".into()),
      ..person("P1", "Luke Skywalker")
    }],
    ..Default::default()
  };

  let report = s.import_snapshot(&snapshot).await.unwrap();
  assert_eq!(report.dropped_references, 3);

  let summary = s.relationship_summary("F1").await.unwrap();
  assert_eq!(summary.character_count, 1);
  assert_eq!(summary.vehicle_count, 0);

  let characters = s
    .relationship_entities("F1", RelationshipKind::Characters)
    .await
    .unwrap();
  match &characters[0] {
    RelationshipEntity::Character(p) => assert_eq!(p.homeworld_url, None),
    other => panic!("expected a character, got {other:?}"),
  }
}

#[tokio::test]
async fn strict_import_failure_leaves_store_untouched() {
  let s = store().await;
  s.import_snapshot(&minimal_snapshot()).await.unwrap();
  let before = s.counts().await.unwrap();
  let mut changes = s.changes();

  let bad = Snapshot {
    films: vec![FilmResponse {
      characters: urls(&["P404"]),
      ..film("F2", "The Empire Strikes Back", 5, None)
    }],
    ..Default::default()
  };
  let err = s
    .import_snapshot_with(&bad, ImportOptions::strict())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DanglingReference { kind: EntityKind::Person, .. }));

  assert_eq!(s.counts().await.unwrap(), before);
  assert!(s.film("F2").await.unwrap().is_none());

  // The failed import published nothing; the next batch is the next commit.
  let snapshot = Snapshot {
    vehicles: vec![vehicle("V1", "Snowspeeder")],
    ..Default::default()
  };
  s.import_snapshot(&snapshot).await.unwrap();
  assert_eq!(changes.next().await, Some(ChangeBatch::new(vec![EntityKind::Vehicle])));
}

#[tokio::test]
async fn storage_failure_rolls_back_the_whole_import() {
  let name = unique_name();
  let s = SqliteStore::open(&StoreConfig::named_in_memory(name.clone()))
    .await
    .unwrap();
  s.import_snapshot(&minimal_snapshot()).await.unwrap();
  let before = s.counts().await.unwrap();
  let mut changes = s.changes();

  // A second handle on the same database installs a trigger that aborts
  // one insert partway through the next import.
  let saboteur =
    rusqlite::Connection::open(in_memory_uri(&name)).unwrap();
  saboteur
    .execute_batch(
      "CREATE TRIGGER refuse_alderaan BEFORE INSERT ON planets
       WHEN NEW.name = 'Alderaan'
       BEGIN SELECT RAISE(ABORT, 'planet destroyed'); END;",
    )
    .unwrap();

  let err = s.import_snapshot(&full_snapshot()).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));

  assert_eq!(s.counts().await.unwrap(), before);
  assert_eq!(
    s.relationship_summary("F1").await.unwrap(),
    RelationshipSummary { character_count: 1, planet_count: 1, ..Default::default() }
  );

  saboteur.execute_batch("DROP TRIGGER refuse_alderaan").unwrap();
  s.import_snapshot(&full_snapshot()).await.unwrap();
  assert_eq!(changes.next().await.map(|b| b.entities.len()), Some(6));
}

#[tokio::test]
async fn later_duplicate_record_wins() {
  let s = store().await;
  let snapshot = Snapshot {
    films: vec![
      film("F1", "Star Wars", 4, None),
      film("F1", "A New Hope", 4, Some((1977, 5, 25))),
    ],
    ..Default::default()
  };
  let report = s.import_snapshot(&snapshot).await.unwrap();
  assert_eq!(report.entity_rows, 1);

  let stored = s.film("F1").await.unwrap().unwrap();
  assert_eq!(stored.title, "A New Hope");
}

#[tokio::test]
async fn later_duplicate_replaces_relationships_too() {
  let s = store().await;
  let snapshot = Snapshot {
    films: vec![
      FilmResponse {
        characters: urls(&["P1"]),
        ..film("F1", "Star Wars", 4, None)
      },
      FilmResponse {
        characters: urls(&["P2"]),
        ..film("F1", "A New Hope", 4, None)
      },
    ],
    people: vec![person("P1", "Luke Skywalker"), person("P2", "Leia Organa")],
    ..Default::default()
  };
  s.import_snapshot(&snapshot).await.unwrap();

  assert_eq!(s.film("F1").await.unwrap().unwrap().title, "A New Hope");
  let characters = s
    .relationship_entities("F1", RelationshipKind::Characters)
    .await
    .unwrap();
  assert_eq!(entity_urls(&characters), vec!["P2"]);
  assert_eq!(s.counts().await.unwrap().film_characters, 1);
}

// ─── Change feed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_lists_populated_kinds_in_insertion_order() {
  let s = store().await;
  let mut changes = s.changes();

  s.import_snapshot(&full_snapshot()).await.unwrap();

  assert_eq!(
    changes.next().await,
    Some(ChangeBatch::new(vec![
      EntityKind::Film,
      EntityKind::Planet,
      EntityKind::Person,
      EntityKind::Species,
      EntityKind::Starship,
      EntityKind::Vehicle,
    ]))
  );
}

#[tokio::test]
async fn batch_omits_empty_collections() {
  let s = store().await;
  let mut changes = s.changes();

  let snapshot = Snapshot {
    species: vec![species("S1", "Human")],
    starships: vec![starship("X1", "Millennium Falcon")],
    ..Default::default()
  };
  s.import_snapshot(&snapshot).await.unwrap();

  assert_eq!(
    changes.next().await,
    Some(ChangeBatch::new(vec![EntityKind::Species, EntityKind::Starship]))
  );
}

#[tokio::test]
async fn every_subscriber_sees_every_import_in_order() {
  let s = store().await;
  let a = s.changes();
  let b = s.changes();

  s.import_snapshot(&minimal_snapshot()).await.unwrap();
  s.import_snapshot(&Snapshot {
    vehicles: vec![vehicle("V1", "Snowspeeder")],
    ..Default::default()
  })
  .await
  .unwrap();
  s.shutdown().await.unwrap();

  let first = ChangeBatch::new(vec![EntityKind::Film, EntityKind::Planet, EntityKind::Person]);
  let second = ChangeBatch::new(vec![EntityKind::Vehicle]);
  assert_eq!(a.collect::<Vec<_>>().await, vec![first.clone(), second.clone()]);
  assert_eq!(b.collect::<Vec<_>>().await, vec![first, second]);
}

#[tokio::test]
async fn concurrent_imports_both_commit() {
  let s = store().await;
  let mut changes = s.changes();

  let a = minimal_snapshot();
  let b = full_snapshot();
  let (ra, rb) = tokio::join!(s.import_snapshot(&a), s.import_snapshot(&b));
  ra.unwrap();
  rb.unwrap();

  let counts = s.counts().await.unwrap();
  assert!(counts.entity_rows() == 3 || counts.entity_rows() == 9);
  assert!(changes.next().await.is_some());
  assert!(changes.next().await.is_some());
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn films_order_by_release_date_with_undated_last() {
  let s = store().await;
  let snapshot = Snapshot {
    films: vec![
      film("F6", "Return of the Jedi", 6, Some((1983, 5, 25))),
      film("F0", "Untitled", 0, None),
      film("F4", "A New Hope", 4, Some((1977, 5, 25))),
      film("F1", "The Phantom Menace", 1, Some((1999, 5, 19))),
      film("F5", "The Empire Strikes Back", 5, Some((1980, 5, 17))),
    ],
    ..Default::default()
  };
  s.import_snapshot(&snapshot).await.unwrap();

  let order: Vec<String> = s
    .films_ordered_by_release_date()
    .await
    .unwrap()
    .into_iter()
    .map(|f| f.url)
    .collect();
  assert_eq!(order, vec!["F4", "F5", "F6", "F1", "F0"]);
}

#[tokio::test]
async fn film_round_trips_through_storage() {
  let s = store().await;
  let snapshot = full_snapshot();
  s.import_snapshot(&snapshot).await.unwrap();

  let stored = s.film("F1").await.unwrap().unwrap();
  assert_eq!(stored, snapshot.films[0].to_record());
  assert_eq!(stored.producers, vec!["Gary Kurtz", "Rick McCallum"]);
}

#[tokio::test]
async fn missing_film_is_none() {
  let s = store().await;
  s.import_snapshot(&minimal_snapshot()).await.unwrap();
  assert!(s.film("F404").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_film_has_empty_relationships() {
  let s = store().await;
  s.import_snapshot(&full_snapshot()).await.unwrap();

  assert_eq!(s.relationship_summary("F404").await.unwrap(), RelationshipSummary::default());
  for kind in [
    RelationshipKind::Characters,
    RelationshipKind::Planets,
    RelationshipKind::Species,
    RelationshipKind::Starships,
    RelationshipKind::Vehicles,
  ] {
    assert!(s.relationship_entities("F404", kind).await.unwrap().is_empty());
  }
}

#[tokio::test]
async fn relationship_entities_match_summary_for_every_kind() {
  let s = store().await;
  s.import_snapshot(&full_snapshot()).await.unwrap();
  let summary = s.relationship_summary("F1").await.unwrap();

  let expected = [
    (RelationshipKind::Characters, vec!["P2", "P1"]),
    (RelationshipKind::Planets, vec!["L2", "L1"]),
    (RelationshipKind::Species, vec!["S1"]),
    (RelationshipKind::Starships, vec!["X1"]),
    (RelationshipKind::Vehicles, vec!["V1"]),
  ];
  for (kind, want) in expected {
    let entities = s.relationship_entities("F1", kind).await.unwrap();
    assert_eq!(entities.len(), summary.count(kind), "{kind}");
    // Ordered by name: Leia before Luke, Alderaan before Tatooine.
    assert_eq!(entity_urls(&entities), want, "{kind}");
    assert!(entities.iter().all(|e| e.kind() == kind));
  }
  assert_eq!(summary.total(), 7);
}

#[tokio::test]
async fn related_records_keep_decoded_fields() {
  let s = store().await;
  let mut snapshot = full_snapshot();
  snapshot.people[1].hair_color = "n/a".into();
  snapshot.people[1].mass = "1,358".into();
  snapshot.people[1].gender = "n/a".into();
  snapshot.people[1].birth_year = "unknown".into();
  s.import_snapshot(&snapshot).await.unwrap();

  let characters = s
    .relationship_entities("F1", RelationshipKind::Characters)
    .await
    .unwrap();
  let leia = match &characters[0] {
    RelationshipEntity::Character(p) => p,
    other => panic!("expected a character, got {other:?}"),
  };
  assert_eq!(leia.name, "Leia Organa");
  assert!(leia.hair_colors.is_empty());
  assert_eq!(leia.mass.raw(), "1,358");
  assert_eq!(leia.mass.value(), Some(1358.0));
  assert_eq!(leia.gender, Gender::NotApplicable);
  assert_eq!(leia.birth_year, BirthYear::Unknown);
  assert_eq!(leia.homeworld_url.as_deref(), Some("L2"));

  let luke = match &characters[1] {
    RelationshipEntity::Character(p) => p,
    other => panic!("expected a character, got {other:?}"),
  };
  assert_eq!(luke.birth_year, BirthYear::BeforeYavin(19.0));
  assert_eq!(luke.hair_colors, vec!["blond"]);

  let planets = s
    .relationship_entities("F1", RelationshipKind::Planets)
    .await
    .unwrap();
  match &planets[1] {
    RelationshipEntity::Planet(p) => {
      assert_eq!(p, &snapshot.planets[0].to_record());
      assert_eq!(p.population.value(), Some(200_000.0));
    }
    other => panic!("expected a planet, got {other:?}"),
  }
}

#[tokio::test]
async fn character_relationships_collect_all_three_lists() {
  let s = store().await;
  let snapshot = full_snapshot();
  s.import_snapshot(&snapshot).await.unwrap();

  let luke = s.character_relationships("P1").await.unwrap();
  assert_eq!(luke.species, vec![snapshot.species[0].to_record()]);
  assert_eq!(luke.starships, vec![snapshot.starships[0].to_record()]);
  assert_eq!(luke.vehicles, vec![snapshot.vehicles[0].to_record()]);
  assert_eq!(luke.species[0].homeworld_url.as_deref(), Some("L2"));

  let leia = s.character_relationships("P2").await.unwrap();
  assert!(leia.species.is_empty());
  assert!(leia.starships.is_empty());
  assert!(leia.vehicles.is_empty());

  let nobody = s.character_relationships("P404").await.unwrap();
  assert_eq!(nobody, Default::default());
}

#[tokio::test]
async fn concurrent_reads_agree() {
  let s = store().await;
  s.import_snapshot(&full_snapshot()).await.unwrap();

  let (films, summary, counts) = tokio::join!(
    s.films_ordered_by_release_date(),
    s.relationship_summary("F1"),
    s.counts(),
  );
  assert_eq!(films.unwrap().len(), 2);
  assert_eq!(summary.unwrap().character_count, 2);
  assert_eq!(counts.unwrap().films, 2);
}

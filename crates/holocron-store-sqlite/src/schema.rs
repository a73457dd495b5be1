//! SQL schema for the Holocron SQLite store.
//!
//! Tables are described as data and rendered to DDL by one generic runner,
//! so adding a column means touching one table definition. Creation order
//! follows foreign-key dependencies: entity tables first, join tables last.

use std::time::Duration;

use holocron_core::{entity::EntityKind, relationship::RelationshipKind};
use strum::EnumIter;

/// Bumped whenever the table definitions below change shape.
pub const SCHEMA_VERSION: i64 = 1;

// ─── Definitions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Text,
  Integer,
}

impl ColumnType {
  fn sql(self) -> &'static str {
    match self {
      Self::Text => "TEXT",
      Self::Integer => "INTEGER",
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
  pub name:        &'static str,
  pub ty:          ColumnType,
  pub not_null:    bool,
  pub primary_key: bool,
}

impl Column {
  /// The URL primary key every entity table carries.
  pub const fn key(name: &'static str) -> Self {
    Self { name, ty: ColumnType::Text, not_null: true, primary_key: true }
  }

  pub const fn required(name: &'static str, ty: ColumnType) -> Self {
    Self { name, ty, not_null: true, primary_key: false }
  }

  pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
    Self { name, ty, not_null: false, primary_key: false }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
  Cascade,
  SetNull,
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
  pub column:     &'static str,
  pub references: &'static str,
  pub on_delete:  OnDelete,
}

#[derive(Debug)]
pub struct TableSchema {
  pub name:         &'static str,
  pub columns:      &'static [Column],
  pub foreign_keys: &'static [ForeignKey],
  /// Column groups under a UNIQUE constraint.
  pub unique:       &'static [&'static [&'static str]],
  /// Columns that get a secondary index.
  pub indexes:      &'static [&'static str],
}

impl TableSchema {
  /// Render the `CREATE TABLE` statement plus any `CREATE INDEX` statements.
  pub fn ddl(&self) -> String {
    let mut parts: Vec<String> = self
      .columns
      .iter()
      .map(|c| {
        let mut def = format!("{} {}", c.name, c.ty.sql());
        if c.primary_key {
          def.push_str(" PRIMARY KEY");
        } else if c.not_null {
          def.push_str(" NOT NULL");
        }
        def
      })
      .collect();

    parts.extend(self.foreign_keys.iter().map(|fk| {
      let action = match fk.on_delete {
        OnDelete::Cascade => "CASCADE",
        OnDelete::SetNull => "SET NULL",
      };
      format!(
        "FOREIGN KEY ({}) REFERENCES {}(url) ON DELETE {action}",
        fk.column, fk.references
      )
    }));

    parts.extend(
      self
        .unique
        .iter()
        .map(|cols| format!("UNIQUE ({})", cols.join(", "))),
    );

    let mut sql = format!(
      "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n",
      self.name,
      parts.join(",\n    ")
    );
    for column in self.indexes {
      sql.push_str(&format!(
        "CREATE INDEX IF NOT EXISTS {table}_{column}_idx ON {table}({column});\n",
        table = self.name,
      ));
    }
    sql
  }

  pub fn column_names(&self) -> Vec<&'static str> {
    self.columns.iter().map(|c| c.name).collect()
  }

  /// `INSERT INTO <table> (<cols>) VALUES (?1, ..., ?n)`.
  pub fn insert_sql(&self) -> String {
    let names = self.column_names();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
    format!(
      "INSERT INTO {} ({}) VALUES ({})",
      self.name,
      names.join(", "),
      placeholders.join(", ")
    )
  }
}

// ─── Entity tables ───────────────────────────────────────────────────────────

use ColumnType::{Integer, Text};

pub static FILMS: TableSchema = TableSchema {
  name:         "films",
  columns:      &[
    Column::key("url"),
    Column::required("title", Text),
    Column::required("episode_id", Integer),
    Column::required("opening_crawl", Text),
    Column::required("director", Text),
    Column::required("producers", Text),
    Column::nullable("release_date", Text),
    Column::required("created", Text),
    Column::required("edited", Text),
  ],
  foreign_keys: &[],
  unique:       &[],
  indexes:      &["release_date"],
};

pub static PLANETS: TableSchema = TableSchema {
  name:         "planets",
  columns:      &[
    Column::key("url"),
    Column::required("name", Text),
    Column::required("rotation_period", Text),
    Column::required("orbital_period", Text),
    Column::required("diameter", Text),
    Column::required("climates", Text),
    Column::required("gravity_levels", Text),
    Column::required("terrains", Text),
    Column::required("surface_water", Text),
    Column::required("population", Text),
    Column::required("created", Text),
    Column::required("edited", Text),
  ],
  foreign_keys: &[],
  unique:       &[],
  indexes:      &[],
};

pub static SPECIES: TableSchema = TableSchema {
  name:         "species",
  columns:      &[
    Column::key("url"),
    Column::required("name", Text),
    Column::required("classification", Text),
    Column::required("designation", Text),
    Column::required("average_height", Text),
    Column::required("average_lifespan", Text),
    Column::required("skin_colors", Text),
    Column::required("hair_colors", Text),
    Column::required("eye_colors", Text),
    Column::required("language", Text),
    Column::nullable("homeworld_url", Text),
    Column::required("created", Text),
    Column::required("edited", Text),
  ],
  foreign_keys: &[ForeignKey {
    column:     "homeworld_url",
    references: "planets",
    on_delete:  OnDelete::SetNull,
  }],
  unique:       &[],
  indexes:      &["homeworld_url"],
};

pub static PEOPLE: TableSchema = TableSchema {
  name:         "people",
  columns:      &[
    Column::key("url"),
    Column::required("name", Text),
    Column::required("height", Text),
    Column::required("mass", Text),
    Column::required("hair_colors", Text),
    Column::required("skin_colors", Text),
    Column::required("eye_colors", Text),
    Column::required("birth_year", Text),
    Column::required("gender", Text),
    Column::nullable("homeworld_url", Text),
    Column::required("created", Text),
    Column::required("edited", Text),
  ],
  foreign_keys: &[ForeignKey {
    column:     "homeworld_url",
    references: "planets",
    on_delete:  OnDelete::SetNull,
  }],
  unique:       &[],
  indexes:      &["homeworld_url"],
};

pub static STARSHIPS: TableSchema = TableSchema {
  name:         "starships",
  columns:      &[
    Column::key("url"),
    Column::required("name", Text),
    Column::required("model", Text),
    Column::required("manufacturers", Text),
    Column::required("cost_in_credits", Text),
    Column::required("length", Text),
    Column::required("max_atmosphering_speed", Text),
    Column::required("crew", Text),
    Column::required("passengers", Text),
    Column::required("cargo_capacity", Text),
    Column::required("consumables", Text),
    Column::required("hyperdrive_rating", Text),
    Column::required("mglt", Text),
    Column::required("starship_class", Text),
    Column::required("created", Text),
    Column::required("edited", Text),
  ],
  foreign_keys: &[],
  unique:       &[],
  indexes:      &[],
};

pub static VEHICLES: TableSchema = TableSchema {
  name:         "vehicles",
  columns:      &[
    Column::key("url"),
    Column::required("name", Text),
    Column::required("model", Text),
    Column::required("manufacturers", Text),
    Column::required("cost_in_credits", Text),
    Column::required("length", Text),
    Column::required("max_atmosphering_speed", Text),
    Column::required("crew", Text),
    Column::required("passengers", Text),
    Column::required("cargo_capacity", Text),
    Column::required("consumables", Text),
    Column::required("vehicle_class", Text),
    Column::required("created", Text),
    Column::required("edited", Text),
  ],
  foreign_keys: &[],
  unique:       &[],
  indexes:      &[],
};

// ─── Join tables ─────────────────────────────────────────────────────────────

macro_rules! join_table {
  ($ident:ident, $name:literal, $left:literal => $left_table:literal, $right:literal => $right_table:literal) => {
    pub static $ident: TableSchema = TableSchema {
      name:         $name,
      columns:      &[
        Column::required($left, Text),
        Column::required($right, Text),
      ],
      foreign_keys: &[
        ForeignKey { column: $left, references: $left_table, on_delete: OnDelete::Cascade },
        ForeignKey { column: $right, references: $right_table, on_delete: OnDelete::Cascade },
      ],
      unique:       &[&[$left, $right]],
      indexes:      &[$right],
    };
  };
}

join_table!(FILM_CHARACTERS, "film_characters", "film_url" => "films", "person_url" => "people");
join_table!(FILM_PLANETS, "film_planets", "film_url" => "films", "planet_url" => "planets");
join_table!(FILM_SPECIES, "film_species", "film_url" => "films", "species_url" => "species");
join_table!(FILM_STARSHIPS, "film_starships", "film_url" => "films", "starship_url" => "starships");
join_table!(FILM_VEHICLES, "film_vehicles", "film_url" => "films", "vehicle_url" => "vehicles");
join_table!(PERSON_SPECIES, "person_species", "person_url" => "people", "species_url" => "species");
join_table!(PERSON_STARSHIPS, "person_starships", "person_url" => "people", "starship_url" => "starships");
join_table!(PERSON_VEHICLES, "person_vehicles", "person_url" => "people", "vehicle_url" => "vehicles");

/// Entity tables in creation order. Deletion walks this list backwards
/// after every join table has been emptied.
pub static ENTITY_TABLES: [&TableSchema; 6] =
  [&FILMS, &PLANETS, &SPECIES, &PEOPLE, &STARSHIPS, &VEHICLES];

/// One of the eight many-to-many association tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum JoinTable {
  FilmCharacters,
  FilmPlanets,
  FilmSpecies,
  FilmStarships,
  FilmVehicles,
  PersonSpecies,
  PersonStarships,
  PersonVehicles,
}

impl JoinTable {
  pub fn schema(self) -> &'static TableSchema {
    match self {
      Self::FilmCharacters => &FILM_CHARACTERS,
      Self::FilmPlanets => &FILM_PLANETS,
      Self::FilmSpecies => &FILM_SPECIES,
      Self::FilmStarships => &FILM_STARSHIPS,
      Self::FilmVehicles => &FILM_VEHICLES,
      Self::PersonSpecies => &PERSON_SPECIES,
      Self::PersonStarships => &PERSON_STARSHIPS,
      Self::PersonVehicles => &PERSON_VEHICLES,
    }
  }

  pub fn name(self) -> &'static str { self.schema().name }

  /// Entity kinds on the (left, right) sides of each row.
  pub fn endpoints(self) -> (EntityKind, EntityKind) {
    match self {
      Self::FilmCharacters => (EntityKind::Film, EntityKind::Person),
      Self::FilmPlanets => (EntityKind::Film, EntityKind::Planet),
      Self::FilmSpecies => (EntityKind::Film, EntityKind::Species),
      Self::FilmStarships => (EntityKind::Film, EntityKind::Starship),
      Self::FilmVehicles => (EntityKind::Film, EntityKind::Vehicle),
      Self::PersonSpecies => (EntityKind::Person, EntityKind::Species),
      Self::PersonStarships => (EntityKind::Person, EntityKind::Starship),
      Self::PersonVehicles => (EntityKind::Person, EntityKind::Vehicle),
    }
  }

  /// `(left, right)` column names.
  pub fn columns(self) -> (&'static str, &'static str) {
    let columns = self.schema().columns;
    (columns[0].name, columns[1].name)
  }

  /// The table backing a film relationship.
  pub fn for_film(kind: RelationshipKind) -> Self {
    match kind {
      RelationshipKind::Characters => Self::FilmCharacters,
      RelationshipKind::Planets => Self::FilmPlanets,
      RelationshipKind::Species => Self::FilmSpecies,
      RelationshipKind::Starships => Self::FilmStarships,
      RelationshipKind::Vehicles => Self::FilmVehicles,
    }
  }

  /// Duplicate pairs are ignored; the UNIQUE constraint is the final
  /// arbiter.
  pub fn insert_sql(self) -> String {
    let (left, right) = self.columns();
    format!(
      "INSERT OR IGNORE INTO {} ({left}, {right}) VALUES (?1, ?2)",
      self.name()
    )
  }
}

// ─── Initializer ─────────────────────────────────────────────────────────────

/// Connection-level pragmas; must run outside any transaction.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL in dependency order; idempotent thanks to
/// `CREATE TABLE IF NOT EXISTS`.
pub fn schema_sql() -> String {
  use strum::IntoEnumIterator as _;

  let mut sql = String::new();
  for table in ENTITY_TABLES {
    sql.push_str(&table.ddl());
  }
  for join in JoinTable::iter() {
    sql.push_str(&join.schema().ddl());
  }
  sql.push_str(&format!("PRAGMA user_version = {SCHEMA_VERSION};\n"));
  sql
}

/// How long a statement waits on another connection's lock before giving
/// up with `SQLITE_BUSY`.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply pragmas and create every table.
pub fn initialize(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
  conn.busy_timeout(BUSY_TIMEOUT)?;
  conn.execute_batch(PRAGMAS)?;
  let tx = conn.transaction()?;
  tx.execute_batch(&schema_sql())?;
  tx.commit()
}

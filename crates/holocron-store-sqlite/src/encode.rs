//! Encoding and decoding helpers between entity records and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and release dates as
//! `YYYY-MM-DD`. List fields are stored comma-joined. Numeric-looking
//! fields keep their original text.

use chrono::{DateTime, NaiveDate, Utc};
use holocron_core::{
  descriptor::{decode_descriptors, encode_list, split_list, split_manufacturers},
  entity::{Film, Person, Planet, Species, Starship, Vehicle},
  measure::{BirthYear, Gender, Measurement},
};
use rusqlite::{Row, Statement, params};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Inserts ─────────────────────────────────────────────────────────────────
//
// Parameter order matches the column order of the table definitions in
// `schema.rs`; each statement comes from `TableSchema::insert_sql`.

pub fn insert_film(stmt: &mut Statement<'_>, film: &Film) -> rusqlite::Result<usize> {
  stmt.execute(params![
    film.url,
    film.title,
    film.episode_id,
    film.opening_crawl,
    film.director,
    encode_list(&film.producers),
    film.release_date.map(encode_date),
    encode_dt(film.created),
    encode_dt(film.edited),
  ])
}

pub fn insert_planet(stmt: &mut Statement<'_>, planet: &Planet) -> rusqlite::Result<usize> {
  stmt.execute(params![
    planet.url,
    planet.name,
    planet.rotation_period.raw(),
    planet.orbital_period.raw(),
    planet.diameter.raw(),
    encode_list(&planet.climates),
    encode_list(&planet.gravity_levels),
    encode_list(&planet.terrains),
    planet.surface_water.raw(),
    planet.population.raw(),
    encode_dt(planet.created),
    encode_dt(planet.edited),
  ])
}

pub fn insert_species(stmt: &mut Statement<'_>, species: &Species) -> rusqlite::Result<usize> {
  stmt.execute(params![
    species.url,
    species.name,
    species.classification,
    species.designation,
    species.average_height.raw(),
    species.average_lifespan.raw(),
    encode_list(&species.skin_colors),
    encode_list(&species.hair_colors),
    encode_list(&species.eye_colors),
    species.language,
    species.homeworld_url,
    encode_dt(species.created),
    encode_dt(species.edited),
  ])
}

pub fn insert_person(stmt: &mut Statement<'_>, person: &Person) -> rusqlite::Result<usize> {
  stmt.execute(params![
    person.url,
    person.name,
    person.height.raw(),
    person.mass.raw(),
    encode_list(&person.hair_colors),
    encode_list(&person.skin_colors),
    encode_list(&person.eye_colors),
    person.birth_year.to_string(),
    person.gender.to_string(),
    person.homeworld_url,
    encode_dt(person.created),
    encode_dt(person.edited),
  ])
}

pub fn insert_starship(stmt: &mut Statement<'_>, ship: &Starship) -> rusqlite::Result<usize> {
  stmt.execute(params![
    ship.url,
    ship.name,
    ship.model,
    encode_list(&ship.manufacturers),
    ship.cost_in_credits.raw(),
    ship.length.raw(),
    ship.max_atmosphering_speed.raw(),
    ship.crew.raw(),
    ship.passengers.raw(),
    ship.cargo_capacity.raw(),
    ship.consumables,
    ship.hyperdrive_rating.raw(),
    ship.mglt.raw(),
    ship.starship_class,
    encode_dt(ship.created),
    encode_dt(ship.edited),
  ])
}

pub fn insert_vehicle(stmt: &mut Statement<'_>, vehicle: &Vehicle) -> rusqlite::Result<usize> {
  stmt.execute(params![
    vehicle.url,
    vehicle.name,
    vehicle.model,
    encode_list(&vehicle.manufacturers),
    vehicle.cost_in_credits.raw(),
    vehicle.length.raw(),
    vehicle.max_atmosphering_speed.raw(),
    vehicle.crew.raw(),
    vehicle.passengers.raw(),
    vehicle.cargo_capacity.raw(),
    vehicle.consumables,
    vehicle.vehicle_class,
    encode_dt(vehicle.created),
    encode_dt(vehicle.edited),
  ])
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Rows are read by column name from `SELECT <alias>.*` queries, so the raw
// types do not depend on column order.

/// Raw strings read directly from a `films` row.
pub struct RawFilm {
  pub url:           String,
  pub title:         String,
  pub episode_id:    i64,
  pub opening_crawl: String,
  pub director:      String,
  pub producers:     String,
  pub release_date:  Option<String>,
  pub created:       String,
  pub edited:        String,
}

impl RawFilm {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      url:           row.get("url")?,
      title:         row.get("title")?,
      episode_id:    row.get("episode_id")?,
      opening_crawl: row.get("opening_crawl")?,
      director:      row.get("director")?,
      producers:     row.get("producers")?,
      release_date:  row.get("release_date")?,
      created:       row.get("created")?,
      edited:        row.get("edited")?,
    })
  }

  pub fn into_film(self) -> Result<Film> {
    Ok(Film {
      url:           self.url,
      title:         self.title,
      episode_id:    self.episode_id,
      opening_crawl: self.opening_crawl,
      director:      self.director,
      producers:     split_list(&self.producers),
      release_date:  self.release_date.as_deref().map(decode_date).transpose()?,
      created:       decode_dt(&self.created)?,
      edited:        decode_dt(&self.edited)?,
    })
  }
}

pub struct RawPlanet {
  pub url:             String,
  pub name:            String,
  pub rotation_period: String,
  pub orbital_period:  String,
  pub diameter:        String,
  pub climates:        String,
  pub gravity_levels:  String,
  pub terrains:        String,
  pub surface_water:   String,
  pub population:      String,
  pub created:         String,
  pub edited:          String,
}

impl RawPlanet {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      url:             row.get("url")?,
      name:            row.get("name")?,
      rotation_period: row.get("rotation_period")?,
      orbital_period:  row.get("orbital_period")?,
      diameter:        row.get("diameter")?,
      climates:        row.get("climates")?,
      gravity_levels:  row.get("gravity_levels")?,
      terrains:        row.get("terrains")?,
      surface_water:   row.get("surface_water")?,
      population:      row.get("population")?,
      created:         row.get("created")?,
      edited:          row.get("edited")?,
    })
  }

  pub fn into_planet(self) -> Result<Planet> {
    Ok(Planet {
      url:             self.url,
      name:            self.name,
      rotation_period: Measurement::from(self.rotation_period),
      orbital_period:  Measurement::from(self.orbital_period),
      diameter:        Measurement::from(self.diameter),
      climates:        decode_descriptors(&self.climates),
      gravity_levels:  decode_descriptors(&self.gravity_levels),
      terrains:        decode_descriptors(&self.terrains),
      surface_water:   Measurement::from(self.surface_water),
      population:      Measurement::from(self.population),
      created:         decode_dt(&self.created)?,
      edited:          decode_dt(&self.edited)?,
    })
  }
}

pub struct RawSpecies {
  pub url:              String,
  pub name:             String,
  pub classification:   String,
  pub designation:      String,
  pub average_height:   String,
  pub average_lifespan: String,
  pub skin_colors:      String,
  pub hair_colors:      String,
  pub eye_colors:       String,
  pub language:         String,
  pub homeworld_url:    Option<String>,
  pub created:          String,
  pub edited:           String,
}

impl RawSpecies {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      url:              row.get("url")?,
      name:             row.get("name")?,
      classification:   row.get("classification")?,
      designation:      row.get("designation")?,
      average_height:   row.get("average_height")?,
      average_lifespan: row.get("average_lifespan")?,
      skin_colors:      row.get("skin_colors")?,
      hair_colors:      row.get("hair_colors")?,
      eye_colors:       row.get("eye_colors")?,
      language:         row.get("language")?,
      homeworld_url:    row.get("homeworld_url")?,
      created:          row.get("created")?,
      edited:           row.get("edited")?,
    })
  }

  pub fn into_species(self) -> Result<Species> {
    Ok(Species {
      url:              self.url,
      name:             self.name,
      classification:   self.classification,
      designation:      self.designation,
      average_height:   Measurement::from(self.average_height),
      average_lifespan: Measurement::from(self.average_lifespan),
      skin_colors:      decode_descriptors(&self.skin_colors),
      hair_colors:      decode_descriptors(&self.hair_colors),
      eye_colors:       decode_descriptors(&self.eye_colors),
      language:         self.language,
      homeworld_url:    self.homeworld_url,
      created:          decode_dt(&self.created)?,
      edited:           decode_dt(&self.edited)?,
    })
  }
}

pub struct RawPerson {
  pub url:           String,
  pub name:          String,
  pub height:        String,
  pub mass:          String,
  pub hair_colors:   String,
  pub skin_colors:   String,
  pub eye_colors:    String,
  pub birth_year:    String,
  pub gender:        String,
  pub homeworld_url: Option<String>,
  pub created:       String,
  pub edited:        String,
}

impl RawPerson {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      url:           row.get("url")?,
      name:          row.get("name")?,
      height:        row.get("height")?,
      mass:          row.get("mass")?,
      hair_colors:   row.get("hair_colors")?,
      skin_colors:   row.get("skin_colors")?,
      eye_colors:    row.get("eye_colors")?,
      birth_year:    row.get("birth_year")?,
      gender:        row.get("gender")?,
      homeworld_url: row.get("homeworld_url")?,
      created:       row.get("created")?,
      edited:        row.get("edited")?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      url:           self.url,
      name:          self.name,
      height:        Measurement::from(self.height),
      mass:          Measurement::from(self.mass),
      hair_colors:   decode_descriptors(&self.hair_colors),
      skin_colors:   decode_descriptors(&self.skin_colors),
      eye_colors:    decode_descriptors(&self.eye_colors),
      birth_year:    BirthYear::parse(&self.birth_year),
      gender:        Gender::parse(&self.gender),
      homeworld_url: self.homeworld_url,
      created:       decode_dt(&self.created)?,
      edited:        decode_dt(&self.edited)?,
    })
  }
}

pub struct RawStarship {
  pub url:                    String,
  pub name:                   String,
  pub model:                  String,
  pub manufacturers:          String,
  pub cost_in_credits:        String,
  pub length:                 String,
  pub max_atmosphering_speed: String,
  pub crew:                   String,
  pub passengers:             String,
  pub cargo_capacity:         String,
  pub consumables:            String,
  pub hyperdrive_rating:      String,
  pub mglt:                   String,
  pub starship_class:         String,
  pub created:                String,
  pub edited:                 String,
}

impl RawStarship {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      url:                    row.get("url")?,
      name:                   row.get("name")?,
      model:                  row.get("model")?,
      manufacturers:          row.get("manufacturers")?,
      cost_in_credits:        row.get("cost_in_credits")?,
      length:                 row.get("length")?,
      max_atmosphering_speed: row.get("max_atmosphering_speed")?,
      crew:                   row.get("crew")?,
      passengers:             row.get("passengers")?,
      cargo_capacity:         row.get("cargo_capacity")?,
      consumables:            row.get("consumables")?,
      hyperdrive_rating:      row.get("hyperdrive_rating")?,
      mglt:                   row.get("mglt")?,
      starship_class:         row.get("starship_class")?,
      created:                row.get("created")?,
      edited:                 row.get("edited")?,
    })
  }

  pub fn into_starship(self) -> Result<Starship> {
    Ok(Starship {
      url:                    self.url,
      name:                   self.name,
      model:                  self.model,
      manufacturers:          split_manufacturers(&self.manufacturers),
      cost_in_credits:        Measurement::from(self.cost_in_credits),
      length:                 Measurement::from(self.length),
      max_atmosphering_speed: Measurement::from(self.max_atmosphering_speed),
      crew:                   Measurement::from(self.crew),
      passengers:             Measurement::from(self.passengers),
      cargo_capacity:         Measurement::from(self.cargo_capacity),
      consumables:            self.consumables,
      hyperdrive_rating:      Measurement::from(self.hyperdrive_rating),
      mglt:                   Measurement::from(self.mglt),
      starship_class:         self.starship_class,
      created:                decode_dt(&self.created)?,
      edited:                 decode_dt(&self.edited)?,
    })
  }
}

pub struct RawVehicle {
  pub url:                    String,
  pub name:                   String,
  pub model:                  String,
  pub manufacturers:          String,
  pub cost_in_credits:        String,
  pub length:                 String,
  pub max_atmosphering_speed: String,
  pub crew:                   String,
  pub passengers:             String,
  pub cargo_capacity:         String,
  pub consumables:            String,
  pub vehicle_class:          String,
  pub created:                String,
  pub edited:                 String,
}

impl RawVehicle {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      url:                    row.get("url")?,
      name:                   row.get("name")?,
      model:                  row.get("model")?,
      manufacturers:          row.get("manufacturers")?,
      cost_in_credits:        row.get("cost_in_credits")?,
      length:                 row.get("length")?,
      max_atmosphering_speed: row.get("max_atmosphering_speed")?,
      crew:                   row.get("crew")?,
      passengers:             row.get("passengers")?,
      cargo_capacity:         row.get("cargo_capacity")?,
      consumables:            row.get("consumables")?,
      vehicle_class:          row.get("vehicle_class")?,
      created:                row.get("created")?,
      edited:                 row.get("edited")?,
    })
  }

  pub fn into_vehicle(self) -> Result<Vehicle> {
    Ok(Vehicle {
      url:                    self.url,
      name:                   self.name,
      model:                  self.model,
      manufacturers:          split_manufacturers(&self.manufacturers),
      cost_in_credits:        Measurement::from(self.cost_in_credits),
      length:                 Measurement::from(self.length),
      max_atmosphering_speed: Measurement::from(self.max_atmosphering_speed),
      crew:                   Measurement::from(self.crew),
      passengers:             Measurement::from(self.passengers),
      cargo_capacity:         Measurement::from(self.cargo_capacity),
      consumables:            self.consumables,
      vehicle_class:          self.vehicle_class,
      created:                decode_dt(&self.created)?,
      edited:                 decode_dt(&self.edited)?,
    })
  }
}

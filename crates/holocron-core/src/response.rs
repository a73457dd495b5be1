//! Response records and snapshots.
//!
//! Response records mirror the public Star Wars API JSON documents: flat
//! strings for every scalar, comma-joined strings for lists, and plain URL
//! lists for relationships. A [`Snapshot`] bundles one list per collection
//! and is the unit an [`ArchiveStore`](crate::store::ArchiveStore) imports.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Result,
  descriptor::{decode_descriptors, split_list, split_manufacturers},
  entity::{EntityKind, Film, Person, Planet, Species, Starship, Vehicle},
  measure::{BirthYear, Gender, Measurement},
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Accept `null`, `""`, or an ISO-8601 calendar date.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  match raw.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Some)
      .map_err(serde::de::Error::custom),
  }
}

/// A homeworld reference; blank strings mean "no homeworld".
fn homeworld(raw: &Option<String>) -> Option<String> {
  raw
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmResponse {
  pub url:           String,
  pub title:         String,
  pub episode_id:    i64,
  #[serde(default)]
  pub opening_crawl: String,
  #[serde(default)]
  pub director:      String,
  /// Comma-joined producer names.
  #[serde(default)]
  pub producer:      String,
  #[serde(default, deserialize_with = "optional_date")]
  pub release_date:  Option<NaiveDate>,
  #[serde(default)]
  pub characters:    Vec<String>,
  #[serde(default)]
  pub planets:       Vec<String>,
  #[serde(default)]
  pub species:       Vec<String>,
  #[serde(default)]
  pub starships:     Vec<String>,
  #[serde(default)]
  pub vehicles:      Vec<String>,
  pub created:       DateTime<Utc>,
  pub edited:        DateTime<Utc>,
}

impl FilmResponse {
  pub fn to_record(&self) -> Film {
    Film {
      url:           self.url.clone(),
      title:         self.title.clone(),
      episode_id:    self.episode_id,
      opening_crawl: self.opening_crawl.clone(),
      director:      self.director.clone(),
      producers:     split_list(&self.producer),
      release_date:  self.release_date,
      created:       self.created,
      edited:        self.edited,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonResponse {
  pub url:        String,
  pub name:       String,
  #[serde(default)]
  pub height:     String,
  #[serde(default)]
  pub mass:       String,
  #[serde(default)]
  pub hair_color: String,
  #[serde(default)]
  pub skin_color: String,
  #[serde(default)]
  pub eye_color:  String,
  #[serde(default)]
  pub birth_year: String,
  #[serde(default)]
  pub gender:     String,
  #[serde(default)]
  pub homeworld:  Option<String>,
  #[serde(default)]
  pub films:      Vec<String>,
  #[serde(default)]
  pub species:    Vec<String>,
  #[serde(default)]
  pub starships:  Vec<String>,
  #[serde(default)]
  pub vehicles:   Vec<String>,
  pub created:    DateTime<Utc>,
  pub edited:     DateTime<Utc>,
}

impl PersonResponse {
  pub fn to_record(&self) -> Person {
    Person {
      url:           self.url.clone(),
      name:          self.name.clone(),
      height:        Measurement::new(self.height.trim()),
      mass:          Measurement::new(self.mass.trim()),
      hair_colors:   decode_descriptors(&self.hair_color),
      skin_colors:   decode_descriptors(&self.skin_color),
      eye_colors:    decode_descriptors(&self.eye_color),
      birth_year:    BirthYear::parse(&self.birth_year),
      gender:        Gender::parse(&self.gender),
      homeworld_url: homeworld(&self.homeworld),
      created:       self.created,
      edited:        self.edited,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanetResponse {
  pub url:             String,
  pub name:            String,
  #[serde(default)]
  pub rotation_period: String,
  #[serde(default)]
  pub orbital_period:  String,
  #[serde(default)]
  pub diameter:        String,
  #[serde(default)]
  pub climate:         String,
  #[serde(default)]
  pub gravity:         String,
  #[serde(default)]
  pub terrain:         String,
  #[serde(default)]
  pub surface_water:   String,
  #[serde(default)]
  pub population:      String,
  #[serde(default)]
  pub residents:       Vec<String>,
  #[serde(default)]
  pub films:           Vec<String>,
  pub created:         DateTime<Utc>,
  pub edited:          DateTime<Utc>,
}

impl PlanetResponse {
  pub fn to_record(&self) -> Planet {
    Planet {
      url:             self.url.clone(),
      name:            self.name.clone(),
      rotation_period: Measurement::new(self.rotation_period.trim()),
      orbital_period:  Measurement::new(self.orbital_period.trim()),
      diameter:        Measurement::new(self.diameter.trim()),
      climates:        decode_descriptors(&self.climate),
      gravity_levels:  decode_descriptors(&self.gravity),
      terrains:        decode_descriptors(&self.terrain),
      surface_water:   Measurement::new(self.surface_water.trim()),
      population:      Measurement::new(self.population.trim()),
      created:         self.created,
      edited:          self.edited,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesResponse {
  pub url:              String,
  pub name:             String,
  #[serde(default)]
  pub classification:   String,
  #[serde(default)]
  pub designation:      String,
  #[serde(default)]
  pub average_height:   String,
  #[serde(default)]
  pub average_lifespan: String,
  #[serde(default)]
  pub skin_colors:      String,
  #[serde(default)]
  pub hair_colors:      String,
  #[serde(default)]
  pub eye_colors:       String,
  #[serde(default)]
  pub language:         String,
  #[serde(default)]
  pub homeworld:        Option<String>,
  #[serde(default)]
  pub people:           Vec<String>,
  #[serde(default)]
  pub films:            Vec<String>,
  pub created:          DateTime<Utc>,
  pub edited:           DateTime<Utc>,
}

impl SpeciesResponse {
  pub fn to_record(&self) -> Species {
    Species {
      url:              self.url.clone(),
      name:             self.name.clone(),
      classification:   self.classification.clone(),
      designation:      self.designation.clone(),
      average_height:   Measurement::new(self.average_height.trim()),
      average_lifespan: Measurement::new(self.average_lifespan.trim()),
      skin_colors:      decode_descriptors(&self.skin_colors),
      hair_colors:      decode_descriptors(&self.hair_colors),
      eye_colors:       decode_descriptors(&self.eye_colors),
      language:         self.language.clone(),
      homeworld_url:    homeworld(&self.homeworld),
      created:          self.created,
      edited:           self.edited,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarshipResponse {
  pub url:                    String,
  pub name:                   String,
  #[serde(default)]
  pub model:                  String,
  #[serde(default)]
  pub manufacturer:           String,
  #[serde(default)]
  pub cost_in_credits:        String,
  #[serde(default)]
  pub length:                 String,
  #[serde(default)]
  pub max_atmosphering_speed: String,
  #[serde(default)]
  pub crew:                   String,
  #[serde(default)]
  pub passengers:             String,
  #[serde(default)]
  pub cargo_capacity:         String,
  #[serde(default)]
  pub consumables:            String,
  #[serde(default)]
  pub hyperdrive_rating:      String,
  #[serde(default, rename = "MGLT")]
  pub mglt:                   String,
  #[serde(default)]
  pub starship_class:         String,
  #[serde(default)]
  pub pilots:                 Vec<String>,
  #[serde(default)]
  pub films:                  Vec<String>,
  pub created:                DateTime<Utc>,
  pub edited:                 DateTime<Utc>,
}

impl StarshipResponse {
  pub fn to_record(&self) -> Starship {
    Starship {
      url:                    self.url.clone(),
      name:                   self.name.clone(),
      model:                  self.model.clone(),
      manufacturers:          split_manufacturers(&self.manufacturer),
      cost_in_credits:        Measurement::new(self.cost_in_credits.trim()),
      length:                 Measurement::new(self.length.trim()),
      max_atmosphering_speed: Measurement::new(self.max_atmosphering_speed.trim()),
      crew:                   Measurement::new(self.crew.trim()),
      passengers:             Measurement::new(self.passengers.trim()),
      cargo_capacity:         Measurement::new(self.cargo_capacity.trim()),
      consumables:            self.consumables.clone(),
      hyperdrive_rating:      Measurement::new(self.hyperdrive_rating.trim()),
      mglt:                   Measurement::new(self.mglt.trim()),
      starship_class:         self.starship_class.clone(),
      created:                self.created,
      edited:                 self.edited,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleResponse {
  pub url:                    String,
  pub name:                   String,
  #[serde(default)]
  pub model:                  String,
  #[serde(default)]
  pub manufacturer:           String,
  #[serde(default)]
  pub cost_in_credits:        String,
  #[serde(default)]
  pub length:                 String,
  #[serde(default)]
  pub max_atmosphering_speed: String,
  #[serde(default)]
  pub crew:                   String,
  #[serde(default)]
  pub passengers:             String,
  #[serde(default)]
  pub cargo_capacity:         String,
  #[serde(default)]
  pub consumables:            String,
  #[serde(default)]
  pub vehicle_class:          String,
  #[serde(default)]
  pub pilots:                 Vec<String>,
  #[serde(default)]
  pub films:                  Vec<String>,
  pub created:                DateTime<Utc>,
  pub edited:                 DateTime<Utc>,
}

impl VehicleResponse {
  pub fn to_record(&self) -> Vehicle {
    Vehicle {
      url:                    self.url.clone(),
      name:                   self.name.clone(),
      model:                  self.model.clone(),
      manufacturers:          split_manufacturers(&self.manufacturer),
      cost_in_credits:        Measurement::new(self.cost_in_credits.trim()),
      length:                 Measurement::new(self.length.trim()),
      max_atmosphering_speed: Measurement::new(self.max_atmosphering_speed.trim()),
      crew:                   Measurement::new(self.crew.trim()),
      passengers:             Measurement::new(self.passengers.trim()),
      cargo_capacity:         Measurement::new(self.cargo_capacity.trim()),
      consumables:            self.consumables.clone(),
      vehicle_class:          self.vehicle_class.clone(),
      created:                self.created,
      edited:                 self.edited,
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Six collections of response records, in no assumed fetch order and with
/// no completeness guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
  pub films:     Vec<FilmResponse>,
  pub people:    Vec<PersonResponse>,
  pub planets:   Vec<PlanetResponse>,
  pub species:   Vec<SpeciesResponse>,
  pub starships: Vec<StarshipResponse>,
  pub vehicles:  Vec<VehicleResponse>,
}

impl Snapshot {
  /// Decode a snapshot document. Missing collections are empty.
  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }

  pub fn is_empty(&self) -> bool { self.changed_kinds().is_empty() }

  /// Kinds whose collections are non-empty, in change-batch order.
  pub fn changed_kinds(&self) -> Vec<EntityKind> {
    [
      (EntityKind::Film, self.films.is_empty()),
      (EntityKind::Planet, self.planets.is_empty()),
      (EntityKind::Person, self.people.is_empty()),
      (EntityKind::Species, self.species.is_empty()),
      (EntityKind::Starship, self.starships.is_empty()),
      (EntityKind::Vehicle, self.vehicles.is_empty()),
    ]
    .into_iter()
    .filter(|(_, empty)| !empty)
    .map(|(kind, _)| kind)
    .collect()
  }
}

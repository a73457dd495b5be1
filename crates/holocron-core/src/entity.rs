//! Normalized entity records.
//!
//! Every entity is keyed by its canonical absolute URL. List-valued fields
//! are already decoded; numeric-looking fields keep their original text in a
//! [`Measurement`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::measure::{BirthYear, Gender, Measurement};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The six entity collections. Declaration order is the order change
/// batches list them in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Film,
  Planet,
  Person,
  Species,
  Starship,
  Vehicle,
}

/// Common surface of every entity record.
pub trait Entity {
  const KIND: EntityKind;

  fn url(&self) -> &str;
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
  pub url:           String,
  pub title:         String,
  pub episode_id:    i64,
  pub opening_crawl: String,
  pub director:      String,
  pub producers:     Vec<String>,
  pub release_date:  Option<NaiveDate>,
  pub created:       DateTime<Utc>,
  pub edited:        DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
  pub url:             String,
  pub name:            String,
  /// Hours per local day.
  pub rotation_period: Measurement,
  /// Local days per local year.
  pub orbital_period:  Measurement,
  /// Kilometres.
  pub diameter:        Measurement,
  pub climates:        Vec<String>,
  pub gravity_levels:  Vec<String>,
  pub terrains:        Vec<String>,
  /// Percentage of the surface covered by water.
  pub surface_water:   Measurement,
  pub population:      Measurement,
  pub created:         DateTime<Utc>,
  pub edited:          DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
  pub url:              String,
  pub name:             String,
  pub classification:   String,
  pub designation:      String,
  /// Centimetres.
  pub average_height:   Measurement,
  /// Years.
  pub average_lifespan: Measurement,
  pub skin_colors:      Vec<String>,
  pub hair_colors:      Vec<String>,
  pub eye_colors:       Vec<String>,
  pub language:         String,
  /// `None` when the species has no homeworld in this archive.
  pub homeworld_url:    Option<String>,
  pub created:          DateTime<Utc>,
  pub edited:           DateTime<Utc>,
}

/// A character. Surfaces as `character` in film relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub url:           String,
  pub name:          String,
  /// Centimetres.
  pub height:        Measurement,
  /// Kilograms.
  pub mass:          Measurement,
  pub hair_colors:   Vec<String>,
  pub skin_colors:   Vec<String>,
  pub eye_colors:    Vec<String>,
  pub birth_year:    BirthYear,
  pub gender:        Gender,
  pub homeworld_url: Option<String>,
  pub created:       DateTime<Utc>,
  pub edited:        DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Starship {
  pub url:                    String,
  pub name:                   String,
  pub model:                  String,
  pub manufacturers:          Vec<String>,
  pub cost_in_credits:        Measurement,
  /// Metres.
  pub length:                 Measurement,
  pub max_atmosphering_speed: Measurement,
  pub crew:                   Measurement,
  pub passengers:             Measurement,
  /// Kilograms.
  pub cargo_capacity:         Measurement,
  /// Free text, e.g. `"2 months"`.
  pub consumables:            String,
  pub hyperdrive_rating:      Measurement,
  /// Megalights per hour.
  pub mglt:                   Measurement,
  pub starship_class:         String,
  pub created:                DateTime<Utc>,
  pub edited:                 DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
  pub url:                    String,
  pub name:                   String,
  pub model:                  String,
  pub manufacturers:          Vec<String>,
  pub cost_in_credits:        Measurement,
  pub length:                 Measurement,
  pub max_atmosphering_speed: Measurement,
  pub crew:                   Measurement,
  pub passengers:             Measurement,
  pub cargo_capacity:         Measurement,
  pub consumables:            String,
  pub vehicle_class:          String,
  pub created:                DateTime<Utc>,
  pub edited:                 DateTime<Utc>,
}

macro_rules! impl_entity {
  ($($ty:ty => $kind:ident),* $(,)?) => {
    $(
      impl Entity for $ty {
        const KIND: EntityKind = EntityKind::$kind;

        fn url(&self) -> &str { &self.url }
      }
    )*
  };
}

impl_entity! {
  Film => Film,
  Planet => Planet,
  Person => Person,
  Species => Species,
  Starship => Starship,
  Vehicle => Vehicle,
}

//! Relationship kinds and the read models built from join tables.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Error,
  entity::{Entity, EntityKind, Person, Planet, Species, Starship, Vehicle},
};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The five relationships a film has to other entities.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RelationshipKind {
  Characters,
  Planets,
  Species,
  Starships,
  Vehicles,
}

impl RelationshipKind {
  /// The entity kind on the far side of the relationship.
  pub fn target(self) -> EntityKind {
    match self {
      Self::Characters => EntityKind::Person,
      Self::Planets => EntityKind::Planet,
      Self::Species => EntityKind::Species,
      Self::Starships => EntityKind::Starship,
      Self::Vehicles => EntityKind::Vehicle,
    }
  }

  /// Parse a user-supplied kind, reporting the offending input on failure.
  pub fn parse(raw: &str) -> crate::Result<Self> {
    raw
      .trim()
      .parse()
      .map_err(|_| Error::UnknownRelationshipKind(raw.to_owned()))
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Per-kind relationship counts for one film. All zero for unknown films.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSummary {
  pub character_count: usize,
  pub planet_count:    usize,
  pub species_count:   usize,
  pub starship_count:  usize,
  pub vehicle_count:   usize,
}

impl RelationshipSummary {
  pub fn count(&self, kind: RelationshipKind) -> usize {
    match kind {
      RelationshipKind::Characters => self.character_count,
      RelationshipKind::Planets => self.planet_count,
      RelationshipKind::Species => self.species_count,
      RelationshipKind::Starships => self.starship_count,
      RelationshipKind::Vehicles => self.vehicle_count,
    }
  }

  pub fn total(&self) -> usize {
    self.character_count
      + self.planet_count
      + self.species_count
      + self.starship_count
      + self.vehicle_count
  }
}

// ─── Related entities ────────────────────────────────────────────────────────

/// A fully-hydrated entity reached through a film relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum RelationshipEntity {
  Character(Person),
  Planet(Planet),
  Species(Species),
  Starship(Starship),
  Vehicle(Vehicle),
}

impl RelationshipEntity {
  pub fn url(&self) -> &str {
    match self {
      Self::Character(e) => e.url(),
      Self::Planet(e) => e.url(),
      Self::Species(e) => e.url(),
      Self::Starship(e) => e.url(),
      Self::Vehicle(e) => e.url(),
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Self::Character(e) => &e.name,
      Self::Planet(e) => &e.name,
      Self::Species(e) => &e.name,
      Self::Starship(e) => &e.name,
      Self::Vehicle(e) => &e.name,
    }
  }

  pub fn kind(&self) -> RelationshipKind {
    match self {
      Self::Character(_) => RelationshipKind::Characters,
      Self::Planet(_) => RelationshipKind::Planets,
      Self::Species(_) => RelationshipKind::Species,
      Self::Starship(_) => RelationshipKind::Starships,
      Self::Vehicle(_) => RelationshipKind::Vehicles,
    }
  }
}

/// Everything joined to one character through the person-side tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRelationships {
  pub species:   Vec<Species>,
  pub starships: Vec<Starship>,
  pub vehicles:  Vec<Vehicle>,
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Row counts for every entity and join table in an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveCounts {
  pub films:            usize,
  pub planets:          usize,
  pub people:           usize,
  pub species:          usize,
  pub starships:        usize,
  pub vehicles:         usize,
  pub film_characters:  usize,
  pub film_planets:     usize,
  pub film_species:     usize,
  pub film_starships:   usize,
  pub film_vehicles:    usize,
  pub person_species:   usize,
  pub person_starships: usize,
  pub person_vehicles:  usize,
}

impl ArchiveCounts {
  pub fn entity_rows(&self) -> usize {
    self.films + self.planets + self.people + self.species + self.starships + self.vehicles
  }

  pub fn join_rows(&self) -> usize {
    self.film_characters
      + self.film_planets
      + self.film_species
      + self.film_starships
      + self.film_vehicles
      + self.person_species
      + self.person_starships
      + self.person_vehicles
  }
}

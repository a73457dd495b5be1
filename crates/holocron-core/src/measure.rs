//! Typed views over free-text scalar fields.
//!
//! Upstream data expresses numbers as text and mixes in sentinels
//! (`"unknown"`, `"n/a"`, `"indefinite"`). The original text is kept as-is
//! and interpreted on read; uninterpretable text is an absent value, never
//! an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel spellings that mean "no numeric value".
const SENTINELS: &[&str] = &["unknown", "n/a", "none", "indefinite"];

fn is_sentinel(s: &str) -> bool {
  SENTINELS.iter().any(|sentinel| s.eq_ignore_ascii_case(sentinel))
}

// ─── Measurement ─────────────────────────────────────────────────────────────

/// A numeric-looking text field (height, mass, length, cost, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurement(String);

impl Measurement {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  /// The text exactly as imported.
  pub fn raw(&self) -> &str { &self.0 }

  /// Parse the text as a number. Thousands separators are accepted;
  /// sentinels, ranges, and anything else unparsable give `None`.
  pub fn value(&self) -> Option<f64> {
    let trimmed = self.0.trim();
    if trimmed.is_empty() || is_sentinel(trimmed) {
      return None;
    }
    trimmed
      .replace(',', "")
      .parse::<f64>()
      .ok()
      .filter(|v| v.is_finite())
  }
}

impl From<&str> for Measurement {
  fn from(raw: &str) -> Self { Self::new(raw) }
}

impl From<String> for Measurement {
  fn from(raw: String) -> Self { Self(raw) }
}

impl fmt::Display for Measurement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── BirthYear ───────────────────────────────────────────────────────────────

/// A birth year relative to the Battle of Yavin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BirthYear {
  /// Years before the battle (`"19BBY"`).
  BeforeYavin(f64),
  /// Years after the battle (`"4ABY"`).
  AfterYavin(f64),
  Unknown,
}

impl BirthYear {
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();
    let (number, before) = if let Some(n) = upper.strip_suffix("BBY") {
      (n, true)
    } else if let Some(n) = upper.strip_suffix("ABY") {
      (n, false)
    } else {
      return Self::Unknown;
    };
    match number.trim().parse::<f64>() {
      Ok(years) if years.is_finite() && before => Self::BeforeYavin(years),
      Ok(years) if years.is_finite() => Self::AfterYavin(years),
      _ => Self::Unknown,
    }
  }

  pub fn is_known(&self) -> bool { !matches!(self, Self::Unknown) }
}

impl From<String> for BirthYear {
  fn from(raw: String) -> Self { Self::parse(&raw) }
}

impl From<BirthYear> for String {
  fn from(year: BirthYear) -> Self { year.to_string() }
}

impl fmt::Display for BirthYear {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BeforeYavin(years) => write!(f, "{years}BBY"),
      Self::AfterYavin(years) => write!(f, "{years}ABY"),
      Self::Unknown => f.write_str("unknown"),
    }
  }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
  Male,
  Female,
  Hermaphrodite,
  /// Droids and other characters for which gender does not apply.
  NotApplicable,
  Other(String),
}

impl Gender {
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
      "male" => Self::Male,
      "female" => Self::Female,
      "hermaphrodite" => Self::Hermaphrodite,
      "n/a" | "none" => Self::NotApplicable,
      _ => Self::Other(trimmed.to_owned()),
    }
  }
}

impl From<String> for Gender {
  fn from(raw: String) -> Self { Self::parse(&raw) }
}

impl From<Gender> for String {
  fn from(gender: Gender) -> Self { gender.to_string() }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Male => f.write_str("male"),
      Self::Female => f.write_str("female"),
      Self::Hermaphrodite => f.write_str("hermaphrodite"),
      Self::NotApplicable => f.write_str(crate::descriptor::NOT_APPLICABLE),
      Self::Other(other) => f.write_str(other),
    }
  }
}

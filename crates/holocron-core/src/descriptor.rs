//! Delimited-list codecs.
//!
//! Several upstream fields carry lists as one comma-separated string
//! (colours, climates, terrains, producers, manufacturers). They are stored
//! the same way and split back into lists on read. These are pure functions;
//! nothing here touches storage.

/// Separator written between list items.
pub const LIST_SEPARATOR: &str = ", ";

/// The upstream "not applicable" marker for descriptor fields.
pub const NOT_APPLICABLE: &str = "n/a";

/// Segments that belong to the preceding manufacturer name rather than
/// starting a new one (`"Gallofree Yards, Inc."`).
const CORPORATE_SUFFIXES: &[&str] =
  &["inc", "inc.", "incorporated", "ltd", "ltd.", "llc", "co", "co.", "corp", "corp."];

/// Join items into their stored form, dropping blank entries.
pub fn encode_list<S: AsRef<str>>(items: &[S]) -> String {
  items
    .iter()
    .map(|s| s.as_ref().trim())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(LIST_SEPARATOR)
}

/// Split a stored list on commas, trimming each item and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Decode a descriptor list (colours, climates, terrains, gravity levels).
///
/// A list whose only segment is the not-applicable marker collapses to an
/// empty list. Mixed lists such as `"n/a, blue"` are kept as written.
pub fn decode_descriptors(raw: &str) -> Vec<String> {
  let items = split_list(raw);
  match items.as_slice() {
    [only] if only.eq_ignore_ascii_case(NOT_APPLICABLE) => Vec::new(),
    _ => items,
  }
}

/// Split a manufacturer field into individual company names.
///
/// Corporate suffix segments are re-attached to the preceding name, so
/// `"Gallofree Yards, Inc."` stays one manufacturer.
pub fn split_manufacturers(raw: &str) -> Vec<String> {
  let mut names: Vec<String> = Vec::new();
  for segment in split_list(raw) {
    let is_suffix = CORPORATE_SUFFIXES
      .iter()
      .any(|suffix| segment.eq_ignore_ascii_case(suffix));
    match names.last_mut() {
      Some(previous) if is_suffix => {
        previous.push_str(LIST_SEPARATOR);
        previous.push_str(&segment);
      }
      _ => names.push(segment),
    }
  }
  names
}

use std::{
  char::{ToLowercase, ToUppercase},
  collections::{BTreeSet, HashSet},
  iter::Peekable,
  sync::LazyLock,
};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

pub(crate) static FORBIDDEN_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen", "self", "Self",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());
static GRAPHQL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

/// Transliterates to ASCII, replaces invalid characters with underscores,
/// collapses consecutive underscores and trims leading or trailing ones.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Ensures a name is unique within a set of used names, appending a numeric suffix if needed.
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  let mut i = 2;
  loop {
    let new_name = format!("{base_name}{i}");
    if !used_names.contains(&new_name) {
      return new_name;
    }
    i += 1;
  }
}

pub(crate) fn is_graphql_name(name: &str) -> bool {
  GRAPHQL_NAME_RE.is_match(name) && !name.starts_with("__")
}

/// Converts a string into a valid Rust field or method name (`snake_case`).
///
/// Keywords get a raw identifier prefix, `self` becomes `self_`, a leading digit
/// is prefixed with `_` and an empty result becomes `_`.
pub(crate) fn to_rust_field_name(name: &str) -> String {
  let mut ident = sanitize(name).to_snake_case();

  if ident.is_empty() {
    return "_".to_string();
  }

  if ident == "self" {
    return "self_".to_string();
  }

  if FORBIDDEN_IDENTIFIERS.contains(ident.as_str()) {
    return format!("r#{ident}");
  }

  prefix_if_digit_start(&mut ident, '_');
  ident
}

/// Converts a string into a GraphQL type name (`PascalCase`).
///
/// Names that are already valid GraphQL names with mixed case are kept as
/// written so component schemas such as `HTTPError` survive untouched. Anything
/// else is split on non-alphanumeric boundaries and capitalized word by word.
/// A leading digit is prefixed with `T`; an empty result becomes `Unnamed`.
pub(crate) fn to_graphql_type_name(name: &str) -> String {
  let has_upper = name.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = name.chars().any(|c| c.is_ascii_lowercase());

  if is_graphql_name(name) && !name.contains('_') && has_upper && has_lower {
    let mut chars = name.chars();
    return match chars.next() {
      Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
      None => "Unnamed".to_string(),
    };
  }

  let mut ident: String = any_ascii(name)
    .chars()
    .capitalize_words_with_boundaries()
    .filter(char::is_ascii_alphanumeric)
    .collect();

  if ident.is_empty() {
    return "Unnamed".to_string();
  }

  prefix_if_digit_start(&mut ident, 'T');
  ident
}

/// Converts a string into a GraphQL field name (`camelCase`).
pub(crate) fn to_graphql_field_name(name: &str) -> String {
  if is_graphql_name(name) {
    return name.to_string();
  }

  let mut ident = sanitize(name).to_camel_case();
  if ident.is_empty() {
    return "unnamed".to_string();
  }
  prefix_if_digit_start(&mut ident, '_');
  ident
}

/// GraphQL field names for a set of JSON keys, in input order. Keys that are
/// already valid names keep them; converted keys that would clash with an
/// earlier name get a numeric suffix.
pub(crate) fn to_graphql_field_names<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
  let keys = keys.into_iter().collect::<Vec<_>>();
  let mut taken = keys
    .iter()
    .filter(|key| is_graphql_name(key))
    .map(|key| (*key).to_string())
    .collect::<BTreeSet<_>>();

  keys
    .into_iter()
    .map(|key| {
      if is_graphql_name(key) {
        return key.to_string();
      }
      let field = ensure_unique(&to_graphql_field_name(key), &taken);
      taken.insert(field.clone());
      field
    })
    .collect()
}

/// Converts an API name into the `snake_case` name of its `@source`.
pub(crate) fn to_source_name(name: &str) -> String {
  let ident = sanitize(name).to_snake_case();
  if ident.is_empty() { "api".to_string() } else { ident }
}

fn prefix_if_digit_start(ident: &mut String, prefix: char) {
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, prefix);
  }
}

/// An extension trait for char iterators to add word capitalization.
pub trait CapitalizeWordsExt: Iterator<Item = char> {
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized;
}

impl<I> CapitalizeWordsExt for I
where
  I: Iterator<Item = char>,
{
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized,
  {
    CapitalizeWordsWithBoundaries {
      iter: self.peekable(),
      capitalize_next: true,
      prev_was_lower: false,
      pending_upper: None,
      pending_lower: None,
    }
  }
}

/// Upper-cases the first letter of every word and lower-cases the rest. A word
/// starts after a non-alphanumeric character or at a lower-to-upper transition.
pub struct CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  iter: Peekable<I>,
  capitalize_next: bool,
  prev_was_lower: bool,
  pending_upper: Option<ToUppercase>,
  pending_lower: Option<ToLowercase>,
}

impl<I> Iterator for CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  type Item = char;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(upper_iter) = self.pending_upper.as_mut() {
      if let Some(c) = upper_iter.next() {
        return Some(c);
      }
      self.pending_upper = None;
    }

    if let Some(lower_iter) = self.pending_lower.as_mut() {
      if let Some(c) = lower_iter.next() {
        return Some(c);
      }
      self.pending_lower = None;
    }

    let c = self.iter.next()?;

    if !c.is_ascii_alphanumeric() {
      self.capitalize_next = self.iter.peek().is_some_and(char::is_ascii_alphanumeric);
      self.prev_was_lower = false;
      return Some(c);
    }

    let is_upper = c.is_ascii_uppercase();
    let should_capitalize = self.capitalize_next
      || (self.prev_was_lower && is_upper)
      || (is_upper && self.iter.peek().is_some_and(char::is_ascii_lowercase));

    self.prev_was_lower = c.is_ascii_lowercase();
    self.capitalize_next = false;

    if should_capitalize {
      let mut upper = c.to_uppercase();
      let first = upper.next();
      self.pending_upper = Some(upper);
      first
    } else {
      let mut lower = c.to_lowercase();
      let first = lower.next();
      self.pending_lower = Some(lower);
      first
    }
  }
}

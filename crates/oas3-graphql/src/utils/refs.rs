const COMPONENTS_PREFIX: &str = "#/components/";

/// Parses an internal `$ref` of the form `#/components/{section}/{name}` and
/// returns the decoded component name.
///
/// Returns `None` for external references, references into other sections and
/// pointers that do not name a single component. JSON Pointer escapes (`~1` for
/// `/`, `~0` for `~`) are decoded.
pub fn parse_component_ref(ref_path: &str, section: &str) -> Option<String> {
  let name = ref_path
    .strip_prefix(COMPONENTS_PREFIX)?
    .strip_prefix(section)?
    .strip_prefix('/')?;

  if name.is_empty() || name.contains('/') {
    return None;
  }

  Some(name.replace("~1", "/").replace("~0", "~"))
}

/// Extracts the schema name from a `#/components/schemas/{name}` reference.
pub fn parse_schema_ref_path(ref_path: &str) -> Option<String> {
  parse_component_ref(ref_path, "schemas")
}

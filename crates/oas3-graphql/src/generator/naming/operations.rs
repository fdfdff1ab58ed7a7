use inflections::Inflect;

use crate::generator::naming::identifiers::{sanitize, to_graphql_field_name, to_graphql_type_name};

const ROOT_RESPONSE_NAME: &str = "Root";

/// Returns the GraphQL field name for an operation: its `operationId` when
/// declared, otherwise one derived from the method and path.
pub fn compute_field_name<S>(method: S, path: S, operation_id: Option<S>) -> String
where
  S: AsRef<str>,
{
  operation_id.map_or_else(
    || generate_operation_id(method, path),
    |id| to_graphql_field_name(id.as_ref()),
  )
}

/// Derives a `camelCase` identifier from a method and path, turning templated
/// segments into `by_{param}` (e.g. `GET /pets/{petId}` => `getPetsByPetId`).
pub(crate) fn generate_operation_id<S>(method: S, path: S) -> String
where
  S: AsRef<str>,
{
  let path_parts = path
    .as_ref()
    .split('/')
    .filter(|s| !s.is_empty())
    .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
      Some(param) => format!("by_{}", sanitize(param).to_snake_case()),
      None => sanitize(s),
    })
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>();

  let method = method.as_ref().to_lowercase();
  if path_parts.is_empty() {
    method
  } else {
    format!("{method}_{}", path_parts.join("_")).to_camel_case()
  }
}

/// Base name for the type hoisted out of an inline response body, built from
/// the path segments with template braces removed (`/items/{id}` => `ItemsId`).
pub fn response_type_name(path: &str) -> String {
  if !path.chars().any(|c| c.is_ascii_alphanumeric()) {
    return ROOT_RESPONSE_NAME.to_string();
  }
  to_graphql_type_name(path)
}

use std::collections::BTreeSet;

use http::Method;
use indexmap::IndexMap;
use mediatype::{MediaType, names};

use crate::{
  generator::{
    document::{ObjectOrReference, OpenApiDocument, Operation, Parameter, ParameterIn, Response},
    metrics::{GenerationStats, GenerationWarning},
    naming::{
      identifiers::{ensure_unique, to_graphql_field_name, to_graphql_field_names},
      operations::compute_field_name,
    },
    schema::{ScalarKind, SchemaNode},
  },
  utils::parse_component_ref,
};

/// One operation parameter with its reference already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
  pub name: String,
  /// GraphQL argument name, unique within the operation.
  pub argument: String,
  pub location: ParameterIn,
  pub required: bool,
  pub schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDescriptor {
  Declared(SchemaNode),
  Absent,
}

/// An operation exposed as a single GraphQL field.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
  /// Unique GraphQL field name.
  pub id: String,
  pub method: Method,
  pub path: String,
  pub summary: Option<String>,
  pub parameters: Vec<ParameterDescriptor>,
  pub responses: IndexMap<String, ResponseDescriptor>,
}

/// GET operations of a document in path order. Operations with other
/// methods are reported and left out.
#[derive(Debug, Default)]
pub(crate) struct OperationRegistry {
  operations: Vec<OperationDescriptor>,
}

impl OperationRegistry {
  pub(crate) fn new(document: &OpenApiDocument, stats: &mut GenerationStats) -> Self {
    let mut registry = Self::default();
    let mut taken = BTreeSet::new();

    for (path, item) in document.paths.iter().flatten() {
      let item = match item.as_result() {
        Ok(item) => item,
        Err(error) => {
          stats.record_warning(GenerationWarning::InvalidPathItem {
            path: path.clone(),
            error: error.to_string(),
          });
          continue;
        }
      };

      for (method, operation) in item.methods() {
        stats.record_operation();

        if method != Method::GET {
          stats.record_warning(GenerationWarning::UnsupportedMethod {
            method: method.to_string(),
            path: path.clone(),
          });
          continue;
        }

        let operation = match operation.as_result() {
          Ok(operation) => operation,
          Err(error) => {
            stats.record_warning(GenerationWarning::InvalidOperation {
              method: method.to_string(),
              path: path.clone(),
              error: error.to_string(),
            });
            continue;
          }
        };

        let base_id = compute_field_name(method.as_str(), path.as_str(), operation.operation_id.as_deref());
        let id = ensure_unique(&base_id, &taken);
        taken.insert(id.clone());
        if id != base_id {
          stats.record_warning(GenerationWarning::RenamedOperation {
            original: base_id,
            renamed: id.clone(),
          });
        }

        let parameters = collect_parameters(document, &id, &item.parameters, operation, stats);
        let responses = collect_responses(document, operation);

        registry.operations.push(OperationDescriptor {
          id,
          method,
          path: path.clone(),
          summary: operation.summary.clone(),
          parameters,
          responses,
        });
      }
    }

    registry
  }

  pub(crate) fn operations(&self) -> &[OperationDescriptor] {
    &self.operations
  }
}

fn resolve_parameter<'a>(
  document: &'a OpenApiDocument,
  parameter: &'a ObjectOrReference<Parameter>,
) -> Result<&'a Parameter, String> {
  match parameter {
    ObjectOrReference::Object(parameter) => Ok(parameter),
    ObjectOrReference::Ref { ref_path } => {
      match parse_component_ref(ref_path, "parameters").and_then(|name| document.component_parameter(&name)) {
        Some(ObjectOrReference::Object(parameter)) => Ok(parameter),
        _ => Err(ref_path.clone()),
      }
    }
  }
}

/// Path-level parameters come first; an operation-level parameter with the
/// same name and location replaces its path-level counterpart.
fn collect_parameters(
  document: &OpenApiDocument,
  operation_id: &str,
  path_parameters: &[ObjectOrReference<Parameter>],
  operation: &Operation,
  stats: &mut GenerationStats,
) -> Vec<ParameterDescriptor> {
  let mut by_key = IndexMap::<(String, ParameterIn), ParameterDescriptor>::new();

  for parameter in path_parameters.iter().chain(&operation.parameters) {
    let parameter = match resolve_parameter(document, parameter) {
      Ok(parameter) => parameter,
      Err(reference) => {
        stats.record_warning(GenerationWarning::unresolved_reference(
          operation_id,
          &["parameters".to_string()],
          &reference,
        ));
        continue;
      }
    };

    let descriptor = ParameterDescriptor {
      name: parameter.name.clone(),
      argument: String::new(),
      location: parameter.location,
      required: parameter.required || parameter.location == ParameterIn::Path,
      schema: parameter
        .schema
        .as_ref()
        .map_or(SchemaNode::Primitive(ScalarKind::Any), SchemaNode::from),
    };
    by_key.insert((descriptor.name.clone(), descriptor.location), descriptor);
  }

  let mut names = BTreeSet::new();
  let mut parameters = by_key
    .into_values()
    .filter(|param| {
      let unique = names.insert(param.name.clone());
      if !unique {
        stats.record_warning(GenerationWarning::DuplicateParameter {
          operation_id: operation_id.to_string(),
          name: param.name.clone(),
        });
      }
      unique
    })
    .collect::<Vec<_>>();

  let arguments = to_graphql_field_names(parameters.iter().map(|param| param.name.as_str()));
  for (param, argument) in parameters.iter_mut().zip(arguments) {
    if argument != to_graphql_field_name(&param.name) {
      stats.record_warning(GenerationWarning::RenamedField {
        owner: operation_id.to_string(),
        property: param.name.clone(),
        field: argument.clone(),
      });
    }
    param.argument = argument;
  }
  parameters
}

fn resolve_response<'a>(document: &'a OpenApiDocument, response: &'a ObjectOrReference<Response>) -> Option<&'a Response> {
  match response {
    ObjectOrReference::Object(response) => Some(response),
    ObjectOrReference::Ref { ref_path } => {
      match document.component_response(&parse_component_ref(ref_path, "responses")?)? {
        ObjectOrReference::Object(response) => Some(response),
        ObjectOrReference::Ref { .. } => None,
      }
    }
  }
}

fn is_json_media_type(media_type: &str) -> bool {
  MediaType::parse(media_type).is_ok_and(|parsed| parsed.subty == names::JSON || parsed.suffix == Some(names::JSON))
}

/// Picks the schema of the first JSON media type, or of the first media type
/// when none is JSON.
fn response_schema(response: &Response) -> Option<SchemaNode> {
  let media = response
    .content
    .iter()
    .find(|(media_type, _)| is_json_media_type(media_type))
    .or_else(|| response.content.first())
    .map(|(_, media)| media)?;
  media.schema.as_ref().map(SchemaNode::from)
}

fn collect_responses(document: &OpenApiDocument, operation: &Operation) -> IndexMap<String, ResponseDescriptor> {
  operation
    .responses
    .iter()
    .map(|(status, response)| {
      let descriptor = resolve_response(document, response)
        .and_then(response_schema)
        .map_or(ResponseDescriptor::Absent, ResponseDescriptor::Declared);
      (status.clone(), descriptor)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn registry(value: serde_json::Value) -> (OperationRegistry, GenerationStats) {
    let document = OpenApiDocument::from_value(value).unwrap();
    let mut stats = GenerationStats::default();
    let registry = OperationRegistry::new(&document, &mut stats);
    (registry, stats)
  }

  #[test]
  fn test_only_get_operations_are_registered() {
    let (registry, stats) = registry(json!({
      "paths": {
        "/pets": {
          "get": { "operationId": "listPets", "responses": {} },
          "post": { "operationId": "createPet", "responses": {} }
        }
      }
    }));

    let ids = registry.operations().iter().map(|op| op.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["listPets"]);
    assert_eq!(stats.operations_total, 2);
    assert_eq!(
      stats.warnings,
      [GenerationWarning::UnsupportedMethod {
        method: "POST".to_string(),
        path: "/pets".to_string(),
      }]
    );
  }

  #[test]
  fn test_malformed_entries_skip_only_themselves() {
    let (registry, stats) = registry(json!({
      "paths": {
        "/owners": {
          "get": {
            "operationId": "listOwners",
            "parameters": [{ "name": "owner", "in": "body" }],
            "responses": {}
          }
        },
        "/broken": { "parameters": "nope" },
        "/pets": { "get": { "operationId": "listPets", "responses": {} } }
      }
    }));

    let ids = registry.operations().iter().map(|op| op.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["listPets"]);
    assert_eq!(stats.operations_total, 2);
    assert!(matches!(
      &stats.warnings[0],
      GenerationWarning::InvalidOperation { method, path, error }
        if method == "GET" && path == "/owners" && error.starts_with("at `parameters[0]`")
    ));
    assert!(matches!(
      &stats.warnings[1],
      GenerationWarning::InvalidPathItem { path, .. } if path == "/broken"
    ));
    assert_eq!(stats.warnings.len(), 2);
  }

  #[test]
  fn test_colliding_ids_are_made_unique() {
    let (registry, stats) = registry(json!({
      "paths": {
        "/pets": { "get": { "operationId": "pets", "responses": {} } },
        "/animals": { "get": { "operationId": "pets", "responses": {} } }
      }
    }));

    let ids = registry.operations().iter().map(|op| op.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["pets", "pets2"]);
    assert!(matches!(
      &stats.warnings[0],
      GenerationWarning::RenamedOperation { renamed, .. } if renamed == "pets2"
    ));
  }

  #[test]
  fn test_parameters_merge_and_resolve_refs() {
    let (registry, stats) = registry(json!({
      "paths": {
        "/pets/{petId}": {
          "parameters": [
            { "name": "petId", "in": "path", "schema": { "type": "string" } },
            { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
          ],
          "get": {
            "operationId": "getPet",
            "parameters": [
              { "$ref": "#/components/parameters/Limit" },
              { "name": "verbose", "in": "query", "required": true, "schema": { "type": "boolean" } },
              { "$ref": "#/components/parameters/Missing" }
            ],
            "responses": {}
          }
        }
      },
      "components": {
        "schemas": {},
        "parameters": {
          "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
        }
      }
    }));

    let operation = &registry.operations()[0];
    let params = operation
      .parameters
      .iter()
      .map(|param| (param.name.as_str(), param.location, param.required))
      .collect::<Vec<_>>();
    assert_eq!(
      params,
      [
        ("petId", ParameterIn::Path, true),
        ("verbose", ParameterIn::Query, true),
        ("limit", ParameterIn::Query, false),
      ]
    );
    assert!(matches!(
      &stats.warnings[0],
      GenerationWarning::UnresolvedReference { reference, .. } if reference == "#/components/parameters/Missing"
    ));
  }

  #[test]
  fn test_clashing_argument_names_are_suffixed() {
    let (registry, stats) = registry(json!({
      "paths": {
        "/pets": {
          "get": {
            "operationId": "listPets",
            "parameters": [
              { "name": "page-size", "in": "query", "schema": { "type": "integer" } },
              { "name": "pageSize", "in": "header", "schema": { "type": "integer" } }
            ],
            "responses": {}
          }
        }
      }
    }));

    let arguments = registry.operations()[0]
      .parameters
      .iter()
      .map(|param| (param.name.as_str(), param.argument.as_str()))
      .collect::<Vec<_>>();
    assert_eq!(arguments, [("page-size", "pageSize2"), ("pageSize", "pageSize")]);
    assert_eq!(
      stats.warnings,
      [GenerationWarning::RenamedField {
        owner: "listPets".to_string(),
        property: "page-size".to_string(),
        field: "pageSize2".to_string(),
      }]
    );
  }

  #[test]
  fn test_duplicate_parameter_names_are_dropped() {
    let (registry, stats) = registry(json!({
      "paths": {
        "/pets": {
          "get": {
            "operationId": "listPets",
            "parameters": [
              { "name": "id", "in": "query", "schema": { "type": "string" } },
              { "name": "id", "in": "header", "schema": { "type": "string" } }
            ],
            "responses": {}
          }
        }
      }
    }));

    assert_eq!(registry.operations()[0].parameters.len(), 1);
    assert_eq!(
      stats.warnings,
      [GenerationWarning::DuplicateParameter {
        operation_id: "listPets".to_string(),
        name: "id".to_string(),
      }]
    );
  }

  #[test]
  fn test_responses_prefer_json_and_resolve_refs() {
    let (registry, _) = registry(json!({
      "paths": {
        "/pets": {
          "get": {
            "operationId": "listPets",
            "responses": {
              "200": {
                "description": "ok",
                "content": {
                  "text/plain": { "schema": { "type": "string" } },
                  "application/vnd.pets+json": { "schema": { "type": "integer" } }
                }
              },
              "404": { "$ref": "#/components/responses/NotFound" },
              "500": { "description": "no body" }
            }
          }
        }
      },
      "components": {
        "schemas": {},
        "responses": {
          "NotFound": {
            "description": "missing",
            "content": { "application/json": { "schema": { "type": "boolean" } } }
          }
        }
      }
    }));

    let responses = &registry.operations()[0].responses;
    assert_eq!(
      responses["200"],
      ResponseDescriptor::Declared(SchemaNode::Primitive(ScalarKind::Integer))
    );
    assert_eq!(
      responses["404"],
      ResponseDescriptor::Declared(SchemaNode::Primitive(ScalarKind::Boolean))
    );
    assert_eq!(responses["500"], ResponseDescriptor::Absent);
  }
}

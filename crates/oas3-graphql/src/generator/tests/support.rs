use crate::generator::{
  document::{ComponentSchemas, OpenApiDocument},
  orchestrator::{GeneratedOutput, GraphqlConfig, Orchestrator},
  responses::OverrideSamples,
  schema_registry::{SchemaRegistry, SchemaRegistryBuilder},
};

pub(super) fn parse_document(value: serde_json::Value) -> OpenApiDocument {
  OpenApiDocument::from_value(value).expect("failed to parse test document")
}

/// Config with an empty namespace so type names appear exactly as declared.
pub(super) fn bare_config(api_name: &str) -> GraphqlConfig {
  GraphqlConfig::builder().api_name(api_name).namespace(String::new()).build()
}

pub(super) fn generate(value: serde_json::Value) -> GeneratedOutput {
  generate_with_samples(value, OverrideSamples::default())
}

pub(super) fn generate_with_samples(value: serde_json::Value, samples: OverrideSamples) -> GeneratedOutput {
  Orchestrator::new(parse_document(value), bare_config("items"))
    .with_samples(samples)
    .generate()
    .expect("generation failed")
}

/// A document with one GET operation per `(path, operationId, 200 schema)`
/// and the given component schemas.
pub(super) fn document_with(
  operations: &[(&str, &str, serde_json::Value)],
  schemas: serde_json::Value,
) -> serde_json::Value {
  let paths = operations
    .iter()
    .map(|(path, operation_id, schema)| {
      let operation = serde_json::json!({
        "operationId": operation_id,
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": schema } }
          }
        }
      });
      ((*path).to_string(), serde_json::json!({ "get": operation }))
    })
    .collect::<serde_json::Map<_, _>>();

  serde_json::json!({
    "openapi": "3.0.0",
    "info": { "title": "Items", "version": "1.0.0" },
    "paths": paths,
    "components": { "schemas": schemas }
  })
}

pub(super) fn components(schemas: serde_json::Value) -> ComponentSchemas {
  serde_json::from_value(schemas).expect("invalid component schemas")
}

pub(super) fn registry_builder(schemas: serde_json::Value) -> SchemaRegistryBuilder {
  SchemaRegistry::builder(&components(schemas))
}

pub(super) fn registry(schemas: serde_json::Value) -> SchemaRegistry {
  registry_builder(schemas).build()
}

/// The lines of the `Query` type, without the surrounding braces.
pub(super) fn query_block(graphql: &str) -> &str {
  let start = graphql.find("type Query {\n").expect("no Query type") + "type Query {\n".len();
  let end = graphql[start..].find("\n}\n").expect("unterminated Query type") + start;
  &graphql[start..end]
}

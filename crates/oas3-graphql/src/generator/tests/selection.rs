use serde_json::json;

use super::support::registry;
use crate::generator::{
  metrics::GenerationWarning,
  schema::{ScalarKind, SchemaNode},
  selection::{ReachableTypes, SelectionBuilder, selection_key},
};

fn pets() -> serde_json::Value {
  json!({
    "Pet": {
      "type": "object",
      "properties": {
        "id": { "type": "integer" },
        "tag": { "$ref": "#/components/schemas/Tag" },
        "owner": { "$ref": "#/components/schemas/Owner" },
        "nicknames": { "type": "array", "items": { "type": "string" } }
      }
    },
    "Owner": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Tag": { "type": "string" },
    "Unrelated": { "type": "object", "properties": { "x": { "type": "string" } } }
  })
}

#[test]
fn test_build_nests_composite_fields() {
  let registry = registry(pets());
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "listPets");

  let lines = builder.build(&SchemaNode::array(SchemaNode::reference("Pet")), 0);
  assert_eq!(lines, ["id", "tag", "owner {", "  name", "}", "nicknames"]);
  assert!(builder.into_diagnostics().is_empty());

  for name in ["Pet", "Owner", "Tag"] {
    assert!(reachable.contains(name), "{name} should be reachable");
  }
  assert!(!reachable.contains("Unrelated"));
}

#[test]
fn test_build_indents_by_level() {
  let registry = registry(pets());
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "getOwner");

  let lines = builder.build(&SchemaNode::reference("Owner"), 2);
  assert_eq!(lines, ["    name"]);
}

#[test]
fn test_scalar_response_falls_back_to_id() {
  let registry = registry(json!({}));
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "count");

  assert_eq!(builder.build(&SchemaNode::Primitive(ScalarKind::Integer), 1), ["  id"]);
  assert_eq!(
    builder.build(&SchemaNode::object(Vec::<(String, SchemaNode)>::new(), &[]), 0),
    ["id"]
  );
}

#[test]
fn test_unresolved_root_is_reported() {
  let registry = registry(json!({}));
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "getThing");

  assert_eq!(builder.build(&SchemaNode::reference("Thing"), 0), ["id"]);
  assert_eq!(
    builder.into_diagnostics(),
    [GenerationWarning::UnresolvedReference {
      operation_id: "getThing".to_string(),
      field_path: "<response>".to_string(),
      reference: "Thing".to_string(),
    }]
  );
  assert!(!reachable.contains("Thing"));
}

#[test]
fn test_alias_cycle_terminates() {
  let registry = registry(json!({
    "Ping": { "$ref": "#/components/schemas/Pong" },
    "Pong": { "$ref": "#/components/schemas/Ping" }
  }));
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "ping");

  assert_eq!(builder.build(&SchemaNode::reference("Ping"), 0), ["id"]);
  assert!(matches!(
    builder.into_diagnostics().as_slice(),
    [GenerationWarning::CyclicReference { reference, .. }] if reference == "Ping"
  ));
}

#[test]
fn test_selection_key_aliases_invalid_names() {
  assert_eq!(selection_key("name", "name"), "name");
  assert_eq!(selection_key("created_at", "created_at"), "created_at");
  assert_eq!(selection_key("xRateLimit", "x-rate-limit"), "xRateLimit: \"x-rate-limit\"");
  assert_eq!(selection_key("_2fa", "2fa"), "_2fa: \"2fa\"");
}

#[test]
fn test_clashing_properties_are_aliased_apart() {
  let registry = registry(json!({
    "Person": {
      "type": "object",
      "properties": {
        "first-name": { "type": "string" },
        "firstName": { "type": "string" }
      }
    }
  }));
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "getPerson");

  assert_eq!(
    builder.build(&SchemaNode::reference("Person"), 0),
    ["firstName2: \"first-name\"", "firstName"]
  );
}

#[test]
fn test_recursive_union_field_still_reaches_other_members() {
  let registry = registry(json!({
    "Node": {
      "type": "object",
      "properties": {
        "id": { "type": "integer" },
        "link": {
          "oneOf": [
            { "$ref": "#/components/schemas/Node" },
            { "$ref": "#/components/schemas/Leaf" }
          ]
        }
      }
    },
    "Leaf": {
      "type": "object",
      "properties": { "tag": { "$ref": "#/components/schemas/Tag" } }
    },
    "Tag": { "type": "object", "properties": { "label": { "type": "string" } } }
  }));
  let mut reachable = ReachableTypes::default();
  let mut builder = SelectionBuilder::new(&registry, &mut reachable, "getNode");

  assert_eq!(builder.build(&SchemaNode::reference("Node"), 0), ["id"]);
  assert!(matches!(
    builder.into_diagnostics().as_slice(),
    [GenerationWarning::CyclicReference { reference, .. }] if reference == "Node"
  ));
  for name in ["Node", "Leaf", "Tag"] {
    assert!(reachable.contains(name), "{name} should be reachable");
  }
}

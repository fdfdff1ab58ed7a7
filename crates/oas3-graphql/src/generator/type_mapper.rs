use indexmap::IndexMap;

use crate::generator::{
  naming::identifiers::to_graphql_type_name,
  schema::{ScalarKind, SchemaNode},
};

pub(crate) fn graphql_scalar(kind: ScalarKind) -> &'static str {
  match kind {
    ScalarKind::Integer => "Int",
    ScalarKind::Float => "Float",
    ScalarKind::Boolean => "Boolean",
    ScalarKind::String | ScalarKind::Any => "String",
  }
}

/// Maps schema nodes to GraphQL type expressions. Every named type gets the
/// namespace prefix; nullability is left to the caller.
#[derive(Debug, Clone)]
pub(crate) struct TypeMapper {
  namespace: String,
  type_names: IndexMap<String, String>,
}

impl TypeMapper {
  pub(crate) fn new(namespace: impl Into<String>) -> Self {
    Self {
      namespace: namespace.into(),
      type_names: IndexMap::new(),
    }
  }

  /// Uses the registry's collision-free names instead of normalizing schema
  /// names on the fly.
  #[must_use]
  pub(crate) fn with_type_names(mut self, type_names: &IndexMap<String, String>) -> Self {
    self.type_names.clone_from(type_names);
    self
  }

  pub(crate) fn namespace(&self) -> &str {
    &self.namespace
  }

  /// The emitted name of a registry entry.
  pub(crate) fn type_name(&self, schema_name: &str) -> String {
    match self.type_names.get(schema_name) {
      Some(type_name) => format!("{}{type_name}", self.namespace),
      None => format!("{}{}", self.namespace, to_graphql_type_name(schema_name)),
    }
  }

  pub(crate) fn map_type(&self, node: &SchemaNode) -> String {
    match node {
      SchemaNode::Reference(name) => self.type_name(name),
      SchemaNode::Array(item) => format!("[{}]", self.map_type(item)),
      SchemaNode::Union(members) => members
        .iter()
        .map(|member| self.map_type(member))
        .collect::<Vec<_>>()
        .join(" | "),
      SchemaNode::Primitive(kind) => graphql_scalar(*kind).to_string(),
      SchemaNode::Object(_) => graphql_scalar(ScalarKind::Any).to_string(),
    }
  }

  /// A field or argument type, with `!` when required.
  pub(crate) fn field_type(&self, node: &SchemaNode, required: bool) -> String {
    let mapped = self.map_type(node);
    if required { format!("{mapped}!") } else { mapped }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_map_type_precedence() {
    let mapper = TypeMapper::new("Petstore");
    let cases = [
      (SchemaNode::reference("Pet"), "PetstorePet"),
      (SchemaNode::reference("pet-owner"), "PetstorePetOwner"),
      (SchemaNode::array(SchemaNode::reference("Pet")), "[PetstorePet]"),
      (
        SchemaNode::array(SchemaNode::array(SchemaNode::Primitive(ScalarKind::Float))),
        "[[Float]]",
      ),
      (
        SchemaNode::Union(vec![SchemaNode::reference("Cat"), SchemaNode::reference("Dog")]),
        "PetstoreCat | PetstoreDog",
      ),
      (SchemaNode::Primitive(ScalarKind::Integer), "Int"),
      (SchemaNode::Primitive(ScalarKind::Boolean), "Boolean"),
      (SchemaNode::Primitive(ScalarKind::Any), "String"),
      (SchemaNode::object([("id", SchemaNode::Primitive(ScalarKind::Integer))], &[]), "String"),
    ];

    for (node, expected) in cases {
      assert_eq!(mapper.map_type(&node), expected, "mapping {node:?}");
    }
  }

  #[test]
  fn test_type_names_come_from_the_table() {
    let type_names = IndexMap::from([
      ("pet".to_string(), "Pet2".to_string()),
      ("Pet".to_string(), "Pet".to_string()),
    ]);
    let mapper = TypeMapper::new("Zoo").with_type_names(&type_names);

    assert_eq!(mapper.map_type(&SchemaNode::reference("pet")), "ZooPet2");
    assert_eq!(mapper.map_type(&SchemaNode::reference("Pet")), "ZooPet");
    assert_eq!(mapper.type_name("pet_owner"), "ZooPetOwner");
  }

  #[test]
  fn test_field_type_adds_required_marker() {
    let mapper = TypeMapper::new("");
    let node = SchemaNode::Primitive(ScalarKind::String);
    assert_eq!(mapper.field_type(&node, true), "String!");
    assert_eq!(mapper.field_type(&node, false), "String");
  }
}

use indexmap::{IndexMap, IndexSet};

use crate::{generator::document::RawSchema, utils::parse_schema_ref_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
  String,
  Integer,
  Float,
  Boolean,
  /// Untyped placeholder: schemas without a `type`, `null` samples, empty sample arrays.
  Any,
}

impl ScalarKind {
  fn from_type_name(name: &str) -> Self {
    match name {
      "string" => Self::String,
      "integer" => Self::Integer,
      "number" => Self::Float,
      "boolean" => Self::Boolean,
      _ => Self::Any,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectNode {
  pub properties: IndexMap<String, SchemaNode>,
  pub required: IndexSet<String>,
}

impl ObjectNode {
  pub fn is_required(&self, property: &str) -> bool {
    self.required.contains(property)
  }

  pub fn is_empty(&self) -> bool {
    self.properties.is_empty()
  }

  fn absorb(&mut self, other: ObjectNode) {
    self.properties.extend(other.properties);
    self.required.extend(other.required);
  }
}

/// A schema with its shape decided once, at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
  Primitive(ScalarKind),
  Array(Box<SchemaNode>),
  Reference(String),
  Object(ObjectNode),
  Union(Vec<SchemaNode>),
}

impl SchemaNode {
  pub fn reference(name: impl Into<String>) -> Self {
    Self::Reference(name.into())
  }

  pub fn array(item: SchemaNode) -> Self {
    Self::Array(Box::new(item))
  }

  #[cfg(test)]
  pub fn object<I, S>(properties: I, required: &[&str]) -> Self
  where
    I: IntoIterator<Item = (S, SchemaNode)>,
    S: Into<String>,
  {
    Self::Object(ObjectNode {
      properties: properties.into_iter().map(|(name, node)| (name.into(), node)).collect(),
      required: required.iter().map(|name| (*name).to_string()).collect(),
    })
  }

  /// Builds a union, collapsing it when a single member remains.
  pub fn union(mut members: Vec<SchemaNode>) -> Self {
    match members.len() {
      0 => Self::Primitive(ScalarKind::Any),
      1 => members.remove(0),
      _ => Self::Union(members),
    }
  }
}

impl From<&RawSchema> for SchemaNode {
  fn from(raw: &RawSchema) -> Self {
    if let Some(ref_path) = &raw.ref_path {
      return Self::reference(parse_schema_ref_path(ref_path).unwrap_or_else(|| ref_path.clone()));
    }

    if !raw.any_of.is_empty() || !raw.one_of.is_empty() {
      let members = raw
        .any_of
        .iter()
        .chain(&raw.one_of)
        .filter(|member| !is_null_schema(member))
        .map(Self::from)
        .collect();
      return Self::union(members);
    }

    if !raw.all_of.is_empty() {
      return merge_all_of(raw);
    }

    let primary_type = raw.schema_type.as_ref().and_then(|types| types.primary());

    if primary_type == Some("array") || raw.items.is_some() {
      let item = raw.items.as_deref().map_or(Self::Primitive(ScalarKind::Any), Self::from);
      return Self::array(item);
    }

    if primary_type == Some("object") || !raw.properties.is_empty() {
      return Self::Object(object_from_raw(raw));
    }

    Self::Primitive(primary_type.map_or(ScalarKind::Any, ScalarKind::from_type_name))
  }
}

fn is_null_schema(raw: &RawSchema) -> bool {
  raw.ref_path.is_none() && raw.schema_type.as_ref().is_some_and(|types| types.is_null())
}

fn object_from_raw(raw: &RawSchema) -> ObjectNode {
  ObjectNode {
    properties: raw
      .properties
      .iter()
      .map(|(name, property)| (name.clone(), SchemaNode::from(property)))
      .collect(),
    required: raw.required.iter().cloned().collect(),
  }
}

/// Inline `allOf` members are flattened into one object; referenced members
/// stay references, joined with the flattened part when both exist.
fn merge_all_of(raw: &RawSchema) -> SchemaNode {
  let mut merged = ObjectNode::default();
  let mut others = Vec::new();

  for member in &raw.all_of {
    match SchemaNode::from(member) {
      SchemaNode::Object(object) => merged.absorb(object),
      other => others.push(other),
    }
  }
  merged.absorb(object_from_raw(raw));

  if !merged.is_empty() {
    others.push(SchemaNode::Object(merged));
  }
  SchemaNode::union(others)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn node(value: serde_json::Value) -> SchemaNode {
    let raw: RawSchema = serde_json::from_value(value).unwrap();
    SchemaNode::from(&raw)
  }

  #[test]
  fn test_primitives() {
    assert_eq!(node(json!({"type": "string"})), SchemaNode::Primitive(ScalarKind::String));
    assert_eq!(node(json!({"type": "integer"})), SchemaNode::Primitive(ScalarKind::Integer));
    assert_eq!(node(json!({"type": "number"})), SchemaNode::Primitive(ScalarKind::Float));
    assert_eq!(node(json!({"type": "boolean"})), SchemaNode::Primitive(ScalarKind::Boolean));
    assert_eq!(node(json!({"format": "uuid"})), SchemaNode::Primitive(ScalarKind::Any));
    assert_eq!(
      node(json!({"type": ["null", "integer"]})),
      SchemaNode::Primitive(ScalarKind::Integer)
    );
  }

  #[test]
  fn test_reference_strips_component_prefix() {
    assert_eq!(node(json!({"$ref": "#/components/schemas/Pet"})), SchemaNode::reference("Pet"));
    assert_eq!(
      node(json!({"$ref": "other.json#/Pet"})),
      SchemaNode::reference("other.json#/Pet")
    );
  }

  #[test]
  fn test_array_without_items_is_untyped() {
    assert_eq!(
      node(json!({"type": "array"})),
      SchemaNode::array(SchemaNode::Primitive(ScalarKind::Any))
    );
  }

  #[test]
  fn test_object_keeps_property_order_and_required() {
    let parsed = node(json!({
      "type": "object",
      "required": ["zeta"],
      "properties": {
        "zeta": {"type": "string"},
        "alpha": {"type": "integer"}
      }
    }));
    let SchemaNode::Object(object) = parsed else {
      panic!("expected object");
    };
    assert_eq!(object.properties.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
    assert!(object.is_required("zeta"));
    assert!(!object.is_required("alpha"));
  }

  #[test]
  fn test_union_drops_null_members() {
    assert_eq!(
      node(json!({"anyOf": [{"$ref": "#/components/schemas/A"}, {"type": "null"}]})),
      SchemaNode::reference("A")
    );
    assert_eq!(
      node(json!({"oneOf": [{"$ref": "#/components/schemas/A"}, {"$ref": "#/components/schemas/B"}]})),
      SchemaNode::Union(vec![SchemaNode::reference("A"), SchemaNode::reference("B")])
    );
  }

  #[test]
  fn test_all_of_merges_inline_members() {
    let parsed = node(json!({
      "allOf": [
        {"type": "object", "properties": {"id": {"type": "integer"}}, "required": ["id"]},
        {"type": "object", "properties": {"name": {"type": "string"}}}
      ]
    }));
    assert_eq!(
      parsed,
      SchemaNode::object(
        [
          ("id", SchemaNode::Primitive(ScalarKind::Integer)),
          ("name", SchemaNode::Primitive(ScalarKind::String)),
        ],
        &["id"],
      )
    );
  }

  #[test]
  fn test_all_of_single_reference_collapses() {
    assert_eq!(
      node(json!({"allOf": [{"$ref": "#/components/schemas/Pet"}]})),
      SchemaNode::reference("Pet")
    );
  }
}

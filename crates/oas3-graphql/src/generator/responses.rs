use indexmap::IndexMap;
use serde_json::Value;

use crate::generator::{
  metrics::{GenerationStats, GenerationWarning},
  operation_registry::{OperationDescriptor, ResponseDescriptor},
  schema::{ObjectNode, ScalarKind, SchemaNode},
};

/// The only status code whose body is turned into a selection set.
pub const SUCCESS_STATUS: &str = "200";

/// Looks up override sample payloads by file name.
pub trait SampleSource {
  fn sample(&self, file_name: &str) -> Option<&str>;
}

/// Override samples held in memory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct OverrideSamples {
  samples: IndexMap<String, String>,
}

impl OverrideSamples {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, file_name: impl Into<String>, contents: impl Into<String>) {
    self.samples.insert(file_name.into(), contents.into());
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }
}

impl SampleSource for OverrideSamples {
  fn sample(&self, file_name: &str) -> Option<&str> {
    self.samples.get(file_name).map(String::as_str)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OverrideSamples {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    Self {
      samples: iter.into_iter().map(|(name, text)| (name.into(), text.into())).collect(),
    }
  }
}

pub fn override_file_name(operation_id: &str, status: &str) -> String {
  format!("{operation_id}.{status}.json")
}

/// Derives a schema from a sample payload. Object keys keep their first-seen
/// order and none of them is required; an array takes the type of its first
/// element.
pub fn infer_schema(value: &Value) -> SchemaNode {
  match value {
    Value::Null => SchemaNode::Primitive(ScalarKind::Any),
    Value::Bool(_) => SchemaNode::Primitive(ScalarKind::Boolean),
    Value::Number(number) if number.is_i64() || number.is_u64() => SchemaNode::Primitive(ScalarKind::Integer),
    Value::Number(_) => SchemaNode::Primitive(ScalarKind::Float),
    Value::String(_) => SchemaNode::Primitive(ScalarKind::String),
    Value::Array(items) => SchemaNode::array(items.first().map_or(SchemaNode::Primitive(ScalarKind::Any), infer_schema)),
    Value::Object(map) => SchemaNode::Object(ObjectNode {
      properties: map.iter().map(|(key, value)| (key.clone(), infer_schema(value))).collect(),
      required: Default::default(),
    }),
  }
}

pub(crate) struct ResponseResolver<'a> {
  samples: &'a dyn SampleSource,
}

impl<'a> ResponseResolver<'a> {
  pub(crate) fn new(samples: &'a dyn SampleSource) -> Self {
    Self { samples }
  }

  /// The declared schema for `status`, or one inferred from the override
  /// sample. `None` means the response is absent and the operation has to be
  /// skipped; the reason is recorded in `stats`.
  pub(crate) fn resolve(
    &self,
    operation: &OperationDescriptor,
    status: &str,
    stats: &mut GenerationStats,
  ) -> Option<SchemaNode> {
    if let Some(ResponseDescriptor::Declared(node)) = operation.responses.get(status) {
      return Some(node.clone());
    }

    let inferred = self.infer_from_override(&operation.id, status, stats);
    if inferred.is_none() {
      stats.record_warning(GenerationWarning::MissingResponse {
        operation_id: operation.id.clone(),
        status: status.to_string(),
      });
    }
    inferred
  }

  fn infer_from_override(&self, operation_id: &str, status: &str, stats: &mut GenerationStats) -> Option<SchemaNode> {
    let file_name = override_file_name(operation_id, status);
    let contents = self.samples.sample(&file_name)?;

    match serde_json::from_str::<Value>(contents) {
      Ok(value) => Some(infer_schema(&value)),
      Err(error) => {
        stats.record_warning(GenerationWarning::InvalidOverride {
          operation_id: operation_id.to_string(),
          file_name,
          error: error.to_string(),
        });
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use http::Method;
  use serde_json::json;

  use super::*;

  fn operation(responses: IndexMap<String, ResponseDescriptor>) -> OperationDescriptor {
    OperationDescriptor {
      id: "getItem".to_string(),
      method: Method::GET,
      path: "/items/{id}".to_string(),
      summary: None,
      parameters: vec![],
      responses,
    }
  }

  #[test]
  fn test_infer_schema_from_sample() {
    let inferred = infer_schema(&json!({"a": 1, "b": [true, false]}));
    assert_eq!(
      inferred,
      SchemaNode::object(
        [
          ("a", SchemaNode::Primitive(ScalarKind::Integer)),
          ("b", SchemaNode::array(SchemaNode::Primitive(ScalarKind::Boolean))),
        ],
        &[],
      )
    );
  }

  #[test]
  fn test_infer_schema_scalars() {
    assert_eq!(infer_schema(&json!(1.5)), SchemaNode::Primitive(ScalarKind::Float));
    assert_eq!(infer_schema(&json!(u64::MAX)), SchemaNode::Primitive(ScalarKind::Integer));
    assert_eq!(infer_schema(&json!("x")), SchemaNode::Primitive(ScalarKind::String));
    assert_eq!(infer_schema(&json!(null)), SchemaNode::Primitive(ScalarKind::Any));
    assert_eq!(
      infer_schema(&json!([])),
      SchemaNode::array(SchemaNode::Primitive(ScalarKind::Any))
    );
  }

  #[test]
  fn test_infer_schema_keeps_first_seen_key_order() {
    let value = serde_json::from_str::<Value>(r#"{"zeta": 1, "alpha": {"nested": "x"}}"#).unwrap();
    let SchemaNode::Object(object) = infer_schema(&value) else {
      panic!("expected object");
    };
    assert_eq!(object.properties.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
    assert!(object.required.is_empty());
  }

  #[test]
  fn test_declared_schema_wins_over_override() {
    let declared = SchemaNode::Primitive(ScalarKind::Integer);
    let operation = operation(IndexMap::from([(
      "200".to_string(),
      ResponseDescriptor::Declared(declared.clone()),
    )]));
    let samples = OverrideSamples::from_iter([("getItem.200.json", r#"{"id": "x"}"#)]);
    let mut stats = GenerationStats::default();

    let resolved = ResponseResolver::new(&samples).resolve(&operation, SUCCESS_STATUS, &mut stats);
    assert_eq!(resolved, Some(declared));
    assert!(stats.warnings.is_empty());
  }

  #[test]
  fn test_absent_response_uses_override() {
    let operation = operation(IndexMap::from([("200".to_string(), ResponseDescriptor::Absent)]));
    let samples = OverrideSamples::from_iter([("getItem.200.json", r#"{"id": 7}"#)]);
    let mut stats = GenerationStats::default();

    let resolved = ResponseResolver::new(&samples).resolve(&operation, SUCCESS_STATUS, &mut stats);
    assert_eq!(
      resolved,
      Some(SchemaNode::object([("id", SchemaNode::Primitive(ScalarKind::Integer))], &[]))
    );
  }

  #[test]
  fn test_missing_response_without_override_is_reported() {
    let operation = operation(IndexMap::new());
    let mut stats = GenerationStats::default();

    let resolved = ResponseResolver::new(&OverrideSamples::new()).resolve(&operation, SUCCESS_STATUS, &mut stats);
    assert_eq!(resolved, None);
    assert_eq!(
      stats.warnings,
      [GenerationWarning::MissingResponse {
        operation_id: "getItem".to_string(),
        status: "200".to_string(),
      }]
    );
  }

  #[test]
  fn test_unparsable_override_falls_back_to_absent() {
    let operation = operation(IndexMap::new());
    let samples = OverrideSamples::from_iter([("getItem.200.json", "{not json")]);
    let mut stats = GenerationStats::default();

    let resolved = ResponseResolver::new(&samples).resolve(&operation, SUCCESS_STATUS, &mut stats);
    assert_eq!(resolved, None);
    assert!(matches!(
      &stats.warnings[0],
      GenerationWarning::InvalidOverride { file_name, .. } if file_name == "getItem.200.json"
    ));
    assert!(stats.warnings[1].is_skipped_item());
  }
}

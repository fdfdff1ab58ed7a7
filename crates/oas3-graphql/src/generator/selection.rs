//! Selection sets for `@connect` directives.
//!
//! The builder walks a response schema, emitting one entry per field. A field
//! whose schema is composite gets a braced block with the selection of the
//! nested type, everything else is selected by its bare name. Every registry
//! entry the walk dereferences is marked in [`ReachableTypes`]; only those are
//! later declared in the SDL.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::generator::{
  metrics::GenerationWarning,
  naming::identifiers::to_graphql_field_names,
  schema::SchemaNode,
  schema_registry::SchemaRegistry,
};

pub(crate) const INDENT: &str = "  ";

/// Selection used when a response yields no fields at all.
pub(crate) const FALLBACK_FIELD: &str = "id";

/// Registry entries reached from at least one emitted query field. Lives for a
/// single generation run.
#[derive(Debug, Default, Clone)]
pub(crate) struct ReachableTypes {
  names: IndexMap<String, bool>,
}

impl ReachableTypes {
  pub(crate) fn mark(&mut self, name: &str) {
    self.names.insert(name.to_string(), true);
  }

  pub(crate) fn contains(&self, name: &str) -> bool {
    self.names.get(name).copied().unwrap_or(false)
  }
}

/// The selection key of a property: its GraphQL field name, aliased to the
/// quoted JSON key when the two differ.
pub(crate) fn selection_key(field: &str, property: &str) -> String {
  if field == property {
    field.to_string()
  } else {
    format!("{field}: {}", serde_json::Value::from(property))
  }
}

pub(crate) struct SelectionBuilder<'a> {
  registry: &'a SchemaRegistry,
  reachable: &'a mut ReachableTypes,
  operation_id: &'a str,
  field_path: Vec<String>,
  expanding: Vec<String>,
  diagnostics: Vec<GenerationWarning>,
}

impl<'a> SelectionBuilder<'a> {
  pub(crate) fn new(registry: &'a SchemaRegistry, reachable: &'a mut ReachableTypes, operation_id: &'a str) -> Self {
    Self {
      registry,
      reachable,
      operation_id,
      field_path: vec![],
      expanding: vec![],
      diagnostics: vec![],
    }
  }

  /// Selection lines for `node`, indented by `indent_level` steps. Falls back
  /// to [`FALLBACK_FIELD`] when nothing can be selected.
  pub(crate) fn build(&mut self, node: &SchemaNode, indent_level: usize) -> Vec<String> {
    let entries = self.entries(node, indent_level);
    if entries.is_empty() {
      return vec![format!("{}{FALLBACK_FIELD}", INDENT.repeat(indent_level))];
    }
    entries.iter().flat_map(|entry| entry.lines()).map(String::from).collect()
  }

  pub(crate) fn into_diagnostics(self) -> Vec<GenerationWarning> {
    self.diagnostics
  }

  fn entries(&mut self, node: &SchemaNode, depth: usize) -> Vec<String> {
    match node {
      SchemaNode::Reference(name) if self.expanding.contains(name) => {
        self
          .diagnostics
          .push(GenerationWarning::cyclic_reference(self.operation_id, &self.field_path, name));
        vec![]
      }
      SchemaNode::Reference(name) => match self.registry.resolve(name) {
        Some(target) => {
          self.reachable.mark(name);
          self.expanding.push(name.clone());
          let entries = self.entries(target, depth);
          self.expanding.pop();
          entries
        }
        None => {
          self.report_unresolved(name);
          vec![]
        }
      },
      SchemaNode::Object(object) => {
        let fields = to_graphql_field_names(object.properties.keys().map(String::as_str));
        object
          .properties
          .iter()
          .zip(fields)
          .filter_map(|((property, node), field)| self.field_entry(&field, property, node, depth))
          .collect()
      }
      SchemaNode::Array(item) => self.entries(item, depth),
      SchemaNode::Union(members) => members
        .iter()
        .flat_map(|member| self.entries(member, depth))
        .collect::<Vec<_>>()
        .into_iter()
        .unique()
        .collect(),
      SchemaNode::Primitive(_) => vec![],
    }
  }

  fn field_entry(&mut self, field: &str, property: &str, node: &SchemaNode, depth: usize) -> Option<String> {
    let indent = INDENT.repeat(depth);
    let key = selection_key(field, property);
    self.field_path.push(property.to_string());

    let entry = if !self.registry.is_composite(node) {
      self.mark_scalar_references(node);
      Some(format!("{indent}{key}"))
    } else if let Some(name) = self.recursive_reference(node) {
      // the field is dropped, but its type still names every member
      self.mark_members(node, depth);
      self
        .diagnostics
        .push(GenerationWarning::cyclic_reference(self.operation_id, &self.field_path, &name));
      None
    } else {
      let children = self.entries(node, depth + 1);
      if children.is_empty() {
        Some(format!("{indent}{key} {{\n{indent}}}"))
      } else {
        Some(format!("{indent}{key} {{\n{}\n{indent}}}", children.join("\n")))
      }
    };

    self.field_path.pop();
    entry
  }

  /// A reference inside `node` that is already being expanded further up.
  fn recursive_reference(&self, node: &SchemaNode) -> Option<String> {
    match node {
      SchemaNode::Reference(name) => self.expanding.contains(name).then(|| name.clone()),
      SchemaNode::Array(item) => self.recursive_reference(item),
      SchemaNode::Union(members) => members.iter().find_map(|member| self.recursive_reference(member)),
      SchemaNode::Object(_) | SchemaNode::Primitive(_) => None,
    }
  }

  /// Marks everything `node` names without selecting it. Members already
  /// being expanded are marked directly, the rest are walked.
  fn mark_members(&mut self, node: &SchemaNode, depth: usize) {
    match node {
      SchemaNode::Reference(name) if self.expanding.contains(name) => self.reachable.mark(name),
      SchemaNode::Array(item) => self.mark_members(item, depth),
      SchemaNode::Union(members) => {
        for member in members {
          self.mark_members(member, depth);
        }
      }
      _ => {
        self.entries(node, depth + 1);
      }
    }
  }

  /// Scalar fields may still name registry entries (aliases of primitives);
  /// those are declared too.
  fn mark_scalar_references(&mut self, node: &SchemaNode) {
    match node {
      SchemaNode::Reference(name) => match self.registry.resolve(name) {
        Some(target) => {
          if !self.reachable.contains(name) {
            self.reachable.mark(name);
            self.mark_scalar_references(target);
          }
        }
        None => self.report_unresolved(name),
      },
      SchemaNode::Array(item) => self.mark_scalar_references(item),
      SchemaNode::Union(members) => {
        for member in members {
          self.mark_scalar_references(member);
        }
      }
      SchemaNode::Object(_) | SchemaNode::Primitive(_) => {}
    }
  }

  fn report_unresolved(&mut self, name: &str) {
    self
      .diagnostics
      .push(GenerationWarning::unresolved_reference(self.operation_id, &self.field_path, name));
  }
}

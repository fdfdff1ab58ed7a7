use itertools::Itertools;

use crate::generator::{
  connect::{ConnectDirective, DIRECTIVE_ARGUMENT_LEVEL},
  document::Info,
  metrics::{GenerationStats, GenerationWarning},
  naming::identifiers::{to_graphql_field_name, to_graphql_field_names},
  operation_registry::OperationDescriptor,
  schema::{ObjectNode, ScalarKind, SchemaNode},
  schema_registry::SchemaRegistry,
  selection::{INDENT, ReachableTypes, SelectionBuilder},
  type_mapper::TypeMapper,
};

pub(crate) const FEDERATION_LINK: &str = "https://specs.apollo.dev/federation/v2.10";
pub(crate) const CONNECT_LINK: &str = "https://specs.apollo.dev/connect/v0.1";

/// A GET operation together with its resolved (and hoisted) success body.
#[derive(Debug)]
pub(crate) struct QueryOperation<'a> {
  pub(crate) operation: &'a OperationDescriptor,
  pub(crate) response: SchemaNode,
}

fn escape_string(value: &str) -> String {
  value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub(crate) struct SchemaEmitter<'a> {
  registry: &'a SchemaRegistry,
  mapper: &'a TypeMapper,
  source_name: &'a str,
  base_url: &'a str,
}

impl<'a> SchemaEmitter<'a> {
  pub(crate) fn new(registry: &'a SchemaRegistry, mapper: &'a TypeMapper, source_name: &'a str, base_url: &'a str) -> Self {
    Self {
      registry,
      mapper,
      source_name,
      base_url,
    }
  }

  /// Renders the whole SDL document. The `Query` type is built first since
  /// only the types its selections reach are declared afterwards.
  pub(crate) fn emit(&self, info: &Info, operations: &[QueryOperation<'_>], stats: &mut GenerationStats) -> String {
    let mut reachable = ReachableTypes::default();
    let query_fields = operations
      .iter()
      .map(|query| self.query_field(query, &mut reachable, stats))
      .collect::<Vec<_>>();

    let mut sections = vec![Self::header(info), self.schema_extension()];
    if !query_fields.is_empty() {
      sections.push(format!("type Query {{\n{}\n}}", query_fields.join("\n\n")));
    }
    sections.extend(self.declarations(&reachable, stats));

    stats.record_orphaned_schemas(
      self
        .registry
        .entries()
        .filter(|(name, _)| !self.registry.is_hoisted(name) && !reachable.contains(name))
        .count(),
    );

    let mut sdl = sections.join("\n\n");
    sdl.push('\n');
    sdl
  }

  fn header(info: &Info) -> String {
    let mut lines = vec!["# AUTO-GENERATED SCHEMA - DO NOT EDIT!".to_string(), "#".to_string()];
    if !info.title.is_empty() {
      lines.push(format!("# {}", info.title));
    }
    if !info.version.is_empty() {
      lines.push(format!("# Version: {}", info.version));
    }
    if let Some(description) = info.description.as_deref().map(str::trim).filter(|text| !text.is_empty()) {
      lines.push("#".to_string());
      lines.extend(description.lines().map(|line| format!("# {}", line.trim_end())));
    }
    lines.push("# Generated by `oas3-graphql`".to_string());
    lines.join("\n")
  }

  fn schema_extension(&self) -> String {
    format!(
      "extend schema\n\
       {INDENT}@link(url: \"{FEDERATION_LINK}\", import: [\"@key\"])\n\
       {INDENT}@link(url: \"{CONNECT_LINK}\", import: [\"@connect\", \"@source\"])\n\
       {INDENT}@source(name: \"{}\", http: {{ baseURL: \"{}\" }})",
      escape_string(self.source_name),
      escape_string(self.base_url),
    )
  }

  fn query_field(&self, query: &QueryOperation<'_>, reachable: &mut ReachableTypes, stats: &mut GenerationStats) -> String {
    let operation = query.operation;

    let mut builder = SelectionBuilder::new(self.registry, reachable, &operation.id);
    let selection = builder.build(&query.response, DIRECTIVE_ARGUMENT_LEVEL);
    stats.record_warnings(builder.into_diagnostics());
    stats.record_query();

    let return_type = self.mapper.map_type(&self.registry.degrade_unresolved(&query.response));
    let directive = ConnectDirective {
      source: self.source_name,
      method: &operation.method,
      path: &operation.path,
      parameters: &operation.parameters,
      selection: &selection,
    };

    let mut lines = Vec::new();
    if let Some(summary) = operation.summary.as_deref().map(str::trim).filter(|text| !text.is_empty()) {
      lines.push(format!("{INDENT}\"{}\"", escape_string(&summary.replace('\n', " "))));
    }
    lines.push(format!("{INDENT}{}{}: {return_type}", operation.id, self.arguments(operation)));
    lines.push(directive.to_string());
    lines.join("\n")
  }

  fn arguments(&self, operation: &OperationDescriptor) -> String {
    if operation.parameters.is_empty() {
      return String::new();
    }

    let arguments = operation
      .parameters
      .iter()
      .map(|param| {
        let node = self.registry.flatten_scalars(&param.schema);
        // input positions cannot take object types
        let node = if self.registry.is_composite(&node) {
          SchemaNode::Primitive(ScalarKind::Any)
        } else {
          node
        };
        format!("{}: {}", param.argument, self.mapper.field_type(&node, param.required))
      })
      .join(", ");
    format!("({arguments})")
  }

  /// Declarations for reachable registry entries, in registry order. Objects
  /// without properties are never printed; entries that are not objects are
  /// declared as custom scalars.
  fn declarations(&self, reachable: &ReachableTypes, stats: &mut GenerationStats) -> Vec<String> {
    let mut declarations = Vec::new();

    for (name, node) in self.registry.entries().filter(|(name, _)| reachable.contains(name)) {
      let type_name = self.mapper.type_name(name);
      match node {
        SchemaNode::Object(object) if object.is_empty() => {}
        SchemaNode::Object(object) => {
          let fields = self.object_fields(&type_name, object, stats);
          declarations.push(format!("type {type_name} {{\n{fields}\n}}"));
          stats.record_type();
        }
        _ => {
          declarations.push(format!("scalar {type_name}"));
          stats.record_scalar();
        }
      }
    }

    declarations
  }

  fn object_fields(&self, type_name: &str, object: &ObjectNode, stats: &mut GenerationStats) -> String {
    let fields = to_graphql_field_names(object.properties.keys().map(String::as_str));
    for (property, field) in object.properties.keys().zip(&fields) {
      if *field != to_graphql_field_name(property) {
        stats.record_warning(GenerationWarning::RenamedField {
          owner: type_name.to_string(),
          property: property.clone(),
          field: field.clone(),
        });
      }
    }

    object
      .properties
      .iter()
      .zip(fields)
      .map(|((property, node), field)| {
        let field_type = self
          .mapper
          .field_type(&self.registry.degrade_unresolved(node), object.is_required(property));
        format!("{INDENT}{field}: {field_type}")
      })
      .join("\n")
  }
}

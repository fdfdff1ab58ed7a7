use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub operations_total: usize,
  pub queries_generated: usize,
  pub types_generated: usize,
  pub scalars_generated: usize,
  pub hoisted_types: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
  pub orphaned_schemas_count: usize,
  pub binding_methods_generated: usize,
}

impl GenerationStats {
  pub fn record_operation(&mut self) {
    self.operations_total += 1;
  }

  pub fn record_query(&mut self) {
    self.queries_generated += 1;
  }

  pub fn record_type(&mut self) {
    self.types_generated += 1;
  }

  pub fn record_scalar(&mut self) {
    self.scalars_generated += 1;
  }

  pub fn record_hoisted_types(&mut self, count: usize) {
    self.hoisted_types += count;
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_orphaned_schemas(&mut self, count: usize) {
    self.orphaned_schemas_count += count;
  }

  pub fn record_binding_methods(&mut self, count: usize) {
    self.binding_methods_generated += count;
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

/// A non-fatal fallback taken during generation. Each variant names the
/// operation it happened in and, where it applies, the field path.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "[{operation_id}] no schema or override sample for status {status}, operation skipped")]
  MissingResponse { operation_id: String, status: String },
  #[strum(to_string = "[{operation_id}] override sample '{file_name}' is not valid JSON: {error}")]
  InvalidOverride {
    operation_id: String,
    file_name: String,
    error: String,
  },
  #[strum(to_string = "[{operation_id}] {field_path}: unresolved reference '{reference}' left unexpanded")]
  UnresolvedReference {
    operation_id: String,
    field_path: String,
    reference: String,
  },
  #[strum(to_string = "[{operation_id}] {field_path}: recursive reference '{reference}' omitted from selection")]
  CyclicReference {
    operation_id: String,
    field_path: String,
    reference: String,
  },
  #[strum(to_string = "[{operation_id}] duplicate parameter '{name}' ignored")]
  DuplicateParameter { operation_id: String, name: String },
  #[strum(to_string = "[{original}] field name already taken, renamed to '{renamed}'")]
  RenamedOperation { original: String, renamed: String },
  #[strum(to_string = "[{owner}] '{property}' clashes with another name, exposed as '{field}'")]
  RenamedField {
    owner: String,
    property: String,
    field: String,
  },
  #[strum(to_string = "{method} {path}: only GET operations are exposed as queries")]
  UnsupportedMethod { method: String, path: String },
  #[strum(to_string = "{method} {path}: malformed operation skipped, {error}")]
  InvalidOperation {
    method: String,
    path: String,
    error: String,
  },
  #[strum(to_string = "{path}: malformed path item skipped, {error}")]
  InvalidPathItem { path: String, error: String },
  #[strum(to_string = "schema '{name}' is malformed and left out, {error}")]
  InvalidSchema { name: String, error: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(
      self,
      Self::MissingResponse { .. }
        | Self::InvalidOperation { .. }
        | Self::InvalidPathItem { .. }
        | Self::InvalidSchema { .. }
    )
  }

  pub(crate) fn unresolved_reference(operation_id: &str, field_path: &[String], reference: &str) -> Self {
    Self::UnresolvedReference {
      operation_id: operation_id.to_string(),
      field_path: render_field_path(field_path),
      reference: reference.to_string(),
    }
  }

  pub(crate) fn cyclic_reference(operation_id: &str, field_path: &[String], reference: &str) -> Self {
    Self::CyclicReference {
      operation_id: operation_id.to_string(),
      field_path: render_field_path(field_path),
      reference: reference.to_string(),
    }
  }
}

fn render_field_path(field_path: &[String]) -> String {
  if field_path.is_empty() {
    "<response>".to_string()
  } else {
    field_path.join(".")
  }
}

use http::Method;

use crate::generator::{operation_registry::ParameterDescriptor, selection::INDENT};

/// Indent level of the directive arguments, and of the selection lines
/// inside the block string.
pub(crate) const DIRECTIVE_ARGUMENT_LEVEL: usize = 3;

/// `name={$args.name}` for every parameter, joined with `&`. The argument
/// side uses the GraphQL argument name, the key side the REST name.
pub(crate) fn query_string(parameters: &[ParameterDescriptor]) -> String {
  parameters
    .iter()
    .map(|param| format!("{}={{$args.{}}}", param.name, param.argument))
    .collect::<Vec<_>>()
    .join("&")
}

/// The path template with every parameter threaded through the query string.
/// Path parameters are passed the same way; the template itself is left as
/// written.
pub(crate) fn connect_path(path: &str, parameters: &[ParameterDescriptor]) -> String {
  if parameters.is_empty() {
    return path.to_string();
  }
  let separator = if path.contains('?') { '&' } else { '?' };
  format!("{path}{separator}{}", query_string(parameters))
}

fn escape_string(value: &str) -> String {
  value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A `@connect` directive attached to one `Query` field.
#[derive(Debug)]
pub(crate) struct ConnectDirective<'a> {
  pub(crate) source: &'a str,
  pub(crate) method: &'a Method,
  pub(crate) path: &'a str,
  pub(crate) parameters: &'a [ParameterDescriptor],
  /// Lines already indented to [`DIRECTIVE_ARGUMENT_LEVEL`].
  pub(crate) selection: &'a [String],
}

impl std::fmt::Display for ConnectDirective<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let outer = INDENT.repeat(DIRECTIVE_ARGUMENT_LEVEL - 1);
    let inner = INDENT.repeat(DIRECTIVE_ARGUMENT_LEVEL);

    writeln!(f, "{outer}@connect(")?;
    writeln!(f, "{inner}source: \"{}\"", escape_string(self.source))?;
    writeln!(
      f,
      "{inner}http: {{ {}: \"{}\" }}",
      self.method.as_str(),
      escape_string(&connect_path(self.path, self.parameters))
    )?;
    writeln!(f, "{inner}selection: \"\"\"")?;
    for line in self.selection {
      writeln!(f, "{line}")?;
    }
    writeln!(f, "{inner}\"\"\"")?;
    write!(f, "{outer})")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::{
    document::ParameterIn,
    naming::identifiers::to_graphql_field_name,
    schema::{ScalarKind, SchemaNode},
  };

  fn param(name: &str, location: ParameterIn) -> ParameterDescriptor {
    ParameterDescriptor {
      name: name.to_string(),
      argument: to_graphql_field_name(name),
      location,
      required: false,
      schema: SchemaNode::Primitive(ScalarKind::String),
    }
  }

  #[test]
  fn test_connect_path_without_parameters_is_unchanged() {
    assert_eq!(connect_path("/items/{id}", &[]), "/items/{id}");
  }

  #[test]
  fn test_connect_path_threads_every_parameter() {
    let params = [param("id", ParameterIn::Path), param("limit", ParameterIn::Query)];
    assert_eq!(
      connect_path("/items/{id}", &params),
      "/items/{id}?id={$args.id}&limit={$args.limit}"
    );
    assert_eq!(
      connect_path("/search?v=2", &params[1..]),
      "/search?v=2&limit={$args.limit}"
    );
  }

  #[test]
  fn test_query_string_uses_argument_names() {
    let params = [param("page-size", ParameterIn::Query)];
    assert_eq!(query_string(&params), "page-size={$args.pageSize}");
  }

  #[test]
  fn test_render_directive() {
    let params = [param("limit", ParameterIn::Query)];
    let selection = ["      id".to_string(), "      name".to_string()];
    let directive = ConnectDirective {
      source: "pets",
      method: &Method::GET,
      path: "/pets",
      parameters: &params,
      selection: &selection,
    };

    let expected = r#"    @connect(
      source: "pets"
      http: { GET: "/pets?limit={$args.limit}" }
      selection: """
      id
      name
      """
    )"#;
    assert_eq!(directive.to_string(), expected);
  }
}

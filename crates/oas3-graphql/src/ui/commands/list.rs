use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use http::Method;

use crate::{
  generator::{document::OpenApiDocument, naming::operations::compute_field_name},
  ui::{Colors, colors::table_color, term_width},
  utils::spec::SpecLoader,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct OperationRow {
  field: String,
  method: String,
  path: String,
  exposed: bool,
}

/// One row per operation in declaration order. Only GET operations become
/// `Query` fields.
fn operation_rows(document: &OpenApiDocument) -> Vec<OperationRow> {
  document
    .operations()
    .map(|(path, method, operation)| OperationRow {
      field: compute_field_name(method.as_str(), path, operation.operation_id.as_deref()),
      method: method.to_string(),
      path: path.to_string(),
      exposed: method == Method::GET,
    })
    .collect()
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let document = SpecLoader::open(input).await?.parse()?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  for title in ["FIELD", "METHOD", "PATH", "QUERY"] {
    header.add_cell(Cell::new(title).fg(table_color(colors.label())));
  }
  table.set_header(header);

  for row in operation_rows(&document) {
    let mut cells = Row::new();
    cells.add_cell(
      Cell::new(row.field)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    cells.add_cell(
      Cell::new(row.method)
        .fg(table_color(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    cells.add_cell(Cell::new(row.path).fg(table_color(colors.primary())));
    cells.add_cell(Cell::new(if row.exposed { "yes" } else { "-" }).fg(table_color(colors.info())));
    table.add_row(cells);
  }

  println!("{table}");

  Ok(())
}

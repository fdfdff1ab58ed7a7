use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-graphql")]
#[command(author, version, about = "OpenAPI to Apollo Connectors GraphQL generator")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from an OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate a connectors GraphQL schema and a REST binding
  Generate(GenerateCommand),
}

#[derive(Args, Debug)]
pub struct GenerateCommand {
  /// Path to the OpenAPI JSON specification file
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Directory the `.graphql` and `.rs` files are written to
  #[arg(short, long, value_name = "DIR")]
  pub output: PathBuf,

  /// API name used for file names and defaults (default: input file stem)
  #[arg(long, value_name = "NAME")]
  pub name: Option<String>,

  /// Prefix for every emitted GraphQL type (default: PascalCase API name)
  #[arg(long, value_name = "PREFIX")]
  pub namespace: Option<String>,

  /// Base URL of the `@source` and the client (default: first server URL)
  #[arg(long, value_name = "URL")]
  pub base_url: Option<String>,

  /// Directory of `{operationId}.{status}.json` response samples
  #[arg(long, value_name = "DIR")]
  pub overrides: Option<PathBuf>,

  /// Remove the output directory before writing
  #[arg(long, default_value_t = false)]
  pub clean: bool,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List all operations defined in the OpenAPI specification
  Operations {
    /// Path to the OpenAPI JSON specification file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}

use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  generator::{
    document::OpenApiDocument,
    metrics::GenerationStats,
    orchestrator::{GeneratedOutput, GraphqlConfig, Orchestrator},
    responses::OverrideSamples,
  },
  ui::{Colors, GenerateCommand},
  utils::{samples::load_samples, spec::SpecLoader},
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

/// The API name used when `--name` is not given: the input file stem.
fn api_name_from_path(path: &Path) -> anyhow::Result<String> {
  path
    .file_stem()
    .and_then(OsStr::to_str)
    .filter(|stem| !stem.is_empty())
    .map(str::to_string)
    .ok_or_else(|| anyhow::anyhow!("Cannot derive an API name from '{}', pass --name", path.display()))
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub api_name: String,
  pub namespace: Option<String>,
  pub base_url: Option<String>,
  pub overrides: Option<PathBuf>,
  pub clean: bool,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      name,
      namespace,
      base_url,
      overrides,
      clean,
      verbose,
      quiet,
    } = command;

    if verbose && quiet {
      anyhow::bail!("--verbose and --quiet cannot be combined");
    }

    let api_name = match name {
      Some(name) if name.trim().is_empty() => anyhow::bail!("--name must not be empty"),
      Some(name) => name,
      None => api_name_from_path(&input)?,
    };

    Ok(Self {
      input,
      output,
      api_name,
      namespace,
      base_url,
      overrides,
      clean,
      verbose,
      quiet,
    })
  }

  pub fn graphql_path(&self) -> PathBuf {
    self.output.join(format!("{}.graphql", self.api_name))
  }

  pub fn binding_path(&self) -> PathBuf {
    self.output.join(format!("{}.rs", self.api_name))
  }

  fn graphql_config(&self) -> GraphqlConfig {
    GraphqlConfig::builder()
      .api_name(self.api_name.clone())
      .maybe_namespace(self.namespace.clone())
      .maybe_base_url(self.base_url.clone())
      .build()
  }

  async fn load_spec(&self) -> anyhow::Result<OpenApiDocument> {
    SpecLoader::open(&self.input).await?.parse()
  }

  async fn load_samples(&self) -> anyhow::Result<OverrideSamples> {
    match &self.overrides {
      Some(dir) => load_samples(dir).await,
      None => Ok(OverrideSamples::default()),
    }
  }

  async fn prepare_output_dir(&self) -> anyhow::Result<()> {
    if self.clean && tokio::fs::try_exists(&self.output).await? {
      tokio::fs::remove_dir_all(&self.output).await?;
    }
    tokio::fs::create_dir_all(&self.output).await?;
    Ok(())
  }

  async fn write_output(&self, output: &GeneratedOutput) -> anyhow::Result<()> {
    self.prepare_output_dir().await?;
    tokio::fs::write(self.graphql_path(), &output.graphql).await?;
    tokio::fs::write(self.binding_path(), &output.binding).await?;
    Ok(())
  }
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI spec from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_samples(&self, samples: &OverrideSamples) {
    let Some(dir) = &self.config.overrides else {
      return;
    };
    let message = if samples.is_empty() {
      format!("No override samples found in: {}", dir.display())
    } else {
      format!("Loaded {} override samples from: {}", samples.len(), dir.display())
    };
    self.info(&message.with(self.colors.primary()).to_string());
  }

  fn log_generating(&self) {
    self.info(&"Generating GraphQL schema...".with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Operations found:", stats.operations_total.to_string());
    self.stat("Queries generated:", stats.queries_generated.to_string());
    self.stat("Types generated:", stats.types_generated.to_string());
    if stats.scalars_generated > 0 {
      self.stat("", format!("{} custom scalars", stats.scalars_generated));
    }
    if stats.hoisted_types > 0 {
      self.stat("", format!("{} hoisted inline types", stats.hoisted_types));
    }
    self.stat("Client methods:", stats.binding_methods_generated.to_string());
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_cycles(stats);
    self.print_orphaned_schemas(stats);
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.info())
        );
      }
    }
  }

  fn print_orphaned_schemas(&self, stats: &GenerationStats) {
    if stats.orphaned_schemas_count > 0 && self.config.verbose {
      self.stat("Unreachable schemas:", stats.orphaned_schemas_count.to_string());
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !warning.is_skipped_item() && !self.config.verbose {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }

      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(
      &format!(
        "Writing to: {} and {}",
        self.config.graphql_path().display(),
        self.config.binding_path().display()
      )
      .with(self.colors.primary())
      .to_string(),
    );
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated GraphQL schema and REST binding".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_schema(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let document = config.load_spec().await?;
  let samples = config.load_samples().await?;
  logger.log_samples(&samples);

  logger.log_generating();
  let output = Orchestrator::new(document, config.graphql_config())
    .with_samples(samples)
    .generate()?;
  logger.print_statistics(&output.stats);

  logger.log_writing();
  config.write_output(&output).await?;

  logger.log_success();
  Ok(())
}

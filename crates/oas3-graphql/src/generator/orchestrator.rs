//! Runs the whole pipeline for one OpenAPI document.
//!
//! ```no_run
//! # use oas3_graphql::generator::{document::OpenApiDocument, orchestrator::{GraphqlConfig, Orchestrator}};
//! # fn example() -> anyhow::Result<()> {
//! let document = OpenApiDocument::from_slice(&std::fs::read("petstore.json")?)?;
//! let config = GraphqlConfig::builder().api_name("petstore").build();
//! let output = Orchestrator::new(document, config).generate()?;
//! println!("{} queries", output.stats.queries_generated);
//! # Ok(())
//! # }
//! ```

use crate::generator::{
  binding::BindingEmitter,
  document::OpenApiDocument,
  metrics::{GenerationStats, GenerationWarning},
  naming::{
    identifiers::{is_graphql_name, to_graphql_type_name, to_source_name},
    operations::response_type_name,
  },
  operation_registry::OperationRegistry,
  responses::{OverrideSamples, ResponseResolver, SUCCESS_STATUS},
  schema_registry::SchemaRegistry,
  sdl::{QueryOperation, SchemaEmitter},
  type_mapper::TypeMapper,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Naming and connection settings for one generated API.
#[derive(Debug, Clone, bon::Builder)]
pub struct GraphqlConfig {
  /// Name of the API, usually the input file stem.
  #[builder(into)]
  pub api_name: String,
  /// Prefix for every emitted type. Defaults to the PascalCase API name.
  #[builder(into)]
  pub namespace: Option<String>,
  /// Name of the `@source`. Defaults to the snake_case API name.
  #[builder(into)]
  pub source_name: Option<String>,
  /// Defaults to the document's first server, then [`DEFAULT_BASE_URL`].
  #[builder(into)]
  pub base_url: Option<String>,
  #[builder(into, default = SUCCESS_STATUS.to_string())]
  pub success_status: String,
}

impl GraphqlConfig {
  /// The type-name prefix. An explicit namespace that is not a valid GraphQL
  /// name is normalized to `PascalCase`; an empty one disables the prefix.
  pub fn namespace(&self) -> String {
    match self.namespace.as_deref() {
      Some(namespace) if namespace.is_empty() || is_graphql_name(namespace) => namespace.to_string(),
      Some(namespace) => to_graphql_type_name(namespace),
      None => to_graphql_type_name(&self.api_name),
    }
  }

  pub fn source_name(&self) -> String {
    self.source_name.clone().unwrap_or_else(|| to_source_name(&self.api_name))
  }

  pub fn base_url(&self, document: &OpenApiDocument) -> String {
    self
      .base_url
      .as_deref()
      .or_else(|| document.first_server_url())
      .unwrap_or(DEFAULT_BASE_URL)
      .to_string()
  }
}

#[derive(Debug)]
pub struct GeneratedOutput {
  pub graphql: String,
  pub binding: String,
  pub stats: GenerationStats,
}

pub struct Orchestrator {
  document: OpenApiDocument,
  config: GraphqlConfig,
  samples: OverrideSamples,
}

impl Orchestrator {
  pub fn new(document: OpenApiDocument, config: GraphqlConfig) -> Self {
    Self {
      document,
      config,
      samples: OverrideSamples::default(),
    }
  }

  #[must_use]
  pub fn with_samples(mut self, samples: OverrideSamples) -> Self {
    self.samples = samples;
    self
  }

  /// Generates the SDL and the binding.
  ///
  /// # Errors
  ///
  /// Fails when the document lacks `paths` or `components.schemas`, or when
  /// the binding does not parse as Rust. Problems with single operations are
  /// recorded as warnings in the returned statistics instead.
  pub fn generate(&self) -> anyhow::Result<GeneratedOutput> {
    let (_, schemas) = self.document.required_sections()?;
    let mut stats = GenerationStats::default();
    for (name, schema) in schemas {
      if let Err(error) = schema.as_result() {
        stats.record_warning(GenerationWarning::InvalidSchema {
          name: name.clone(),
          error: error.to_string(),
        });
      }
    }

    let operations = OperationRegistry::new(&self.document, &mut stats);
    let resolver = ResponseResolver::new(&self.samples);
    let mut registry = SchemaRegistry::builder(schemas);

    let queries = operations
      .operations()
      .iter()
      .filter_map(|operation| {
        let response = resolver.resolve(operation, &self.config.success_status, &mut stats)?;
        Some(QueryOperation {
          operation,
          response: registry.hoist_response(&response_type_name(&operation.path), response),
        })
      })
      .collect::<Vec<_>>();

    let registry = registry.build();
    stats.record_hoisted_types(registry.hoisted_count());
    stats.record_cycles(registry.detect_cycles());

    let mapper = TypeMapper::new(self.config.namespace()).with_type_names(registry.type_names());
    let source_name = self.config.source_name();
    let base_url = self.config.base_url(&self.document);

    let graphql = SchemaEmitter::new(&registry, &mapper, &source_name, &base_url).emit(
      &self.document.info,
      &queries,
      &mut stats,
    );
    let binding =
      BindingEmitter::new(&registry, mapper.namespace(), &base_url).emit(&self.document.info, operations.operations())?;
    stats.record_binding_methods(operations.operations().len());

    Ok(GeneratedOutput {
      graphql,
      binding,
      stats,
    })
  }
}

//! Serde model of the subset of an OpenAPI 3.x document the generator reads.
//!
//! Every mapping is an [`IndexMap`] so paths, schemas and properties keep the
//! order in which they were declared. Output determinism depends on it.
//!
//! Path items, operations and reusable components are parsed one by one
//! through [`Lenient`], so a malformed entry only costs that entry.

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use thiserror::Error;

/// Fatal problems with the input document. Everything else the generator
/// encounters is recorded as a non-fatal warning.
#[derive(Debug, Error)]
pub enum SpecError {
  #[error("OpenAPI document is missing the required `{0}` section")]
  MissingSection(&'static str),
  #[error("failed to parse OpenAPI document at `{path}`: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

impl From<serde_path_to_error::Error<serde_json::Error>> for SpecError {
  fn from(error: serde_path_to_error::Error<serde_json::Error>) -> Self {
    Self::Parse {
      path: error.path().to_string(),
      source: error.into_inner(),
    }
  }
}

/// A document fragment deserialized on its own. `Invalid` keeps the error,
/// prefixed with the location inside the fragment.
#[derive(Debug, Clone)]
pub enum Lenient<T> {
  Valid(T),
  Invalid(String),
}

impl<T> Lenient<T> {
  pub fn as_result(&self) -> Result<&T, &str> {
    match self {
      Self::Valid(value) => Ok(value),
      Self::Invalid(error) => Err(error),
    }
  }

  pub fn valid(&self) -> Option<&T> {
    self.as_result().ok()
  }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match serde_path_to_error::deserialize::<_, T>(value) {
      Ok(parsed) => Self::Valid(parsed),
      Err(error) => {
        let path = error.path().to_string();
        let source = error.into_inner();
        if path == "." {
          Self::Invalid(source.to_string())
        } else {
          Self::Invalid(format!("at `{path}`: {source}"))
        }
      }
    })
  }
}

pub type Paths = IndexMap<String, Lenient<PathItem>>;
pub type ComponentSchemas = IndexMap<String, Lenient<RawSchema>>;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiDocument {
  #[serde(default)]
  pub info: Info,
  #[serde(default)]
  pub servers: Vec<Server>,
  #[serde(default)]
  pub paths: Option<Paths>,
  #[serde(default)]
  pub components: Option<Components>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
  #[serde(default)]
  pub schemas: Option<ComponentSchemas>,
  #[serde(default)]
  pub parameters: IndexMap<String, Lenient<ObjectOrReference<Parameter>>>,
  #[serde(default)]
  pub responses: IndexMap<String, Lenient<ObjectOrReference<Response>>>,
}

/// Either an inline object or a `$ref` pointing at a reusable component.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ObjectOrReference<T> {
  Ref {
    #[serde(rename = "$ref")]
    ref_path: String,
  },
  Object(T),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
  #[serde(default)]
  pub parameters: Vec<ObjectOrReference<Parameter>>,
  pub get: Option<Lenient<Operation>>,
  pub put: Option<Lenient<Operation>>,
  pub post: Option<Lenient<Operation>>,
  pub delete: Option<Lenient<Operation>>,
  pub options: Option<Lenient<Operation>>,
  pub head: Option<Lenient<Operation>>,
  pub patch: Option<Lenient<Operation>>,
  pub trace: Option<Lenient<Operation>>,
}

impl PathItem {
  /// Operations of this path item in a fixed method order, `GET` first.
  pub fn methods(&self) -> Vec<(Method, &Lenient<Operation>)> {
    [
      (Method::GET, &self.get),
      (Method::PUT, &self.put),
      (Method::POST, &self.post),
      (Method::DELETE, &self.delete),
      (Method::OPTIONS, &self.options),
      (Method::HEAD, &self.head),
      (Method::PATCH, &self.patch),
      (Method::TRACE, &self.trace),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
    .collect()
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
  pub operation_id: Option<String>,
  pub summary: Option<String>,
  #[serde(default)]
  pub parameters: Vec<ObjectOrReference<Parameter>>,
  #[serde(default)]
  pub responses: IndexMap<String, ObjectOrReference<Response>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterIn {
  Query,
  Path,
  Header,
  Cookie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
  pub name: String,
  #[serde(rename = "in")]
  pub location: ParameterIn,
  #[serde(default)]
  pub required: bool,
  pub schema: Option<RawSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
  #[serde(default)]
  pub content: IndexMap<String, MediaTypeObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaTypeObject {
  pub schema: Option<RawSchema>,
}

/// The `type` keyword: a single name in OpenAPI 3.0, optionally a list in 3.1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchemaTypeSet {
  Single(String),
  Multiple(Vec<String>),
}

impl SchemaTypeSet {
  /// The first non-`null` type name.
  pub fn primary(&self) -> Option<&str> {
    match self {
      Self::Single(name) => Some(name.as_str()).filter(|name| *name != "null"),
      Self::Multiple(names) => names.iter().map(String::as_str).find(|name| *name != "null"),
    }
  }

  pub fn is_null(&self) -> bool {
    match self {
      Self::Single(name) => name == "null",
      Self::Multiple(names) => !names.is_empty() && names.iter().all(|name| name == "null"),
    }
  }
}

/// A schema object exactly as written in the document. Its shape is decided
/// once when it is converted into a [`SchemaNode`](super::schema::SchemaNode).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
  #[serde(rename = "$ref")]
  pub ref_path: Option<String>,
  #[serde(rename = "type")]
  pub schema_type: Option<SchemaTypeSet>,
  #[serde(default)]
  pub properties: IndexMap<String, RawSchema>,
  pub items: Option<Box<RawSchema>>,
  #[serde(default)]
  pub required: Vec<String>,
  #[serde(default)]
  pub any_of: Vec<RawSchema>,
  #[serde(default)]
  pub one_of: Vec<RawSchema>,
  #[serde(default)]
  pub all_of: Vec<RawSchema>,
}

impl OpenApiDocument {
  pub fn from_slice(bytes: &[u8]) -> Result<Self, SpecError> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
    Ok(serde_path_to_error::deserialize(deserializer)?)
  }

  pub fn from_value(value: serde_json::Value) -> Result<Self, SpecError> {
    Ok(serde_path_to_error::deserialize(value)?)
  }

  /// Returns the two sections generation cannot proceed without.
  pub fn required_sections(&self) -> Result<(&Paths, &ComponentSchemas), SpecError> {
    let paths = self.paths.as_ref().ok_or(SpecError::MissingSection("paths"))?;
    let schemas = self
      .components
      .as_ref()
      .and_then(|components| components.schemas.as_ref())
      .ok_or(SpecError::MissingSection("components.schemas"))?;
    Ok((paths, schemas))
  }

  /// Every well-formed operation in declaration order.
  pub fn operations(&self) -> impl Iterator<Item = (&str, Method, &Operation)> {
    self
      .paths
      .iter()
      .flatten()
      .filter_map(|(path, item)| Some((path, item.valid()?)))
      .flat_map(|(path, item)| {
        item
          .methods()
          .into_iter()
          .filter_map(move |(method, operation)| Some((path.as_str(), method, operation.valid()?)))
      })
  }

  pub fn first_server_url(&self) -> Option<&str> {
    self.servers.first().map(|server| server.url.as_str())
  }

  pub fn component_parameter(&self, name: &str) -> Option<&ObjectOrReference<Parameter>> {
    self.components.as_ref()?.parameters.get(name)?.valid()
  }

  pub fn component_response(&self, name: &str) -> Option<&ObjectOrReference<Response>> {
    self.components.as_ref()?.responses.get(name)?.valid()
  }
}

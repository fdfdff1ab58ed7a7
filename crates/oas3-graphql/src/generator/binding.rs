//! Rust REST binding emitted next to the SDL: one `reqwest` client struct per
//! API with one `async` method per GET operation.

use std::collections::BTreeSet;

use anyhow::Context as _;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::LitStr;

use crate::generator::{
  document::{Info, ParameterIn},
  naming::identifiers::{ensure_unique, to_rust_field_name},
  operation_registry::{OperationDescriptor, ParameterDescriptor},
  schema::{ScalarKind, SchemaNode},
  schema_registry::SchemaRegistry,
};

const CONSTRUCTOR_NAMES: [&str; 3] = ["new", "with_base_url", "with_client"];

fn lit(value: &str) -> LitStr {
  LitStr::new(value, Span::call_site())
}

fn rust_scalar(kind: ScalarKind) -> TokenStream {
  match kind {
    ScalarKind::Integer => quote! { i64 },
    ScalarKind::Float => quote! { f64 },
    ScalarKind::Boolean => quote! { bool },
    ScalarKind::String | ScalarKind::Any => quote! { String },
  }
}

/// How a parameter is passed to its method.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgumentShape {
  Scalar(ScalarKind),
  List(ScalarKind),
  Json,
}

impl ArgumentShape {
  fn of(node: &SchemaNode) -> Self {
    match node {
      SchemaNode::Primitive(kind) => Self::Scalar(*kind),
      SchemaNode::Array(item) => match item.as_ref() {
        SchemaNode::Primitive(kind) => Self::List(*kind),
        _ => Self::Json,
      },
      _ => Self::Json,
    }
  }

  fn argument_type(&self) -> TokenStream {
    match self {
      Self::Scalar(ScalarKind::String | ScalarKind::Any) => quote! { &str },
      Self::Scalar(kind) => rust_scalar(*kind),
      Self::List(kind) => {
        let item = rust_scalar(*kind);
        quote! { &[#item] }
      }
      Self::Json => quote! { &serde_json::Value },
    }
  }

  /// Expression rendering one argument value as text.
  fn to_text(&self, value: &TokenStream) -> TokenStream {
    match self {
      Self::List(_) => quote! {
        #value.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
      },
      _ => quote! { #value.to_string() },
    }
  }
}

struct MethodParameter<'a> {
  descriptor: &'a ParameterDescriptor,
  ident: syn::Ident,
  shape: ArgumentShape,
}

impl MethodParameter<'_> {
  fn signature(&self) -> TokenStream {
    let ident = &self.ident;
    let ty = self.shape.argument_type();
    if self.descriptor.required {
      quote! { #ident: #ty }
    } else {
      quote! { #ident: Option<#ty> }
    }
  }

  /// Runs `body` with `value` bound to the argument, skipping it when an
  /// optional argument is `None`.
  fn with_value(&self, body: impl FnOnce(&TokenStream) -> TokenStream) -> TokenStream {
    let ident = &self.ident;
    if self.descriptor.required {
      body(&quote! { #ident })
    } else {
      let inner = body(&quote! { value });
      quote! {
        if let Some(value) = #ident {
          #inner
        }
      }
    }
  }

  fn query_statement(&self) -> TokenStream {
    let name = lit(&self.descriptor.name);
    self.with_value(|value| match self.shape {
      ArgumentShape::List(_) => quote! {
        for item in #value {
          query.push((#name, item.to_string()));
        }
      },
      _ => quote! { query.push((#name, #value.to_string())); },
    })
  }

  fn header_statement(&self) -> TokenStream {
    let name = lit(&self.descriptor.name);
    self.with_value(|value| {
      let text = self.shape.to_text(value);
      quote! { request = request.header(#name, #text); }
    })
  }
}

/// Splits a path template into a `format!` string and the arguments filling
/// its placeholders. Placeholders without a matching path parameter stay
/// literal.
fn path_format(path: &str, parameters: &[MethodParameter<'_>]) -> (LitStr, Vec<TokenStream>) {
  let mut format = String::from("{}");
  let mut args = vec![quote! { self.base_url }];
  let mut rest = path;

  while let Some(start) = rest.find('{') {
    let Some(len) = rest[start..].find('}') else {
      break;
    };
    let name = &rest[start + 1..start + len];
    format.push_str(&rest[..start].replace('}', "}}"));

    match parameters
      .iter()
      .find(|param| param.descriptor.location == ParameterIn::Path && param.descriptor.name == name)
    {
      Some(param) => {
        format.push_str("{}");
        let ident = &param.ident;
        args.push(param.shape.to_text(&quote! { #ident }));
      }
      None => format.push_str(&format!("{{{{{name}}}}}")),
    }
    rest = &rest[start + len + 1..];
  }
  format.push_str(&rest.replace('{', "{{").replace('}', "}}"));

  (lit(&format), args)
}

pub(crate) struct BindingEmitter<'a> {
  registry: &'a SchemaRegistry,
  client_name: String,
  base_url: &'a str,
}

impl<'a> BindingEmitter<'a> {
  pub(crate) fn new(registry: &'a SchemaRegistry, namespace: &str, base_url: &'a str) -> Self {
    Self {
      registry,
      client_name: format!("{}Client", if namespace.is_empty() { "Api" } else { namespace }),
      base_url,
    }
  }

  /// Formatted Rust source with a generated-file header.
  pub(crate) fn emit(&self, info: &Info, operations: &[OperationDescriptor]) -> anyhow::Result<String> {
    let tokens = self.client_tokens(operations);
    let syntax_tree = syn::parse2::<syn::File>(tokens).context("parsing generated binding")?;
    let code = prettyplease::unparse(&syntax_tree);

    let mut header = vec!["//! AUTO-GENERATED CODE - DO NOT EDIT!".to_string(), "//!".to_string()];
    if !info.title.is_empty() {
      header.push(format!("//! {}", info.title));
    }
    if !info.version.is_empty() {
      header.push(format!("//! Version: {}", info.version));
    }
    header.push("//! Generated by `oas3-graphql`".to_string());

    Ok(format!("{}\n\n{code}", header.join("\n")))
  }

  fn client_tokens(&self, operations: &[OperationDescriptor]) -> TokenStream {
    let client_ident = format_ident!("{}", self.client_name);
    let base_url = lit(self.base_url);

    let mut taken = CONSTRUCTOR_NAMES.iter().map(ToString::to_string).collect::<BTreeSet<_>>();
    let methods = operations
      .iter()
      .map(|operation| {
        let name = ensure_unique(&to_rust_field_name(&operation.id), &taken);
        taken.insert(name.clone());
        self.method_tokens(&name, operation)
      })
      .collect::<Vec<_>>();

    quote! {
      use reqwest::Client;

      /// Base URL taken from the API description.
      pub const BASE_URL: &str = #base_url;

      #[derive(Debug, Clone)]
      pub struct #client_ident {
        client: Client,
        base_url: String,
      }

      impl Default for #client_ident {
        fn default() -> Self {
          Self::new()
        }
      }

      impl #client_ident {
        /// Create a client for [`BASE_URL`].
        #[must_use]
        pub fn new() -> Self {
          Self::with_base_url(BASE_URL)
        }

        /// Create a client with a custom base URL.
        #[must_use]
        pub fn with_base_url(base_url: impl Into<String>) -> Self {
          Self::with_client(base_url, Client::new())
        }

        /// Create a client from an existing `reqwest::Client`.
        #[must_use]
        pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
          let base_url = base_url.into().trim_end_matches('/').to_string();
          Self { client, base_url }
        }

        #(#methods)*
      }
    }
  }

  fn method_parameters<'o>(&self, operation: &'o OperationDescriptor) -> Vec<MethodParameter<'o>> {
    let mut taken = BTreeSet::from(["self".to_string(), "request".to_string(), "query".to_string()]);
    operation
      .parameters
      .iter()
      .filter(|param| param.location != ParameterIn::Cookie)
      .map(|descriptor| {
        let name = ensure_unique(&to_rust_field_name(&descriptor.name), &taken);
        taken.insert(name.clone());
        MethodParameter {
          descriptor,
          ident: format_ident!("{}", name),
          shape: ArgumentShape::of(&self.registry.flatten_scalars(&descriptor.schema)),
        }
      })
      .collect()
  }

  fn method_tokens(&self, name: &str, operation: &OperationDescriptor) -> TokenStream {
    let method_ident = format_ident!("{}", name);
    let parameters = self.method_parameters(operation);

    let mut docs = operation
      .summary
      .iter()
      .flat_map(|summary| summary.lines())
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(|line| {
        let line = lit(&format!(" {line}"));
        quote! { #[doc = #line] }
      })
      .collect::<Vec<_>>();
    let signature_doc = lit(&format!(" {} {}", operation.method, operation.path));
    docs.push(quote! { #[doc = #signature_doc] });

    let signature = parameters.iter().map(MethodParameter::signature);
    let (path_format, path_args) = path_format(&operation.path, &parameters);

    let query_statements = parameters
      .iter()
      .filter(|param| param.descriptor.location == ParameterIn::Query)
      .map(MethodParameter::query_statement)
      .collect::<Vec<_>>();
    let header_statements = parameters
      .iter()
      .filter(|param| param.descriptor.location == ParameterIn::Header)
      .map(MethodParameter::header_statement);

    let query = if query_statements.is_empty() {
      quote! {}
    } else {
      quote! {
        let mut query: Vec<(&str, String)> = Vec::new();
        #(#query_statements)*
        request = request.query(&query);
      }
    };

    quote! {
      #(#docs)*
      pub async fn #method_ident(&self, #(#signature),*) -> reqwest::Result<serde_json::Value> {
        let url = format!(#path_format, #(#path_args),*);
        #[allow(unused_mut)]
        let mut request = self.client.get(url);
        #query
        #(#header_statements)*
        request.send().await?.error_for_status()?.json().await
      }
    }
  }
}

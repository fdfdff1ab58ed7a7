pub(crate) mod binding;
pub(crate) mod connect;
pub mod document;
pub mod metrics;
pub(crate) mod naming;
pub(crate) mod operation_registry;
pub mod orchestrator;
pub mod responses;
pub(crate) mod schema;
pub(crate) mod schema_registry;
pub(crate) mod sdl;
pub(crate) mod selection;
pub(crate) mod type_mapper;

#[cfg(test)]
mod tests;

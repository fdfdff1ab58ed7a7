pub mod generate;
pub mod list;

pub use generate::{GenerateConfig, generate_schema};
pub use list::list_operations;

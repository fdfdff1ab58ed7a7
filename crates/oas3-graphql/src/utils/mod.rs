pub mod refs;
pub mod samples;
pub mod spec;

pub(crate) use refs::{parse_component_ref, parse_schema_ref_path};

//! JSON payload assembly from request facets.

mod assembler;
mod mapping;
mod path;

pub use assembler::assemble;
pub use mapping::{Facet, FieldMapping};
pub use path::{get_path, write_path};

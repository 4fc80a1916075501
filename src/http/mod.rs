//! HTTP-facing types: request facets in, result attributes out.

mod facets;
mod output;

pub use facets::RequestFacets;
pub use output::{attr, OutputFields};

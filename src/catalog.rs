//! The story catalog: an ordered, fixed set of track descriptors.
//!
//! The catalog is built once from a listing (a JSON manifest or a directory
//! scan) and sorted by title. Afterwards only each entry's duration and
//! readiness change.

mod model;
mod source;
mod title;

pub use model::*;
pub use source::{CatalogSource, Manifest, fetch_catalog};
pub use title::title_from_filename;

//! Point-in-Polygon (PIP) subzone store.
//!
//! Loads subzone boundaries from GeoJSON and answers containment queries
//! using an R-tree spatial index.

mod boundary;
mod index;
mod service;

pub use boundary::{load_subzones, parse_subzones, slugify};
pub use index::SubzoneSpatialIndex;
pub use service::PipService;

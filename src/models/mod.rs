//! Core data models for the resolution pipeline.

pub mod coordinate;
pub mod neighbourhood;
pub mod resolved;
pub mod subzone;

pub use coordinate::{Bbox, Coordinate};
pub use neighbourhood::{Neighbourhood, NeighbourhoodType};
pub use resolved::{Confidence, ResolutionMethod, ResolutionTier, ResolvedAddress};
pub use subzone::{SubzoneInfo, SubzonePolygon, SubzoneSummary};

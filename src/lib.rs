//! Waypost - location resolution for Singapore addresses
//!
//! Resolves postal codes, street names and free-text addresses into a subzone
//! and its curated neighbourhood, with a confidence tier describing how the
//! match was obtained.

pub mod api;
pub mod cache;
pub mod classify;
pub mod config;
pub mod containment;
pub mod error;
pub mod geocoder;
pub mod models;
pub mod neighbourhood;
pub mod pip;
pub mod resolver;
pub mod store;
pub mod street;

pub use error::{ResolveError, StoreError};
pub use models::{Confidence, Coordinate, ResolvedAddress, SubzoneSummary};
pub use resolver::AddressResolver;

//! Shape model: geometry, host ingestion and per-widget storage.

mod ingest;
mod shape;
mod store;

pub use ingest::{ShapeInput, batch_by_kind, parse_shapes};
pub use shape::{Bounds, Geometry, Point, Shape, ShapeId, ShapeKind, rectangle_corners};
pub use store::ShapeStore;

/// bdfutil core library - grid transforms for Nastran bulk data decks
///
/// This library provides the geometry kernel (rotation, translation and
/// scaling of point sets), a GRID card codec and a model that reads, edits
/// and writes BDF files.

pub mod bdf;
pub mod error;
pub mod geometry;
pub mod model;
pub mod transform;

// Re-export commonly used types
pub use bdf::{FieldFormat, GridCard};
pub use error::{Error, Result};
pub use geometry::PointSet;
pub use model::{BdfModel, ReadOptions};
pub use transform::{rotation_matrix, Transform};

pub use nalgebra::{Matrix3, Point3, Vector3};

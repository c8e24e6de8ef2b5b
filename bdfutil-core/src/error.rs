/// Error types for grid transforms and BDF I/O
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the geometry kernel and the BDF model.
#[derive(Debug, Error)]
pub enum Error {
    /// Rotation axis has zero (or non-finite) length and cannot be normalized.
    #[error("rotation axis ({vx}, {vy}, {vz}) has zero length")]
    DegenerateAxis { vx: f64, vy: f64, vz: f64 },

    /// Coordinate sequence does not match the number of points it replaces.
    #[error("expected {expected} coordinates, got {actual}")]
    CoordinateCountMismatch { expected: usize, actual: usize },

    /// Requested transform kind is not rotate, translate or scale.
    #[error("unknown operation `{0}` (expected rotate, translate or scale)")]
    UnknownOperation(String),

    /// Wrong number of numeric arguments for an operation.
    #[error("`{operation}` takes {expected} arguments, got {actual}")]
    ArgumentCount {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Malformed input, with the 1-based line it was found on.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("duplicate GRID id {id}")]
    DuplicateNode { id: u32 },

    /// A GRID references a coordinate system that no CORD card defines.
    #[error("GRID {node} references undefined coordinate system {cid}")]
    UnresolvedCoordinateSystem { node: u32, cid: u32 },

    #[error("GRID {id} has a non-finite coordinate")]
    NonFiniteCoordinate { id: u32 },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type for bdfutil operations.
pub type Result<T> = std::result::Result<T, Error>;

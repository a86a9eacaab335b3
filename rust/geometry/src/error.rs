use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing.
///
/// Public engine operations never return these for degenerate input; they
/// are resolved to empty meshes or fallbacks inside the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Degenerate polygon: {0}")]
    DegeneratePolygon(String),
}

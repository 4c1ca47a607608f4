//! Error types for canvas construction, export, rendering and model I/O

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("canvas dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("failed to allocate canvas buffers")]
    Allocation,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed PGM data: {0}")]
    Parse(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to allocate line buffer for {0} lines")]
    Allocation(usize),
}

/// Which kind of primitive carried a bad index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Edge,
    Face,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::Edge => write!(f, "edge"),
            PrimitiveKind::Face => write!(f, "face"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("{kind} {primitive} references vertex {index}, model has {vertex_count} vertices")]
    InvalidIndex {
        kind: PrimitiveKind,
        primitive: usize,
        index: usize,
        vertex_count: usize,
    },
}

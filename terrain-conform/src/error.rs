/// Error types for terrain reconstruction and mask generation.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    /// Grid has a zero width or height.
    #[error("Grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    /// Backing buffer length does not match the declared dimensions.
    #[error("Grid buffer holds {actual} values but {width}x{height} requires {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scene bounds are inverted or have no extent.
    #[error("Invalid scene bounds: {0}")]
    InvalidBounds(String),

    /// Requested coverage channel does not exist.
    #[error("Coverage channel {channel} out of range ({channels} channels available)")]
    ChannelOutOfRange { channel: usize, channels: usize },

    /// Mesh has more vertices than 32-bit indices can address.
    #[error("Mesh of {vertices} vertices exceeds the 32-bit index range")]
    MeshTooLarge { vertices: usize },

    /// Triangle refers to a vertex that does not exist.
    #[error("Mesh index {index} out of range for {vertices} vertices")]
    MeshIndex { index: usize, vertices: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DDS error: {0}")]
    Dds(#[from] ddsfile::Error),
}

pub type Result<T> = std::result::Result<T, TerrainError>;

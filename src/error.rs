use std::io;

/// All error types for the mesh attribute store.
#[derive(thiserror::Error, Debug)]
pub enum AttribError {
    #[error("Construction error: {0}")]
    Construction(String),
    #[error("Capacity error: {0}")]
    Capacity(String),
    #[error("Read-only error: {0}")]
    ReadOnly(String),
    #[error("Shape error: {0}")]
    Shape(String),
    #[error("Lookup error: {0}")]
    Lookup(String),
    #[error("Uninitialized error: {0}")]
    Uninitialized(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AttribError>;

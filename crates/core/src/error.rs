use thiserror::Error;

use crate::surface::SurfaceKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind:?} surface needs positive finite extents, got half-size {half_width}x{half_height}")]
    InvalidSurfaceConfiguration {
        kind: SurfaceKind,
        half_width: f32,
        half_height: f32,
    },

    /// A key event named a code outside the control map. Not fatal.
    #[error("unrecognized input code: {0}")]
    UnknownInputCode(String),

    #[error("invalid params: {0}")]
    InvalidParams(&'static str),

    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("params json: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

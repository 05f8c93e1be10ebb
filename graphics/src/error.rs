//! Graphics error types.

use thiserror::Error;

use crate::resources::DataSource;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// The device could not allocate or recreate a resource.
    #[error("device resources exhausted: {0}")]
    DeviceResourceExhausted(String),
    /// The texture's data source has no reconstruction path.
    #[error("no reconstruction path for data source {0:?}")]
    InvalidDataSource(DataSource),
    /// An asynchronous load has not completed yet. Poll `is_ready` instead.
    #[error("asynchronous reconstruction still pending")]
    AsyncReconstructionPending,
    /// An asynchronous load reported failure through its completion.
    #[error("texture load failed: {0}")]
    LoadFailed(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The operation needs a live device handle but the texture was released.
    #[error("texture has been released")]
    TextureReleased,
    /// The GPU device was lost.
    #[error("GPU device lost")]
    DeviceLost,
}

//! # Resurgence Graphics
//!
//! GPU texture records that survive loss of the device context.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Creates textures and rebuilds all of them after device loss
//! - [`Texture`] - Reference-counted texture record with an in-place [`Texture::rebuild`]
//! - [`TextureSource`] - The inputs each kind of texture is rebuilt from
//! - [`TextureBackend`] - Trait for the GPU layer that creates the device objects
//! - `DummyBackend` - In-memory backend for testing (`dummy` feature)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use resurgence_graphics::{DeviceParameters, DummyBackend, GraphicsDevice};
//!
//! let backend = Arc::new(DummyBackend::new());
//! let device = GraphicsDevice::new(backend.clone(), DeviceParameters::default());
//! let texture = device.create_texture(descriptor, TextureSource::raw(data))?;
//!
//! backend.lose_device();
//! let report = device.rebuild_all();
//! assert!(report.is_success());
//! ```

pub mod backend;
pub mod device;
pub mod error;
pub mod resources;
pub mod types;

// Re-export main types for convenience
#[cfg(feature = "dummy")]
pub use backend::DummyBackend;
pub use backend::{BuiltTexture, GpuFramebufferHandle, GpuTextureHandle, TextureBackend};
pub use device::{DeviceCapabilities, DeviceParameters, GraphicsDevice, RebuildReport};
pub use error::GraphicsError;
pub use resources::{
    DataSource, LodLevels, RebuildStatus, Texture, TextureData, TextureKey, TextureSource,
};
pub use types::{
    Extent3d, SamplerCache, SamplingMode, TextureDescriptor, TextureFormat, TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
pub fn init() {
    log::info!("Resurgence Graphics v{} initialized", VERSION);
}

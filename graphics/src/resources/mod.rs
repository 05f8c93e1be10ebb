//! GPU texture resources.
//!
//! This module contains the texture types created by [`GraphicsDevice`]:
//! - [`Texture`] - reference-counted texture that can be rebuilt after device loss
//! - [`TextureSource`] - where a texture's content comes from, per data source
//! - [`TextureKey`] - identity of a texture in its device's registry
//! - [`LodLevels`] - auxiliary LOD textures of filtered environments
//!
//! Textures are shared with [`Arc`] and carry their own reference count on
//! top of it, because the device object must be released as soon as the last
//! holder disposes it, not when the last `Arc` happens to drop.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod lod;
mod rebuild;
mod registry;
mod source;
mod texture;

pub use lod::LodLevels;
pub use rebuild::RebuildStatus;
pub use registry::TextureKey;
pub use source::{
    CubeSource, DataSource, DepthTextureSource, MultiRenderTargetSource, PrefilteredCubeSource,
    RawCubeSource, RawSource, RenderTargetSource, TextureData, TextureSource, UrlSource,
};
pub use texture::Texture;

pub(crate) use rebuild::{Readiness, build_resource, load_completion};
pub(crate) use registry::TextureRegistry;
pub(crate) use texture::TextureInit;

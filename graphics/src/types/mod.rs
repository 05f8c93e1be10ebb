//! Common types and descriptors for texture resources.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used throughout the graphics system.

mod common;
mod sampler;
mod texture;

pub use common::Extent3d;
pub use sampler::{
    AddressMode, CompareFunction, CoordinatesMode, FilterMode, SamplerCache, SamplingMode,
};
pub use texture::{
    TextureCompression, TextureDataType, TextureDescriptor, TextureFormat, TextureUsage,
};

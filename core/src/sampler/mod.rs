//! CPU-side sampler types.
//!
//! Provides [`SamplingMode`] presets for texture filtering, along with
//! [`FilterMode`], [`AddressMode`], [`CompareFunction`] and
//! [`CoordinatesMode`] enums shared between CPU and GPU code.

mod types;

pub use types::{AddressMode, CompareFunction, CoordinatesMode, FilterMode, SamplingMode};

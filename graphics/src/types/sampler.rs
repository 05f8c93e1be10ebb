//! Sampler state cached on textures.

// Re-export CPU-side types from core.
pub use resurgence_core::sampler::{
    AddressMode, CompareFunction, CoordinatesMode, FilterMode, SamplingMode,
};

/// Sampler state last applied to a texture by the sampler layer.
///
/// Every field is `None` until the sampler layer applies it. A rebuild resets
/// the whole cache, because the new device object carries none of the state
/// applied to the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerCache {
    /// Wrap mode for the U coordinate.
    pub wrap_u: Option<AddressMode>,
    /// Wrap mode for the V coordinate.
    pub wrap_v: Option<AddressMode>,
    /// Wrap mode for the R (W) coordinate.
    pub wrap_r: Option<AddressMode>,
    /// Anisotropic filtering level.
    pub anisotropic_level: Option<u16>,
    /// Texture coordinates mode.
    pub coordinates_mode: Option<CoordinatesMode>,
}

impl SamplerCache {
    /// Returns true if nothing has been applied since the last reset.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Forget everything the sampler layer applied.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }
}

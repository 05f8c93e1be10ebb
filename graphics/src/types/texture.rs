//! Texture types and descriptors.

use super::Extent3d;
use bitflags::bitflags;
use resurgence_core::sampler::SamplingMode;

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    // 8-bit formats
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 8-bit RG channels, unsigned normalized.
    Rg8Unorm,

    // 32-bit formats
    /// 32-bit red channel, float.
    R32Float,
    /// 16-bit RG channels, float.
    Rg16Float,
    /// 8-bit RGBA channels, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit BGRA channels, unsigned normalized.
    Bgra8Unorm,

    // 64-bit formats
    /// 16-bit RGBA channels, float.
    Rgba16Float,

    // 128-bit formats
    /// 32-bit RGBA channels, float.
    Rgba32Float,

    // Depth/stencil formats
    /// 16-bit depth.
    Depth16Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit depth, float.
    Depth32Float,
}

impl TextureFormat {
    /// Returns true if this is a depth or stencil format.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm | Self::Depth24PlusStencil8 | Self::Depth32Float
        )
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(self, Self::Depth24PlusStencil8)
    }

    /// Returns the size in bytes per pixel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::R8Unorm => 1,
            Self::Rg8Unorm | Self::Depth16Unorm => 2,
            Self::R32Float
            | Self::Rg16Float
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Bgra8Unorm
            | Self::Depth24PlusStencil8
            | Self::Depth32Float => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }
}

/// Component type of the texels stored in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDataType {
    /// 8-bit unsigned components.
    #[default]
    UnsignedByte,
    /// 16-bit float components.
    HalfFloat,
    /// 32-bit float components.
    Float,
    /// 32-bit unsigned integer components.
    UnsignedInt,
}

/// Block compression scheme of pre-compressed texture data.
///
/// Only carried as a tag so the backend can upload the blocks as-is; this
/// crate never encodes or decodes compressed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureCompression {
    /// BC1 (DXT1).
    Bc1,
    /// BC3 (DXT5).
    Bc3,
    /// BC7.
    Bc7,
    /// ETC2 RGBA.
    Etc2,
    /// ASTC 4x4.
    Astc4x4,
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a storage texture.
        const STORAGE_BINDING = 1 << 3;
        /// Texture can be used as a render attachment.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::TEXTURE_BINDING | Self::COPY_DST
    }
}

/// Sizing and format metadata of a texture.
///
/// Everything here is needed to recreate the texture identically after the
/// device loses it. `base_size` is the size originally requested, `size` is
/// what the backend actually allocated (it may round to powers of two).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Current size of the texture.
    pub size: Extent3d,
    /// Requested size, before any power-of-two adjustment.
    pub base_size: Extent3d,
    /// Texture format.
    pub format: TextureFormat,
    /// Texel component type.
    pub data_type: TextureDataType,
    /// Filtering preset.
    pub sampling_mode: SamplingMode,
    /// Whether mipmaps are generated.
    pub generate_mipmaps: bool,
    /// Whether rows are flipped on upload.
    pub invert_y: bool,
    /// Sample count for multisampling.
    pub sample_count: u32,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self::with_size(Extent3d::new_2d(width, height), format)
    }

    /// Create a new 3D texture descriptor.
    pub fn new_3d(width: u32, height: u32, depth: u32, format: TextureFormat) -> Self {
        Self::with_size(Extent3d::new_3d(width, height, depth), format)
    }

    fn with_size(size: Extent3d, format: TextureFormat) -> Self {
        Self {
            size,
            base_size: size,
            format,
            ..Default::default()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enable or disable mipmap generation.
    pub fn with_mipmaps(mut self, generate: bool) -> Self {
        self.generate_mipmaps = generate;
        self
    }

    /// Set the filtering preset.
    pub fn with_sampling_mode(mut self, mode: SamplingMode) -> Self {
        self.sampling_mode = mode;
        self
    }

    /// Set the texel component type.
    pub fn with_data_type(mut self, data_type: TextureDataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Flip rows on upload.
    pub fn with_invert_y(mut self, invert_y: bool) -> Self {
        self.invert_y = invert_y;
        self
    }

    /// Set the sample count for multisampling.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the usage flags.
    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            size: Extent3d::default(),
            base_size: Extent3d::default(),
            format: TextureFormat::default(),
            data_type: TextureDataType::default(),
            sampling_mode: SamplingMode::default(),
            generate_mipmaps: false,
            invert_y: false,
            sample_count: 1,
            usage: TextureUsage::default(),
        }
    }
}

//! Texture data sources.
//!
//! A [`TextureSource`] records where a texture's content came from, carrying
//! exactly the payload needed to recreate it after the device loses it. The
//! variant is fixed when the texture is created.

use std::sync::Arc;

use crate::types::{CompareFunction, TextureCompression, TextureUsage};

/// Plain tag of a [`TextureSource`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Origin unknown; cannot be rebuilt.
    Unknown,
    /// Loaded from a URL.
    Url,
    /// Transient texture, never rebuilt.
    Temp,
    /// Uploaded from a raw 2D buffer.
    Raw,
    /// Content written every frame by its owner.
    Dynamic,
    /// Render target.
    RenderTarget,
    /// Multiple render target.
    MultiRenderTarget,
    /// Cube map loaded from a URL or a file list.
    Cube,
    /// Cube map uploaded from raw face buffers.
    CubeRaw,
    /// Prefiltered environment cube map.
    CubePrefiltered,
    /// Uploaded from a raw 3D buffer.
    Raw3D,
    /// Depth (and optionally stencil) texture.
    DepthTexture,
}

/// Immutable, cheaply cloneable texel buffer kept for reconstruction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TextureData(Arc<[u8]>);

impl TextureData {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Copy a typed texel slice into a byte buffer.
    pub fn from_pod<T: bytemuck::Pod>(texels: &[T]) -> Self {
        Self(Arc::from(bytemuck::cast_slice::<T, u8>(texels)))
    }

    /// The buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextureData({} bytes)", self.0.len())
    }
}

/// Payload of a URL-loaded texture.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlSource {
    /// Location of the image.
    pub url: String,
    /// Encoded image kept in memory; used instead of fetching `url`.
    pub fallback: Option<TextureData>,
}

/// Payload of a texture uploaded from a raw 2D or 3D buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSource {
    /// Texel data for the top mip level.
    pub data: TextureData,
    /// Block compression of `data`, if any.
    pub compression: Option<TextureCompression>,
}

/// Payload of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderTargetSource {
    /// Attach a depth buffer.
    pub generate_depth_buffer: bool,
    /// Attach a stencil buffer.
    pub generate_stencil_buffer: bool,
    /// Six-face cube render target.
    pub is_cube: bool,
}

/// Payload of a multiple render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultiRenderTargetSource {
    /// Attachment settings shared by every color attachment.
    pub target: RenderTargetSource,
    /// Number of color attachments.
    pub attachment_count: u32,
}

/// Payload of a depth texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DepthTextureSource {
    /// Comparison function for shadow sampling.
    pub comparison: Option<CompareFunction>,
    /// Include a stencil aspect.
    pub generate_stencil: bool,
    /// Six-face cube depth texture.
    pub is_cube: bool,
}

/// Payload of a cube map loaded from a URL or a list of face files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeSource {
    /// Root URL of the cube map.
    pub url: String,
    /// Individual face files, if the cube is not a single container file.
    pub files: Vec<String>,
    /// Forced file extension, used when `url` carries none.
    pub extension: Option<String>,
}

/// Payload of a cube map uploaded from raw face buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCubeSource {
    /// Six face buffers in +X, -X, +Y, -Y, +Z, -Z order.
    pub faces: Vec<TextureData>,
    /// Block compression of the faces, if any.
    pub compression: Option<TextureCompression>,
}

/// Payload of a prefiltered environment cube map.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefilteredCubeSource {
    /// Location of the environment.
    pub url: String,
    /// Scale applied to roughness when selecting a mip level.
    pub lod_generation_scale: f32,
    /// Offset applied to roughness when selecting a mip level.
    pub lod_generation_offset: f32,
    /// Forced file extension, used when `url` carries none.
    pub extension: Option<String>,
}

/// Origin of a texture's content, with everything needed to recreate it.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    /// Origin unknown. The texture can be created but never rebuilt.
    Unknown,
    /// Loaded from a URL.
    Url(UrlSource),
    /// Transient texture. Never rebuilt.
    Temp,
    /// Uploaded from a raw 2D buffer.
    Raw(RawSource),
    /// Content owned and refilled by someone else.
    Dynamic,
    /// Render target.
    RenderTarget(RenderTargetSource),
    /// Multiple render target.
    MultiRenderTarget(MultiRenderTargetSource),
    /// Cube map loaded from a URL or a file list.
    Cube(CubeSource),
    /// Cube map uploaded from raw face buffers.
    CubeRaw(RawCubeSource),
    /// Prefiltered environment cube map.
    CubePrefiltered(PrefilteredCubeSource),
    /// Uploaded from a raw 3D buffer.
    Raw3D(RawSource),
    /// Depth texture.
    DepthTexture(DepthTextureSource),
}

impl TextureSource {
    /// The plain tag of this source.
    pub fn data_source(&self) -> DataSource {
        match self {
            Self::Unknown => DataSource::Unknown,
            Self::Url(_) => DataSource::Url,
            Self::Temp => DataSource::Temp,
            Self::Raw(_) => DataSource::Raw,
            Self::Dynamic => DataSource::Dynamic,
            Self::RenderTarget(_) => DataSource::RenderTarget,
            Self::MultiRenderTarget(_) => DataSource::MultiRenderTarget,
            Self::Cube(_) => DataSource::Cube,
            Self::CubeRaw(_) => DataSource::CubeRaw,
            Self::CubePrefiltered(_) => DataSource::CubePrefiltered,
            Self::Raw3D(_) => DataSource::Raw3D,
            Self::DepthTexture(_) => DataSource::DepthTexture,
        }
    }

    /// Returns true if the texture has six faces.
    pub fn is_cube(&self) -> bool {
        match self {
            Self::Cube(_) | Self::CubeRaw(_) | Self::CubePrefiltered(_) => true,
            Self::RenderTarget(rt) => rt.is_cube,
            Self::MultiRenderTarget(mrt) => mrt.target.is_cube,
            Self::DepthTexture(depth) => depth.is_cube,
            _ => false,
        }
    }

    /// Returns true if the texture is a volume texture.
    pub fn is_3d(&self) -> bool {
        matches!(self, Self::Raw3D(_))
    }

    /// Returns true if creating this texture completes through a load callback.
    pub fn is_async(&self) -> bool {
        matches!(
            self,
            Self::Url(_) | Self::Cube(_) | Self::CubePrefiltered(_)
        )
    }

    /// Usage flags the device object needs beyond the descriptor's own.
    pub fn required_usage(&self) -> TextureUsage {
        match self {
            Self::RenderTarget(_) | Self::MultiRenderTarget(_) | Self::DepthTexture(_) => {
                TextureUsage::RENDER_ATTACHMENT
            }
            _ => TextureUsage::empty(),
        }
    }

    /// Build a URL source without fallback data.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(UrlSource {
            url: url.into(),
            fallback: None,
        })
    }

    /// Build a raw 2D source without compression.
    pub fn raw(data: TextureData) -> Self {
        Self::Raw(RawSource {
            data,
            compression: None,
        })
    }

    /// Build a raw 3D source without compression.
    pub fn raw_3d(data: TextureData) -> Self {
        Self::Raw3D(RawSource {
            data,
            compression: None,
        })
    }
}

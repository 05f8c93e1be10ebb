//! GPU backend abstraction layer.
//!
//! The [`TextureBackend`] trait is the narrow capability interface through
//! which textures reach the device: one creation entry point per data source,
//! plus release calls. Everything that touches actual GPU memory (allocation,
//! upload, image decoding, mipmap generation, prefiltering) lives behind it.
//!
//! # Available Backends
//!
//! - `DummyBackend`: in-process backend for tests and headless use (`dummy` feature)

#[cfg(feature = "dummy")]
pub mod dummy;

#[cfg(feature = "dummy")]
pub use dummy::{BackendCall, DummyBackend, DummyBackendConfig};

use resurgence_core::spherical::SphericalPolynomial;

use crate::error::GraphicsError;
use crate::resources::{LodLevels, TextureData};
use crate::types::{
    CompareFunction, Extent3d, SamplingMode, TextureCompression, TextureDataType,
    TextureDescriptor, TextureFormat, TextureUsage,
};

/// Opaque handle to a device texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuTextureHandle(u64);

impl GpuTextureHandle {
    /// Wrap a backend-specific id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The backend-specific id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a framebuffer or depth-stencil object attached to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuFramebufferHandle(u64);

impl GpuFramebufferHandle {
    /// Wrap a backend-specific id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The backend-specific id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Callback fired when an asynchronous texture load finishes.
pub type LoadCompletion = Box<dyn FnOnce(Result<(), GraphicsError>) + Send + 'static>;

/// Device objects produced by a backend creation call.
///
/// Never handed to consumers: the device merges it into a texture
/// immediately (or wraps it in a new texture on first creation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTexture {
    /// The new texture object.
    pub handle: GpuTextureHandle,
    /// Allocated size, when the backend knows it at creation time.
    ///
    /// `None` for content that is still loading.
    pub size: Option<Extent3d>,
    /// Framebuffer or depth-stencil object, for render targets.
    pub framebuffer: Option<GpuFramebufferHandle>,
    /// Auxiliary LOD textures, for filtered environments.
    pub lods: LodLevels<GpuTextureHandle>,
}

impl BuiltTexture {
    /// A bare texture object with nothing attached.
    pub fn new(handle: GpuTextureHandle) -> Self {
        Self {
            handle,
            size: None,
            framebuffer: None,
            lods: LodLevels::default(),
        }
    }

    /// Set the allocated size.
    pub fn with_size(mut self, size: Extent3d) -> Self {
        self.size = Some(size);
        self
    }

    /// Attach a framebuffer object.
    pub fn with_framebuffer(mut self, framebuffer: GpuFramebufferHandle) -> Self {
        self.framebuffer = Some(framebuffer);
        self
    }

    /// Attach LOD textures.
    pub fn with_lods(mut self, lods: LodLevels<GpuTextureHandle>) -> Self {
        self.lods = lods;
        self
    }
}

// ============================================================================
// Creation requests
// ============================================================================

/// Inputs for loading a texture from a URL.
#[derive(Debug, Clone, Copy)]
pub struct UrlTextureRequest<'a> {
    /// Location of the encoded image.
    pub url: &'a str,
    /// Skip mipmap generation.
    pub no_mipmap: bool,
    /// Flip rows on upload.
    pub invert_y: bool,
    /// Filtering preset.
    pub sampling_mode: SamplingMode,
    /// Encoded image to use instead of fetching `url`.
    pub fallback: Option<&'a TextureData>,
    /// Texel format.
    pub format: TextureFormat,
}

/// Inputs for uploading a raw 2D or 3D buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawTextureRequest<'a> {
    /// Texel data, tightly packed unless compressed.
    pub data: &'a TextureData,
    /// Requested size; depth above one means a volume texture.
    pub size: Extent3d,
    /// Texel format.
    pub format: TextureFormat,
    /// Component type of `data`.
    pub data_type: TextureDataType,
    /// Generate the mip chain after upload.
    pub generate_mipmaps: bool,
    /// Flip rows on upload.
    pub invert_y: bool,
    /// Filtering preset.
    pub sampling_mode: SamplingMode,
    /// Block compression of `data`, if any.
    pub compression: Option<TextureCompression>,
    /// Create a volume texture.
    pub is_3d: bool,
}

/// Inputs for allocating a dynamic texture.
#[derive(Debug, Clone, Copy)]
pub struct DynamicTextureRequest {
    /// Requested size.
    pub size: Extent3d,
    /// Allocate a mip chain.
    pub generate_mipmaps: bool,
    /// Filtering preset.
    pub sampling_mode: SamplingMode,
}

/// Inputs for creating a render target or multiple render target.
#[derive(Debug, Clone, Copy)]
pub struct RenderTargetRequest {
    /// Target size; for cube targets only the width is used.
    pub size: Extent3d,
    /// Attach a depth buffer.
    pub generate_depth_buffer: bool,
    /// Attach a stencil buffer.
    pub generate_stencil_buffer: bool,
    /// Allocate a mip chain.
    pub generate_mipmaps: bool,
    /// Filtering preset.
    pub sampling_mode: SamplingMode,
    /// Component type of the color attachments.
    pub data_type: TextureDataType,
    /// Color format.
    pub format: TextureFormat,
    /// Create a cube render target.
    pub is_cube: bool,
    /// Samples per texel.
    pub sample_count: u32,
    /// Number of color attachments; one for plain render targets.
    pub attachment_count: u32,
    /// Usage flags; must include [`TextureUsage::RENDER_ATTACHMENT`].
    pub usage: TextureUsage,
}

/// Inputs for creating a depth texture.
#[derive(Debug, Clone, Copy)]
pub struct DepthTextureRequest {
    /// Requested size; for cube textures only the width is used.
    pub size: Extent3d,
    /// Sample with bilinear filtering.
    pub bilinear_filtering: bool,
    /// Comparison function for shadow sampling.
    pub comparison: Option<CompareFunction>,
    /// Attach a stencil buffer.
    pub generate_stencil: bool,
    /// Create a cube depth texture.
    pub is_cube: bool,
    /// Usage flags; must include [`TextureUsage::RENDER_ATTACHMENT`].
    pub usage: TextureUsage,
}

/// Inputs for loading a cube map.
#[derive(Debug, Clone, Copy)]
pub struct CubeTextureRequest<'a> {
    /// Base location of the faces.
    pub url: &'a str,
    /// One file per face, when the faces are stored separately.
    pub files: &'a [String],
    /// Skip mipmap generation.
    pub no_mipmap: bool,
    /// Texel format.
    pub format: TextureFormat,
    /// Container extension overriding the one in `url`.
    pub extension: Option<&'a str>,
}

/// Inputs for uploading a cube map from raw face buffers.
#[derive(Debug, Clone, Copy)]
pub struct RawCubeTextureRequest<'a> {
    /// Six face buffers.
    pub faces: &'a [TextureData],
    /// Edge length of each face.
    pub size: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Component type of the faces.
    pub data_type: TextureDataType,
    /// Generate the mip chain after upload.
    pub generate_mipmaps: bool,
    /// Flip rows on upload.
    pub invert_y: bool,
    /// Filtering preset.
    pub sampling_mode: SamplingMode,
    /// Block compression of the faces, if any.
    pub compression: Option<TextureCompression>,
}

/// Inputs for loading a prefiltered environment cube map.
#[derive(Debug, Clone, Copy)]
pub struct PrefilteredCubeRequest<'a> {
    /// Location of the environment.
    pub url: &'a str,
    /// Scale applied to roughness when picking a mip level.
    pub lod_generation_scale: f32,
    /// Offset applied to roughness when picking a mip level.
    pub lod_generation_offset: f32,
    /// Texel format.
    pub format: TextureFormat,
    /// Container extension overriding the one in `url`.
    pub extension: Option<&'a str>,
    /// Irradiance of the environment, carried over from the texture being rebuilt.
    pub spherical_polynomial: Option<&'a SphericalPolynomial>,
}

// ============================================================================
// Backend trait
// ============================================================================

/// Device capability interface used to create and destroy texture objects.
///
/// Creation calls return [`GraphicsError::DeviceResourceExhausted`] when the
/// device cannot allocate. Asynchronous calls return the new object right
/// away and report content completion through `on_load`; a failed load is
/// reported as `Err` through the same callback.
pub trait TextureBackend: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Allocate an empty texture object, for temporary and unknown sources.
    fn allocate_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Load a texture from a URL.
    fn create_url_texture(
        &self,
        request: &UrlTextureRequest<'_>,
        on_load: LoadCompletion,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Upload a raw 2D or 3D texture.
    fn create_raw_texture(
        &self,
        request: &RawTextureRequest<'_>,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Allocate a texture whose content is written by its owner.
    fn create_dynamic_texture(
        &self,
        request: &DynamicTextureRequest,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Create a render target with its framebuffer.
    fn create_render_target(
        &self,
        request: &RenderTargetRequest,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Create a multiple render target with its framebuffer.
    fn create_multi_render_target(
        &self,
        request: &RenderTargetRequest,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Create a depth texture with its depth-stencil object.
    fn create_depth_texture(
        &self,
        request: &DepthTextureRequest,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Load a cube map.
    fn create_cube_texture(
        &self,
        request: &CubeTextureRequest<'_>,
        on_load: LoadCompletion,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Upload a cube map from raw faces.
    fn create_raw_cube_texture(
        &self,
        request: &RawCubeTextureRequest<'_>,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Load a prefiltered environment cube map.
    fn create_prefiltered_cube_texture(
        &self,
        request: &PrefilteredCubeRequest<'_>,
        on_load: LoadCompletion,
    ) -> Result<BuiltTexture, GraphicsError>;

    /// Free a texture object. Releasing an unknown or already freed handle is a no-op.
    fn release_texture(&self, handle: GpuTextureHandle);

    /// Free a framebuffer object. Releasing an unknown or already freed handle is a no-op.
    fn release_framebuffer(&self, handle: GpuFramebufferHandle);
}

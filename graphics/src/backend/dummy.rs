//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations but hands out unique
//! handles and tracks their lifetime, so the texture layer can be exercised
//! without GPU hardware. Asynchronous loads are queued until the test calls
//! [`DummyBackend::complete_pending_loads`] or [`DummyBackend::fail_pending_loads`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use resurgence_core::spherical::SphericalPolynomial;

use crate::error::GraphicsError;
use crate::resources::LodLevels;
use crate::types::{Extent3d, TextureDescriptor, TextureUsage};

use super::{
    BuiltTexture, CubeTextureRequest, DepthTextureRequest, DynamicTextureRequest,
    GpuFramebufferHandle, GpuTextureHandle, LoadCompletion, PrefilteredCubeRequest,
    RawCubeTextureRequest, RawTextureRequest, RenderTargetRequest, TextureBackend,
    UrlTextureRequest,
};

/// Creation entry point hit on the dummy backend, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCall {
    /// `allocate_texture`.
    Allocate,
    /// `create_url_texture`.
    Url,
    /// `create_raw_texture` for a 2D texture.
    Raw,
    /// `create_raw_texture` for a volume texture.
    Raw3D,
    /// `create_dynamic_texture`.
    Dynamic,
    /// `create_render_target`.
    RenderTarget,
    /// `create_multi_render_target`.
    MultiRenderTarget,
    /// `create_depth_texture`.
    DepthTexture,
    /// `create_cube_texture`.
    Cube,
    /// `create_raw_cube_texture`.
    CubeRaw,
    /// `create_prefiltered_cube_texture`.
    CubePrefiltered,
}

/// Behavior switches of the dummy backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DummyBackendConfig {
    /// Round 2D texture sizes up to powers of two, like devices without NPOT support.
    pub power_of_two: bool,
    /// Produce three LOD textures for every prefiltered cube map.
    pub prefiltered_lods: bool,
    /// Refuse allocations once this many textures are live.
    pub max_live_textures: Option<usize>,
}

impl DummyBackendConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Round 2D sizes up to powers of two.
    pub fn with_power_of_two(mut self, enabled: bool) -> Self {
        self.power_of_two = enabled;
        self
    }

    /// Produce LOD textures for prefiltered cube maps.
    pub fn with_prefiltered_lods(mut self, enabled: bool) -> Self {
        self.prefiltered_lods = enabled;
        self
    }

    /// Cap the number of live textures.
    pub fn with_max_live_textures(mut self, max: usize) -> Self {
        self.max_live_textures = Some(max);
        self
    }
}

struct PendingLoad {
    handle: GpuTextureHandle,
    on_load: LoadCompletion,
}

#[derive(Default)]
struct DummyState {
    live_textures: HashSet<GpuTextureHandle>,
    live_framebuffers: HashSet<GpuFramebufferHandle>,
    texture_releases: HashMap<GpuTextureHandle, u32>,
    framebuffer_releases: HashMap<GpuFramebufferHandle, u32>,
    forced_failures: u32,
    pending_loads: Vec<PendingLoad>,
    calls: Vec<BackendCall>,
    polynomials: Vec<Option<SphericalPolynomial>>,
}

/// Dummy GPU backend.
pub struct DummyBackend {
    config: DummyBackendConfig,
    next_id: AtomicU64,
    state: Mutex<DummyState>,
}

impl DummyBackend {
    /// Create a new dummy backend with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DummyBackendConfig::default())
    }

    /// Create a new dummy backend.
    pub fn with_config(config: DummyBackendConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            state: Mutex::new(DummyState::default()),
        }
    }

    /// Get the backend configuration.
    pub fn config(&self) -> &DummyBackendConfig {
        &self.config
    }

    /// Make the next `count` creation calls fail with `DeviceResourceExhausted`.
    pub fn fail_next_allocations(&self, count: u32) {
        self.state.lock().forced_failures = count;
    }

    /// Simulate losing the device context.
    ///
    /// Every live object becomes invalid and in-flight loads fail with
    /// [`GraphicsError::DeviceLost`].
    pub fn lose_device(&self) {
        let pending = {
            let mut state = self.state.lock();
            state.live_textures.clear();
            state.live_framebuffers.clear();
            std::mem::take(&mut state.pending_loads)
        };
        log::debug!(
            "DummyBackend: device lost, {} pending loads dropped",
            pending.len()
        );
        for load in pending {
            (load.on_load)(Err(GraphicsError::DeviceLost));
        }
    }

    /// Finish every queued asynchronous load successfully.
    ///
    /// Returns the number of loads completed.
    pub fn complete_pending_loads(&self) -> usize {
        let pending = std::mem::take(&mut self.state.lock().pending_loads);
        let count = pending.len();
        for load in pending {
            log::trace!("DummyBackend: load of {:?} complete", load.handle);
            (load.on_load)(Ok(()));
        }
        count
    }

    /// Fail every queued asynchronous load.
    ///
    /// Returns the number of loads failed.
    pub fn fail_pending_loads(&self, reason: &str) -> usize {
        let pending = std::mem::take(&mut self.state.lock().pending_loads);
        let count = pending.len();
        for load in pending {
            log::trace!("DummyBackend: load of {:?} failed: {reason}", load.handle);
            (load.on_load)(Err(GraphicsError::LoadFailed(reason.to_string())));
        }
        count
    }

    /// Number of asynchronous loads waiting for completion.
    pub fn pending_load_count(&self) -> usize {
        self.state.lock().pending_loads.len()
    }

    /// Number of live texture objects.
    pub fn live_texture_count(&self) -> usize {
        self.state.lock().live_textures.len()
    }

    /// Number of live framebuffer objects.
    pub fn live_framebuffer_count(&self) -> usize {
        self.state.lock().live_framebuffers.len()
    }

    /// Returns true if the texture object exists on the device.
    pub fn is_texture_live(&self, handle: GpuTextureHandle) -> bool {
        self.state.lock().live_textures.contains(&handle)
    }

    /// How many times `release_texture` was called for this handle.
    pub fn texture_release_count(&self, handle: GpuTextureHandle) -> u32 {
        self.state
            .lock()
            .texture_releases
            .get(&handle)
            .copied()
            .unwrap_or(0)
    }

    /// How many times `release_framebuffer` was called for this handle.
    pub fn framebuffer_release_count(&self, handle: GpuFramebufferHandle) -> u32 {
        self.state
            .lock()
            .framebuffer_releases
            .get(&handle)
            .copied()
            .unwrap_or(0)
    }

    /// Creation calls made so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    /// Number of creation calls made so far.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Spherical polynomials received by prefiltered cube creations, in order.
    pub fn prefiltered_polynomials(&self) -> Vec<Option<SphericalPolynomial>> {
        self.state.lock().polynomials.clone()
    }

    fn next_texture(&self, state: &mut DummyState) -> Result<GpuTextureHandle, GraphicsError> {
        if let Some(max) = self.config.max_live_textures {
            if state.live_textures.len() >= max {
                return Err(GraphicsError::DeviceResourceExhausted(format!(
                    "live texture limit {max} reached"
                )));
            }
        }
        let handle = GpuTextureHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        state.live_textures.insert(handle);
        Ok(handle)
    }

    fn next_framebuffer(&self, state: &mut DummyState) -> GpuFramebufferHandle {
        let handle = GpuFramebufferHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        state.live_framebuffers.insert(handle);
        handle
    }

    /// Record the call and allocate its texture object.
    fn begin(
        &self,
        state: &mut DummyState,
        call: BackendCall,
    ) -> Result<GpuTextureHandle, GraphicsError> {
        state.calls.push(call);
        if state.forced_failures > 0 {
            state.forced_failures -= 1;
            return Err(GraphicsError::DeviceResourceExhausted(format!(
                "injected failure for {call:?}"
            )));
        }
        self.next_texture(state)
    }

    fn adjust(&self, size: Extent3d) -> Result<Extent3d, GraphicsError> {
        if !self.config.power_of_two {
            return Ok(size);
        }
        size.checked_power_of_two().ok_or_else(|| {
            GraphicsError::InvalidParameter(format!(
                "{}x{} has no power-of-two size",
                size.width, size.height
            ))
        })
    }

    /// Allocate the three LOD objects of a prefiltered cube, all or none.
    fn lod_handles(
        &self,
        state: &mut DummyState,
    ) -> Result<LodLevels<GpuTextureHandle>, GraphicsError> {
        let mut handles = Vec::with_capacity(3);
        for _ in 0..3 {
            match self.next_texture(state) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    for handle in handles {
                        state.live_textures.remove(&handle);
                    }
                    return Err(err);
                }
            }
        }
        Ok(LodLevels::new(
            handles.first().copied(),
            handles.get(1).copied(),
            handles.get(2).copied(),
        ))
    }

    fn require_render_attachment(usage: TextureUsage) -> Result<(), GraphicsError> {
        if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
            Ok(())
        } else {
            Err(GraphicsError::InvalidParameter(format!(
                "render attachment usage missing from {usage:?}"
            )))
        }
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DummyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DummyBackend")
            .field("config", &self.config)
            .field("live_textures", &state.live_textures.len())
            .field("pending_loads", &state.pending_loads.len())
            .finish()
    }
}

impl TextureBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn allocate_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<BuiltTexture, GraphicsError> {
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::Allocate)?;
        log::trace!(
            "DummyBackend: allocated texture {:?} {:?}",
            handle,
            descriptor.label
        );
        Ok(BuiltTexture::new(handle).with_size(descriptor.size))
    }

    fn create_url_texture(
        &self,
        request: &UrlTextureRequest<'_>,
        on_load: LoadCompletion,
    ) -> Result<BuiltTexture, GraphicsError> {
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::Url)?;
        log::trace!(
            "DummyBackend: loading {} into {:?} (fallback: {})",
            request.url,
            handle,
            request.fallback.is_some()
        );
        state.pending_loads.push(PendingLoad { handle, on_load });
        Ok(BuiltTexture::new(handle))
    }

    fn create_raw_texture(
        &self,
        request: &RawTextureRequest<'_>,
    ) -> Result<BuiltTexture, GraphicsError> {
        if request.compression.is_none() {
            let expected = request.size.texel_count() * request.format.block_size() as u64;
            if (request.data.len() as u64) < expected {
                return Err(GraphicsError::InvalidParameter(format!(
                    "raw texture data is {} bytes, expected {expected}",
                    request.data.len()
                )));
            }
        }

        let (call, size) = if request.is_3d {
            (BackendCall::Raw3D, request.size)
        } else {
            (BackendCall::Raw, self.adjust(request.size)?)
        };
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, call)?;
        log::trace!(
            "DummyBackend: uploaded raw texture {:?} ({}x{}x{})",
            handle,
            size.width,
            size.height,
            size.depth
        );
        Ok(BuiltTexture::new(handle).with_size(size))
    }

    fn create_dynamic_texture(
        &self,
        request: &DynamicTextureRequest,
    ) -> Result<BuiltTexture, GraphicsError> {
        let size = self.adjust(request.size)?;
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::Dynamic)?;
        Ok(BuiltTexture::new(handle).with_size(size))
    }

    fn create_render_target(
        &self,
        request: &RenderTargetRequest,
    ) -> Result<BuiltTexture, GraphicsError> {
        Self::require_render_attachment(request.usage)?;
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::RenderTarget)?;
        let framebuffer = self.next_framebuffer(&mut state);
        let size = if request.is_cube {
            Extent3d::square(request.size.width)
        } else {
            request.size
        };
        log::trace!(
            "DummyBackend: created render target {:?} with framebuffer {:?}",
            handle,
            framebuffer
        );
        Ok(BuiltTexture::new(handle)
            .with_size(size)
            .with_framebuffer(framebuffer))
    }

    fn create_multi_render_target(
        &self,
        request: &RenderTargetRequest,
    ) -> Result<BuiltTexture, GraphicsError> {
        if request.attachment_count == 0 {
            return Err(GraphicsError::InvalidParameter(
                "multiple render target needs at least one attachment".to_string(),
            ));
        }
        Self::require_render_attachment(request.usage)?;
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::MultiRenderTarget)?;
        let framebuffer = self.next_framebuffer(&mut state);
        Ok(BuiltTexture::new(handle)
            .with_size(request.size)
            .with_framebuffer(framebuffer))
    }

    fn create_depth_texture(
        &self,
        request: &DepthTextureRequest,
    ) -> Result<BuiltTexture, GraphicsError> {
        Self::require_render_attachment(request.usage)?;
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::DepthTexture)?;
        let framebuffer = self.next_framebuffer(&mut state);
        let size = if request.is_cube {
            Extent3d::square(request.size.width)
        } else {
            request.size
        };
        Ok(BuiltTexture::new(handle)
            .with_size(size)
            .with_framebuffer(framebuffer))
    }

    fn create_cube_texture(
        &self,
        request: &CubeTextureRequest<'_>,
        on_load: LoadCompletion,
    ) -> Result<BuiltTexture, GraphicsError> {
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::Cube)?;
        log::trace!(
            "DummyBackend: loading cube {} ({} files) into {:?}",
            request.url,
            request.files.len(),
            handle
        );
        state.pending_loads.push(PendingLoad { handle, on_load });
        Ok(BuiltTexture::new(handle))
    }

    fn create_raw_cube_texture(
        &self,
        request: &RawCubeTextureRequest<'_>,
    ) -> Result<BuiltTexture, GraphicsError> {
        if request.faces.len() != 6 {
            return Err(GraphicsError::InvalidParameter(format!(
                "raw cube texture needs 6 faces, got {}",
                request.faces.len()
            )));
        }
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::CubeRaw)?;
        Ok(BuiltTexture::new(handle).with_size(Extent3d::square(request.size)))
    }

    fn create_prefiltered_cube_texture(
        &self,
        request: &PrefilteredCubeRequest<'_>,
        on_load: LoadCompletion,
    ) -> Result<BuiltTexture, GraphicsError> {
        let mut state = self.state.lock();
        let handle = self.begin(&mut state, BackendCall::CubePrefiltered)?;
        let lods = if self.config.prefiltered_lods {
            match self.lod_handles(&mut state) {
                Ok(lods) => lods,
                Err(err) => {
                    state.live_textures.remove(&handle);
                    return Err(err);
                }
            }
        } else {
            LodLevels::default()
        };
        state
            .polynomials
            .push(request.spherical_polynomial.copied());
        log::trace!(
            "DummyBackend: loading prefiltered cube {} into {:?} ({} LOD textures)",
            request.url,
            handle,
            lods.count()
        );
        state.pending_loads.push(PendingLoad { handle, on_load });
        Ok(BuiltTexture::new(handle).with_lods(lods))
    }

    fn release_texture(&self, handle: GpuTextureHandle) {
        let mut state = self.state.lock();
        *state.texture_releases.entry(handle).or_insert(0) += 1;
        if state.live_textures.remove(&handle) {
            log::trace!("DummyBackend: released texture {:?}", handle);
        }
    }

    fn release_framebuffer(&self, handle: GpuFramebufferHandle) {
        let mut state = self.state.lock();
        *state.framebuffer_releases.entry(handle).or_insert(0) += 1;
        if state.live_framebuffers.remove(&handle) {
            log::trace!("DummyBackend: released framebuffer {:?}", handle);
        }
    }
}

// Ensure DummyBackend is Send + Sync
static_assertions::assert_impl_all!(DummyBackend: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::resources::TextureData;
    use crate::types::{SamplingMode, TextureDataType, TextureFormat};

    fn raw_request(data: &TextureData, size: Extent3d) -> RawTextureRequest<'_> {
        RawTextureRequest {
            data,
            size,
            format: TextureFormat::Rgba8Unorm,
            data_type: TextureDataType::UnsignedByte,
            generate_mipmaps: false,
            invert_y: false,
            sampling_mode: SamplingMode::Nearest,
            compression: None,
            is_3d: false,
        }
    }

    #[test]
    fn test_backend_name() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy Backend");
    }

    #[test]
    fn test_handles_are_unique() {
        let backend = DummyBackend::new();
        let desc = TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm);
        let a = backend.allocate_texture(&desc).unwrap();
        let b = backend.allocate_texture(&desc).unwrap();
        assert_ne!(a.handle, b.handle);
        assert_eq!(backend.live_texture_count(), 2);
    }

    #[test]
    fn test_release_is_idempotent_but_counted() {
        let backend = DummyBackend::new();
        let desc = TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm);
        let built = backend.allocate_texture(&desc).unwrap();

        backend.release_texture(built.handle);
        backend.release_texture(built.handle);
        assert!(!backend.is_texture_live(built.handle));
        assert_eq!(backend.texture_release_count(built.handle), 2);
    }

    #[test]
    fn test_injected_failures() {
        let backend = DummyBackend::new();
        backend.fail_next_allocations(1);
        let desc = TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm);
        assert!(matches!(
            backend.allocate_texture(&desc),
            Err(GraphicsError::DeviceResourceExhausted(_))
        ));
        assert!(backend.allocate_texture(&desc).is_ok());
    }

    #[test]
    fn test_live_texture_limit() {
        let backend = DummyBackend::with_config(DummyBackendConfig::new().with_max_live_textures(1));
        let desc = TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm);
        let first = backend.allocate_texture(&desc).unwrap();
        assert!(backend.allocate_texture(&desc).is_err());
        backend.release_texture(first.handle);
        assert!(backend.allocate_texture(&desc).is_ok());
    }

    #[test]
    fn test_raw_texture_rejects_short_data() {
        let backend = DummyBackend::new();
        let data = TextureData::new(vec![0u8; 15]);
        let result = backend.create_raw_texture(&raw_request(&data, Extent3d::new_2d(2, 2)));
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
    }

    #[test]
    fn test_power_of_two_rounding() {
        let backend = DummyBackend::with_config(DummyBackendConfig::new().with_power_of_two(true));
        let data = TextureData::new(vec![0u8; 3 * 5 * 4]);
        let built = backend
            .create_raw_texture(&raw_request(&data, Extent3d::new_2d(3, 5)))
            .unwrap();
        assert_eq!(built.size, Some(Extent3d::new_2d(4, 8)));
    }

    #[test]
    fn test_pending_loads_complete() {
        let backend = DummyBackend::new();
        let loaded = Arc::new(AtomicBool::new(false));
        let flag = loaded.clone();
        let request = UrlTextureRequest {
            url: "textures/grass.png",
            no_mipmap: false,
            invert_y: true,
            sampling_mode: SamplingMode::Trilinear,
            fallback: None,
            format: TextureFormat::Rgba8Unorm,
        };
        backend
            .create_url_texture(
                &request,
                Box::new(move |result| flag.store(result.is_ok(), Ordering::SeqCst)),
            )
            .unwrap();

        assert_eq!(backend.pending_load_count(), 1);
        assert_eq!(backend.complete_pending_loads(), 1);
        assert!(loaded.load(Ordering::SeqCst));
        assert_eq!(backend.pending_load_count(), 0);
    }

    #[test]
    fn test_lose_device_fails_pending_loads() {
        let backend = DummyBackend::new();
        let outcome = Arc::new(Mutex::new(None));
        let slot = outcome.clone();
        let request = CubeTextureRequest {
            url: "env/sky",
            files: &[],
            no_mipmap: true,
            format: TextureFormat::Rgba8Unorm,
            extension: Some(".dds"),
        };
        let built = backend
            .create_cube_texture(&request, Box::new(move |result| *slot.lock() = Some(result)))
            .unwrap();

        backend.lose_device();
        assert!(!backend.is_texture_live(built.handle));
        assert_eq!(*outcome.lock(), Some(Err(GraphicsError::DeviceLost)));
    }

    #[test]
    fn test_prefiltered_lod_failure_releases_everything() {
        let backend = DummyBackend::with_config(
            DummyBackendConfig::new()
                .with_prefiltered_lods(true)
                .with_max_live_textures(2),
        );
        let request = PrefilteredCubeRequest {
            url: "env/studio.env",
            lod_generation_scale: 0.8,
            lod_generation_offset: 0.0,
            format: TextureFormat::Rgba16Float,
            extension: None,
            spherical_polynomial: None,
        };
        let result = backend.create_prefiltered_cube_texture(&request, Box::new(|_| {}));

        assert!(matches!(
            result,
            Err(GraphicsError::DeviceResourceExhausted(_))
        ));
        assert_eq!(backend.live_texture_count(), 0);
        assert_eq!(backend.pending_load_count(), 0);
        assert!(backend.prefiltered_polynomials().is_empty());
    }

    #[test]
    fn test_attachments_need_render_usage() {
        let backend = DummyBackend::new();
        let mut target = RenderTargetRequest {
            size: Extent3d::new_2d(64, 64),
            generate_depth_buffer: true,
            generate_stencil_buffer: false,
            generate_mipmaps: false,
            sampling_mode: SamplingMode::Bilinear,
            data_type: TextureDataType::UnsignedByte,
            format: TextureFormat::Rgba8Unorm,
            is_cube: false,
            sample_count: 1,
            attachment_count: 1,
            usage: TextureUsage::default(),
        };
        assert!(matches!(
            backend.create_render_target(&target),
            Err(GraphicsError::InvalidParameter(_))
        ));
        target.usage |= TextureUsage::RENDER_ATTACHMENT;
        assert!(backend.create_render_target(&target).is_ok());

        let depth = DepthTextureRequest {
            size: Extent3d::new_2d(64, 64),
            bilinear_filtering: false,
            comparison: None,
            generate_stencil: false,
            is_cube: false,
            usage: TextureUsage::TEXTURE_BINDING,
        };
        assert!(matches!(
            backend.create_depth_texture(&depth),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert_eq!(backend.live_texture_count(), 1);
    }
}

//! GPU texture resource.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use resurgence_core::spherical::SphericalPolynomial;

use crate::backend::{GpuFramebufferHandle, GpuTextureHandle};
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::types::{Extent3d, SamplerCache, SamplingMode, TextureDescriptor, TextureFormat};

use super::{DataSource, LodLevels, TextureKey, TextureSource};

/// Mutable part of a texture, guarded by the texture's lock.
pub(crate) struct TextureState {
    pub(crate) handle: Option<GpuTextureHandle>,
    pub(crate) reference_count: u32,
    pub(crate) descriptor: TextureDescriptor,
    pub(crate) framebuffer: Option<GpuFramebufferHandle>,
    pub(crate) lods: LodLevels<Arc<Texture>>,
    pub(crate) spherical_polynomial: Option<SphericalPolynomial>,
    pub(crate) sampler_cache: SamplerCache,
    pub(crate) rebuild_count: u32,
}

/// A reference-counted GPU texture that survives device loss.
///
/// Textures are created by [`GraphicsDevice::create_texture`] with a
/// reference count of one. Every holder that wants to share the device
/// object calls [`add_reference`](Self::add_reference) and later
/// [`dispose`](Self::dispose); the device object is released when the count
/// reaches zero.
///
/// After the device is lost, [`rebuild`](Self::rebuild) recreates the device
/// object from the texture's [`TextureSource`] and swaps it in place, so every
/// existing `Arc<Texture>` keeps working.
///
/// # Example
///
/// ```ignore
/// let texture = device.create_texture(
///     TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm),
///     TextureSource::raw(TextureData::new(vec![0u8; 64])),
/// )?;
/// texture.add_reference();
/// texture.dispose(); // still live
/// texture.dispose(); // released
/// ```
pub struct Texture {
    device: Arc<GraphicsDevice>,
    key: TextureKey,
    source: TextureSource,
    ready: Arc<AtomicBool>,
    pub(crate) state: Mutex<TextureState>,
}

/// Everything a new texture starts with.
pub(crate) struct TextureInit {
    pub(crate) key: TextureKey,
    pub(crate) source: TextureSource,
    pub(crate) descriptor: TextureDescriptor,
    pub(crate) handle: GpuTextureHandle,
    pub(crate) framebuffer: Option<GpuFramebufferHandle>,
    pub(crate) lods: LodLevels<Arc<Texture>>,
    pub(crate) ready: Arc<AtomicBool>,
}

impl Texture {
    /// Create a new texture (called by GraphicsDevice).
    pub(crate) fn new(device: Arc<GraphicsDevice>, init: TextureInit) -> Self {
        Self {
            device,
            key: init.key,
            source: init.source,
            ready: init.ready,
            state: Mutex::new(TextureState {
                handle: Some(init.handle),
                reference_count: 1,
                descriptor: init.descriptor,
                framebuffer: init.framebuffer,
                lods: init.lods,
                spherical_polynomial: None,
                sampler_cache: SamplerCache::default(),
                rebuild_count: 0,
            }),
        }
    }

    /// Get the parent device.
    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// Get the registry key of this texture.
    pub fn key(&self) -> TextureKey {
        self.key
    }

    /// Get the source the texture is rebuilt from.
    pub fn source(&self) -> &TextureSource {
        &self.source
    }

    /// Get the data source tag.
    pub fn data_source(&self) -> DataSource {
        self.source.data_source()
    }

    /// Returns true if the texture is a cube map.
    pub fn is_cube(&self) -> bool {
        self.source.is_cube()
    }

    /// Returns true if the texture is a volume texture.
    pub fn is_3d(&self) -> bool {
        self.source.is_3d()
    }

    pub(crate) fn ready_flag(&self) -> &Arc<AtomicBool> {
        &self.ready
    }

    /// Get the current device object, or `None` once released.
    pub fn handle(&self) -> Option<GpuTextureHandle> {
        self.state.lock().handle
    }

    /// Returns true until the last reference is disposed.
    pub fn is_live(&self) -> bool {
        self.state.lock().handle.is_some()
    }

    /// Returns true if the device still tracks this texture.
    pub fn is_tracked(&self) -> bool {
        self.device.is_tracked(self.key)
    }

    /// Get the number of outstanding references.
    pub fn reference_count(&self) -> u32 {
        self.state.lock().reference_count
    }

    /// Returns true once the texture content is on the device.
    ///
    /// Do not sample a texture that is not ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Mark the content as filled.
    ///
    /// Used by content owners of dynamic and temporary textures, whose content
    /// this layer never fills itself.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Check that the texture can be sampled.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::TextureReleased`] if the texture was released and
    /// [`GraphicsError::AsyncReconstructionPending`] while its content is loading.
    pub fn ensure_ready(&self) -> Result<(), GraphicsError> {
        if !self.is_live() {
            return Err(GraphicsError::TextureReleased);
        }
        if !self.is_ready() {
            return Err(GraphicsError::AsyncReconstructionPending);
        }
        Ok(())
    }

    /// Get a copy of the texture descriptor.
    pub fn descriptor(&self) -> TextureDescriptor {
        self.state.lock().descriptor.clone()
    }

    /// Get the current texture size.
    pub fn size(&self) -> Extent3d {
        self.state.lock().descriptor.size
    }

    /// Get the size originally requested.
    pub fn base_size(&self) -> Extent3d {
        self.state.lock().descriptor.base_size
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.size().width
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.size().height
    }

    /// Get the texture depth.
    pub fn depth(&self) -> u32 {
        self.size().depth
    }

    /// Number of texels in the current size.
    pub fn texel_count(&self) -> u64 {
        self.size().texel_count()
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.state.lock().descriptor.format
    }

    /// Get the filtering preset.
    pub fn sampling_mode(&self) -> SamplingMode {
        self.state.lock().descriptor.sampling_mode
    }

    /// Get the texture label, if set.
    pub fn label(&self) -> Option<String> {
        self.state.lock().descriptor.label.clone()
    }

    /// Get the framebuffer attached to a render target or depth texture.
    pub fn framebuffer(&self) -> Option<GpuFramebufferHandle> {
        self.state.lock().framebuffer
    }

    /// Get the sharpest auxiliary LOD texture.
    pub fn lod_high(&self) -> Option<Arc<Texture>> {
        self.state.lock().lods.high.clone()
    }

    /// Get the middle auxiliary LOD texture.
    pub fn lod_mid(&self) -> Option<Arc<Texture>> {
        self.state.lock().lods.mid.clone()
    }

    /// Get the blurriest auxiliary LOD texture.
    pub fn lod_low(&self) -> Option<Arc<Texture>> {
        self.state.lock().lods.low.clone()
    }

    /// Get the spherical polynomial of a prefiltered environment.
    pub fn spherical_polynomial(&self) -> Option<SphericalPolynomial> {
        self.state.lock().spherical_polynomial
    }

    /// Set the spherical polynomial of a prefiltered environment.
    pub fn set_spherical_polynomial(&self, polynomial: Option<SphericalPolynomial>) {
        self.state.lock().spherical_polynomial = polynomial;
    }

    /// Get the sampler state last applied to this texture.
    pub fn sampler_cache(&self) -> SamplerCache {
        self.state.lock().sampler_cache
    }

    /// Record the sampler state the sampler layer just applied.
    pub fn set_sampler_cache(&self, cache: SamplerCache) {
        self.state.lock().sampler_cache = cache;
    }

    /// Number of successful rebuilds so far.
    pub fn rebuild_count(&self) -> u32 {
        self.state.lock().rebuild_count
    }

    /// Update the size metadata.
    ///
    /// Sets both the current and the base size. No device call is made; the
    /// caller resizes the device object separately.
    pub fn update_size(&self, size: Extent3d) {
        let mut state = self.state.lock();
        state.descriptor.size = size;
        state.descriptor.base_size = size;
    }

    /// Share the device object with one more holder.
    pub fn add_reference(&self) {
        let mut state = self.state.lock();
        if state.handle.is_none() {
            log::warn!("Texture {:?}: add_reference on a released texture", self.key);
            return;
        }
        state.reference_count = state.reference_count.saturating_add(1);
    }

    /// Drop one reference, releasing the device object with the last one.
    ///
    /// Does nothing once the texture has been released.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        let Some(handle) = state.handle else {
            return;
        };

        state.reference_count = state.reference_count.saturating_sub(1);
        if state.reference_count > 0 {
            log::trace!(
                "Texture {:?}: disposed, {} references left",
                self.key,
                state.reference_count
            );
            return;
        }

        let framebuffer = state.framebuffer.take();
        self.device.release_texture(self.key, handle, framebuffer);
        state.handle = None;
        let lods = std::mem::take(&mut state.lods);
        drop(state);

        for lod in lods.into_slots().into_iter().flatten() {
            lod.dispose();
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(handle) = state.handle.take() {
            log::debug!(
                "Texture {:?} dropped with {} outstanding references",
                self.key,
                state.reference_count
            );
            self.device
                .release_texture(self.key, handle, state.framebuffer.take());
        }
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Texture")
            .field("key", &self.key)
            .field("source", &self.source.data_source())
            .field("handle", &state.handle)
            .field("references", &state.reference_count)
            .field("size", &state.descriptor.size)
            .field("format", &state.descriptor.format)
            .field("label", &state.descriptor.label)
            .field("ready", &self.is_ready())
            .finish()
    }
}

// Ensure Texture is Send + Sync
static_assertions::assert_impl_all!(Texture: Send, Sync);

//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating textures. It owns
//! the [`TextureBackend`] that talks to the GPU and a registry that tracks
//! every live texture, and it drives bulk rebuilds after the device context
//! is lost. Lookups into the registry return snapshots, so no lock is held
//! while callers rebuild or dispose what they found.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::backend::{GpuFramebufferHandle, GpuTextureHandle, TextureBackend};
use crate::error::GraphicsError;
use crate::resources::{
    DataSource, LodLevels, Readiness, RebuildStatus, Texture, TextureInit, TextureKey,
    TextureRegistry, TextureSource, build_resource, load_completion,
};
use crate::types::TextureDescriptor;

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
    /// Maximum 3D texture dimension.
    pub max_volume_dimension: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_texture_dimension: 16384,
            max_volume_dimension: 2048,
        }
    }
}

/// Parameters for creating a [`GraphicsDevice`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceParameters {
    /// Device name, for logs.
    pub name: String,
    /// Limits enforced when creating textures.
    pub capabilities: DeviceCapabilities,
}

impl DeviceParameters {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the device capabilities.
    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the maximum texture dimension.
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.capabilities.max_texture_dimension = max;
        self
    }
}

impl Default for DeviceParameters {
    fn default() -> Self {
        Self {
            name: "Resurgence Device".to_string(),
            capabilities: DeviceCapabilities::default(),
        }
    }
}

/// Result of rebuilding every live texture.
///
/// Textures rebuild independently, so a report routinely mixes successes and
/// failures. Failed textures stay not ready until rebuilt again or dropped.
#[derive(Debug, Default)]
pub struct RebuildReport {
    /// Textures whose device object was replaced synchronously.
    pub rebuilt: Vec<TextureKey>,
    /// Textures whose device object was replaced and whose content is loading.
    pub pending: Vec<TextureKey>,
    /// Textures that needed no rebuild.
    pub skipped: Vec<TextureKey>,
    /// Textures that could not be rebuilt, with the reason.
    pub failed: Vec<(TextureKey, GraphicsError)>,
}

impl RebuildReport {
    /// Returns true if no texture failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of textures visited.
    pub fn total(&self) -> usize {
        self.rebuilt.len() + self.pending.len() + self.skipped.len() + self.failed.len()
    }
}

/// A graphics device for creating textures.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync`, but textures are meant to be created,
/// disposed and rebuilt from the render thread only; the internal locks are
/// never contended in that use.
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(DummyBackend::new());
/// let device = GraphicsDevice::new(backend, DeviceParameters::default());
///
/// let target = device.create_texture(
///     TextureDescriptor::new_2d(256, 256, TextureFormat::Rgba8Unorm),
///     TextureSource::RenderTarget(RenderTargetSource::default()),
/// )?;
///
/// // ...device lost...
/// let report = device.rebuild_all();
/// ```
pub struct GraphicsDevice {
    name: String,
    capabilities: DeviceCapabilities,
    backend: Arc<dyn TextureBackend>,
    registry: RwLock<TextureRegistry>,
}

impl GraphicsDevice {
    /// Create a new graphics device on top of a backend.
    pub fn new(backend: Arc<dyn TextureBackend>, parameters: DeviceParameters) -> Arc<Self> {
        log::info!(
            "Creating GraphicsDevice '{}' on {}",
            parameters.name,
            backend.name()
        );
        Arc::new(Self {
            name: parameters.name,
            capabilities: parameters.capabilities,
            backend,
            registry: RwLock::new(TextureRegistry::new()),
        })
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Get the GPU backend.
    pub fn backend(&self) -> &Arc<dyn TextureBackend> {
        &self.backend
    }

    /// Keys of every tracked texture, in creation order.
    ///
    /// The list is a snapshot; textures may be rebuilt or disposed while
    /// walking it.
    pub fn texture_keys(&self) -> Vec<TextureKey> {
        self.registry.read().keys().collect()
    }

    /// Returns true if the key belongs to a texture this device still tracks.
    pub fn is_tracked(&self, key: TextureKey) -> bool {
        self.registry.read().contains(key)
    }

    /// Get a tracked texture by key, if it is still alive.
    pub fn texture(&self, key: TextureKey) -> Option<Arc<Texture>> {
        self.registry.read().get(key)
    }

    /// Create a texture.
    ///
    /// The returned texture holds one reference and a live device object.
    /// Synchronous sources are ready immediately; URL and cube sources become
    /// ready when their load completes; dynamic, temporary and unknown sources
    /// wait for their owner to call [`Texture::mark_ready`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if the size exceeds device
    /// limits and [`GraphicsError::DeviceResourceExhausted`] if the backend
    /// cannot allocate.
    pub fn create_texture(
        self: &Arc<Self>,
        mut descriptor: TextureDescriptor,
        source: TextureSource,
    ) -> Result<Arc<Texture>, GraphicsError> {
        self.validate(&descriptor, &source)?;
        descriptor.usage |= source.required_usage();

        let key = self.registry.write().reserve_key();
        let ready = Arc::new(AtomicBool::new(false));

        let built = build_resource(
            self.backend.as_ref(),
            &descriptor,
            &source,
            None,
            || load_completion(&ready, key),
        );
        let (built, readiness) = match built {
            Ok(Some(built)) => built,
            Ok(None) | Err(GraphicsError::InvalidDataSource(_)) => (
                self.backend.allocate_texture(&descriptor)?,
                Readiness::ContentOwned,
            ),
            Err(err) => return Err(err),
        };

        let lods = self.wrap_lod_textures(&built.lods, descriptor.label.as_deref());

        if let Some(size) = built.size {
            descriptor.size = size;
        }
        if readiness == Readiness::Ready {
            ready.store(true, Ordering::Release);
        }

        log::trace!(
            "GraphicsDevice: created {:?} texture {:?} {:?}, size={}x{}x{}",
            source.data_source(),
            key,
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height,
            descriptor.size.depth
        );

        let texture = Arc::new(Texture::new(
            Arc::clone(self),
            TextureInit {
                key,
                source,
                descriptor,
                handle: built.handle,
                framebuffer: built.framebuffer,
                lods,
                ready,
            },
        ));
        self.registry.write().insert(&texture);
        Ok(texture)
    }

    fn validate(
        &self,
        descriptor: &TextureDescriptor,
        source: &TextureSource,
    ) -> Result<(), GraphicsError> {
        let max_dim = if source.is_3d() {
            self.capabilities.max_volume_dimension
        } else {
            self.capabilities.max_texture_dimension
        };
        if descriptor.base_size.max_dimension() > max_dim {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture dimension exceeds maximum {max_dim}"
            )));
        }
        if let TextureSource::CubeRaw(cube) = source {
            if descriptor.base_size.width != descriptor.base_size.height {
                return Err(GraphicsError::InvalidParameter(format!(
                    "cube faces must be square, got {}x{}",
                    descriptor.base_size.width, descriptor.base_size.height
                )));
            }
            if cube.faces.len() != 6 {
                return Err(GraphicsError::InvalidParameter(format!(
                    "cube texture needs 6 faces, got {}",
                    cube.faces.len()
                )));
            }
        }
        Ok(())
    }

    /// Wrap backend LOD handles into temporary textures owned by their parent.
    pub(crate) fn wrap_lod_textures(
        self: &Arc<Self>,
        lods: &LodLevels<GpuTextureHandle>,
        parent_label: Option<&str>,
    ) -> LodLevels<Arc<Texture>> {
        let names = ["high", "mid", "low"];
        let handles = lods.clone().into_slots();
        let mut wrapped: [Option<Arc<Texture>>; 3] = [None, None, None];

        for ((slot, handle), name) in wrapped.iter_mut().zip(handles).zip(names) {
            let Some(handle) = handle else {
                continue;
            };
            let descriptor = TextureDescriptor {
                label: parent_label.map(|label| format!("{label}_lod_{name}")),
                ..TextureDescriptor::default()
            };

            let key = self.registry.write().reserve_key();
            let texture = Arc::new(Texture::new(
                Arc::clone(self),
                TextureInit {
                    key,
                    source: TextureSource::Temp,
                    descriptor,
                    handle,
                    framebuffer: None,
                    lods: LodLevels::default(),
                    // Prefiltered LOD content is produced by the backend itself.
                    ready: Arc::new(AtomicBool::new(true)),
                },
            ));
            self.registry.write().insert(&texture);
            *slot = Some(texture);
        }

        let [high, mid, low] = wrapped;
        LodLevels::new(high, mid, low)
    }

    /// Release a texture's device objects and stop tracking it.
    ///
    /// The texture leaves the registry before its handle is freed.
    pub(crate) fn release_texture(
        &self,
        key: TextureKey,
        handle: GpuTextureHandle,
        framebuffer: Option<GpuFramebufferHandle>,
    ) {
        self.registry.write().remove(key);
        self.backend.release_texture(handle);
        if let Some(framebuffer) = framebuffer {
            self.backend.release_framebuffer(framebuffer);
        }
        log::trace!("GraphicsDevice: released texture {:?} ({:?})", key, handle);
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Get every live texture, in creation order.
    ///
    /// The list is a snapshot that holds no lock.
    pub fn live_textures(&self) -> Vec<Arc<Texture>> {
        self.registry.read().live()
    }

    /// Clean up registry entries of textures that no longer exist.
    pub fn cleanup_dead_resources(&self) {
        let removed = self.registry.write().prune();
        if removed > 0 {
            log::trace!("GraphicsDevice: pruned {} dead texture entries", removed);
        }
    }

    /// Rebuild every live texture after the device context was lost.
    ///
    /// Temporary textures are skipped. Each texture is rebuilt independently;
    /// a failure is recorded in the report and does not stop the others.
    pub fn rebuild_all(&self) -> RebuildReport {
        let textures = self.live_textures();
        let mut report = RebuildReport::default();

        for texture in &textures {
            let key = texture.key();
            if texture.data_source() == DataSource::Temp {
                report.skipped.push(key);
                continue;
            }
            match texture.rebuild() {
                Ok(RebuildStatus::Rebuilt { .. }) => report.rebuilt.push(key),
                Ok(RebuildStatus::Pending) => report.pending.push(key),
                Ok(RebuildStatus::Skipped) => report.skipped.push(key),
                Err(err) => {
                    log::warn!("GraphicsDevice: failed to rebuild texture {:?}: {}", key, err);
                    report.failed.push((key, err));
                }
            }
        }

        log::info!(
            "GraphicsDevice: rebuilt {} textures ({} pending, {} skipped, {} failed)",
            report.rebuilt.len(),
            report.pending.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, DummyBackendConfig};
    use crate::resources::{RawCubeSource, RenderTargetSource, TextureData};
    use crate::types::{Extent3d, TextureFormat, TextureUsage};

    fn create_test_device() -> (Arc<GraphicsDevice>, Arc<DummyBackend>) {
        let backend = Arc::new(DummyBackend::new());
        let device = GraphicsDevice::new(backend.clone(), DeviceParameters::default());
        (device, backend)
    }

    #[test]
    fn test_device_name() {
        let (device, _backend) = create_test_device();
        assert_eq!(device.name(), "Resurgence Device");
        assert_eq!(device.backend().name(), "Dummy Backend");
    }

    #[test]
    fn test_create_texture_tracks_it() {
        let (device, _backend) = create_test_device();
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(512, 512, TextureFormat::Rgba8Unorm),
                TextureSource::RenderTarget(RenderTargetSource::default()),
            )
            .unwrap();
        assert_eq!(texture.width(), 512);
        assert_eq!(texture.reference_count(), 1);
        assert!(texture.is_ready());
        assert!(texture.framebuffer().is_some());
        assert_eq!(device.texture_count(), 1);
        assert!(texture.is_tracked());
    }

    #[test]
    fn test_create_texture_too_large() {
        let backend = Arc::new(DummyBackend::new());
        let device = GraphicsDevice::new(
            backend.clone(),
            DeviceParameters::new().with_max_texture_dimension(1024),
        );
        let result = device.create_texture(
            TextureDescriptor::new_2d(2048, 16, TextureFormat::Rgba8Unorm),
            TextureSource::Dynamic,
        );
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_create_raw_cube_needs_six_faces() {
        let (device, _backend) = create_test_device();
        let result = device.create_texture(
            TextureDescriptor::new_2d(2, 2, TextureFormat::Rgba8Unorm),
            TextureSource::CubeRaw(RawCubeSource {
                faces: vec![TextureData::new(vec![0u8; 16]); 5],
                compression: None,
            }),
        );
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
    }

    #[test]
    fn test_create_texture_allocation_failure() {
        let (device, backend) = create_test_device();
        backend.fail_next_allocations(1);
        let result = device.create_texture(
            TextureDescriptor::new_2d(8, 8, TextureFormat::Rgba8Unorm),
            TextureSource::Dynamic,
        );
        assert!(matches!(
            result,
            Err(GraphicsError::DeviceResourceExhausted(_))
        ));
        assert_eq!(device.texture_count(), 0);
    }

    #[test]
    fn test_zero_sized_temp_texture() {
        let (device, _backend) = create_test_device();
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(0, 0, TextureFormat::Rgba8Unorm),
                TextureSource::Temp,
            )
            .unwrap();
        assert_eq!(texture.texel_count(), 0);
        assert!(!texture.is_ready());
    }

    #[test]
    fn test_power_of_two_keeps_base_size() {
        let backend = Arc::new(DummyBackend::with_config(
            DummyBackendConfig::new().with_power_of_two(true),
        ));
        let device = GraphicsDevice::new(backend, DeviceParameters::default());
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(100, 60, TextureFormat::Rgba8Unorm),
                TextureSource::Dynamic,
            )
            .unwrap();
        assert_eq!(texture.size(), Extent3d::new_2d(128, 64));
        assert_eq!(texture.base_size(), Extent3d::new_2d(100, 60));
    }

    #[test]
    fn test_resource_cleanup() {
        let (device, _backend) = create_test_device();
        {
            let texture = device
                .create_texture(
                    TextureDescriptor::new_2d(8, 8, TextureFormat::Rgba8Unorm),
                    TextureSource::Dynamic,
                )
                .unwrap();
            texture.dispose();
            assert_eq!(device.texture_count(), 0);
        }
        device.cleanup_dead_resources();
        assert!(device.texture_keys().is_empty());
    }

    #[test]
    fn test_render_target_usage() {
        let (device, _backend) = create_test_device();
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(64, 64, TextureFormat::Rgba8Unorm),
                TextureSource::RenderTarget(RenderTargetSource::default()),
            )
            .unwrap();
        let usage = texture.descriptor().usage;
        assert!(usage.contains(TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING));

        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(8, 8, TextureFormat::Rgba8Unorm),
                TextureSource::Dynamic,
            )
            .unwrap();
        assert_eq!(texture.descriptor().usage, TextureUsage::default());
    }

    #[test]
    fn test_lookup_by_key() {
        let (device, _backend) = create_test_device();
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(8, 8, TextureFormat::Rgba8Unorm),
                TextureSource::Dynamic,
            )
            .unwrap();
        let key = texture.key();
        assert!(device.is_tracked(key));
        assert!(Arc::ptr_eq(&device.texture(key).unwrap(), &texture));

        texture.dispose();
        assert!(!device.is_tracked(key));
        assert!(device.texture(key).is_none());
    }
}

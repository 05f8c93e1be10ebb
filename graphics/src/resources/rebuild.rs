//! Texture reconstruction after device loss.
//!
//! [`Texture::rebuild`] matches on the texture's [`TextureSource`], asks the
//! backend for a fresh device object built from exactly that source's inputs,
//! and merges the result into the texture in place. The freshly built
//! [`BuiltTexture`] is consumed by the merge and never becomes visible to
//! anyone holding the texture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use resurgence_core::spherical::SphericalPolynomial;

use crate::backend::{
    BuiltTexture, CubeTextureRequest, DepthTextureRequest, DynamicTextureRequest,
    LoadCompletion, PrefilteredCubeRequest, RawCubeTextureRequest, RawTextureRequest,
    RenderTargetRequest, TextureBackend, UrlTextureRequest,
};
use crate::error::GraphicsError;
use crate::types::{Extent3d, TextureDescriptor};

use super::texture::TextureState;
use super::{DataSource, LodLevels, RenderTargetSource, Texture, TextureKey, TextureSource};

/// Outcome of a successful [`Texture::rebuild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RebuildStatus {
    /// The device object was replaced.
    ///
    /// `ready` is false for dynamic textures, whose owner refills them.
    Rebuilt { ready: bool },
    /// The device object was replaced and its content is still loading.
    Pending,
    /// Nothing was done: the texture is temporary or already released.
    Skipped,
}

/// When the content of a freshly built object becomes usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Readiness {
    /// Content is on the device.
    Ready,
    /// Content arrives through the load completion.
    Pending,
    /// Content is written by the texture's owner.
    ContentOwned,
}

/// Completion that flips the ready flag once an asynchronous load lands.
pub(crate) fn load_completion(ready: &Arc<AtomicBool>, key: TextureKey) -> LoadCompletion {
    let ready: Weak<AtomicBool> = Arc::downgrade(ready);
    Box::new(move |result| match result {
        Ok(()) => {
            if let Some(ready) = ready.upgrade() {
                ready.store(true, Ordering::Release);
            }
            log::trace!("Texture {:?}: content loaded", key);
        }
        Err(err) => {
            log::warn!("Texture {:?}: asynchronous load failed: {}", key, err);
        }
    })
}

fn render_target_request(
    descriptor: &TextureDescriptor,
    target: &RenderTargetSource,
    attachment_count: u32,
) -> RenderTargetRequest {
    let size = if target.is_cube {
        Extent3d::square(descriptor.size.width)
    } else {
        descriptor.size
    };
    RenderTargetRequest {
        size,
        generate_depth_buffer: target.generate_depth_buffer,
        generate_stencil_buffer: target.generate_stencil_buffer,
        generate_mipmaps: descriptor.generate_mipmaps,
        sampling_mode: descriptor.sampling_mode,
        data_type: descriptor.data_type,
        format: descriptor.format,
        is_cube: target.is_cube,
        sample_count: descriptor.sample_count,
        attachment_count,
        usage: descriptor.usage,
    }
}

/// Build a device object for `source` through the matching backend entry point.
///
/// Returns `Ok(None)` for temporary textures, which have nothing to rebuild
/// from. Unknown sources have no reconstruction path at all.
pub(crate) fn build_resource(
    backend: &dyn TextureBackend,
    descriptor: &TextureDescriptor,
    source: &TextureSource,
    spherical_polynomial: Option<&SphericalPolynomial>,
    on_load: impl FnOnce() -> LoadCompletion,
) -> Result<Option<(BuiltTexture, Readiness)>, GraphicsError> {
    let built = match source {
        TextureSource::Temp => return Ok(None),
        TextureSource::Unknown => {
            return Err(GraphicsError::InvalidDataSource(DataSource::Unknown));
        }
        TextureSource::Url(url) => {
            let request = UrlTextureRequest {
                url: &url.url,
                no_mipmap: !descriptor.generate_mipmaps,
                invert_y: descriptor.invert_y,
                sampling_mode: descriptor.sampling_mode,
                fallback: url.fallback.as_ref(),
                format: descriptor.format,
            };
            (
                backend.create_url_texture(&request, on_load())?,
                Readiness::Pending,
            )
        }
        TextureSource::Raw(raw) | TextureSource::Raw3D(raw) => {
            let request = RawTextureRequest {
                data: &raw.data,
                size: descriptor.base_size,
                format: descriptor.format,
                data_type: descriptor.data_type,
                generate_mipmaps: descriptor.generate_mipmaps,
                invert_y: descriptor.invert_y,
                sampling_mode: descriptor.sampling_mode,
                compression: raw.compression,
                is_3d: source.is_3d(),
            };
            (backend.create_raw_texture(&request)?, Readiness::Ready)
        }
        TextureSource::Dynamic => {
            let request = DynamicTextureRequest {
                size: descriptor.base_size,
                generate_mipmaps: descriptor.generate_mipmaps,
                sampling_mode: descriptor.sampling_mode,
            };
            (
                backend.create_dynamic_texture(&request)?,
                Readiness::ContentOwned,
            )
        }
        TextureSource::RenderTarget(target) => {
            let request = render_target_request(descriptor, target, 1);
            (backend.create_render_target(&request)?, Readiness::Ready)
        }
        TextureSource::MultiRenderTarget(mrt) => {
            let request = render_target_request(descriptor, &mrt.target, mrt.attachment_count);
            (
                backend.create_multi_render_target(&request)?,
                Readiness::Ready,
            )
        }
        TextureSource::DepthTexture(depth) => {
            let request = DepthTextureRequest {
                size: descriptor.size,
                bilinear_filtering: descriptor.sampling_mode.is_linear(),
                comparison: depth.comparison,
                generate_stencil: depth.generate_stencil,
                is_cube: depth.is_cube,
                usage: descriptor.usage,
            };
            (backend.create_depth_texture(&request)?, Readiness::Ready)
        }
        TextureSource::Cube(cube) => {
            let request = CubeTextureRequest {
                url: &cube.url,
                files: &cube.files,
                no_mipmap: !descriptor.generate_mipmaps,
                format: descriptor.format,
                extension: cube.extension.as_deref(),
            };
            (
                backend.create_cube_texture(&request, on_load())?,
                Readiness::Pending,
            )
        }
        TextureSource::CubeRaw(cube) => {
            let request = RawCubeTextureRequest {
                faces: &cube.faces,
                size: descriptor.size.width,
                format: descriptor.format,
                data_type: descriptor.data_type,
                generate_mipmaps: descriptor.generate_mipmaps,
                invert_y: descriptor.invert_y,
                sampling_mode: descriptor.sampling_mode,
                compression: cube.compression,
            };
            (backend.create_raw_cube_texture(&request)?, Readiness::Ready)
        }
        TextureSource::CubePrefiltered(env) => {
            let request = PrefilteredCubeRequest {
                url: &env.url,
                lod_generation_scale: env.lod_generation_scale,
                lod_generation_offset: env.lod_generation_offset,
                format: descriptor.format,
                extension: env.extension.as_deref(),
                spherical_polynomial,
            };
            (
                backend.create_prefiltered_cube_texture(&request, on_load())?,
                Readiness::Pending,
            )
        }
    };
    Ok(Some(built))
}

/// Move a freshly built device object into an existing texture.
///
/// The texture takes over the new handle and, when present, the new
/// framebuffer. Each LOD level carried by `lods` replaces the texture's
/// current one, which is disposed. Size metadata is left untouched.
pub(crate) fn reconstruct_in_place(
    state: &mut TextureState,
    built: BuiltTexture,
    lods: LodLevels<Arc<Texture>>,
) {
    state.handle = Some(built.handle);

    // The old framebuffer went away with the old device object.
    if let Some(framebuffer) = built.framebuffer {
        state.framebuffer = Some(framebuffer);
    }

    for (slot, fresh) in state.lods.slots_mut().into_iter().zip(lods.into_slots()) {
        let Some(fresh) = fresh else {
            continue;
        };
        if let Some(stale) = slot.replace(fresh) {
            stale.dispose();
        }
    }
}

impl Texture {
    /// Recreate the device object after the device lost it.
    ///
    /// Temporary and released textures are skipped without any device call.
    /// Otherwise the ready flag and the sampler cache are cleared, the source
    /// is rebuilt through the backend and the result is swapped into this
    /// texture. Asynchronous sources report [`RebuildStatus::Pending`] and
    /// become ready when their load completes.
    ///
    /// Rebuilding a texture again before its pending load completes is not
    /// guarded against; rebuild each texture once per device loss.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidDataSource`] for unknown sources and
    /// the backend's error when it cannot recreate the object. On error the
    /// texture stays not ready and keeps its previous handle.
    pub fn rebuild(&self) -> Result<RebuildStatus, GraphicsError> {
        if matches!(self.source(), TextureSource::Temp) {
            return Ok(RebuildStatus::Skipped);
        }

        let mut state = self.state.lock();
        if state.handle.is_none() {
            return Ok(RebuildStatus::Skipped);
        }

        self.ready_flag().store(false, Ordering::Release);
        state.sampler_cache.invalidate();

        log::debug!(
            "Texture {:?}: rebuilding from {:?}",
            self.key(),
            self.data_source()
        );

        let device = self.device();
        let spherical_polynomial = state.spherical_polynomial;
        let built = build_resource(
            device.backend().as_ref(),
            &state.descriptor,
            self.source(),
            spherical_polynomial.as_ref(),
            || load_completion(self.ready_flag(), self.key()),
        )?;
        let Some((built, readiness)) = built else {
            return Ok(RebuildStatus::Skipped);
        };

        let lod_label = state.descriptor.label.clone();
        let lods = device.wrap_lod_textures(&built.lods, lod_label.as_deref());

        let previous = state.handle;
        reconstruct_in_place(&mut state, built, lods);
        state.rebuild_count += 1;
        log::trace!(
            "Texture {:?}: swapped {:?} for {:?}",
            self.key(),
            previous,
            state.handle
        );
        drop(state);

        Ok(match readiness {
            Readiness::Ready => {
                self.mark_ready();
                RebuildStatus::Rebuilt { ready: true }
            }
            Readiness::ContentOwned => RebuildStatus::Rebuilt { ready: false },
            Readiness::Pending if self.is_ready() => RebuildStatus::Rebuilt { ready: true },
            Readiness::Pending => RebuildStatus::Pending,
        })
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, DummyBackendConfig};
    use crate::device::{DeviceParameters, GraphicsDevice};
    use crate::resources::{PrefilteredCubeSource, TextureData};
    use crate::types::TextureFormat;

    fn create_test_device(config: DummyBackendConfig) -> (Arc<GraphicsDevice>, Arc<DummyBackend>) {
        let backend = Arc::new(DummyBackend::with_config(config));
        let device = GraphicsDevice::new(backend.clone(), DeviceParameters::default());
        (device, backend)
    }

    fn temp_texture(device: &Arc<GraphicsDevice>) -> Arc<Texture> {
        device
            .create_texture(
                TextureDescriptor::new_2d(1, 1, TextureFormat::Rgba8Unorm),
                TextureSource::Temp,
            )
            .unwrap()
    }

    #[test]
    fn test_merge_replaces_lod_and_disposes_old_one() {
        let (device, backend) = create_test_device(DummyBackendConfig::default());
        let target = device
            .create_texture(
                TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm),
                TextureSource::raw(TextureData::new(vec![0u8; 64])),
            )
            .unwrap();
        let old_lod = temp_texture(&device);
        let new_lod = temp_texture(&device);
        let old_lod_handle = old_lod.handle().unwrap();
        target.state.lock().lods.high = Some(old_lod.clone());

        let replacement = backend
            .allocate_texture(&TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm))
            .unwrap();
        let replacement_handle = replacement.handle;
        reconstruct_in_place(
            &mut target.state.lock(),
            replacement,
            LodLevels::new(Some(new_lod.clone()), None, None),
        );

        assert_eq!(target.handle(), Some(replacement_handle));
        assert!(Arc::ptr_eq(&target.lod_high().unwrap(), &new_lod));
        assert!(target.lod_mid().is_none());
        assert_eq!(old_lod.reference_count(), 0);
        assert_eq!(backend.texture_release_count(old_lod_handle), 1);
    }

    #[test]
    fn test_merge_keeps_framebuffer_when_none_built() {
        let (device, backend) = create_test_device(DummyBackendConfig::default());
        let target = temp_texture(&device);
        let framebuffer = crate::backend::GpuFramebufferHandle::from_raw(999);
        target.state.lock().framebuffer = Some(framebuffer);

        let built = backend
            .allocate_texture(&TextureDescriptor::new_2d(1, 1, TextureFormat::Rgba8Unorm))
            .unwrap();
        reconstruct_in_place(&mut target.state.lock(), built, LodLevels::default());
        assert_eq!(target.framebuffer(), Some(framebuffer));
    }

    #[test]
    fn test_prefiltered_rebuild_passes_polynomial_to_backend() {
        let (device, backend) = create_test_device(DummyBackendConfig::default());
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(128, 128, TextureFormat::Rgba16Float),
                TextureSource::CubePrefiltered(PrefilteredCubeSource {
                    url: "env/studio.env".to_string(),
                    lod_generation_scale: 0.8,
                    lod_generation_offset: 0.0,
                    extension: None,
                }),
            )
            .unwrap();
        let mut polynomial = SphericalPolynomial::new();
        polynomial.add_ambient(resurgence_core::math::Vec3::new(0.2, 0.3, 0.4));
        texture.set_spherical_polynomial(Some(polynomial));

        assert_eq!(texture.rebuild(), Ok(RebuildStatus::Pending));
        assert_eq!(
            backend.prefiltered_polynomials(),
            vec![None, Some(polynomial)]
        );
    }

    #[test]
    fn test_unknown_source_has_no_reconstruction_path() {
        let (device, backend) = create_test_device(DummyBackendConfig::default());
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(2, 2, TextureFormat::Rgba8Unorm),
                TextureSource::Unknown,
            )
            .unwrap();
        texture.mark_ready();
        let calls_before = backend.call_count();

        assert_eq!(
            texture.rebuild(),
            Err(GraphicsError::InvalidDataSource(DataSource::Unknown))
        );
        assert!(!texture.is_ready());
        assert_eq!(backend.call_count(), calls_before);
    }

    #[test]
    fn test_rebuild_rejects_size_without_power_of_two() {
        let (device, _backend) =
            create_test_device(DummyBackendConfig::new().with_power_of_two(true));
        let texture = device
            .create_texture(
                TextureDescriptor::new_2d(100, 60, TextureFormat::Rgba8Unorm),
                TextureSource::Dynamic,
            )
            .unwrap();
        let handle = texture.handle();

        texture.update_size(Extent3d::new_2d(u32::MAX, 4));
        assert!(matches!(
            texture.rebuild(),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert_eq!(texture.handle(), handle);
    }
}

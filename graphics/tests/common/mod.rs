//! Common utilities for texture integration tests.
//!
//! This module provides a device on top of the dummy backend and one fixture
//! per texture source, so every test can exercise every kind of texture.

use std::sync::Arc;

use resurgence_graphics::backend::DummyBackendConfig;
use resurgence_graphics::resources::{
    CubeSource, DepthTextureSource, MultiRenderTargetSource, PrefilteredCubeSource,
    RawCubeSource, RenderTargetSource,
};
use resurgence_graphics::{
    DeviceParameters, DummyBackend, GraphicsDevice, Texture, TextureData, TextureDescriptor,
    TextureFormat, TextureSource,
};

// ============================================================================
// Texture Fixtures
// ============================================================================

/// Texture kinds that can be rebuilt after device loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixture {
    Url,
    Raw,
    Raw3D,
    Dynamic,
    RenderTarget,
    MultiRenderTarget,
    DepthTexture,
    Cube,
    CubeRaw,
    CubePrefiltered,
}

impl Fixture {
    /// Returns true if the content of this kind arrives through a load callback.
    pub fn is_async(&self) -> bool {
        matches!(self, Fixture::Url | Fixture::Cube | Fixture::CubePrefiltered)
    }

    /// Returns true if this kind is ready as soon as it is built.
    pub fn is_sync_ready(&self) -> bool {
        !self.is_async() && *self != Fixture::Dynamic
    }

    /// Descriptor and source for a small texture of this kind.
    pub fn build(&self) -> (TextureDescriptor, TextureSource) {
        match self {
            Fixture::Url => (
                TextureDescriptor::new_2d(64, 64, TextureFormat::Rgba8Unorm)
                    .with_label("url")
                    .with_mipmaps(true),
                TextureSource::url("textures/grass.png"),
            ),
            Fixture::Raw => (
                TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm).with_label("raw"),
                TextureSource::raw(solid_pixels(16)),
            ),
            Fixture::Raw3D => (
                TextureDescriptor::new_3d(4, 4, 4, TextureFormat::Rgba8Unorm).with_label("raw_3d"),
                TextureSource::raw_3d(solid_pixels(64)),
            ),
            Fixture::Dynamic => (
                TextureDescriptor::new_2d(32, 16, TextureFormat::Rgba8Unorm).with_label("dynamic"),
                TextureSource::Dynamic,
            ),
            Fixture::RenderTarget => (
                TextureDescriptor::new_2d(256, 256, TextureFormat::Rgba8Unorm)
                    .with_label("render_target"),
                TextureSource::RenderTarget(RenderTargetSource {
                    generate_depth_buffer: true,
                    generate_stencil_buffer: false,
                    is_cube: false,
                }),
            ),
            Fixture::MultiRenderTarget => (
                TextureDescriptor::new_2d(128, 128, TextureFormat::Rgba16Float)
                    .with_label("gbuffer"),
                TextureSource::MultiRenderTarget(MultiRenderTargetSource {
                    target: RenderTargetSource {
                        generate_depth_buffer: true,
                        generate_stencil_buffer: true,
                        is_cube: false,
                    },
                    attachment_count: 3,
                }),
            ),
            Fixture::DepthTexture => (
                TextureDescriptor::new_2d(512, 512, TextureFormat::Depth32Float)
                    .with_label("shadow_map"),
                TextureSource::DepthTexture(DepthTextureSource::default()),
            ),
            Fixture::Cube => (
                TextureDescriptor::new_2d(64, 64, TextureFormat::Rgba8Unorm).with_label("skybox"),
                TextureSource::Cube(CubeSource {
                    url: "textures/skybox".to_string(),
                    files: ["px", "py", "pz", "nx", "ny", "nz"]
                        .iter()
                        .map(|face| format!("textures/skybox_{face}.jpg"))
                        .collect(),
                    extension: Some(".jpg".to_string()),
                }),
            ),
            Fixture::CubeRaw => (
                TextureDescriptor::new_2d(2, 2, TextureFormat::Rgba8Unorm).with_label("cube_raw"),
                TextureSource::CubeRaw(RawCubeSource {
                    faces: vec![solid_pixels(4); 6],
                    compression: None,
                }),
            ),
            Fixture::CubePrefiltered => (
                TextureDescriptor::new_2d(128, 128, TextureFormat::Rgba16Float)
                    .with_label("environment"),
                TextureSource::CubePrefiltered(PrefilteredCubeSource {
                    url: "env/studio.env".to_string(),
                    lod_generation_scale: 0.8,
                    lod_generation_offset: 0.0,
                    extension: None,
                }),
            ),
        }
    }
}

/// RGBA8 pixels of a single color.
pub fn solid_pixels(count: usize) -> TextureData {
    TextureData::from_pod(&vec![[255u8, 0, 128, 255]; count])
}

// ============================================================================
// Test Context
// ============================================================================

/// Test context providing a device on top of the dummy backend.
pub struct TestContext {
    /// The backend, for device loss simulation and call inspection.
    pub backend: Arc<DummyBackend>,
    /// Graphics device for creating textures.
    pub device: Arc<GraphicsDevice>,
}

impl TestContext {
    /// Create a new test context with the default backend configuration.
    pub fn new() -> Self {
        Self::with_config(DummyBackendConfig::default())
    }

    /// Create a new test context with the given backend configuration.
    pub fn with_config(config: DummyBackendConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let backend = Arc::new(DummyBackend::with_config(config));
        let device = GraphicsDevice::new(
            backend.clone(),
            DeviceParameters::new().with_name("test_device"),
        );
        Self { backend, device }
    }

    /// Create a texture of the given kind.
    pub fn create(&self, fixture: Fixture) -> Arc<Texture> {
        let (descriptor, source) = fixture.build();
        self.device
            .create_texture(descriptor, source)
            .expect("Failed to create texture")
    }

    /// Create a texture and wait until its content is on the device.
    pub fn create_ready(&self, fixture: Fixture) -> Arc<Texture> {
        let texture = self.create(fixture);
        self.backend.complete_pending_loads();
        if fixture == Fixture::Dynamic {
            texture.mark_ready();
        }
        assert!(texture.is_ready(), "{fixture:?} texture should be ready");
        texture
    }
}

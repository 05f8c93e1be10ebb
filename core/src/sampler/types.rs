//! CPU-side sampler enums and sampling presets.

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbor filtering.
    #[default]
    Nearest,
    /// Linear filtering.
    Linear,
}

/// Texture address mode (wrapping behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Clamp to edge.
    #[default]
    ClampToEdge,
    /// Repeat.
    Repeat,
    /// Mirrored repeat.
    MirrorRepeat,
    /// Clamp to border color.
    ClampToBorder,
}

/// Comparison function for depth/shadow sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Never pass.
    Never,
    /// Pass if less than.
    Less,
    /// Pass if equal.
    Equal,
    /// Pass if less than or equal.
    LessEqual,
    /// Pass if greater than.
    Greater,
    /// Pass if not equal.
    NotEqual,
    /// Pass if greater than or equal.
    GreaterEqual,
    /// Always pass.
    Always,
}

/// How texture coordinates are generated when the texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinatesMode {
    /// Coordinates come straight from the mesh.
    #[default]
    Explicit,
    /// Spherical projection.
    Spherical,
    /// Planar projection.
    Planar,
    /// Cubic reflection lookup.
    Cubic,
    /// Projected from a texture matrix.
    Projection,
    /// Skybox lookup.
    Skybox,
    /// Inverted cubic lookup.
    InvCubic,
    /// Equirectangular panorama lookup.
    Equirectangular,
}

/// Filtering preset applied to a texture.
///
/// The texture layer stores this alongside the texture and hands it to the
/// backend whenever the texture is (re)created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplingMode {
    /// Nearest filtering, no mipmaps.
    Nearest,
    /// Nearest filtering, nearest mip.
    NearestMipNearest,
    /// Linear filtering, no mipmaps.
    LinearNoMip,
    /// Linear filtering, nearest mip.
    Bilinear,
    /// Linear filtering, linear mip.
    #[default]
    Trilinear,
}

impl SamplingMode {
    /// Magnification filter for this preset.
    pub fn mag_filter(&self) -> FilterMode {
        match self {
            Self::Nearest | Self::NearestMipNearest => FilterMode::Nearest,
            Self::LinearNoMip | Self::Bilinear | Self::Trilinear => FilterMode::Linear,
        }
    }

    /// Returns true if texels are blended when magnified.
    pub fn is_linear(&self) -> bool {
        self.mag_filter() == FilterMode::Linear
    }
}

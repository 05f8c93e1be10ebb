//! Lower-detail companions of filtered environment textures.

/// Up to three auxiliary LOD levels of a texture.
///
/// Used both for raw backend handles ([`BuiltTexture::lods`]) and for the
/// textures that wrap them once they belong to a [`Texture`].
///
/// [`BuiltTexture::lods`]: crate::backend::BuiltTexture::lods
/// [`Texture`]: crate::resources::Texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LodLevels<T> {
    /// Sharpest level.
    pub high: Option<T>,
    /// Middle level.
    pub mid: Option<T>,
    /// Blurriest level.
    pub low: Option<T>,
}

impl<T> Default for LodLevels<T> {
    fn default() -> Self {
        Self {
            high: None,
            mid: None,
            low: None,
        }
    }
}

impl<T> LodLevels<T> {
    /// Create LOD levels from all three slots.
    pub fn new(high: Option<T>, mid: Option<T>, low: Option<T>) -> Self {
        Self { high, mid, low }
    }

    /// Returns true if no level is set.
    pub fn is_empty(&self) -> bool {
        self.high.is_none() && self.mid.is_none() && self.low.is_none()
    }

    /// Number of levels set.
    pub fn count(&self) -> usize {
        [&self.high, &self.mid, &self.low]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Mutable access to the three slots in high, mid, low order.
    pub fn slots_mut(&mut self) -> [&mut Option<T>; 3] {
        [&mut self.high, &mut self.mid, &mut self.low]
    }

    /// Consume into the three slots in high, mid, low order.
    pub fn into_slots(self) -> [Option<T>; 3] {
        [self.high, self.mid, self.low]
    }
}

//! Common types shared across the graphics system.

// ============================================================================
// Extent3d
// ============================================================================

/// 3D extent for textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth in pixels (1 for 2D textures).
    pub depth: u32,
}

impl Extent3d {
    /// Create a new 2D extent.
    pub fn new_2d(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
        }
    }

    /// Create a new 3D extent.
    pub fn new_3d(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Create a square extent, as used by cube faces.
    pub fn square(size: u32) -> Self {
        Self::new_2d(size, size)
    }

    /// Number of texels covered by this extent.
    pub fn texel_count(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }

    /// Largest of the three dimensions.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height).max(self.depth)
    }

    /// Round width and height up to the next power of two.
    ///
    /// Depth is left untouched. Zero stays zero so placeholder extents survive.
    /// Returns `None` when a dimension is above `2^31`.
    pub fn checked_power_of_two(&self) -> Option<Self> {
        let round = |v: u32| {
            if v == 0 {
                Some(0)
            } else {
                v.checked_next_power_of_two()
            }
        };
        Some(Self {
            width: round(self.width)?,
            height: round(self.height)?,
            depth: self.depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_count() {
        assert_eq!(Extent3d::new_2d(4, 4).texel_count(), 16);
        assert_eq!(Extent3d::new_3d(2, 3, 4).texel_count(), 24);
        assert_eq!(Extent3d::new_2d(0, 512).texel_count(), 0);
    }

    #[test]
    fn test_power_of_two() {
        let e = Extent3d::new_3d(300, 64, 3).checked_power_of_two().unwrap();
        assert_eq!(e, Extent3d::new_3d(512, 64, 3));
        assert_eq!(
            Extent3d::new_2d(0, 5).checked_power_of_two(),
            Some(Extent3d::new_2d(0, 8))
        );
    }

    #[test]
    fn test_power_of_two_overflow() {
        assert_eq!(Extent3d::new_2d(u32::MAX, 4).checked_power_of_two(), None);
        assert_eq!(Extent3d::new_2d(4, (1 << 31) + 1).checked_power_of_two(), None);
        assert_eq!(
            Extent3d::new_2d(1 << 31, 1).checked_power_of_two(),
            Some(Extent3d::new_2d(1 << 31, 1))
        );
    }
}

//! Spherical polynomial irradiance representation.
//!
//! Prefiltered environment textures carry a [`SphericalPolynomial`] computed
//! when the environment was baked. The polynomial is pure CPU data, so it
//! survives any loss of the GPU texture it describes.

use crate::math::Vec3;

/// Second-order polynomial approximating diffuse irradiance over the sphere.
///
/// Evaluated for a unit direction `d` as
/// `x*dx + y*dy + z*dz + xx*dx² + yy*dy² + zz*dz² + xy*dx*dy + yz*dy*dz + zx*dz*dx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPolynomial {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
    pub xx: Vec3,
    pub yy: Vec3,
    pub zz: Vec3,
    pub xy: Vec3,
    pub yz: Vec3,
    pub zx: Vec3,
}

impl Default for SphericalPolynomial {
    fn default() -> Self {
        Self {
            x: Vec3::zeros(),
            y: Vec3::zeros(),
            z: Vec3::zeros(),
            xx: Vec3::zeros(),
            yy: Vec3::zeros(),
            zz: Vec3::zeros(),
            xy: Vec3::zeros(),
            yz: Vec3::zeros(),
            zx: Vec3::zeros(),
        }
    }
}

impl SphericalPolynomial {
    /// Create a polynomial with all coefficients set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant ambient term.
    ///
    /// The squared terms sum to one on the unit sphere, so adding the color to
    /// each of them lifts every direction by exactly `color`.
    pub fn add_ambient(&mut self, color: Vec3) {
        self.xx += color;
        self.yy += color;
        self.zz += color;
    }

    /// Multiply every coefficient by `scale`.
    pub fn scale_in_place(&mut self, scale: f32) {
        for c in self.coefficients_mut() {
            *c *= scale;
        }
    }

    /// Evaluate the irradiance for a unit direction.
    pub fn evaluate(&self, direction: &Vec3) -> Vec3 {
        let (dx, dy, dz) = (direction.x, direction.y, direction.z);
        self.x * dx
            + self.y * dy
            + self.z * dz
            + self.xx * (dx * dx)
            + self.yy * (dy * dy)
            + self.zz * (dz * dz)
            + self.xy * (dx * dy)
            + self.yz * (dy * dz)
            + self.zx * (dz * dx)
    }

    fn coefficients_mut(&mut self) -> [&mut Vec3; 9] {
        [
            &mut self.x,
            &mut self.y,
            &mut self.z,
            &mut self.xx,
            &mut self.yy,
            &mut self.zz,
            &mut self.xy,
            &mut self.yz,
            &mut self.zx,
        ]
    }
}

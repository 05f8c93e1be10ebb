//! # Resurgence Core
//!
//! CPU-side types shared by the Resurgence graphics crate: sampler enums,
//! sampling presets and the spherical polynomial used by prefiltered
//! environment textures.

pub mod math;
pub mod sampler;
pub mod spherical;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core crate version.
pub fn init() {
    log::info!("Resurgence Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

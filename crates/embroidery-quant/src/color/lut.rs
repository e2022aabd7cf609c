//! Gamma lookup table access
//!
//! The table is generated at compile time by build.rs, one entry per 8-bit
//! channel value, so decoding a [`Color`](super::Color) never calls `powf`.

// Include the generated LUT from build.rs
include!(concat!(env!("OUT_DIR"), "/srgb8_lut.rs"));

/// Decode an 8-bit sRGB channel to linear light (0.0..=1.0).
#[inline]
pub fn srgb8_to_linear(channel: u8) -> f32 {
    SRGB8_TO_LINEAR[channel as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb8_to_linear_boundaries() {
        assert!((srgb8_to_linear(0) - 0.0).abs() < 1e-6);
        assert!((srgb8_to_linear(255) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_known_gamma_value() {
        // Exact: ((128/255 + 0.055) / 1.055)^2.4 = 0.215861...
        assert!(
            (srgb8_to_linear(128) - 0.21586).abs() < 1e-4,
            "sRGB 128 -> linear expected ~0.2159, got {}",
            srgb8_to_linear(128)
        );
        // Linear segment below the 0.04045 knee
        assert!((srgb8_to_linear(10) - 10.0 / 255.0 / 12.92).abs() < 1e-6);
    }

    #[test]
    fn test_monotonicity() {
        let mut prev = srgb8_to_linear(0);
        for i in 1..=255u8 {
            let curr = srgb8_to_linear(i);
            assert!(curr > prev, "srgb8_to_linear not strictly increasing at {i}");
            prev = curr;
        }
    }
}

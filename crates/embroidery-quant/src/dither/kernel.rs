//! Error diffusion kernel definitions.
//!
//! Each kernel lists the forward neighbors that receive a share of a pixel's
//! quantization error. Offsets are written for a left-to-right scan; on
//! serpentine reverse rows `dx` is mirrored.

/// An error diffusion kernel.
///
/// Each neighbor receives `error * weight / divisor`. The total propagated is
/// `sum(weights) / divisor`: 1.0 for every kernel except Atkinson, which
/// deliberately keeps 25% of the error.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// (dx, dy, weight) entries.
    ///
    /// - `dx`: horizontal offset (positive = right, flipped for serpentine)
    /// - `dy`: vertical offset (0 = current row, positive = rows below)
    /// - `weight`: numerator over `divisor`
    pub entries: &'static [(i32, i32, u8)],

    /// Denominator shared by all entries.
    pub divisor: u8,

    /// Largest `dy` in `entries`; the error buffer keeps `max_dy + 1` rows.
    pub max_dy: usize,
}

impl Kernel {
    /// Fraction of the error this kernel hands on.
    pub fn propagation(&self) -> f64 {
        let sum: u32 = self.entries.iter().map(|&(_, _, w)| w as u32).sum();
        sum as f64 / self.divisor as f64
    }
}

/// Floyd-Steinberg.
///
/// ```text
///        X   7
///    3   5   1      (/16)
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
    max_dy: 1,
};

/// Atkinson: six taps of 1/8, 75% propagation.
///
/// ```text
///        X   1   1
///    1   1   1
///        1          (/8)
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
    max_dy: 2,
};

/// Burkes.
///
/// ```text
///            X   8   4
///    2   4   8   4   2      (/32)
/// ```
pub const BURKES: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
    max_dy: 1,
};

/// Stucki.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1      (/42)
/// ```
pub const STUCKI: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
    max_dy: 2,
};

/// Sierra (three-row).
///
/// ```text
///            X   5   3
///    2   4   5   4   2
///        2   3   2          (/32)
/// ```
pub const SIERRA3: Kernel = Kernel {
    entries: &[
        (1, 0, 5),
        (2, 0, 3),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 5),
        (1, 1, 4),
        (2, 1, 2),
        (-1, 2, 2),
        (0, 2, 3),
        (1, 2, 2),
    ],
    divisor: 32,
    max_dy: 2,
};

/// Sierra two-row.
///
/// ```text
///            X   4   3
///    1   2   3   2   1      (/16)
/// ```
pub const SIERRA2: Kernel = Kernel {
    entries: &[
        (1, 0, 4),
        (2, 0, 3),
        (-2, 1, 1),
        (-1, 1, 2),
        (0, 1, 3),
        (1, 1, 2),
        (2, 1, 1),
    ],
    divisor: 16,
    max_dy: 1,
};

/// Sierra Lite.
///
/// ```text
///    X   2
///    1   1      (/4)
/// ```
pub const SIERRA_LITE: Kernel = Kernel {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
    max_dy: 1,
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(&str, Kernel); 7] = [
        ("floyd-steinberg", FLOYD_STEINBERG),
        ("atkinson", ATKINSON),
        ("burkes", BURKES),
        ("stucki", STUCKI),
        ("sierra3", SIERRA3),
        ("sierra2", SIERRA2),
        ("sierra-lite", SIERRA_LITE),
    ];

    #[test]
    fn test_propagation() {
        for (name, kernel) in ALL {
            let expected = if name == "atkinson" { 0.75 } else { 1.0 };
            assert!(
                (kernel.propagation() - expected).abs() < 1e-9,
                "{name} propagates {}",
                kernel.propagation()
            );
        }
    }

    #[test]
    fn test_max_dy_matches_entries() {
        for (name, kernel) in ALL {
            let max_dy = kernel.entries.iter().map(|&(_, dy, _)| dy as usize).max();
            assert_eq!(max_dy, Some(kernel.max_dy), "{name}");
        }
    }

    #[test]
    fn test_taps_are_forward_only() {
        for (name, kernel) in ALL {
            for &(dx, dy, _) in kernel.entries {
                assert!(dy > 0 || (dy == 0 && dx > 0), "{name} has backward tap ({dx}, {dy})");
            }
        }
    }
}

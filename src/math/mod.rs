//! Numerical helpers shared by the engines.

pub mod arena;

pub use arena::LatticeArena;

use statrs::function::erf::erfc;

/// Standard normal CDF, `0.5 * erfc(-x / sqrt(2))`.
///
/// The complementary error function keeps full relative precision in the lower tail,
/// where `1 - cdf(-x)` forms would cancel.
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * std::f64::consts::FRAC_1_SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NIST reference values for the standard normal CDF.
    const CDF_REFERENCE: &[(f64, f64)] = &[
        (-3.0, 0.0013498980316300946),
        (-2.0, 0.02275013194817921),
        (-1.0, 0.15865525393145702),
        (-0.5, 0.308_537_538_725_986_9),
        (0.0, 0.5),
        (0.5, 0.691_462_461_274_013_1),
        (1.0, 0.841_344_746_068_542_9),
        (2.0, 0.977_249_868_051_820_8),
        (3.0, 0.99865010196837),
    ];

    #[test]
    fn normal_cdf_matches_reference_table() {
        for &(x, expected) in CDF_REFERENCE {
            let err = (normal_cdf(x) - expected).abs();
            assert!(err <= 1.0e-12, "x={x} expected={expected} got={}", normal_cdf(x));
        }
    }

    #[test]
    fn normal_cdf_is_symmetric() {
        for x in [0.1, 0.7, 1.3, 2.9, 5.0] {
            assert!((normal_cdf(x) + normal_cdf(-x) - 1.0).abs() < 1.0e-15);
        }
    }
}

//! First-order Bessel function of the first kind
//! Rational approximation below |x| = 8, asymptotic expansion above.

/// J₁(x)
pub fn bessel_j1(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let ans1 = x * (72362614232.0
            + y * (-7895059235.0
            + y * (242396853.1
            + y * (-2972611.439
            + y * (15704.48260
            + y * (-30.16036606))))));
        let ans2 = 144725228442.0
            + y * (2300535178.0
            + y * (18583304.74
            + y * (99447.43394
            + y * (376.9991397 + y))));
        ans1 / ans2
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 2.356194491;
        let ans1 = 1.0 + y * (0.183105e-2
            + y * (-0.3516396496e-4
            + y * (0.2457520174e-5
            + y * (-0.240337019e-6))));
        let ans2 = 0.04687499995 + y * (-0.2002690873e-3
            + y * (0.8449199096e-5
            + y * (-0.88228987e-6
            + y * 0.105787412e-6)));
        let ans = (0.636619772 / ax).sqrt() * (xx.cos() * ans1 - z * xx.sin() * ans2);
        if x < 0.0 {
            -ans
        } else {
            ans
        }
    }
}

/// J₁(x)/x with the removable singularity at 0 filled by its limit 1/2
pub fn j1_over_x(x: f64) -> f64 {
    if x == 0.0 {
        0.5
    } else {
        bessel_j1(x) / x
    }
}

/// Circular-aperture power pattern (2·J₁(u)/u)², 1 at u = 0
pub fn airy_power(u: f64) -> f64 {
    (2.0 * j1_over_x(u)).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bessel_j1_values() {
        assert_eq!(bessel_j1(0.0), 0.0);
        assert!((bessel_j1(1.0) - 0.440050586).abs() < 1e-6);
        assert!((bessel_j1(2.0) - 0.576724808).abs() < 1e-6);
        assert!((bessel_j1(5.0) + 0.327579138).abs() < 1e-6);
        assert!((bessel_j1(10.0) - 0.043472746).abs() < 1e-6);
    }

    #[test]
    fn test_bessel_j1_odd() {
        for x in [0.3, 2.5, 7.9, 8.1, 15.0] {
            assert_eq!(bessel_j1(-x), -bessel_j1(x));
        }
    }

    #[test]
    fn test_first_zero() {
        // First non-trivial zero of J1 near 3.8317
        assert!(bessel_j1(3.8317).abs() < 1e-4);
        assert!(airy_power(3.8317) < 1e-8);
    }

    #[test]
    fn test_limits_at_zero() {
        assert_eq!(j1_over_x(0.0), 0.5);
        assert_eq!(airy_power(0.0), 1.0);
        assert!((j1_over_x(1e-6) - 0.5).abs() < 1e-9);
    }
}

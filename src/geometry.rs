// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Joint angle helpers.
//!
//! Both helpers measure the angle at `b` between the rays `b→a` and `b→c` as the
//! difference of the two rays' `atan2` headings. [`three_point_angle`] is the
//! value handed back to callers (e.g. rep counters); [`overlay_angle`] is the
//! integer drawn next to joints in the skeleton overlay.

/// Angle at `b` in degrees, wrapped into `[0, 360)`.
///
/// The result is signed by winding direction before wrapping, so swapping `a`
/// and `c` yields `360 - angle` (for non-zero angles).
#[must_use]
pub fn three_point_angle(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> f64 {
    let angle = heading_difference(a, b, c).to_degrees();
    let wrapped = if angle < 0.0 { angle + 360.0 } else { angle };
    // Tiny negative differences round up to exactly 360.
    if wrapped >= 360.0 { wrapped - 360.0 } else { wrapped }
}

/// Unsigned angle at `b` in whole degrees, in `[0, 180]`.
///
/// Absolute value of the heading difference, truncated. Differences beyond a
/// half turn are folded back to the interior angle.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn overlay_angle(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> i32 {
    let angle = heading_difference(a, b, c).to_degrees().abs();
    let angle = if angle > 180.0 { 360.0 - angle } else { angle };
    angle as i32
}

/// `atan2(c - b) - atan2(a - b)` in radians.
fn heading_difference(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> f64 {
    let to_c = f64::from(c.1 - b.1).atan2(f64::from(c.0 - b.0));
    let to_a = f64::from(a.1 - b.1).atan2(f64::from(a.0 - b.0));
    to_c - to_a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_collinear_is_straight() {
        assert!(approx_eq(three_point_angle((0, 0), (5, 0), (10, 0)), 180.0));
        assert!(approx_eq(three_point_angle((10, 10), (5, 5), (0, 0)), 180.0));
        assert!(approx_eq(three_point_angle((3, -7), (3, 0), (3, 9)), 180.0));
    }

    #[test]
    fn test_right_angle_overlay() {
        assert_eq!(overlay_angle((1, 0), (0, 0), (0, 1)), 90);
        assert_eq!(overlay_angle((0, 1), (0, 0), (1, 0)), 90);
    }

    #[test]
    fn test_negative_difference_wraps() {
        // atan2(0, 1) - atan2(1, 0) = -90 degrees
        assert!(approx_eq(three_point_angle((0, 1), (0, 0), (1, 0)), 270.0));
        assert!(approx_eq(three_point_angle((1, 0), (0, 0), (0, 1)), 90.0));
    }

    #[test]
    fn test_wrapped_angle_range() {
        let b = (50, 50);
        let ring: Vec<(i32, i32)> = (0..360)
            .step_by(7)
            .map(|deg| {
                let rad = f64::from(deg).to_radians();
                ((50.0 + 40.0 * rad.cos()) as i32, (50.0 + 40.0 * rad.sin()) as i32)
            })
            .collect();

        for &a in &ring {
            for &c in &ring {
                let angle = three_point_angle(a, b, c);
                assert!((0.0..360.0).contains(&angle), "angle {angle} out of range");
            }
        }
    }

    #[test]
    fn test_same_ray_is_zero() {
        assert!(approx_eq(three_point_angle((10, 0), (0, 0), (20, 0)), 0.0));
        assert_eq!(overlay_angle((10, 0), (0, 0), (20, 0)), 0);
    }

    #[test]
    fn test_overlay_angle_range() {
        // Headings 170 and -170 degrees differ by 340; the interior angle is 20.
        let a = (-100, 17);
        let c = (-100, -17);
        let angle = overlay_angle(a, (0, 0), c);
        assert!((0..=180).contains(&angle));
        assert_eq!(angle, 19);
        assert_eq!(overlay_angle((0, 0), (5, 0), (10, 0)), 180);
    }
}

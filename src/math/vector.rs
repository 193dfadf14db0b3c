//! Vector helpers shared by the rasterizer, queries and collision code

use crate::core::types::{Vec2, Vec3};

/// Barycentric weights of `p` with respect to triangle `(a, b, c)`
///
/// The weights sum to 1. A degenerate (zero-area) triangle yields equal
/// weights so callers always get a finite blend.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Vec3 {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let denom = v0.x * v1.y - v1.x * v0.y;
    if denom.abs() < f32::EPSILON {
        return Vec3::splat(1.0 / 3.0);
    }

    let w_b = (v2.x * v1.y - v1.x * v2.y) / denom;
    let w_c = (v0.x * v2.y - v2.x * v0.y) / denom;
    Vec3::new(1.0 - w_b - w_c, w_b, w_c)
}

/// Blend three scalar values with barycentric weights
#[inline]
pub fn blend3(weights: Vec3, values: [f32; 3]) -> f32 {
    weights.dot(Vec3::from_array(values))
}

/// Rotate the X/Y components of `v` by `angle` radians (counter-clockwise),
/// leaving Z untouched
#[inline]
pub fn rotate_xy(v: Vec3, angle: f32) -> Vec3 {
    let xy = Vec2::from_angle(angle).rotate(v.truncate());
    xy.extend(v.z)
}

/// Normalize `v`, or return `fallback` when `v` has no usable direction
#[inline]
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let n = v.normalize_or_zero();
    if n == Vec3::ZERO { fallback } else { n }
}

/// Mirror reflection of `v` about the plane with unit normal `n`
///
/// v' = v - 2(v·n)n
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Unit normal of a plane tilted `angle` radians from horizontal, with the
/// surface descending toward the horizontal `downhill` direction
pub fn tilted_normal(downhill: Vec2, angle: f32) -> Vec3 {
    let dir = downhill.normalize_or_zero();
    let (sin, cos) = angle.sin_cos();
    Vec3::new(dir.x * sin, dir.y * sin, cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn test_barycentric_corners() {
        let (a, b, c) = (Vec2::ZERO, Vec2::X, Vec2::new(0.5, 0.5));
        assert!(approx(barycentric(a, a, b, c), Vec3::X));
        assert!(approx(barycentric(b, a, b, c), Vec3::Y));
        assert!(approx(barycentric(c, a, b, c), Vec3::Z));
    }

    #[test]
    fn test_barycentric_sums_to_one() {
        let (a, b, c) = (Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.5));
        let w = barycentric(Vec2::new(0.9, 0.4), a, b, c);
        assert!((w.x + w.y + w.z - 1.0).abs() < EPS);
        assert!(w.min_element() >= -EPS);
    }

    #[test]
    fn test_barycentric_degenerate() {
        let w = barycentric(Vec2::ONE, Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0));
        assert!(approx(w, Vec3::splat(1.0 / 3.0)));
    }

    #[test]
    fn test_blend3() {
        let w = Vec3::new(0.5, 0.25, 0.25);
        assert!((blend3(w, [2.0, 4.0, 0.0]) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_xy_quarter_turn() {
        let r = rotate_xy(Vec3::new(1.0, 0.0, 3.0), std::f32::consts::FRAC_PI_2);
        assert!(approx(r, Vec3::new(0.0, 1.0, 3.0)));
    }

    #[test]
    fn test_reflect_floor() {
        let r = reflect(Vec3::new(3.0, 0.0, -2.0), Vec3::Z);
        assert!(approx(r, Vec3::new(3.0, 0.0, 2.0)));
    }

    #[test]
    fn test_normalize_or_fallback() {
        assert_eq!(normalize_or(Vec3::ZERO, Vec3::Z), Vec3::Z);
        assert!(approx(normalize_or(Vec3::new(0.0, 2.0, 0.0), Vec3::Z), Vec3::Y));
    }

    #[test]
    fn test_tilted_normal_is_unit() {
        let n = tilted_normal(Vec2::new(1.0, 1.0), 0.6);
        assert!((n.length() - 1.0).abs() < EPS);
        assert!(n.x > 0.0 && n.y > 0.0 && n.z > 0.0);
        assert!((n.x - n.y).abs() < EPS);
    }
}

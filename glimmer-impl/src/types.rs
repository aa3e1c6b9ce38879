use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::math;

//
// Vec3
//

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct V3(pub f64, pub f64, pub f64); // x, y, z

impl V3 {
    pub const POS_X: V3 = V3(1.0, 0.0, 0.0);
    pub const POS_Y: V3 = V3(0.0, 1.0, 0.0);
    pub const POS_Z: V3 = V3(0.0, 0.0, 1.0);
    pub const NEG_X: V3 = V3(-1.0, 0.0, 0.0);
    pub const NEG_Y: V3 = V3(0.0, -1.0, 0.0);
    pub const NEG_Z: V3 = V3(0.0, 0.0, -1.0);
    pub const ZERO: V3 = V3(0.0, 0.0, 0.0);
    pub const ONE: V3 = V3(1.0, 1.0, 1.0);

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn z(&self) -> f64 {
        self.2
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.0, self.1, self.2]
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f64 {
        (self.0 * self.0) + (self.1 * self.1) + (self.2 * self.2)
    }

    /// Normalizes, passing the zero vector through unchanged.
    pub fn unit(self) -> V3 {
        let len = self.length();
        if math::is_zero(len) { self } else { self / len }
    }

    /// Normalizes, rejecting vectors of effectively zero length.
    pub fn try_unit(self) -> Option<V3> {
        let len = self.length();
        if math::is_zero(len) { None } else { Some(self / len) }
    }

    pub fn is_zero(self) -> bool {
        math::is_zero(self.length_squared())
    }

    pub fn dot(a: V3, b: V3) -> f64 {
        a.0 * b.0 + a.1 * b.1 + a.2 * b.2
    }

    pub fn cross(a: V3, b: V3) -> V3 {
        V3(
            a.1 * b.2 - a.2 * b.1,
            -(a.0 * b.2 - a.2 * b.0),
            a.0 * b.1 - a.1 * b.0,
        )
    }
}

impl Add for V3 {
    type Output = V3;
    fn add(self, other: V3) -> V3 {
        V3(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

impl Sub for V3 {
    type Output = V3;
    fn sub(self, other: V3) -> V3 {
        V3(self.0 - other.0, self.1 - other.1, self.2 - other.2)
    }
}

impl Mul for V3 {
    type Output = V3;
    fn mul(self, other: V3) -> V3 {
        V3(self.0 * other.0, self.1 * other.1, self.2 * other.2)
    }
}

impl Mul<f64> for V3 {
    type Output = V3;
    fn mul(self, f: f64) -> V3 {
        V3(self.0 * f, self.1 * f, self.2 * f)
    }
}

impl Div<f64> for V3 {
    type Output = V3;
    fn div(self, f: f64) -> V3 {
        V3(self.0 / f, self.1 / f, self.2 / f)
    }
}

impl Neg for V3 {
    type Output = V3;
    fn neg(self) -> V3 {
        V3(-self.0, -self.1, -self.2)
    }
}

//
// Point3
//

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct P3(pub f64, pub f64, pub f64); // x, y, z

impl P3 {
    pub const ORIGIN: P3 = P3(0.0, 0.0, 0.0);

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn z(&self) -> f64 {
        self.2
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.0, self.1, self.2]
    }

    pub fn distance_squared(self, other: P3) -> f64 {
        (self - other).length_squared()
    }

    pub fn distance(self, other: P3) -> f64 {
        (self - other).length()
    }

    /// Component-wise minimum of two points.
    pub fn min(a: P3, b: P3) -> P3 {
        P3(a.0.min(b.0), a.1.min(b.1), a.2.min(b.2))
    }

    /// Component-wise maximum of two points.
    pub fn max(a: P3, b: P3) -> P3 {
        P3(a.0.max(b.0), a.1.max(b.1), a.2.max(b.2))
    }
}

impl Sub for P3 {
    type Output = V3;
    fn sub(self, other: P3) -> V3 {
        V3(self.0 - other.0, self.1 - other.1, self.2 - other.2)
    }
}

impl Add<V3> for P3 {
    type Output = P3;
    fn add(self, v: V3) -> P3 {
        P3(self.0 + v.0, self.1 + v.1, self.2 + v.2)
    }
}

impl Sub<V3> for P3 {
    type Output = P3;
    fn sub(self, v: V3) -> P3 {
        P3(self.0 - v.0, self.1 - v.1, self.2 - v.2)
    }
}

//
// Ray
//

/// Origin plus unit-length direction. Immutable once constructed;
/// the direction is normalized by the constructor.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    origin: P3,
    direction: V3,
}

impl Ray {
    pub fn new(origin: P3, direction: V3) -> Ray {
        Ray {
            origin,
            direction: direction.unit(),
        }
    }

    pub fn origin(&self) -> P3 {
        self.origin
    }

    pub fn direction(&self) -> V3 {
        self.direction
    }

    pub fn point_at(&self, t: f64) -> P3 {
        self.origin + (self.direction * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn point_minus_point_is_vector() {
        let v = P3(1.0, 2.0, 3.0) - P3(0.5, 0.5, 0.5);
        assert_eq!(v, V3(0.5, 1.5, 2.5));
    }

    #[test]
    fn cross_is_orthogonal() {
        let a = V3(1.0, 2.0, 3.0);
        let b = V3(-2.0, 0.5, 1.0);
        let c = V3::cross(a, b);
        assert!(approx_eq(V3::dot(a, c), 0.0));
        assert!(approx_eq(V3::dot(b, c), 0.0));
    }

    #[test]
    fn try_unit_rejects_zero() {
        assert!(V3::ZERO.try_unit().is_none());
        let u = V3(3.0, 0.0, 4.0).try_unit().unwrap();
        assert!(approx_eq(u.length(), 1.0));
    }

    #[test]
    fn ray_normalizes_direction() {
        let r = Ray::new(P3::ORIGIN, V3(0.0, 0.0, -5.0));
        assert_eq!(r.direction(), V3::NEG_Z);
    }

    #[test]
    fn ray_point_at_scales_direction() {
        // point_at(t) - origin == t * direction, for any t > 0
        let r = Ray::new(P3(1.0, 1.0, 1.0), V3(1.0, 2.0, 2.0));
        for t in [0.5, 1.0, 17.25] {
            let travelled = r.point_at(t) - r.origin();
            let expected = r.direction() * t;
            assert!(approx_eq(travelled.x(), expected.x()));
            assert!(approx_eq(travelled.y(), expected.y()));
            assert!(approx_eq(travelled.z(), expected.z()));
        }
    }
}

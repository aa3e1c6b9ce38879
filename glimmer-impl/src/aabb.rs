use crate::math::EPSILON;
use crate::types::{P3, Ray, V3};

//
// Axis-aligned bounding boxes
//

#[derive(Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: P3,
    pub max: P3,
}

impl Aabb {
    /// Creates a bounding box from the given min/max corners.
    pub fn from_min_max(min: P3, max: P3) -> Aabb {
        debug_assert!(min.x() <= max.x() && min.y() <= max.y() && min.z() <= max.z());
        Aabb { min, max }
    }

    /// Finds the axis-aligned bounding box which fully contains the given
    /// sequence of points. Panics on an empty sequence.
    pub fn from_points(points: impl IntoIterator<Item = P3>) -> Aabb {
        let mut iter = points.into_iter();
        let first = iter.next().expect("Cannot create Aabb from empty point list");
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = P3::min(min, p);
            max = P3::max(max, p);
        }
        Aabb { min, max }
    }

    /// Creates a bounding box which fully contains the given two boxes.
    pub fn surrounding(b0: &Aabb, b1: &Aabb) -> Aabb {
        Aabb {
            min: P3::min(b0.min, b1.min),
            max: P3::max(b0.max, b1.max),
        }
    }

    pub fn center(&self) -> P3 {
        P3(
            (self.min.x() + self.max.x()) * 0.5,
            (self.min.y() + self.max.y()) * 0.5,
            (self.min.z() + self.max.z()) * 0.5,
        )
    }

    pub fn size(&self) -> V3 {
        self.max - self.min
    }

    pub fn surface_area(&self) -> f64 {
        let d = self.size();
        2.0 * (d.x() * d.y() + d.y() * d.z() + d.z() * d.x())
    }

    /// True when `p` lies inside the box, allowing `tolerance` of slack on
    /// every face.
    pub fn contains(&self, p: P3, tolerance: f64) -> bool {
        let (p, min, max) = (p.xyz(), self.min.xyz(), self.max.xyz());
        (0..3).all(|i| p[i] >= min[i] - tolerance && p[i] <= max[i] + tolerance)
    }

    /// Slab test: does the ray pass through this box at any `t >= 0`?
    ///
    /// An axis the ray runs parallel to cannot be clipped; the ray misses
    /// unless its origin already lies between that axis' slabs.
    pub fn hit(&self, ray: &Ray) -> bool {
        let o = ray.origin().xyz();
        let d = ray.direction().xyz();
        let min = self.min.xyz();
        let max = self.max.xyz();

        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;

        for axis in 0..3 {
            if d[axis].abs() < EPSILON {
                if o[axis] < min[axis] || o[axis] > max[axis] {
                    return false;
                }
                continue;
            }
            let mut t1 = (min[axis] - o[axis]) / d[axis];
            let mut t2 = (max[axis] - o[axis]) / d[axis];
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_enter = t_enter.max(t1);
            t_exit = t_exit.min(t2);
        }

        t_enter <= t_exit && t_exit >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_min_max(P3(-1.0, -1.0, -1.0), P3(1.0, 1.0, 1.0))
    }

    #[test]
    fn ray_through_box() {
        let b = unit_box();
        assert!(b.hit(&Ray::new(P3(0.0, 0.0, 5.0), V3::NEG_Z)));
        assert!(b.hit(&Ray::new(P3(5.0, 0.5, 0.5), V3::NEG_X)));
    }

    #[test]
    fn ray_past_box() {
        let b = unit_box();
        assert!(!b.hit(&Ray::new(P3(0.0, 2.0, 5.0), V3::NEG_Z)));
        // Pointing away from the box
        assert!(!b.hit(&Ray::new(P3(0.0, 0.0, 5.0), V3::POS_Z)));
    }

    #[test]
    fn ray_origin_inside() {
        assert!(unit_box().hit(&Ray::new(P3::ORIGIN, V3::POS_X)));
    }

    #[test]
    fn parallel_axis() {
        let b = unit_box();
        // Parallel to z, origin between the x/y slabs
        assert!(b.hit(&Ray::new(P3(0.5, 0.5, 5.0), V3::NEG_Z)));
        // Parallel to z, origin outside the x slab
        assert!(!b.hit(&Ray::new(P3(2.0, 0.5, 5.0), V3::NEG_Z)));
    }

    #[test]
    fn surrounding_covers_both() {
        let a = Aabb::from_min_max(P3(-2.0, 0.0, 0.0), P3(-1.0, 1.0, 1.0));
        let b = Aabb::from_min_max(P3(1.0, -3.0, 0.0), P3(2.0, 1.0, 4.0));
        let s = Aabb::surrounding(&a, &b);
        assert_eq!(s.min, P3(-2.0, -3.0, 0.0));
        assert_eq!(s.max, P3(2.0, 1.0, 4.0));
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let b = Aabb::from_min_max(P3::ORIGIN, P3(1.0, 1.0, 1.0));
        assert_eq!(b.surface_area(), 6.0);
    }
}

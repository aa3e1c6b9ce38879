use crate::aabb::Aabb;
use crate::color::Color;
use crate::geometry::{Geometry, GeometryError, Intersectable, Intersection, Plane};
use crate::material::Material;
use crate::math::{EPSILON, align_zero, is_zero};
use crate::types::{P3, Ray, V3};

/// A convex planar polygon with `N >= 3` vertices.
///
/// Validation happens entirely at construction: the vertex list must be
/// coplanar, convex and consistently wound, so the intersection test can
/// assume a well-formed contour.
pub struct Polygon {
    vertices: Vec<P3>,
    normal: V3,
    material: Material,
    emission: Color,
}

impl Polygon {
    pub fn new(vertices: Vec<P3>) -> Result<Polygon, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }

        let normal = V3::cross(vertices[1] - vertices[0], vertices[2] - vertices[0])
            .try_unit()
            .ok_or(GeometryError::NonConvexPolygon)?;

        for &v in &vertices[3..] {
            if !is_zero(V3::dot(v - vertices[0], normal)) {
                return Err(GeometryError::NonPlanarPolygon);
            }
        }

        // Convexity with consistent winding: every consecutive edge pair
        // must turn the same way around the normal.
        let n = vertices.len();
        for i in 0..n {
            let e0 = vertices[(i + 1) % n] - vertices[i];
            let e1 = vertices[(i + 2) % n] - vertices[(i + 1) % n];
            if align_zero(V3::dot(V3::cross(e0, e1), normal)) <= 0.0 {
                return Err(GeometryError::NonConvexPolygon);
            }
        }

        Ok(Polygon {
            vertices,
            normal,
            material: Material::default(),
            emission: Color::BLACK,
        })
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }
}

impl Intersectable for Polygon {
    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(self.vertices.iter().copied()))
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        let t = match Plane::ray_parameter(self.vertices[0], self.normal, ray) {
            Some(t) if t > EPSILON && t <= max_distance => t,
            _ => return,
        };

        // N-edge generalization of the triangle sign test. Consecutive
        // signs must strictly agree; a zero (edge graze) rejects.
        let o = ray.origin();
        let d = ray.direction();
        let n = self.vertices.len();
        let mut previous = 0.0;
        for i in 0..n {
            let u0 = self.vertices[i] - o;
            let u1 = self.vertices[(i + 1) % n] - o;
            let s = align_zero(V3::dot(d, V3::cross(u0, u1)));
            if i > 0 && s * previous <= 0.0 {
                return;
            }
            if s == 0.0 {
                return;
            }
            previous = s;
        }

        hits.push(Intersection {
            geometry: self,
            point: ray.point_at(t),
            t,
        });
    }
}

impl Geometry for Polygon {
    fn material(&self) -> &Material {
        &self.material
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn normal_at(&self, _point: P3) -> V3 {
        self.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            P3(-1.0, -1.0, -2.0),
            P3(1.0, -1.0, -2.0),
            P3(1.0, 1.0, -2.0),
            P3(-1.0, 1.0, -2.0),
        ])
        .unwrap()
    }

    fn count_hits(p: &Polygon, ray: &Ray) -> usize {
        let mut hits = Vec::new();
        p.intersect(ray, f64::INFINITY, &mut hits);
        hits.len()
    }

    #[test]
    fn rejects_too_few_vertices() {
        assert!(matches!(
            Polygon::new(vec![P3::ORIGIN, P3(1.0, 0.0, 0.0)]),
            Err(GeometryError::TooFewVertices(2))
        ));
    }

    #[test]
    fn rejects_non_planar() {
        let r = Polygon::new(vec![
            P3(0.0, 0.0, 0.0),
            P3(1.0, 0.0, 0.0),
            P3(1.0, 1.0, 0.0),
            P3(0.0, 1.0, 0.5),
        ]);
        assert!(matches!(r, Err(GeometryError::NonPlanarPolygon)));
    }

    #[test]
    fn rejects_non_convex() {
        // Arrowhead: the dent at (0.2, 0.2) breaks convexity
        let r = Polygon::new(vec![
            P3(0.0, 0.0, 0.0),
            P3(1.0, 0.0, 0.0),
            P3(0.2, 0.2, 0.0),
            P3(0.0, 1.0, 0.0),
        ]);
        assert!(matches!(r, Err(GeometryError::NonConvexPolygon)));
    }

    #[test]
    fn interior_hit_and_miss() {
        let square = unit_square();
        assert_eq!(count_hits(&square, &Ray::new(P3(0.5, -0.5, 0.0), V3::NEG_Z)), 1);
        assert_eq!(count_hits(&square, &Ray::new(P3(1.5, 0.0, 0.0), V3::NEG_Z)), 0);
    }

    #[test]
    fn edge_graze_misses() {
        let square = unit_square();
        assert_eq!(count_hits(&square, &Ray::new(P3(1.0, 0.0, 0.0), V3::NEG_Z)), 0);
    }

    // Random convex polygons of 3-6 vertices: any hit must lie in the
    // polygon's plane and must also register with the ray reversed.
    #[test]
    fn random_polygons_hit_in_plane() {
        let mut rng = XorShiftRng::seed_from_u64(0x706f6c79);
        for _ in 0..200 {
            // Random plane basis
            let normal = V3(
                rng.random::<f64>() * 2.0 - 1.0,
                rng.random::<f64>() * 2.0 - 1.0,
                rng.random::<f64>() + 0.5,
            )
            .unit();
            let u = V3::cross(normal, V3::POS_X).unit();
            let v = V3::cross(normal, u);
            let center = P3(
                rng.random::<f64>() * 4.0 - 2.0,
                rng.random::<f64>() * 4.0 - 2.0,
                -5.0 - rng.random::<f64>() * 4.0,
            );

            // Convex contour: sorted angles on a circle in the plane
            let count = rng.random_range(3..=6);
            let mut angles = (0..count)
                .map(|_| rng.random::<f64>() * std::f64::consts::TAU)
                .collect::<Vec<_>>();
            angles.sort_by(f64::total_cmp);
            angles.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
            if angles.len() < 3 {
                continue;
            }
            let radius = 1.0 + rng.random::<f64>();
            let vertices = angles
                .iter()
                .map(|a| center + u * (radius * a.cos()) + v * (radius * a.sin()))
                .collect::<Vec<_>>();

            let Ok(polygon) = Polygon::new(vertices.clone()) else {
                // Near-degenerate contour; skip
                continue;
            };

            // Aim at the centroid from off-plane
            let centroid = vertices
                .iter()
                .fold(V3::ZERO, |acc, p| acc + (*p - P3::ORIGIN))
                / vertices.len() as f64;
            let target = P3::ORIGIN + centroid;
            let origin = target + normal * (3.0 + rng.random::<f64>());

            let forward = Ray::new(origin, target - origin);
            let mut hits = Vec::new();
            polygon.intersect(&forward, f64::INFINITY, &mut hits);
            assert_eq!(hits.len(), 1);
            let hit = &hits[0];
            assert!(V3::dot(hit.point - vertices[0], polygon.normal).abs() < 1e-8);

            // Same crossing must register from the other side too
            let behind = target - normal * 2.0;
            let reverse = Ray::new(behind, target - behind);
            let mut reverse_hits = Vec::new();
            polygon.intersect(&reverse, f64::INFINITY, &mut reverse_hits);
            assert_eq!(reverse_hits.len(), 1);
        }
    }
}

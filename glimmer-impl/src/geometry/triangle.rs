use crate::aabb::Aabb;
use crate::color::Color;
use crate::geometry::{Geometry, GeometryError, Intersectable, Intersection, Plane};
use crate::material::Material;
use crate::math::{EPSILON, align_zero};
use crate::types::{P3, Ray, V3};

pub struct Triangle {
    vertices: [P3; 3],
    normal: V3,
    material: Material,
    emission: Color,
}

impl Triangle {
    pub fn new(a: P3, b: P3, c: P3) -> Result<Triangle, GeometryError> {
        let normal = V3::cross(b - a, c - a)
            .try_unit()
            .ok_or(GeometryError::CollinearTriangle)?;
        Ok(Triangle {
            vertices: [a, b, c],
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

impl Intersectable for Triangle {
    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(self.vertices))
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        let [a, b, c] = self.vertices;
        let t = match Plane::ray_parameter(a, self.normal, ray) {
            Some(t) if t > EPSILON && t <= max_distance => t,
            _ => return,
        };

        // Edge-sign test: the ray is inside the solid angle subtended by the
        // triangle iff its direction dots the three origin-to-edge cross
        // products with one strict sign. A zero product is an edge or vertex
        // graze and counts as a miss.
        let o = ray.origin();
        let d = ray.direction();
        let (u1, u2, u3) = (a - o, b - o, c - o);
        let s1 = align_zero(V3::dot(d, V3::cross(u1, u2)));
        let s2 = align_zero(V3::dot(d, V3::cross(u2, u3)));
        let s3 = align_zero(V3::dot(d, V3::cross(u3, u1)));
        let inside = (s1 > 0.0 && s2 > 0.0 && s3 > 0.0) || (s1 < 0.0 && s2 < 0.0 && s3 < 0.0);
        if !inside {
            return;
        }

        hits.push(Intersection {
            geometry: self,
            point: ray.point_at(t),
            t,
        });
    }
}

impl Geometry for Triangle {
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

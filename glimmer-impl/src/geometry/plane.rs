use crate::aabb::Aabb;
use crate::color::Color;
use crate::geometry::{Geometry, GeometryError, Intersectable, Intersection};
use crate::material::Material;
use crate::math::{EPSILON, align_zero};
use crate::types::{P3, Ray, V3};

/// An infinite plane through `point` with unit `normal`. Unbounded, so it
/// reports no bounding box and is kept out of the BVH by the scene.
pub struct Plane {
    point: P3,
    normal: V3,
    material: Material,
    emission: Color,
}

impl Plane {
    pub fn new(point: P3, normal: V3) -> Result<Plane, GeometryError> {
        let normal = normal.try_unit().ok_or(GeometryError::ZeroVector)?;
        Ok(Plane {
            point,
            normal,
            material: Material::default(),
            emission: Color::BLACK,
        })
    }

    /// The plane spanned by three points (counter-clockwise winding).
    pub fn from_points(a: P3, b: P3, c: P3) -> Result<Plane, GeometryError> {
        Plane::new(a, V3::cross(b - a, c - a))
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    /// Ray parameter of the plane crossing, or `None` when the ray is
    /// parallel or its origin lies on the plane.
    pub(crate) fn ray_parameter(point: P3, normal: V3, ray: &Ray) -> Option<f64> {
        let denominator = align_zero(V3::dot(ray.direction(), normal));
        if denominator == 0.0 {
            return None;
        }
        let numerator = align_zero(V3::dot(point - ray.origin(), normal));
        if numerator == 0.0 {
            // Origin on the plane: the t = 0 hit is suppressed
            return None;
        }
        Some(numerator / denominator)
    }
}

impl Intersectable for Plane {
    fn bounding_box(&self) -> Option<Aabb> {
        None
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        if let Some(t) = Plane::ray_parameter(self.point, self.normal, ray) {
            if t > EPSILON && t <= max_distance {
                hits.push(Intersection {
                    geometry: self,
                    point: ray.point_at(t),
                    t,
                });
            }
        }
    }
}

impl Geometry for Plane {
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

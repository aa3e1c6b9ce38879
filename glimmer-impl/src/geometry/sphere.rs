use crate::aabb::Aabb;
use crate::color::Color;
use crate::geometry::{Geometry, GeometryError, Intersectable, Intersection};
use crate::material::Material;
use crate::math::{EPSILON, align_zero};
use crate::types::{P3, Ray, V3};

pub struct Sphere {
    center: P3,
    radius: f64,
    material: Material,
    emission: Color,
}

impl Sphere {
    pub fn new(center: P3, radius: f64) -> Result<Sphere, GeometryError> {
        if align_zero(radius) <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        Ok(Sphere {
            center,
            radius,
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

impl Intersectable for Sphere {
    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_min_max(
            self.center - V3::ONE * self.radius,
            self.center + V3::ONE * self.radius,
        ))
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        let oc = ray.origin() - self.center;
        let b = V3::dot(oc, ray.direction());
        let c = V3::dot(oc, oc) - self.radius * self.radius;
        // Unit direction, so the quadratic coefficient a is 1
        let discriminant = align_zero(b * b - c);
        if discriminant < 0.0 {
            return;
        }

        let mut push = |t: f64| {
            if t > EPSILON && t <= max_distance {
                hits.push(Intersection {
                    geometry: self,
                    point: ray.point_at(t),
                    t,
                });
            }
        };

        if discriminant == 0.0 {
            // Tangent ray, single hit
            push(-b);
        } else {
            let sqrt_d = discriminant.sqrt();
            push(-b - sqrt_d);
            push(-b + sqrt_d);
        }
    }
}

impl Geometry for Sphere {
    fn material(&self) -> &Material {
        &self.material
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn normal_at(&self, point: P3) -> V3 {
        (point - self.center).unit()
    }
}

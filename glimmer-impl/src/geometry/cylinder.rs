use crate::aabb::Aabb;
use crate::color::Color;
use crate::geometry::{Geometry, GeometryError, Intersectable, Intersection};
use crate::material::Material;
use crate::math::{EPSILON, align_zero};
use crate::types::{P3, Ray, V3};

/// An infinite open cylinder around an axis ray. Unbounded, so it is routed
/// around the BVH like a plane.
pub struct Tube {
    axis: Ray,
    radius: f64,
    material: Material,
    emission: Color,
}

impl Tube {
    pub fn new(axis: Ray, radius: f64) -> Result<Tube, GeometryError> {
        if align_zero(radius) <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        Ok(Tube {
            axis,
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

    /// Lateral-surface crossings as ray parameters, smallest first.
    /// A ray parallel to the axis never crosses the lateral surface.
    fn surface_parameters(axis: &Ray, radius: f64, ray: &Ray) -> impl Iterator<Item = f64> {
        let v = axis.direction();
        let d = ray.direction();
        let delta = ray.origin() - axis.origin();

        let d_perp = d - v * V3::dot(d, v);
        let delta_perp = delta - v * V3::dot(delta, v);

        let a = align_zero(d_perp.length_squared());
        let mut roots = [None, None];
        if a != 0.0 {
            let b = 2.0 * V3::dot(d_perp, delta_perp);
            let c = delta_perp.length_squared() - radius * radius;
            let discriminant = align_zero(b * b - 4.0 * a * c);
            if discriminant == 0.0 {
                roots[0] = Some(-b / (2.0 * a));
            } else if discriminant > 0.0 {
                let sqrt_d = discriminant.sqrt();
                roots[0] = Some((-b - sqrt_d) / (2.0 * a));
                roots[1] = Some((-b + sqrt_d) / (2.0 * a));
            }
        }
        roots.into_iter().flatten()
    }

    fn lateral_normal(axis: &Ray, point: P3) -> V3 {
        let along = V3::dot(point - axis.origin(), axis.direction());
        (point - axis.point_at(along)).unit()
    }
}

impl Intersectable for Tube {
    fn bounding_box(&self) -> Option<Aabb> {
        None
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        for t in Tube::surface_parameters(&self.axis, self.radius, ray) {
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

impl Geometry for Tube {
    fn material(&self) -> &Material {
        &self.material
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn normal_at(&self, point: P3) -> V3 {
        Tube::lateral_normal(&self.axis, point)
    }
}

/// A tube clipped to a finite height along its axis. Open-ended: the rim is
/// treated as a miss, and cap discs are left to scene authors to compose.
pub struct Cylinder {
    axis: Ray,
    radius: f64,
    height: f64,
    material: Material,
    emission: Color,
}

impl Cylinder {
    pub fn new(axis: Ray, radius: f64, height: f64) -> Result<Cylinder, GeometryError> {
        if align_zero(radius) <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        if align_zero(height) <= 0.0 {
            return Err(GeometryError::NonPositiveHeight(height));
        }
        Ok(Cylinder {
            axis,
            radius,
            height,
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

impl Intersectable for Cylinder {
    fn bounding_box(&self) -> Option<Aabb> {
        // Per-axis half-extent of a cap circle: r * sqrt(1 - v_i^2)
        let v = self.axis.direction().xyz();
        let extent = V3(
            self.radius * (1.0 - v[0] * v[0]).max(0.0).sqrt(),
            self.radius * (1.0 - v[1] * v[1]).max(0.0).sqrt(),
            self.radius * (1.0 - v[2] * v[2]).max(0.0).sqrt(),
        );
        let bottom = self.axis.origin();
        let top = self.axis.point_at(self.height);
        Some(Aabb::from_points([
            bottom - extent,
            bottom + extent,
            top - extent,
            top + extent,
        ]))
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        for t in Tube::surface_parameters(&self.axis, self.radius, ray) {
            if t <= EPSILON || t > max_distance {
                continue;
            }
            let point = ray.point_at(t);
            let along = align_zero(V3::dot(point - self.axis.origin(), self.axis.direction()));
            if along > 0.0 && align_zero(along - self.height) < 0.0 {
                hits.push(Intersection { geometry: self, point, t });
            }
        }
    }
}

impl Geometry for Cylinder {
    fn material(&self) -> &Material {
        &self.material
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn normal_at(&self, point: P3) -> V3 {
        Tube::lateral_normal(&self.axis, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z_axis() -> Ray {
        Ray::new(P3::ORIGIN, V3::POS_Z)
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(Tube::new(z_axis(), 0.0).is_err());
        assert!(Cylinder::new(z_axis(), 1.0, -1.0).is_err());
        assert!(Cylinder::new(z_axis(), -1.0, 1.0).is_err());
    }

    #[test]
    fn tube_side_crossing() {
        let tube = Tube::new(z_axis(), 1.0).unwrap();
        let mut hits = Vec::new();
        tube.intersect(&Ray::new(P3(-5.0, 0.0, 3.0), V3::POS_X), f64::INFINITY, &mut hits);
        let mut ts = hits.iter().map(|h| h.t).collect::<Vec<_>>();
        ts.sort_by(f64::total_cmp);
        assert_eq!(ts, vec![4.0, 6.0]);
    }

    #[test]
    fn tube_parallel_ray_misses() {
        let tube = Tube::new(z_axis(), 1.0).unwrap();
        let mut hits = Vec::new();
        tube.intersect(&Ray::new(P3(0.5, 0.0, 0.0), V3::POS_Z), f64::INFINITY, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn tube_normal_is_radial() {
        let tube = Tube::new(z_axis(), 1.0).unwrap();
        assert_eq!(tube.normal_at(P3(1.0, 0.0, 7.0)), V3::POS_X);
    }

    #[test]
    fn cylinder_clips_to_height() {
        let cylinder = Cylinder::new(z_axis(), 1.0, 2.0).unwrap();
        let mut hits = Vec::new();
        // Within the height range
        cylinder.intersect(&Ray::new(P3(-5.0, 0.0, 1.0), V3::POS_X), f64::INFINITY, &mut hits);
        assert_eq!(hits.len(), 2);
        // Beyond the top
        hits.clear();
        cylinder.intersect(&Ray::new(P3(-5.0, 0.0, 3.0), V3::POS_X), f64::INFINITY, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn cylinder_bounding_box_contains_hits() {
        let axis = Ray::new(P3(1.0, 0.0, 0.0), V3(1.0, 1.0, 0.0));
        let cylinder = Cylinder::new(axis, 0.5, 3.0).unwrap();
        let aabb = cylinder.bounding_box().unwrap();
        let mut hits = Vec::new();
        cylinder.intersect(
            &Ray::new(P3(2.0, 1.0, -5.0), V3::POS_Z),
            f64::INFINITY,
            &mut hits,
        );
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(aabb.contains(hit.point, 1e-9));
        }
    }
}

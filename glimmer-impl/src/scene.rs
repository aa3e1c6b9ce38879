use std::sync::Arc;

use crate::aabb::Aabb;
use crate::bvh::{BvhNode, BvhStats};
use crate::color::Color;
use crate::composite::Composite;
use crate::geometry::{self, Geometry, Intersectable, Intersection};
use crate::lights::{AmbientLight, Light};
use crate::types::Ray;

//
// Scene
//

/// The aggregate the tracer shoots rays at: geometry, lights, ambient term
/// and background color.
///
/// Assembly is fluent (`add_geometry`/`add_light`/... all chain) and ends
/// with an optional `build_bvh()`, which replaces the flat geometry walk
/// with an SAH hierarchy. Unbounded geometry can never be culled by a box
/// test, so it is grouped beside the hierarchy rather than inside it.
pub struct Scene {
    name: String,
    background: Color,
    ambient: AmbientLight,
    lights: Vec<Light>,
    geometries: Vec<Arc<dyn Geometry>>,
    // Some once build_bvh has run; adding geometry resets it
    root: Option<Composite>,
    bvh_stats: Option<BvhStats>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Scene {
        Scene {
            name: name.into(),
            background: Color::BLACK,
            ambient: AmbientLight::default(),
            lights: vec![],
            geometries: vec![],
            root: None,
            bvh_stats: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn bvh_stats(&self) -> Option<&BvhStats> {
        self.bvh_stats.as_ref()
    }

    /// Takes ownership of a primitive; the scene keeps it behind an `Arc`
    /// handle so the BVH can reference it without duplication.
    pub fn add_geometry(&mut self, geometry: impl Geometry + 'static) -> &mut Self {
        self.geometries.push(Arc::new(geometry));
        self.root = None;
        self.bvh_stats = None;
        self
    }

    pub fn add_light(&mut self, light: impl Into<Light>) -> &mut Self {
        self.lights.push(light.into());
        self
    }

    pub fn set_ambient(&mut self, ambient: AmbientLight) -> &mut Self {
        self.ambient = ambient;
        self
    }

    pub fn set_background(&mut self, background: Color) -> &mut Self {
        self.background = background;
        self
    }

    /// Builds the SAH hierarchy over the bounded geometry and makes it the
    /// scene root. Idempotent: a second call on an unchanged scene is a
    /// no-op.
    pub fn build_bvh(&mut self) -> &mut Self {
        if self.root.is_some() {
            return self;
        }

        let (bounded, unbounded): (Vec<_>, Vec<_>) = self
            .geometries
            .iter()
            .cloned()
            .partition(|g| g.bounding_box().is_some());

        let mut root = Composite::new();
        if let Some((bvh, stats)) = BvhNode::build(bounded) {
            log::info!(
                "scene '{}': built {}-node BVH over {} primitives ({} leaves, avg {:.2}/leaf, depth {})",
                self.name,
                stats.node_count,
                stats.leaf_primitives,
                stats.leaf_count,
                stats.average_leaf_size(),
                stats.max_depth,
            );
            self.bvh_stats = Some(stats);
            root.add(bvh);
        }
        if !unbounded.is_empty() {
            let children = unbounded
                .into_iter()
                .map(|g| -> Arc<dyn Intersectable> { g })
                .collect();
            root.add(Composite::from_children(children));
        }

        self.root = Some(root);
        self
    }

    /// Scans the hit list for the smallest positive `t`.
    pub fn closest_intersection(&self, ray: &Ray, max_distance: f64) -> Option<Intersection<'_>> {
        let mut hits = Vec::new();
        self.intersect(ray, max_distance, &mut hits);
        geometry::closest(hits)
    }
}

impl Intersectable for Scene {
    fn bounding_box(&self) -> Option<Aabb> {
        match &self.root {
            Some(root) => root.bounding_box(),
            None => self
                .geometries
                .iter()
                .filter_map(|g| g.bounding_box())
                .reduce(|a, b| Aabb::surrounding(&a, &b)),
        }
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        match &self.root {
            Some(root) => root.intersect(ray, max_distance, hits),
            // Flat walk until build_bvh has run
            None => {
                for geometry in &self.geometries {
                    geometry.intersect(ray, max_distance, hits);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use crate::types::{P3, V3};

    fn two_sphere_scene() -> Scene {
        let mut scene = Scene::new("test");
        scene
            .add_geometry(Sphere::new(P3(0.0, 0.0, -3.0), 1.0).unwrap())
            .add_geometry(Sphere::new(P3(0.0, 0.0, -8.0), 1.0).unwrap());
        scene
    }

    #[test]
    fn closest_picks_minimum_t() {
        let scene = two_sphere_scene();
        let hit = scene
            .closest_intersection(&Ray::new(P3::ORIGIN, V3::NEG_Z), f64::INFINITY)
            .unwrap();
        assert_eq!(hit.t, 2.0);
    }

    #[test]
    fn empty_scene_misses() {
        let scene = Scene::new("empty");
        assert!(
            scene
                .closest_intersection(&Ray::new(P3::ORIGIN, V3::NEG_Z), f64::INFINITY)
                .is_none()
        );
    }

    #[test]
    fn bvh_routes_unbounded_geometry() {
        let mut scene = two_sphere_scene();
        scene.add_geometry(Plane::new(P3(0.0, -2.0, 0.0), V3::POS_Y).unwrap());
        scene.build_bvh();

        // The plane must still be hittable after acceleration
        let hit = scene
            .closest_intersection(&Ray::new(P3::ORIGIN, V3(0.0, -1.0, 0.0)), f64::INFINITY)
            .unwrap();
        assert_eq!(hit.t, 2.0);

        // Spheres too
        let hit = scene
            .closest_intersection(&Ray::new(P3::ORIGIN, V3::NEG_Z), f64::INFINITY)
            .unwrap();
        assert_eq!(hit.t, 2.0);
    }

    #[test]
    fn build_bvh_is_idempotent() {
        let mut scene = two_sphere_scene();
        scene.build_bvh();
        let first = scene.bvh_stats().cloned().unwrap();
        scene.build_bvh();
        let second = scene.bvh_stats().cloned().unwrap();
        assert_eq!(first.node_count, second.node_count);
    }

    #[test]
    fn adding_geometry_resets_acceleration() {
        let mut scene = two_sphere_scene();
        scene.build_bvh();
        scene.add_geometry(Sphere::new(P3(5.0, 0.0, -3.0), 1.0).unwrap());
        assert!(scene.bvh_stats().is_none());
        // Flat walk still sees the new sphere
        let hit = scene
            .closest_intersection(&Ray::new(P3(5.0, 0.0, 0.0), V3::NEG_Z), f64::INFINITY)
            .unwrap();
        assert_eq!(hit.t, 2.0);
    }
}

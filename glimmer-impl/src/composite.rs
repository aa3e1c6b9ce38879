use std::sync::Arc;

use crate::aabb::Aabb;
use crate::geometry::{Intersectable, Intersection};
use crate::types::Ray;

//
// Flat composite
//

/// An ordered group of `Intersectable`s exposed as one `Intersectable`.
///
/// This is the vehicle for every flat aggregate in the crate: the pre-BVH
/// scene root, multi-primitive BVH leaves and the group of unbounded
/// geometry that is routed around the BVH.
#[derive(Default)]
pub struct Composite {
    children: Vec<Arc<dyn Intersectable>>,
}

impl Composite {
    pub fn new() -> Composite {
        Composite::default()
    }

    pub fn from_children(children: Vec<Arc<dyn Intersectable>>) -> Composite {
        Composite { children }
    }

    /// Takes ownership of a child and shelves it behind an `Arc` handle.
    pub fn add(&mut self, child: impl Intersectable + 'static) {
        self.children.push(Arc::new(child));
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Intersectable for Composite {
    /// The union of the bounded children's boxes, or `None` when every
    /// child is unbounded (or there are no children).
    fn bounding_box(&self) -> Option<Aabb> {
        self.children
            .iter()
            .filter_map(|child| child.bounding_box())
            .reduce(|a, b| Aabb::surrounding(&a, &b))
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        for child in &self.children {
            child.intersect(ray, max_distance, hits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use crate::types::{P3, V3};

    #[test]
    fn concatenates_child_hits() {
        let mut group = Composite::new();
        group.add(Sphere::new(P3(0.0, 0.0, -3.0), 1.0).unwrap());
        group.add(Sphere::new(P3(0.0, 0.0, -8.0), 1.0).unwrap());

        let mut hits = Vec::new();
        group.intersect(&Ray::new(P3::ORIGIN, V3::NEG_Z), f64::INFINITY, &mut hits);
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn bounding_box_skips_unbounded_children() {
        let mut group = Composite::new();
        group.add(Plane::new(P3::ORIGIN, V3::POS_Y).unwrap());
        group.add(Sphere::new(P3(2.0, 0.0, 0.0), 1.0).unwrap());

        let aabb = group.bounding_box().unwrap();
        assert_eq!(aabb.min, P3(1.0, -1.0, -1.0));
        assert_eq!(aabb.max, P3(3.0, 1.0, 1.0));
    }

    #[test]
    fn all_unbounded_is_unbounded() {
        let mut group = Composite::new();
        group.add(Plane::new(P3::ORIGIN, V3::POS_Y).unwrap());
        assert!(group.bounding_box().is_none());
        assert!(Composite::new().bounding_box().is_none());
    }
}

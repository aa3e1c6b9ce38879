use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::aabb::Aabb;
use crate::composite::Composite;
use crate::geometry::{Geometry, Intersectable, Intersection};
use crate::types::Ray;

pub const MAX_OBJECTS_PER_LEAF: usize = 4;
pub const MAX_DEPTH: usize = 20;

// A DFS over a binary tree keeps at most one pending sibling per level on
// the stack, and construction caps the depth at MAX_DEPTH.
const STACK_CAPACITY: usize = MAX_DEPTH + 2;

//
// Bounding volume hierarchy
//

/// A node of the hierarchy. Every node caches the union box of everything
/// below it; leaves hold either a single primitive or a small flat group.
pub enum BvhNode {
    Leaf {
        aabb: Aabb,
        child: Arc<dyn Intersectable>,
    },
    Internal {
        aabb: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

/// Read-only construction metrics, logged by the scene after a build.
#[derive(Debug, Clone, Default)]
pub struct BvhStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub internal_count: usize,
    pub max_depth: usize,
    pub leaf_primitives: usize,
}

impl BvhStats {
    pub fn average_leaf_size(&self) -> f64 {
        if self.leaf_count == 0 {
            0.0
        } else {
            self.leaf_primitives as f64 / self.leaf_count as f64
        }
    }
}

struct BuildItem {
    geometry: Arc<dyn Geometry>,
    aabb: Aabb,
    center: [f64; 3],
}

impl BvhNode {
    /// Builds the hierarchy over a set of bounded geometries. Returns `None`
    /// for an empty set. Unbounded geometry must be filtered out by the
    /// caller and routed around the hierarchy.
    pub fn build(geometries: Vec<Arc<dyn Geometry>>) -> Option<(BvhNode, BvhStats)> {
        let items = geometries
            .into_iter()
            .map(|geometry| {
                let aabb = geometry
                    .bounding_box()
                    .expect("BVH build requires bounded geometry");
                let center = aabb.center().xyz();
                BuildItem { geometry, aabb, center }
            })
            .collect::<Vec<_>>();

        if items.is_empty() {
            return None;
        }

        let mut stats = BvhStats::default();
        let root = build_node(items, 0, &mut stats);
        Some((root, stats))
    }

    pub fn aabb(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { aabb, .. } => aabb,
            BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

fn union_bounds(items: &[BuildItem]) -> Aabb {
    items
        .iter()
        .map(|item| item.aabb.clone())
        .reduce(|a, b| Aabb::surrounding(&a, &b))
        .expect("union_bounds: empty item list")
}

fn make_leaf(bounds: Aabb, items: Vec<BuildItem>, depth: usize, stats: &mut BvhStats) -> BvhNode {
    stats.node_count += 1;
    stats.leaf_count += 1;
    stats.leaf_primitives += items.len();
    stats.max_depth = stats.max_depth.max(depth);

    let child: Arc<dyn Intersectable> = if items.len() == 1 {
        let single = items.into_iter().next().unwrap();
        single.geometry
    } else {
        let children = items
            .into_iter()
            .map(|item| -> Arc<dyn Intersectable> { item.geometry })
            .collect();
        Arc::new(Composite::from_children(children))
    };

    BvhNode::Leaf { aabb: bounds, child }
}

fn build_node(mut items: Vec<BuildItem>, depth: usize, stats: &mut BvhStats) -> BvhNode {
    let bounds = union_bounds(&items);
    let n = items.len();

    if n <= MAX_OBJECTS_PER_LEAF || depth >= MAX_DEPTH {
        return make_leaf(bounds, items, depth, stats);
    }

    // Split along the longest axis of the union box, ordering primitives by
    // the center of their boxes on that axis.
    let size = bounds.size().xyz();
    let axis = (0..3).max_by(|&a, &b| size[a].total_cmp(&size[b])).unwrap();
    items.sort_by(|a, b| a.center[axis].total_cmp(&b.center[axis]));

    // Surface area heuristic, evaluated with one suffix and one prefix
    // sweep: right_bounds[i] is the union of items[i..].
    let mut right_bounds = vec![items[n - 1].aabb.clone(); n];
    for i in (0..n - 1).rev() {
        right_bounds[i] = Aabb::surrounding(&items[i].aabb, &right_bounds[i + 1]);
    }

    let mut left_acc = items[0].aabb.clone();
    let mut best_split = 0;
    let mut best_cost = f64::INFINITY;
    for i in 1..n {
        let cost = left_acc.surface_area() * i as f64
            + right_bounds[i].surface_area() * (n - i) as f64;
        if cost < best_cost {
            best_cost = cost;
            best_split = i;
        }
        left_acc = Aabb::surrounding(&left_acc, &items[i].aabb);
    }

    // A split must strictly beat the cost of shading the node as one leaf
    let leaf_cost = bounds.surface_area() * n as f64;
    if best_cost >= leaf_cost {
        return make_leaf(bounds, items, depth, stats);
    }

    let right_items = items.split_off(best_split);
    let left = build_node(items, depth + 1, stats);
    let right = build_node(right_items, depth + 1, stats);

    stats.node_count += 1;
    stats.internal_count += 1;

    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(left),
        right: Box::new(right),
    }
}

impl Intersectable for BvhNode {
    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.aabb().clone())
    }

    fn intersect<'a>(&'a self, ray: &Ray, max_distance: f64, hits: &mut Vec<Intersection<'a>>) {
        let mut stack = ArrayVec::<&BvhNode, STACK_CAPACITY>::new();
        stack.push(self);

        while let Some(node) = stack.pop() {
            if !node.aabb().hit(ray) {
                continue;
            }
            match node {
                BvhNode::Leaf { child, .. } => child.intersect(ray, max_distance, hits),
                BvhNode::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }
}

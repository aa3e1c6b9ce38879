pub mod scenes;
pub mod util;

use glimmer_impl::camera::CameraBuilder;
use glimmer_impl::geometry::GeometryError;
use glimmer_impl::scene::Scene;

/// A scene plus a camera builder pre-loaded with a viewpoint that frames
/// it. Callers finish the builder (resolution, threads, tracer) themselves.
pub struct SceneSetup {
    pub scene: Scene,
    pub camera: CameraBuilder,
}

pub struct SampleScene {
    pub name: &'static str,
    pub summary: &'static str,
    pub build: fn() -> Result<SceneSetup, GeometryError>,
}

pub fn sample_scenes() -> Vec<SampleScene> {
    vec![
        SampleScene {
            name: "spheres",
            summary: "A seeded random field of spheres and triangles",
            build: scenes::sphere_field,
        },
        SampleScene {
            name: "glass-shadow",
            summary: "A transparent sphere throwing a partial shadow onto a checker floor",
            build: scenes::glass_shadow,
        },
        SampleScene {
            name: "mirrors",
            summary: "Two facing mirrors multiplying a pair of spheres",
            build: scenes::mirrors,
        },
        SampleScene {
            name: "dof",
            summary: "A row of spheres under thin-lens depth of field",
            build: scenes::depth_of_field,
        },
        SampleScene {
            name: "primitives",
            summary: "One of everything: sphere, plane, polygon, cylinder, tube",
            build: scenes::primitives,
        },
    ]
}

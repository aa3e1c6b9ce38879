use std::sync::Arc;

use cancellation::{CancellationToken, CancellationTokenSource};
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use crate::color::Color;
use crate::math::align_zero;
use crate::render::{self, ImageSink, RenderStats};
use crate::scene::Scene;
use crate::tracer::{DEFAULT_MAX_RECURSION, RayTracer, TracerKind};
use crate::types::{P3, Ray, V3};

// Base seed for per-pixel sample streams. Renders are repeatable because
// every pixel derives its own RNG from this and its index alone.
const DEFAULT_SEED: u64 = 0x676c_696d_6d65_7200;

/// Thin-lens configuration: rays are averaged over a disk of diameter
/// `aperture`, all aimed through the focal point at `focal_distance`.
#[derive(Clone, Debug)]
pub struct DepthOfField {
    pub focal_distance: f64,
    pub aperture: f64,
    pub samples: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("camera direction was not configured")]
    MissingDirection,
    #[error("camera has no scene attached (use ray_tracer)")]
    MissingScene,
    #[error("camera direction vectors must be non-zero (and the target distinct from the location)")]
    DegenerateDirection,
    #[error("forward and up vectors must be orthogonal")]
    NonOrthogonalBasis,
    #[error("viewport dimensions must be positive")]
    NonPositiveViewport,
    #[error("viewport distance must be positive")]
    NonPositiveDistance,
    #[error("image resolution must be at least 1x1")]
    ZeroResolution,
    #[error("depth of field needs positive focal distance and aperture, and at least one sample")]
    InvalidDepthOfField,
}

enum Orientation {
    /// Explicit forward/up pair; must be orthogonal.
    Vectors { to: V3, up: V3 },
    /// Aim at a point; `up` is re-orthogonalized around the computed
    /// forward vector.
    Target { target: P3, up: V3 },
}

//
// Camera builder
//

pub struct CameraBuilder {
    location: P3,
    orientation: Option<Orientation>,
    vp_width: f64,
    vp_height: f64,
    vp_distance: f64,
    resolution: Option<(usize, usize)>,
    threads: usize,
    dof: Option<DepthOfField>,
    tracer: Option<(Arc<Scene>, TracerKind)>,
    max_recursion: u32,
    seed: u64,
}

impl CameraBuilder {
    pub fn location(mut self, location: P3) -> Self {
        self.location = location;
        self
    }

    pub fn direction(mut self, to: V3, up: V3) -> Self {
        self.orientation = Some(Orientation::Vectors { to, up });
        self
    }

    pub fn direction_to(mut self, target: P3, up: V3) -> Self {
        self.orientation = Some(Orientation::Target { target, up });
        self
    }

    pub fn vp_size(mut self, width: f64, height: f64) -> Self {
        self.vp_width = width;
        self.vp_height = height;
        self
    }

    pub fn vp_distance(mut self, distance: f64) -> Self {
        self.vp_distance = distance;
        self
    }

    pub fn resolution(mut self, nx: usize, ny: usize) -> Self {
        self.resolution = Some((nx, ny));
        self
    }

    /// Worker thread count; 0 renders on the calling thread.
    pub fn multithreading(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn depth_of_field(mut self, focal_distance: f64, aperture: f64, samples: u32) -> Self {
        self.dof = Some(DepthOfField {
            focal_distance,
            aperture,
            samples,
        });
        self
    }

    pub fn ray_tracer(mut self, scene: Arc<Scene>, kind: TracerKind) -> Self {
        self.tracer = Some((scene, kind));
        self
    }

    pub fn max_recursion(mut self, depth: u32) -> Self {
        self.max_recursion = depth;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<Camera, CameraError> {
        let (to, up) = match self.orientation.ok_or(CameraError::MissingDirection)? {
            Orientation::Vectors { to, up } => {
                let to = to.try_unit().ok_or(CameraError::DegenerateDirection)?;
                let up = up.try_unit().ok_or(CameraError::DegenerateDirection)?;
                if align_zero(V3::dot(to, up)) != 0.0 {
                    return Err(CameraError::NonOrthogonalBasis);
                }
                (to, up)
            }
            Orientation::Target { target, up } => {
                let to = (target - self.location)
                    .try_unit()
                    .ok_or(CameraError::DegenerateDirection)?;
                let right = V3::cross(to, up)
                    .try_unit()
                    .ok_or(CameraError::DegenerateDirection)?;
                (to, V3::cross(right, to).unit())
            }
        };
        let right = V3::cross(to, up).unit();

        if self.vp_width <= 0.0 || self.vp_height <= 0.0 {
            return Err(CameraError::NonPositiveViewport);
        }
        if self.vp_distance <= 0.0 {
            return Err(CameraError::NonPositiveDistance);
        }
        let (nx, ny) = self.resolution.ok_or(CameraError::ZeroResolution)?;
        if nx == 0 || ny == 0 {
            return Err(CameraError::ZeroResolution);
        }
        if let Some(dof) = &self.dof {
            if dof.focal_distance <= 0.0 || dof.aperture <= 0.0 || dof.samples == 0 {
                return Err(CameraError::InvalidDepthOfField);
            }
        }
        let (scene, kind) = self.tracer.ok_or(CameraError::MissingScene)?;
        let tracer = RayTracer::new(scene, kind).with_max_recursion(self.max_recursion);

        Ok(Camera {
            location: self.location,
            to,
            up,
            right,
            center: self.location + to * self.vp_distance,
            vp_width: self.vp_width,
            vp_height: self.vp_height,
            nx,
            ny,
            threads: self.threads,
            dof: self.dof,
            tracer,
            seed: self.seed,
        })
    }
}

//
// Camera
//

/// Generates primary rays through a viewport and drives the tracer over the
/// whole pixel grid.
pub struct Camera {
    location: P3,
    to: V3,
    up: V3,
    right: V3,
    center: P3,
    vp_width: f64,
    vp_height: f64,
    nx: usize,
    ny: usize,
    threads: usize,
    dof: Option<DepthOfField>,
    tracer: RayTracer,
    seed: u64,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder {
            location: P3::ORIGIN,
            orientation: None,
            vp_width: 0.0,
            vp_height: 0.0,
            vp_distance: 0.0,
            resolution: None,
            threads: 0,
            dof: None,
            tracer: None,
            max_recursion: DEFAULT_MAX_RECURSION,
            seed: DEFAULT_SEED,
        }
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The primary ray through the center of pixel `(i, j)`. Row `j` runs
    /// top to bottom, so the up-axis offset flips sign.
    pub fn pixel_ray(&self, i: usize, j: usize) -> Ray {
        let rx = self.vp_width / self.nx as f64;
        let ry = self.vp_height / self.ny as f64;
        let xi = (i as f64 - (self.nx as f64 - 1.0) / 2.0) * rx;
        let yj = -(j as f64 - (self.ny as f64 - 1.0) / 2.0) * ry;
        let point = self.center + self.right * xi + self.up * yj;
        Ray::new(self.location, point - self.location)
    }

    /// Traces pixel `(i, j)`: a single primary ray, or a deterministic
    /// jittered thin-lens bundle when depth of field is configured.
    pub fn pixel_color(&self, i: usize, j: usize) -> Color {
        let primary = self.pixel_ray(i, j);
        let Some(dof) = &self.dof else {
            return self.tracer.trace(&primary);
        };

        // The focal point sits where the primary ray crosses the plane at
        // focal_distance along the viewing axis
        let along = V3::dot(primary.direction(), self.to);
        let focal_point = primary.origin() + primary.direction() * (dof.focal_distance / along);

        let radius = dof.aperture / 2.0;
        let mut rng = XorShiftRng::seed_from_u64(self.pixel_seed(i, j));
        let mut accumulated = Color::BLACK;
        for _ in 0..dof.samples {
            let (dx, dy) = sample_unit_disk(&mut rng);
            let origin = self.location + self.right * (dx * radius) + self.up * (dy * radius);
            let direction = focal_point - origin;
            accumulated = accumulated + self.tracer.trace(&Ray::new(origin, direction));
        }
        accumulated / dof.samples as f64
    }

    fn pixel_seed(&self, i: usize, j: usize) -> u64 {
        let index = (j * self.nx + i) as u64;
        self.seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    /// Renders the full pixel grid into the sink. Blocks until every tile
    /// is done.
    pub fn render_image(&self, sink: &dyn ImageSink) -> RenderStats {
        let cts = CancellationTokenSource::new();
        self.render_with_cancellation(sink, cts.token())
    }

    /// As `render_image`, but polls `token` at tile boundaries; on
    /// cancellation the in-flight tiles finish and the call returns
    /// cleanly with partial output.
    pub fn render_with_cancellation(
        &self,
        sink: &dyn ImageSink,
        token: &CancellationToken,
    ) -> RenderStats {
        render::render(self, sink, token)
    }
}

fn sample_unit_disk(rng: &mut XorShiftRng) -> (f64, f64) {
    loop {
        let x = rng.random::<f64>() * 2.0 - 1.0;
        let y = rng.random::<f64>() * 2.0 - 1.0;
        if x * x + y * y < 1.0 {
            return (x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Intersectable, Plane, Sphere, Triangle};
    use crate::material::Material;
    use crate::lights::DirectionalLight;

    fn empty_scene() -> Arc<Scene> {
        Arc::new(Scene::new("empty"))
    }

    /// The 3x3 viewport camera used by the intersection-count tests.
    fn grid_camera(location: P3, scene: Arc<Scene>) -> Camera {
        Camera::builder()
            .location(location)
            .direction(V3::NEG_Z, V3::NEG_Y)
            .vp_size(3.0, 3.0)
            .vp_distance(1.0)
            .resolution(3, 3)
            .ray_tracer(scene, TracerKind::Simple)
            .build()
            .unwrap()
    }

    fn count_intersections(camera: &Camera, target: &dyn Intersectable) -> usize {
        let (nx, ny) = camera.resolution();
        let mut total = 0;
        for j in 0..ny {
            for i in 0..nx {
                let mut hits = Vec::new();
                target.intersect(&camera.pixel_ray(i, j), f64::INFINITY, &mut hits);
                total += hits.len();
            }
        }
        total
    }

    #[test]
    fn center_pixel_ray_is_forward() {
        let camera = grid_camera(P3::ORIGIN, empty_scene());
        let ray = camera.pixel_ray(1, 1);
        assert_eq!(ray.direction(), V3::NEG_Z);
        assert_eq!(ray.origin(), P3::ORIGIN);
    }

    #[test]
    fn sphere_intersection_count_through_grid() {
        // Only the center ray pierces the unit sphere: front and back
        let camera = grid_camera(P3::ORIGIN, empty_scene());
        let sphere = Sphere::new(P3(0.0, 0.0, -3.0), 1.0).unwrap();
        assert_eq!(count_intersections(&camera, &sphere), 2);
    }

    #[test]
    fn triangle_intersection_count_through_grid() {
        let camera = grid_camera(P3(0.0, 0.0, 0.5), empty_scene());

        let small = Triangle::new(P3(0.0, 1.0, -2.0), P3(1.0, -1.0, -2.0), P3(-1.0, -1.0, -2.0)).unwrap();
        assert_eq!(count_intersections(&camera, &small), 1);

        let tall = Triangle::new(P3(0.0, 20.0, -2.0), P3(1.0, -1.0, -2.0), P3(-1.0, -1.0, -2.0)).unwrap();
        assert_eq!(count_intersections(&camera, &tall), 2);
    }

    #[test]
    fn build_validates_basis() {
        let b = Camera::builder()
            .direction(V3::NEG_Z, V3(0.0, 1.0, 0.5))
            .vp_size(3.0, 3.0)
            .vp_distance(1.0)
            .resolution(3, 3)
            .ray_tracer(empty_scene(), TracerKind::Simple);
        assert!(matches!(b.build(), Err(CameraError::NonOrthogonalBasis)));
    }

    #[test]
    fn build_validates_dimensions() {
        let base = || {
            Camera::builder()
                .direction(V3::NEG_Z, V3::POS_Y)
                .ray_tracer(empty_scene(), TracerKind::Simple)
        };
        assert!(matches!(
            base().vp_size(0.0, 3.0).vp_distance(1.0).resolution(3, 3).build(),
            Err(CameraError::NonPositiveViewport)
        ));
        assert!(matches!(
            base().vp_size(3.0, 3.0).vp_distance(-1.0).resolution(3, 3).build(),
            Err(CameraError::NonPositiveDistance)
        ));
        assert!(matches!(
            base().vp_size(3.0, 3.0).vp_distance(1.0).resolution(0, 3).build(),
            Err(CameraError::ZeroResolution)
        ));
    }

    #[test]
    fn direction_to_reorthogonalizes_up() {
        let camera = Camera::builder()
            .location(P3(0.0, 1.0, 5.0))
            .direction_to(P3(0.0, 0.0, 0.0), V3::POS_Y)
            .vp_size(2.0, 2.0)
            .vp_distance(1.0)
            .resolution(2, 2)
            .ray_tracer(empty_scene(), TracerKind::Simple)
            .build()
            .unwrap();
        assert!(align_zero(V3::dot(camera.to, camera.up)) == 0.0);
        assert!(align_zero(V3::dot(camera.to, camera.right)) == 0.0);
    }

    fn dof_scene() -> Arc<Scene> {
        let mut scene = Scene::new("dof");
        scene
            // In-focus backdrop at the focal plane
            .add_geometry(
                Plane::new(P3(0.0, 0.0, -10.0), V3::POS_Z)
                    .unwrap()
                    .with_material(Material::default().with_diffuse(0.8)),
            )
            // Out-of-focus sphere well before the focal plane
            .add_geometry(
                Sphere::new(P3(0.0, 0.0, -3.0), 0.5)
                    .unwrap()
                    .with_material(Material::default().with_diffuse(0.2)),
            )
            .add_light(DirectionalLight::new(Color(200.0, 200.0, 200.0), V3::NEG_Z).unwrap());
        Arc::new(scene)
    }

    fn dof_camera(scene: Arc<Scene>, dof: bool) -> Camera {
        let mut builder = Camera::builder()
            .direction(V3::NEG_Z, V3::POS_Y)
            .vp_size(3.0, 3.0)
            .vp_distance(1.0)
            .resolution(3, 3)
            .ray_tracer(scene, TracerKind::Simple);
        if dof {
            builder = builder.depth_of_field(10.0, 4.0, 16);
        }
        builder.build().unwrap()
    }

    #[test]
    fn dof_is_deterministic_per_pixel() {
        let camera = dof_camera(dof_scene(), true);
        for (i, j) in [(0, 0), (1, 1), (2, 2)] {
            assert_eq!(camera.pixel_color(i, j), camera.pixel_color(i, j));
        }
    }

    #[test]
    fn focal_plane_stays_sharp_and_foreground_blurs() {
        let scene = dof_scene();
        let sharp = dof_camera(scene.clone(), false);
        let blurred = dof_camera(scene, true);

        // Corner pixel: the backdrop sits exactly at the focal plane, so
        // every lens sample converges to the same point
        let a = sharp.pixel_color(0, 0);
        let b = blurred.pixel_color(0, 0);
        assert!((a.r() - b.r()).abs() < 1e-6, "{a:?} vs {b:?}");

        // Center pixel: the sphere is far off the focal plane; lens samples
        // spill around it and mix in the backdrop
        let a = sharp.pixel_color(1, 1);
        let b = blurred.pixel_color(1, 1);
        assert!((a.r() - b.r()).abs() > 1.0, "{a:?} vs {b:?}");
    }
}

use crate::util::rgb;
use crate::SceneSetup;

use glimmer_impl::camera::{Camera, CameraBuilder};
use glimmer_impl::color::Color;
use glimmer_impl::geometry::{Cylinder, GeometryError, Plane, Polygon, Sphere, Triangle, Tube};
use glimmer_impl::lights::{AmbientLight, DirectionalLight, PointLight, SpotLight};
use glimmer_impl::material::Material;
use glimmer_impl::scene::Scene;
use glimmer_impl::types::{P3, Ray, V3};
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

fn matte(color_scale: f64) -> Material {
    Material::default().with_diffuse(color_scale).with_specular(0.1).with_shininess(30)
}

//
// Sample scenes
//

/// A seeded field of 300 spheres and 200 triangles. The same seed always
/// produces the same field, which the equivalence tests rely on.
pub fn sphere_field() -> Result<SceneSetup, GeometryError> {
    let mut rng = XorShiftRng::seed_from_u64(0x5048_4552_4553);
    let mut scene = Scene::new("sphere-field");
    scene
        .set_background(rgb(16, 20, 36))
        .set_ambient(AmbientLight::new(rgb(24, 24, 28), 1.0))
        .add_light(DirectionalLight::new(rgb(180, 170, 150), V3(0.4, -1.0, -0.6))?);

    let random_point = |rng: &mut XorShiftRng| {
        P3(
            (rng.random::<f64>() - 0.5) * 60.0,
            (rng.random::<f64>() - 0.5) * 40.0,
            -20.0 - rng.random::<f64>() * 60.0,
        )
    };

    for _ in 0..300 {
        let center = random_point(&mut rng);
        let radius = 0.4 + rng.random::<f64>() * 0.8;
        let shade = 0.3 + rng.random::<f64>() * 0.6;
        scene.add_geometry(Sphere::new(center, radius)?.with_material(matte(shade)));
    }
    for _ in 0..200 {
        let a = random_point(&mut rng);
        let b = a + V3(1.0 + rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>() * 0.5);
        let c = a + V3(rng.random::<f64>() * 0.5, 1.0 + rng.random::<f64>(), rng.random::<f64>());
        let shade = 0.3 + rng.random::<f64>() * 0.6;
        scene.add_geometry(Triangle::new(a, b, c)?.with_material(matte(shade)));
    }

    let camera = Camera::builder()
        .location(P3(0.0, 0.0, 10.0))
        .direction(V3::NEG_Z, V3::POS_Y)
        .vp_size(16.0, 16.0)
        .vp_distance(10.0);

    Ok(SceneSetup { scene, camera })
}

/// A transparent blue sphere in front of a checkered pair of triangles,
/// under a single spotlight. The sphere's shadow stays partially lit.
pub fn glass_shadow() -> Result<SceneSetup, GeometryError> {
    let mut scene = Scene::new("glass-shadow");
    scene
        .set_background(Color::BLACK)
        .set_ambient(AmbientLight::new(rgb(38, 38, 38), 0.15));

    // Checker floor built from two triangles
    let (a, b, c, d) = (
        P3(-150.0, -150.0, -115.0),
        P3(150.0, -150.0, -135.0),
        P3(75.0, 75.0, -150.0),
        P3(-75.0, 75.0, -150.0),
    );
    scene
        .add_geometry(
            Triangle::new(a, b, c)?
                .with_material(Material::default().with_diffuse(0.5).with_specular(0.5).with_shininess(60)),
        )
        .add_geometry(
            Triangle::new(a, c, d)?
                .with_material(Material::default().with_diffuse(0.25).with_specular(0.25).with_shininess(60))
                .with_emission(rgb(20, 20, 20)),
        )
        .add_geometry(
            Sphere::new(P3(0.0, 0.0, -11.0), 30.0)?
                .with_emission(rgb(0, 0, 50))
                .with_material(
                    Material::default()
                        .with_diffuse(0.2)
                        .with_specular(0.2)
                        .with_shininess(30)
                        .with_transmission(0.6),
                ),
        )
        .add_light(
            SpotLight::new(rgb(178, 149, 83), P3(60.0, 50.0, 0.0), V3(0.0, 0.0, -1.0))?
                .with_attenuation(1.0, 4e-5, 2e-7),
        );

    let camera = Camera::builder()
        .location(P3(0.0, 0.0, 1000.0))
        .direction(V3::NEG_Z, V3::POS_Y)
        .vp_size(200.0, 200.0)
        .vp_distance(1000.0);

    Ok(SceneSetup { scene, camera })
}

/// Two mirror triangles facing each other with two spheres between them;
/// recursive reflections multiply the spheres down the hall.
pub fn mirrors() -> Result<SceneSetup, GeometryError> {
    let mut scene = Scene::new("mirrors");
    scene
        .set_background(rgb(4, 4, 8))
        .set_ambient(AmbientLight::new(rgb(30, 30, 30), 0.2));

    scene
        .add_geometry(
            Sphere::new(P3(-950.0, -900.0, -1000.0), 400.0)?
                .with_emission(rgb(0, 50, 100))
                .with_material(
                    Material::default()
                        .with_diffuse(0.25)
                        .with_specular(0.25)
                        .with_shininess(20)
                        .with_transmission(0.5),
                ),
        )
        .add_geometry(
            Sphere::new(P3(-950.0, -900.0, -1000.0), 200.0)?
                .with_emission(rgb(100, 50, 20))
                .with_material(Material::default().with_diffuse(0.25).with_specular(0.25).with_shininess(20)),
        )
        // Full mirror
        .add_geometry(
            Triangle::new(
                P3(1500.0, -1500.0, -1500.0),
                P3(-1500.0, 1500.0, -1500.0),
                P3(670.0, 670.0, 3000.0),
            )?
            .with_emission(rgb(20, 20, 20))
            .with_material(Material::default().with_reflection(1.0)),
        )
        // Partial mirror with a green cast
        .add_geometry(
            Triangle::new(
                P3(1500.0, -1500.0, -1500.0),
                P3(-1500.0, 1500.0, -1500.0),
                P3(-1500.0, -1500.0, -2000.0),
            )?
            .with_emission(rgb(20, 20, 20))
            .with_material(Material::default().with_reflection(Color(0.0, 0.8, 0.0))),
        )
        .add_light(
            SpotLight::new(rgb(255, 153, 102), P3(-750.0, -750.0, -150.0), V3(-1.0, -1.0, -4.0))?
                .with_attenuation(1.0, 1e-5, 5e-8),
        );

    let camera = Camera::builder()
        .location(P3(0.0, 0.0, 10000.0))
        .direction(V3::NEG_Z, V3::POS_Y)
        .vp_size(2500.0, 2500.0)
        .vp_distance(10000.0);

    Ok(SceneSetup { scene, camera })
}

/// A diagonal run of spheres with the lens focused on the middle one.
pub fn depth_of_field() -> Result<SceneSetup, GeometryError> {
    let mut scene = Scene::new("dof");
    scene
        .set_background(rgb(10, 12, 18))
        .set_ambient(AmbientLight::new(rgb(26, 26, 30), 1.0))
        .add_light(DirectionalLight::new(rgb(190, 180, 160), V3(-0.3, -1.0, -0.5))?)
        .add_light(
            PointLight::new(rgb(120, 120, 160), P3(0.0, 300.0, -600.0))
                .with_attenuation(1.0, 2e-4, 1e-7),
        );

    for step in 0..7 {
        let offset = step as f64 * 220.0;
        scene.add_geometry(
            Sphere::new(P3(-450.0 + offset, 0.0, -540.0 - offset), 90.0)?
                .with_material(matte(0.3 + 0.08 * step as f64)),
        );
    }
    scene.add_geometry(
        Plane::new(P3(0.0, -120.0, 0.0), V3::POS_Y)?
            .with_material(Material::default().with_diffuse(0.5)),
    );

    // Focus on the middle sphere at z = -1200 from the camera
    let camera = Camera::builder()
        .location(P3(0.0, 40.0, 0.0))
        .direction(V3::NEG_Z, V3::POS_Y)
        .vp_size(450.0, 450.0)
        .vp_distance(300.0)
        .depth_of_field(1200.0, 20.0, 16);

    Ok(SceneSetup { scene, camera })
}

/// Exercises every primitive type in one frame.
pub fn primitives() -> Result<SceneSetup, GeometryError> {
    let mut scene = Scene::new("primitives");
    scene
        .set_background(rgb(14, 16, 24))
        .set_ambient(AmbientLight::new(rgb(30, 30, 34), 1.0))
        .add_light(DirectionalLight::new(rgb(170, 160, 140), V3(0.5, -1.0, -0.7))?)
        .add_light(
            PointLight::new(rgb(90, 110, 150), P3(-8.0, 10.0, -6.0)).with_attenuation(1.0, 0.02, 0.001),
        );

    scene
        .add_geometry(
            Plane::new(P3(0.0, -3.0, 0.0), V3::POS_Y)?
                .with_material(Material::default().with_diffuse(0.55)),
        )
        .add_geometry(
            Sphere::new(P3(-4.0, -1.0, -14.0), 2.0)?
                .with_material(matte(0.6).with_reflection(0.2)),
        )
        .add_geometry(
            Cylinder::new(Ray::new(P3(2.0, -3.0, -16.0), V3::POS_Y), 1.5, 5.0)?
                .with_material(matte(0.5)),
        )
        .add_geometry(
            Tube::new(Ray::new(P3(9.0, 0.0, -24.0), V3(0.2, 1.0, 0.0)), 0.8)?
                .with_material(matte(0.4)),
        )
        .add_geometry(
            Polygon::new(vec![
                P3(-9.0, -3.0, -20.0),
                P3(-5.0, -3.0, -22.0),
                P3(-5.0, 3.0, -22.0),
                P3(-7.0, 5.0, -21.0),
                P3(-9.0, 3.0, -20.0),
            ])?
            .with_material(matte(0.7)),
        );

    let camera = Camera::builder()
        .location(P3(0.0, 1.0, 0.0))
        .direction(V3::NEG_Z, V3::POS_Y)
        .vp_size(8.0, 8.0)
        .vp_distance(4.0);

    Ok(SceneSetup { scene, camera })
}

/// Finishes a sample's camera builder with the parts the caller chooses:
/// resolution, threading and the scene to trace.
pub fn finish_camera(
    camera: CameraBuilder,
    scene: Scene,
    resolution: (usize, usize),
    threads: usize,
) -> Camera {
    use glimmer_impl::tracer::TracerKind;
    use std::sync::Arc;

    camera
        .resolution(resolution.0, resolution.1)
        .multithreading(threads)
        .ray_tracer(Arc::new(scene), TracerKind::Simple)
        .build()
        .expect("sample scene camera must build")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_scenes;
    use glimmer_impl::render::ImageBuffer;

    #[test]
    fn every_sample_builds() {
        for sample in sample_scenes() {
            let setup = (sample.build)().expect(sample.name);
            let camera = finish_camera(setup.camera, setup.scene, (16, 16), 0);
            let buffer = ImageBuffer::new(16, 16);
            let stats = camera.render_image(&buffer);
            assert_eq!(stats.tiles_completed, stats.tiles_total, "{}", sample.name);
        }
    }

    // The acceleration structure must not change a single pixel: render
    // the seeded 500-primitive field with and without the BVH and compare
    // the images byte for byte.
    #[test]
    fn bvh_render_is_bit_identical_to_flat() {
        let flat = {
            let setup = sphere_field().unwrap();
            let camera = finish_camera(setup.camera, setup.scene, (100, 100), 0);
            let buffer = ImageBuffer::new(100, 100);
            camera.render_image(&buffer);
            buffer.to_rgb8()
        };

        let accelerated = {
            let setup = sphere_field().unwrap();
            let mut scene = setup.scene;
            scene.build_bvh();
            assert!(scene.bvh_stats().is_some());
            let camera = finish_camera(setup.camera, scene, (100, 100), 0);
            let buffer = ImageBuffer::new(100, 100);
            camera.render_image(&buffer);
            buffer.to_rgb8()
        };

        assert_eq!(flat, accelerated);
    }
}

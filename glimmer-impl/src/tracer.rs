use std::sync::Arc;

use crate::color::Color;
use crate::geometry::{Intersectable, Intersection};
use crate::lights::Illumination;
use crate::math::align_zero;
use crate::scene::Scene;
use crate::types::{P3, Ray, V3};

/// Secondary and shadow contributions are dropped once the accumulated
/// attenuation falls below this on every channel.
pub const K_MIN: f64 = 0.001;

pub const DEFAULT_MAX_RECURSION: u32 = 10;

// Offset applied along the normal when spawning shadow, reflection and
// transmission rays, so they cannot re-hit the surface they left.
const DELTA: f64 = 1e-4;

/// Tracer flavors the camera builder can ask for. Only the Whitted-style
/// recursive tracer exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerKind {
    Simple,
}

//
// The recursive ray tracer
//

/// Whitted-style recursive shader: Phong local illumination, transparency
/// aware shadow feelers, mirror reflection and straight-line transmission.
/// Pure and re-entrant; render workers share one instance.
pub struct RayTracer {
    scene: Arc<Scene>,
    max_depth: u32,
}

impl RayTracer {
    pub fn new(scene: Arc<Scene>, kind: TracerKind) -> RayTracer {
        match kind {
            TracerKind::Simple => RayTracer {
                scene,
                max_depth: DEFAULT_MAX_RECURSION,
            },
        }
    }

    pub fn with_max_recursion(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// Resolves a primary ray to a color: the shaded closest hit, or the
    /// scene background on a miss.
    pub fn trace(&self, ray: &Ray) -> Color {
        match self.scene.closest_intersection(ray, f64::INFINITY) {
            None => self.scene.background(),
            Some(hit) => {
                // The ambient term applies once per primary ray
                let ambient = self.scene.ambient().intensity() * hit.geometry.material().ka;
                ambient + self.shade(&hit, ray, self.max_depth, Color::ONE)
            }
        }
    }

    /// Emission + direct lighting + recursive reflection/transmission for
    /// one hit. `attenuation` is the product of every kr/kt factor on the
    /// path from the camera; recursion stops when it becomes negligible.
    fn shade(&self, hit: &Intersection<'_>, ray: &Ray, depth: u32, attenuation: Color) -> Color {
        let material = hit.geometry.material();
        let v = ray.direction();
        let normal = hit.geometry.normal_at(hit.point);
        let nv = align_zero(V3::dot(normal, v));

        let mut color = hit.geometry.emission();
        if nv != 0.0 {
            color = color + self.direct_lighting(hit, v, normal, nv);
        }

        if depth == 0 {
            return color;
        }

        // Mirror reflection of the view direction
        let kr = material.kr;
        let reflected_attenuation = attenuation * kr;
        if nv != 0.0 && reflected_attenuation.max_channel() > K_MIN {
            let direction = v - normal * (2.0 * nv);
            let reflected = offset_ray(hit.point, direction, normal);
            color = color + self.secondary(&reflected, depth - 1, reflected_attenuation) * kr;
        }

        // Transmission continues straight through (no IOR bending)
        let kt = material.kt;
        let transmitted_attenuation = attenuation * kt;
        if transmitted_attenuation.max_channel() > K_MIN {
            let transmitted = offset_ray(hit.point, v, normal);
            color = color + self.secondary(&transmitted, depth - 1, transmitted_attenuation) * kt;
        }

        color
    }

    fn secondary(&self, ray: &Ray, depth: u32, attenuation: Color) -> Color {
        match self.scene.closest_intersection(ray, f64::INFINITY) {
            None => self.scene.background(),
            Some(hit) => self.shade(&hit, ray, depth, attenuation),
        }
    }

    /// Phong diffuse and specular sums over the scene lights, each scaled
    /// by the transparency accumulated along its shadow feeler.
    fn direct_lighting(&self, hit: &Intersection<'_>, v: V3, normal: V3, nv: f64) -> Color {
        let material = hit.geometry.material();
        let mut total = Color::BLACK;

        for light in self.scene.lights() {
            let Some(illumination) = light.illumination_at(hit.point) else {
                continue;
            };
            let l = illumination.direction;
            let nl = align_zero(V3::dot(normal, l));
            // The light must sit on the same side of the surface as the viewer
            if nl * nv <= 0.0 {
                continue;
            }

            let ktr = self.transparency(hit.point, normal, &illumination);
            if ktr.max_channel() < K_MIN {
                continue;
            }

            let intensity = illumination.intensity * ktr;
            let diffuse = material.kd * nl.abs();
            let reflected = l - normal * (2.0 * nl);
            let specular_base = align_zero(-V3::dot(v, reflected)).max(0.0);
            let specular = if specular_base > 0.0 {
                material.ks * specular_base.powi(material.shininess)
            } else {
                Color::BLACK
            };
            total = total + (diffuse + specular) * intensity;
        }

        total
    }

    /// Walks every blocker between the point and the light, multiplying
    /// their transmission factors. An opaque blocker short-circuits to
    /// black.
    fn transparency(&self, point: P3, normal: V3, illumination: &Illumination) -> Color {
        let feeler = offset_ray(point, -illumination.direction, normal);
        let mut hits = Vec::new();
        self.scene.intersect(&feeler, illumination.distance, &mut hits);

        let mut ktr = Color::ONE;
        for blocker in &hits {
            ktr = ktr * blocker.geometry.material().kt;
            if ktr.max_channel() < K_MIN {
                return Color::BLACK;
            }
        }
        ktr
    }
}

/// Spawns a ray from `point`, with the origin nudged along the normal into
/// the halfspace the direction leaves through.
fn offset_ray(point: P3, direction: V3, normal: V3) -> Ray {
    let side = align_zero(V3::dot(normal, direction));
    let origin = if side >= 0.0 {
        point + normal * DELTA
    } else {
        point - normal * DELTA
    };
    Ray::new(origin, direction)
}

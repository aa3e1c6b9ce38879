use crate::color::Color;
use crate::geometry::GeometryError;
use crate::math::{align_zero, is_zero};
use crate::types::{P3, V3};

//
// Light sources
//

/// The ambient term. Applied once per shaded hit, unconditionally: ambient
/// light casts no shadow feeler.
#[derive(Clone, Debug)]
pub struct AmbientLight {
    color: Color,
    k: Color,
}

impl AmbientLight {
    pub fn new(color: Color, k: impl Into<Color>) -> AmbientLight {
        AmbientLight { color, k: k.into() }
    }

    pub fn intensity(&self) -> Color {
        self.color * self.k
    }
}

impl Default for AmbientLight {
    fn default() -> AmbientLight {
        AmbientLight::new(Color::BLACK, Color::ONE)
    }
}

/// What a light delivers at a particular point: the unit direction from the
/// source towards the point, the distance back to the source (the shadow
/// feeler's range) and the attenuated intensity.
pub struct Illumination {
    pub direction: V3,
    pub distance: f64,
    pub intensity: Color,
}

#[derive(Clone, Debug)]
pub struct DirectionalLight {
    color: Color,
    direction: V3,
}

impl DirectionalLight {
    pub fn new(color: Color, direction: V3) -> Result<DirectionalLight, GeometryError> {
        let direction = direction.try_unit().ok_or(GeometryError::ZeroVector)?;
        Ok(DirectionalLight { color, direction })
    }
}

#[derive(Clone, Debug)]
pub struct PointLight {
    color: Color,
    position: P3,
    kc: f64,
    kl: f64,
    kq: f64,
}

impl PointLight {
    pub fn new(color: Color, position: P3) -> PointLight {
        PointLight {
            color,
            position,
            kc: 1.0,
            kl: 0.0,
            kq: 0.0,
        }
    }

    /// Distance falloff `1 / (kc + kl*d + kq*d^2)`.
    pub fn with_attenuation(mut self, kc: f64, kl: f64, kq: f64) -> Self {
        self.kc = kc;
        self.kl = kl;
        self.kq = kq;
        self
    }

    fn illumination_at(&self, point: P3) -> Option<Illumination> {
        let to_point = point - self.position;
        let distance = to_point.length();
        if is_zero(distance) {
            // The shaded point coincides with the source
            return None;
        }
        let denominator = align_zero(self.kc + self.kl * distance + self.kq * distance * distance);
        if denominator == 0.0 {
            return None;
        }
        Some(Illumination {
            direction: to_point / distance,
            distance,
            intensity: self.color / denominator,
        })
    }
}

#[derive(Clone, Debug)]
pub struct SpotLight {
    point: PointLight,
    axis: V3,
    beam: f64,
}

impl SpotLight {
    pub fn new(color: Color, position: P3, axis: V3) -> Result<SpotLight, GeometryError> {
        let axis = axis.try_unit().ok_or(GeometryError::ZeroVector)?;
        Ok(SpotLight {
            point: PointLight::new(color, position),
            axis,
            beam: 1.0,
        })
    }

    pub fn with_attenuation(mut self, kc: f64, kl: f64, kq: f64) -> Self {
        self.point = self.point.with_attenuation(kc, kl, kq);
        self
    }

    /// Narrow-beam exponent; values above 1 tighten the cone.
    pub fn with_beam(mut self, beam: f64) -> Self {
        assert!(beam >= 1.0, "beam exponent must be at least 1.0");
        self.beam = beam;
        self
    }
}

pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    /// The direction, range and intensity this light delivers at `point`,
    /// or `None` where it cannot contribute (behind a spot cone, degenerate
    /// placement).
    pub fn illumination_at(&self, point: P3) -> Option<Illumination> {
        match self {
            Light::Directional(light) => Some(Illumination {
                direction: light.direction,
                distance: f64::INFINITY,
                intensity: light.color,
            }),
            Light::Point(light) => light.illumination_at(point),
            Light::Spot(light) => {
                let base = light.point.illumination_at(point)?;
                let alignment = align_zero(V3::dot(light.axis, base.direction));
                if alignment <= 0.0 {
                    return None;
                }
                let factor = if light.beam == 1.0 { alignment } else { alignment.powf(light.beam) };
                Some(Illumination {
                    intensity: base.intensity * factor,
                    ..base
                })
            }
        }
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Light {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Light {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Light {
        Light::Spot(light)
    }
}

use crate::color::Color;

macro_rules! assert_in_range {
    ($v:ident) => {
        if $v.r() < 0.0 || $v.r() > 1.0 || $v.g() < 0.0 || $v.g() > 1.0 || $v.b() < 0.0 || $v.b() > 1.0 {
            panic!("{} channels must be within the range of 0.0 to 1.0", stringify!($v));
        }
    };
}

//
// Material
//

/// Phong material coefficients. Every coefficient is a per-channel triple;
/// the setters accept either a `Color` or a bare scalar, which broadcasts.
#[derive(Clone, Debug)]
pub struct Material {
    pub kd: Color,
    pub ks: Color,
    pub ka: Color,
    pub kt: Color,
    pub kr: Color,
    pub shininess: i32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            kd: Color::BLACK,
            ks: Color::BLACK,
            ka: Color::ONE,
            kt: Color::BLACK,
            kr: Color::BLACK,
            shininess: 0,
        }
    }
}

impl Material {
    pub fn with_diffuse(mut self, kd: impl Into<Color>) -> Self {
        let kd = kd.into();
        assert_in_range!(kd);
        self.kd = kd;
        self
    }

    pub fn with_specular(mut self, ks: impl Into<Color>) -> Self {
        let ks = ks.into();
        assert_in_range!(ks);
        self.ks = ks;
        self
    }

    pub fn with_ambient(mut self, ka: impl Into<Color>) -> Self {
        let ka = ka.into();
        assert_in_range!(ka);
        self.ka = ka;
        self
    }

    /// Transmission factor: how much light passes straight through.
    pub fn with_transmission(mut self, kt: impl Into<Color>) -> Self {
        let kt = kt.into();
        assert_in_range!(kt);
        self.kt = kt;
        self
    }

    /// Mirror reflection factor.
    pub fn with_reflection(mut self, kr: impl Into<Color>) -> Self {
        let kr = kr.into();
        assert_in_range!(kr);
        self.kr = kr;
        self
    }

    pub fn with_shininess(mut self, shininess: i32) -> Self {
        self.shininess = shininess;
        self
    }
}

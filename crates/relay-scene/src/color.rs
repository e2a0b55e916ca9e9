use palette::{FromColor, LinSrgba, Srgba};

/// Linear-space RGBA color. Scene quads are opaque and unblended, so the
/// vertex colors are straight (not premultiplied).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorLin {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorLin {
    /// Create from sRGB u8 components (CSS-like rgb), converted to linear.
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8) -> Self {
        let s = Srgba::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0);
        let lin: LinSrgba = LinSrgba::from_color(s);
        Self {
            r: lin.red,
            g: lin.green,
            b: lin.blue,
            a: lin.alpha,
        }
    }

    /// Create directly from linear RGBA floats.
    #[inline]
    pub const fn from_lin_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// CSS color names used by the stacked-quad fixture.
pub fn deep_pink() -> ColorLin {
    ColorLin::from_srgb_u8(255, 20, 147)
}

pub fn medium_violet_red() -> ColorLin {
    ColorLin::from_srgb_u8(199, 21, 133)
}

pub fn pale_violet_red() -> ColorLin {
    ColorLin::from_srgb_u8(219, 112, 147)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_pink_is_saturated_red() {
        let c = deep_pink();
        assert!(c.r > 0.95);
        assert!(c.g < 0.02);
        assert!(c.b > 0.2 && c.b < 0.4);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn linear_conversion_is_monotone() {
        let a = ColorLin::from_srgb_u8(112, 0, 0);
        let b = ColorLin::from_srgb_u8(219, 0, 0);
        assert!(a.r < b.r);
        // Linear values sit below their sRGB-normalized counterparts.
        assert!(a.r < 112.0 / 255.0);
        assert!(b.r < 219.0 / 255.0);
    }
}

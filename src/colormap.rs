use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Colormaps for band image display
// ---------------------------------------------------------------------------
//
// Matplotlib-style continuous maps, each defined by a handful of anchor
// colors sampled from the originals and blended in linear light.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Gray,
    Viridis,
    Plasma,
    Inferno,
    Magma,
}

/// Anchor colors at t = 0, 0.25, 0.5, 0.75, 1.
type Anchors = [(f32, f32, f32); 5];

const VIRIDIS: Anchors = [
    (0.267, 0.005, 0.329),
    (0.283, 0.141, 0.458),
    (0.127, 0.567, 0.551),
    (0.454, 0.820, 0.322),
    (0.993, 0.906, 0.144),
];

const PLASMA: Anchors = [
    (0.050, 0.030, 0.528),
    (0.494, 0.012, 0.658),
    (0.798, 0.280, 0.470),
    (0.973, 0.585, 0.254),
    (0.940, 0.975, 0.131),
];

const INFERNO: Anchors = [
    (0.001, 0.000, 0.014),
    (0.341, 0.062, 0.429),
    (0.735, 0.215, 0.330),
    (0.978, 0.557, 0.034),
    (0.988, 1.000, 0.645),
];

const MAGMA: Anchors = [
    (0.001, 0.000, 0.014),
    (0.316, 0.071, 0.485),
    (0.716, 0.215, 0.475),
    (0.987, 0.535, 0.382),
    (0.987, 0.991, 0.750),
];

impl Colormap {
    pub const ALL: [Colormap; 5] = [
        Colormap::Gray,
        Colormap::Viridis,
        Colormap::Plasma,
        Colormap::Inferno,
        Colormap::Magma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Gray => "gray",
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Inferno => "inferno",
            Colormap::Magma => "magma",
        }
    }

    /// Map a normalized value in [0, 1] to a display color. Out-of-range
    /// input is clamped; the caller handles NaN before getting here.
    pub fn sample(self, t: f64) -> Color32 {
        let t = t.clamp(0.0, 1.0) as f32;
        match self {
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                Color32::from_rgb(v, v, v)
            }
            Colormap::Viridis => sample_anchors(&VIRIDIS, t),
            Colormap::Plasma => sample_anchors(&PLASMA, t),
            Colormap::Inferno => sample_anchors(&INFERNO, t),
            Colormap::Magma => sample_anchors(&MAGMA, t),
        }
    }
}

/// Piecewise-linear interpolation between evenly spaced anchors, mixing in
/// linear-light sRGB.
fn sample_anchors(anchors: &Anchors, t: f32) -> Color32 {
    let segments = (anchors.len() - 1) as f32;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - idx as f32;

    let (r0, g0, b0) = anchors[idx];
    let (r1, g1, b1) = anchors[idx + 1];
    let a: LinSrgb = Srgb::new(r0, g0, b0).into_linear();
    let b: LinSrgb = Srgb::new(r1, g1, b1).into_linear();
    let mixed: Srgb<u8> = Srgb::from_linear(a.mix(b, frac));
    Color32::from_rgb(mixed.red, mixed.green, mixed.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_endpoints() {
        assert_eq!(Colormap::Gray.sample(0.0), Color32::from_rgb(0, 0, 0));
        assert_eq!(Colormap::Gray.sample(1.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(Colormap::Gray.sample(0.5), Color32::from_rgb(128, 128, 128));
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Colormap::Gray.sample(-4.0), Colormap::Gray.sample(0.0));
        assert_eq!(Colormap::Viridis.sample(7.0), Colormap::Viridis.sample(1.0));
    }

    #[test]
    fn viridis_endpoints_match_anchor_colors() {
        let lo = Colormap::Viridis.sample(0.0);
        let hi = Colormap::Viridis.sample(1.0);
        // Dark purple to bright yellow.
        assert!(lo.b() > lo.r() && lo.b() > lo.g());
        assert!(hi.r() > 240 && hi.g() > 220 && hi.b() < 60);
    }
}

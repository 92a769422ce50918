use super::{Error, Result};
use plotters::style::RGBAColor;
use std::{fmt, str::FromStr};

// Number of entries of the colormap lookup table
const LUT_SIZE: usize = 256;

/// Linear interpolation of `x` from `xp` to `fp`, clamped to the end values
///
/// A degenerate `xp` interval maps everything at or above it to `fp.1`.
pub(crate) fn interp(x: f64, xp: (f64, f64), fp: (f64, f64)) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x >= xp.1 {
        fp.1
    } else if x < xp.0 {
        fp.0
    } else {
        fp.0 + (x - xp.0) * (fp.1 - fp.0) / (xp.1 - xp.0)
    }
}

/// RGBA color with components in [0,1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}
impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.,
        g: 0.,
        b: 0.,
        a: 0.,
    };
    pub fn opaque([r, g, b]: [f64; 3]) -> Self {
        Self { r, g, b, a: 1. }
    }
    pub fn to_rgba_color(&self) -> RGBAColor {
        let byte = |c: f64| (c.clamp(0., 1.) * 255.).round() as u8;
        RGBAColor(byte(self.r), byte(self.g), byte(self.b), self.a)
    }
}

type Segments = [&'static [(f64, f64)]; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Palette {
    Gray,
    Hot,
    Cool,
    Copper,
    Spring,
    Summer,
    Autumn,
    Winter,
}
impl Palette {
    const ALL: [(Palette, &'static str); 8] = [
        (Palette::Gray, "gray"),
        (Palette::Hot, "hot"),
        (Palette::Cool, "cool"),
        (Palette::Copper, "copper"),
        (Palette::Spring, "spring"),
        (Palette::Summer, "summer"),
        (Palette::Autumn, "autumn"),
        (Palette::Winter, "winter"),
    ];
    fn name(&self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(palette, _)| palette == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }
    /// Piecewise linear (x, value) anchors of the red, green and blue channels
    fn segments(&self) -> Segments {
        match self {
            Palette::Gray => [&[(0., 0.), (1., 1.)], &[(0., 0.), (1., 1.)], &[(0., 0.), (1., 1.)]],
            Palette::Hot => [
                &[(0., 0.0416), (0.365079, 1.), (1., 1.)],
                &[(0., 0.), (0.365079, 0.), (0.746032, 1.), (1., 1.)],
                &[(0., 0.), (0.746032, 0.), (1., 1.)],
            ],
            Palette::Cool => [&[(0., 0.), (1., 1.)], &[(0., 1.), (1., 0.)], &[(0., 1.), (1., 1.)]],
            Palette::Copper => [
                &[(0., 0.), (0.809524, 1.), (1., 1.)],
                &[(0., 0.), (1., 0.7812)],
                &[(0., 0.), (1., 0.4975)],
            ],
            Palette::Spring => [&[(0., 1.), (1., 1.)], &[(0., 0.), (1., 1.)], &[(0., 1.), (1., 0.)]],
            Palette::Summer => [&[(0., 0.), (1., 1.)], &[(0., 0.5), (1., 1.)], &[(0., 0.4), (1., 0.4)]],
            Palette::Autumn => [&[(0., 1.), (1., 1.)], &[(0., 0.), (1., 1.)], &[(0., 0.), (1., 0.)]],
            Palette::Winter => [&[(0., 0.), (1., 0.)], &[(0., 0.), (1., 1.)], &[(0., 1.), (1., 0.5)]],
        }
    }
}

fn channel(anchors: &[(f64, f64)], x: f64) -> f64 {
    anchors
        .windows(2)
        .find(|w| x <= w[1].0)
        .map(|w| interp(x, (w[0].0, w[1].0), (w[0].1, w[1].1)))
        .or_else(|| anchors.last().map(|a| a.1))
        .unwrap_or_default()
}

/// Named colormap sampled on [0,1]
///
/// Names follow the usual plotting conventions, a `_r` suffix reverses the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    palette: Palette,
    reversed: bool,
    lut: Vec<Rgba>,
}
impl Default for Colormap {
    fn default() -> Self {
        Self::new(Palette::Hot, false)
    }
}
impl Colormap {
    fn new(palette: Palette, reversed: bool) -> Self {
        let segments = palette.segments();
        let lut = (0..LUT_SIZE)
            .map(|i| {
                let x = i as f64 / (LUT_SIZE - 1) as f64;
                let x = if reversed { 1. - x } else { x };
                Rgba::opaque(segments.map(|anchors| channel(anchors, x)))
            })
            .collect();
        Self {
            palette,
            reversed,
            lut,
        }
    }
    pub fn hot() -> Self {
        Self::default()
    }
    /// Names of the available colormaps (without reversal suffix)
    pub fn names() -> impl Iterator<Item = &'static str> {
        Palette::ALL.iter().map(|(_, name)| *name)
    }
    /// Samples the colormap at `x`
    ///
    /// `x` is clamped to [0,1], NaN gives a transparent color.
    pub fn sample(&self, x: f64) -> Rgba {
        if x.is_nan() {
            return Rgba::TRANSPARENT;
        }
        let k = (x.max(0.) * LUT_SIZE as f64) as usize;
        self.lut[k.min(LUT_SIZE - 1)]
    }
}
impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, reversed) = match s.strip_suffix("_r") {
            Some(name) => (name, true),
            None => (s, false),
        };
        let name = if name == "grey" { "gray" } else { name };
        Palette::ALL
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(palette, _)| Colormap::new(*palette, reversed))
            .ok_or_else(|| Error::UnknownColormap(s.to_string()))
    }
}
impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.palette.name(),
            if self.reversed { "_r" } else { "" }
        )
    }
}

/// Maps radii to colors by rescaling [`min`,`max`] to [0,1]
#[derive(Debug, Clone)]
pub struct ColorScaler {
    domain: (f64, f64),
    colormap: Colormap,
}
impl ColorScaler {
    pub fn new(min: f64, max: f64, colormap: Colormap) -> Self {
        Self {
            domain: (min, max),
            colormap,
        }
    }
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
    pub fn color(&self, r: f64) -> Rgba {
        self.colormap.sample(interp(r, self.domain, (0., 1.)))
    }
}

/// Returns a function mapping a radius in [`r_min`,`r_max`] to a color of `colormap`
pub fn make_scaler(r_min: f64, r_max: f64, colormap: Colormap) -> impl Fn(f64) -> Rgba {
    let scaler = ColorScaler::new(r_min, r_max, colormap);
    move |r| scaler.color(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance(c: Rgba) -> f64 {
        c.r + c.g + c.b
    }

    #[test]
    fn endpoints() {
        let cmap = Colormap::hot();
        let scaler = make_scaler(1.22, 2.22, cmap.clone());
        assert_eq!(scaler(1.22), cmap.sample(0.));
        assert_eq!(scaler(2.22), cmap.sample(1.));
        assert_eq!(scaler(2.22), Rgba::opaque([1., 1., 1.]));
        assert_eq!(scaler(1.22), Rgba::opaque([0.0416, 0., 0.]));
    }

    #[test]
    fn clamped_outside_domain() {
        let scaler = make_scaler(0., 10., Colormap::hot());
        assert_eq!(scaler(-5.), scaler(0.));
        assert_eq!(scaler(50.), scaler(10.));
    }

    #[test]
    fn monotonic() {
        for name in Colormap::names() {
            if matches!(name, "cool" | "spring" | "winter") {
                continue;
            }
            let scaler = make_scaler(3480., 6370., name.parse().unwrap());
            let mut previous = f64::NEG_INFINITY;
            for k in 0..=100 {
                let l = luminance(scaler(3480. + k as f64 * 28.9));
                assert!(l >= previous, "{name} not monotonic");
                previous = l;
            }
        }
    }

    #[test]
    fn degenerate_domain() {
        let scaler = make_scaler(2., 2., Colormap::hot());
        assert_eq!(scaler(1.), Colormap::hot().sample(0.));
        assert_eq!(scaler(2.), Colormap::hot().sample(1.));
        assert_eq!(scaler(3.), Colormap::hot().sample(1.));
    }

    #[test]
    fn nan_is_transparent() {
        let scaler = make_scaler(0., 1., Colormap::hot());
        assert_eq!(scaler(f64::NAN), Rgba::TRANSPARENT);
    }

    #[test]
    fn names() {
        let cmap: Colormap = "copper_r".parse().unwrap();
        assert_eq!(cmap.to_string(), "copper_r");
        assert_eq!(cmap.sample(0.), "copper".parse::<Colormap>().unwrap().sample(1.));
        assert_eq!("grey".parse::<Colormap>().unwrap().to_string(), "gray");
        assert!(matches!(
            "jet".parse::<Colormap>(),
            Err(Error::UnknownColormap(name)) if name == "jet"
        ));
    }

    #[test]
    fn plotters_color() {
        let RGBAColor(r, g, b, a) = Rgba::opaque([1., 0.5, 0.]).to_rgba_color();
        assert_eq!((r, g, b, a), (255, 128, 0, 1.));
    }
}

//! Drawing primitives the simulation renders through.
//!
//! The sky never reads pixels back; it only issues fills, circles and
//! strokes against a [`Surface`]. [`Canvas`] is the terminal implementation.

use glam::Vec2;

pub mod canvas;

pub use canvas::Canvas;

pub type Rgb = (u8, u8, u8);

pub const WHITE: Rgb = (255, 255, 255);
pub const BLACK: Rgb = (0, 0, 0);

/// One stop of a gradient. `offset` runs from 0 at the gradient start to 1
/// at its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgb,
    pub alpha: f32,
}

impl ColorStop {
    pub const fn new(offset: f32, color: Rgb, alpha: f32) -> Self {
        Self { offset, color, alpha }
    }

    pub const fn opaque(offset: f32, color: Rgb) -> Self {
        Self::new(offset, color, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Paint<'a> {
    Solid(Rgb),
    /// Varies along the line `from -> to`, constant across it.
    Linear {
        from: Vec2,
        to: Vec2,
        stops: &'a [ColorStop],
    },
    /// Varies with distance from `center`, reaching the last stop at `radius`.
    Radial {
        center: Vec2,
        radius: f32,
        stops: &'a [ColorStop],
    },
}

/// Shadow blur drawn beneath a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgb,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Global opacity the shape is composited at.
    pub alpha: f32,
    pub glow: Option<Glow>,
}

impl Style {
    pub fn alpha(alpha: f32) -> Self {
        Self { alpha, glow: None }
    }

    pub fn with_glow(self, color: Rgb, radius: f32) -> Self {
        Self {
            glow: Some(Glow { color, radius }),
            ..self
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::alpha(1.0)
    }
}

pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Wipe everything to transparent black.
    fn clear(&mut self);
    /// Composite `paint` over the whole surface.
    fn fill(&mut self, paint: &Paint);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint, style: &Style);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint, style: &Style);
}

impl Paint<'_> {
    /// Color and opacity of this paint at `p`.
    pub fn sample(&self, p: Vec2) -> ((f32, f32, f32), f32) {
        match *self {
            Paint::Solid(color) => (to_linear(color), 1.0),
            Paint::Linear { from, to, stops } => {
                let axis = to - from;
                let len_sq = axis.length_squared();
                let t = if len_sq > 0.0 {
                    (p - from).dot(axis) / len_sq
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
            Paint::Radial { center, radius, stops } => {
                let t = if radius > 0.0 {
                    p.distance(center) / radius
                } else {
                    1.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn to_linear(c: Rgb) -> (f32, f32, f32) {
    (c.0 as f32 / 255.0, c.1 as f32 / 255.0, c.2 as f32 / 255.0)
}

/// Interpolate a stop list at `t`, clamped to its ends.
pub fn sample_stops(stops: &[ColorStop], t: f32) -> ((f32, f32, f32), f32) {
    let Some(first) = stops.first() else {
        return ((0.0, 0.0, 0.0), 0.0);
    };
    if t <= first.offset {
        return (to_linear(first.color), first.alpha);
    }

    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            let (ca, cb) = (to_linear(a.color), to_linear(b.color));
            return (
                (
                    ca.0 + (cb.0 - ca.0) * k,
                    ca.1 + (cb.1 - ca.1) * k,
                    ca.2 + (cb.2 - ca.2) * k,
                ),
                a.alpha + (b.alpha - a.alpha) * k,
            );
        }
    }

    let last = stops[stops.len() - 1];
    (to_linear(last.color), last.alpha)
}


#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: [ColorStop; 3] = [
        ColorStop::opaque(0.0, WHITE),
        ColorStop::opaque(0.5, (255, 187, 0)),
        ColorStop::new(1.0, WHITE, 0.0),
    ];

    #[test]
    fn stops_clamp_and_interpolate() {
        let (c, a) = sample_stops(&STOPS, -1.0);
        assert_eq!((c, a), ((1.0, 1.0, 1.0), 1.0));

        let (c, a) = sample_stops(&STOPS, 0.25);
        assert!((c.1 - (1.0 + 187.0 / 255.0) / 2.0).abs() < 1e-5);
        assert_eq!(a, 1.0);

        let (_, a) = sample_stops(&STOPS, 0.75);
        assert!((a - 0.5).abs() < 1e-5);

        let (_, a) = sample_stops(&STOPS, 2.0);
        assert_eq!(a, 0.0);
    }

    #[test]
    fn radial_paint_fades_with_distance() {
        let paint = Paint::Radial {
            center: Vec2::ZERO,
            radius: 10.0,
            stops: &STOPS,
        };
        assert_eq!(paint.sample(Vec2::ZERO).1, 1.0);
        assert_eq!(paint.sample(Vec2::new(10.0, 0.0)).1, 0.0);
    }

    #[test]
    fn linear_paint_projects_onto_axis() {
        let stops = [ColorStop::opaque(0.0, BLACK), ColorStop::opaque(1.0, WHITE)];
        let paint = Paint::Linear {
            from: Vec2::new(0.0, 100.0),
            to: Vec2::ZERO,
            stops: &stops,
        };
        // Horizontal position does not matter for a vertical gradient.
        let (top, _) = paint.sample(Vec2::new(37.0, 0.0));
        let (mid, _) = paint.sample(Vec2::new(5.0, 50.0));
        assert_eq!(top, (1.0, 1.0, 1.0));
        assert!((mid.0 - 0.5).abs() < 1e-5);
    }
}

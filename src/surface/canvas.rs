use super::{Paint, Rgb, Style, Surface, to_linear};
use glam::Vec2;
use std::io::{self, Write};
use std::ops::Range;

// Peak opacity of a glow halo relative to the shape's own alpha
const GLOW_STRENGTH: f32 = 0.6;

/// Software rasteriser drawing into a half-block terminal frame.
///
/// Each terminal cell holds two vertically stacked pixels, and each pixel
/// spans `scale` surface units, so a 200x50 terminal at scale 4 is an
/// 800x400 surface.
pub struct Canvas {
    cols: usize,
    rows: usize,
    scale: f32,
    pixels: Vec<(f32, f32, f32)>,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(cols: usize, term_rows: usize, scale: f32) -> Self {
        let rows = term_rows * 2;
        Self {
            cols,
            rows,
            scale,
            pixels: vec![(0.0, 0.0, 0.0); cols * rows],
            output_buf: Vec::with_capacity(cols * rows * 25),
        }
    }

    pub fn resize(&mut self, cols: usize, term_rows: usize) {
        *self = Self::new(cols, term_rows, self.scale);
    }

    /// Surface position at the center of a terminal cell.
    pub fn to_surface(&self, column: u16, row: u16) -> Vec2 {
        Vec2::new(
            (column as f32 + 0.5) * self.scale,
            (row as f32 * 2.0 + 1.0) * self.scale,
        )
    }

    fn pixel_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new((x as f32 + 0.5) * self.scale, (y as f32 + 0.5) * self.scale)
    }

    /// Pixel ranges touched by the surface-space box `min..max`, or `None`
    /// when it lies entirely off screen.
    fn pixel_bounds(&self, min: Vec2, max: Vec2) -> Option<(Range<usize>, Range<usize>)> {
        let x0 = ((min.x / self.scale).floor() as isize).max(0) as usize;
        let y0 = ((min.y / self.scale).floor() as isize).max(0) as usize;
        let x1 = ((max.x / self.scale).ceil() as isize).clamp(0, self.cols as isize) as usize;
        let y1 = ((max.y / self.scale).ceil() as isize).clamp(0, self.rows as isize) as usize;

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0..x1, y0..y1))
    }

    fn blend(&mut self, idx: usize, color: (f32, f32, f32), alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let px = &mut self.pixels[idx];
        px.0 += (color.0 - px.0) * a;
        px.1 += (color.1 - px.1) * a;
        px.2 += (color.2 - px.2) * a;
    }

    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: Option<Rgb> = None;
        let mut prev_bot: Option<Rgb> = None;

        // Render using half-blocks: background is the top pixel, foreground the bottom
        for y in (0..self.rows).step_by(2) {
            for x in 0..self.cols {
                let top = to_rgb(self.pixels[y * self.cols + x]);
                let bot = to_rgb(self.pixels[(y + 1) * self.cols + x]);

                if prev_top != Some(top) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = None;
            prev_bot = None;
            if y + 2 < self.rows {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.cols as f32 * self.scale
    }

    fn height(&self) -> f32 {
        self.rows as f32 * self.scale
    }

    fn clear(&mut self) {
        self.pixels.fill((0.0, 0.0, 0.0));
    }

    fn fill(&mut self, paint: &Paint) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let (color, alpha) = paint.sample(self.pixel_center(x, y));
                self.blend(y * self.cols + x, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint, style: &Style) {
        let alpha = style.alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || !(radius >= 0.0) {
            return;
        }

        // Anything smaller than a pixel still lights one, dimmed by its area.
        let half_px = self.scale * 0.5;
        let body = radius.max(half_px);
        let area = (radius / half_px).powi(2).min(1.0);
        let shrink = radius / body;

        let glow = style.glow.filter(|g| g.radius > 0.0);
        let reach = body + glow.map_or(0.0, |g| g.radius) + self.scale;
        let Some((xs, ys)) =
            self.pixel_bounds(center - Vec2::splat(reach), center + Vec2::splat(reach))
        else {
            return;
        };

        for y in ys {
            for x in xs.clone() {
                let idx = y * self.cols + x;
                let p = self.pixel_center(x, y);
                let d = p.distance(center);

                if let Some(g) = glow {
                    let falloff = 1.0 - (d - radius).max(0.0) / g.radius;
                    if falloff > 0.0 {
                        self.blend(idx, to_linear(g.color), alpha * GLOW_STRENGTH * falloff * falloff);
                    }
                }

                let coverage = ((body - d) / self.scale + 0.5).clamp(0.0, 1.0) * area;
                if coverage > 0.0 {
                    let (color, a) = paint.sample(center + (p - center) * shrink);
                    self.blend(idx, color, a * alpha * coverage);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint, style: &Style) {
        let alpha = style.alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || !(width > 0.0) {
            return;
        }

        let half = (width * 0.5).max(self.scale * 0.5);
        let thin = (width / self.scale).min(1.0);
        let pad = Vec2::splat(half + self.scale);
        let Some((xs, ys)) = self.pixel_bounds(from.min(to) - pad, from.max(to) + pad) else {
            return;
        };

        for y in ys {
            for x in xs.clone() {
                let p = self.pixel_center(x, y);
                let coverage = ((half - distance_to_segment(p, from, to)) / self.scale + 0.5)
                    .clamp(0.0, 1.0)
                    * thin;
                if coverage > 0.0 {
                    let (color, a) = paint.sample(p);
                    self.blend(y * self.cols + x, color, a * alpha * coverage);
                }
            }
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

fn to_rgb(c: (f32, f32, f32)) -> Rgb {
    (
        (c.0.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.1.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.2.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BLACK, ColorStop, WHITE};

    impl Canvas {
        fn pixel(&self, x: usize, y: usize) -> Rgb {
            to_rgb(self.pixels[y * self.cols + x])
        }

        fn pixel_dims(&self) -> (usize, usize) {
            (self.cols, self.rows)
        }
    }

    fn luma(c: Rgb) -> u32 {
        c.0 as u32 + c.1 as u32 + c.2 as u32
    }

    #[test]
    fn dimensions_follow_scale() {
        let canvas = Canvas::new(20, 10, 4.0);
        assert_eq!(canvas.pixel_dims(), (20, 20));
        assert_eq!(canvas.width(), 80.0);
        assert_eq!(canvas.height(), 80.0);
        assert_eq!(canvas.to_surface(0, 0), Vec2::new(2.0, 4.0));
        assert_eq!(canvas.to_surface(3, 2), Vec2::new(14.0, 20.0));
    }

    #[test]
    fn vertical_gradient_fills_every_pixel() {
        let mut canvas = Canvas::new(4, 4, 1.0);
        let stops = [ColorStop::opaque(0.0, BLACK), ColorStop::opaque(1.0, (0x2e, 0x00, 0x4f))];
        canvas.fill(&Paint::Linear {
            from: Vec2::new(0.0, canvas.height()),
            to: Vec2::ZERO,
            stops: &stops,
        });

        let top = canvas.pixel(0, 0);
        let bottom = canvas.pixel(0, 7);
        assert!(top.2 > 0x40, "top should be near deep purple, got {top:?}");
        assert!(bottom.2 < 0x08, "bottom should be near black, got {bottom:?}");
        assert_eq!(canvas.pixel(0, 3), canvas.pixel(3, 3));
    }

    #[test]
    fn circle_lights_center_not_corner() {
        let mut canvas = Canvas::new(10, 5, 1.0);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 2.0, &Paint::Solid(WHITE), &Style::default());
        assert_eq!(canvas.pixel(5, 5), WHITE);
        assert_eq!(canvas.pixel(0, 0), BLACK);
    }

    #[test]
    fn tiny_circle_is_dimmer_than_full_pixel() {
        let mut canvas = Canvas::new(10, 5, 4.0);
        canvas.fill_circle(Vec2::new(10.0, 10.0), 0.5, &Paint::Solid(WHITE), &Style::default());
        let lit = canvas.pixel(2, 2);
        assert!(luma(lit) > 0);
        assert!(luma(lit) < luma(WHITE));
    }

    #[test]
    fn glow_reaches_beyond_radius() {
        let mut plain = Canvas::new(20, 10, 1.0);
        let mut glowing = Canvas::new(20, 10, 1.0);
        let center = Vec2::new(10.0, 10.0);
        let paint = Paint::Solid((255, 0, 0));

        plain.fill_circle(center, 1.0, &paint, &Style::default());
        glowing.fill_circle(center, 1.0, &paint, &Style::default().with_glow((255, 0, 0), 5.0));

        assert_eq!(plain.pixel(14, 10), BLACK);
        assert!(glowing.pixel(14, 10).0 > 0);
    }

    #[test]
    fn alpha_zero_draws_nothing() {
        let mut canvas = Canvas::new(10, 5, 1.0);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 3.0, &Paint::Solid(WHITE), &Style::alpha(0.0));
        canvas.fill_circle(Vec2::new(5.0, 5.0), 3.0, &Paint::Solid(WHITE), &Style::alpha(-0.2));
        assert_eq!(canvas.pixel(5, 5), BLACK);
    }

    #[test]
    fn stroke_follows_segment() {
        let mut canvas = Canvas::new(10, 5, 1.0);
        canvas.stroke_line(
            Vec2::new(0.0, 5.0),
            Vec2::new(10.0, 5.0),
            2.0,
            &Paint::Solid(WHITE),
            &Style::default(),
        );
        assert_eq!(canvas.pixel(3, 4), WHITE);
        assert_eq!(canvas.pixel(3, 0), BLACK);
    }

    #[test]
    fn off_screen_and_degenerate_shapes_are_ignored() {
        let mut canvas = Canvas::new(10, 5, 1.0);
        let paint = Paint::Solid(WHITE);
        canvas.fill_circle(Vec2::new(-100.0, -100.0), 3.0, &paint, &Style::default());
        canvas.fill_circle(Vec2::new(f32::NAN, 5.0), f32::NAN, &paint, &Style::default());
        canvas.stroke_line(Vec2::splat(500.0), Vec2::splat(600.0), 3.0, &paint, &Style::default());
        assert!(canvas.pixels.iter().all(|&p| p == (0.0, 0.0, 0.0)));
    }

    #[test]
    fn clear_wipes_frame() {
        let mut canvas = Canvas::new(4, 2, 1.0);
        canvas.fill(&Paint::Solid(WHITE));
        canvas.clear();
        assert_eq!(canvas.pixel(1, 1), BLACK);
    }

    #[test]
    fn present_writes_one_half_block_per_cell() {
        let mut canvas = Canvas::new(6, 3, 1.0);
        canvas.fill(&Paint::Solid((10, 20, 30)));
        let mut out = Vec::new();
        canvas.present(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[H"));
        assert_eq!(text.matches('▄').count(), 18);
        assert_eq!(text.matches("\r\n").count(), 2);
        // Uniform rows emit each color once per row.
        assert_eq!(text.matches("\x1b[48;2;10;20;30m").count(), 3);
    }
}

use super::uniform;
use crate::surface::{Paint, Style, Surface, WHITE};
use fastrand::Rng;
use glam::Vec2;

const MAX_RADIUS: f32 = 1.5;
const TWINKLE_SPEED: (f32, f32) = (0.01, 0.03);

#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub twinkle_speed: f32,
}

impl Star {
    fn random(width: f32, height: f32, rng: &mut Rng) -> Self {
        Self {
            pos: Vec2::new(rng.f32() * width, rng.f32() * height),
            radius: rng.f32() * MAX_RADIUS,
            alpha: rng.f32(),
            twinkle_speed: uniform(rng, TWINKLE_SPEED),
        }
    }

    /// One step of a random walk, reflected at fully dark and fully lit.
    fn twinkle(&mut self, rng: &mut Rng) {
        let step = if rng.bool() { self.twinkle_speed } else { -self.twinkle_speed };
        self.alpha = (self.alpha + step).clamp(0.0, 1.0);
    }
}

/// Fixed-size backdrop of twinkling points.
#[derive(Default)]
pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    /// Replace every star with `count` fresh ones spread over `width x height`.
    pub fn generate(&mut self, count: usize, width: f32, height: f32, rng: &mut Rng) {
        self.stars.clear();
        self.stars
            .extend((0..count).map(|_| Star::random(width, height, rng)));
    }

    #[cfg(test)]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn update(&mut self, rng: &mut Rng) {
        for star in &mut self.stars {
            star.twinkle(rng);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        let paint = Paint::Solid(WHITE);
        for star in &self.stars {
            surface.fill_circle(star.pos, star.radius, &paint, &Style::alpha(star.alpha));
        }
    }
}

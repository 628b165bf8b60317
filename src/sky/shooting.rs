use crate::surface::{ColorStop, Paint, Rgb, Style, Surface, WHITE};
use fastrand::Rng;
use glam::Vec2;

// Chance of a new shooting star on any given tick
pub const SPAWN_CHANCE: f32 = 0.01;
const SPAWN_Y: f32 = -20.0;
const FADE_PER_TICK: f32 = 0.01;
// How far below the bottom edge a star may travel before it is dropped
const EXIT_MARGIN: f32 = 50.0;

const HEAD_AMBER: Rgb = (255, 187, 0);
// hsl(44, 100%, 91%)
const TRAIL_COLOR: Rgb = (255, 243, 209);

const HEAD_STOPS: [ColorStop; 3] = [
    ColorStop::opaque(0.0, WHITE),
    ColorStop::opaque(0.5, HEAD_AMBER),
    ColorStop::new(1.0, WHITE, 0.0),
];
const TRAIL_STOPS: [ColorStop; 2] = [
    ColorStop::new(0.0, TRAIL_COLOR, 0.8),
    ColorStop::new(1.0, WHITE, 0.0),
];

#[derive(Debug, Clone)]
pub struct ShootingStar {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Trail length in ticks of travel.
    pub length: f32,
    pub alpha: f32,
}

impl ShootingStar {
    fn random(width: f32, rng: &mut Rng) -> Self {
        Self {
            pos: Vec2::new(rng.f32() * width, SPAWN_Y),
            vel: Vec2::new(rng.f32() - 0.5, rng.f32() * 4.0 + 4.0),
            radius: rng.f32() * 1.2 + 0.8,
            length: rng.f32() * 60.0 + 40.0,
            alpha: 1.0,
        }
    }

    /// Point `fraction` of the way down the trail, which points back
    /// along the direction of travel.
    pub fn trail_point(&self, fraction: f32) -> Vec2 {
        self.pos - self.vel * (self.length * fraction)
    }

    fn render(&self, surface: &mut dyn Surface) {
        let style = Style::alpha(self.alpha);

        let head_radius = self.radius * 3.0;
        let head = Paint::Radial {
            center: self.pos,
            radius: head_radius,
            stops: &HEAD_STOPS,
        };
        surface.fill_circle(self.pos, head_radius, &head, &style);

        // Two segments sharing one gradient: thin near the head, wide at the tail.
        let mid = self.trail_point(0.5);
        let tail = self.trail_point(1.0);
        let trail = Paint::Linear {
            from: self.pos,
            to: tail,
            stops: &TRAIL_STOPS,
        };
        surface.stroke_line(self.pos, mid, 1.0, &trail, &style);
        surface.stroke_line(mid, tail, 3.0, &trail, &style);
    }

    fn advance(&mut self) {
        self.pos += self.vel;
        self.alpha -= FADE_PER_TICK;
    }

    fn is_expired(&self, height: f32) -> bool {
        self.alpha <= 0.0 || self.pos.y > height + EXIT_MARGIN
    }
}

/// Transient streaks crossing the sky, at most `cap` at once.
pub struct ShootingStars {
    stars: Vec<ShootingStar>,
    cap: usize,
}

impl ShootingStars {
    pub fn new(cap: usize) -> Self {
        Self {
            stars: Vec::new(),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> std::slice::Iter<'_, ShootingStar> {
        self.stars.iter()
    }

    /// Roll the per-tick spawn chance. Returns whether a star was added.
    pub fn maybe_spawn(&mut self, width: f32, rng: &mut Rng) -> bool {
        rng.f32() < SPAWN_CHANCE && self.spawn(width, rng)
    }

    pub fn spawn(&mut self, width: f32, rng: &mut Rng) -> bool {
        if self.stars.len() >= self.cap {
            return false;
        }
        self.stars.push(ShootingStar::random(width, rng));
        true
    }

    /// Draw and advance every star, then drop the expired ones in a
    /// separate pass so removal cannot skip a neighbour.
    pub fn update(&mut self, height: f32, surface: &mut dyn Surface) {
        for star in &mut self.stars {
            star.render(surface);
            star.advance();
        }
        self.stars.retain(|s| !s.is_expired(height));
    }
}

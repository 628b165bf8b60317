use super::uniform;
use crate::config::ParticleConfig;
use crate::surface::{BLACK, ColorStop, Paint, Rgb, Style, Surface};
use fastrand::Rng;
use glam::Vec2;

pub const DEFAULT_GLOW: f32 = 20.0;

/// Physics shared by every particle plus the ranges each one draws its
/// own radius and decay from.
#[derive(Debug, Clone, Copy)]
pub struct Kinematics {
    /// Added to vertical velocity every tick.
    pub gravity: f32,
    /// Multiplies both velocity components every tick.
    pub drag: f32,
    pub decay: (f32, f32),
    pub radius: (f32, f32),
}

impl From<&ParticleConfig> for Kinematics {
    fn from(config: &ParticleConfig) -> Self {
        Self {
            gravity: config.gravity,
            drag: config.drag,
            decay: (config.decay_min, config.decay_max),
            radius: (config.radius_min, config.radius_max),
        }
    }
}

impl Default for Kinematics {
    fn default() -> Self {
        Self::from(&ParticleConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub radius: f32,
    pub alpha: f32,
    pub decay: f32,
    pub glow: f32,
}

impl Particle {
    pub fn new(
        pos: Vec2,
        color: Rgb,
        speed: f32,
        angle: f32,
        glow: f32,
        kinematics: &Kinematics,
        rng: &mut Rng,
    ) -> Self {
        Self {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            color,
            radius: uniform(rng, kinematics.radius),
            alpha: 1.0,
            decay: uniform(rng, kinematics.decay),
            glow,
        }
    }

    pub fn update(&mut self, kinematics: &Kinematics) {
        self.pos += self.vel;
        self.vel.y += kinematics.gravity;
        self.vel *= kinematics.drag;
        self.alpha -= self.decay;
    }

    /// Radius actually drawn; particles swell as they fade.
    pub fn size(&self) -> f32 {
        self.radius * (2.0 - self.alpha)
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if !self.is_alive() {
            return;
        }

        let stops = [
            ColorStop::opaque(0.0, self.color),
            ColorStop::opaque(0.5, self.color),
            ColorStop::new(1.0, BLACK, 0.0),
        ];
        let size = self.size();
        let paint = Paint::Radial {
            center: self.pos,
            radius: size,
            stops: &stops,
        };
        let style = Style::alpha(self.alpha).with_glow(self.color, self.glow);
        surface.fill_circle(self.pos, size, &paint, &style);
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Active firework particles in insertion order, bounded by `cap`.
pub struct ParticlePool {
    particles: Vec<Particle>,
    cap: usize,
}

impl ParticlePool {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Append a burst, then drop the oldest particles past the cap.
    /// Returns how many were dropped.
    pub fn extend(&mut self, burst: impl IntoIterator<Item = Particle>) -> usize {
        self.particles.extend(burst);
        let excess = self.particles.len().saturating_sub(self.cap);
        if excess > 0 {
            self.particles.drain(..excess);
        }
        excess
    }

    pub fn update_and_render(&mut self, kinematics: &Kinematics, surface: &mut dyn Surface) {
        for particle in &mut self.particles {
            particle.update(kinematics);
            particle.render(surface);
        }
    }

    /// Rebuild the pool from the particles still visible.
    pub fn prune(&mut self) {
        self.particles.retain(Particle::is_alive);
    }
}

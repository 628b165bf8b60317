//! The night sky: every entity pool plus the handlers that mutate them.

pub mod firework;
pub mod particle;
pub mod shooting;
pub mod starfield;

use crate::audio::{Cue, CuePlayer, play_cue};
use crate::config::{AudioConfig, Config};
use crate::surface::Surface;
use fastrand::Rng;
use firework::{BurstGeometry, random_color};
use glam::Vec2;
use particle::{Kinematics, ParticlePool};
use shooting::ShootingStars;
use starfield::StarField;

// Auto-launched bursts stay in the upper part of the sky
const AUTO_HEIGHT_FRACTION: f32 = 0.7;

pub(crate) fn uniform(rng: &mut Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.f32() * (hi - lo)
}

/// Cue volumes and pitch jitter.
#[derive(Debug, Clone, Copy)]
pub struct CueLevels {
    pub explosion: f32,
    pub shooting_star: f32,
    pub pitch_jitter: f32,
}

impl From<&AudioConfig> for CueLevels {
    fn from(config: &AudioConfig) -> Self {
        Self {
            explosion: config.explosion_volume,
            shooting_star: config.shooting_star_volume,
            pitch_jitter: config.pitch_jitter,
        }
    }
}

/// Simulation state: bounds, random source and the three entity pools.
pub struct Sky {
    width: f32,
    height: f32,
    star_count: usize,
    kinematics: Kinematics,
    cues: CueLevels,
    rng: Rng,
    stars: StarField,
    shooting_stars: ShootingStars,
    particles: ParticlePool,
}

impl Sky {
    pub fn new(config: &Config, width: f32, height: f32, rng: Rng) -> Self {
        let mut sky = Self {
            width,
            height,
            star_count: config.stars,
            kinematics: Kinematics::from(&config.particles),
            cues: CueLevels::from(&config.audio),
            rng,
            stars: StarField::default(),
            shooting_stars: ShootingStars::new(config.max_shooting_stars),
            particles: ParticlePool::new(config.particles.max),
        };
        sky.regenerate_stars();
        sky
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn shooting_stars(&self) -> &ShootingStars {
        &self.shooting_stars
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    fn regenerate_stars(&mut self) {
        self.stars
            .generate(self.star_count, self.width, self.height, &mut self.rng);
    }

    fn playback_rate(&mut self) -> f32 {
        let jitter = self.cues.pitch_jitter;
        uniform(&mut self.rng, (1.0 - jitter, 1.0 + jitter))
    }

    /// Burst at `(x, y)` with a random color and geometry.
    pub fn create_firework_at(&mut self, x: f32, y: f32, audio: &mut dyn CuePlayer) -> BurstGeometry {
        let geometry = BurstGeometry::select(self.rng.f32());
        self.burst(Vec2::new(x, y), geometry, audio);
        geometry
    }

    /// Burst at a random spot in the upper part of the sky.
    pub fn launch_random(&mut self, audio: &mut dyn CuePlayer) -> BurstGeometry {
        let x = self.rng.f32() * self.width;
        let y = self.rng.f32() * self.height * AUTO_HEIGHT_FRACTION;
        self.create_firework_at(x, y, audio)
    }

    pub fn burst(&mut self, origin: Vec2, geometry: BurstGeometry, audio: &mut dyn CuePlayer) {
        let color = random_color(&mut self.rng);
        let particles = geometry.emit(origin, color, &self.kinematics, &mut self.rng);
        log::debug!(
            "{} burst of {} at ({:.0}, {:.0})",
            geometry.name(),
            particles.len(),
            origin.x,
            origin.y
        );

        let rate = self.playback_rate();
        play_cue(audio, Cue::Explosion, self.cues.explosion, rate);

        let dropped = self.particles.extend(particles);
        if dropped > 0 {
            log::debug!("particle cap reached, dropped {dropped} oldest");
        }
    }

    /// Drop every firework particle and start a fresh star field.
    /// Shooting stars already in flight are left to finish.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.regenerate_stars();
    }

    /// Adopt new bounds; stars are laid out again to cover them.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.regenerate_stars();
    }

    pub fn update_stars(&mut self, surface: &mut dyn Surface) {
        self.stars.update(&mut self.rng);
        self.stars.render(surface);
    }

    pub fn update_shooting_stars(&mut self, surface: &mut dyn Surface, audio: &mut dyn CuePlayer) {
        if self.shooting_stars.maybe_spawn(self.width, &mut self.rng) {
            log::debug!("shooting star, {} in flight", self.shooting_stars.len());
            let rate = self.playback_rate();
            play_cue(audio, Cue::ShootingStar, self.cues.shooting_star, rate);
        }
        self.shooting_stars.update(self.height, surface);
    }

    pub fn update_particles(&mut self, surface: &mut dyn Surface) {
        self.particles.update_and_render(&self.kinematics, surface);
        self.particles.prune();
    }
}

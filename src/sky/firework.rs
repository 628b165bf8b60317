use super::particle::{DEFAULT_GLOW, Kinematics, Particle};
use super::uniform;
use crate::surface::Rgb;
use fastrand::Rng;
use glam::Vec2;
use std::f32::consts::TAU;

/// Burst colors, one picked per firework.
pub const PALETTE: [(&str, Rgb); 10] = [
    ("red", (255, 0, 0)),
    ("yellow", (255, 255, 0)),
    ("blue", (0, 0, 255)),
    ("green", (0, 128, 0)),
    ("purple", (128, 0, 128)),
    ("orange", (255, 165, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("lime", (0, 255, 0)),
    ("gold", (255, 215, 0)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BurstGeometry {
    /// Concentric rings; ring `i` (from 1) travels at `i * speed_step`.
    Ring {
        rings: u32,
        per_ring: u32,
        speed_step: f32,
    },
    /// Evenly spaced angles swept over `points / 5` turns.
    StarPoint {
        count: u32,
        points: u32,
        speed: (f32, f32),
    },
    /// Dense random spray with a brighter glow.
    Chaotic {
        count: u32,
        speed: (f32, f32),
        glow: f32,
    },
    Default {
        count: u32,
        speed: (f32, f32),
    },
}

pub const RING: BurstGeometry = BurstGeometry::Ring {
    rings: 3,
    per_ring: 100,
    speed_step: 3.0,
};
pub const STAR_POINT: BurstGeometry = BurstGeometry::StarPoint {
    count: 100,
    points: 5,
    speed: (2.0, 9.0),
};
pub const CHAOTIC: BurstGeometry = BurstGeometry::Chaotic {
    count: 300,
    speed: (4.0, 16.0),
    glow: 40.0,
};
pub const DEFAULT: BurstGeometry = BurstGeometry::Default {
    count: 200,
    speed: (0.0, 8.0),
};

/// Selection weights; they partition [0, 1) in this order.
pub const GEOMETRY_WEIGHTS: [(f32, BurstGeometry); 4] = [
    (0.25, RING),
    (0.25, STAR_POINT),
    (0.10, CHAOTIC),
    (0.40, DEFAULT),
];

impl BurstGeometry {
    /// Map a uniform draw in [0, 1) onto exactly one geometry. Draws past
    /// the accumulated weights land on the last entry, so there is no
    /// empty outcome.
    pub fn select(r: f32) -> Self {
        let mut upper = 0.0;
        for (weight, geometry) in GEOMETRY_WEIGHTS {
            upper += weight;
            if r < upper {
                return geometry;
            }
        }
        GEOMETRY_WEIGHTS[GEOMETRY_WEIGHTS.len() - 1].1
    }

    pub fn particle_count(&self) -> usize {
        match *self {
            BurstGeometry::Ring { rings, per_ring, .. } => (rings * per_ring) as usize,
            BurstGeometry::StarPoint { count, .. }
            | BurstGeometry::Chaotic { count, .. }
            | BurstGeometry::Default { count, .. } => count as usize,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BurstGeometry::Ring { .. } => "ring",
            BurstGeometry::StarPoint { .. } => "star-point",
            BurstGeometry::Chaotic { .. } => "chaotic",
            BurstGeometry::Default { .. } => "default",
        }
    }

    /// Build every particle of one burst at `origin`.
    pub fn emit(
        &self,
        origin: Vec2,
        color: Rgb,
        kinematics: &Kinematics,
        rng: &mut Rng,
    ) -> Vec<Particle> {
        let mut burst = Vec::with_capacity(self.particle_count());
        let mut push = |speed: f32, angle: f32, glow: f32, rng: &mut Rng| {
            burst.push(Particle::new(origin, color, speed, angle, glow, kinematics, rng));
        };

        match *self {
            BurstGeometry::Ring {
                rings,
                per_ring,
                speed_step,
            } => {
                for ring in 1..=rings {
                    let speed = ring as f32 * speed_step;
                    for i in 0..per_ring {
                        let angle = i as f32 / per_ring as f32 * TAU;
                        push(speed, angle, DEFAULT_GLOW, rng);
                    }
                }
            }
            BurstGeometry::StarPoint { count, points, speed } => {
                let sweep = TAU * points as f32 / 5.0;
                for i in 0..count {
                    let angle = i as f32 / count as f32 * sweep;
                    let speed = uniform(rng, speed);
                    push(speed, angle, DEFAULT_GLOW, rng);
                }
            }
            BurstGeometry::Chaotic { count, speed, glow } => {
                for _ in 0..count {
                    let angle = rng.f32() * TAU;
                    let speed = uniform(rng, speed);
                    push(speed, angle, glow, rng);
                }
            }
            BurstGeometry::Default { count, speed } => {
                for _ in 0..count {
                    let angle = rng.f32() * TAU;
                    let speed = uniform(rng, speed);
                    push(speed, angle, DEFAULT_GLOW, rng);
                }
            }
        }

        burst
    }
}

pub fn random_color(rng: &mut Rng) -> Rgb {
    PALETTE[rng.usize(..PALETTE.len())].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_partitions_unit_interval() {
        let cases = [
            (0.1, "ring", 300),
            (0.3, "star-point", 100),
            (0.55, "chaotic", 300),
            (0.8, "default", 200),
        ];
        for (r, name, count) in cases {
            let geometry = BurstGeometry::select(r);
            assert_eq!(geometry.name(), name, "r = {r}");
            assert_eq!(geometry.particle_count(), count, "r = {r}");
        }
    }

    #[test]
    fn boundaries_belong_to_the_upper_geometry() {
        assert_eq!(BurstGeometry::select(0.0), RING);
        assert_eq!(BurstGeometry::select(0.25), STAR_POINT);
        assert_eq!(BurstGeometry::select(0.5), CHAOTIC);
        assert_eq!(BurstGeometry::select(0.6), DEFAULT);
        assert_eq!(BurstGeometry::select(0.999_999), DEFAULT);
    }

    #[test]
    fn every_draw_yields_a_burst() {
        let mut rng = Rng::with_seed(21);
        for _ in 0..10_000 {
            assert!(BurstGeometry::select(rng.f32()).particle_count() > 0);
        }
    }

    #[test]
    fn weights_cover_the_whole_interval() {
        let total: f32 = GEOMETRY_WEIGHTS.iter().map(|(w, _)| w).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ring_burst_has_three_evenly_spaced_rings() {
        let mut rng = Rng::with_seed(1);
        let burst = RING.emit(Vec2::new(50.0, 60.0), (255, 0, 0), &Kinematics::default(), &mut rng);
        assert_eq!(burst.len(), 300);

        for (ring, chunk) in burst.chunks(100).enumerate() {
            let expected = (ring as f32 + 1.0) * 3.0;
            for p in chunk {
                assert!((p.vel.length() - expected).abs() < 1e-4);
                assert_eq!(p.pos, Vec2::new(50.0, 60.0));
                assert_eq!(p.glow, DEFAULT_GLOW);
            }
            // Quarter of the way round the ring points straight down.
            let quarter = chunk[25].vel / expected;
            assert!(quarter.x.abs() < 1e-4 && (quarter.y - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn star_point_speeds_stay_in_range() {
        let mut rng = Rng::with_seed(2);
        let burst = STAR_POINT.emit(Vec2::ZERO, (0, 0, 255), &Kinematics::default(), &mut rng);
        assert_eq!(burst.len(), 100);
        assert!(burst.iter().all(|p| (2.0 - 1e-4..=9.0 + 1e-4).contains(&p.vel.length())));
        assert_eq!(burst[0].vel.y, 0.0);
    }

    #[test]
    fn chaotic_burst_glows_brighter() {
        let mut rng = Rng::with_seed(3);
        let burst = CHAOTIC.emit(Vec2::ZERO, (0, 255, 0), &Kinematics::default(), &mut rng);
        assert_eq!(burst.len(), 300);
        assert!(burst.iter().all(|p| p.glow == 40.0));
        assert!(burst.iter().all(|p| (4.0 - 1e-4..=16.0 + 1e-4).contains(&p.vel.length())));
    }

    #[test]
    fn burst_shares_color_but_not_decay() {
        let mut rng = Rng::with_seed(4);
        let burst = DEFAULT.emit(Vec2::ZERO, (255, 215, 0), &Kinematics::default(), &mut rng);
        assert_eq!(burst.len(), 200);
        assert!(burst.iter().all(|p| p.color == (255, 215, 0)));
        assert!(burst.iter().any(|p| p.decay != burst[0].decay));
        assert!(burst.iter().all(|p| p.vel.length() <= 8.0 + 1e-4));
    }

    #[test]
    fn colors_come_from_palette() {
        let mut rng = Rng::with_seed(5);
        for _ in 0..100 {
            let c = random_color(&mut rng);
            assert!(PALETTE.iter().any(|(_, p)| *p == c));
        }
    }
}

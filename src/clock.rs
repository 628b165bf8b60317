//! The frame loop: one tick per display frame, in a fixed compositing
//! order, until the driver says stop.

use crate::audio::CuePlayer;
use crate::config::Config;
use crate::error::Result;
use crate::sky::Sky;
use crate::surface::{ColorStop, Paint, Surface};
use glam::Vec2;
use std::time::Duration;

/// Inbound events, collected by the driver between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Burst { x: f32, y: f32 },
    ToggleAuto,
    Clear,
    /// New surface bounds. The driver has already resized its surface.
    Resize { width: f32, height: f32 },
}

/// Supplies frames to [`Clock::run`].
pub trait FrameDriver {
    /// Block until the next frame is due, appending any triggers raised in
    /// the meantime. Returns time since the driver started, or `None` once
    /// the loop should stop.
    fn next_frame(&mut self, triggers: &mut Vec<Trigger>) -> Result<Option<Duration>>;
    fn surface(&mut self) -> &mut dyn Surface;
    fn present(&mut self) -> Result<()>;
}

/// Interval timer behind auto mode.
#[derive(Debug, Clone)]
pub struct AutoLauncher {
    interval: Duration,
    next_due: Option<Duration>,
}

impl AutoLauncher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn start(&mut self, now: Duration) {
        self.next_due = Some(now + self.interval);
    }

    /// Cancel the pending launch; `poll` returns false until restarted.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Flip between running and stopped. Returns the new state.
    pub fn toggle(&mut self, now: Duration) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start(now);
        }
        self.is_running()
    }

    /// Whether a launch is due at `now`. At most one launch per poll; a
    /// timer that fell behind restarts its interval from `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.interval;
                self.next_due = Some(if next <= now { now + self.interval } else { next });
                true
            }
            _ => false,
        }
    }
}

/// Drives the [`Sky`] once per frame.
pub struct Clock {
    sky: Sky,
    audio: Box<dyn CuePlayer>,
    auto: AutoLauncher,
    background: [ColorStop; 2],
}

impl Clock {
    pub fn new(sky: Sky, audio: Box<dyn CuePlayer>, config: &Config) -> Self {
        let mut auto = AutoLauncher::new(Duration::from_millis(config.auto_interval_ms));
        if config.auto_start {
            auto.start(Duration::ZERO);
        }

        Self {
            sky,
            audio,
            auto,
            background: [
                ColorStop::opaque(0.0, config.background.bottom.0),
                ColorStop::opaque(1.0, config.background.top.0),
            ],
        }
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn auto_running(&self) -> bool {
        self.auto.is_running()
    }

    /// Run frames until the driver stops. Returns the number of ticks.
    pub fn run(&mut self, driver: &mut dyn FrameDriver) -> Result<u64> {
        let mut triggers = Vec::new();
        let mut ticks = 0;

        while let Some(now) = driver.next_frame(&mut triggers)? {
            self.frame(now, &mut triggers, driver.surface());
            driver.present()?;
            ticks += 1;
        }

        Ok(ticks)
    }

    /// Apply pending triggers and the auto timer, then tick.
    pub fn frame(&mut self, now: Duration, triggers: &mut Vec<Trigger>, surface: &mut dyn Surface) {
        for trigger in triggers.drain(..) {
            self.handle(trigger, now, surface);
        }
        if self.auto.poll(now) {
            self.sky.launch_random(self.audio.as_mut());
        }
        self.tick(surface);
    }

    fn handle(&mut self, trigger: Trigger, now: Duration, surface: &mut dyn Surface) {
        match trigger {
            Trigger::Burst { x, y } => {
                self.sky.create_firework_at(x, y, self.audio.as_mut());
            }
            Trigger::ToggleAuto => {
                let on = self.auto.toggle(now);
                log::info!("auto mode {}", if on { "on" } else { "off" });
            }
            Trigger::Clear => {
                log::info!(
                    "clearing {} particles ({} shooting stars left in flight)",
                    self.sky.particles().len(),
                    self.sky.shooting_stars().len()
                );
                surface.clear();
                self.sky.clear();
            }
            Trigger::Resize { width, height } => {
                self.sky.resize(width, height);
                log::info!("resized to {width}x{height}");
            }
        }
    }

    /// One frame: background, stars, shooting stars, particles. Each layer
    /// paints over the one before it.
    pub fn tick(&mut self, surface: &mut dyn Surface) {
        let background = Paint::Linear {
            from: Vec2::new(0.0, surface.height()),
            to: Vec2::ZERO,
            stops: &self.background,
        };
        surface.fill(&background);

        self.sky.update_stars(surface);
        self.sky.update_shooting_stars(surface, self.audio.as_mut());
        self.sky.update_particles(surface);
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::surface::testing::Recorder;

    /// Runs a fixed number of ticks at a synthetic 60 Hz, injecting
    /// scripted triggers at given frame numbers.
    pub struct FixedTicks {
        pub surface: Recorder,
        pub presented: u64,
        total: u64,
        frame: u64,
        script: Vec<(u64, Trigger)>,
    }

    impl FixedTicks {
        pub fn new(ticks: u64, width: f32, height: f32) -> Self {
            Self {
                surface: Recorder::new(width, height),
                presented: 0,
                total: ticks,
                frame: 0,
                script: Vec::new(),
            }
        }

        pub fn at(mut self, frame: u64, trigger: Trigger) -> Self {
            self.script.push((frame, trigger));
            self
        }
    }

    pub fn frame_time(frame: u64) -> Duration {
        Duration::from_micros(frame * 1_000_000 / 60)
    }

    impl FrameDriver for FixedTicks {
        fn next_frame(&mut self, triggers: &mut Vec<Trigger>) -> Result<Option<Duration>> {
            if self.frame >= self.total {
                return Ok(None);
            }
            let frame = self.frame;
            triggers.extend(
                self.script
                    .iter()
                    .filter(|(at, _)| *at == frame)
                    .map(|(_, t)| *t),
            );
            if let Some(&(_, Trigger::Resize { width, height })) = self
                .script
                .iter()
                .find(|(at, t)| *at == frame && matches!(t, Trigger::Resize { .. }))
            {
                self.surface.width = width;
                self.surface.height = height;
            }
            self.frame += 1;
            Ok(Some(frame_time(frame)))
        }

        fn surface(&mut self) -> &mut dyn Surface {
            &mut self.surface
        }

        fn present(&mut self) -> Result<()> {
            self.presented += 1;
            Ok(())
        }
    }
}

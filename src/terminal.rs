//! Crossterm host: raw-mode terminal, input translation and frame pacing.

use crate::audio::CuePlayer;
use crate::clock::{Clock, FrameDriver, Trigger};
use crate::config::Config;
use crate::error::Result;
use crate::sky::Sky;
use crate::surface::{Canvas, Surface};
use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{BufWriter, Stdout, stdout};
use std::time::{Duration, Instant};

pub struct TerminalDriver {
    canvas: Canvas,
    out: BufWriter<Stdout>,
    started: Instant,
    frame_time: Duration,
    deadline: Instant,
}

impl TerminalDriver {
    pub fn new(cols: u16, rows: u16, pixel_scale: f32, fps: u32) -> Self {
        let now = Instant::now();
        Self {
            canvas: Canvas::new(cols as usize, rows as usize, pixel_scale),
            out: BufWriter::with_capacity(1024 * 64, stdout()),
            started: now,
            frame_time: Duration::from_secs(1) / fps,
            deadline: now,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn enter(&mut self) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)
    }

    fn leave(&mut self) -> std::io::Result<()> {
        execute!(self.out, Show, LeaveAlternateScreen, DisableMouseCapture)?;
        terminal::disable_raw_mode()
    }

    /// Map one input event onto triggers. Returns false when the user asked
    /// to quit.
    fn translate(&mut self, event: Event, triggers: &mut Vec<Trigger>) -> std::io::Result<bool> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(false);
                }
                KeyCode::Char('a') => triggers.push(Trigger::ToggleAuto),
                KeyCode::Char('c') => triggers.push(Trigger::Clear),
                _ => {}
            },
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    let p = self.canvas.to_surface(mouse.column, mouse.row);
                    triggers.push(Trigger::Burst { x: p.x, y: p.y });
                }
            }
            Event::Resize(cols, rows) => {
                self.canvas.resize(cols as usize, rows as usize);
                execute!(self.out, Clear(ClearType::All))?;
                triggers.push(Trigger::Resize {
                    width: self.canvas.width(),
                    height: self.canvas.height(),
                });
            }
            _ => {}
        }
        Ok(true)
    }
}

impl FrameDriver for TerminalDriver {
    fn next_frame(&mut self, triggers: &mut Vec<Trigger>) -> Result<Option<Duration>> {
        loop {
            let now = Instant::now();
            if now >= self.deadline {
                break;
            }
            if event::poll(self.deadline - now)? {
                let event = event::read()?;
                if !self.translate(event, triggers)? {
                    return Ok(None);
                }
            }
        }

        // A frame that ran long pushes the schedule back instead of
        // queueing catch-up frames.
        self.deadline += self.frame_time;
        let now = Instant::now();
        if self.deadline < now {
            self.deadline = now + self.frame_time;
        }
        Ok(Some(self.started.elapsed()))
    }

    fn surface(&mut self) -> &mut dyn Surface {
        &mut self.canvas
    }

    fn present(&mut self) -> Result<()> {
        self.canvas.present(&mut self.out)?;
        Ok(())
    }
}

/// Take over the terminal and animate until the user quits.
pub fn run(config: &Config, audio: Box<dyn CuePlayer>) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut driver = TerminalDriver::new(cols, rows, config.pixel_scale, config.fps);

    let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let canvas = driver.canvas();
    let sky = Sky::new(config, canvas.width(), canvas.height(), rng);
    log::info!(
        "starting on {cols}x{rows} terminal ({}x{} surface), {} stars",
        sky.width(),
        sky.height(),
        sky.stars().len()
    );
    let mut clock = Clock::new(sky, audio, config);
    if clock.auto_running() {
        log::info!("auto mode on");
    }

    driver.enter()?;
    let result = clock.run(&mut driver);
    let restored = driver.leave();

    let ticks = result?;
    restored?;
    log::info!(
        "stopped after {ticks} ticks with {} particles live",
        clock.sky().particles().len()
    );
    Ok(())
}

use std::io::Write;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Explosion,
    ShootingStar,
}

#[derive(Error, Debug)]
#[error("could not play {cue:?}: {reason}")]
pub struct AudioError {
    pub cue: Cue,
    pub reason: String,
}

/// Fire-and-forget sound output.
///
/// `rate` is the playback speed multiplier used for pitch variation. A
/// failed cue never affects the simulation; callers only log it.
pub trait CuePlayer {
    fn play(&mut self, cue: Cue, volume: f32, rate: f32) -> Result<(), AudioError>;
}

pub struct Muted;

impl CuePlayer for Muted {
    fn play(&mut self, _cue: Cue, _volume: f32, _rate: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Rings the terminal bell for cues at or above `min_volume`.
pub struct Bell<W: Write> {
    out: W,
    min_volume: f32,
}

impl<W: Write> Bell<W> {
    pub fn new(out: W, min_volume: f32) -> Self {
        Self { out, min_volume }
    }
}

impl<W: Write> CuePlayer for Bell<W> {
    fn play(&mut self, cue: Cue, volume: f32, _rate: f32) -> Result<(), AudioError> {
        if volume < self.min_volume {
            return Ok(());
        }
        self.out
            .write_all(b"\x07")
            .and_then(|()| self.out.flush())
            .map_err(|e| AudioError {
                cue,
                reason: e.to_string(),
            })
    }
}

/// Play a cue, logging instead of propagating failure.
pub fn play_cue(player: &mut dyn CuePlayer, cue: Cue, volume: f32, rate: f32) {
    if let Err(e) = player.play(cue, volume, rate) {
        log::debug!("{e}");
    }
}

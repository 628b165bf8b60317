use crate::error::{Error, Result};
use crate::surface::Rgb;
use serde::Deserialize;
use std::path::Path;

/// Runtime tunables, loaded once at startup from an optional TOML file.
///
/// Every field has a default so a config file only needs to name what it
/// changes:
///
/// ```toml
/// stars = 300
/// auto_start = true
///
/// [particles]
/// max = 4000
///
/// [background]
/// top = "1a1b26"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Background stars generated per field.
    pub stars: usize,
    pub fps: u32,
    /// Surface units covered by one half-block pixel.
    pub pixel_scale: f32,
    pub auto_start: bool,
    pub auto_interval_ms: u64,
    pub max_shooting_stars: usize,
    pub seed: Option<u64>,
    pub particles: ParticleConfig,
    pub audio: AudioConfig,
    pub background: BackgroundConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleConfig {
    /// Pool cap; oldest particles are dropped past this.
    pub max: usize,
    pub gravity: f32,
    pub drag: f32,
    pub decay_min: f32,
    pub decay_max: f32,
    pub radius_min: f32,
    pub radius_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub bell: bool,
    /// Quietest cue that still rings the bell.
    pub bell_min_volume: f32,
    pub explosion_volume: f32,
    pub shooting_star_volume: f32,
    /// Playback rate is drawn from `1 ± pitch_jitter`.
    pub pitch_jitter: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    pub top: HexColor,
    pub bottom: HexColor,
}

/// An RRGGBB color as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(pub Rgb);

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        parse_hex_color(&value)
            .map(HexColor)
            .ok_or(Error::InvalidColor(value))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stars: 150,
            fps: 60,
            pixel_scale: 4.0,
            auto_start: false,
            auto_interval_ms: 800,
            max_shooting_stars: 32,
            seed: None,
            particles: ParticleConfig::default(),
            audio: AudioConfig::default(),
            background: BackgroundConfig::default(),
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max: 2000,
            gravity: 0.05,
            drag: 0.98,
            decay_min: 0.01,
            decay_max: 0.03,
            radius_min: 1.0,
            radius_max: 4.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bell: false,
            bell_min_volume: 0.3,
            explosion_volume: 0.4,
            shooting_star_volume: 0.2,
            pitch_jitter: 0.1,
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            top: HexColor((0x2e, 0x00, 0x4f)),
            bottom: HexColor((0x00, 0x00, 0x00)),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if self.fps == 0 {
            return invalid("fps must be positive");
        }
        if !(self.pixel_scale > 0.0) {
            return invalid("pixel_scale must be positive");
        }
        if self.auto_interval_ms == 0 {
            return invalid("auto_interval_ms must be positive");
        }

        let p = &self.particles;
        if !(p.drag > 0.0 && p.drag <= 1.0) {
            return invalid("particles.drag must be in (0, 1]");
        }
        if p.decay_min <= 0.0 || p.decay_min > p.decay_max {
            return invalid("particles.decay_min must be positive and not above decay_max");
        }
        if p.radius_min < 0.0 || p.radius_min > p.radius_max {
            return invalid("particles.radius_min must be non-negative and not above radius_max");
        }

        let a = &self.audio;
        if !(0.0..1.0).contains(&a.pitch_jitter) {
            return invalid("audio.pitch_jitter must be in [0, 1)");
        }
        Ok(())
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.stars, 150);
        assert_eq!(config.particles.max, 2000);
        assert_eq!(config.auto_interval_ms, 800);
        assert_eq!(config.background.top, HexColor((0x2e, 0x00, 0x4f)));
        config.validate().unwrap();
    }

    #[test]
    fn partial_sections_override_only_named_fields() {
        let config: Config = toml::from_str(
            r##"
            stars = 300
            [particles]
            max = 500
            [background]
            top = "#1a1b26"
            "##,
        )
        .unwrap();
        assert_eq!(config.stars, 300);
        assert_eq!(config.particles.max, 500);
        assert_eq!(config.particles.drag, 0.98);
        assert_eq!(config.background.top, HexColor((0x1a, 0x1b, 0x26)));
        assert_eq!(config.background.bottom, HexColor((0, 0, 0)));
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = toml::from_str::<Config>("[background]\ntop = \"purple\"").unwrap_err();
        assert!(err.to_string().contains("invalid hex color"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(toml::from_str::<Config>("starz = 3").is_err());
    }

    #[test]
    fn validate_catches_out_of_range_values() {
        let mut config = Config::default();
        config.particles.drag = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.particles.decay_min = 0.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("ff8000"), Some((255, 128, 0)));
        assert_eq!(parse_hex_color("#000000"), Some((0, 0, 0)));
        assert_eq!(parse_hex_color("fff"), None);
        assert_eq!(parse_hex_color("gg0000"), None);
    }
}

use std::env;
use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod audio;
mod clock;
mod config;
mod error;
mod sky;
mod surface;
mod terminal;

use audio::{Bell, CuePlayer, Muted};
use config::Config;
use error::{Error, Result};

const LOG_ENV: &str = "NIGHTSKY_LOG";

fn print_usage() {
    eprintln!("nightsky - Fireworks over a twinkling night sky, in your terminal");
    eprintln!();
    eprintln!("Usage: nightsky [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config PATH    Load settings from a TOML file");
    eprintln!("  --stars N        Number of background stars (default 150)");
    eprintln!("  --auto           Start with automatic launches on");
    eprintln!("  --bell           Ring the terminal bell on explosions");
    eprintln!("  --seed N         Seed the random source for a repeatable show");
    eprintln!("  --log-file PATH  Write logs to PATH (level from {LOG_ENV}, default info)");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  click            Launch a firework at the pointer");
    eprintln!("  a                Toggle automatic launches");
    eprintln!("  c                Clear fireworks and redraw the stars");
    eprintln!("  q, ESC, Ctrl+C   Exit");
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    stars: Option<usize>,
    auto: bool,
    bell: bool,
    seed: Option<u64>,
    log_file: Option<PathBuf>,
}

/// Parse command-line arguments. `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let value = || {
            args.get(i + 1)
                .ok_or_else(|| Error::InvalidArgument(format!("{} requires a value", args[i])))
        };

        match args[i].as_str() {
            "--config" => {
                options.config = Some(PathBuf::from(value()?));
                i += 2;
            }
            "--stars" => {
                options.stars = Some(parse_number(&args[i], value()?)?);
                i += 2;
            }
            "--seed" => {
                options.seed = Some(parse_number(&args[i], value()?)?);
                i += 2;
            }
            "--log-file" => {
                options.log_file = Some(PathBuf::from(value()?));
                i += 2;
            }
            "--auto" => {
                options.auto = true;
                i += 1;
            }
            "--bell" => {
                options.bell = true;
                i += 1;
            }
            "help" | "--help" | "-h" => return Ok(None),
            arg => return Err(Error::InvalidArgument(format!("Unknown option: {arg}"))),
        }
    }

    Ok(Some(options))
}

fn parse_number<T: FromStr>(flag: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("{flag} expects a number, got {value}")))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // stderr shares the screen with the animation, so only log when given a file
    let Some(path) = log_file else {
        env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "off")).init();
        return Ok(());
    };

    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(options: &Options) -> Result<Config> {
    let mut config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(stars) = options.stars {
        config.stars = stars;
    }
    if let Some(seed) = options.seed {
        config.seed = Some(seed);
    }
    config.auto_start |= options.auto;
    config.audio.bell |= options.bell;

    config.validate()?;
    Ok(config)
}

fn try_main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args)? else {
        print_usage();
        return Ok(());
    };

    init_logging(options.log_file.as_deref())?;
    let config = load_config(&options)?;

    let audio: Box<dyn CuePlayer> = if config.audio.bell {
        Box::new(Bell::new(stdout(), config.audio.bell_min_volume))
    } else {
        Box::new(Muted)
    };

    terminal::run(&config, audio)
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("nightsky: {e}");
        if matches!(e, Error::InvalidArgument(_)) {
            eprintln!();
            print_usage();
        }
        std::process::exit(1);
    }
}

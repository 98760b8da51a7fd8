//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Parse and validate frames per second (at least 1)
fn parse_fps(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid frame rate", s))?;
    if fps == 0 {
        return Err("Frame rate must be at least 1 fps".to_string());
    }
    Ok(fps)
}

/// Parse a finite float
fn parse_float(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !v.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    Ok(v)
}

/// Play a video as colored braille art in the terminal, or export it as a
/// standalone C animation
#[derive(Parser, Debug)]
#[command(name = "braille-player")]
#[command(version, about = "Colored braille video player and exporter for the terminal", long_about = None)]
#[command(after_help = "KEYS (preview):
    e/d    contrast +/-
    r/f    brightness +/-
    t/g    FPS +/-
    Enter  play video
    s      export to a C program
    q      quit")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Video file to open (prompted for when omitted)
    pub video: Option<PathBuf>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Initial frames per second
    #[arg(long, value_parser = parse_fps)]
    pub fps: Option<u32>,

    /// Initial contrast (clamped to 0.1 - 3.0)
    #[arg(long, value_parser = parse_float)]
    pub contrast: Option<f32>,

    /// Initial brightness (clamped to -1.0 - 1.0)
    #[arg(long, value_parser = parse_float, allow_hyphen_values = true)]
    pub brightness: Option<f32>,

    /// Directory the exported C program is written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Overlay command-line values onto a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(fps) = self.fps {
            config.playback.fps = fps;
        }
        if let Some(contrast) = self.contrast {
            config.playback.contrast = contrast;
        }
        if let Some(brightness) = self.brightness {
            config.playback.brightness = brightness;
        }
        if let Some(ref dir) = self.export_dir {
            config.export.dir = dir.clone();
        }
    }

    /// Log level filter implied by `-v` flags.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["braille-player"]);
        assert!(args.video.is_none());
        assert!(args.config.is_none());
        assert!(args.fps.is_none());
        assert!(args.contrast.is_none());
        assert!(args.brightness.is_none());
        assert!(args.export_dir.is_none());
        assert!(args.log_file.is_none());
        assert_eq!(args.verbose, 0);
        assert!(args.command.is_none());
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_args_video_and_overrides() {
        let args = Args::parse_from([
            "braille-player",
            "clip.mp4",
            "--fps",
            "12",
            "--contrast",
            "1.5",
            "--brightness",
            "-0.25",
            "--export-dir",
            "out",
        ]);
        assert_eq!(args.video, Some(PathBuf::from("clip.mp4")));

        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.playback.fps, 12);
        assert_eq!(config.playback.contrast, 1.5);
        assert_eq!(config.playback.brightness, -0.25);
        assert_eq!(config.export.dir, PathBuf::from("out"));
    }

    #[test]
    fn test_args_rejects_zero_fps() {
        assert!(Args::try_parse_from(["braille-player", "--fps", "0"]).is_err());
        assert!(Args::try_parse_from(["braille-player", "--fps", "fast"]).is_err());
    }

    #[test]
    fn test_args_rejects_non_numeric_contrast() {
        assert!(Args::try_parse_from(["braille-player", "--contrast", "high"]).is_err());
        assert!(Args::try_parse_from(["braille-player", "--contrast", "NaN"]).is_err());
    }

    #[test]
    fn test_args_verbosity() {
        let args = Args::parse_from(["braille-player", "-vv"]);
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_args_config_subcommand() {
        let args = Args::parse_from(["braille-player", "-c", "alt.toml", "config", "init"]);
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }
}

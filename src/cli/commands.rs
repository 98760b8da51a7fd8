//! Subcommand handlers for config actions.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::args::ConfigAction;
use crate::config::{self, Config, DEFAULT_CONFIG_TOML};

/// Handle a config subcommand, writing user-facing output to `out`.
///
/// `path` is the `--config` override; the default location is used otherwise.
pub fn handle_config_action(
    action: ConfigAction,
    path: Option<&Path>,
    config: &Config,
    out: &mut impl Write,
) -> io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            writeln!(out, "Current configuration:")?;
            writeln!(out, "  FPS: {}", config.playback.fps)?;
            writeln!(out, "  Contrast: {:.1}", config.playback.contrast)?;
            writeln!(out, "  Brightness: {:.2}", config.playback.brightness)?;
            writeln!(out, "  Reserved rows: {}", config.terminal.reserved_rows)?;
            writeln!(out, "  Export file: {}", config.export_path().display())?;
            writeln!(out)?;

            if config_path.exists() {
                writeln!(out, "Config file: {} (exists)", config_path.display())?;
            } else {
                writeln!(out, "Config file: {} (not found)", config_path.display())?;
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!(
                        "Config file already exists: {}\nUse 'braille-player config show' to view current settings.",
                        config_path.display()
                    ),
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)?;

            writeln!(out, "Created config file: {}", config_path.display())?;
        }
    }

    Ok(())
}

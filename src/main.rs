use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use braille_player::cli::{self, Args, Command};
use braille_player::config::{Config, ConfigError};
use braille_player::decoder::{DecodeError, FfmpegDecoder, FrameSource};
use braille_player::export;
use braille_player::session::{CancelToken, Outcome, Session, SessionError};
use braille_player::terminal::{ConsoleScreen, KeyEvents};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Exit status after an interrupted playback or export (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Warning: could not set up logging: {}", e);
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install a `tracing` subscriber that also receives `log` records.
fn init_logging(args: &Args) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));

    let result = match args.log_file {
        Some(ref path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };

    result.map_err(|e| io::Error::other(e.to_string()))
}

fn run(args: Args) -> Result<ExitCode, AppError> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    if let Some(Command::Config { action }) = args.command {
        cli::handle_config_action(action, args.config.as_deref(), &config, &mut io::stdout())?;
        return Ok(ExitCode::SUCCESS);
    }

    let video = match args.video {
        Some(path) => path,
        None => prompt_video_path()?,
    };

    let (decoder, first_frame) = open_video(&video)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let mut session =
        Session::new(config.session_config(), decoder, first_frame).with_cancel_token(cancel);
    let outcome = session.run(&mut KeyEvents::new(), &mut ConsoleScreen::stdout())?;

    match outcome {
        Outcome::Quit => Ok(ExitCode::SUCCESS),
        Outcome::Finished { frames } => {
            println!("Playback finished ({} frames).", frames);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Interrupted { frames } => {
            println!();
            println!("Interrupted after {} frames.", frames);
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        Outcome::Exported(animation) => {
            println!();
            println!("Export finished. Generating C program ...");
            let path =
                export::write_program(&animation, &config.export.dir, &config.export.file_name)?;
            println!("C program written: {}", path.display());
            println!("Compile with: gcc {} -o anim && ./anim", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Open the decoder and read the preview frame before any session state.
fn open_video(path: &Path) -> Result<(FfmpegDecoder, braille_player::frame::PixelFrame), AppError> {
    let mut decoder = FfmpegDecoder::open(path)?;
    let first_frame = decoder
        .read_next()?
        .ok_or_else(|| DecodeError::NoFrames(path.to_path_buf()))?;
    Ok((decoder, first_frame))
}

fn prompt_video_path() -> io::Result<PathBuf> {
    print!("Video path: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

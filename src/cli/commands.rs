//! Subcommand handlers for run, record and config actions.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;

use clickloop::action::format_delay;
use clickloop::config::{default_path as get_config_path, Config, ConfigError, DEFAULT_CONFIG};
use clickloop::input::{Coordinates, InputError, RdevSource};
use clickloop::pointer::{DryRunPointer, EnigoPointer, Pointer, PointerError};
use clickloop::{ClickerApp, ClickerEvent, CoordinateRecorder, InputMultiplexer, RecordError};

use super::args::ConfigAction;
use super::enums::{Mode, PointArg};

/// Errors surfaced to the user by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Pointer(#[from] PointerError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("Failed to install Ctrl+C handler: {0}")]
    Ctrlc(#[from] ctrlc::Error),
    #[error("No points to click. Add [[points]] to the config file or pass --point X,Y")]
    NoPoints,
}

/// Click the configured and command-line points until the stop hotkey or
/// Ctrl+C.
pub async fn run(
    config_path: Option<&Path>,
    points: Vec<PointArg>,
    mode: Option<Mode>,
    dry_run: bool,
) -> Result<(), CliError> {
    let config = Config::load(config_path)?;
    let mut settings = config.app_settings()?;
    if let Some(mode) = mode {
        settings.mode = mode.into();
    }

    let pointer: Arc<dyn Pointer> = if dry_run {
        Arc::new(DryRunPointer)
    } else {
        Arc::new(EnigoPointer::new()?)
    };
    let multiplexer = Arc::new(InputMultiplexer::new(
        Box::new(RdevSource::new()),
        Handle::current(),
    ));
    let app = Arc::new(ClickerApp::new(
        multiplexer,
        pointer,
        settings,
        Handle::current(),
    ));

    for point in &config.points {
        app.add_point_at(
            point.x,
            point.y,
            point.delay_ms.unwrap_or(settings.default_delay_ms),
        );
    }
    for point in points {
        app.add_point_at(
            point.x,
            point.y,
            point.delay_ms.unwrap_or(settings.default_delay_ms),
        );
    }
    if app.points().is_empty() {
        return Err(CliError::NoPoints);
    }

    app.start_input()?;
    let mut events = app.subscribe();

    let ctrlc_app = Arc::clone(&app);
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping...");
        if !ctrlc_app.stop_clicker() {
            std::process::exit(130);
        }
    })?;

    println!("Points ({:?} mode):", settings.mode);
    for point in app.points() {
        println!(
            "  [{}] {},{} every {}",
            point.id,
            point.x,
            point.y,
            format_delay(point.delay_ms)
        );
    }

    app.start_clicker();
    println!("Clicking. Press {} or Ctrl+C to stop.", settings.hotkeys.stop);

    loop {
        match events.recv().await {
            Ok(ClickerEvent::Stopped) | Err(RecvError::Closed) => break,
            Ok(ClickerEvent::ToggleVisibility) => {
                log::debug!("Visibility hotkey pressed (no window to toggle)");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Missed {} clicker event(s)", skipped);
            }
        }
    }

    app.shutdown();
    println!("Stopped.");
    Ok(())
}

/// Capture `count` points from real clicks and print them as `X,Y` lines.
pub async fn record(count: u32) -> Result<(), CliError> {
    let multiplexer = Arc::new(InputMultiplexer::new(
        Box::new(RdevSource::new()),
        Handle::current(),
    ));
    let recorder = CoordinateRecorder::new(Arc::clone(&multiplexer));

    let ctrlc_recorder = recorder.clone();
    ctrlc::set_handler(move || {
        if !ctrlc_recorder.cancel() {
            std::process::exit(130);
        }
    })?;

    let captured = capture_points(&recorder, count, |at| println!("{}", at)).await?;
    if captured < count {
        eprintln!("Recording cancelled after {} point(s).", captured);
    }

    multiplexer.stop();
    Ok(())
}

/// Record up to `count` points, handing each to `emit`. A cancelled recording
/// ends the run early and is not an error. Returns how many were captured.
async fn capture_points(
    recorder: &CoordinateRecorder,
    count: u32,
    mut emit: impl FnMut(Coordinates),
) -> Result<u32, RecordError> {
    for i in 1..=count {
        eprintln!("Left-click anywhere to capture point {}/{}...", i, count);
        match recorder.record().await {
            Ok(at) => emit(at),
            Err(RecordError::Cancelled) => return Ok(i - 1),
            Err(e) => return Err(e),
        }
    }
    Ok(count)
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = match Config::load(Some(&config_path)) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            println!("Current configuration:");
            println!("  Stop hotkey: {}", config.hotkeys.stop);
            if config.hotkeys.visibility.trim().is_empty() {
                println!("  Visibility hotkey: disabled");
            } else {
                println!("  Visibility hotkey: {}", config.hotkeys.visibility);
            }
            println!("  Mode: {:?}", config.clicker.mode);
            println!(
                "  Default delay: {}",
                format_delay(config.clicker.default_delay_ms)
            );
            println!("  Minimum delay: {}ms", config.clicker.min_delay_ms);
            println!("  Points: {}", config.points.len());
            for point in &config.points {
                match point.delay_ms {
                    Some(delay) => {
                        println!("    {},{} every {}", point.x, point.y, format_delay(delay))
                    }
                    None => println!("    {},{}", point.x, point.y),
                }
            }
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'clickloop config show' to view current settings.");
                std::process::exit(1);
            }

            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            if let Err(e) = std::fs::write(&config_path, DEFAULT_CONFIG) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}

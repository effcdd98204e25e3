//! retrotype - a mechanical typewriter emulator for the terminal
//!
//! retrotype turns a terminal into a line-at-a-time typewriter: keystrokes go
//! onto the current line, and a carriage return commits the line to a session
//! file and, when one is attached, an ESC/POS receipt printer.
//!
//! # Features
//!
//! - **Margin bell**: an audible warning when typing enters the hot zone
//!   before the right margin
//! - **Autoreturn**: automatic carriage return on a space or hyphen in the
//!   hot zone
//! - **Margin release**: type past the right margin for one line
//! - **Line spacing**: 1 / 1.5 / 2, forwarded to the printer
//! - **Session transcript**: every committed line appended to a timestamped
//!   file
//!
//! # Keybindings
//!
//! | Key | Action |
//! |-----|--------|
//! | alt+a | Toggle autoreturn |
//! | alt+n | Toggle margin release |
//! | alt+s | Cycle line spacing |
//! | alt+l | Set left margin at cursor |
//! | alt+r | Set right margin at cursor |
//! | alt+h | Toggle help |
//! | alt+q | Quit |

mod config;
mod core;
mod sink;
mod ui;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::core::discipline::LineDiscipline;
use crate::core::session::{Action, Key, SessionController};
use crate::sink::{FileSink, Printer};
use crate::ui::{KeyMapper, Renderer};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Idle poll interval of the main loop.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// How long to wait for the second key of an escape sequence. Matches the
/// short ESC delay a terminal typewriter wants: long enough for a real
/// two-key chord, short enough that a lone Escape feels immediate.
const META_LOOKAHEAD: Duration = Duration::from_millis(150);

/// Command line options
struct CliArgs {
    /// Explicit configuration file path
    config_path: Option<PathBuf>,
    /// Write the default configuration file and exit
    write_default_config: bool,
    /// Skip the printer probe
    no_printer: bool,
    /// Disable the session file
    no_file: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: None,
            write_default_config: false,
            no_printer: false,
            no_file: false,
        }
    }
}

fn print_version() {
    eprintln!("retrotype {}", VERSION);
}

fn print_help() {
    eprintln!("retrotype {} - a mechanical typewriter emulator for the terminal", VERSION);
    eprintln!();
    eprintln!("Usage: retrotype [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <PATH>         Configuration file (default: ~/.retrotype/config.toml)");
    eprintln!("  --write-default-config  Write a starter configuration file and exit");
    eprintln!("  --no-printer            Skip the printer probe");
    eprintln!("  --no-file               Do not write a session file");
    eprintln!("  -v, --version           Show version");
    eprintln!("  -h, --help              Show this help");
    eprintln!();
    eprintln!("Keybindings:");
    eprintln!("  alt+a                   Toggle autoreturn");
    eprintln!("  alt+n                   Toggle margin release");
    eprintln!("  alt+s                   Cycle line spacing (1 / 1.5 / 2)");
    eprintln!("  alt+l                   Set left margin at cursor");
    eprintln!("  alt+r                   Set right margin at cursor");
    eprintln!("  alt+h                   Toggle help");
    eprintln!("  alt+q                   Quit");
    eprintln!();
    eprintln!("Session files are written to the configured save folder, one");
    eprintln!("timestamped .txt per session, a line per carriage return.");
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = env::args().collect();
    let mut cli = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing path after --config".to_string());
                }
                cli.config_path = Some(PathBuf::from(&args[i]));
            }
            "--write-default-config" => {
                cli.write_default_config = true;
            }
            "--no-printer" => {
                cli.no_printer = true;
            }
            "--no-file" => {
                cli.no_file = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(cli)
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let config_path = match cli.config_path.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if cli.write_default_config {
        Config::write_default(&config_path)?;
        eprintln!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    // Configuration is a precondition: bail before touching the terminal.
    let config = Config::load(&config_path)?;

    // Log to a file in the save folder; the terminal itself is the page.
    let _ = std::fs::create_dir_all(&config.save_folder);
    let log_path = config.save_folder.join("retrotype.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();
    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    info!("retrotype {} starting", VERSION);
    info!(
        "width={} autoreturn={} spacing_index={} margin_bell={} left_margin={}",
        config.width, config.autoreturn, config.spacing_index, config.margin_bell, config.left_margin
    );

    let discipline = LineDiscipline::new(config.typewriter_settings());

    let file = if config.use_file && !cli.no_file {
        let sink = FileSink::new(&config.save_folder)?;
        info!("session file: {}", sink.path().display());
        Some(sink)
    } else {
        None
    };

    let printer = if config.use_printer && !cli.no_printer {
        Printer::probe(&config.printer_device)
    } else {
        Printer::Absent
    };

    let mut controller =
        SessionController::new(discipline, file, printer, config.bare_escape.into());

    // Initialize renderer and run with guaranteed cleanup.
    let mut renderer = Renderer::new();
    renderer.init()?;

    let result = run_main_loop(&mut controller, &mut renderer);

    let _ = renderer.cleanup();
    // Belt and braces: raw mode must not outlive the process.
    let _ = terminal::disable_raw_mode();

    result
}

/// Main event loop: block on the next key, dispatch it to completion
/// (including any file write and printer dispatch), render, repeat.
fn run_main_loop(
    controller: &mut SessionController,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    renderer.render(controller)?;

    loop {
        if !event::poll(POLL_TIMEOUT)? {
            continue;
        }

        match event::read()? {
            Event::Key(key_event) => {
                let Some(key) = KeyMapper::classify(&key_event) else {
                    continue;
                };

                let mut action = controller.dispatch(Some(key))?;
                if action == Action::AwaitMeta {
                    // One non-blocking look-ahead tick decides between a meta
                    // sequence and a bare escape.
                    action = controller.dispatch(meta_lookahead()?)?;
                }

                match action {
                    Action::Quit => {
                        info!("session ended");
                        break;
                    }
                    Action::Bell => renderer.bell()?,
                    Action::Continue | Action::AwaitMeta => {}
                }

                renderer.render(controller)?;
            }

            Event::Resize(_, _) => {
                renderer.render(controller)?;
            }

            _ => {}
        }
    }

    Ok(())
}

/// Poll once for the second key of a meta sequence.
fn meta_lookahead() -> anyhow::Result<Option<Key>> {
    if event::poll(META_LOOKAHEAD)? {
        if let Event::Key(key_event) = event::read()? {
            return Ok(KeyMapper::classify(&key_event));
        }
    }
    Ok(None)
}

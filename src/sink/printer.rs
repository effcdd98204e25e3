//! ESC/POS receipt printer sink
//!
//! The printer is an optional capability. It is probed exactly once at
//! startup by trying to open the configured device node for writing; if that
//! fails the session runs without it and every dispatch is a silent no-op.
//!
//! When attached, each committed line is sent as an ESC/POS line-spacing
//! command (`ESC 3 n`, with n in printer motion units) followed by the text
//! and a newline.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PrinterError {
    #[error("Failed to write to printer {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, PrinterError>;

/// ESC/POS "set line spacing" command prefix.
const ESC_LINE_SPACING: [u8; 2] = [0x1b, b'3'];

/// Probe result for the receipt printer.
pub enum Printer {
    Attached(PrinterDevice),
    Absent,
}

/// A live handle to the printer device node. The node is reopened per line,
/// like the file sink, so only the path is held.
pub struct PrinterDevice {
    path: PathBuf,
}

impl Printer {
    /// Probe the device node once. Open failure of any kind means the
    /// printer is absent for the whole session; that is not an error.
    pub fn probe(device: &Path) -> Self {
        match OpenOptions::new().write(true).open(device) {
            Ok(_) => {
                info!("printer found at {}", device.display());
                Printer::Attached(PrinterDevice {
                    path: device.to_path_buf(),
                })
            }
            Err(e) => {
                info!("no printer at {}: {}", device.display(), e);
                Printer::Absent
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Printer::Attached(_))
    }

    /// Print one line at the given spacing multiplier. Silent no-op when the
    /// printer is absent.
    pub fn print_line(&self, line: &str, spacing: f32) -> Result<()> {
        let Printer::Attached(device) = self else {
            return Ok(());
        };
        let write_err = |source| PrinterError::Write {
            path: device.path.clone(),
            source,
        };
        let mut node = OpenOptions::new()
            .write(true)
            .open(&device.path)
            .map_err(write_err)?;
        node.write_all(&ESC_LINE_SPACING).map_err(write_err)?;
        node.write_all(&[spacing_units(spacing)]).map_err(write_err)?;
        node.write_all(line.as_bytes()).map_err(write_err)?;
        node.write_all(b"\n").map_err(write_err)?;
        node.flush().map_err(write_err)?;
        Ok(())
    }
}

/// Map the spacing multiplier to printer motion units: 1 -> 30, 1.5 -> 40,
/// 2 -> 60.
fn spacing_units(multiplier: f32) -> u8 {
    if multiplier <= 1.0 {
        30
    } else if multiplier <= 1.5 {
        40
    } else {
        60
    }
}

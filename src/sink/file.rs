//! Append-only session transcript
//!
//! Each session writes to one file in the save folder, named after the
//! session start time. The file is reopened in append mode for every
//! committed line, so a crash never corrupts lines already written.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileSinkError {
    #[error("Failed to create save folder {path}: {source}")]
    CreateFolder { path: PathBuf, source: io::Error },

    #[error("Failed to append to {path}: {source}")]
    Append { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, FileSinkError>;

/// Append-only text file sink for committed lines.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink writing to `<save_folder>/<session start>.txt`.
    ///
    /// The save folder is created if missing. The file itself is created
    /// lazily on the first append.
    pub fn new(save_folder: &Path) -> Result<Self> {
        fs::create_dir_all(save_folder).map_err(|source| FileSinkError::CreateFolder {
            path: save_folder.to_path_buf(),
            source,
        })?;
        let name = Local::now().format("%Y-%m-%d-%H%M%S");
        Ok(Self {
            path: save_folder.join(format!("{}.txt", name)),
        })
    }

    /// Sink writing to an explicit file path.
    #[allow(dead_code)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one line plus a trailing newline.
    pub fn append(&self, line: &str) -> Result<()> {
        let append_err = |source| FileSinkError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        file.write_all(line.as_bytes()).map_err(append_err)?;
        file.write_all(b"\n").map_err(append_err)?;
        file.flush().map_err(append_err)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

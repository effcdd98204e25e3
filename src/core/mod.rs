//! Core typewriter components.
//!
//! This module contains the typewriter logic proper:
//!
//! - **discipline**: the line-editing state machine (buffer, margins, bell,
//!   history)
//! - **formatting**: extension trait for not-yet-implemented formatting
//!   features
//! - **session**: controller mapping keystrokes to discipline operations,
//!   sinks, and statistics
//!
//! # Architecture
//!
//! ```text
//! SessionController
//! ├── LineDiscipline (buffer + margins + history, no I/O)
//! ├── FileSink       (append-per-line transcript)
//! └── Printer        (optional ESC/POS receipt printer)
//! ```

pub mod discipline;
pub mod formatting;
pub mod session;

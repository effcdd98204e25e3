//! Output sinks for committed lines.
//!
//! Every carriage return forwards the committed line to two places:
//!
//! - **file**: append-only session transcript in the configured save folder
//! - **printer**: optional ESC/POS receipt printer, probed once at startup
//!
//! Both sinks open, write, and close per line; no handle spans lines.

pub mod file;
pub mod printer;

pub use file::FileSink;
pub use printer::Printer;

//! Formatting extension points.
//!
//! Mechanical typewriters carried more formatting machinery than the line
//! discipline implements today: tab stops, underline, centering, right-margin
//! flush. These are deliberately out of scope, but the dispatch surface for
//! them exists so a variant can implement them without touching the command
//! table. Every method defaults to a no-op.

use crate::core::discipline::LineDiscipline;

/// Optional typewriter formatting features. All no-ops by default.
#[allow(unused_variables, dead_code)]
pub trait Formatting {
    /// Advance the cursor to the next tab stop, or the right margin if none.
    fn tab(&mut self) {}

    /// Record the given cursor position as a tab stop.
    fn tab_set(&mut self, column: usize) {}

    /// Clear all tab stops but not the margins.
    fn tab_clear(&mut self) {}

    /// Advance the carriage by the current line spacing without a return.
    fn line_feed(&mut self) {}

    /// Underline all characters including spaces.
    fn underline_all_toggle(&mut self) {}

    /// Underline characters but not spaces.
    fn underline_word_toggle(&mut self) {}

    /// Center typed text between the margins.
    fn centre_text(&mut self) {}

    /// Align typed text flush with the right margin.
    fn right_margin_flush(&mut self) {}
}

impl Formatting for LineDiscipline {}

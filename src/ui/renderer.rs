//! Terminal renderer using crossterm
//!
//! Draws the typewriter "page": three committed lines of context above the
//! live line, the margin/tab bar below it, and a settings/statistics footer.
//! The layout mirrors a real typewriter where only the current line is hot
//! and earlier lines are already on paper.

use std::io::{self, Write};

use crossterm::{
    cursor::{MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::core::session::SessionController;

/// Screen row of the live buffer; the three history rows sit above it.
const LIVE_ROW: u16 = 3;
/// Screen row of the margin/tab bar.
const TAB_BAR_ROW: u16 = 4;
/// First row of the settings/statistics footer.
const STATUS_ROW: u16 = 6;
/// First row of the help overlay.
const HELP_ROW: u16 = 10;

const HELP_LINES: [&str; 9] = [
    "alt+a  toggle autoreturn",
    "alt+n  toggle margin release",
    "alt+s  cycle line spacing (1 / 1.5 / 2)",
    "alt+l  set left margin at cursor",
    "alt+r  set right margin at cursor",
    "alt+h  toggle this help",
    "alt+q  quit",
    "enter  carriage return",
    "backspace  erase last character",
];

/// Typewriter page renderer.
pub struct Renderer {
    initialized: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Initialize the terminal for rendering.
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Clear(ClearType::All),
            MoveTo(0, LIVE_ROW),
            Show
        )?;
        self.initialized = true;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let mut stdout = io::stdout();
        execute!(stdout, ResetColor, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        self.initialized = false;
        Ok(())
    }

    /// Draw the full page and park the cursor on the live line.
    pub fn render(&mut self, controller: &SessionController) -> io::Result<()> {
        let mut stdout = io::stdout();
        let discipline = controller.discipline();
        let settings = discipline.settings();
        let history = discipline.history();
        let stats = controller.stats();

        queue!(stdout, Clear(ClearType::All))?;

        // Committed lines, oldest on top, the way paper scrolls up.
        queue!(stdout, SetForegroundColor(Color::DarkGrey))?;
        queue!(stdout, MoveTo(0, 0), Print(&history.third))?;
        queue!(stdout, MoveTo(0, 1), Print(&history.second))?;
        queue!(stdout, MoveTo(0, 2), Print(&history.recent))?;

        // Live line.
        queue!(stdout, SetForegroundColor(Color::Green))?;
        queue!(stdout, MoveTo(0, LIVE_ROW), Print(discipline.buffer_string()))?;

        // Margin/tab bar.
        queue!(stdout, SetForegroundColor(Color::DarkGrey))?;
        queue!(stdout, MoveTo(0, TAB_BAR_ROW), Print(discipline.tab_bar_string()))?;

        // Settings and statistics footer.
        let summary = format!(
            "Width={} LS={} A-RTN={} MR={} LM={} RM={}",
            settings.width,
            discipline.current_spacing(),
            settings.autoreturn,
            settings.margin_release,
            settings.left_margin,
            settings.right_margin,
        );
        queue!(stdout, MoveTo(0, STATUS_ROW), Print(summary))?;

        let file_label = controller
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "off".to_string());
        let io_line = format!(
            "File={} Printer={} Lines={} Words={}",
            file_label,
            controller.printer_attached(),
            stats.line_count,
            stats.word_count,
        );
        queue!(stdout, MoveTo(0, STATUS_ROW + 1), Print(io_line))?;
        queue!(stdout, MoveTo(0, STATUS_ROW + 2), Print("alt-h for help"))?;

        if controller.help_visible() {
            queue!(stdout, SetForegroundColor(Color::Cyan))?;
            for (i, line) in HELP_LINES.iter().enumerate() {
                queue!(stdout, MoveTo(0, HELP_ROW + i as u16), Print(line))?;
            }
        }

        // Park the cursor at the print head position.
        queue!(
            stdout,
            ResetColor,
            MoveTo(controller.cursor() as u16, LIVE_ROW)
        )?;
        stdout.flush()
    }

    /// Ring the terminal bell (the margin bell).
    pub fn bell(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}
